// self
use crate::{
	_prelude::*,
	obs::{Step, StepOutcome, obs_event},
};

/// One observed execution of a [`Step`].
///
/// Opening a scope counts an attempt. Running work through it enters the
/// `maven_oauth_settings.step` span and counts exactly one success or failure, so call sites never
/// pair attempt and outcome bookkeeping by hand.
#[derive(Debug)]
pub struct StepScope {
	step: Step,
	#[cfg(feature = "tracing")]
	span: ::tracing::Span,
}
impl StepScope {
	/// Opens a scope for `step`; `stage` names the call site.
	pub fn open(step: Step, stage: &'static str) -> Self {
		count(step, StepOutcome::Attempt);

		#[cfg(feature = "tracing")]
		{
			let span =
				::tracing::info_span!("maven_oauth_settings.step", step = step.as_str(), stage);

			Self { step, span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self { step }
		}
	}

	/// Runs fallible synchronous work inside the span.
	pub fn run<T, E>(self, work: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
		self.observe(work, |result| match result {
			Ok(_) => StepOutcome::Success,
			Err(_) => StepOutcome::Failure,
		})
	}

	/// Runs synchronous work inside the span and lets `classify` decide the outcome.
	///
	/// Used by steps that report failure through their return value instead of an error.
	pub fn observe<T>(
		self,
		work: impl FnOnce() -> T,
		classify: impl FnOnce(&T) -> StepOutcome,
	) -> T {
		#[cfg(feature = "tracing")]
		let value = self.span.in_scope(work);
		#[cfg(not(feature = "tracing"))]
		let value = work();

		self.close(classify(&value));

		value
	}

	/// Awaits fallible work with the span attached to the future.
	pub async fn run_async<T, E, Fut>(self, work: Fut) -> Result<T, E>
	where
		Fut: Future<Output = Result<T, E>>,
	{
		#[cfg(feature = "tracing")]
		let result = ::tracing::Instrument::instrument(work, self.span.clone()).await;
		#[cfg(not(feature = "tracing"))]
		let result = work.await;

		self.close(if result.is_ok() { StepOutcome::Success } else { StepOutcome::Failure });

		result
	}

	fn close(self, outcome: StepOutcome) {
		count(self.step, outcome);

		#[cfg(feature = "tracing")]
		let _entered = self.span.enter();

		obs_event!(debug, outcome = outcome.as_str(), "Step finished.");
	}
}

fn count(step: Step, outcome: StepOutcome) {
	#[cfg(feature = "metrics")]
	{
		::metrics::counter!(
			"maven_oauth_settings_step_total",
			"step" => step.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (step, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn run_passes_results_through() {
		let ok = StepScope::open(Step::SettingsWrite, "test").run(|| Ok::<_, ()>(7));
		let err = StepScope::open(Step::SettingsWrite, "test").run(|| Err::<(), _>("boom"));

		assert_eq!(ok, Ok(7));
		assert_eq!(err, Err("boom"));
	}

	#[test]
	fn observe_uses_classifier() {
		let mut seen = None;
		let value = StepScope::open(Step::Cleanup, "test").observe(
			|| "failed",
			|value| {
				seen = Some(*value);

				StepOutcome::Failure
			},
		);

		assert_eq!(value, "failed");
		assert_eq!(seen, Some("failed"));
	}

	#[cfg(feature = "tracing")]
	#[test]
	fn work_runs_inside_step_span() {
		let subscriber = tracing_subscriber::fmt().with_writer(std::io::sink).finish();
		let _default = ::tracing::subscriber::set_default(subscriber);
		let name = StepScope::open(Step::SettingsWrite, "test")
			.observe(|| ::tracing::Span::current().metadata().map(|meta| meta.name()), |_| {
				StepOutcome::Success
			});

		assert_eq!(name, Some("maven_oauth_settings.step"));
	}

	#[tokio::test]
	async fn run_async_passes_results_through() {
		let value = StepScope::open(Step::TokenFetch, "test")
			.run_async(async { Ok::<_, ()>("token") })
			.await;

		assert_eq!(value, Ok("token"));
	}
}
