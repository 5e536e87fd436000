//! Optional observability helpers for the run steps.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `maven_oauth_settings.step` with the `step`
//!   and `stage` (call site) fields, plus the step events logged by each module.
//! - Enable `metrics` to increment the `maven_oauth_settings_step_total` counter for every
//!   attempt/success/failure, labeled by `step` + `outcome`.
//!
//! Both are driven by [`StepScope`], which every step opens once.
//!
//! Secret values never flow through this module. Events carry hosts, paths, status codes and
//! informational token metadata only.

// self
use crate::_prelude::*;

/// Emits a `tracing` event when the `tracing` feature is enabled; expands to nothing otherwise.
macro_rules! obs_event {
	($level:ident, $($arg:tt)+) => {
		#[cfg(feature = "tracing")]
		{
			::tracing::$level!($($arg)+);
		}
	};
}
pub(crate) use obs_event;

mod scope;

pub use scope::*;

/// Steps observed during a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
	/// Client-credentials token exchange.
	TokenFetch,
	/// Settings document rendering + placement.
	SettingsWrite,
	/// Post-run removal of the settings file.
	Cleanup,
}
impl Step {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Step::TokenFetch => "token_fetch",
			Step::SettingsWrite => "settings_write",
			Step::Cleanup => "cleanup",
		}
	}
}
impl Display for Step {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepOutcome {
	/// Entry to a step.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller (or, for cleanup, downgraded to a warning).
	Failure,
}
impl StepOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StepOutcome::Attempt => "attempt",
			StepOutcome::Success => "success",
			StepOutcome::Failure => "failure",
		}
	}
}
impl Display for StepOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
