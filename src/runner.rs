//! Step orchestration: inputs → token → settings file → outputs.

pub mod inputs;
pub mod sink;

pub use inputs::*;
pub use sink::*;

// self
use crate::{
	_prelude::*,
	cleanup::{self, CleanupOutcome},
	http::TokenHttpClient,
	oauth::{TokenAcquirer, TransportErrorMapper},
	obs::obs_event,
	settings::SettingsSynthesizer,
};

/// Output and state key under which the settings path is published.
pub const SETTINGS_FILE_KEY: &str = "settings-file";

/// Runs the main step and returns the written settings path.
///
/// The client secret is registered with `sink` before any network traffic and the token right
/// after it is issued. The token itself is never published as an output.
pub async fn run<C, M, S>(
	inputs: &Inputs,
	acquirer: &TokenAcquirer<C, M>,
	sink: &S,
) -> Result<PathBuf>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
	S: ?Sized + SecretSink + OutputSink,
{
	let ResolvedInputs { request, server_id, settings_path } = inputs.resolve()?;

	sink.register_secret(request.client_secret().expose())?;

	obs_event!(
		info,
		endpoint = request.endpoint(),
		server_id = server_id.as_str(),
		"Requesting OAuth access token."
	);

	let token = acquirer.fetch(&request).await?;

	sink.register_secret(token.expose())?;

	let path = SettingsSynthesizer::new().write(&token, &server_id, settings_path)?;
	let rendered = path.to_string_lossy();

	sink.set_output(SETTINGS_FILE_KEY, &rendered)?;
	sink.save_state(SETTINGS_FILE_KEY, &rendered)?;

	obs_event!(info, path = %rendered, "Maven settings are ready.");

	Ok(path)
}

/// Runs the post step. Never fails; see [`CleanupOutcome`].
pub fn cleanup(inputs: &CleanupInputs) -> CleanupOutcome {
	match inputs.resolve() {
		Some(path) => cleanup::remove_settings_file(path),
		None => {
			obs_event!(debug, "No settings file recorded; nothing to clean up.");

			CleanupOutcome::Skipped
		},
	}
}
