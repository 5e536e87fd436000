//! Step inputs read from CLI flags or the runner's `INPUT_*` environment variables.

// self
use crate::{
	_prelude::*,
	auth::{ClientSecret, TokenRequest},
	error::ConfigError,
};

/// Default settings file location when none is supplied.
pub const DEFAULT_SETTINGS_PATH: &str = ".m2/settings.xml";

/// Raw inputs for the main step.
///
/// Every field is optional at parse time because the runner exports unset inputs as empty
/// variables; [`Inputs::resolve`] trims values and reports blank required inputs.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct Inputs {
	/// OAuth 2.0 token endpoint URL.
	#[cfg_attr(feature = "cli", arg(long, env = "INPUT_OAUTH-URL"))]
	pub oauth_url: Option<String>,
	/// OAuth client identifier.
	#[cfg_attr(feature = "cli", arg(long, env = "INPUT_CLIENT-ID"))]
	pub client_id: Option<String>,
	/// OAuth client secret.
	#[cfg_attr(feature = "cli", arg(long, env = "INPUT_CLIENT-SECRET", hide_env_values = true))]
	pub client_secret: Option<ClientSecret>,
	/// Space-delimited OAuth scope; omitted from the request when blank.
	#[cfg_attr(feature = "cli", arg(long, env = "INPUT_SCOPE"))]
	pub scope: Option<String>,
	/// Maven server id the credential is registered under.
	#[cfg_attr(feature = "cli", arg(long, env = "INPUT_SERVER-ID"))]
	pub server_id: Option<String>,
	/// Where to write the settings file.
	#[cfg_attr(
		feature = "cli",
		arg(long, env = "INPUT_MAVEN-SETTINGS-PATH", value_parser = blank_tolerant_path)
	)]
	pub maven_settings_path: Option<PathBuf>,
}
impl Inputs {
	/// Validates the inputs and splits them into the pieces each step needs.
	pub fn resolve(&self) -> Result<ResolvedInputs> {
		let endpoint = required("oauth-url", self.oauth_url.as_deref())?;
		let client_id = required("client-id", self.client_id.as_deref())?;
		let client_secret = required(
			"client-secret",
			self.client_secret.as_ref().map(ClientSecret::expose),
		)?;
		let server_id = required("server-id", self.server_id.as_deref())?;
		let settings_path = self
			.maven_settings_path
			.clone()
			.filter(|path| !is_blank(path))
			.unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH));
		let request = TokenRequest::new(endpoint, client_id, client_secret)
			.with_optional_scope(self.scope.as_deref().map(str::trim).map(str::to_owned));

		Ok(ResolvedInputs { request, server_id: server_id.to_owned(), settings_path })
	}
}

/// Validated inputs ready for the token exchange and the settings writer.
#[derive(Clone, Debug)]
pub struct ResolvedInputs {
	/// Token request built from the endpoint, client credentials and scope.
	pub request: TokenRequest,
	/// Server id embedded in the settings document.
	pub server_id: String,
	/// Target settings path.
	pub settings_path: PathBuf,
}

/// Inputs for the post step.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct CleanupInputs {
	/// Settings path recorded by the main step.
	#[cfg_attr(
		feature = "cli",
		arg(long, env = "STATE_settings-file", value_parser = blank_tolerant_path)
	)]
	pub settings_file: Option<PathBuf>,
	/// Configured settings path, used when no state was recorded.
	#[cfg_attr(
		feature = "cli",
		arg(long, env = "INPUT_MAVEN-SETTINGS-PATH", value_parser = blank_tolerant_path)
	)]
	pub maven_settings_path: Option<PathBuf>,
}
impl CleanupInputs {
	/// Returns the path to remove, preferring the recorded state.
	pub fn resolve(&self) -> Option<&Path> {
		[&self.settings_file, &self.maven_settings_path]
			.into_iter()
			.flatten()
			.map(PathBuf::as_path)
			.find(|path| !is_blank(path))
	}
}

// The runner exports unset inputs and state as empty variables, which clap's stock `PathBuf`
// parser rejects. Blank values are kept here and dropped by `resolve`.
#[cfg(feature = "cli")]
fn blank_tolerant_path(raw: &str) -> Result<PathBuf, std::convert::Infallible> {
	Ok(PathBuf::from(raw))
}

fn is_blank(path: &Path) -> bool {
	path.as_os_str().to_string_lossy().trim().is_empty()
}

fn required<'a>(name: &'static str, value: Option<&'a str>) -> Result<&'a str> {
	value
		.map(str::trim)
		.filter(|value| !value.is_empty())
		.ok_or_else(|| ConfigError::MissingInput { name }.into())
}
