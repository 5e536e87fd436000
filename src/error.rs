//! Error taxonomy shared by the token exchange, the settings writer, and the step runner.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Every variant is fatal for a run. Cleanup failures never surface here; see
/// [`crate::cleanup::CleanupOutcome`].
#[derive(Debug, ThisError)]
pub enum Error {
	/// Token endpoint answered with a non-success HTTP status.
	#[error("OAuth request failed with status {status}")]
	OAuthServer {
		/// HTTP status code returned by the token endpoint.
		status: u16,
		/// Raw response body, decoded lossily as UTF-8.
		body: String,
	},
	/// Request was dispatched but no response came back (connect, DNS, reset, timeout).
	#[error("No response received from OAuth server")]
	OAuthNetwork {
		/// Transport-specific failure.
		#[source]
		source: BoxError,
	},
	/// Request could not be constructed or dispatched (e.g., malformed endpoint).
	#[error("Error making OAuth request: {source}")]
	OAuthRequest {
		/// Underlying construction failure.
		#[source]
		source: BoxError,
	},
	/// Token endpoint answered successfully but the payload is unusable.
	#[error(transparent)]
	OAuthResponse(#[from] ResponseError),
	/// Directory creation or file write failed.
	#[error("Failed to {action} {}", .path.display())]
	Filesystem {
		/// Operation that failed, phrased as a verb (`create directory`, `write`, ...).
		action: &'static str,
		/// Path the operation targeted.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Settings document cannot be rendered as well-formed XML.
	#[error(transparent)]
	Settings(#[from] crate::settings::DocumentError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}
impl Error {
	/// Wraps a transport failure that happened after the request was sent.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::OAuthNetwork { source: Box::new(src) }
	}

	/// Wraps a failure that prevented the request from being dispatched.
	pub fn request(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::OAuthRequest { source: Box::new(src) }
	}

	/// Builds a [`Error::Filesystem`] for `path`.
	pub fn filesystem(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		Self::Filesystem { action, path: path.into(), source }
	}
}

/// Failures decoding a successful token endpoint response.
#[derive(Debug, ThisError)]
pub enum ResponseError {
	/// Payload parsed but carried no usable `access_token`.
	#[error("OAuth response missing access_token")]
	MissingAccessToken,
	/// Payload is not a JSON object matching the token response shape.
	#[error("OAuth response is not valid JSON")]
	Malformed {
		/// Structured parsing failure, including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Configuration and validation failures raised before any network traffic.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A required input was absent or blank.
	#[error("Input required and not supplied: {name}")]
	MissingInput {
		/// Input name as exposed to the invoking environment.
		name: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn messages_match_the_published_wording() {
		let server = Error::OAuthServer { status: 401, body: "{\"error\":\"invalid_client\"}".into() };
		let network = Error::network(std::io::Error::other("connection reset"));

		assert_eq!(server.to_string(), "OAuth request failed with status 401");
		assert_eq!(network.to_string(), "No response received from OAuth server");
		assert_eq!(
			Error::from(ResponseError::MissingAccessToken).to_string(),
			"OAuth response missing access_token"
		);
	}

	#[test]
	fn request_and_filesystem_errors_carry_their_cause() {
		let request = Error::request(std::io::Error::other("relative URL without a base"));
		let fs = Error::filesystem(
			"create directory",
			"/nope/.m2",
			std::io::Error::from(std::io::ErrorKind::PermissionDenied),
		);

		assert_eq!(request.to_string(), "Error making OAuth request: relative URL without a base");
		assert!(fs.to_string().starts_with("Failed to create directory /nope/.m2"));
		assert!(fs.source().is_some());
	}
}
