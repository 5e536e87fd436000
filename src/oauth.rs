//! Client-credentials token exchange and failure classification.
//!
//! [`TokenAcquirer::fetch`] sends exactly one form-encoded `POST` to the token endpoint and
//! classifies the result:
//!
//! - non-success status → [`Error::OAuthServer`]
//! - request sent, no response → [`Error::OAuthNetwork`]
//! - request never dispatched → [`Error::OAuthRequest`]
//! - success without a usable `access_token` → [`Error::OAuthResponse`]
//!
//! There are no retries. A CI step that cannot obtain a token has nothing useful to do next.

pub use oauth2;

// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest,
	http::{
		HeaderValue, Method, Request,
		header::{ACCEPT, CONTENT_TYPE},
	},
};
use serde::Deserializer;
// self
use crate::{
	_prelude::*,
	auth::{Credential, TokenRequest},
	error::ResponseError,
	http::TokenHttpClient,
	obs::{Step, StepScope, obs_event},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_ACCEPT: &str = "application/json";

#[cfg(feature = "reqwest")]
/// Token acquirer specialized for the crate's default reqwest transport stack.
pub type ReqwestTokenAcquirer = TokenAcquirer<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a crate error.
	///
	/// Failures that happen before the request leaves the process must map to
	/// [`Error::OAuthRequest`]; everything else maps to [`Error::OAuthNetwork`].
	fn map_transport_error(&self, error: HttpClientError<E>) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(&self, err: HttpClientError<ReqwestError>) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(*inner),
			HttpClientError::Http(inner) => Error::request(inner),
			HttpClientError::Io(inner) => Error::network(inner),
			HttpClientError::Other(message) => Error::OAuthNetwork { source: message.into() },
			_ => Error::OAuthNetwork { source: "Unclassified HTTP client error.".into() },
		}
	}
}

/// Token endpoint payload.
///
/// Only `access_token` is load-bearing. `token_type` and `expires_in` are informational and
/// tolerated when absent; unknown fields are ignored.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TokenResponse {
	/// Issued bearer token.
	#[serde(default)]
	pub access_token: Option<Credential>,
	/// Token type hint (usually `Bearer`).
	#[serde(default)]
	pub token_type: Option<String>,
	/// Lifetime hint in seconds. Numeric strings are accepted; unparsable values become `None`.
	#[serde(default, deserialize_with = "lenient_seconds")]
	pub expires_in: Option<u64>,
}
impl TokenResponse {
	/// Parses a response body, reporting the JSON path of any structural failure.
	pub fn from_slice(body: &[u8]) -> Result<Self, ResponseError> {
		let de = &mut serde_json::Deserializer::from_slice(body);

		serde_path_to_error::deserialize(de).map_err(|source| ResponseError::Malformed { source })
	}

	/// Extracts the access token, treating an empty value as missing.
	pub fn into_credential(self) -> Result<Credential, ResponseError> {
		self.access_token.filter(|token| !token.is_empty()).ok_or(ResponseError::MissingAccessToken)
	}
}

/// Performs the OAuth 2.0 client-credentials exchange over a pluggable transport.
pub struct TokenAcquirer<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for the outbound request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
}
impl<C, M> TokenAcquirer<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an acquirer that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(http_client: impl Into<Arc<C>>, mapper: impl Into<Arc<M>>) -> Self {
		Self { http_client: http_client.into(), transport_mapper: mapper.into() }
	}

	/// Exchanges the client credentials for a bearer token.
	pub async fn fetch(&self, request: &TokenRequest) -> Result<Credential> {
		StepScope::open(Step::TokenFetch, "fetch").run_async(self.exchange(request)).await
	}

	async fn exchange(&self, request: &TokenRequest) -> Result<Credential> {
		let http_request = build_http_request(request)?;
		let handle = self.http_client.handle();

		obs_event!(
			debug,
			client_id = request.client_id(),
			scoped = request.scope().is_some(),
			"Dispatching token request."
		);

		let response = handle
			.call(http_request)
			.await
			.map_err(|err| self.transport_mapper.map_transport_error(err))?;
		let status = response.status();

		if !status.is_success() {
			obs_event!(warn, status = status.as_u16(), "Token endpoint rejected the request.");

			return Err(Error::OAuthServer {
				status: status.as_u16(),
				body: String::from_utf8_lossy(response.body()).into_owned(),
			});
		}

		let payload = TokenResponse::from_slice(response.body())?;
		#[cfg(feature = "tracing")]
		let (token_type, expires_in) = (payload.token_type.clone(), payload.expires_in);
		let token = payload.into_credential()?;

		obs_event!(
			info,
			token_type = token_type.as_deref().unwrap_or("unspecified"),
			expires_in,
			"Obtained OAuth access token."
		);

		Ok(token)
	}
}
#[cfg(feature = "reqwest")]
impl TokenAcquirer<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates an acquirer backed by a fresh reqwest client that does not follow redirects.
	pub fn new() -> Result<Self> {
		Ok(Self::with_http_client(ReqwestHttpClient::new()?, ReqwestTransportErrorMapper))
	}
}
impl<C, M> Debug for TokenAcquirer<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenAcquirer").finish_non_exhaustive()
	}
}

/// Builds the `POST` request for `request`, validating the endpoint URL first.
pub fn build_http_request(request: &TokenRequest) -> Result<HttpRequest> {
	let endpoint = Url::parse(request.endpoint()).map_err(Error::request)?;

	Request::builder()
		.method(Method::POST)
		.uri(endpoint.as_str())
		.header(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE))
		.header(ACCEPT, HeaderValue::from_static(JSON_ACCEPT))
		.body(request.form().encode().into_bytes())
		.map_err(Error::request)
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(err: ReqwestError) -> Error {
	if err.is_builder() { Error::request(err) } else { Error::network(err) }
}

fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
	D: Deserializer<'de>,
{
	use serde_json::Value;

	Ok(match Option::<Value>::deserialize(deserializer)? {
		Some(Value::Number(secs)) => secs.as_u64(),
		Some(Value::String(raw)) => raw.trim().parse().ok(),
		_ => None,
	})
}
