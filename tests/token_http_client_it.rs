// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	pin::Pin,
	sync::Arc,
};
// crates.io
use parking_lot::Mutex;
// self
use maven_oauth_settings::{
	auth::TokenRequest,
	error::{Error, Result},
	http::TokenHttpClient,
	oauth::{
		TokenAcquirer, TransportErrorMapper,
		oauth2::{
			AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
			http::{
				HeaderName, StatusCode,
				header::{ACCEPT, CONTENT_TYPE},
			},
		},
	},
};

#[derive(Clone, Copy, Debug)]
enum FakeTransportError {
	ConnectionReset,
	InvalidHeader,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::ConnectionReset => write!(f, "Connection reset by peer."),
			Self::InvalidHeader => write!(f, "Invalid header value."),
		}
	}
}
impl StdError for FakeTransportError {}

#[derive(Clone, Copy)]
enum Reply {
	Respond(u16, &'static str),
	Fail(FakeTransportError),
}

#[derive(Clone, Debug)]
struct SeenRequest {
	method: String,
	content_type: Option<String>,
	accept: Option<String>,
	body: String,
}
impl From<&HttpRequest> for SeenRequest {
	fn from(request: &HttpRequest) -> Self {
		let header = |name: HeaderName| {
			request.headers().get(name).and_then(|value| value.to_str().ok()).map(str::to_owned)
		};

		Self {
			method: request.method().to_string(),
			content_type: header(CONTENT_TYPE),
			accept: header(ACCEPT),
			body: String::from_utf8_lossy(request.body()).into_owned(),
		}
	}
}

#[derive(Clone)]
struct FakeHttpClient {
	reply: Reply,
	seen: Arc<Mutex<Vec<SeenRequest>>>,
}
impl FakeHttpClient {
	fn new(reply: Reply) -> Self {
		Self { reply, seen: Default::default() }
	}

	fn requests(&self) -> Vec<SeenRequest> {
		self.seen.lock().clone()
	}
}
impl TokenHttpClient for FakeHttpClient {
	type Handle = FakeHttpHandle;
	type TransportError = FakeTransportError;

	fn handle(&self) -> Self::Handle {
		FakeHttpHandle { reply: self.reply, seen: self.seen.clone() }
	}
}

struct FakeHttpHandle {
	reply: Reply,
	seen: Arc<Mutex<Vec<SeenRequest>>>,
}
impl<'a> AsyncHttpClient<'a> for FakeHttpHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, request: HttpRequest) -> Self::Future {
		let reply = self.reply;

		self.seen.lock().push(SeenRequest::from(&request));

		Box::pin(async move {
			match reply {
				Reply::Respond(status, body) => {
					let mut response = HttpResponse::new(body.as_bytes().to_vec());

					*response.status_mut() =
						StatusCode::from_u16(status).expect("Fake status code should be valid.");

					Ok(response)
				},
				Reply::Fail(err) => Err(HttpClientError::Reqwest(Box::new(err))),
			}
		})
	}
}

#[derive(Clone, Default)]
struct FakeTransportErrorMapper;
impl TransportErrorMapper<FakeTransportError> for FakeTransportErrorMapper {
	fn map_transport_error(&self, err: HttpClientError<FakeTransportError>) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => match *inner {
				FakeTransportError::InvalidHeader => Error::request(*inner),
				FakeTransportError::ConnectionReset => Error::network(*inner),
			},
			HttpClientError::Http(inner) => Error::request(inner),
			other => Error::network(std::io::Error::other(format!("{other:?}"))),
		}
	}
}

fn acquirer(client: FakeHttpClient) -> TokenAcquirer<FakeHttpClient, FakeTransportErrorMapper> {
	TokenAcquirer::with_http_client(client, FakeTransportErrorMapper)
}

fn request() -> TokenRequest {
	TokenRequest::new("https://oauth.example.com/token", "client-id", "client-secret")
		.with_scope("read write")
}

#[tokio::test]
async fn fake_transport_receives_a_single_form_post() {
	let client = FakeHttpClient::new(Reply::Respond(200, "{\"access_token\":\"fake-token\"}"));
	let token = acquirer(client.clone())
		.fetch(&request())
		.await
		.expect("Fake exchange should succeed.");
	let seen = client.requests();

	assert_eq!(token.expose(), "fake-token");
	assert_eq!(seen.len(), 1, "Exactly one request must be dispatched.");

	let sent = &seen[0];

	assert_eq!(sent.method, "POST");
	assert_eq!(sent.content_type.as_deref(), Some("application/x-www-form-urlencoded"));
	assert_eq!(sent.accept.as_deref(), Some("application/json"));
	assert_eq!(
		sent.body,
		"grant_type=client_credentials&client_id=client-id&client_secret=client-secret&scope=read+write"
	);
}

#[tokio::test]
async fn fake_server_error_carries_status_and_body() {
	let client = FakeHttpClient::new(Reply::Respond(503, "upstream unavailable"));
	let err = acquirer(client.clone())
		.fetch(&request())
		.await
		.expect_err("A 503 response must fail the exchange.");

	match err {
		Error::OAuthServer { status, body } => {
			assert_eq!(status, 503);
			assert_eq!(body, "upstream unavailable");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	assert_eq!(client.requests().len(), 1, "Failures must not be retried.");
}

#[tokio::test]
async fn mapper_classifies_transport_failures() {
	let reset = acquirer(FakeHttpClient::new(Reply::Fail(FakeTransportError::ConnectionReset)))
		.fetch(&request())
		.await
		.expect_err("Connection resets must fail the exchange.");
	let invalid = acquirer(FakeHttpClient::new(Reply::Fail(FakeTransportError::InvalidHeader)))
		.fetch(&request())
		.await
		.expect_err("Invalid requests must fail the exchange.");

	assert_eq!(reset.to_string(), "No response received from OAuth server");
	assert!(matches!(invalid, Error::OAuthRequest { .. }));
	assert_eq!(invalid.to_string(), "Error making OAuth request: Invalid header value.");
}
