//! Client-credentials request model and its form-encoded body builder.

// crates.io
use url::form_urlencoded;
// self
use crate::{_prelude::*, auth::ClientSecret};

/// Grant type sent with every token request.
pub const CLIENT_CREDENTIALS_GRANT: &str = "client_credentials";

/// Immutable description of a single client-credentials exchange.
///
/// Built once from external configuration. An empty or whitespace-only scope is normalized to
/// `None` so the form never carries `scope=`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenRequest {
	endpoint: String,
	client_id: String,
	client_secret: ClientSecret,
	scope: Option<String>,
}
impl TokenRequest {
	/// Creates a request without a scope.
	pub fn new(
		endpoint: impl Into<String>,
		client_id: impl Into<String>,
		client_secret: impl Into<ClientSecret>,
	) -> Self {
		Self {
			endpoint: endpoint.into(),
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			scope: None,
		}
	}

	/// Sets the requested scope; blank values clear it.
	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		let scope = scope.into();

		self.scope = if scope.trim().is_empty() { None } else { Some(scope) };

		self
	}

	/// Overrides the scope with an optional value.
	pub fn with_optional_scope(self, scope: Option<String>) -> Self {
		match scope {
			Some(scope) => self.with_scope(scope),
			None => Self { scope: None, ..self },
		}
	}

	/// Token endpoint URL as supplied by configuration (not yet validated).
	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	/// OAuth client identifier.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// OAuth client secret.
	pub fn client_secret(&self) -> &ClientSecret {
		&self.client_secret
	}

	/// Requested scope, if any.
	pub fn scope(&self) -> Option<&str> {
		self.scope.as_deref()
	}

	/// Builds the ordered form body for this request.
	pub fn form(&self) -> TokenForm {
		TokenForm::default()
			.push("grant_type", CLIENT_CREDENTIALS_GRANT)
			.push("client_id", self.client_id.as_str())
			.push("client_secret", self.client_secret.expose())
			.push_non_empty("scope", self.scope())
	}
}

/// Ordered key/value builder for `application/x-www-form-urlencoded` bodies.
///
/// Fields are encoded in insertion order. Use [`push_non_empty`](Self::push_non_empty) for
/// optional fields so omission stays explicit at the call site.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TokenForm(Vec<(&'static str, String)>);
impl TokenForm {
	/// Appends a field.
	pub fn push(mut self, key: &'static str, value: impl Into<String>) -> Self {
		self.0.push((key, value.into()));

		self
	}

	/// Appends a field only when `value` is present and not blank.
	pub fn push_non_empty(self, key: &'static str, value: Option<&str>) -> Self {
		match value.filter(|value| !value.trim().is_empty()) {
			Some(value) => self.push(key, value),
			None => self,
		}
	}

	/// Returns the first value recorded for `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.iter().find(|(name, _)| *name == key).map(|(_, value)| value.as_str())
	}

	/// Iterator over field names in encoding order.
	pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.0.iter().map(|(name, _)| *name)
	}

	/// Serializes the fields as a URL-encoded form body.
	pub fn encode(&self) -> String {
		form_urlencoded::Serializer::new(String::new())
			.extend_pairs(self.0.iter().map(|(name, value)| (*name, value.as_str())))
			.finish()
	}
}
impl Debug for TokenForm {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let mut map = f.debug_map();

		for (name, value) in &self.0 {
			if *name == "client_secret" {
				map.entry(name, &"<redacted>");
			} else {
				map.entry(name, value);
			}
		}

		map.finish()
	}
}
