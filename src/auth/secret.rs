//! Secret wrappers that redact sensitive material from `Debug` and `Display`.

// self
use crate::_prelude::*;

macro_rules! redacted_secret {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(String);
		impl $name {
			/// Wraps a new secret string.
			pub fn new(value: impl Into<String>) -> Self {
				Self(value.into())
			}

			/// Returns the inner value. Callers must avoid logging this string.
			pub fn expose(&self) -> &str {
				&self.0
			}

			/// Returns true when the wrapped value is empty.
			pub fn is_empty(&self) -> bool {
				self.0.is_empty()
			}
		}
		impl From<String> for $name {
			fn from(value: String) -> Self {
				Self(value)
			}
		}
		impl From<&str> for $name {
			fn from(value: &str) -> Self {
				Self(value.to_owned())
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.debug_tuple(stringify!($name)).field(&"<redacted>").finish()
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str("<redacted>")
			}
		}
	};
}

redacted_secret! {
	/// Bearer token issued by the token endpoint.
	///
	/// Owned by the caller for a single run and handed to the settings writer exactly once.
	Credential
}
impl Credential {
	/// Formats the value of an `Authorization` header carrying this token.
	pub fn bearer_header(&self) -> String {
		format!("Bearer {}", self.0)
	}
}

redacted_secret! {
	/// OAuth client secret supplied by the invoking environment.
	ClientSecret
}
