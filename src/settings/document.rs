//! Maven `settings.xml` rendering and structural parsing.

// std
use std::borrow::Cow;
// self
use crate::{_prelude::*, auth::Credential};

/// Maven settings 1.0.0 namespace.
pub const SETTINGS_NAMESPACE: &str = "http://maven.apache.org/SETTINGS/1.0.0";
/// Header name carrying the bearer token.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

const SCHEMA_LOCATION: &str =
	"http://maven.apache.org/SETTINGS/1.0.0 https://maven.apache.org/xsd/settings-1.0.0.xsd";
const BEARER_PREFIX: &str = "Bearer ";

/// Errors raised when rendering a settings document or reading one back.
#[derive(Debug, ThisError)]
pub enum DocumentError {
	/// A value carries a character that XML 1.0 cannot represent, even escaped.
	#[error(
		"Settings {field} contains U+{:04X}, which is not allowed in XML.",
		u32::from(*.character)
	)]
	InvalidCharacter {
		/// Which value was rejected (`server id` or `token`).
		field: &'static str,
		/// The first offending character.
		character: char,
	},
	/// The document is not well-formed or does not match the settings grammar.
	#[error("Settings document is not valid XML.")]
	Xml(#[from] serde_xml_rs::Error),
	/// The document does not contain exactly one server entry.
	#[error("Settings document must contain exactly one server, found {found}.")]
	ServerCount {
		/// Number of `<server>` entries found.
		found: usize,
	},
	/// The server entry has no `Authorization` bearer header.
	#[error("Server `{server_id}` has no Authorization bearer header.")]
	MissingBearer {
		/// Identifier of the offending server.
		server_id: String,
	},
}

/// A settings document holding a single server entry with a bearer header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettingsDocument {
	server_id: String,
	token: Credential,
}
impl SettingsDocument {
	/// Creates a document for `server_id` authenticated with `token`.
	pub fn new(server_id: impl Into<String>, token: Credential) -> Self {
		Self { server_id: server_id.into(), token }
	}

	/// Server identifier matched by the build tool against repository ids.
	pub fn server_id(&self) -> &str {
		&self.server_id
	}

	/// Bearer token embedded in the header value.
	pub fn token(&self) -> &Credential {
		&self.token
	}

	/// Renders the document as UTF-8 XML, escaping the server id and token.
	///
	/// Fails with [`DocumentError::InvalidCharacter`] when either value holds a character outside
	/// the XML 1.0 `Char` production, since no escaping can make such a document well-formed.
	pub fn render(&self) -> Result<String, DocumentError> {
		ensure_xml_chars("server id", &self.server_id)?;
		ensure_xml_chars("token", self.token.expose())?;

		let id = escape_text(&self.server_id);
		let header = escape_text(AUTHORIZATION_HEADER);
		let value = escape_text(&self.token.bearer_header()).into_owned();

		Ok(format!(
			r#"<?xml version="1.0" encoding="UTF-8"?>
<settings xmlns="{SETTINGS_NAMESPACE}"
          xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
          xsi:schemaLocation="{SCHEMA_LOCATION}">
  <servers>
    <server>
      <id>{id}</id>
      <configuration>
        <httpHeaders>
          <property>
            <name>{header}</name>
            <value>{value}</value>
          </property>
        </httpHeaders>
      </configuration>
    </server>
  </servers>
</settings>
"#
		))
	}

	/// Parses a rendered document back into its server id and token.
	///
	/// The XML reader trims leading and trailing whitespace from text nodes, so a server id or
	/// token with surrounding whitespace comes back trimmed. The rendered file itself keeps the
	/// value byte for byte.
	pub fn parse(xml: &str) -> Result<Self, DocumentError> {
		let settings: SettingsXml = serde_xml_rs::from_str(xml)?;
		let mut servers = settings.servers.server;

		if servers.len() != 1 {
			return Err(DocumentError::ServerCount { found: servers.len() });
		}

		let server = servers.remove(0);
		let token = server
			.configuration
			.http_headers
			.property
			.into_iter()
			.find(|property| property.name.eq_ignore_ascii_case(AUTHORIZATION_HEADER))
			.and_then(|property| property.value.strip_prefix(BEARER_PREFIX).map(Credential::from));

		match token {
			Some(token) => Ok(Self { server_id: server.id, token }),
			None => Err(DocumentError::MissingBearer { server_id: server.id }),
		}
	}
}

#[derive(Deserialize)]
struct SettingsXml {
	#[serde(default)]
	servers: ServersXml,
}

#[derive(Default, Deserialize)]
struct ServersXml {
	#[serde(default)]
	server: Vec<ServerXml>,
}

#[derive(Deserialize)]
struct ServerXml {
	id: String,
	#[serde(default)]
	configuration: ConfigurationXml,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigurationXml {
	#[serde(default)]
	http_headers: HttpHeadersXml,
}

#[derive(Default, Deserialize)]
struct HttpHeadersXml {
	#[serde(default)]
	property: Vec<PropertyXml>,
}

#[derive(Deserialize)]
struct PropertyXml {
	name: String,
	value: String,
}

fn ensure_xml_chars(field: &'static str, value: &str) -> Result<(), DocumentError> {
	match value.chars().find(|&c| !is_xml_char(c)) {
		Some(character) => Err(DocumentError::InvalidCharacter { field, character }),
		None => Ok(()),
	}
}

fn is_xml_char(c: char) -> bool {
	matches!(
		c,
		'\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
	)
}

/// Escapes XML character data so arbitrary ids and tokens cannot break out of their element.
pub fn escape_text(raw: &str) -> Cow<'_, str> {
	if !raw.contains(['&', '<', '>', '"', '\'']) {
		return Cow::Borrowed(raw);
	}

	let mut escaped = String::with_capacity(raw.len() + 16);

	for c in raw.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&apos;"),
			c => escaped.push(c),
		}
	}

	Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn render_embeds_id_and_bearer_value() {
		let xml = SettingsDocument::new("test-server", Credential::new("test-token-123"))
			.render()
			.expect("Document should render.");

		assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
		assert!(xml.contains("<id>test-server</id>"));
		assert!(xml.contains("<name>Authorization</name>"));
		assert!(xml.contains("<value>Bearer test-token-123</value>"));
		assert_eq!(xml.matches("<server>").count(), 1);
	}

	#[test]
	fn escape_text_covers_markup_characters() {
		assert_eq!(escape_text("plain-id_1.2"), "plain-id_1.2");
		assert!(matches!(escape_text("plain"), Cow::Borrowed(_)));
		assert_eq!(escape_text(r#"a&b<c>"d'"#), "a&amp;b&lt;c&gt;&quot;d&apos;");
	}

	#[test]
	fn adversarial_server_id_cannot_inject_markup() {
		let id = "evil</id><id>injected";
		let xml =
			SettingsDocument::new(id, Credential::new("tok")).render().expect("Document should render.");

		assert!(!xml.contains("<id>injected"));
		assert!(xml.contains("<id>evil&lt;/id&gt;&lt;id&gt;injected</id>"));
	}

	#[test]
	fn parse_round_trips_escaped_values() {
		let original = SettingsDocument::new(
			"repo & <mirror>",
			Credential::new("eyJhbGciOi.J9&x<y>\"'.sig=="),
		);
		let xml = original.render().expect("Document should render.");
		let parsed = SettingsDocument::parse(&xml)
			.expect("Rendered settings document should parse.");

		assert_eq!(parsed.server_id(), "repo & <mirror>");
		assert_eq!(parsed.token().expose(), "eyJhbGciOi.J9&x<y>\"'.sig==");
		assert_eq!(parsed, original);
	}

	#[test]
	fn render_rejects_characters_xml_cannot_carry() {
		let err = SettingsDocument::new("repo\u{1}x", Credential::new("tok"))
			.render()
			.expect_err("Control characters in the server id must be rejected.");

		assert!(matches!(
			err,
			DocumentError::InvalidCharacter { field: "server id", character: '\u{1}' }
		));
		assert_eq!(
			err.to_string(),
			"Settings server id contains U+0001, which is not allowed in XML."
		);

		let err = SettingsDocument::new("repo", Credential::new("tok\u{FFFE}"))
			.render()
			.expect_err("Non-characters in the token must be rejected.");

		assert!(matches!(err, DocumentError::InvalidCharacter { field: "token", .. }));
	}

	#[test]
	fn render_keeps_whitespace_control_characters() {
		let document = SettingsDocument::new("repo\tid", Credential::new("tok"));
		let xml = document.render().expect("Tabs are valid XML characters.");

		assert!(xml.contains("<id>repo\tid</id>"));
		assert!(SettingsDocument::parse(&xml).is_ok());
	}

	#[test]
	fn parse_trims_surrounding_whitespace() {
		let xml = SettingsDocument::new("repo", Credential::new(" tok "))
			.render()
			.expect("Document should render.");

		assert!(xml.contains("<value>Bearer  tok </value>"));

		let parsed = SettingsDocument::parse(&xml).expect("Rendered settings should parse.");

		assert_eq!(parsed.token().expose(), " tok");
	}

	#[test]
	fn parse_rejects_documents_without_bearer_header() {
		let xml = r#"<settings><servers><server><id>bare</id></server></servers></settings>"#;
		let err = SettingsDocument::parse(xml).expect_err("Missing bearer headers must be rejected.");

		assert!(matches!(err, DocumentError::MissingBearer { ref server_id } if server_id == "bare"));
	}

	#[test]
	fn parse_rejects_empty_server_list() {
		let err = SettingsDocument::parse("<settings></settings>")
			.expect_err("Documents without servers must be rejected.");

		assert!(matches!(err, DocumentError::ServerCount { found: 0 }));
	}
}
