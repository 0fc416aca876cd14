//! Immutable client-credentials identity used for every token request.

// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// OAuth 2.0 grant type sent with every token request.
pub const CLIENT_CREDENTIALS_GRANT: &str = "client_credentials";

/// Client identity and token endpoint owned by a fetcher.
///
/// Values are fixed at construction; the grant type is not stored because it is always
/// [`CLIENT_CREDENTIALS_GRANT`]. The struct deserializes from host configuration:
///
/// ```json
/// { "token_endpoint": "https://tenant.example.com/oauth/token",
///   "client_id": "svc-router", "client_secret": "..." }
/// ```
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
	token_endpoint: Url,
	client_id: String,
	client_secret: TokenSecret,
}
impl Credentials {
	/// Parses `token_endpoint` and captures the client identity.
	pub fn new(
		token_endpoint: &str,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Result<Self> {
		let token_endpoint = Url::parse(token_endpoint)
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;

		Ok(Self::from_parts(token_endpoint, client_id, client_secret))
	}

	/// Captures the client identity for an already parsed endpoint.
	pub fn from_parts(
		token_endpoint: Url,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		Self {
			token_endpoint,
			client_id: client_id.into(),
			client_secret: TokenSecret::new(client_secret),
		}
	}

	/// Token endpoint receiving the grant requests.
	pub fn token_endpoint(&self) -> &Url {
		&self.token_endpoint
	}

	/// OAuth 2.0 client identifier.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// OAuth 2.0 client secret.
	pub fn client_secret(&self) -> &TokenSecret {
		&self.client_secret
	}

	/// Grant type sent with every request.
	pub const fn grant_type(&self) -> &'static str {
		CLIENT_CREDENTIALS_GRANT
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("token_endpoint", &self.token_endpoint.as_str())
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const CLIENT_ID: &str = "PV2AvGcMjOFErV6QpaqKnfrUdt8yPuHI";
	const CLIENT_SECRET: &str = "9oXvXvWHfQaaAiWr-wBfS5Vtyp3aGyMuwIwqYs2NuRtmV7-1XEXXNJ1ZA97jLo6J";
	const TOKEN_ENDPOINT: &str = "https://yourcompany.auth0.com/oauth/token";

	#[test]
	fn credentials_expose_construction_values() {
		let credentials = Credentials::new(TOKEN_ENDPOINT, CLIENT_ID, CLIENT_SECRET)
			.expect("Credentials fixture should be valid.");

		assert_eq!(credentials.client_id(), CLIENT_ID);
		assert_eq!(credentials.client_secret().expose(), CLIENT_SECRET);
		assert_eq!(credentials.token_endpoint().as_str(), TOKEN_ENDPOINT);
		assert_eq!(credentials.grant_type(), "client_credentials");
	}

	#[test]
	fn credentials_reject_unparseable_endpoint() {
		let err = Credentials::new("not a url", CLIENT_ID, CLIENT_SECRET)
			.expect_err("Relative endpoints should be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::InvalidEndpoint { .. })));
	}

	#[test]
	fn credentials_debug_redacts_secret() {
		let credentials = Credentials::new(TOKEN_ENDPOINT, CLIENT_ID, CLIENT_SECRET)
			.expect("Credentials fixture should be valid.");
		let rendered = format!("{credentials:?}");

		assert!(rendered.contains(CLIENT_ID));
		assert!(!rendered.contains(CLIENT_SECRET));
	}

	#[test]
	fn credentials_load_from_config_json() {
		let credentials: Credentials = serde_json::from_str(
			r#"{"token_endpoint":"https://auth.example.com/oauth/token","client_id":"svc","client_secret":"shh"}"#,
		)
		.expect("Credentials should deserialize from config JSON.");

		assert_eq!(credentials.token_endpoint().host_str(), Some("auth.example.com"));
		assert_eq!(credentials.client_secret().expose(), "shh");
	}
}
