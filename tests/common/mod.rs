//! Shared fixtures for integration tests: JWT minting, token bodies, and a scripted transport.

#![allow(dead_code)]

// std
use std::{
	collections::VecDeque,
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	pin::Pin,
	sync::Arc,
};
// crates.io
use jsonwebtoken::{EncodingKey, Header};
use parking_lot::Mutex;
use serde_json::{Value, json};
use time::OffsetDateTime;
// self
#[cfg(feature = "reqwest")] use oauth2_token_fetcher::http::ReqwestHttpClient;
use oauth2_token_fetcher::{
	auth::Credentials,
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	oauth::oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse},
};

pub const CLIENT_ID: &str = "PV2AvGcMjOFErV6QpaqKnfrUdt8yPuHI";
pub const CLIENT_SECRET: &str = "9oXvXvWHfQaaAiWr-wBfS5Vtyp3aGyMuwIwqYs2NuRtmV7-1XEXXNJ1ZA97jLo6J";
pub const TOKEN_PATH: &str = "/oauth/token";

/// HS256 JWT signed with a key the fetcher never sees.
pub fn jwt(payload: Value) -> String {
	jsonwebtoken::encode(&Header::default(), &payload, &EncodingKey::from_secret(b"issuer-key"))
		.expect("Test JWT should encode.")
}

/// JWT whose `exp` lies `seconds` from now (negative for already expired tokens).
pub fn jwt_expiring_in(seconds: i64) -> String {
	let exp = OffsetDateTime::now_utc().unix_timestamp() + seconds;

	jwt(json!({ "exp": exp, "sub": "svc@clients" }))
}

/// Token endpoint success body carrying `access_token`.
pub fn token_body(access_token: &str) -> String {
	json!({ "access_token": access_token, "token_type": "Bearer" }).to_string()
}

/// Reqwest transport that accepts the self-signed certificates `httpmock` serves.
#[cfg(feature = "reqwest")]
pub fn test_reqwest_http_client() -> ReqwestHttpClient {
	let client = oauth2_token_fetcher::reqwest::Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

pub fn credentials(token_endpoint: &str) -> Credentials {
	Credentials::new(token_endpoint, CLIENT_ID, CLIENT_SECRET)
		.expect("Test credentials should be valid.")
}

/// Failures the scripted transport can simulate.
#[derive(Debug)]
pub enum FakeTransportError {
	ConnectionRefused,
	BodyReset,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::ConnectionRefused => write!(f, "Connection refused."),
			Self::BodyReset => write!(f, "Body stream reset."),
		}
	}
}
impl StdError for FakeTransportError {}

/// One scripted reaction to a token request.
#[derive(Clone, Debug)]
pub enum Scripted {
	/// `200 OK` with a token body for the given access token.
	Token(String),
	/// Arbitrary status and raw body.
	Raw(u16, String),
	/// Fails before any response arrives.
	Refused,
	/// Response headers arrive with `status`, then the body stream fails.
	BodyReset(u16),
}

#[derive(Debug, Default)]
struct Script {
	responses: Mutex<VecDeque<Scripted>>,
	requests: Mutex<Vec<Value>>,
}

/// In-process transport replaying scripted responses and recording request bodies.
#[derive(Clone, Debug, Default)]
pub struct ScriptedHttpClient(Arc<Script>);
impl ScriptedHttpClient {
	pub fn new(responses: impl IntoIterator<Item = Scripted>) -> Self {
		let client = Self::default();

		client.0.responses.lock().extend(responses);

		client
	}

	pub fn tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Self {
		Self::new(tokens.into_iter().map(|token| Scripted::Token(token.to_owned())))
	}

	pub fn push(&self, response: Scripted) {
		self.0.responses.lock().push_back(response);
	}

	pub fn calls(&self) -> usize {
		self.0.requests.lock().len()
	}

	pub fn request_bodies(&self) -> Vec<Value> {
		self.0.requests.lock().clone()
	}
}
impl TokenHttpClient for ScriptedHttpClient {
	type Handle = ScriptedHandle;
	type TransportError = FakeTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		ScriptedHandle { script: self.0.clone(), slot }
	}
}

pub struct ScriptedHandle {
	script: Arc<Script>,
	slot: ResponseMetadataSlot,
}
impl<'c> AsyncHttpClient<'c> for ScriptedHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			assert!(
				self.slot.take().is_none(),
				"ResponseMetadataSlot must be clear before dispatching a request."
			);

			let body: Value = serde_json::from_slice(request.body())
				.expect("Token requests should carry a JSON body.");
			let next = {
				self.script.requests.lock().push(body);
				self.script.responses.lock().pop_front()
			};

			// Lets concurrent callers interleave while this request is "in flight".
			tokio::task::yield_now().await;

			match next.expect("Scripted transport ran out of responses.") {
				Scripted::Token(token) => Ok(self.respond(200, token_body(&token))),
				Scripted::Raw(status, body) => Ok(self.respond(status, body)),
				Scripted::Refused =>
					Err(HttpClientError::Reqwest(Box::new(FakeTransportError::ConnectionRefused))),
				Scripted::BodyReset(status) => {
					self.slot.store(ResponseMetadata { status: Some(status) });

					Err(HttpClientError::Reqwest(Box::new(FakeTransportError::BodyReset)))
				},
			}
		})
	}
}
impl ScriptedHandle {
	fn respond(&self, status: u16, body: String) -> HttpResponse {
		self.slot.store(ResponseMetadata { status: Some(status) });

		oauth2_token_fetcher::oauth::oauth2::http::Response::builder()
			.status(status)
			.body(body.into_bytes())
			.expect("Scripted response should build.")
	}
}
