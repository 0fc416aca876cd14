//! Token endpoint wire contract and the single request/response exchange.
//!
//! The endpoint takes a JSON body rather than the RFC 6749 form encoding, so requests are
//! assembled here on top of the `oauth2` crate's HTTP types instead of its grant builders.

pub use oauth2;

// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
	http::{
		Method, Request,
		header::{ACCEPT, CONTENT_TYPE},
	},
};
// self
use crate::{
	_prelude::*,
	auth::{CLIENT_CREDENTIALS_GRANT, Credentials, TokenSecret},
	error::{ConfigError, ResponseError, TransportError},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
};

type ExchangeFuture<'a> = Pin<Box<dyn Future<Output = Result<TokenResponse>> + 'a + Send>>;

const APPLICATION_JSON: &str = "application/json";

/// Client-credentials grant body sent to the token endpoint.
#[derive(Clone, Serialize)]
pub struct TokenRequest<'a> {
	/// OAuth 2.0 client identifier.
	pub client_id: &'a str,
	/// OAuth 2.0 client secret.
	pub client_secret: &'a str,
	/// Resource the token is requested for; empty means no audience restriction.
	pub audience: &'a str,
	/// Always [`CLIENT_CREDENTIALS_GRANT`].
	pub grant_type: &'static str,
}
impl<'a> TokenRequest<'a> {
	/// Builds the grant body for `audience`, passing the value through verbatim.
	pub fn new(credentials: &'a Credentials, audience: &'a str) -> Self {
		Self {
			client_id: credentials.client_id(),
			client_secret: credentials.client_secret().expose(),
			audience,
			grant_type: CLIENT_CREDENTIALS_GRANT,
		}
	}
}
impl Debug for TokenRequest<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenRequest")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("audience", &self.audience)
			.field("grant_type", &self.grant_type)
			.finish()
	}
}

/// Successful token endpoint response. Fields other than these two are ignored.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
	/// Issued access token.
	pub access_token: TokenSecret,
	/// Token type (usually `Bearer`); empty when the server omits it.
	#[serde(default)]
	pub token_type: String,
}
impl TokenResponse {
	/// `Authorization` header value: `token_type`, a space, then the access token.
	pub fn authorization_value(&self) -> String {
		self.to_string()
	}
}
/// Renders the full `Authorization` header value, including the secret.
impl Display for TokenResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{} {}", self.token_type, self.access_token.expose())
	}
}

#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
	error: Option<String>,
	error_description: Option<String>,
}

/// Sends one client-credentials request for `audience` and decodes the response.
pub(crate) fn exchange<'a, C>(
	http_client: &'a C,
	credentials: &'a Credentials,
	audience: &'a str,
) -> ExchangeFuture<'a>
where
	C: TokenHttpClient,
{
	let meta = ResponseMetadataSlot::default();

	Box::pin(async move {
		let request = build_request(credentials, audience)?;
		let handle = http_client.with_metadata(meta.clone());
		let response =
			handle.call(request).await.map_err(|err| map_transport_error(meta.take(), err))?;

		parse_response(&response)
	})
}

pub(crate) fn build_request(credentials: &Credentials, audience: &str) -> Result<HttpRequest> {
	let body = serde_json::to_vec(&TokenRequest::new(credentials, audience))
		.map_err(ConfigError::from)?;
	let request = Request::builder()
		.method(Method::POST)
		.uri(credentials.token_endpoint().as_str())
		.header(CONTENT_TYPE, APPLICATION_JSON)
		.header(ACCEPT, APPLICATION_JSON)
		.body(body)
		.map_err(ConfigError::from)?;

	Ok(request)
}

pub(crate) fn parse_response(response: &HttpResponse) -> Result<TokenResponse> {
	let status = response.status();

	if !status.is_success() {
		let ErrorResponse { error, error_description } =
			serde_json::from_slice(response.body()).unwrap_or_default();

		return Err(ResponseError::Rejected {
			status: status.as_u16(),
			error,
			description: error_description,
		}
		.into());
	}

	let mut de = serde_json::Deserializer::from_slice(response.body());

	serde_path_to_error::deserialize(&mut de)
		.map_err(|source| ResponseError::Parse { source, status: status.as_u16() }.into())
}

/// Classifies a transport failure; a recorded status means the body stream broke.
pub(crate) fn map_transport_error<E>(
	meta: Option<ResponseMetadata>,
	err: HttpClientError<E>,
) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	let status = meta.and_then(|meta| meta.status);

	match err {
		HttpClientError::Reqwest(source) => match status {
			Some(status) => TransportError::ResponseRead { status, source }.into(),
			None => TransportError::Network { source }.into(),
		},
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => TransportError::Network { source: message.into() }.into(),
		_ => TransportError::Network { source: "Unknown transport failure.".into() }.into(),
	}
}
