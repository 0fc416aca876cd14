//! Demonstrates fetching and caching an audience-scoped client-credentials token with the
//! default reqwest transport against a mock authorization server.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use jsonwebtoken::{EncodingKey, Header};
use serde_json::json;
use time::OffsetDateTime;
// self
use oauth2_token_fetcher::{
	auth::Credentials,
	fetcher::ReqwestTokenFetcher,
	http::ReqwestHttpClient,
	reqwest::Client,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let exp = OffsetDateTime::now_utc().unix_timestamp() + 900;
	let access_token = jsonwebtoken::encode(
		&Header::default(),
		&json!({ "exp": exp, "sub": "demo-client@clients" }),
		&EncodingKey::from_secret(b"demo-issuer-key"),
	)?;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token").header("content-type", "application/json");
			then.status(200).header("content-type", "application/json").body(format!(
				"{{\"access_token\":\"{access_token}\",\"token_type\":\"Bearer\"}}"
			));
		})
		.await;
	let credentials = Credentials::new(&server.url("/oauth/token"), "demo-client", "super-secret")?;
	let http_client = ReqwestHttpClient::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.timeout(std::time::Duration::from_secs(10))
			.build()?,
	);
	let fetcher = ReqwestTokenFetcher::with_http_client(http_client, credentials);
	let first = fetcher.fetch_cached("https://orders.example.com").await?;
	let second = fetcher.fetch_cached("https://orders.example.com").await?;

	assert_eq!(first, second);
	println!(
		"Reused cached token for {} call(s); endpoint contacted {} time(s).",
		fetcher.metrics().hits(),
		fetcher.metrics().requests()
	);

	token_mock.assert_async().await;

	Ok(())
}
