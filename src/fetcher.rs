//! Audience-keyed token fetcher: unconditional fetches plus expiry-aware caching.

mod cached;
mod metrics;

pub use metrics::*;

// self
use crate::{
	_prelude::*,
	auth::{Credentials, TokenSecret},
	http::TokenHttpClient,
	oauth::{self, TokenResponse},
	obs::{self, FetchKind, FetchOutcome, FetchSpan},
	store::{MemoryStore, TokenStore},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Boxed future returned by [`TokenSource`] methods.
pub type TokenFuture<'a> = Pin<Box<dyn Future<Output = Result<TokenSecret>> + 'a + Send>>;

#[cfg(feature = "reqwest")]
/// Fetcher specialized for the crate's default reqwest transport.
pub type ReqwestTokenFetcher = TokenFetcher<ReqwestHttpClient>;

/// Object-safe view of a token fetcher, so hosts can hold `Arc<dyn TokenSource>` and swap in
/// fakes under test.
pub trait TokenSource
where
	Self: Send + Sync,
{
	/// Requests a new token from the authorization server, bypassing the cache.
	fn fetch_new<'a>(&'a self, audience: &'a str) -> TokenFuture<'a>;

	/// Returns the cached token for `audience` while it is unexpired, refreshing it otherwise.
	fn fetch_cached<'a>(&'a self, audience: &'a str) -> TokenFuture<'a>;
}

/// Fetches client-credentials tokens from one authorization server and caches them per
/// audience.
///
/// The fetcher owns the credentials (immutable after construction), the injected transport,
/// the audience store, and one singleflight guard per audience so concurrent
/// [`fetch_cached`](TokenFetcher::fetch_cached) calls for the same audience share a single
/// refresh. Clones share the transport, store, guards, and metrics.
pub struct TokenFetcher<C>
where
	C: TokenHttpClient,
{
	http_client: Arc<C>,
	credentials: Credentials,
	store: Arc<dyn TokenStore>,
	expiry_margin: Duration,
	metrics: Arc<CacheMetrics>,
	refresh_guards: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}
impl<C> TokenFetcher<C>
where
	C: TokenHttpClient,
{
	/// Creates a fetcher that sends requests through `http_client` and caches tokens in a fresh
	/// [`MemoryStore`].
	pub fn with_http_client(http_client: impl Into<Arc<C>>, credentials: Credentials) -> Self {
		Self {
			http_client: http_client.into(),
			credentials,
			store: Arc::new(MemoryStore::default()),
			expiry_margin: Duration::ZERO,
			metrics: Default::default(),
			refresh_guards: Default::default(),
		}
	}

	/// Replaces the token store, e.g. to share one store between fetchers.
	pub fn with_store(mut self, store: Arc<dyn TokenStore>) -> Self {
		self.store = store;

		self
	}

	/// Treats cached tokens as expired `margin` before their `exp` claim (defaults to zero).
	///
	/// Negative margins are clamped to zero.
	pub fn with_expiry_margin(mut self, margin: Duration) -> Self {
		self.expiry_margin = if margin.is_negative() { Duration::ZERO } else { margin };

		self
	}

	/// Credentials used for every request.
	pub fn credentials(&self) -> &Credentials {
		&self.credentials
	}

	/// Grant type sent with every request; always `client_credentials`.
	pub fn grant_type(&self) -> &'static str {
		self.credentials.grant_type()
	}

	/// Transport used for token requests.
	pub fn http_client(&self) -> &Arc<C> {
		&self.http_client
	}

	/// Audience store backing [`fetch_cached`](TokenFetcher::fetch_cached).
	pub fn store(&self) -> &Arc<dyn TokenStore> {
		&self.store
	}

	/// Margin subtracted from `exp` when deciding whether a cached token is reusable.
	pub fn expiry_margin(&self) -> Duration {
		self.expiry_margin
	}

	/// Cache and request counters.
	pub fn metrics(&self) -> &CacheMetrics {
		&self.metrics
	}

	/// Requests a token for `audience` and returns the whole response.
	///
	/// Always contacts the authorization server and never touches the cache. Use
	/// [`TokenResponse::authorization_value`] to build an `Authorization` header.
	pub async fn request_token(&self, audience: &str) -> Result<TokenResponse> {
		const KIND: FetchKind = FetchKind::Fresh;

		let span = FetchSpan::new(KIND, "request_token", audience);

		obs::record_fetch_outcome(KIND, FetchOutcome::Attempt);

		let result = span.instrument(self.exchange(audience)).await;

		match &result {
			Ok(_) => obs::record_fetch_outcome(KIND, FetchOutcome::Success),
			Err(_) => obs::record_fetch_outcome(KIND, FetchOutcome::Failure),
		}

		result
	}

	/// Requests a new access token for `audience`, bypassing the cache.
	///
	/// The returned value is the raw `access_token`, without the `token_type` prefix. The cache
	/// is neither read nor written.
	pub async fn fetch_new(&self, audience: &str) -> Result<TokenSecret> {
		self.request_token(audience).await.map(|response| response.access_token)
	}

	async fn exchange(&self, audience: &str) -> Result<TokenResponse> {
		self.metrics.record_request();

		let result = oauth::exchange(self.http_client.as_ref(), &self.credentials, audience).await;

		if result.is_err() {
			self.metrics.record_failure();
		}

		result
	}
}
#[cfg(feature = "reqwest")]
impl TokenFetcher<ReqwestHttpClient> {
	/// Creates a fetcher backed by a reqwest client that does not follow redirects.
	///
	/// Use [`TokenFetcher::with_http_client`] with a custom [`ReqwestHttpClient`] to configure
	/// timeouts or TLS.
	pub fn new(credentials: Credentials) -> Result<Self> {
		Ok(Self::with_http_client(ReqwestHttpClient::new()?, credentials))
	}
}
impl<C> Clone for TokenFetcher<C>
where
	C: TokenHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			credentials: self.credentials.clone(),
			store: self.store.clone(),
			expiry_margin: self.expiry_margin,
			metrics: self.metrics.clone(),
			refresh_guards: self.refresh_guards.clone(),
		}
	}
}
impl<C> Debug for TokenFetcher<C>
where
	C: TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenFetcher")
			.field("credentials", &self.credentials)
			.field("expiry_margin", &self.expiry_margin)
			.field("metrics", &self.metrics)
			.finish()
	}
}
impl<C> TokenSource for TokenFetcher<C>
where
	C: TokenHttpClient,
{
	fn fetch_new<'a>(&'a self, audience: &'a str) -> TokenFuture<'a> {
		Box::pin(TokenFetcher::fetch_new(self, audience))
	}

	fn fetch_cached<'a>(&'a self, audience: &'a str) -> TokenFuture<'a> {
		Box::pin(TokenFetcher::fetch_cached(self, audience))
	}
}
