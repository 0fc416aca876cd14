//! Cache-aware fetch with per-audience singleflight guards.
//!
//! A stored token is reused only while its unverified `exp` claim lies in the future. Tokens
//! that cannot be parsed are treated exactly like missing ones: the parse error is logged and
//! discarded, and the token is refreshed. A failed refresh leaves the previous entry in place.

// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, UnverifiedClaims},
	fetcher::TokenFetcher,
	http::TokenHttpClient,
	obs::{self, CacheDecision, FetchKind, FetchOutcome, FetchSpan},
	store::TokenStore,
};

impl<C> TokenFetcher<C>
where
	C: TokenHttpClient,
{
	/// Returns a token for `audience`, reusing the stored one while it is unexpired.
	///
	/// Concurrent callers for the same audience wait on one refresh instead of each contacting
	/// the authorization server. Errors from the refresh are propagated unchanged.
	pub async fn fetch_cached(&self, audience: &str) -> Result<TokenSecret> {
		const KIND: FetchKind = FetchKind::Cached;

		let span = FetchSpan::new(KIND, "fetch_cached", audience);

		obs::record_fetch_outcome(KIND, FetchOutcome::Attempt);

		let result = span
			.instrument(async move {
				let guard = self.refresh_guard(audience);
				let _singleflight = guard.lock().await;

				if let Some(token) = self.reusable_token(audience, OffsetDateTime::now_utc()) {
					self.metrics.record_hit();

					return Ok((token, FetchOutcome::Hit));
				}

				self.metrics.record_miss();

				let response = self.exchange(audience).await?;

				self.store.put(audience, response.access_token.clone());

				Ok::<_, Error>((response.access_token, FetchOutcome::Success))
			})
			.await;

		// One terminal outcome per call; hits are not also counted as successes.
		match result {
			Ok((token, outcome)) => {
				obs::record_fetch_outcome(KIND, outcome);

				Ok(token)
			},
			Err(e) => {
				obs::record_fetch_outcome(KIND, FetchOutcome::Failure);

				Err(e)
			},
		}
	}

	fn reusable_token(&self, audience: &str, now: OffsetDateTime) -> Option<TokenSecret> {
		let Some(token) = self.store.get(audience).filter(|token| !token.is_empty()) else {
			obs::trace_cache_decision(CacheDecision::Absent, None);

			return None;
		};

		match UnverifiedClaims::check(token.expose(), now, self.expiry_margin) {
			Ok(_) => {
				obs::trace_cache_decision(CacheDecision::Hit, None);

				Some(token)
			},
			Err(e) => {
				obs::trace_cache_decision(CacheDecision::Stale, Some(&e));

				None
			},
		}
	}

	/// Returns (and creates on demand) the singleflight guard for an audience.
	fn refresh_guard(&self, audience: &str) -> Arc<AsyncMutex<()>> {
		let mut guards = self.refresh_guards.lock();

		if let Some(guard) = guards.get(audience) {
			return guard.clone();
		}

		guards.entry(audience.to_owned()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}
}
