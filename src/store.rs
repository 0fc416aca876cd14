//! Audience-keyed token storage used by [`TokenFetcher::fetch_cached`](crate::TokenFetcher::fetch_cached).

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Storage contract for the last token obtained per audience.
///
/// Entries are created on the first successful fetch for an audience and overwritten on every
/// refresh; nothing is evicted. Implementations must tolerate concurrent readers and writers.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Returns the stored token for `audience`, if any.
	fn get(&self, audience: &str) -> Option<TokenSecret>;

	/// Stores `token` for `audience`, replacing any previous entry.
	fn put(&self, audience: &str, token: TokenSecret);
}
impl<T> TokenStore for Arc<T>
where
	T: ?Sized + TokenStore,
{
	fn get(&self, audience: &str) -> Option<TokenSecret> {
		self.as_ref().get(audience)
	}

	fn put(&self, audience: &str, token: TokenSecret) {
		self.as_ref().put(audience, token)
	}
}
