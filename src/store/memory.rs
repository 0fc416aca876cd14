//! Thread-safe in-memory [`TokenStore`] implementation.

// self
use crate::{_prelude::*, auth::TokenSecret, store::TokenStore};

type StoreMap = Arc<RwLock<HashMap<String, TokenSecret>>>;

/// Process-local map from audience to token. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Number of audiences with a stored token.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when no token has been stored yet.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	/// Audiences with a stored token, in no particular order.
	pub fn audiences(&self) -> Vec<String> {
		self.0.read().keys().cloned().collect()
	}
}
impl TokenStore for MemoryStore {
	fn get(&self, audience: &str) -> Option<TokenSecret> {
		self.0.read().get(audience).cloned()
	}

	fn put(&self, audience: &str, token: TokenSecret) {
		self.0.write().insert(audience.to_owned(), token);
	}
}
