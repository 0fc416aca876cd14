//! Optional observability helpers for token fetches.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit spans named `oauth2_token_fetcher.fetch` with the `kind` (fresh or
//!   cached), `stage` (call site) and `audience` fields, plus debug events for cache decisions.
//! - Enable `metrics` to increment the `oauth2_token_fetcher_fetch_total` counter for every
//!   attempt/hit/success/failure, labeled by `kind` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Fetch operations observed by the fetcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FetchKind {
	/// Unconditional request to the token endpoint.
	Fresh,
	/// Cache-aware request that only reaches the endpoint on a miss.
	Cached,
}
impl FetchKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FetchKind::Fresh => "fresh",
			FetchKind::Cached => "cached",
		}
	}
}
impl Display for FetchKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FetchOutcome {
	/// Entry to a fetch operation.
	Attempt,
	/// Cached token reused without contacting the endpoint.
	Hit,
	/// Token obtained from the endpoint. Cache hits record [`FetchOutcome::Hit`] instead.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FetchOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FetchOutcome::Attempt => "attempt",
			FetchOutcome::Hit => "hit",
			FetchOutcome::Success => "success",
			FetchOutcome::Failure => "failure",
		}
	}
}
impl Display for FetchOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
