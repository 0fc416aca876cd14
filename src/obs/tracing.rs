// self
use crate::{_prelude::*, obs::FetchKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFetch<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFetch<F> = F;

/// Span wrapper used by fetch operations.
#[derive(Clone, Debug)]
pub struct FetchSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FetchSpan {
	/// Creates a new span tagged with the fetch kind, call site, and audience.
	pub fn new(kind: FetchKind, stage: &'static str, audience: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"oauth2_token_fetcher.fetch",
				kind = kind.as_str(),
				stage,
				audience
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage, audience);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFetch<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Cache decision taken by `fetch_cached`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheDecision {
	/// Stored token reused.
	Hit,
	/// Nothing stored for the audience.
	Absent,
	/// Stored token expired or could not be parsed.
	Stale,
}
impl CacheDecision {
	/// Returns a stable label suitable for event fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CacheDecision::Hit => "hit",
			CacheDecision::Absent => "absent",
			CacheDecision::Stale => "stale",
		}
	}
}

/// Emits a debug event describing a cache decision (when tracing is enabled).
pub fn trace_cache_decision(decision: CacheDecision, reason: Option<&dyn Display>) {
	#[cfg(feature = "tracing")]
	{
		match reason {
			Some(reason) =>
				tracing::debug!(decision = decision.as_str(), %reason, "Cached token rejected."),
			None => tracing::debug!(decision = decision.as_str(), "Cache decision taken."),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (decision, reason);
	}
}
