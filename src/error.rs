//! Fetcher-level error types shared by the transport, wire, and cache layers.

// self
use crate::_prelude::*;

/// Fetcher-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical fetcher error exposed by public APIs.
///
/// Every failure of a token request surfaces through one of these variants; none of them are
/// retried by the fetcher.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration or request-construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, body stream).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Token endpoint answered with something other than a usable token response.
	#[error(transparent)]
	Response(#[from] ResponseError),
}

/// Configuration and request-construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Token endpoint URL cannot be parsed.
	#[error("Token endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Grant request body could not be serialized.
	#[error("Token request body could not be serialized.")]
	Encode(#[from] serde_json::Error),
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure before a response arrived.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Response headers arrived but the body could not be read.
	#[error("Token endpoint response body could not be read (status {status}).")]
	ResponseRead {
		/// HTTP status observed before the body failed.
		status: u16,
		/// Transport-specific stream error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Failures derived from the token endpoint's response payload.
#[derive(Debug, ThisError)]
pub enum ResponseError {
	/// Token endpoint responded with a body that does not match the token response schema.
	#[error("Token endpoint returned malformed JSON.")]
	Parse {
		/// Structured parsing failure, including the JSON path that failed.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// Token endpoint refused the grant with a non-success status.
	#[error("Token endpoint rejected the request with status {status}: {}.", .error.as_deref().unwrap_or("no error code"))]
	Rejected {
		/// HTTP status code of the response.
		status: u16,
		/// RFC 6749 `error` code, when the body carried one.
		error: Option<String>,
		/// RFC 6749 `error_description`, when the body carried one.
		description: Option<String>,
	},
}
impl ResponseError {
	/// HTTP status code attached to the failure.
	pub fn status(&self) -> u16 {
		match self {
			Self::Parse { status, .. } | Self::Rejected { status, .. } => *status,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn rejected_error_mentions_status_and_code() {
		let err = ResponseError::Rejected {
			status: 401,
			error: Some("access_denied".into()),
			description: None,
		};

		assert_eq!(err.status(), 401);
		assert_eq!(
			err.to_string(),
			"Token endpoint rejected the request with status 401: access_denied."
		);

		let err = ResponseError::Rejected { status: 502, error: None, description: None };

		assert!(err.to_string().contains("no error code"));
	}

	#[test]
	fn parse_error_converts_into_fetcher_error_with_source() {
		let mut de = serde_json::Deserializer::from_str("not json");
		let source = serde_path_to_error::deserialize::<_, serde_json::Value>(&mut de)
			.expect_err("Invalid JSON should fail to deserialize.");
		let err: Error = ResponseError::Parse { source, status: 200 }.into();

		assert!(matches!(err, Error::Response(ResponseError::Parse { status: 200, .. })));
		assert!(StdError::source(&err).is_some());
	}
}
