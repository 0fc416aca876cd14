//! Signature-less parsing of JWT registered claims.
//!
//! Cached tokens are only inspected to decide whether they are still worth reusing. The
//! signature segment is never checked: the resource server that receives the token verifies
//! it, and the fetcher holds no key material to do so. Any parse failure means "refresh".

// std
use std::collections::HashSet;
// crates.io
use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::Error as JwtError};
// self
use crate::_prelude::*;

const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// Reasons a cached token cannot be reused.
#[derive(Debug, ThisError)]
pub enum ClaimsError {
	/// Token is not a decodable JWT or lacks an integer `exp` claim.
	#[error("Token claims could not be decoded.")]
	Decode(#[from] JwtError),
	/// Token expired (or expires within the configured margin).
	#[error("Token expired at {exp}.")]
	Expired {
		/// `exp` claim in seconds since the Unix epoch.
		exp: i64,
	},
	/// Token `nbf` lies in the future.
	#[error("Token is not valid before {nbf}.")]
	NotYetValid {
		/// `nbf` claim in seconds since the Unix epoch.
		nbf: i64,
	},
	/// Token `iat` lies in the future.
	#[error("Token was issued in the future at {iat}.")]
	IssuedInFuture {
		/// `iat` claim in seconds since the Unix epoch.
		iat: i64,
	},
}

/// Registered time claims read from a token payload without verifying its signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct UnverifiedClaims {
	/// `exp`: expiration time in seconds since the Unix epoch.
	pub exp: i64,
	/// `nbf`: not-before time in seconds since the Unix epoch.
	pub nbf: Option<i64>,
	/// `iat`: issued-at time in seconds since the Unix epoch.
	pub iat: Option<i64>,
}
impl UnverifiedClaims {
	/// Decodes the claims of a compact JWS token.
	///
	/// The header must name an algorithm `jsonwebtoken` knows, but the signature is never
	/// verified. `exp` is required; time claims are not checked here.
	pub fn parse(token: &str) -> Result<Self, ClaimsError> {
		let data = jsonwebtoken::decode::<Self>(
			token,
			&DecodingKey::from_secret(&[]),
			&unverified_validation(),
		)?;

		Ok(data.claims)
	}

	/// Parses `token` and checks that it is still usable at `now`.
	pub fn check(token: &str, now: OffsetDateTime, margin: Duration) -> Result<Self, ClaimsError> {
		let claims = Self::parse(token)?;

		claims.validate_at(now, margin)?;

		Ok(claims)
	}

	/// Expiration instant, if representable by [`OffsetDateTime`].
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		OffsetDateTime::from_unix_timestamp(self.exp).ok()
	}

	/// Validates the time claims at `now`.
	///
	/// `now + margin` must be strictly before `exp`. `nbf` and `iat`, when present, must not lie
	/// in the future. Instants are compared as nanoseconds since the epoch, so any `i64` claim
	/// and any margin are accepted without overflow.
	pub fn validate_at(&self, now: OffsetDateTime, margin: Duration) -> Result<(), ClaimsError> {
		let now = now.unix_timestamp_nanos();

		if now + margin.whole_nanoseconds() >= nanos(self.exp) {
			return Err(ClaimsError::Expired { exp: self.exp });
		}
		if let Some(nbf) = self.nbf {
			if now < nanos(nbf) {
				return Err(ClaimsError::NotYetValid { nbf });
			}
		}
		if let Some(iat) = self.iat {
			if now < nanos(iat) {
				return Err(ClaimsError::IssuedInFuture { iat });
			}
		}

		Ok(())
	}
}

fn unverified_validation() -> Validation {
	let mut validation = Validation::new(Algorithm::HS256);

	validation.insecure_disable_signature_validation();
	validation.required_spec_claims = HashSet::from(["exp".to_owned()]);
	validation.validate_exp = false;
	validation.validate_nbf = false;
	validation.validate_aud = false;

	validation
}

fn nanos(seconds: i64) -> i128 {
	i128::from(seconds) * NANOS_PER_SECOND
}
