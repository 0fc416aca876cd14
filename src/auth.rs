//! Client credentials, redacted secrets, and signature-less token claims.

pub mod claims;
pub mod credentials;
pub mod secret;

pub use claims::*;
pub use credentials::*;
pub use secret::*;
