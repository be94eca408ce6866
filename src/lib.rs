//! OAuth 2.0 client per RFC 6749.
//!
//! Builds authorization request URLs and exchanges grants for access
//! tokens, mapping provider error responses onto a closed, typed error
//! surface. Token storage, refresh scheduling, and PKCE are left to the
//! embedding application.

mod client;
mod error;
mod state;
mod types;

pub use client::{OAuthClient, OAuthClientConfig};
pub use error::{ErrorClass, OAuthError, ProviderRejection};
pub use types::{TokenRequest, TokenResponse};
