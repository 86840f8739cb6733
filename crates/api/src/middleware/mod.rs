//! Request extractors enforcing authentication.
//!
//! - [`auth::AuthUser`] -- the caller behind a valid, unrevoked Bearer token.

pub mod auth;
