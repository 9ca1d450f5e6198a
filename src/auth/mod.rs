// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer JWT authentication against a remotely published RSA public key.
//!
//! ## Auth Flow
//!
//! 1. At startup the service fetches the PEM public key from
//!    `PUBLIC_KEY_URL` ([`KeyCache::connect`]); startup fails if it cannot.
//! 2. A background task re-fetches the key every refresh interval, keeping
//!    the previous key when a refresh fails.
//! 3. Clients send `Authorization: Bearer <JWT>`.
//! 4. [`TokenVerifier`] checks the header shape, the signature against the
//!    cached key and the expiry, then hands the claims to the handler.
//!
//! ## Security
//!
//! - Signature, expiry and encoding failures are reported identically
//! - Only RSA signature algorithms are accepted
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod key_cache;
pub mod middleware;
pub mod verifier;

pub use claims::Claims;
pub use error::{AuthError, KeyError};
pub use extractor::Auth;
pub use key_cache::{KeyCache, KeyCacheConfig, PublicKey};
pub use middleware::require_bearer;
pub use verifier::TokenVerifier;
