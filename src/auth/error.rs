// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.
//!
//! Two taxonomies live here:
//!
//! - [`KeyError`] covers loading the public key from its remote source. It is
//!   fatal when the [`KeyCache`](super::KeyCache) is first constructed and only
//!   logged during background refreshes.
//! - [`AuthError`] covers verification of a single request's bearer token. It
//!   never outlives that request.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::error::ApiError;

/// Failure to load the public key from its remote source.
#[derive(Debug, Error)]
pub enum KeyError {
    /// Network or transport failure reaching the key source.
    #[error("failed to fetch public key: {0}")]
    Fetch(String),
    /// Response body is not a decodable PEM / public key structure.
    #[error("invalid public key format: {0}")]
    Format(String),
    /// Decoded key is not an RSA public key.
    #[error("unexpected public key type: {0}")]
    KeyType(String),
}

impl KeyError {
    /// Short machine-readable code, used as a structured log field.
    pub fn error_code(&self) -> &'static str {
        match self {
            KeyError::Fetch(_) => "fetch_error",
            KeyError::Format(_) => "format_error",
            KeyError::KeyType(_) => "key_type_error",
        }
    }
}

/// Bearer token verification failure.
///
/// Signature, expiry and encoding problems all collapse into
/// [`AuthError::InvalidToken`] so callers learn nothing about which check
/// rejected the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No authorization header present
    #[error("missing authorization header")]
    MissingToken,
    /// Header present but not in `Bearer <token>` form
    #[error("invalid authorization format")]
    MalformedHeader,
    /// Bad signature, expired, or malformed token body
    #[error("invalid or expired token")]
    InvalidToken,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            AuthError::MalformedHeader => "malformed_header",
            AuthError::InvalidToken => "invalid_token",
        }
    }

    /// Every verification failure maps to the same status.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::new(self.status_code(), self.to_string()).into_response()
    }
}
