// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token verification against the cached remote key.

use jsonwebtoken::{decode, Algorithm, Validation};
use tracing::debug;

use super::{AuthError, Claims, KeyCache, PublicKey};

/// Signature algorithms accepted for an RSA key.
const RSA_ALGORITHMS: [Algorithm; 6] = [
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
];

/// Stateless JWT verifier.
///
/// Holds only validation settings, so one instance can be shared across all
/// request handlers without synchronization.
#[derive(Clone)]
pub struct TokenVerifier {
    validation: Validation,
}

impl TokenVerifier {
    pub fn new() -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.algorithms = RSA_ALGORITHMS.to_vec();
        // `exp` and `nbf` are enforced when present but neither is required
        validation.required_spec_claims.clear();
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        Self { validation }
    }

    /// Require the `iss` claim to match.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.validation.set_issuer(&[issuer.into()]);
        self
    }

    /// Require the `aud` claim to contain `audience`.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.validation.set_audience(&[audience.into()]);
        self.validation.validate_aud = true;
        self
    }

    /// Tolerate clock skew of `seconds` on `exp` and `nbf`. Defaults to none.
    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.validation.leeway = seconds;
        self
    }

    /// Verify an `Authorization` header value and return its claims.
    ///
    /// Reads the current key from `keys`; never triggers a fetch.
    pub fn verify(&self, authorization: &str, keys: &KeyCache) -> Result<Claims, AuthError> {
        let token = bearer_token(authorization)?;
        self.verify_token(token, &keys.get())
    }

    /// Verify a bare token against `key`.
    pub fn verify_token(&self, token: &str, key: &PublicKey) -> Result<Claims, AuthError> {
        decode::<Claims>(token, key.decoding_key(), &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                // The reason stays in the logs; callers only see InvalidToken
                debug!(reason = ?e.kind(), "Bearer token rejected");
                AuthError::InvalidToken
            })
    }
}

impl Default for TokenVerifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the token from a `Bearer <token>` header value.
///
/// The value must split on a single space into exactly two parts.
pub fn bearer_token(authorization: &str) -> Result<&str, AuthError> {
    if authorization.is_empty() {
        return Err(AuthError::MissingToken);
    }

    let parts: Vec<&str> = authorization.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] => Ok(*token),
        _ => Err(AuthError::MalformedHeader),
    }
}
