// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Apply to a router subtree with `from_fn_with_state`:
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/claims", get(handler))
//!     .route_layer(axum::middleware::from_fn_with_state(
//!         state.clone(),
//!         require_bearer,
//!     ));
//! ```
//!
//! Verified [`Claims`] are inserted into the request extensions, where the
//! [`Auth`](super::Auth) extractor picks them up.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::{AuthError, Claims};
use crate::state::AppState;

/// Reject the request with 401 unless it carries a valid bearer token.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(request.headers(), &state) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            debug!(
                path = %request.uri().path(),
                error_code = e.error_code(),
                "Rejected unauthenticated request"
            );
            e.into_response()
        }
    }
}

/// Verify the `Authorization` header of a request.
///
/// An absent header is treated as empty; a non-UTF-8 one as malformed.
pub fn authenticate(headers: &HeaderMap, state: &AppState) -> Result<Claims, AuthError> {
    let authorization = match headers.get(AUTHORIZATION) {
        Some(value) => value.to_str().map_err(|_| AuthError::MalformedHeader)?,
        None => "",
    };

    state.verifier.verify(authorization, &state.key_cache)
}
