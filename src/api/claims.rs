// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::Json;

use crate::auth::{Auth, Claims};

/// Return the claims of the caller's verified token.
#[utoipa::path(
    get,
    path = "/v1/claims",
    tag = "Auth",
    responses(
        (status = 200, description = "Verified token claims", body = Claims),
        (status = 401, description = "Missing, malformed, invalid or expired bearer token")
    )
)]
pub async fn get_claims(Auth(claims): Auth) -> Json<Claims> {
    Json(claims)
}
