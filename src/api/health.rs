// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::KeyCache;
use crate::state::AppState;

/// Number of missed refresh intervals after which the key is reported stale.
const STALE_AFTER_INTERVALS: u32 = 3;

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Readiness response with the state of the cached public key.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall status ("ok" or "stale").
    pub status: String,
    pub key: KeyStatus,
}

/// Cached public key details.
#[derive(Debug, Serialize, ToSchema)]
pub struct KeyStatus {
    /// URL the key is fetched from.
    pub source: String,
    /// Time of the last successful fetch.
    pub last_updated: DateTime<Utc>,
    /// Seconds since the last successful fetch.
    pub age_secs: i64,
    pub refresh_interval_secs: u64,
    /// RSA modulus size.
    pub bits: usize,
}

fn key_status(cache: &KeyCache, now: DateTime<Utc>) -> (bool, KeyStatus) {
    let last_updated = cache.last_updated();
    let age = now.signed_duration_since(last_updated);
    let stale_after = cache.refresh_interval() * STALE_AFTER_INTERVALS;
    let fresh = age.to_std().map_or(true, |age| age <= stale_after);

    let status = KeyStatus {
        source: cache.source_url().to_string(),
        last_updated,
        age_secs: age.num_seconds(),
        refresh_interval_secs: cache.refresh_interval().as_secs(),
        bits: cache.get().bits(),
    };
    (fresh, status)
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is running", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe.
///
/// Returns 503 when background refreshes have been failing for several
/// intervals. Tokens are still verified against the stale key meanwhile.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Public key is fresh", body = ReadyResponse),
        (status = 503, description = "Public key refreshes are failing", body = ReadyResponse)
    )
)]
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let (fresh, key) = key_status(&state.key_cache, Utc::now());

    let (code, status) = if fresh {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "stale")
    };

    (
        code,
        Json(ReadyResponse {
            status: status.to_string(),
            key,
        }),
    )
}
