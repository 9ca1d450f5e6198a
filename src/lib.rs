// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Remote Key Auth - bearer token verification against a remote public key
//!
//! This crate keeps an RSA public key, published as PEM by a remote
//! endpoint, fresh in memory and verifies incoming bearer JWTs against it.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Key cache, token verification, middleware and extractor
//! - `config` - Environment configuration
//! - `telemetry` - Logging setup

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;
pub mod telemetry;

#[cfg(test)]
mod test_support;
