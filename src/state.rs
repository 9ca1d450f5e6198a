// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use crate::auth::{KeyCache, TokenVerifier};

/// Shared handler state.
///
/// The key cache is constructed once in `main` and injected here rather
/// than living in a global.
#[derive(Clone)]
pub struct AppState {
    pub key_cache: KeyCache,
    pub verifier: TokenVerifier,
}

impl AppState {
    pub fn new(key_cache: KeyCache, verifier: TokenVerifier) -> Self {
        Self {
            key_cache,
            verifier,
        }
    }
}
