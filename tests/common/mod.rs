// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fixtures shared by the integration tests.
//!
//! Mirrors the crate-private `test_support` module, which is not visible
//! from outside the crate.

#![allow(dead_code)]

use std::sync::LazyLock;
use std::time::Duration;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use remote_key_auth::auth::KeyCacheConfig;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde_json::{json, Value};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const KEY_PATH: &str = "/.well-known/public.pem";

pub struct TestKeyPair {
    pub public: RsaPublicKey,
    pub public_pem: String,
    encoding_key: EncodingKey,
}

impl TestKeyPair {
    fn generate() -> Self {
        let private = RsaPrivateKey::new(&mut rand::thread_rng(), 2048).unwrap();
        let public = RsaPublicKey::from(&private);
        let private_pem = private.to_pkcs1_pem(LineEnding::LF).unwrap();
        Self {
            public_pem: public.to_public_key_pem(LineEnding::LF).unwrap(),
            public,
            encoding_key: EncodingKey::from_rsa_pem(private_pem.as_bytes()).unwrap(),
        }
    }

    pub fn sign(&self, claims: &Value) -> String {
        encode(&Header::new(Algorithm::RS256), claims, &self.encoding_key).unwrap()
    }
}

pub static ISSUER_KEY: LazyLock<TestKeyPair> = LazyLock::new(TestKeyPair::generate);
pub static ROTATED_KEY: LazyLock<TestKeyPair> = LazyLock::new(TestKeyPair::generate);

pub fn claims_for(sub: &str, exp_offset_secs: i64) -> Value {
    let now = chrono::Utc::now().timestamp();
    json!({
        "sub": sub,
        "iat": now,
        "exp": now + exp_offset_secs,
        "scope": "wallet:read",
    })
}

pub async fn serve_body(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(KEY_PATH))
        .respond_with(template)
        .mount(server)
        .await;
}

pub async fn serve_pem(server: &MockServer, pem: &str) {
    serve_body(server, ResponseTemplate::new(200).set_body_string(pem)).await;
}

pub fn cache_config(server: &MockServer, refresh_interval: Duration) -> KeyCacheConfig {
    let url = Url::parse(&format!("{}{KEY_PATH}", server.uri())).unwrap();
    KeyCacheConfig::new(url, refresh_interval).with_fetch_timeout(Duration::from_secs(2))
}

/// Poll `cond` every 10ms for up to 5 seconds.
pub async fn eventually(mut cond: impl FnMut() -> bool) -> bool {
    for _ in 0..500 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cond()
}
