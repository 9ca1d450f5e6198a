// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for unit tests: RSA key pairs, token signing and a mock
//! key endpoint.

use std::sync::LazyLock;
use std::time::Duration;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::auth::{KeyCache, KeyCacheConfig, TokenVerifier};
use crate::state::AppState;

pub(crate) const KEY_PATH: &str = "/public.pem";

pub(crate) struct TestKeyPair {
    pub private_pem: String,
    pub public_pem: String,
    pub public: RsaPublicKey,
}

impl TestKeyPair {
    fn generate() -> Self {
        let private = RsaPrivateKey::new(&mut rand::thread_rng(), 2048).unwrap();
        let public = RsaPublicKey::from(&private);
        Self {
            private_pem: private.to_pkcs1_pem(LineEnding::LF).unwrap().to_string(),
            public_pem: public.to_public_key_pem(LineEnding::LF).unwrap(),
            public,
        }
    }

    pub fn sign(&self, claims: &Value) -> String {
        self.sign_with(Algorithm::RS256, claims)
    }

    pub fn sign_with(&self, alg: Algorithm, claims: &Value) -> String {
        let key = EncodingKey::from_rsa_pem(self.private_pem.as_bytes()).unwrap();
        encode(&Header::new(alg), claims, &key).unwrap()
    }
}

/// Key pairs are expensive to generate, so tests share two of them.
pub(crate) static KEY_A: LazyLock<TestKeyPair> = LazyLock::new(TestKeyPair::generate);
pub(crate) static KEY_B: LazyLock<TestKeyPair> = LazyLock::new(TestKeyPair::generate);

/// A valid SubjectPublicKeyInfo PEM for a non-RSA (secp256k1) key.
pub(crate) fn ec_public_pem() -> String {
    use k256::pkcs8::EncodePublicKey as _;

    k256::SecretKey::random(&mut rand::thread_rng())
        .public_key()
        .to_public_key_pem(k256::pkcs8::LineEnding::LF)
        .unwrap()
}

pub(crate) fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub(crate) fn valid_claims(sub: &str) -> Value {
    json!({
        "sub": sub,
        "iat": unix_now(),
        "exp": unix_now() + 3600,
        "role": "admin",
    })
}

pub(crate) fn expired_claims(sub: &str) -> Value {
    json!({
        "sub": sub,
        "iat": unix_now() - 7200,
        "exp": unix_now() - 3600,
    })
}

pub(crate) async fn serve_body(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(KEY_PATH))
        .respond_with(template)
        .mount(server)
        .await;
}

pub(crate) async fn serve_pem(server: &MockServer, pem: &str) {
    serve_body(server, ResponseTemplate::new(200).set_body_string(pem)).await;
}

pub(crate) fn key_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}{KEY_PATH}", server.uri())).unwrap()
}

pub(crate) fn cache_config(server: &MockServer, refresh_interval: Duration) -> KeyCacheConfig {
    KeyCacheConfig::new(key_url(server), refresh_interval)
        .with_fetch_timeout(Duration::from_secs(2))
}

/// App state backed by a mock key endpoint serving `KEY_A`.
///
/// The returned server must outlive the state; cancel the token when done.
pub(crate) async fn test_state() -> (AppState, MockServer, CancellationToken) {
    let server = MockServer::start().await;
    serve_pem(&server, &KEY_A.public_pem).await;

    let shutdown = CancellationToken::new();
    let config = cache_config(&server, Duration::from_secs(300));
    let key_cache = KeyCache::connect(config, shutdown.clone()).await.unwrap();

    let state = AppState::new(key_cache, TokenVerifier::new());
    (state, server, shutdown)
}
