// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Remote public key fetching and caching.
//!
//! ## Behaviour
//!
//! - The key is fetched once, synchronously, when the cache is constructed.
//!   Construction fails if that fetch fails, so a misconfigured key source
//!   stops the service at startup instead of mid-traffic.
//! - A background task re-fetches the key every `refresh_interval`. A failed
//!   refresh is logged and the previous key stays in place (stale-but-valid).
//! - Readers never touch the network. [`KeyCache::get`] only clones an `Arc`
//!   under a read lock; the write lock is held only to swap in a new key.
//!
//! ## Shutdown
//!
//! The refresh task stops when the `CancellationToken` passed to
//! [`KeyCache::connect`] is cancelled, following the same pattern as the
//! other background pollers in this service.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::DecodingKey;
use rsa::pkcs8::SubjectPublicKeyInfoRef;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use super::error::KeyError;

/// Default interval between background refreshes (5 minutes).
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

/// Default deadline for a single fetch attempt.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Lower bound applied to the refresh interval; `tokio::time::interval`
/// rejects a zero period.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(10);

/// Where to fetch the key from and how often.
#[derive(Debug, Clone)]
pub struct KeyCacheConfig {
    /// Endpoint returning a PEM-encoded public key as its body
    pub source_url: Url,
    /// Period of the background refresh
    pub refresh_interval: Duration,
    /// Deadline for each fetch attempt (connect + body)
    pub fetch_timeout: Duration,
}

impl KeyCacheConfig {
    pub fn new(source_url: Url, refresh_interval: Duration) -> Self {
        Self {
            source_url,
            refresh_interval,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }
}

/// An RSA public key ready for JWT signature verification.
#[derive(Clone)]
pub struct PublicKey {
    key: RsaPublicKey,
    decoding_key: DecodingKey,
}

impl PublicKey {
    /// Parse the first PEM block of `raw` as an RSA SubjectPublicKeyInfo.
    pub fn from_pem(raw: &[u8]) -> Result<Self, KeyError> {
        let block =
            pem::parse(raw).map_err(|e| KeyError::Format(format!("no PEM block found: {e}")))?;

        let spki = SubjectPublicKeyInfoRef::try_from(block.contents())
            .map_err(|e| KeyError::Format(format!("not a public key structure: {e}")))?;

        if spki.algorithm.oid != rsa::pkcs1::ALGORITHM_OID {
            return Err(KeyError::KeyType(format!(
                "expected RSA public key, got algorithm {}",
                spki.algorithm.oid
            )));
        }

        let key = RsaPublicKey::try_from(spki)
            .map_err(|e| KeyError::Format(format!("invalid RSA public key: {e}")))?;

        Ok(Self::from_rsa(key))
    }

    pub fn from_rsa(key: RsaPublicKey) -> Self {
        let decoding_key =
            DecodingKey::from_rsa_raw_components(&key.n().to_bytes_be(), &key.e().to_bytes_be());
        Self { key, decoding_key }
    }

    pub fn rsa(&self) -> &RsaPublicKey {
        &self.key
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        self.key.size() * 8
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for PublicKey {}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("bits", &self.bits())
            .finish_non_exhaustive()
    }
}

/// Key and timestamp are replaced together.
struct Snapshot {
    key: Arc<PublicKey>,
    last_updated: DateTime<Utc>,
}

struct Inner {
    source_url: Url,
    refresh_interval: Duration,
    client: reqwest::Client,
    current: RwLock<Snapshot>,
}

/// Self-refreshing cache holding the currently trusted public key.
///
/// Cheap to clone; all clones share the same key.
#[derive(Clone)]
pub struct KeyCache {
    inner: Arc<Inner>,
}

impl KeyCache {
    /// Fetch the key and start the background refresh task.
    ///
    /// Fails with the fetch error if the initial load fails; no cache is
    /// returned in that case and no task is spawned. Must be called from
    /// within a tokio runtime.
    pub async fn connect(
        config: KeyCacheConfig,
        shutdown: CancellationToken,
    ) -> Result<Self, KeyError> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| KeyError::Fetch(format!("failed to build HTTP client: {e}")))?;

        let key = fetch_public_key(&client, &config.source_url).await?;
        info!(
            url = %config.source_url,
            bits = key.bits(),
            "Loaded remote public key"
        );

        let cache = Self {
            inner: Arc::new(Inner {
                source_url: config.source_url,
                refresh_interval: config.refresh_interval,
                client,
                current: RwLock::new(Snapshot {
                    key: Arc::new(key),
                    last_updated: Utc::now(),
                }),
            }),
        };

        tokio::spawn(cache.clone().run(shutdown));

        Ok(cache)
    }

    /// Current key. Never blocks on I/O and never triggers a fetch.
    pub fn get(&self) -> Arc<PublicKey> {
        Arc::clone(&self.read().key)
    }

    /// Time of the last successful fetch.
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.read().last_updated
    }

    pub fn source_url(&self) -> &Url {
        &self.inner.source_url
    }

    pub fn refresh_interval(&self) -> Duration {
        self.inner.refresh_interval
    }

    /// Fetch the key now and install it on success.
    ///
    /// On failure the current key is left untouched.
    pub async fn refresh(&self) -> Result<(), KeyError> {
        let key = fetch_public_key(&self.inner.client, &self.inner.source_url).await?;

        let mut current = self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *current = Snapshot {
            key: Arc::new(key),
            last_updated: Utc::now(),
        };

        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, Snapshot> {
        // The guarded value is always a complete snapshot, so a poisoned
        // lock is still safe to read.
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Refresh loop; runs until `shutdown` is cancelled.
    async fn run(self, shutdown: CancellationToken) {
        let period = self.inner.refresh_interval.max(MIN_REFRESH_INTERVAL);
        info!(
            interval_secs = period.as_secs(),
            url = %self.inner.source_url,
            "Public key refresher starting"
        );

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {},
                _ = shutdown.cancelled() => {
                    info!("Public key refresher shutting down");
                    return;
                }
            }

            tokio::select! {
                result = self.refresh() => match result {
                    Ok(()) => debug!(url = %self.inner.source_url, "Public key refreshed"),
                    Err(e) => warn!(
                        url = %self.inner.source_url,
                        error = %e,
                        error_code = e.error_code(),
                        "Public key refresh failed; keeping previous key"
                    ),
                },
                _ = shutdown.cancelled() => {
                    info!("Public key refresher shutting down");
                    return;
                }
            }
        }
    }
}

/// GET the key source and parse the body.
async fn fetch_public_key(client: &reqwest::Client, url: &Url) -> Result<PublicKey, KeyError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| KeyError::Fetch(e.to_string()))?;

    if !response.status().is_success() {
        return Err(KeyError::Fetch(format!(
            "HTTP {} from public key endpoint",
            response.status()
        )));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| KeyError::Fetch(e.to_string()))?;

    PublicKey::from_pem(&body)
}
