// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, default values, and the [`Config`] loaded from
//! them at startup. A `.env` file in the working directory is read first when
//! present.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `PUBLIC_KEY_URL` | Endpoint serving the PEM public key | Required |
//! | `PUBLIC_KEY_REFRESH_SECS` | Seconds between background key refreshes | `300` |
//! | `PUBLIC_KEY_FETCH_TIMEOUT_SECS` | Deadline for a single key fetch | `10` |
//! | `JWT_ISSUER` | Expected JWT issuer claim | Optional |
//! | `JWT_AUDIENCE` | Expected JWT audience claim | Optional |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::auth::key_cache::{DEFAULT_FETCH_TIMEOUT, DEFAULT_REFRESH_INTERVAL};
use crate::auth::{KeyCacheConfig, TokenVerifier};

/// Environment variable name for the public key endpoint.
pub const PUBLIC_KEY_URL_ENV: &str = "PUBLIC_KEY_URL";

/// Environment variable name for the refresh interval, in seconds.
pub const PUBLIC_KEY_REFRESH_SECS_ENV: &str = "PUBLIC_KEY_REFRESH_SECS";

/// Environment variable name for the per-fetch deadline, in seconds.
pub const PUBLIC_KEY_FETCH_TIMEOUT_SECS_ENV: &str = "PUBLIC_KEY_FETCH_TIMEOUT_SECS";

pub const JWT_ISSUER_ENV: &str = "JWT_ISSUER";
pub const JWT_AUDIENCE_ENV: &str = "JWT_AUDIENCE";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Configuration loading errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    pub fn from_env() -> Self {
        Self::parse(std::env::var(LOG_FORMAT_ENV).ok().as_deref())
    }

    /// Anything other than `json` selects the pretty format.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub public_key_url: Url,
    pub refresh_interval: Duration,
    pub fetch_timeout: Duration,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let raw_url = get(PUBLIC_KEY_URL_ENV).ok_or(ConfigError::Missing(PUBLIC_KEY_URL_ENV))?;
        let public_key_url = parse_url(&raw_url)?;

        let refresh_interval = match get(PUBLIC_KEY_REFRESH_SECS_ENV) {
            Some(raw) => parse_secs(PUBLIC_KEY_REFRESH_SECS_ENV, &raw)?,
            None => DEFAULT_REFRESH_INTERVAL,
        };

        let fetch_timeout = match get(PUBLIC_KEY_FETCH_TIMEOUT_SECS_ENV) {
            Some(raw) => parse_secs(PUBLIC_KEY_FETCH_TIMEOUT_SECS_ENV, &raw)?,
            None => DEFAULT_FETCH_TIMEOUT,
        };

        let port = match get(PORT_ENV) {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::Invalid {
                var: PORT_ENV,
                reason: format!("{e}"),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            public_key_url,
            refresh_interval,
            fetch_timeout,
            issuer: get(JWT_ISSUER_ENV),
            audience: get(JWT_AUDIENCE_ENV),
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            log_format: LogFormat::parse(get(LOG_FORMAT_ENV).as_deref()),
        })
    }

    pub fn key_cache_config(&self) -> KeyCacheConfig {
        KeyCacheConfig::new(self.public_key_url.clone(), self.refresh_interval)
            .with_fetch_timeout(self.fetch_timeout)
    }

    pub fn token_verifier(&self) -> TokenVerifier {
        let mut verifier = TokenVerifier::new();
        if let Some(issuer) = &self.issuer {
            verifier = verifier.with_issuer(issuer);
        }
        if let Some(audience) = &self.audience {
            verifier = verifier.with_audience(audience);
        }
        verifier
    }

    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Invalid {
                var: HOST_ENV,
                reason: format!("{e}"),
            })
    }
}

fn parse_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
        var: PUBLIC_KEY_URL_ENV,
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Invalid {
            var: PUBLIC_KEY_URL_ENV,
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

fn parse_secs(var: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = raw.trim().parse().map_err(|e| ConfigError::Invalid {
        var,
        reason: format!("{e}"),
    })?;

    if secs == 0 {
        return Err(ConfigError::Invalid {
            var,
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(Duration::from_secs(secs))
}
