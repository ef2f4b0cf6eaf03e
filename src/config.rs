// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup and validated
//! before the server binds. Nothing here changes afterwards.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | Token signing key, at least 32 bytes | Required |
//! | `TOKEN_TTL_SECS` | Token lifetime and cookie `Max-Age`, at most 365 days | `3600` |
//! | `AUTH_COOKIE_NAME` | Cookie carrying the token | `JWT_TOKEN` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use chrono::Duration;

use crate::auth::cookie::{is_valid_cookie_name, DEFAULT_COOKIE_NAME};
use crate::auth::token::{SigningKey, SigningKeyError};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const TOKEN_TTL_SECS_ENV: &str = "TOKEN_TTL_SECS";
pub const AUTH_COOKIE_NAME_ENV: &str = "AUTH_COOKIE_NAME";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;
/// Longest accepted token lifetime (365 days).
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Default `RUST_LOG` filter when the variable is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set")]
    MissingSecret,
    #[error("JWT_SECRET is invalid: {0}")]
    InvalidSecret(#[from] SigningKeyError),
    #[error("PORT is not a valid port: {0:?}")]
    InvalidPort(String),
    #[error("TOKEN_TTL_SECS must be between 1 and 31536000 seconds: {0:?}")]
    InvalidTtl(String),
    #[error("AUTH_COOKIE_NAME is not a valid cookie name: {0:?}")]
    InvalidCookieName(String),
    #[error("LOG_FORMAT must be `json` or `pretty`: {0:?}")]
    InvalidLogFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub signing_key: SigningKey,
    pub token_ttl: Duration,
    pub cookie_name: String,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(JWT_SECRET_ENV)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSecret)?;
        let signing_key = SigningKey::new(secret.into_bytes())?;

        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let token_ttl = match lookup(TOKEN_TTL_SECS_ENV) {
            Some(raw) => match raw
                .parse::<i64>()
                .ok()
                .filter(|secs| (1..=MAX_TOKEN_TTL_SECS).contains(secs))
            {
                Some(secs) => Duration::try_seconds(secs).ok_or(ConfigError::InvalidTtl(raw))?,
                None => return Err(ConfigError::InvalidTtl(raw)),
            },
            None => Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
        };

        let cookie_name =
            lookup(AUTH_COOKIE_NAME_ENV).unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string());
        if !is_valid_cookie_name(&cookie_name) {
            return Err(ConfigError::InvalidCookieName(cookie_name));
        }

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => return Err(ConfigError::InvalidLogFormat(other.to_string())),
        };

        Ok(Self {
            host: lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            signing_key,
            token_ttl,
            cookie_name,
            log_format,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "606316d26b2fdbea7f4be084ff547198652ddeca";

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = config(&[(JWT_SECRET_ENV, SECRET)]).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.token_ttl, Duration::seconds(3600));
        assert_eq!(config.cookie_name, "JWT_TOKEN");
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn secret_is_required() {
        assert!(matches!(config(&[]), Err(ConfigError::MissingSecret)));
        assert!(matches!(
            config(&[(JWT_SECRET_ENV, "")]),
            Err(ConfigError::MissingSecret)
        ));
    }

    #[test]
    fn short_secret_is_rejected() {
        assert!(matches!(
            config(&[(JWT_SECRET_ENV, "short")]),
            Err(ConfigError::InvalidSecret(_))
        ));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config(&[
            (JWT_SECRET_ENV, SECRET),
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "9000"),
            (TOKEN_TTL_SECS_ENV, "600"),
            (AUTH_COOKIE_NAME_ENV, "fit_session"),
            (LOG_FORMAT_ENV, "json"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.token_ttl, Duration::seconds(600));
        assert_eq!(config.cookie_name, "fit_session");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            config(&[(JWT_SECRET_ENV, SECRET), (PORT_ENV, "http")]),
            Err(ConfigError::InvalidPort(_))
        ));
        assert!(matches!(
            config(&[(JWT_SECRET_ENV, SECRET), (TOKEN_TTL_SECS_ENV, "0")]),
            Err(ConfigError::InvalidTtl(_))
        ));
        for too_long in [i64::MAX, MAX_TOKEN_TTL_SECS + 1] {
            let raw = too_long.to_string();
            assert!(matches!(
                config(&[(JWT_SECRET_ENV, SECRET), (TOKEN_TTL_SECS_ENV, raw.as_str())]),
                Err(ConfigError::InvalidTtl(_))
            ));
        }
        let max = MAX_TOKEN_TTL_SECS.to_string();
        let config_at_max = config(&[(JWT_SECRET_ENV, SECRET), (TOKEN_TTL_SECS_ENV, max.as_str())]);
        assert_eq!(
            config_at_max.unwrap().token_ttl,
            Duration::seconds(MAX_TOKEN_TTL_SECS)
        );
        assert!(matches!(
            config(&[(JWT_SECRET_ENV, SECRET), (AUTH_COOKIE_NAME_ENV, "a b")]),
            Err(ConfigError::InvalidCookieName(_))
        ));
        assert!(matches!(
            config(&[(JWT_SECRET_ENV, SECRET), (LOG_FORMAT_ENV, "xml")]),
            Err(ConfigError::InvalidLogFormat(_))
        ));
    }
}
