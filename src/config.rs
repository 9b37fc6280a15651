// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Console configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// File name of the persisted session token inside the state directory.
pub const TOKEN_FILE_NAME: &str = "auth_token";

/// Default ceiling for a single backend request.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Console configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the admin backend, including the `/api/v1` prefix
    pub api_base_url: String,
    /// Upper bound for every backend request
    pub request_timeout: Duration,
    /// Directory holding the persisted session token
    pub state_dir: PathBuf,
    /// Local console port
    pub port: u16,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000/api/v1".to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            state_dir: env::temp_dir().join("vpn-admin-test"),
            port: 3000,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_base_url = env::var("ADMIN_API_BASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|_| "http://localhost:8000/api/v1".to_string());
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                name: "ADMIN_API_BASE_URL",
                reason: format!("expected an http(s) URL, got '{}'", api_base_url),
            });
        }

        let timeout_secs = match env::var("ADMIN_API_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    name: "ADMIN_API_TIMEOUT_SECS",
                    reason: format!("expected a positive integer, got '{}'", raw),
                })?,
            Err(_) => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Ok(Self {
            api_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            state_dir: env::var("ADMIN_STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".vpn-admin")),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
        })
    }

    /// Path of the single persisted token slot.
    pub fn token_path(&self) -> PathBuf {
        self.state_dir.join(TOKEN_FILE_NAME)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("ADMIN_API_BASE_URL", "https://admin.example.com/api/v1/");
        env::set_var("ADMIN_API_TIMEOUT_SECS", "5");
        env::set_var("ADMIN_STATE_DIR", "/tmp/vpn-admin-config-test");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.api_base_url, "https://admin.example.com/api/v1");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(
            config.token_path(),
            PathBuf::from("/tmp/vpn-admin-config-test/auth_token")
        );

        env::remove_var("ADMIN_API_BASE_URL");
        env::remove_var("ADMIN_API_TIMEOUT_SECS");
        env::remove_var("ADMIN_STATE_DIR");
    }
}
