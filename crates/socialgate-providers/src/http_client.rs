// ABOUTME: Shared HTTP client with connection pooling for vendor API calls
// ABOUTME: Configurable timeouts from the environment, initialized once per process
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use std::env;
use std::sync::OnceLock;
use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::env_config::{HTTP_CONNECT_TIMEOUT_SECS, HTTP_TIMEOUT_SECS, USER_AGENT};
use crate::constants::limits::{DEFAULT_HTTP_CONNECT_TIMEOUT_SECS, DEFAULT_HTTP_TIMEOUT_SECS};
use crate::constants::DEFAULT_USER_AGENT;

/// Timeouts and identification for the shared client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// Overall request timeout in seconds
    pub timeout_secs: u64,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// `User-Agent` header; Reddit rejects generic agents
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_HTTP_CONNECT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpClientConfig {
    /// Read `SOCIALGATE_HTTP_TIMEOUT_SECS`, `SOCIALGATE_HTTP_CONNECT_TIMEOUT_SECS`
    /// and `SOCIALGATE_USER_AGENT`, keeping defaults for absent or unparsable values
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            timeout_secs: parse_secs(HTTP_TIMEOUT_SECS, defaults.timeout_secs),
            connect_timeout_secs: parse_secs(
                HTTP_CONNECT_TIMEOUT_SECS,
                defaults.connect_timeout_secs,
            ),
            user_agent: env::var(USER_AGENT)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.user_agent),
        }
    }

    /// Build a client with these settings
    #[must_use]
    pub fn build_client(&self) -> Client {
        ClientBuilder::new()
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .user_agent(self.user_agent.clone())
            .build()
            .unwrap_or_else(|_| Client::new())
    }
}

fn parse_secs(var: &str, default: u64) -> u64 {
    match env::var(var) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {var}={raw}, using {default}");
            default
        }),
        Err(_) => default,
    }
}

/// Configured settings for the shared client
static CLIENT_CONFIG: OnceLock<HttpClientConfig> = OnceLock::new();

/// Global shared HTTP client with configured timeouts
static SHARED_CLIENT: OnceLock<Client> = OnceLock::new();

/// Initialize the shared HTTP client configuration
///
/// Must be called before the first connector makes a request to take effect.
/// If not called, `HttpClientConfig::default()` is used.
pub fn initialize_shared_client(config: HttpClientConfig) {
    let _ = CLIENT_CONFIG.set(config);
}

/// Get the shared HTTP client for vendor API calls
#[must_use]
pub fn shared_client() -> &'static Client {
    SHARED_CLIENT.get_or_init(|| {
        CLIENT_CONFIG
            .get()
            .cloned()
            .unwrap_or_default()
            .build_client()
    })
}
