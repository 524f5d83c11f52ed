// ABOUTME: Application configuration assembled from environment variables
// ABOUTME: Bundles HTTP client, logging and per-provider credential and endpoint settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

//! Configuration for applications embedding socialgate.
//!
//! Everything comes from the environment:
//!
//! - **HTTP**: `SOCIALGATE_HTTP_TIMEOUT_SECS`, `SOCIALGATE_HTTP_CONNECT_TIMEOUT_SECS`,
//!   `SOCIALGATE_USER_AGENT`
//! - **Logging**: `RUST_LOG`, `LOG_FORMAT`, `ENVIRONMENT`
//! - **Providers**: `SOCIALGATE_<PROVIDER>_CLIENT_ID`, `_CLIENT_SECRET`,
//!   `_REDIRECT_URL`, `_AUTH_URL`, `_TOKEN_URL`, `_API_BASE_URL`,
//!   `_REVOKE_URL`, `_SCOPES`

use serde::{Deserialize, Serialize};
use socialgate_core::config::{load_provider_env_config, ProviderEnvDefaults};
use socialgate_providers::{
    initialize_shared_client, ConnectorFamily, HttpClientConfig, ProviderRegistry,
};
use tracing::{debug, info};

use crate::constants::providers::canonical;
use crate::errors::{AppError, AppResult};
use crate::logging::LoggingConfig;

/// Settings of one registered provider after environment overrides
///
/// Secrets are reduced to presence flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Connector family
    pub family: ConnectorFamily,
    /// Canonical provider name
    pub name: String,
    /// Whether a client id is set
    pub has_client_id: bool,
    /// Whether a client secret is set
    pub has_client_secret: bool,
    /// Registered redirect URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    /// API base URL in use
    pub api_base_url: String,
    /// Requested scopes
    pub scopes: Vec<String>,
}

impl ProviderSettings {
    /// Whether both application keys are present
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.has_client_id && self.has_client_secret
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Shared HTTP client settings
    pub http: HttpClientConfig,
    /// Logging settings
    pub logging: LoggingConfig,
    /// Every provider of the registry, sorted by family and name
    pub providers: Vec<ProviderSettings>,
}

impl AppConfig {
    /// Read the whole configuration from the environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with_registry(&ProviderRegistry::new())
    }

    /// Read the configuration for the providers of `registry`
    #[must_use]
    pub fn from_env_with_registry(registry: &ProviderRegistry) -> Self {
        let providers: Vec<ProviderSettings> = registry
            .supported_providers()
            .into_iter()
            .filter_map(|(family, name)| {
                let config = registry.default_config(family, name)?;
                let scopes: Vec<&str> = config.default_scopes.iter().map(String::as_str).collect();
                let env = load_provider_env_config(
                    &config.name,
                    ProviderEnvDefaults {
                        auth_url: &config.auth_url,
                        token_url: &config.token_url,
                        api_base_url: &config.api_base_url,
                        revoke_url: config.revoke_url.as_deref(),
                        scopes: &scopes,
                    },
                );
                Some(ProviderSettings {
                    family,
                    name: name.to_owned(),
                    has_client_id: env.client_id.is_some(),
                    has_client_secret: env.client_secret.is_some(),
                    redirect_url: env.redirect_url,
                    api_base_url: env.api_base_url,
                    scopes: env.scopes,
                })
            })
            .collect();

        debug!("Loaded settings for {} provider(s)", providers.len());
        Self {
            http: HttpClientConfig::from_env(),
            logging: LoggingConfig::from_env(),
            providers,
        }
    }

    /// Settings of one provider
    ///
    /// # Errors
    ///
    /// `UnknownProvider` when the registry has no such provider in `family`
    pub fn provider(&self, family: ConnectorFamily, name: &str) -> AppResult<&ProviderSettings> {
        let name_key = canonical(name);
        self.providers
            .iter()
            .find(|p| p.family == family && p.name == name_key)
            .ok_or_else(|| AppError::unknown_provider(name))
    }

    /// Providers with both application keys set
    #[must_use]
    pub fn configured_providers(&self) -> Vec<&ProviderSettings> {
        self.providers.iter().filter(|p| p.is_configured()).collect()
    }

    /// Install the logger and the shared HTTP client settings
    ///
    /// Call once at startup, before any connector makes a request.
    ///
    /// # Errors
    ///
    /// Logger installation failures
    pub fn apply(&self) -> AppResult<()> {
        self.logging.init()?;
        initialize_shared_client(self.http.clone());
        info!(
            timeout_secs = self.http.timeout_secs,
            configured = self.configured_providers().len(),
            "Configuration applied"
        );
        Ok(())
    }
}
