// ABOUTME: Environment-based provider configuration loading
// ABOUTME: Reads SOCIALGATE_<PROVIDER>_* variables with legacy <PROVIDER>_* fallbacks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

//! Provider configuration from the environment.
//!
//! Every provider can be tuned without code changes:
//!
//! ```text
//! export SOCIALGATE_SHOPIFY_CLIENT_ID=your_api_key
//! export SOCIALGATE_SHOPIFY_CLIENT_SECRET=your_api_secret
//! export SOCIALGATE_SHOPIFY_API_BASE_URL=https://{shop}/admin/api/2024-10
//! export SOCIALGATE_SHOPIFY_SCOPES=read_products,write_products
//! ```

use std::env;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::env_config::PROVIDER_PREFIX;

/// Configuration values for one provider, after environment overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEnvConfig {
    /// OAuth client id (consumer key for OAuth 1.0a)
    pub client_id: Option<String>,
    /// OAuth client secret (consumer secret for OAuth 1.0a)
    pub client_secret: Option<String>,
    /// Registered redirect URL
    pub redirect_url: Option<String>,
    /// Authorization endpoint
    pub auth_url: String,
    /// Token endpoint
    pub token_url: String,
    /// API base URL
    pub api_base_url: String,
    /// Token revocation endpoint
    pub revoke_url: Option<String>,
    /// Requested scopes
    pub scopes: Vec<String>,
}

/// Defaults a provider ships with, before environment overrides
#[derive(Debug, Clone, Copy)]
pub struct ProviderEnvDefaults<'a> {
    /// Authorization endpoint
    pub auth_url: &'a str,
    /// Token endpoint
    pub token_url: &'a str,
    /// API base URL
    pub api_base_url: &'a str,
    /// Token revocation endpoint
    pub revoke_url: Option<&'a str>,
    /// Default scopes
    pub scopes: &'a [&'a str],
}

fn provider_var(provider_upper: &str, key: &str) -> Option<String> {
    env::var(format!("{PROVIDER_PREFIX}_{provider_upper}_{key}"))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

fn provider_var_with_legacy(provider_upper: &str, key: &str) -> Option<String> {
    provider_var(provider_upper, key).or_else(|| {
        env::var(format!("{provider_upper}_{key}"))
            .ok()
            .filter(|v| !v.trim().is_empty())
    })
}

/// Load provider configuration from environment variables
///
/// Client credentials fall back to the unprefixed legacy names
/// (`FACEBOOK_CLIENT_ID`); endpoint overrides only use the prefixed form.
#[must_use]
pub fn load_provider_env_config(provider: &str, defaults: ProviderEnvDefaults<'_>) -> ProviderEnvConfig {
    let provider_upper = provider.to_uppercase();

    let client_id = provider_var_with_legacy(&provider_upper, "CLIENT_ID");
    let client_secret = provider_var_with_legacy(&provider_upper, "CLIENT_SECRET");
    let redirect_url = provider_var_with_legacy(&provider_upper, "REDIRECT_URL");

    let auth_url = provider_var(&provider_upper, "AUTH_URL")
        .unwrap_or_else(|| defaults.auth_url.to_owned());
    let token_url = provider_var(&provider_upper, "TOKEN_URL")
        .unwrap_or_else(|| defaults.token_url.to_owned());
    let api_base_url = provider_var(&provider_upper, "API_BASE_URL")
        .unwrap_or_else(|| defaults.api_base_url.to_owned());
    let revoke_url = provider_var(&provider_upper, "REVOKE_URL")
        .or_else(|| defaults.revoke_url.map(ToOwned::to_owned));

    let scopes = provider_var(&provider_upper, "SCOPES").map_or_else(
        || defaults.scopes.iter().map(|s| (*s).to_owned()).collect(),
        |s| parse_scopes(&s),
    );

    debug!(
        provider,
        has_client_id = client_id.is_some(),
        has_client_secret = client_secret.is_some(),
        "Loaded provider environment config"
    );

    ProviderEnvConfig {
        client_id,
        client_secret,
        redirect_url,
        auth_url,
        token_url,
        api_base_url,
        revoke_url,
        scopes,
    }
}

/// Parse comma-separated scopes
#[must_use]
pub fn parse_scopes(scopes_str: &str) -> Vec<String> {
    scopes_str
        .split(',')
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scopes_skips_blanks() {
        assert_eq!(
            parse_scopes("read_products, write_products,,"),
            vec!["read_products".to_owned(), "write_products".to_owned()]
        );
    }
}
