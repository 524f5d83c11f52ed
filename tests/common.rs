// ABOUTME: Shared test utilities for socialgate integration tests
// ABOUTME: Builds facades whose connectors point at a wiremock server with a token set
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `socialgate`
//!
//! Every helper creates its own registry and facade, so tests never share
//! credentials or endpoint overrides.

use std::sync::{Arc, Once};

use socialgate::models::{ApiKeys, Credentials};
use socialgate::{
    ConnectorFamily, EcommerceFacade, MarketingFacade, ProviderConfig, ProviderRegistry,
    SocialNetworks,
};
use wiremock::MockServer;

/// Access token every session helper installs
pub const TEST_TOKEN: &str = "test-access-token";

/// Token secret for OAuth 1.0a sessions
pub const TEST_TOKEN_SECRET: &str = "test-token-secret";

/// Redirect URL registered for test applications
pub const TEST_REDIRECT: &str = "https://app.example.com/callback";

static INIT_LOGGER: Once = Once::new();

/// Quiet logging for tests (once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("warn")
            .with_test_writer()
            .try_init();
    });
}

/// Fresh registry, independent of the process-wide one
pub fn test_registry() -> Arc<ProviderRegistry> {
    Arc::new(ProviderRegistry::new())
}

/// Default configuration of `name` with every endpoint moved onto `base`
pub fn mock_config(family: ConnectorFamily, name: &str, base: &str) -> ProviderConfig {
    let registry = ProviderRegistry::new();
    let mut config = registry
        .default_config(family, name)
        .cloned()
        .expect("provider is registered");
    config.auth_url = format!("{base}/oauth/authorize");
    config.token_url = format!("{base}/oauth/token");
    config.api_base_url = base.to_owned();
    config.revoke_url = config.revoke_url.map(|_| format!("{base}/oauth/revoke"));
    config.request_token_url = config
        .request_token_url
        .map(|_| format!("{base}/oauth/request_token"));
    config.upload_url = config.upload_url.map(|_| format!("{base}/upload"));
    config
}

/// Application keys with the test redirect URL
pub fn test_keys() -> ApiKeys {
    ApiKeys::new("test-client-id", "test-client-secret").with_redirect_url(TEST_REDIRECT)
}

/// Social facade whose `provider` connector talks to `server`, with keys but no token
pub async fn social_unauthenticated(provider: &str, server: &MockServer) -> SocialNetworks {
    init_test_logging();
    let social = SocialNetworks::with_registry(test_registry());
    social
        .configure(
            provider,
            mock_config(ConnectorFamily::Social, provider, &server.uri()),
        )
        .await
        .unwrap();
    social.set_api_keys(provider, test_keys()).await.unwrap();
    social
}

/// Social facade whose `provider` connector talks to `server` with a bearer token
pub async fn social_session(provider: &str, server: &MockServer) -> SocialNetworks {
    let social = social_unauthenticated(provider, server).await;
    social
        .set_access_token(provider, Credentials::new(TEST_TOKEN))
        .await
        .unwrap();
    social
}

/// Social facade for an OAuth 1.0a provider with token and token secret
pub async fn social_oauth1_session(provider: &str, server: &MockServer) -> SocialNetworks {
    let social = social_unauthenticated(provider, server).await;
    social
        .set_access_token(
            provider,
            Credentials::new(TEST_TOKEN).with_secret(TEST_TOKEN_SECRET),
        )
        .await
        .unwrap();
    social
}

/// Shopify facade addressing `demo.myshopify.com` under `{server}/{shop}/admin`
pub async fn shop_session(server: &MockServer) -> EcommerceFacade {
    init_test_logging();
    let shop = EcommerceFacade::with_registry(test_registry());
    let mut config = mock_config(ConnectorFamily::Ecommerce, "shopify", &server.uri());
    config.api_base_url = format!("{}/{{shop}}/admin", server.uri());
    shop.configure("shopify", config).await.unwrap();
    shop.set_store("shopify", "demo").await.unwrap();
    shop.set_access_token("shopify", Credentials::new(TEST_TOKEN))
        .await
        .unwrap();
    shop
}

/// Marketing facade whose Facebook connector talks to `server`
pub async fn marketing_session(server: &MockServer) -> MarketingFacade {
    init_test_logging();
    let marketing = MarketingFacade::with_registry(test_registry());
    marketing
        .configure(
            "facebook",
            mock_config(ConnectorFamily::Marketing, "facebook", &server.uri()),
        )
        .await
        .unwrap();
    marketing
        .set_access_token("facebook", Credentials::new(TEST_TOKEN))
        .await
        .unwrap();
    marketing
}
