// ABOUTME: Tests for the provider registry: lookup, aliases, capabilities and external bundles
// ABOUTME: Also covers application keys read from SOCIALGATE_<PROVIDER>_* environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;

use serial_test::serial;
use socialgate::errors::{ErrorCode, ErrorKind};
use socialgate::providers::registry::create_registry_with_external_providers;
use socialgate::providers::{
    reddit, shopify, AuthScheme, Connector, ConnectorFactory, OAuthEndpoints, ProviderBundle,
    ProviderDescriptor,
};
use socialgate::{ConnectorFamily, ProviderCapabilities, ProviderRegistry};

struct LemmyDescriptor;

impl ProviderDescriptor for LemmyDescriptor {
    fn name(&self) -> &'static str {
        "lemmy"
    }

    fn display_name(&self) -> &'static str {
        "Lemmy"
    }

    fn family(&self) -> ConnectorFamily {
        ConnectorFamily::Social
    }

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::OAuth2
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::POST | ProviderCapabilities::POSTS
    }

    fn endpoints(&self) -> OAuthEndpoints {
        OAuthEndpoints::oauth2(
            "https://lemmy.example.com/authorize",
            "https://lemmy.example.com/token",
        )
    }

    fn api_base_url(&self) -> &'static str {
        "https://lemmy.example.com/api/v3"
    }

    fn default_scopes(&self) -> &'static [&'static str] {
        &["read", "submit"]
    }
}

#[test]
fn test_supported_providers_per_family() {
    let registry = ProviderRegistry::new();
    assert_eq!(
        registry.supported(ConnectorFamily::Social),
        vec![
            "facebook",
            "flickr",
            "google",
            "instagram",
            "pinterest",
            "reddit",
            "tumblr",
            "twitter",
            "vkontakte"
        ]
    );
    assert_eq!(registry.supported(ConnectorFamily::Ecommerce), vec!["shopify"]);
    assert_eq!(registry.supported(ConnectorFamily::Marketing), vec!["facebook"]);
    assert_eq!(registry.supported_providers().len(), 11);
}

#[test]
fn test_aliases_resolve_to_canonical_names() {
    let registry = ProviderRegistry::new();
    for alias in ["youtube", "YouTube", " google "] {
        assert!(registry.is_supported(ConnectorFamily::Social, alias), "{alias}");
    }
    assert!(registry.is_supported(ConnectorFamily::Social, "x"));
    assert!(registry.is_supported(ConnectorFamily::Social, "vk"));

    let connector = registry.create_social("youtube").unwrap();
    assert_eq!(connector.name(), "google");
}

#[test]
fn test_unknown_provider() {
    let registry = ProviderRegistry::new();
    assert!(!registry.is_supported(ConnectorFamily::Social, "myspace"));
    assert!(registry.capabilities(ConnectorFamily::Social, "myspace").is_none());

    let err = registry.create_social("myspace").err().unwrap();
    assert_eq!(err.code, ErrorCode::UnknownProvider);
    assert_eq!(err.kind(), ErrorKind::Configuration);

    // Shopify is not a social network
    let err = registry.create_social("shopify").err().unwrap();
    assert_eq!(err.code, ErrorCode::UnknownProvider);
}

#[test]
fn test_facebook_exists_in_two_families() {
    let registry = ProviderRegistry::new();
    let social = registry
        .capabilities(ConnectorFamily::Social, "facebook")
        .unwrap();
    let marketing = registry
        .capabilities(ConnectorFamily::Marketing, "facebook")
        .unwrap();
    assert!(social.can_post());
    assert!(!social.contains(ProviderCapabilities::ADS));
    assert_eq!(marketing, ProviderCapabilities::ADS);
}

#[test]
fn test_capability_matrix() {
    let registry = ProviderRegistry::new();
    let caps = |name: &str| {
        registry
            .capabilities(ConnectorFamily::Social, name)
            .unwrap()
    };

    assert!(caps("reddit").can_post());
    assert!(!caps("reddit").can_upload_media());
    assert!(!caps("reddit").contains(ProviderCapabilities::FOLLOWERS));
    assert!(caps("instagram").contains(ProviderCapabilities::MEDIA));
    assert!(!caps("instagram").contains(ProviderCapabilities::POSTS));
    assert!(caps("google").contains(ProviderCapabilities::SUBSCRIPTIONS));
    assert!(!caps("google").can_post());
    assert!(caps("flickr").contains(ProviderCapabilities::MEDIA));

    let shop = registry
        .capabilities(ConnectorFamily::Ecommerce, "shopify")
        .unwrap();
    assert_eq!(shop, ProviderCapabilities::shop());
}

#[test]
fn test_auth_schemes() {
    let registry = ProviderRegistry::new();
    let scheme = |name: &str| {
        registry
            .descriptor(ConnectorFamily::Social, name)
            .unwrap()
            .auth_scheme()
    };
    assert_eq!(scheme("twitter"), AuthScheme::OAuth2Pkce);
    assert_eq!(scheme("tumblr"), AuthScheme::OAuth1);
    assert_eq!(scheme("flickr"), AuthScheme::OAuth1);
    assert_eq!(scheme("reddit"), AuthScheme::OAuth2);
    assert!(AuthScheme::OAuth1.requires_secret());
    assert!(!AuthScheme::OAuth2Pkce.requires_secret());
}

#[test]
fn test_oauth1_providers_have_request_token_endpoint() {
    let registry = ProviderRegistry::new();
    for name in ["tumblr", "flickr"] {
        let config = registry
            .default_config(ConnectorFamily::Social, name)
            .unwrap();
        assert!(config.request_token_url.is_some(), "{name}");
    }
    let reddit = registry
        .default_config(ConnectorFamily::Social, "reddit")
        .unwrap();
    assert!(reddit.request_token_url.is_none());
}

#[test]
fn test_set_default_config() {
    let mut registry = ProviderRegistry::new();
    let mut config = registry
        .default_config(ConnectorFamily::Social, "reddit")
        .cloned()
        .unwrap();
    config.api_base_url = "http://localhost:9999".to_owned();
    registry
        .set_default_config(ConnectorFamily::Social, "reddit", config)
        .unwrap();

    let connector = registry.create_social("reddit").unwrap();
    assert_eq!(connector.config().api_base_url, "http://localhost:9999");

    let unknown = registry
        .default_config(ConnectorFamily::Social, "reddit")
        .cloned()
        .unwrap();
    let err = registry
        .set_default_config(ConnectorFamily::Social, "myspace", unknown)
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UnknownProvider);
}

#[test]
fn test_external_bundle_registration() {
    let bundle = ProviderBundle::new(
        Box::new(LemmyDescriptor),
        ConnectorFactory::Social(reddit::create_connector),
    );
    let registry = create_registry_with_external_providers(vec![bundle]).unwrap();

    assert!(registry.is_supported(ConnectorFamily::Social, "lemmy"));
    let config = registry
        .default_config(ConnectorFamily::Social, "lemmy")
        .unwrap();
    assert_eq!(config.api_base_url, "https://lemmy.example.com/api/v3");
    assert_eq!(config.default_scopes, vec!["read", "submit"]);
    assert!(registry.create_social("lemmy").is_ok());
}

#[test]
fn test_bundle_family_mismatch_is_rejected() {
    let mut registry = ProviderRegistry::empty();
    let bundle = ProviderBundle::new(
        Box::new(LemmyDescriptor),
        ConnectorFactory::Ecommerce(shopify::create_connector),
    );
    let err = registry.register_provider_bundle(bundle).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(!registry.is_supported(ConnectorFamily::Social, "lemmy"));
}

#[test]
fn test_empty_registry() {
    let registry = ProviderRegistry::empty();
    assert!(registry.supported_providers().is_empty());
    assert_eq!(
        registry.create_marketing("facebook").err().unwrap().code,
        ErrorCode::UnknownProvider
    );
}

#[test]
#[serial]
fn test_api_keys_from_env() {
    env::set_var("SOCIALGATE_REDDIT_CLIENT_ID", "env-client");
    env::set_var("SOCIALGATE_REDDIT_CLIENT_SECRET", "env-secret");
    env::set_var("SOCIALGATE_REDDIT_REDIRECT_URL", "https://app.example.com/reddit");
    env::set_var("SOCIALGATE_REDDIT_SCOPES", "identity, submit");

    let registry = ProviderRegistry::new();
    let keys = registry
        .api_keys_from_env(ConnectorFamily::Social, "reddit")
        .unwrap();
    assert_eq!(keys.client_id, "env-client");
    assert_eq!(keys.client_secret, "env-secret");
    assert_eq!(
        keys.redirect_url.as_deref(),
        Some("https://app.example.com/reddit")
    );
    assert_eq!(keys.scopes, vec!["identity", "submit"]);

    env::remove_var("SOCIALGATE_REDDIT_CLIENT_ID");
    env::remove_var("SOCIALGATE_REDDIT_CLIENT_SECRET");
    env::remove_var("SOCIALGATE_REDDIT_REDIRECT_URL");
    env::remove_var("SOCIALGATE_REDDIT_SCOPES");
}

#[test]
#[serial]
fn test_api_keys_from_env_missing() {
    env::remove_var("SOCIALGATE_PINTEREST_CLIENT_ID");
    env::remove_var("PINTEREST_CLIENT_ID");
    env::set_var("SOCIALGATE_PINTEREST_CLIENT_SECRET", "secret");

    let registry = ProviderRegistry::new();
    let err = registry
        .api_keys_from_env(ConnectorFamily::Social, "pinterest")
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigMissing);
    assert!(err.message.contains("SOCIALGATE_PINTEREST_CLIENT_ID"));

    env::remove_var("SOCIALGATE_PINTEREST_CLIENT_SECRET");
}

#[test]
#[serial]
fn test_api_base_url_override_from_env() {
    env::set_var("SOCIALGATE_TUMBLR_API_BASE_URL", "http://127.0.0.1:4010/v2");
    let registry = ProviderRegistry::new();
    env::remove_var("SOCIALGATE_TUMBLR_API_BASE_URL");

    let config = registry
        .default_config(ConnectorFamily::Social, "tumblr")
        .unwrap();
    assert_eq!(config.api_base_url, "http://127.0.0.1:4010/v2");
}
