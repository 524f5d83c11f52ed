// ABOUTME: Tests for environment-driven configuration of HTTP, logging and providers
// ABOUTME: Covers defaults, overrides, legacy variable names and invalid values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;

use serial_test::serial;
use socialgate::config::AppConfig;
use socialgate::errors::ErrorCode;
use socialgate::logging::{LogFormat, LoggingConfig};
use socialgate::providers::HttpClientConfig;
use socialgate::ConnectorFamily;

fn clear(vars: &[&str]) {
    for var in vars {
        env::remove_var(var);
    }
}

const HTTP_VARS: [&str; 3] = [
    "SOCIALGATE_HTTP_TIMEOUT_SECS",
    "SOCIALGATE_HTTP_CONNECT_TIMEOUT_SECS",
    "SOCIALGATE_USER_AGENT",
];

const LOG_VARS: [&str; 5] = [
    "RUST_LOG",
    "LOG_FORMAT",
    "ENVIRONMENT",
    "LOG_INCLUDE_LOCATION",
    "LOG_INCLUDE_SPANS",
];

const REDDIT_VARS: [&str; 5] = [
    "SOCIALGATE_REDDIT_CLIENT_ID",
    "SOCIALGATE_REDDIT_CLIENT_SECRET",
    "SOCIALGATE_REDDIT_SCOPES",
    "SOCIALGATE_REDDIT_API_BASE_URL",
    "REDDIT_CLIENT_SECRET",
];

#[test]
fn test_log_format_names() {
    assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
    assert_eq!(" Compact ".parse::<LogFormat>().unwrap(), LogFormat::Compact);
    assert_eq!("PRETTY".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
    assert_eq!(LogFormat::Json.to_string(), "json");

    let err = "xml".parse::<LogFormat>().unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[test]
fn test_env_filter_validation() {
    let config = LoggingConfig::default().with_level("socialgate=debug,warn");
    assert!(config.env_filter().is_ok());

    let err = LoggingConfig::default()
        .with_level("socialgate=loud")
        .env_filter()
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigError);
    assert!(err.message.contains("socialgate=loud"));
}

#[test]
#[serial]
fn test_http_defaults_and_overrides() {
    clear(&HTTP_VARS);
    let defaults = HttpClientConfig::from_env();
    assert_eq!(defaults, HttpClientConfig::default());
    assert_eq!(defaults.timeout_secs, 30);
    assert_eq!(defaults.connect_timeout_secs, 10);
    assert!(defaults.user_agent.starts_with("socialgate/"));

    env::set_var("SOCIALGATE_HTTP_TIMEOUT_SECS", " 45 ");
    env::set_var("SOCIALGATE_HTTP_CONNECT_TIMEOUT_SECS", "soon");
    env::set_var("SOCIALGATE_USER_AGENT", "crawler/1.0");
    let config = HttpClientConfig::from_env();
    clear(&HTTP_VARS);

    assert_eq!(config.timeout_secs, 45);
    assert_eq!(config.connect_timeout_secs, 10);
    assert_eq!(config.user_agent, "crawler/1.0");
}

#[test]
#[serial]
fn test_logging_from_environment() {
    clear(&LOG_VARS);
    let config = LoggingConfig::from_env();
    assert_eq!(config, LoggingConfig::default());

    env::set_var("ENVIRONMENT", "production");
    let production = LoggingConfig::from_env();
    assert_eq!(production.format, LogFormat::Json);
    assert!(production.include_location);

    env::set_var("LOG_FORMAT", "compact");
    env::set_var("RUST_LOG", "socialgate=trace");
    env::set_var("LOG_INCLUDE_SPANS", "1");
    let overridden = LoggingConfig::from_env();
    clear(&LOG_VARS);

    assert_eq!(overridden.format, LogFormat::Compact);
    assert_eq!(overridden.level, "socialgate=trace");
    assert!(overridden.include_spans);
    assert_eq!(overridden.environment, "production");
}

#[test]
#[serial]
fn test_unrecognised_log_format_falls_back() {
    clear(&LOG_VARS);
    env::set_var("LOG_FORMAT", "yaml");
    let config = LoggingConfig::from_env();
    clear(&LOG_VARS);
    assert_eq!(config.format, LogFormat::Pretty);
}

#[test]
#[serial]
fn test_provider_settings_from_environment() {
    clear(&REDDIT_VARS);
    env::set_var("SOCIALGATE_REDDIT_CLIENT_ID", "reddit-id");
    env::set_var("REDDIT_CLIENT_SECRET", "legacy-secret");
    env::set_var("SOCIALGATE_REDDIT_SCOPES", "identity, read,,");
    env::set_var("SOCIALGATE_REDDIT_API_BASE_URL", "http://localhost:9999");
    let config = AppConfig::from_env();
    clear(&REDDIT_VARS);

    let reddit = config.provider(ConnectorFamily::Social, "Reddit").unwrap();
    assert!(reddit.has_client_id);
    assert!(reddit.has_client_secret);
    assert!(reddit.is_configured());
    assert_eq!(reddit.api_base_url, "http://localhost:9999");
    assert_eq!(reddit.scopes, vec!["identity".to_owned(), "read".to_owned()]);
    assert!(config
        .configured_providers()
        .iter()
        .any(|settings| settings.name == "reddit"));

    let twitter = config.provider(ConnectorFamily::Social, "x").unwrap();
    assert_eq!(twitter.name, "twitter");

    let err = config
        .provider(ConnectorFamily::Ecommerce, "reddit")
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UnknownProvider);

    assert!(config.provider(ConnectorFamily::Marketing, "facebook").is_ok());
    assert!(config.provider(ConnectorFamily::Social, "facebook").is_ok());
}

#[test]
#[serial]
fn test_provider_defaults_without_environment() {
    clear(&REDDIT_VARS);
    env::remove_var("REDDIT_CLIENT_ID");
    let config = AppConfig::from_env();
    let reddit = config.provider(ConnectorFamily::Social, "reddit").unwrap();
    assert!(!reddit.is_configured());
    assert_eq!(reddit.api_base_url, "https://oauth.reddit.com");
    assert!(!reddit.scopes.is_empty());
}
