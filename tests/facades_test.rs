// ABOUTME: Tests for the provider-dispatching facades and their per-instance sessions
// ABOUTME: Covers capability gating, unknown providers, alias sessions, isolation and reset
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::env;

use serial_test::serial;
use socialgate::errors::{ErrorCode, ErrorKind};
use socialgate::models::{Credentials, ExportRequest, ExportTarget, MediaUpload, PostRequest};
use socialgate::providers::Connector;
use socialgate::{EcommerceFacade, ProviderCapabilities, SocialNetworks};
use url::Url;

use common::{test_keys, test_registry, TEST_TOKEN};

fn facade() -> SocialNetworks {
    common::init_test_logging();
    SocialNetworks::with_registry(test_registry())
}

#[tokio::test]
async fn test_unknown_provider() {
    let social = facade();
    assert!(!social.is_supported("myspace"));

    let err = social.connector("myspace").await.err().unwrap();
    assert_eq!(err.code, ErrorCode::UnknownProvider);
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let err = social
        .export_posts("myspace", &ExportRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UnknownProvider);
    assert!(social.active_providers().await.is_empty());
}

#[tokio::test]
async fn test_missing_capabilities_fail_before_any_call() {
    let social = facade();

    let err = social
        .export_followers("reddit", &ExportRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UnsupportedFeature);
    assert_eq!(err.provider.as_deref(), Some("reddit"));

    let err = social
        .export_posts("instagram", &ExportRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UnsupportedFeature);

    let err = social
        .post("youtube", PostRequest::message("hello"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UnsupportedFeature);

    let err = social
        .import_media(
            "reddit",
            "me",
            MediaUpload::from_url("https://example.com/a.png"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UnsupportedFeature);

    let err = social
        .export_all("google", ExportTarget::Media, ExportRequest::default(), None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UnsupportedFeature);

    // Nothing above needed a connector
    assert!(social.active_providers().await.is_empty());
}

#[tokio::test]
async fn test_operations_without_credentials() {
    let social = facade();
    assert!(!social.is_authenticated("twitter").await.unwrap());

    let err = social
        .export_posts("twitter", &ExportRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthRequired);

    let err = social
        .request_authorization("twitter", None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ApiKeysMissing);
}

#[tokio::test]
async fn test_invalid_post_is_rejected() {
    let social = facade();
    let err = social
        .post("facebook", PostRequest::message(" "))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingRequiredField);

    let err = social
        .post(
            "facebook",
            PostRequest::message("hi").with_link("not a url"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MalformedUrl);
}

#[tokio::test]
async fn test_aliases_share_one_session() {
    let social = facade();
    social
        .set_access_token("x", Credentials::new(TEST_TOKEN))
        .await
        .unwrap();
    assert!(social.is_authenticated("twitter").await.unwrap());
    assert!(social.is_authenticated("X").await.unwrap());

    let connector = social.connector("x").await.unwrap();
    assert_eq!(connector.name(), "twitter");
    assert_eq!(social.active_providers().await, vec!["twitter"]);
}

#[tokio::test]
async fn test_facades_do_not_share_credentials() {
    let registry = test_registry();
    let alice = SocialNetworks::with_registry(registry.clone());
    let bob = SocialNetworks::with_registry(registry);

    alice
        .set_access_token("reddit", Credentials::new("alice-token"))
        .await
        .unwrap();
    assert!(alice.is_authenticated("reddit").await.unwrap());
    assert!(!bob.is_authenticated("reddit").await.unwrap());

    let token = alice
        .connector("reddit")
        .await
        .unwrap()
        .state()
        .access_token()
        .await
        .unwrap();
    assert_eq!(token, "alice-token");
}

#[tokio::test]
async fn test_reset_drops_the_session() {
    let social = facade();
    social
        .set_access_token("pinterest", Credentials::new(TEST_TOKEN))
        .await
        .unwrap();
    social.set_api_keys("tumblr", test_keys()).await.unwrap();
    assert_eq!(social.active_providers().await, vec!["pinterest", "tumblr"]);

    assert!(social.reset("pinterest").await);
    assert!(!social.reset("pinterest").await);
    assert_eq!(social.active_providers().await, vec!["tumblr"]);
    assert!(!social.is_authenticated("pinterest").await.unwrap());
}

#[tokio::test]
async fn test_disconnect_forgets_credentials() {
    let social = facade();
    social
        .set_access_token("instagram", Credentials::new(TEST_TOKEN))
        .await
        .unwrap();
    social.disconnect("instagram").await.unwrap();
    assert!(!social.is_authenticated("instagram").await.unwrap());
}

#[tokio::test]
async fn test_blank_token_is_rejected() {
    let social = facade();
    let err = social
        .set_access_token("facebook", Credentials::new("  "))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::EmptyParameter);
    assert!(!social.is_authenticated("facebook").await.unwrap());
}

#[test]
fn test_capabilities_through_facade() {
    let social = facade();
    assert_eq!(social.supported().len(), 9);
    let caps = social.capabilities("pinterest").unwrap();
    assert!(caps.can_post());
    assert!(caps.contains(ProviderCapabilities::COLLECTIONS));
    assert_eq!(
        social.capabilities("shopify").unwrap_err().code,
        ErrorCode::UnknownProvider
    );

    let shop = EcommerceFacade::with_registry(test_registry());
    assert_eq!(shop.supported(), vec!["shopify"]);
    assert!(!shop.is_supported("reddit"));
}

#[tokio::test]
#[serial]
async fn test_api_keys_from_environment() {
    env::set_var("SOCIALGATE_TWITTER_CLIENT_ID", "env-twitter-id");
    env::set_var("SOCIALGATE_TWITTER_CLIENT_SECRET", "env-twitter-secret");
    env::set_var(
        "SOCIALGATE_TWITTER_REDIRECT_URL",
        "https://app.example.com/twitter",
    );

    let social = facade();
    let result = social.set_api_keys_from_env("twitter").await;

    env::remove_var("SOCIALGATE_TWITTER_CLIENT_ID");
    env::remove_var("SOCIALGATE_TWITTER_CLIENT_SECRET");
    env::remove_var("SOCIALGATE_TWITTER_REDIRECT_URL");
    result.unwrap();

    let request = social.request_authorization("twitter", None).await.unwrap();
    let url = Url::parse(&request.url).unwrap();
    let client_id = url
        .query_pairs()
        .find(|(key, _)| key == "client_id")
        .map(|(_, value)| value.into_owned());
    assert_eq!(client_id.as_deref(), Some("env-twitter-id"));
    assert_eq!(
        request.redirect_url.as_deref(),
        Some("https://app.example.com/twitter")
    );
    assert!(request.code_verifier.is_some());
}
