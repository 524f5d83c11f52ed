// ABOUTME: Tests for the OAuth 2.0 and OAuth 1.0a handshakes against mocked vendor endpoints
// ABOUTME: Covers consent URLs, PKCE, state checks, token exchange, refresh, revocation and signing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::collections::HashMap;

use chrono::{Duration, Utc};
use reqwest::Method;
use socialgate::errors::ErrorCode;
use socialgate::models::{AuthorizationCallback, Credentials};
use socialgate::providers::oauth1::{parse_form_response, percent_encode, OAuth1Signer};
use socialgate::providers::oauth2::{authorization_url, OAuthSettings, PkceParams, TokenAuth};
use socialgate::providers::Connector;
use url::Url;
use wiremock::matchers::{basic_auth, body_string_contains, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{social_session, social_unauthenticated, TEST_REDIRECT, TEST_TOKEN};

fn query_map(url: &str) -> HashMap<String, String> {
    Url::parse(url)
        .unwrap()
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

#[test]
fn test_pkce_challenge_vector() {
    let pkce = PkceParams::from_verifier("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk".to_owned());
    assert_eq!(
        pkce.code_challenge,
        "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
    );

    let generated = PkceParams::generate();
    assert_eq!(generated.code_verifier.len(), 64);
    assert_ne!(generated.code_verifier, PkceParams::generate().code_verifier);
}

#[test]
fn test_authorization_url_parameters() {
    let settings = OAuthSettings {
        scope_separator: ",",
        token_auth: TokenAuth::Form,
        extra_auth_params: &[("display", "page")],
    };
    let url = authorization_url(
        "https://oauth.example.com/authorize",
        "client",
        TEST_REDIRECT,
        &["wall".to_owned(), "photos".to_owned()],
        "xyz",
        &settings,
        None,
    )
    .unwrap();

    let query = query_map(&url);
    assert_eq!(query["client_id"], "client");
    assert_eq!(query["redirect_uri"], TEST_REDIRECT);
    assert_eq!(query["response_type"], "code");
    assert_eq!(query["state"], "xyz");
    assert_eq!(query["scope"], "wall,photos");
    assert_eq!(query["display"], "page");
    assert!(!query.contains_key("code_challenge"));
}

#[tokio::test]
async fn test_reddit_consent_url() {
    let server = MockServer::start().await;
    let social = social_unauthenticated("reddit", &server).await;

    let request = social.request_authorization("reddit", None).await.unwrap();
    assert!(request.url.starts_with(&format!("{}/oauth/authorize", server.uri())));

    let query = query_map(&request.url);
    assert_eq!(query["duration"], "permanent");
    assert_eq!(query["client_id"], "test-client-id");
    assert_eq!(Some(&query["state"]), request.state.as_ref());
    assert_eq!(request.redirect_url.as_deref(), Some(TEST_REDIRECT));
    assert!(request.code_verifier.is_none());
    assert_eq!(query["scope"], "identity read submit mysubreddits history");
}

#[tokio::test]
async fn test_vkontakte_scopes_are_comma_separated() {
    let server = MockServer::start().await;
    let social = social_unauthenticated("vk", &server).await;

    let request = social.request_authorization("vkontakte", None).await.unwrap();
    let query = query_map(&request.url);
    assert_eq!(query["display"], "page");
    assert_eq!(query["scope"], "wall,photos,friends,groups,offline");
}

#[tokio::test]
async fn test_twitter_consent_url_carries_pkce() {
    let server = MockServer::start().await;
    let social = social_unauthenticated("twitter", &server).await;

    let request = social
        .request_authorization("x", Some("https://other.example.com/cb"))
        .await
        .unwrap();
    let verifier = request.code_verifier.clone().unwrap();
    let query = query_map(&request.url);
    assert_eq!(query["code_challenge_method"], "S256");
    assert_eq!(
        query["code_challenge"],
        PkceParams::from_verifier(verifier).code_challenge
    );
    assert_eq!(query["redirect_uri"], "https://other.example.com/cb");
}

#[tokio::test]
async fn test_consent_url_requires_keys_and_redirect() {
    let server = MockServer::start().await;
    let social = social_unauthenticated("reddit", &server).await;

    let err = social
        .request_authorization("reddit", Some("not a url"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MalformedUrl);

    let fresh = socialgate::SocialNetworks::with_registry(common::test_registry());
    let err = fresh
        .request_authorization("reddit", None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ApiKeysMissing);
}

#[tokio::test]
async fn test_code_exchange_with_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(basic_auth("test-client-id", "test-client-secret"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=the-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "reddit-token",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "reddit-refresh",
            "scope": "identity submit"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let social = social_unauthenticated("reddit", &server).await;
    let request = social.request_authorization("reddit", None).await.unwrap();

    let mut params = HashMap::new();
    params.insert("code".to_owned(), "the-code".to_owned());
    params.insert("state".to_owned(), request.state.clone().unwrap());
    let callback = AuthorizationCallback::from_query(params).with_request(&request);

    let credentials = social.authorize("reddit", callback).await.unwrap();
    assert_eq!(credentials.access_token, "reddit-token");
    assert_eq!(credentials.refresh_token.as_deref(), Some("reddit-refresh"));
    assert_eq!(credentials.scopes, vec!["identity", "submit"]);
    assert!(credentials.expires_at.is_some());
    assert!(social.is_authenticated("reddit").await.unwrap());
}

#[tokio::test]
async fn test_token_lifetime_beyond_time_range() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "reddit-token",
            "expires_in": i64::MAX
        })))
        .expect(1)
        .mount(&server)
        .await;

    let social = social_unauthenticated("reddit", &server).await;
    let request = social.request_authorization("reddit", None).await.unwrap();

    let mut params = HashMap::new();
    params.insert("code".to_owned(), "the-code".to_owned());
    params.insert("state".to_owned(), request.state.clone().unwrap());
    let callback = AuthorizationCallback::from_query(params).with_request(&request);

    let credentials = social.authorize("reddit", callback).await.unwrap();
    assert!(credentials.expires_at.is_none());
    assert!(!credentials.is_expired());
    assert!(social.is_authenticated("reddit").await.unwrap());
}

#[tokio::test]
async fn test_code_exchange_with_form_secret_and_verifier() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("client_secret=test-client-secret"))
        .and(body_string_contains("code_verifier=my-verifier"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "vk-token",
            "expires_in": 0,
            "user_id": 1234
        })))
        .expect(1)
        .mount(&server)
        .await;

    let social = social_unauthenticated("vkontakte", &server).await;
    let callback = AuthorizationCallback {
        code_verifier: Some("my-verifier".to_owned()),
        ..AuthorizationCallback::from_code("vk-code")
    };
    let credentials = social.authorize("vk", callback).await.unwrap();
    assert_eq!(credentials.access_token, "vk-token");
    assert_eq!(credentials.user_id.as_deref(), Some("1234"));
    assert!(credentials.expires_at.is_none());
}

#[tokio::test]
async fn test_state_mismatch_is_rejected_before_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let social = social_unauthenticated("reddit", &server).await;
    let request = social.request_authorization("reddit", None).await.unwrap();
    let callback = AuthorizationCallback {
        state: Some("forged".to_owned()),
        ..AuthorizationCallback::from_code("the-code").with_request(&request)
    };

    let err = social.authorize("reddit", callback).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthInvalid);
    assert!(!social.is_authenticated("reddit").await.unwrap());
}

#[tokio::test]
async fn test_token_errors_map_to_auth_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "Code was already redeemed"
        })))
        .mount(&server)
        .await;

    let social = social_unauthenticated("pinterest", &server).await;
    let err = social
        .authorize("pinterest", AuthorizationCallback::from_code("used"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ExternalAuthFailed);
    assert!(err.message.contains("already redeemed"));
}

#[tokio::test]
async fn test_token_response_without_access_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "error": "bad_code" })),
        )
        .mount(&server)
        .await;

    let social = social_unauthenticated("reddit", &server).await;
    let err = social
        .authorize("reddit", AuthorizationCallback::from_code("x"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ExternalAuthFailed);
}

#[tokio::test]
async fn test_missing_code_is_rejected() {
    let server = MockServer::start().await;
    let social = social_unauthenticated("reddit", &server).await;
    let err = social
        .authorize("reddit", AuthorizationCallback::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingRequiredField);
}

#[tokio::test]
async fn test_refresh_when_token_expires_soon() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=old-refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "fresh-token",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let social = social_unauthenticated("reddit", &server).await;
    let stale = Credentials::new("stale-token")
        .with_refresh_token("old-refresh")
        .with_expires_at(Utc::now() + Duration::minutes(1));
    social.set_access_token("reddit", stale).await.unwrap();

    social.refresh_token_if_needed("reddit").await.unwrap();
    let connector = social.connector("reddit").await.unwrap();
    let refreshed = connector.state().credentials().await.unwrap();
    assert_eq!(refreshed.access_token, "fresh-token");
    assert_eq!(refreshed.refresh_token.as_deref(), Some("old-refresh"));
}

#[tokio::test]
async fn test_expired_token_without_refresh_token() {
    let server = MockServer::start().await;
    let social = social_unauthenticated("reddit", &server).await;
    let expired = Credentials::new("old").with_expires_at(Utc::now() - Duration::hours(1));
    social.set_access_token("reddit", expired).await.unwrap();

    let err = social
        .refresh_token_if_needed("reddit")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthExpired);
}

#[tokio::test]
async fn test_fresh_token_is_not_refreshed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let social = social_session("reddit", &server).await;
    social.refresh_token_if_needed("reddit").await.unwrap();
}

#[tokio::test]
async fn test_disconnect_revokes_and_forgets() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/revoke"))
        .and(body_string_contains(format!("token={TEST_TOKEN}")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let social = social_session("reddit", &server).await;
    assert!(social.is_authenticated("reddit").await.unwrap());
    social.disconnect("reddit").await.unwrap();
    assert!(!social.is_authenticated("reddit").await.unwrap());
}

#[tokio::test]
async fn test_disconnect_survives_revoke_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/revoke"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let social = social_session("reddit", &server).await;
    social.disconnect("reddit").await.unwrap();
    assert!(!social.is_authenticated("reddit").await.unwrap());
}

#[test]
fn test_oauth1_signature_vector() {
    let header = OAuth1Signer::new(
        "xvz1evFS4wEEPTGEFPHBog",
        "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
    )
    .with_token(
        "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
        "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
    )
    .authorization_header_with(
        &Method::POST,
        "https://api.twitter.com/1.1/statuses/update.json?include_entities=true",
        &[("status", "Hello Ladies + Gentlemen, a signed OAuth request!")],
        &[],
        "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg",
        "1318622958",
    )
    .unwrap();
    assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
    assert!(header.contains("oauth_token=\"370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb\""));
}

#[test]
fn test_oauth1_helpers() {
    assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
    assert_eq!(percent_encode("a-b.c_d~e"), "a-b.c_d~e");

    let parsed = parse_form_response("oauth_token=abc&oauth_token_secret=def&user_nsid=12%4034\n");
    assert_eq!(parsed["oauth_token"], "abc");
    assert_eq!(parsed["oauth_token_secret"], "def");
    assert_eq!(parsed["user_nsid"], "12@34");
}

#[tokio::test]
async fn test_oauth1_three_legged_flow() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/request_token"))
        .and(header_regex("authorization", "^OAuth .*oauth_callback="))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "oauth_token=request-token&oauth_token_secret=request-secret&oauth_callback_confirmed=true",
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(header_regex("authorization", "oauth_verifier=\"the-verifier\""))
        .and(header_regex("authorization", "oauth_token=\"request-token\""))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "oauth_token=access-token&oauth_token_secret=access-secret&user_nsid=99%40N01",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let social = social_unauthenticated("flickr", &server).await;
    let request = social.request_authorization("flickr", None).await.unwrap();
    assert_eq!(request.request_token.as_deref(), Some("request-token"));
    assert_eq!(request.request_token_secret.as_deref(), Some("request-secret"));
    assert!(request.state.is_none());
    assert_eq!(query_map(&request.url)["oauth_token"], "request-token");

    let mut params = HashMap::new();
    params.insert("oauth_token".to_owned(), "request-token".to_owned());
    params.insert("oauth_verifier".to_owned(), "the-verifier".to_owned());
    let callback = AuthorizationCallback::from_query(params).with_request(&request);

    let credentials = social.authorize("flickr", callback).await.unwrap();
    assert_eq!(credentials.access_token, "access-token");
    assert_eq!(credentials.access_token_secret.as_deref(), Some("access-secret"));
    assert_eq!(credentials.user_id.as_deref(), Some("99@N01"));
}

#[tokio::test]
async fn test_oauth1_callback_requires_request_secret() {
    let server = MockServer::start().await;
    let social = social_unauthenticated("tumblr", &server).await;

    let mut params = HashMap::new();
    params.insert("oauth_token".to_owned(), "request-token".to_owned());
    params.insert("oauth_verifier".to_owned(), "v".to_owned());
    let err = social
        .authorize("tumblr", AuthorizationCallback::from_query(params))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingRequiredField);
    assert!(err.message.contains("request_token_secret"));
}

#[tokio::test]
async fn test_oauth1_token_requires_secret() {
    let server = MockServer::start().await;
    let social = social_unauthenticated("tumblr", &server).await;

    let err = social
        .set_access_token("tumblr", Credentials::new("token-only"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingRequiredField);

    social
        .set_access_token("tumblr", Credentials::new("t").with_secret("s"))
        .await
        .unwrap();
    assert!(social.is_authenticated("tumblr").await.unwrap());
}

#[tokio::test]
async fn test_oauth1_request_token_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/request_token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("oauth_problem=consumer_key_unknown"))
        .mount(&server)
        .await;

    let social = social_unauthenticated("tumblr", &server).await;
    let err = social
        .request_authorization("tumblr", None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ExternalAuthFailed);
}
