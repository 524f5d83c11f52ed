// ABOUTME: Integration tests for the Facebook Marketing connector and the marketing facade
// ABOUTME: Covers ad account paging, campaigns, custom audiences and hashed e-mail uploads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use serde_json::json;
use socialgate::errors::ErrorCode;
use socialgate::facades::MarketingExport;
use socialgate::models::{Campaign, ExportRequest};
use socialgate::providers::facebook_marketing::hash_email;
use socialgate::MarketingFacade;
use wiremock::matchers::{bearer_token, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{marketing_session, test_registry, TEST_TOKEN};

const EXAMPLE_HASH: &str = "973dfe463ec85785f5f95af5ba3906eedb2d931c24e69824a89ea65dba4e813b";

#[test]
fn test_hash_email_normalizes_case_and_whitespace() {
    assert_eq!(hash_email("test@example.com"), EXAMPLE_HASH);
    assert_eq!(hash_email("\tTEST@example.com  "), EXAMPLE_HASH);
    assert_ne!(hash_email("other@example.com"), EXAMPLE_HASH);
}

#[tokio::test]
async fn test_ad_accounts_follow_graph_cursors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/adaccounts"))
        .and(query_param("after", "QVFIUk1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "act_2", "name": "Second", "currency": "USD" }],
            "paging": { "cursors": { "before": "QVFIUk1", "after": "QVFIUk2" } }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me/adaccounts"))
        .and(bearer_token(TEST_TOKEN))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "act_1",
                "name": "First",
                "currency": "EUR",
                "created_time": "2023-05-01T10:00:00+0000"
            }],
            "paging": {
                "cursors": { "before": "QVFIUk0", "after": "QVFIUk1" },
                "next": "https://graph.facebook.com/v19.0/me/adaccounts?after=QVFIUk1"
            }
        })))
        .mount(&server)
        .await;
    let marketing = marketing_session(&server).await;

    let request = ExportRequest::default().with_max_results(1);
    let page = marketing
        .export_ad_accounts("facebook", &request)
        .await
        .unwrap();
    assert!(page.has_more);
    assert_eq!(page.items[0].id, "act_1");
    assert_eq!(page.items[0].title.as_deref(), Some("First"));
    assert_eq!(page.items[0].text.as_deref(), Some("EUR"));
    assert!(page.items[0].created_at.is_some());

    let all = marketing
        .export_all("facebook", MarketingExport::AdAccounts, request, None)
        .await
        .unwrap();
    let ids: Vec<_> = all.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec!["act_1", "act_2"]);
}

#[tokio::test]
async fn test_campaigns_of_an_ad_account() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/act_42/campaigns"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "238",
                "name": "Spring sale",
                "objective": "OUTCOME_TRAFFIC",
                "status": "ACTIVE",
                "daily_budget": "5000"
            }]
        })))
        .mount(&server)
        .await;
    let marketing = marketing_session(&server).await;

    let page = marketing
        .export_campaigns("facebook", &ExportRequest::for_entity("42"))
        .await
        .unwrap();
    assert!(!page.has_more);
    let campaign = &page.items[0];
    assert_eq!(campaign.title.as_deref(), Some("Spring sale"));
    assert_eq!(campaign.text.as_deref(), Some("OUTCOME_TRAFFIC / ACTIVE"));
    assert_eq!(campaign.count, Some(5000));

    let err = marketing
        .export_campaigns("facebook", &ExportRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingRequiredField);
}

#[tokio::test]
async fn test_create_campaign() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/act_42/campaigns"))
        .and(body_string_contains("objective=OUTCOME_AWARENESS"))
        .and(body_string_contains("status=PAUSED"))
        .and(body_string_contains("daily_budget=1000"))
        .and(body_string_contains("special_ad_categories=%5B%5D"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "120200" })))
        .expect(1)
        .mount(&server)
        .await;
    let marketing = marketing_session(&server).await;

    let campaign = Campaign {
        daily_budget: Some(1000),
        ..Campaign::new("Launch", "OUTCOME_AWARENESS")
    };
    let created = marketing
        .create_campaign("facebook", "act_42", campaign)
        .await
        .unwrap();
    assert_eq!(created.id.as_deref(), Some("120200"));
    assert_eq!(created.name, "Launch");
    assert_eq!(created.raw["id"], "120200");

    let err = marketing
        .create_campaign("facebook", "act_42", Campaign::new("No objective", ""))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::EmptyParameter);
}

#[tokio::test]
async fn test_audiences() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/act_42/customaudiences"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "6001",
                "name": "Newsletter",
                "subtype": "CUSTOM",
                "approximate_count_lower_bound": 1000,
                "time_created": 1_700_000_000
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/act_42/customaudiences"))
        .and(body_string_contains("name=VIP"))
        .and(body_string_contains("customer_file_source=USER_PROVIDED_ONLY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "6002" })))
        .expect(1)
        .mount(&server)
        .await;
    let marketing = marketing_session(&server).await;

    let page = marketing
        .export_audiences("facebook", &ExportRequest::for_entity("act_42"))
        .await
        .unwrap();
    let audience = &page.items[0];
    assert_eq!(audience.title.as_deref(), Some("Newsletter"));
    assert_eq!(audience.text.as_deref(), Some("CUSTOM"));
    assert_eq!(audience.count, Some(1000));
    assert!(audience.created_at.is_some());

    let created = marketing
        .create_audience("facebook", "42", "VIP", Some("Top buyers"))
        .await
        .unwrap();
    assert_eq!(created.id, "6002");
    assert_eq!(created.title.as_deref(), Some("VIP"));
    assert_eq!(created.text.as_deref(), Some("Top buyers"));
}

#[tokio::test]
async fn test_add_audience_users_uploads_hashes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/6001/users"))
        .and(body_string_contains("EMAIL_SHA256"))
        .and(body_string_contains(EXAMPLE_HASH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "audience_id": "6001",
            "session_id": 9_876_543_210_u64,
            "num_received": 2,
            "num_invalid_entries": 0
        })))
        .expect(1)
        .mount(&server)
        .await;
    let marketing = marketing_session(&server).await;

    let emails = vec![
        " Test@Example.com".to_owned(),
        "   ".to_owned(),
        "jane@example.org".to_owned(),
    ];
    let result = marketing
        .add_audience_users("facebook", "6001", &emails)
        .await
        .unwrap();
    assert_eq!(result.audience_id, "6001");
    assert_eq!(result.num_received, 2);
    assert_eq!(result.num_invalid_entries, 0);
    assert_eq!(result.session_id.as_deref(), Some("9876543210"));
}

#[tokio::test]
async fn test_add_audience_users_requires_addresses() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let marketing = marketing_session(&server).await;

    let err = marketing
        .add_audience_users("facebook", "6001", &[])
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingRequiredField);

    let blanks = vec![" ".to_owned(), String::new()];
    let err = marketing
        .add_audience_users("facebook", "6001", &blanks)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::EmptyParameter);
}

#[tokio::test]
async fn test_graph_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/adaccounts"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "message": "(#100) Missing permissions",
                "type": "OAuthException",
                "code": 100
            }
        })))
        .mount(&server)
        .await;
    let marketing = marketing_session(&server).await;

    let err = marketing
        .export_ad_accounts("facebook", &ExportRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ExternalServiceError);
    assert_eq!(err.message, "(#100) Missing permissions");
}

#[tokio::test]
async fn test_only_facebook_offers_marketing() {
    let marketing = MarketingFacade::with_registry(test_registry());
    assert_eq!(marketing.supported(), vec!["facebook"]);

    let err = marketing
        .export_ad_accounts("reddit", &ExportRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UnknownProvider);

    let err = marketing
        .export_ad_accounts("facebook", &ExportRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthRequired);
}

#[test]
fn test_marketing_export_names() {
    assert_eq!(
        "ad-accounts".parse::<MarketingExport>().unwrap(),
        MarketingExport::AdAccounts
    );
    assert_eq!(
        " Custom_Audiences ".parse::<MarketingExport>().unwrap(),
        MarketingExport::Audiences
    );
    assert_eq!(MarketingExport::Campaigns.to_string(), "campaigns");
    let err = "ads".parse::<MarketingExport>().unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}
