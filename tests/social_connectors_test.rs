// ABOUTME: Integration tests for the Facebook, YouTube, Instagram, Pinterest, X and Tumblr connectors
// ABOUTME: Mocks each vendor API to check request shapes, DTO mapping and cursor paging
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use serde_json::json;
use socialgate::errors::ErrorCode;
use socialgate::models::{ExportKind, ExportRequest, ExportTarget, MediaUpload, PostRequest};
use socialgate::pagination::Cursor;
use wiremock::matchers::{
    bearer_token, body_partial_json, body_string_contains, header_regex, method, path,
    query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{social_oauth1_session, social_session, TEST_TOKEN};

const TUMBLR_SIGNED: &str =
    r#"^OAuth .*oauth_consumer_key="test-client-id".*oauth_token="test-access-token""#;

// ============================================================================
// Facebook
// ============================================================================

#[tokio::test]
async fn test_facebook_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(bearer_token(TEST_TOKEN))
        .and(query_param(
            "fields",
            "id,name,first_name,last_name,email,link,picture.type(large)",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "1001",
            "name": "Ferris Crab",
            "first_name": "Ferris",
            "last_name": "Crab",
            "email": "ferris@example.com",
            "picture": { "data": { "url": "https://cdn.example.com/ferris.jpg" } }
        })))
        .expect(1)
        .mount(&server)
        .await;
    let social = social_session("facebook", &server).await;

    let profile = social.check_credentials("facebook").await.unwrap();
    assert_eq!(profile.id, "1001");
    assert_eq!(profile.first_name.as_deref(), Some("Ferris"));
    assert_eq!(profile.email.as_deref(), Some("ferris@example.com"));
    assert_eq!(
        profile.avatar_url.as_deref(),
        Some("https://cdn.example.com/ferris.jpg")
    );
    assert_eq!(
        profile.profile_url.as_deref(),
        Some("https://www.facebook.com/1001")
    );
}

#[tokio::test]
async fn test_facebook_page_post_uses_page_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/555"))
        .and(query_param("fields", "access_token"))
        .and(bearer_token(TEST_TOKEN))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access_token": "page-token", "id": "555" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/555/feed"))
        .and(bearer_token("page-token"))
        .and(body_string_contains("message=Opening+hours"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "555_9" })))
        .expect(1)
        .mount(&server)
        .await;
    let social = social_session("facebook", &server).await;

    let result = social
        .post("facebook", PostRequest::message("Opening hours").on_entity("555"))
        .await
        .unwrap();
    assert_eq!(result.id, "555_9");
    assert_eq!(result.url.as_deref(), Some("https://www.facebook.com/555_9"));
}

#[tokio::test]
async fn test_facebook_photo_upload_returns_post_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/me/photos"))
        .and(bearer_token(TEST_TOKEN))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "77", "post_id": "1001_78" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    let social = social_session("facebook", &server).await;

    let media = MediaUpload::from_bytes("crab.png", "image/png", vec![0x89, 0x50])
        .with_caption("Beach day");
    let result = social.import_media("facebook", "me", media).await.unwrap();
    assert_eq!(result.id, "1001_78");
}

#[tokio::test]
async fn test_facebook_feed_export_follows_cursors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/feed"))
        .and(query_param("after", "CUR1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "1001_2", "story": "Ferris shared a link" }],
            "paging": { "cursors": { "after": "CUR2" } }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me/feed"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "1001_1",
                "message": "Hello world",
                "created_time": "2024-01-02T03:04:05+0000",
                "permalink_url": "https://www.facebook.com/1001/posts/1",
                "from": { "id": "1001", "name": "Ferris Crab" }
            }],
            "paging": {
                "cursors": { "after": "CUR1" },
                "next": "https://graph.facebook.com/v19.0/me/feed?after=CUR1"
            }
        })))
        .mount(&server)
        .await;
    let social = social_session("facebook", &server).await;

    let request = ExportRequest::default().with_max_results(1);
    let page = social.export_posts("facebook", &request).await.unwrap();
    assert!(page.has_more);
    let post = &page.items[0];
    assert_eq!(post.kind, ExportKind::Post);
    assert_eq!(post.text.as_deref(), Some("Hello world"));
    assert_eq!(post.author.as_deref(), Some("Ferris Crab"));
    assert!(post.created_at.is_some());

    let all = social
        .export_all("facebook", ExportTarget::Posts, request, None)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].text.as_deref(), Some("Ferris shared a link"));
}

// ============================================================================
// X (Twitter)
// ============================================================================

fn twitter_me() -> serde_json::Value {
    json!({
        "data": {
            "id": "2244994945",
            "name": "Ferris",
            "username": "ferris",
            "created_at": "2013-12-14T04:35:55.000Z",
            "public_metrics": {
                "followers_count": 12,
                "following_count": 3,
                "tweet_count": 250
            }
        }
    })
}

#[tokio::test]
async fn test_twitter_profile_by_handle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/by/username/ferris"))
        .and(bearer_token(TEST_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(twitter_me()))
        .expect(1)
        .mount(&server)
        .await;
    let social = social_session("x", &server).await;

    let profile = social.get_profile("twitter", "@ferris").await.unwrap();
    assert_eq!(profile.id, "2244994945");
    assert_eq!(profile.profile_url.as_deref(), Some("https://x.com/ferris"));
    assert_eq!(profile.followers_count, Some(12));
    assert_eq!(profile.posts_count, Some(250));
}

#[tokio::test]
async fn test_twitter_timeline_export() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(twitter_me()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/2244994945/tweets"))
        .and(query_param("max_results", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "1", "text": "first", "author_id": "2244994945" },
                { "id": "2", "text": "second", "author_id": "2244994945" }
            ],
            "meta": { "result_count": 2, "next_token": "7140dibdnow9c7btw3w29" }
        })))
        .mount(&server)
        .await;
    let social = social_session("twitter", &server).await;

    let page = social
        .export_posts("twitter", &ExportRequest::default().with_max_results(10))
        .await
        .unwrap();
    assert_eq!(page.count, 2);
    assert!(page.has_more);
    assert_eq!(
        page.items[0].url.as_deref(),
        Some("https://x.com/i/web/status/1")
    );
}

#[tokio::test]
async fn test_tweet_with_uploaded_media() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload/upload"))
        .and(bearer_token(TEST_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "id": "m-1" } })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/tweets"))
        .and(body_partial_json(json!({
            "text": "Look https://example.com",
            "media": { "media_ids": ["m-1"] }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": { "id": "1445880548472328192", "text": "Look https://example.com" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    let social = social_session("twitter", &server).await;

    let post = PostRequest::message("Look")
        .with_link("https://example.com")
        .with_media(MediaUpload::from_bytes("crab.png", "image/png", vec![1, 2, 3]));
    let result = social.post("twitter", post).await.unwrap();
    assert_eq!(result.id, "1445880548472328192");
}

#[tokio::test]
async fn test_overlong_tweet_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let social = social_session("twitter", &server).await;

    let err = social
        .post("twitter", PostRequest::message("a".repeat(281)))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

// ============================================================================
// Tumblr
// ============================================================================

#[tokio::test]
async fn test_tumblr_text_post() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/blog/rustblog.tumblr.com/post"))
        .and(header_regex("authorization", TUMBLR_SIGNED))
        .and(body_string_contains("type=text"))
        .and(body_string_contains("body=Hello+Tumblr"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "meta": { "status": 201, "msg": "Created" },
            "response": { "id_string": "7321" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    let social = social_oauth1_session("tumblr", &server).await;

    let result = social
        .post("tumblr", PostRequest::message("Hello Tumblr").on_entity("rustblog"))
        .await
        .unwrap();
    assert_eq!(result.id, "7321");
    assert_eq!(
        result.url.as_deref(),
        Some("https://rustblog.tumblr.com/post/7321")
    );
}

#[tokio::test]
async fn test_tumblr_posts_of_primary_blog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/info"))
        .and(header_regex("authorization", TUMBLR_SIGNED))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {
                "user": {
                    "name": "ferris",
                    "following": 4,
                    "blogs": [
                        { "name": "side", "primary": false },
                        { "name": "ferris", "primary": true, "title": "Ferris", "posts": 3 }
                    ]
                }
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blog/ferris.tumblr.com/posts"))
        .and(query_param("limit", "2"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {
                "total_posts": 3,
                "posts": [
                    { "id_string": "1", "blog_name": "ferris", "summary": "one", "timestamp": 1_700_000_000 },
                    { "id_string": "2", "blog_name": "ferris", "summary": "two", "timestamp": 1_700_000_100 }
                ]
            }
        })))
        .mount(&server)
        .await;
    let social = social_oauth1_session("tumblr", &server).await;

    let page = social
        .export_posts("tumblr", &ExportRequest::default().with_max_results(2))
        .await
        .unwrap();
    assert_eq!(page.count, 2);
    assert!(page.has_more);
    assert_eq!(page.items[0].text.as_deref(), Some("one"));
    assert_eq!(page.items[0].author.as_deref(), Some("ferris"));
    assert!(page.items[0].created_at.is_some());

    let err = social
        .export_subscriptions("tumblr", &ExportRequest::for_entity("someone"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UnsupportedFeature);
}

#[tokio::test]
async fn test_tumblr_offset_cursor_at_the_numeric_limit() {
    let server = MockServer::start().await;
    let limit = u64::MAX.to_string();
    Mock::given(method("GET"))
        .and(path("/blog/ferris.tumblr.com/posts"))
        .and(query_param("offset", limit.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {
                "posts": [
                    { "id_string": "9", "blog_name": "ferris", "summary": "last" }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    let social = social_oauth1_session("tumblr", &server).await;

    let cursor = Cursor::new("tumblr", &limit).into_string();
    let request = ExportRequest::for_entity("ferris").with_cursor(Some(cursor));
    let page = social.export_posts("tumblr", &request).await.unwrap();
    assert_eq!(page.count, 1);
    assert!(!page.has_more);
}

// ============================================================================
// Pinterest
// ============================================================================

#[tokio::test]
async fn test_pinterest_pin_on_board() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pins"))
        .and(bearer_token(TEST_TOKEN))
        .and(body_partial_json(json!({
            "board_id": "5493",
            "title": "Crab",
            "media_source": { "source_type": "image_url", "url": "https://example.com/crab.jpg" }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "813744" })))
        .expect(1)
        .mount(&server)
        .await;
    let social = social_session("pinterest", &server).await;

    let post = PostRequest::message("A crab")
        .on_entity("5493")
        .with_title("Crab")
        .with_media(MediaUpload::from_url("https://example.com/crab.jpg"));
    let result = social.post("pinterest", post).await.unwrap();
    assert_eq!(result.id, "813744");
    assert_eq!(
        result.url.as_deref(),
        Some("https://www.pinterest.com/pin/813744/")
    );

    let err = social
        .post(
            "pinterest",
            PostRequest::message("no board")
                .with_media(MediaUpload::from_url("https://example.com/crab.jpg")),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_pinterest_boards_follow_bookmarks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/boards"))
        .and(query_param("bookmark", "bm2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "2", "name": "Recipes", "pin_count": 4 }],
            "bookmark": null
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/boards"))
        .and(query_param("page_size", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "1",
                "name": "Travel",
                "description": "Places",
                "pin_count": 12,
                "owner": { "username": "ferris" }
            }],
            "bookmark": "bm2"
        })))
        .mount(&server)
        .await;
    let social = social_session("pinterest", &server).await;

    let all = social
        .export_all(
            "pinterest",
            ExportTarget::Collections,
            ExportRequest::default(),
            None,
        )
        .await
        .unwrap();
    let names: Vec<_> = all.iter().filter_map(|b| b.title.as_deref()).collect();
    assert_eq!(names, vec!["Travel", "Recipes"]);
    assert_eq!(all[0].count, Some(12));
    assert_eq!(all[0].author.as_deref(), Some("ferris"));
}

// ============================================================================
// Instagram
// ============================================================================

#[tokio::test]
async fn test_instagram_single_image_publish() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/me/media"))
        .and(body_string_contains("image_url=https%3A%2F%2Fcdn.example.com%2Fcrab.jpg"))
        .and(body_string_contains("caption=Hi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "container-1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/me/media_publish"))
        .and(body_string_contains("creation_id=container-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "17895695668004550" })))
        .expect(1)
        .mount(&server)
        .await;
    let social = social_session("instagram", &server).await;

    let post = PostRequest::message("Hi")
        .with_media(MediaUpload::from_url("https://cdn.example.com/crab.jpg"));
    let result = social.post("instagram", post).await.unwrap();
    assert_eq!(result.id, "17895695668004550");
}

#[tokio::test]
async fn test_instagram_requires_hosted_media() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let social = social_session("instagram", &server).await;

    let err = social
        .post("instagram", PostRequest::message("caption only"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingRequiredField);

    let err = social
        .import_media(
            "instagram",
            "me",
            MediaUpload::from_bytes("a.jpg", "image/jpeg", vec![1]),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

// ============================================================================
// YouTube
// ============================================================================

fn channel() -> serde_json::Value {
    json!({
        "items": [{
            "id": "UC123",
            "snippet": {
                "title": "Ferris Channel",
                "customUrl": "@ferris",
                "publishedAt": "2015-06-01T00:00:00Z",
                "thumbnails": { "default": { "url": "https://yt.example.com/d.jpg" } }
            },
            "statistics": { "subscriberCount": "1200", "videoCount": "31" },
            "contentDetails": { "relatedPlaylists": { "uploads": "UU123" } }
        }]
    })
}

#[tokio::test]
async fn test_youtube_channel_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels"))
        .and(query_param("mine", "true"))
        .and(query_param("part", "snippet,statistics,contentDetails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(channel()))
        .expect(1)
        .mount(&server)
        .await;
    let social = social_session("youtube", &server).await;

    let profile = social.get_profile("google", "me").await.unwrap();
    assert_eq!(profile.id, "UC123");
    assert_eq!(profile.username.as_deref(), Some("@ferris"));
    assert_eq!(profile.followers_count, Some(1200));
    assert_eq!(profile.posts_count, Some(31));
    assert_eq!(
        profile.avatar_url.as_deref(),
        Some("https://yt.example.com/d.jpg")
    );
}

#[tokio::test]
async fn test_youtube_uploads_export() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(channel()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("playlistId", "UU123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "item-1",
                "snippet": {
                    "title": "Episode 1",
                    "channelTitle": "Ferris Channel",
                    "resourceId": { "videoId": "dQw4w9WgXcQ" }
                }
            }],
            "nextPageToken": "CAUQAA"
        })))
        .mount(&server)
        .await;
    let social = social_session("google", &server).await;

    let page = social
        .export_posts("google", &ExportRequest::default())
        .await
        .unwrap();
    assert!(page.has_more);
    let video = &page.items[0];
    assert_eq!(video.id, "dQw4w9WgXcQ");
    assert_eq!(
        video.url.as_deref(),
        Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
    );
    assert_eq!(video.author.as_deref(), Some("Ferris Channel"));
}

#[tokio::test]
async fn test_youtube_resumable_upload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload/videos"))
        .and(query_param("uploadType", "resumable"))
        .and(body_partial_json(json!({
            "snippet": { "title": "Launch", "description": "Our launch video" },
            "status": { "privacyStatus": "public" }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Location", format!("{}/session/42", server.uri()).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/session/42"))
        .and(bearer_token(TEST_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "vid-7" })))
        .expect(1)
        .mount(&server)
        .await;
    let social = social_session("google", &server).await;

    let media = MediaUpload::from_bytes("launch.mp4", "video/mp4", vec![0, 0, 0, 24])
        .with_title("Launch")
        .with_caption("Our launch video");
    let result = social.import_media("google", "me", media).await.unwrap();
    assert_eq!(result.id, "vid-7");
    assert_eq!(
        result.url.as_deref(),
        Some("https://www.youtube.com/watch?v=vid-7")
    );
}
