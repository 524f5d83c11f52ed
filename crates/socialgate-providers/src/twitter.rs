// ABOUTME: X (Twitter) API v2 connector for users, tweets, followers and follows
// ABOUTME: Publishes tweets with media uploaded through the v2 media endpoint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::Form;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::api::{self, parse_datetime};
use crate::constants::limits::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::core::{Connector, ConnectorState, ProviderConfig, SocialNetwork};
use crate::errors::{AppError, AppResult};
use crate::http_client::shared_client;
use crate::models::{
    ExportItem, ExportKind, ExportRequest, MediaUpload, PostRequest, PostResult, Profile,
};
use crate::oauth2::{OAuthSettings, TokenAuth};
use crate::pagination::{cursor_page, vendor_token, CursorPage};
use crate::spi::AuthScheme;
use crate::validation::clamp_page_size;

const PROVIDER: &str = "twitter";
const USER_FIELDS: &str = "created_at,description,profile_image_url,public_metrics,url,username";
const TWEET_FIELDS: &str = "created_at,public_metrics,author_id,attachments";
const MAX_TWEET_CHARS: usize = 280;
/// Timelines reject `max_results` below 5
const MIN_TIMELINE_RESULTS: u32 = 5;
const MAX_MEDIA_PER_TWEET: usize = 4;

// ============================================================================
// API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TwitterUser {
    id: String,
    name: Option<String>,
    username: Option<String>,
    description: Option<String>,
    created_at: Option<String>,
    profile_image_url: Option<String>,
    public_metrics: Option<UserMetrics>,
}

#[derive(Debug, Deserialize)]
struct UserMetrics {
    followers_count: Option<u64>,
    following_count: Option<u64>,
    tweet_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    id: String,
    text: Option<String>,
    created_at: Option<String>,
    author_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadedMedia {
    id: String,
}

#[derive(Debug, Serialize)]
struct CreateTweet {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    media: Option<TweetMedia>,
}

#[derive(Debug, Serialize)]
struct TweetMedia {
    media_ids: Vec<String>,
}

/// X API v2 connector
pub struct TwitterConnector {
    config: ProviderConfig,
    state: ConnectorState,
}

impl TwitterConnector {
    /// Connector for the given endpoint configuration
    #[must_use]
    pub const fn with_config(config: ProviderConfig) -> Self {
        Self {
            config,
            state: ConnectorState::new(PROVIDER),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> AppResult<T> {
        let token = self.state.access_token().await?;
        let request = shared_client()
            .get(self.config.endpoint(path))
            .bearer_auth(token)
            .query(query);
        api::send_json(PROVIDER, request).await
    }

    async fn lookup_user(&self, entity: &str) -> AppResult<Value> {
        let entity = entity.trim().trim_start_matches('@');
        let path = if entity.is_empty() || entity.eq_ignore_ascii_case("me") {
            "users/me".to_owned()
        } else if entity.chars().all(|c| c.is_ascii_digit()) {
            format!("users/{entity}")
        } else {
            format!("users/by/username/{entity}")
        };
        let envelope: Envelope<Value> = self
            .get(&path, &[("user.fields", USER_FIELDS.to_owned())])
            .await?;
        envelope
            .data
            .ok_or_else(|| AppError::not_found(PROVIDER, format!("User '{entity}' not found")))
    }

    /// Numeric id of `"me"`, a numeric id, or a handle
    async fn user_id(&self, entity: &str) -> AppResult<String> {
        let trimmed = entity.trim();
        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Ok(trimmed.to_owned());
        }
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("me") {
            if let Some(id) = self.state.credentials().await?.user_id {
                return Ok(id);
            }
        }
        let user = self.lookup_user(trimmed).await?;
        user.get("id")
            .and_then(api::id_string)
            .ok_or_else(|| AppError::service(PROVIDER, "User lookup returned no id"))
    }

    async fn timeline(
        &self,
        edge: &str,
        fields: (&str, &str),
        request: &ExportRequest,
    ) -> AppResult<Envelope<Vec<Value>>> {
        let user_id = self.user_id(&request.entity).await?;
        let page_size = clamp_page_size(request.max_results, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)
            .max(MIN_TIMELINE_RESULTS);
        let mut query = vec![
            ("max_results", page_size.to_string()),
            (fields.0, fields.1.to_owned()),
        ];
        if let Some(token) = vendor_token(PROVIDER, request) {
            query.push(("pagination_token", token));
        }
        self.get(&format!("users/{user_id}/{edge}"), &query).await
    }

    async fn upload_media(&self, media: &MediaUpload) -> AppResult<String> {
        media.validate()?;
        let token = self.state.access_token().await?;
        let (file_name, content_type, data) = api::media_bytes(PROVIDER, &media.source).await?;
        let category = if content_type.starts_with("video/") {
            "tweet_video"
        } else if content_type == "image/gif" {
            "tweet_gif"
        } else {
            "tweet_image"
        };
        let form = Form::new()
            .text("media_category", category)
            .part("media", api::file_part(&file_name, &content_type, data)?);
        let request = shared_client()
            .post(self.config.upload_endpoint("upload"))
            .bearer_auth(token)
            .multipart(form);
        let envelope: Envelope<UploadedMedia> = api::send_json(PROVIDER, request).await?;
        let uploaded = envelope
            .data
            .ok_or_else(|| AppError::service(PROVIDER, "Media upload returned no id"))?;
        debug!("Uploaded media {} as {category}", uploaded.id);
        Ok(uploaded.id)
    }

    async fn create_tweet(
        &self,
        text: Option<String>,
        media_ids: Vec<String>,
    ) -> AppResult<PostResult> {
        if let Some(text) = &text {
            let length = text.chars().count();
            if length > MAX_TWEET_CHARS {
                return Err(AppError::invalid_parameter(
                    "message",
                    format!("{length} characters exceeds the {MAX_TWEET_CHARS} character limit"),
                ));
            }
        }
        let body = CreateTweet {
            text,
            media: (!media_ids.is_empty()).then_some(TweetMedia { media_ids }),
        };
        let token = self.state.access_token().await?;
        let request = shared_client()
            .post(self.config.endpoint("tweets"))
            .bearer_auth(token)
            .json(&body);
        let response: Value = api::send_json(PROVIDER, request).await?;
        let id = response
            .pointer("/data/id")
            .and_then(api::id_string)
            .ok_or_else(|| AppError::service(PROVIDER, "Tweet creation returned no id"))?;
        info!("Published tweet {id}");
        Ok(PostResult::new(id.clone(), PROVIDER)
            .with_url(format!("https://x.com/i/web/status/{id}"))
            .with_raw(response))
    }
}

/// Message with the link appended, as X has no separate link field
fn tweet_text(request: &PostRequest) -> Option<String> {
    let link = request.link.as_deref().filter(|l| !l.trim().is_empty());
    match (request.text(), link) {
        (Some(text), Some(link)) => Some(format!("{text} {link}")),
        (Some(text), None) => Some(text.to_owned()),
        (None, Some(link)) => Some(link.to_owned()),
        (None, None) => None,
    }
}

#[async_trait]
impl Connector for TwitterConnector {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn state(&self) -> &ConnectorState {
        &self.state
    }

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::OAuth2Pkce
    }

    fn oauth_settings(&self) -> OAuthSettings {
        OAuthSettings {
            token_auth: TokenAuth::Basic,
            ..OAuthSettings::default()
        }
    }

    #[instrument(skip(self), fields(provider = "twitter", api_call = "get_profile"))]
    async fn get_profile(&self, entity: &str) -> AppResult<Profile> {
        let raw = self.lookup_user(entity).await?;
        let user: TwitterUser = api::from_value(PROVIDER, &raw)?;
        let metrics = user.public_metrics;
        Ok(Profile {
            profile_url: user.username.as_ref().map(|u| format!("https://x.com/{u}")),
            username: user.username,
            name: user.name,
            avatar_url: user.profile_image_url,
            created_at: user.created_at.as_deref().and_then(parse_datetime),
            followers_count: metrics.as_ref().and_then(|m| m.followers_count),
            following_count: metrics.as_ref().and_then(|m| m.following_count),
            posts_count: metrics.and_then(|m| m.tweet_count),
            raw,
            ..Profile::new(user.id, PROVIDER)
        })
    }
}

#[async_trait]
impl SocialNetwork for TwitterConnector {
    #[instrument(skip(self, request), fields(provider = "twitter", api_call = "post"))]
    async fn post(&self, request: PostRequest) -> AppResult<PostResult> {
        request.validate()?;
        if request.media.len() > MAX_MEDIA_PER_TWEET {
            return Err(AppError::invalid_parameter(
                "media",
                format!("a tweet carries at most {MAX_MEDIA_PER_TWEET} attachments"),
            ));
        }
        let mut media_ids = Vec::with_capacity(request.media.len());
        for media in &request.media {
            media_ids.push(self.upload_media(media).await?);
        }
        self.create_tweet(tweet_text(&request), media_ids).await
    }

    /// Upload media and publish it in a tweet captioned with `media.caption`
    #[instrument(skip(self, media), fields(provider = "twitter", api_call = "import_media"))]
    async fn import_media(&self, _entity: &str, media: MediaUpload) -> AppResult<PostResult> {
        let media_id = self.upload_media(&media).await?;
        let caption = media.caption.filter(|c| !c.trim().is_empty());
        self.create_tweet(caption, vec![media_id]).await
    }

    #[instrument(skip(self), fields(provider = "twitter", api_call = "export_posts"))]
    async fn export_posts(&self, request: &ExportRequest) -> AppResult<CursorPage<ExportItem>> {
        let envelope = self
            .timeline("tweets", ("tweet.fields", TWEET_FIELDS), request)
            .await?;
        let next = envelope.meta.and_then(|m| m.next_token);
        let items = envelope
            .data
            .unwrap_or_default()
            .into_iter()
            .map(convert_tweet)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, next))
    }

    #[instrument(skip(self), fields(provider = "twitter", api_call = "export_followers"))]
    async fn export_followers(&self, request: &ExportRequest) -> AppResult<CursorPage<ExportItem>> {
        let envelope = self
            .timeline("followers", ("user.fields", USER_FIELDS), request)
            .await?;
        users_page(envelope)
    }

    #[instrument(skip(self), fields(provider = "twitter", api_call = "export_subscriptions"))]
    async fn export_subscriptions(
        &self,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        let envelope = self
            .timeline("following", ("user.fields", USER_FIELDS), request)
            .await?;
        users_page(envelope)
    }
}

fn users_page(envelope: Envelope<Vec<Value>>) -> AppResult<CursorPage<ExportItem>> {
    let next = envelope.meta.and_then(|m| m.next_token);
    let items = envelope
        .data
        .unwrap_or_default()
        .into_iter()
        .map(convert_user)
        .collect::<AppResult<Vec<_>>>()?;
    Ok(cursor_page(PROVIDER, items, next))
}

fn convert_tweet(raw: Value) -> AppResult<ExportItem> {
    let tweet: Tweet = api::from_value(PROVIDER, &raw)?;
    Ok(ExportItem {
        url: Some(format!("https://x.com/i/web/status/{}", tweet.id)),
        text: tweet.text,
        author: tweet.author_id,
        created_at: tweet.created_at.as_deref().and_then(parse_datetime),
        raw,
        ..ExportItem::new(tweet.id, PROVIDER, ExportKind::Post)
    })
}

fn convert_user(raw: Value) -> AppResult<ExportItem> {
    let user: TwitterUser = api::from_value(PROVIDER, &raw)?;
    Ok(ExportItem {
        url: user.username.as_ref().map(|u| format!("https://x.com/{u}")),
        title: user.name,
        author: user.username,
        text: user.description,
        media_url: user.profile_image_url,
        created_at: user.created_at.as_deref().and_then(parse_datetime),
        count: user.public_metrics.and_then(|m| m.followers_count),
        raw,
        ..ExportItem::new(user.id, PROVIDER, ExportKind::User)
    })
}

// ============================================================================
// Connector Factory
// ============================================================================

/// Factory registered for `twitter` in the social family
#[must_use]
pub fn create_connector(config: ProviderConfig) -> Arc<dyn SocialNetwork> {
    Arc::new(TwitterConnector::with_config(config))
}
