// ABOUTME: Google connector backed by the YouTube Data API v3
// ABOUTME: Channel profile, uploads, playlists, subscriptions and resumable video upload
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use crate::api::{self, parse_datetime};
use crate::constants::limits::DEFAULT_PAGE_SIZE;
use crate::core::{Connector, ConnectorState, ProviderConfig, SocialNetwork};
use crate::errors::{AppError, AppResult};
use crate::http_client::shared_client;
use crate::models::{ExportItem, ExportKind, ExportRequest, MediaUpload, PostResult, Profile};
use crate::oauth2::OAuthSettings;
use crate::pagination::{cursor_page, vendor_token, CursorPage};
use crate::validation::clamp_page_size;

const PROVIDER: &str = "google";
/// YouTube caps `maxResults` at 50
const MAX_RESULTS: u32 = 50;
const UPLOAD_PATH: &str = "videos?uploadType=resumable&part=snippet,status";
const DEFAULT_PRIVACY: &str = "public";

// ============================================================================
// API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YouTubeList {
    #[serde(default)]
    items: Vec<Value>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Channel {
    id: String,
    snippet: Option<ChannelSnippet>,
    statistics: Option<ChannelStatistics>,
    content_details: Option<ChannelContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelSnippet {
    title: Option<String>,
    custom_url: Option<String>,
    published_at: Option<String>,
    thumbnails: Option<Thumbnails>,
}

/// Counts arrive as decimal strings
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelStatistics {
    subscriber_count: Option<String>,
    video_count: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: Option<RelatedPlaylists>,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

impl Thumbnails {
    fn best(self) -> Option<String> {
        self.high.or(self.medium).or(self.default).map(|t| t.url)
    }
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItem {
    id: String,
    snippet: Option<PlaylistItemSnippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemSnippet {
    title: Option<String>,
    description: Option<String>,
    published_at: Option<String>,
    channel_title: Option<String>,
    thumbnails: Option<Thumbnails>,
    resource_id: Option<ResourceId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: Option<String>,
    channel_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Playlist {
    id: String,
    snippet: Option<PlaylistItemSnippet>,
    content_details: Option<PlaylistContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistContentDetails {
    item_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Subscription {
    id: String,
    snippet: Option<PlaylistItemSnippet>,
    subscriber_snippet: Option<SubscriberSnippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriberSnippet {
    title: Option<String>,
    description: Option<String>,
    channel_id: Option<String>,
    thumbnails: Option<Thumbnails>,
}

/// Google connector using the YouTube Data API
pub struct GoogleConnector {
    config: ProviderConfig,
    state: ConnectorState,
}

impl GoogleConnector {
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

    async fn list(
        &self,
        path: &str,
        mut query: Vec<(&str, String)>,
        request: &ExportRequest,
    ) -> AppResult<YouTubeList> {
        query.push((
            "maxResults",
            clamp_page_size(request.max_results, DEFAULT_PAGE_SIZE, MAX_RESULTS).to_string(),
        ));
        if let Some(page_token) = vendor_token(PROVIDER, request) {
            query.push(("pageToken", page_token));
        }
        self.get(path, &query).await
    }

    /// The channel of `"me"` or of a channel id
    async fn channel(&self, entity: &str) -> AppResult<(Channel, Value)> {
        let entity = entity.trim();
        let selector = if entity.is_empty() || entity.eq_ignore_ascii_case("me") {
            ("mine", "true".to_owned())
        } else {
            ("id", entity.to_owned())
        };
        let list: YouTubeList = self
            .get(
                "channels",
                &[
                    ("part", "snippet,statistics,contentDetails".to_owned()),
                    selector,
                ],
            )
            .await?;
        let raw = list.items.into_iter().next().ok_or_else(|| {
            AppError::not_found(PROVIDER, format!("YouTube channel '{entity}' not found"))
        })?;
        Ok((api::from_value(PROVIDER, &raw)?, raw))
    }

    /// Open a resumable upload session and return its URL
    async fn start_upload(
        &self,
        token: &str,
        metadata: &Value,
        content_type: &str,
        length: usize,
    ) -> AppResult<String> {
        let request = shared_client()
            .post(self.config.upload_endpoint(UPLOAD_PATH))
            .bearer_auth(token)
            .header("X-Upload-Content-Type", content_type)
            .header("X-Upload-Content-Length", length.to_string())
            .json(metadata);
        let response = api::send(PROVIDER, request).await?;
        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| AppError::service(PROVIDER, "Upload session response has no Location"))
    }
}

fn count(value: Option<&str>) -> Option<u64> {
    value.and_then(|v| v.parse().ok())
}

#[async_trait]
impl Connector for GoogleConnector {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn state(&self) -> &ConnectorState {
        &self.state
    }

    fn oauth_settings(&self) -> OAuthSettings {
        OAuthSettings {
            extra_auth_params: &[("access_type", "offline"), ("prompt", "consent")],
            ..OAuthSettings::default()
        }
    }

    #[instrument(skip(self), fields(provider = "google", api_call = "get_profile"))]
    async fn get_profile(&self, entity: &str) -> AppResult<Profile> {
        let (channel, raw) = self.channel(entity).await?;
        let snippet = channel.snippet;
        let statistics = channel.statistics;
        Ok(Profile {
            username: snippet.as_ref().and_then(|s| s.custom_url.clone()),
            name: snippet.as_ref().and_then(|s| s.title.clone()),
            created_at: snippet
                .as_ref()
                .and_then(|s| s.published_at.as_deref())
                .and_then(parse_datetime),
            avatar_url: snippet.and_then(|s| s.thumbnails).and_then(Thumbnails::best),
            profile_url: Some(format!("https://www.youtube.com/channel/{}", channel.id)),
            followers_count: count(statistics.as_ref().and_then(|s| s.subscriber_count.as_deref())),
            posts_count: count(statistics.as_ref().and_then(|s| s.video_count.as_deref())),
            raw,
            ..Profile::new(channel.id, PROVIDER)
        })
    }
}

#[async_trait]
impl SocialNetwork for GoogleConnector {
    /// Upload a video through a resumable upload session
    #[instrument(skip(self, media), fields(provider = "google", api_call = "import_media"))]
    async fn import_media(&self, _entity: &str, media: MediaUpload) -> AppResult<PostResult> {
        media.validate()?;
        let token = self.state.access_token().await?;
        let (file_name, content_type, data) = api::media_bytes(PROVIDER, &media.source).await?;

        let metadata = json!({
            "snippet": {
                "title": media.title.as_deref().unwrap_or(&file_name),
                "description": media.caption.as_deref().unwrap_or_default(),
            },
            "status": {"privacyStatus": DEFAULT_PRIVACY},
        });
        let session = self
            .start_upload(&token, &metadata, &content_type, data.len())
            .await?;
        debug!("Opened YouTube upload session for {file_name}");

        let request = shared_client()
            .put(session)
            .bearer_auth(&token)
            .header(CONTENT_TYPE, content_type)
            .body(data);
        let response: Value = api::send_json(PROVIDER, request).await?;
        let id = response
            .get("id")
            .and_then(api::id_string)
            .ok_or_else(|| AppError::service(PROVIDER, "Video upload returned no id"))?;
        info!("Uploaded YouTube video {id}");
        Ok(PostResult::new(id.clone(), PROVIDER)
            .with_url(format!("https://www.youtube.com/watch?v={id}"))
            .with_raw(response))
    }

    /// Videos of the channel's uploads playlist
    #[instrument(skip(self), fields(provider = "google", api_call = "export_posts"))]
    async fn export_posts(&self, request: &ExportRequest) -> AppResult<CursorPage<ExportItem>> {
        let (channel, _) = self.channel(&request.entity).await?;
        let uploads = channel
            .content_details
            .and_then(|d| d.related_playlists)
            .and_then(|p| p.uploads)
            .ok_or_else(|| AppError::service(PROVIDER, "Channel has no uploads playlist"))?;

        let list = self
            .list(
                "playlistItems",
                vec![("part", "snippet".to_owned()), ("playlistId", uploads)],
                request,
            )
            .await?;
        let items = list
            .items
            .into_iter()
            .map(convert_video)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, list.next_page_token))
    }

    /// Channels subscribed to the authenticated channel
    #[instrument(skip(self), fields(provider = "google", api_call = "export_followers"))]
    async fn export_followers(&self, request: &ExportRequest) -> AppResult<CursorPage<ExportItem>> {
        if !request.is_me() {
            return Err(AppError::unsupported_feature(
                PROVIDER,
                "subscribers of other channels",
            ));
        }
        let list = self
            .list(
                "subscriptions",
                vec![
                    ("part", "subscriberSnippet".to_owned()),
                    ("mySubscribers", "true".to_owned()),
                ],
                request,
            )
            .await?;
        let items = list
            .items
            .into_iter()
            .map(convert_subscriber)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, list.next_page_token))
    }

    #[instrument(skip(self), fields(provider = "google", api_call = "export_subscriptions"))]
    async fn export_subscriptions(
        &self,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        let selector = if request.is_me() {
            ("mine", "true".to_owned())
        } else {
            ("channelId", request.entity.trim().to_owned())
        };
        let list = self
            .list(
                "subscriptions",
                vec![("part", "snippet".to_owned()), selector],
                request,
            )
            .await?;
        let items = list
            .items
            .into_iter()
            .map(convert_subscription)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, list.next_page_token))
    }

    /// Playlists of the channel
    #[instrument(skip(self), fields(provider = "google", api_call = "export_collections"))]
    async fn export_collections(
        &self,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        let selector = if request.is_me() {
            ("mine", "true".to_owned())
        } else {
            ("channelId", request.entity.trim().to_owned())
        };
        let list = self
            .list(
                "playlists",
                vec![("part", "snippet,contentDetails".to_owned()), selector],
                request,
            )
            .await?;
        let items = list
            .items
            .into_iter()
            .map(convert_playlist)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, list.next_page_token))
    }
}

fn convert_video(raw: Value) -> AppResult<ExportItem> {
    let item: PlaylistItem = api::from_value(PROVIDER, &raw)?;
    let snippet = item.snippet;
    let video_id = snippet
        .as_ref()
        .and_then(|s| s.resource_id.as_ref())
        .and_then(|r| r.video_id.clone())
        .unwrap_or(item.id);
    let Some(snippet) = snippet else {
        return Ok(ExportItem {
            raw,
            ..ExportItem::new(video_id, PROVIDER, ExportKind::Media)
        });
    };
    Ok(ExportItem {
        url: Some(format!("https://www.youtube.com/watch?v={video_id}")),
        title: snippet.title,
        text: snippet.description,
        author: snippet.channel_title,
        media_url: snippet.thumbnails.and_then(Thumbnails::best),
        created_at: snippet.published_at.as_deref().and_then(parse_datetime),
        raw,
        ..ExportItem::new(video_id, PROVIDER, ExportKind::Media)
    })
}

fn convert_playlist(raw: Value) -> AppResult<ExportItem> {
    let playlist: Playlist = api::from_value(PROVIDER, &raw)?;
    let snippet = playlist.snippet;
    Ok(ExportItem {
        url: Some(format!(
            "https://www.youtube.com/playlist?list={}",
            playlist.id
        )),
        title: snippet.as_ref().and_then(|s| s.title.clone()),
        text: snippet.as_ref().and_then(|s| s.description.clone()),
        created_at: snippet
            .as_ref()
            .and_then(|s| s.published_at.as_deref())
            .and_then(parse_datetime),
        media_url: snippet.and_then(|s| s.thumbnails).and_then(Thumbnails::best),
        count: playlist.content_details.and_then(|d| d.item_count),
        raw,
        ..ExportItem::new(playlist.id, PROVIDER, ExportKind::Collection)
    })
}

fn convert_subscription(raw: Value) -> AppResult<ExportItem> {
    let subscription: Subscription = api::from_value(PROVIDER, &raw)?;
    let snippet = subscription.snippet;
    let channel_id = snippet
        .as_ref()
        .and_then(|s| s.resource_id.as_ref())
        .and_then(|r| r.channel_id.clone())
        .unwrap_or(subscription.id);
    Ok(ExportItem {
        url: Some(format!("https://www.youtube.com/channel/{channel_id}")),
        title: snippet.as_ref().and_then(|s| s.title.clone()),
        text: snippet.as_ref().and_then(|s| s.description.clone()),
        media_url: snippet.and_then(|s| s.thumbnails).and_then(Thumbnails::best),
        raw,
        ..ExportItem::new(channel_id, PROVIDER, ExportKind::User)
    })
}

fn convert_subscriber(raw: Value) -> AppResult<ExportItem> {
    let subscription: Subscription = api::from_value(PROVIDER, &raw)?;
    let snippet = subscription.subscriber_snippet;
    let channel_id = snippet
        .as_ref()
        .and_then(|s| s.channel_id.clone())
        .unwrap_or(subscription.id);
    Ok(ExportItem {
        url: Some(format!("https://www.youtube.com/channel/{channel_id}")),
        title: snippet.as_ref().and_then(|s| s.title.clone()),
        text: snippet.as_ref().and_then(|s| s.description.clone()),
        media_url: snippet.and_then(|s| s.thumbnails).and_then(Thumbnails::best),
        raw,
        ..ExportItem::new(channel_id, PROVIDER, ExportKind::User)
    })
}

// ============================================================================
// Connector Factory
// ============================================================================

/// Factory registered for `google` in the social family
#[must_use]
pub fn create_connector(config: ProviderConfig) -> Arc<dyn SocialNetwork> {
    Arc::new(GoogleConnector::with_config(config))
}
