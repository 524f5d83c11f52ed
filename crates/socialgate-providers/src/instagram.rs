// ABOUTME: Instagram Graph API connector for professional accounts
// ABOUTME: Publishes through media containers and exports the account's media
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info, instrument};

use crate::api::{self, parse_datetime};
use crate::core::{Connector, ConnectorState, ProviderConfig, SocialNetwork};
use crate::errors::{AppError, AppResult};
use crate::graph;
use crate::models::{
    ExportItem, ExportKind, ExportRequest, MediaUpload, PostRequest, PostResult, Profile,
};
use crate::oauth2::OAuthSettings;
use crate::pagination::{cursor_page, CursorPage};

const PROVIDER: &str = "instagram";
const PROFILE_FIELDS: &str =
    "id,username,name,account_type,media_count,followers_count,follows_count,profile_picture_url";
const MEDIA_FIELDS: &str =
    "id,caption,media_type,media_url,thumbnail_url,permalink,timestamp,username";
/// Carousels hold at most ten items
const MAX_CAROUSEL_ITEMS: usize = 10;
const VIDEO_POLL_ATTEMPTS: u32 = 30;
const VIDEO_POLL_INTERVAL: Duration = Duration::from_secs(2);

// ============================================================================
// API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct InstagramUser {
    id: String,
    username: Option<String>,
    name: Option<String>,
    media_count: Option<u64>,
    followers_count: Option<u64>,
    follows_count: Option<u64>,
    profile_picture_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InstagramMedia {
    id: String,
    caption: Option<String>,
    media_type: Option<String>,
    media_url: Option<String>,
    thumbnail_url: Option<String>,
    permalink: Option<String>,
    timestamp: Option<String>,
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContainerStatus {
    status_code: Option<String>,
}

/// Instagram Graph API connector
pub struct InstagramConnector {
    config: ProviderConfig,
    state: ConnectorState,
}

impl InstagramConnector {
    /// Connector for the given endpoint configuration
    #[must_use]
    pub const fn with_config(config: ProviderConfig) -> Self {
        Self {
            config,
            state: ConnectorState::new(PROVIDER),
        }
    }

    /// Create a media container for one image or video URL
    async fn create_container(
        &self,
        token: &str,
        media: &MediaUpload,
        caption: Option<&str>,
        carousel_item: bool,
    ) -> AppResult<String> {
        media.validate()?;
        let url = media.url().ok_or_else(|| {
            AppError::invalid_parameter(
                "media",
                "Instagram fetches media from a public URL; byte uploads are not accepted",
            )
        })?;

        let mut form = Vec::new();
        if is_video(url) {
            form.push(("media_type", if carousel_item { "VIDEO" } else { "REELS" }.to_owned()));
            form.push(("video_url", url.to_owned()));
        } else {
            form.push(("image_url", url.to_owned()));
        }
        if carousel_item {
            form.push(("is_carousel_item", "true".to_owned()));
        } else if let Some(caption) = caption {
            form.push(("caption", caption.to_owned()));
        }

        let response: Value =
            graph::post_form(PROVIDER, &self.config, token, "me/media", &form).await?;
        let id = graph::created_id(PROVIDER, &response)?;
        if is_video(url) {
            self.wait_until_ready(token, &id).await?;
        }
        Ok(id)
    }

    /// Video containers must finish processing before they can be published
    async fn wait_until_ready(&self, token: &str, container_id: &str) -> AppResult<()> {
        for attempt in 1..=VIDEO_POLL_ATTEMPTS {
            let status: ContainerStatus = graph::get(
                PROVIDER,
                &self.config,
                token,
                container_id,
                &[("fields", "status_code".to_owned())],
            )
            .await?;
            match status.status_code.as_deref() {
                Some("FINISHED") | None => return Ok(()),
                Some("ERROR" | "EXPIRED") => {
                    return Err(AppError::service(
                        PROVIDER,
                        format!("Media container {container_id} failed processing"),
                    ));
                }
                Some(other) => {
                    debug!("Container {container_id} is {other} (attempt {attempt})");
                    sleep(VIDEO_POLL_INTERVAL).await;
                }
            }
        }
        Err(AppError::service(
            PROVIDER,
            format!("Media container {container_id} did not finish processing in time"),
        ))
    }

    async fn publish(&self, token: &str, creation_id: String) -> AppResult<PostResult> {
        let response: Value = graph::post_form(
            PROVIDER,
            &self.config,
            token,
            "me/media_publish",
            &[("creation_id", creation_id)],
        )
        .await?;
        let id = graph::created_id(PROVIDER, &response)?;
        info!("Published Instagram media {id}");
        Ok(PostResult::new(id, PROVIDER).with_raw(response))
    }
}

fn is_video(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_lowercase();
    [".mp4", ".mov", ".m4v"].iter().any(|ext| path.ends_with(ext))
}

#[async_trait]
impl Connector for InstagramConnector {
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
            scope_separator: ",",
            ..OAuthSettings::default()
        }
    }

    #[instrument(skip(self), fields(provider = "instagram", api_call = "get_profile"))]
    async fn get_profile(&self, entity: &str) -> AppResult<Profile> {
        let token = self.state.access_token().await?;
        let target = if entity.trim().is_empty() { "me" } else { entity.trim() };
        let raw: Value = graph::get(
            PROVIDER,
            &self.config,
            &token,
            target,
            &[("fields", PROFILE_FIELDS.to_owned())],
        )
        .await?;
        let user: InstagramUser = api::from_value(PROVIDER, &raw)?;
        Ok(Profile {
            profile_url: user
                .username
                .as_ref()
                .map(|u| format!("https://www.instagram.com/{u}")),
            username: user.username,
            name: user.name,
            avatar_url: user.profile_picture_url,
            posts_count: user.media_count,
            followers_count: user.followers_count,
            following_count: user.follows_count,
            raw,
            ..Profile::new(user.id, PROVIDER)
        })
    }
}

#[async_trait]
impl SocialNetwork for InstagramConnector {
    #[instrument(skip(self, request), fields(provider = "instagram", api_call = "post"))]
    async fn post(&self, request: PostRequest) -> AppResult<PostResult> {
        request.validate()?;
        if request.media.is_empty() {
            return Err(AppError::missing_parameter("media"));
        }
        if request.media.len() > MAX_CAROUSEL_ITEMS {
            return Err(AppError::invalid_parameter(
                "media",
                format!("a carousel holds at most {MAX_CAROUSEL_ITEMS} items"),
            ));
        }
        let token = self.state.access_token().await?;
        let caption = request.text();

        let creation_id = if let [single] = request.media.as_slice() {
            let caption = caption.or(single.caption.as_deref());
            self.create_container(&token, single, caption, false).await?
        } else {
            let mut children = Vec::with_capacity(request.media.len());
            for media in &request.media {
                children.push(self.create_container(&token, media, None, true).await?);
            }
            let mut form = vec![
                ("media_type", "CAROUSEL".to_owned()),
                ("children", children.join(",")),
            ];
            if let Some(caption) = caption {
                form.push(("caption", caption.to_owned()));
            }
            let response: Value =
                graph::post_form(PROVIDER, &self.config, &token, "me/media", &form).await?;
            graph::created_id(PROVIDER, &response)?
        };

        self.publish(&token, creation_id).await
    }

    #[instrument(skip(self, media), fields(provider = "instagram", api_call = "import_media"))]
    async fn import_media(&self, _entity: &str, media: MediaUpload) -> AppResult<PostResult> {
        let token = self.state.access_token().await?;
        let caption = media.caption.clone();
        let creation_id = self
            .create_container(&token, &media, caption.as_deref(), false)
            .await?;
        self.publish(&token, creation_id).await
    }

    #[instrument(skip(self), fields(provider = "instagram", api_call = "export_media"))]
    async fn export_media(&self, request: &ExportRequest) -> AppResult<CursorPage<ExportItem>> {
        let token = self.state.access_token().await?;
        let target = if request.is_me() { "me" } else { request.entity.trim() };
        let list = graph::list(
            PROVIDER,
            &self.config,
            &token,
            &format!("{target}/media"),
            MEDIA_FIELDS,
            request,
        )
        .await?;
        let next = list.next_after();
        let items = list
            .data
            .into_iter()
            .map(convert_media)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, next))
    }
}

fn convert_media(raw: Value) -> AppResult<ExportItem> {
    let media: InstagramMedia = api::from_value(PROVIDER, &raw)?;
    let media_url = match media.media_type.as_deref() {
        Some("VIDEO") => media.thumbnail_url.or(media.media_url),
        _ => media.media_url,
    };
    Ok(ExportItem {
        text: media.caption,
        url: media.permalink,
        media_url,
        author: media.username,
        created_at: media.timestamp.as_deref().and_then(parse_datetime),
        raw,
        ..ExportItem::new(media.id, PROVIDER, ExportKind::Media)
    })
}

// ============================================================================
// Connector Factory
// ============================================================================

/// Factory registered for `instagram` in the social family
#[must_use]
pub fn create_connector(config: ProviderConfig) -> Arc<dyn SocialNetwork> {
    Arc::new(InstagramConnector::with_config(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_video_ignores_query() {
        assert!(is_video("https://cdn.example.com/clip.MP4?sig=abc"));
        assert!(!is_video("https://cdn.example.com/photo.jpg"));
    }
}
