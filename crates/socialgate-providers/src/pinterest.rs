// ABOUTME: Pinterest API v5 connector for boards, pins and followers
// ABOUTME: Creates pins from image URLs or base64 payloads on a given board
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use crate::api::{self, parse_datetime};
use crate::constants::limits::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::core::{Connector, ConnectorState, ProviderConfig, SocialNetwork};
use crate::errors::{AppError, AppResult};
use crate::http_client::shared_client;
use crate::models::{
    ExportItem, ExportKind, ExportRequest, MediaSource, MediaUpload, PostRequest, PostResult,
    Profile,
};
use crate::oauth2::{OAuthSettings, TokenAuth};
use crate::pagination::{cursor_page, vendor_token, CursorPage};
use crate::validation::clamp_page_size;

const PROVIDER: &str = "pinterest";

// ============================================================================
// API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct PinterestList {
    #[serde(default)]
    items: Vec<Value>,
    bookmark: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PinterestAccount {
    id: Option<String>,
    username: Option<String>,
    business_name: Option<String>,
    profile_image: Option<String>,
    follower_count: Option<u64>,
    following_count: Option<u64>,
    pin_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PinterestBoard {
    id: String,
    name: Option<String>,
    description: Option<String>,
    pin_count: Option<u64>,
    created_at: Option<String>,
    owner: Option<PinterestOwner>,
    media: Option<BoardMedia>,
}

#[derive(Debug, Deserialize)]
struct PinterestOwner {
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BoardMedia {
    image_cover_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PinterestPin {
    id: String,
    title: Option<String>,
    description: Option<String>,
    link: Option<String>,
    created_at: Option<String>,
    media: Option<PinMedia>,
}

#[derive(Debug, Deserialize)]
struct PinMedia {
    #[serde(default)]
    images: HashMap<String, PinImage>,
}

#[derive(Debug, Deserialize)]
struct PinImage {
    url: String,
    width: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct PinterestFollower {
    username: String,
    profile_image: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreatePin<'a> {
    board_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<&'a str>,
    media_source: Value,
}

/// Pinterest API v5 connector
pub struct PinterestConnector {
    config: ProviderConfig,
    state: ConnectorState,
}

impl PinterestConnector {
    /// Connector for the given endpoint configuration
    #[must_use]
    pub const fn with_config(config: ProviderConfig) -> Self {
        Self {
            config,
            state: ConnectorState::new(PROVIDER),
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let token = self.state.access_token().await?;
        let request = shared_client()
            .get(self.config.endpoint(path))
            .bearer_auth(token)
            .query(query);
        api::send_json(PROVIDER, request).await
    }

    async fn list(&self, path: &str, request: &ExportRequest) -> AppResult<PinterestList> {
        let mut query = vec![(
            "page_size",
            clamp_page_size(request.max_results, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE).to_string(),
        )];
        if let Some(bookmark) = vendor_token(PROVIDER, request) {
            query.push(("bookmark", bookmark));
        }
        self.get(path, &query).await
    }

    async fn create_pin(
        &self,
        board_id: &str,
        media: &MediaUpload,
        title: Option<&str>,
        description: Option<&str>,
        link: Option<&str>,
    ) -> AppResult<PostResult> {
        media.validate()?;
        let token = self.state.access_token().await?;
        let body = CreatePin {
            board_id,
            title: title.or(media.title.as_deref()),
            description: description.or(media.caption.as_deref()),
            link,
            media_source: media_source(&media.source),
        };
        let request = shared_client()
            .post(self.config.endpoint("pins"))
            .bearer_auth(token)
            .json(&body);
        let response: Value = api::send_json(PROVIDER, request).await?;
        let id = response
            .get("id")
            .and_then(api::id_string)
            .ok_or_else(|| AppError::service(PROVIDER, "Pin creation returned no id"))?;
        info!("Created Pinterest pin {id} on board {board_id}");
        Ok(PostResult::new(id.clone(), PROVIDER)
            .with_url(format!("https://www.pinterest.com/pin/{id}/"))
            .with_raw(response))
    }
}

fn media_source(source: &MediaSource) -> Value {
    match source {
        MediaSource::Url(url) => serde_json::json!({"source_type": "image_url", "url": url}),
        MediaSource::Bytes {
            content_type,
            data,
            ..
        } => serde_json::json!({
            "source_type": "image_base64",
            "content_type": content_type,
            "data": STANDARD.encode(data),
        }),
    }
}

fn board_id(entity: &str) -> AppResult<&str> {
    let entity = entity.trim();
    if entity.is_empty() || entity.eq_ignore_ascii_case("me") {
        return Err(AppError::invalid_parameter(
            "entity",
            "Pinterest pins are saved to a board; pass the board id",
        ));
    }
    Ok(entity)
}

#[async_trait]
impl Connector for PinterestConnector {
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
            token_auth: TokenAuth::Basic,
            ..OAuthSettings::default()
        }
    }

    #[instrument(skip(self), fields(provider = "pinterest", api_call = "get_profile"))]
    async fn get_profile(&self, entity: &str) -> AppResult<Profile> {
        let entity = entity.trim();
        if !(entity.is_empty() || entity.eq_ignore_ascii_case("me")) {
            return Err(AppError::unsupported_feature(PROVIDER, "profiles of other users"));
        }
        let raw: Value = self.get("user_account", &[]).await?;
        let account: PinterestAccount = api::from_value(PROVIDER, &raw)?;
        let id = account
            .id
            .clone()
            .or_else(|| account.username.clone())
            .ok_or_else(|| AppError::service(PROVIDER, "Account response has no id"))?;
        Ok(Profile {
            profile_url: account
                .username
                .as_ref()
                .map(|u| format!("https://www.pinterest.com/{u}/")),
            username: account.username,
            name: account.business_name,
            avatar_url: account.profile_image,
            followers_count: account.follower_count,
            following_count: account.following_count,
            posts_count: account.pin_count,
            raw,
            ..Profile::new(id, PROVIDER)
        })
    }
}

#[async_trait]
impl SocialNetwork for PinterestConnector {
    #[instrument(skip(self, request), fields(provider = "pinterest", api_call = "post"))]
    async fn post(&self, request: PostRequest) -> AppResult<PostResult> {
        request.validate()?;
        let board = board_id(&request.entity)?;
        let media = request
            .media
            .first()
            .ok_or_else(|| AppError::missing_parameter("media"))?;
        self.create_pin(
            board,
            media,
            request.title.as_deref(),
            request.text(),
            request.link.as_deref(),
        )
        .await
    }

    #[instrument(skip(self, media), fields(provider = "pinterest", api_call = "import_media"))]
    async fn import_media(&self, entity: &str, media: MediaUpload) -> AppResult<PostResult> {
        self.create_pin(board_id(entity)?, &media, None, None, None).await
    }

    /// Pins of a board, or all of the user's pins for `"me"`
    #[instrument(skip(self), fields(provider = "pinterest", api_call = "export_posts"))]
    async fn export_posts(&self, request: &ExportRequest) -> AppResult<CursorPage<ExportItem>> {
        let path = if request.is_me() {
            "pins".to_owned()
        } else {
            format!("boards/{}/pins", request.entity.trim())
        };
        let list = self.list(&path, request).await?;
        let items = list
            .items
            .into_iter()
            .map(convert_pin)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, list.bookmark))
    }

    #[instrument(skip(self), fields(provider = "pinterest", api_call = "export_followers"))]
    async fn export_followers(&self, request: &ExportRequest) -> AppResult<CursorPage<ExportItem>> {
        let list = self.list("user_account/followers", request).await?;
        let items = list
            .items
            .into_iter()
            .map(|raw| {
                let follower: PinterestFollower = api::from_value(PROVIDER, &raw)?;
                Ok(ExportItem {
                    title: Some(follower.username.clone()),
                    url: Some(format!("https://www.pinterest.com/{}/", follower.username)),
                    media_url: follower.profile_image,
                    raw,
                    ..ExportItem::new(follower.username, PROVIDER, ExportKind::User)
                })
            })
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, list.bookmark))
    }

    /// Boards of the authenticated user
    #[instrument(skip(self), fields(provider = "pinterest", api_call = "export_collections"))]
    async fn export_collections(
        &self,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        let list = self.list("boards", request).await?;
        let items = list
            .items
            .into_iter()
            .map(convert_board)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, list.bookmark))
    }
}

fn convert_pin(raw: Value) -> AppResult<ExportItem> {
    let pin: PinterestPin = api::from_value(PROVIDER, &raw)?;
    // Widest rendition
    let media_url = pin.media.and_then(|m| {
        m.images
            .into_values()
            .max_by_key(|image| image.width.unwrap_or_default())
            .map(|image| image.url)
    });
    Ok(ExportItem {
        url: pin
            .link
            .or_else(|| Some(format!("https://www.pinterest.com/pin/{}/", pin.id))),
        title: pin.title,
        text: pin.description,
        media_url,
        created_at: pin.created_at.as_deref().and_then(parse_datetime),
        raw,
        ..ExportItem::new(pin.id, PROVIDER, ExportKind::Post)
    })
}

fn convert_board(raw: Value) -> AppResult<ExportItem> {
    let board: PinterestBoard = api::from_value(PROVIDER, &raw)?;
    Ok(ExportItem {
        title: board.name,
        text: board.description,
        media_url: board.media.and_then(|m| m.image_cover_url),
        author: board.owner.and_then(|o| o.username),
        created_at: board.created_at.as_deref().and_then(parse_datetime),
        count: board.pin_count,
        raw,
        ..ExportItem::new(board.id, PROVIDER, ExportKind::Collection)
    })
}

// ============================================================================
// Connector Factory
// ============================================================================

/// Factory registered for `pinterest` in the social family
#[must_use]
pub fn create_connector(config: ProviderConfig) -> Arc<dyn SocialNetwork> {
    Arc::new(PinterestConnector::with_config(config))
}
