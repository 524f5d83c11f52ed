// ABOUTME: VKontakte API connector for users, walls, followers, friends and communities
// ABOUTME: Wall posts with photos go through the wall upload server handshake
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::Form;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::api::{self, from_unix};
use crate::constants::limits::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::core::{Connector, ConnectorState, ProviderConfig, SocialNetwork};
use crate::errors::{AppError, AppResult};
use crate::http_client::shared_client;
use crate::models::{
    ExportItem, ExportKind, ExportRequest, MediaUpload, PostRequest, PostResult, Profile,
};
use crate::oauth2::OAuthSettings;
use crate::pagination::{cursor_page, next_offset, vendor_offset, CursorPage};
use crate::validation::clamp_page_size;

const PROVIDER: &str = "vkontakte";
const DEFAULT_API_VERSION: &str = "5.199";
const SITE_URL: &str = "https://vk.com";
const USER_FIELDS: &str = "screen_name,photo_200,followers_count,counters,bdate";

// ============================================================================
// API Response Structures
// ============================================================================

/// Every method answers `{"response": ...}` or `{"error": {...}}`
#[derive(Debug, Deserialize)]
struct VkEnvelope<T> {
    response: Option<T>,
    error: Option<VkError>,
}

#[derive(Debug, Deserialize)]
struct VkError {
    error_code: Option<i64>,
    error_msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VkList {
    #[serde(default)]
    count: u64,
    #[serde(default)]
    items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct VkUser {
    id: i64,
    first_name: Option<String>,
    last_name: Option<String>,
    screen_name: Option<String>,
    photo_200: Option<String>,
    followers_count: Option<u64>,
    counters: Option<Counters>,
}

#[derive(Debug, Deserialize)]
struct Counters {
    friends: Option<u64>,
    posts: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct WallPost {
    id: i64,
    owner_id: i64,
    from_id: Option<i64>,
    date: Option<i64>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Community {
    id: i64,
    name: Option<String>,
    screen_name: Option<String>,
    photo_200: Option<String>,
    members_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct UploadServer {
    upload_url: String,
}

/// Upload host answer; `photo` is an opaque JSON string passed back verbatim
#[derive(Debug, Deserialize)]
struct UploadedPhoto {
    server: Value,
    photo: String,
    hash: String,
}

#[derive(Debug, Deserialize)]
struct SavedPhoto {
    id: i64,
    owner_id: i64,
}

#[derive(Debug, Deserialize)]
struct CreatedPost {
    post_id: i64,
}

/// Wall addressed by an entity: the current user, a user or a community
#[derive(Debug, Clone, PartialEq, Eq)]
enum Wall {
    Me,
    Owner(i64),
    Domain(String),
}

impl Wall {
    fn parse(entity: &str) -> Self {
        let entity = entity.trim();
        if entity.is_empty() || entity.eq_ignore_ascii_case("me") {
            return Self::Me;
        }
        if let Ok(id) = entity.parse::<i64>() {
            return Self::Owner(id);
        }
        let lower = entity.to_ascii_lowercase();
        for prefix in ["club", "public"] {
            if let Some(Ok(id)) = lower.strip_prefix(prefix).map(str::parse::<i64>) {
                return Self::Owner(-id);
            }
        }
        Self::Domain(entity.to_owned())
    }

    /// `owner_id` or `domain` parameter selecting this wall
    fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Me => Vec::new(),
            Self::Owner(id) => vec![("owner_id", id.to_string())],
            Self::Domain(name) => vec![("domain", name.clone())],
        }
    }

    /// Community id when the wall belongs to a community
    const fn group_id(&self) -> Option<i64> {
        match self {
            Self::Owner(id) if *id < 0 => Some(-*id),
            _ => None,
        }
    }
}

/// `VKontakte` API connector
pub struct VkontakteConnector {
    config: ProviderConfig,
    state: ConnectorState,
}

impl VkontakteConnector {
    /// Connector for the given endpoint configuration
    #[must_use]
    pub const fn with_config(config: ProviderConfig) -> Self {
        Self {
            config,
            state: ConnectorState::new(PROVIDER),
        }
    }

    /// Call an API method; the token and version travel with every call
    async fn call<T: DeserializeOwned>(&self, method: &str, params: &[(&str, String)]) -> AppResult<T> {
        let token = self.state.access_token().await?;
        let version = self
            .config
            .api_version
            .clone()
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_owned());
        let mut form = vec![("access_token", token), ("v", version)];
        form.extend(params.iter().cloned());

        debug!("Calling VK method {method}");
        let request = shared_client()
            .post(self.config.endpoint(method))
            .form(&form);
        let envelope: VkEnvelope<T> = api::send_json(PROVIDER, request).await?;
        unwrap_envelope(method, envelope)
    }

    async fn list(
        &self,
        method: &str,
        mut params: Vec<(&str, String)>,
        request: &ExportRequest,
    ) -> AppResult<(u64, VkList)> {
        let offset = vendor_offset(PROVIDER, request).unwrap_or(0);
        params.push(("offset", offset.to_string()));
        params.push((
            "count",
            clamp_page_size(request.max_results, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE).to_string(),
        ));
        let list = self.call(method, &params).await?;
        Ok((offset, list))
    }

    /// Numeric id of the user behind an entity
    async fn user_id(&self, entity: &str) -> AppResult<i64> {
        match Wall::parse(entity) {
            Wall::Owner(id) if id > 0 => Ok(id),
            Wall::Owner(_) => Err(AppError::invalid_parameter(
                "entity",
                "a community has no followers or friends",
            )),
            Wall::Me => Ok(self.fetch_user(None).await?.0.id),
            Wall::Domain(name) => Ok(self.fetch_user(Some(&name)).await?.0.id),
        }
    }

    async fn fetch_user(&self, user: Option<&str>) -> AppResult<(VkUser, Value)> {
        let mut params = vec![("fields", USER_FIELDS.to_owned())];
        if let Some(user) = user {
            params.push(("user_ids", user.to_owned()));
        }
        let users: Vec<Value> = self.call("users.get", &params).await?;
        let raw = users.into_iter().next().ok_or_else(|| {
            AppError::not_found(PROVIDER, format!("User '{}' not found", user.unwrap_or("me")))
        })?;
        Ok((api::from_value(PROVIDER, &raw)?, raw))
    }

    /// Upload a photo to the wall upload server and return its attachment id
    async fn upload_wall_photo(&self, wall: &Wall, media: &MediaUpload) -> AppResult<String> {
        media.validate()?;
        let group = wall.group_id().map(|id| ("group_id", id.to_string()));

        let server: UploadServer = self
            .call("photos.getWallUploadServer", group.as_slice())
            .await?;
        let (file_name, content_type, data) = api::media_bytes(PROVIDER, &media.source).await?;
        let form = Form::new().part("photo", api::file_part(&file_name, &content_type, data)?);
        let uploaded: UploadedPhoto =
            api::send_json(PROVIDER, shared_client().post(&server.upload_url).multipart(form))
                .await?;
        if uploaded.photo.is_empty() || uploaded.photo == "[]" {
            return Err(AppError::service(PROVIDER, "Upload server rejected the photo"));
        }

        let mut params = vec![
            ("server", api::id_string(&uploaded.server).unwrap_or_default()),
            ("photo", uploaded.photo),
            ("hash", uploaded.hash),
        ];
        if let Some(caption) = media.caption.as_deref() {
            params.push(("caption", caption.to_owned()));
        }
        params.extend(group);
        let saved: Vec<SavedPhoto> = self.call("photos.saveWallPhoto", &params).await?;
        let photo = saved
            .first()
            .ok_or_else(|| AppError::service(PROVIDER, "saveWallPhoto returned no photo"))?;
        Ok(format!("photo{}_{}", photo.owner_id, photo.id))
    }

    async fn wall_post(
        &self,
        wall: &Wall,
        message: Option<&str>,
        attachments: Vec<String>,
    ) -> AppResult<PostResult> {
        let mut params = wall.params();
        if wall.group_id().is_some() {
            params.push(("from_group", "1".to_owned()));
        }
        if let Some(message) = message {
            params.push(("message", message.to_owned()));
        }
        if !attachments.is_empty() {
            params.push(("attachments", attachments.join(",")));
        }
        let raw: Value = self.call("wall.post", &params).await?;
        let created: CreatedPost = api::from_value(PROVIDER, &raw)?;

        let owner = match wall {
            Wall::Owner(id) => *id,
            Wall::Me | Wall::Domain(_) => self.fetch_user(None).await?.0.id,
        };
        info!("Published VK wall post {owner}_{}", created.post_id);
        let id = format!("{owner}_{}", created.post_id);
        Ok(PostResult::new(id.clone(), PROVIDER)
            .with_url(format!("{SITE_URL}/wall{id}"))
            .with_raw(raw))
    }
}

fn unwrap_envelope<T>(method: &str, envelope: VkEnvelope<T>) -> AppResult<T> {
    if let Some(error) = envelope.error {
        let message = error.error_msg.unwrap_or_else(|| "unknown error".to_owned());
        let code = error.error_code.unwrap_or_default();
        return Err(AppError::service(
            PROVIDER,
            format!("{method} failed ({code}): {message}"),
        ));
    }
    envelope
        .response
        .ok_or_else(|| AppError::service(PROVIDER, format!("{method} returned no response")))
}

fn full_name(first: Option<String>, last: Option<String>) -> Option<String> {
    let name = [first, last]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!name.is_empty()).then_some(name)
}

#[async_trait]
impl Connector for VkontakteConnector {
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
            extra_auth_params: &[("display", "page")],
            ..OAuthSettings::default()
        }
    }

    #[instrument(skip(self), fields(provider = "vkontakte", api_call = "get_profile"))]
    async fn get_profile(&self, entity: &str) -> AppResult<Profile> {
        let target = match Wall::parse(entity) {
            Wall::Me => None,
            Wall::Owner(id) => Some(id.to_string()),
            Wall::Domain(name) => Some(name),
        };
        let (user, raw) = self.fetch_user(target.as_deref()).await?;
        let screen_name = user
            .screen_name
            .clone()
            .unwrap_or_else(|| format!("id{}", user.id));
        let counters = user.counters;
        Ok(Profile {
            name: full_name(user.first_name.clone(), user.last_name.clone()),
            first_name: user.first_name,
            last_name: user.last_name,
            profile_url: Some(format!("{SITE_URL}/{screen_name}")),
            username: Some(screen_name),
            avatar_url: user.photo_200,
            followers_count: user.followers_count,
            following_count: counters.as_ref().and_then(|c| c.friends),
            posts_count: counters.and_then(|c| c.posts),
            raw,
            ..Profile::new(user.id.to_string(), PROVIDER)
        })
    }
}

#[async_trait]
impl SocialNetwork for VkontakteConnector {
    #[instrument(skip(self, request), fields(provider = "vkontakte", api_call = "post"))]
    async fn post(&self, request: PostRequest) -> AppResult<PostResult> {
        request.validate()?;
        let wall = Wall::parse(&request.entity);
        let mut attachments = Vec::with_capacity(request.media.len() + 1);
        for media in &request.media {
            attachments.push(self.upload_wall_photo(&wall, media).await?);
        }
        if let Some(link) = request.link.as_deref() {
            attachments.push(link.to_owned());
        }
        self.wall_post(&wall, request.message.as_deref(), attachments)
            .await
    }

    /// Upload a photo and publish it on the wall
    #[instrument(skip(self, media), fields(provider = "vkontakte", api_call = "import_media"))]
    async fn import_media(&self, entity: &str, media: MediaUpload) -> AppResult<PostResult> {
        let wall = Wall::parse(entity);
        let attachment = self.upload_wall_photo(&wall, &media).await?;
        self.wall_post(&wall, media.caption.as_deref(), vec![attachment])
            .await
    }

    #[instrument(skip(self), fields(provider = "vkontakte", api_call = "export_posts"))]
    async fn export_posts(&self, request: &ExportRequest) -> AppResult<CursorPage<ExportItem>> {
        let params = Wall::parse(&request.entity).params();
        let (offset, list) = self.list("wall.get", params, request).await?;
        let next = next_offset(offset, list.items.len(), Some(list.count));
        let items = list
            .items
            .into_iter()
            .map(convert_wall_post)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, next))
    }

    #[instrument(skip(self), fields(provider = "vkontakte", api_call = "export_followers"))]
    async fn export_followers(&self, request: &ExportRequest) -> AppResult<CursorPage<ExportItem>> {
        let user_id = self.user_id(&request.entity).await?;
        let params = vec![
            ("user_id", user_id.to_string()),
            ("fields", USER_FIELDS.to_owned()),
        ];
        let (offset, list) = self.list("users.getFollowers", params, request).await?;
        let next = next_offset(offset, list.items.len(), Some(list.count));
        let items = list
            .items
            .into_iter()
            .map(convert_user)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, next))
    }

    /// Friends of the user
    #[instrument(skip(self), fields(provider = "vkontakte", api_call = "export_subscriptions"))]
    async fn export_subscriptions(
        &self,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        let user_id = self.user_id(&request.entity).await?;
        let params = vec![
            ("user_id", user_id.to_string()),
            ("fields", USER_FIELDS.to_owned()),
        ];
        let (offset, list) = self.list("friends.get", params, request).await?;
        let next = next_offset(offset, list.items.len(), Some(list.count));
        let items = list
            .items
            .into_iter()
            .map(convert_user)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, next))
    }

    /// Communities the user belongs to
    #[instrument(skip(self), fields(provider = "vkontakte", api_call = "export_collections"))]
    async fn export_collections(
        &self,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        let user_id = self.user_id(&request.entity).await?;
        let params = vec![
            ("user_id", user_id.to_string()),
            ("extended", "1".to_owned()),
            ("fields", "members_count".to_owned()),
        ];
        let (offset, list) = self.list("groups.get", params, request).await?;
        let next = next_offset(offset, list.items.len(), Some(list.count));
        let items = list
            .items
            .into_iter()
            .map(convert_community)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, next))
    }
}

fn convert_wall_post(raw: Value) -> AppResult<ExportItem> {
    let post: WallPost = api::from_value(PROVIDER, &raw)?;
    let id = format!("{}_{}", post.owner_id, post.id);
    Ok(ExportItem {
        url: Some(format!("{SITE_URL}/wall{id}")),
        text: post.text.filter(|t| !t.is_empty()),
        author: post.from_id.map(|from| from.to_string()),
        created_at: post.date.and_then(from_unix),
        raw,
        ..ExportItem::new(id, PROVIDER, ExportKind::Post)
    })
}

fn convert_user(raw: Value) -> AppResult<ExportItem> {
    let user: VkUser = api::from_value(PROVIDER, &raw)?;
    let screen_name = user
        .screen_name
        .unwrap_or_else(|| format!("id{}", user.id));
    Ok(ExportItem {
        title: full_name(user.first_name, user.last_name),
        url: Some(format!("{SITE_URL}/{screen_name}")),
        media_url: user.photo_200,
        author: Some(screen_name),
        count: user.followers_count,
        raw,
        ..ExportItem::new(user.id.to_string(), PROVIDER, ExportKind::User)
    })
}

fn convert_community(raw: Value) -> AppResult<ExportItem> {
    let group: Community = api::from_value(PROVIDER, &raw)?;
    let screen_name = group
        .screen_name
        .unwrap_or_else(|| format!("club{}", group.id));
    Ok(ExportItem {
        title: group.name,
        url: Some(format!("{SITE_URL}/{screen_name}")),
        media_url: group.photo_200,
        count: group.members_count,
        raw,
        ..ExportItem::new(group.id.to_string(), PROVIDER, ExportKind::Collection)
    })
}

// ============================================================================
// Connector Factory
// ============================================================================

/// Factory registered for `vkontakte` in the social family
#[must_use]
pub fn create_connector(config: ProviderConfig) -> Arc<dyn SocialNetwork> {
    Arc::new(VkontakteConnector::with_config(config))
}
