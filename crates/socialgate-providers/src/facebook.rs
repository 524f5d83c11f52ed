// ABOUTME: Facebook Graph API connector for profiles, feed posts, photos, friends and managed pages
// ABOUTME: Posts to pages with the page access token when the user manages the page
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::Form;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::api::{self, parse_datetime};
use crate::core::{Connector, ConnectorState, ProviderConfig, SocialNetwork};
use crate::errors::AppResult;
use crate::graph::{self, GraphList};
use crate::http_client::shared_client;
use crate::models::{
    ExportItem, ExportKind, ExportRequest, MediaSource, MediaUpload, PostRequest, PostResult,
    Profile,
};
use crate::oauth2::OAuthSettings;
use crate::pagination::{cursor_page, CursorPage};

const PROVIDER: &str = "facebook";
const PROFILE_FIELDS: &str = "id,name,first_name,last_name,email,link,picture.type(large)";
const POST_FIELDS: &str = "id,message,story,created_time,permalink_url,full_picture,from";
const PHOTO_FIELDS: &str = "id,name,created_time,link,images,from";
const FRIEND_FIELDS: &str = "id,name,link,picture";
const PAGE_FIELDS: &str = "id,name,category,link,fan_count";

// ============================================================================
// API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct GraphUser {
    id: String,
    name: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    link: Option<String>,
    picture: Option<GraphPicture>,
}

#[derive(Debug, Deserialize)]
struct GraphPicture {
    data: GraphPictureData,
}

#[derive(Debug, Deserialize)]
struct GraphPictureData {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphFrom {
    id: String,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphPost {
    id: String,
    message: Option<String>,
    story: Option<String>,
    created_time: Option<String>,
    permalink_url: Option<String>,
    full_picture: Option<String>,
    from: Option<GraphFrom>,
}

#[derive(Debug, Deserialize)]
struct GraphPhoto {
    id: String,
    name: Option<String>,
    created_time: Option<String>,
    link: Option<String>,
    #[serde(default)]
    images: Vec<GraphImage>,
    from: Option<GraphFrom>,
}

#[derive(Debug, Deserialize)]
struct GraphImage {
    source: String,
}

#[derive(Debug, Deserialize)]
struct GraphPage {
    id: String,
    name: Option<String>,
    category: Option<String>,
    link: Option<String>,
    fan_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PageToken {
    access_token: Option<String>,
}

/// Facebook Graph API connector
pub struct FacebookConnector {
    config: ProviderConfig,
    state: ConnectorState,
}

impl FacebookConnector {
    /// Connector for the given endpoint configuration
    #[must_use]
    pub const fn with_config(config: ProviderConfig) -> Self {
        Self {
            config,
            state: ConnectorState::new(PROVIDER),
        }
    }

    async fn list(&self, path: &str, fields: &str, request: &ExportRequest) -> AppResult<GraphList> {
        let token = self.state.access_token().await?;
        graph::list(PROVIDER, &self.config, &token, path, fields, request).await
    }

    /// Token to publish on `target`: the page token for managed pages, else the user token
    async fn publishing_token(&self, target: &str) -> AppResult<String> {
        let user_token = self.state.access_token().await?;
        if target == "me" {
            return Ok(user_token);
        }

        let lookup: AppResult<PageToken> = graph::get(
            PROVIDER,
            &self.config,
            &user_token,
            target,
            &[("fields", "access_token".to_owned())],
        )
        .await;
        match lookup {
            Ok(PageToken {
                access_token: Some(page_token),
            }) if !page_token.is_empty() => {
                debug!("Publishing on page {target} with its page token");
                Ok(page_token)
            }
            Ok(_) => Ok(user_token),
            Err(e) => {
                warn!("Could not obtain a page token for {target}, using the user token: {e}");
                Ok(user_token)
            }
        }
    }

    async fn upload_photo(&self, target: &str, token: &str, media: MediaUpload) -> AppResult<PostResult> {
        media.validate()?;
        let caption = media.caption.or(media.title).unwrap_or_default();
        let url = self.config.endpoint(&format!("{target}/photos"));

        let request = match media.source {
            MediaSource::Url(source_url) => shared_client()
                .post(url)
                .bearer_auth(token)
                .form(&[("url", source_url), ("caption", caption)]),
            MediaSource::Bytes {
                file_name,
                content_type,
                data,
            } => {
                let form = Form::new()
                    .text("caption", caption)
                    .part("source", api::file_part(&file_name, &content_type, data)?);
                shared_client().post(url).bearer_auth(token).multipart(form)
            }
        };

        let response: Value = api::send_json(PROVIDER, request).await?;
        let id = graph::created_id(PROVIDER, &response)?;
        info!("Uploaded Facebook photo {id} to {target}");
        Ok(PostResult::new(id.clone(), PROVIDER)
            .with_url(format!("https://www.facebook.com/{id}"))
            .with_raw(response))
    }
}

fn target_of(entity: &str) -> &str {
    let entity = entity.trim();
    if entity.is_empty() || entity.eq_ignore_ascii_case("me") {
        "me"
    } else {
        entity
    }
}

#[async_trait]
impl Connector for FacebookConnector {
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

    #[instrument(skip(self), fields(provider = "facebook", api_call = "get_profile"))]
    async fn get_profile(&self, entity: &str) -> AppResult<Profile> {
        let token = self.state.access_token().await?;
        let raw: Value = graph::get(
            PROVIDER,
            &self.config,
            &token,
            target_of(entity),
            &[("fields", PROFILE_FIELDS.to_owned())],
        )
        .await?;
        convert_profile(raw)
    }
}

#[async_trait]
impl SocialNetwork for FacebookConnector {
    #[instrument(skip(self, request), fields(provider = "facebook", api_call = "post"))]
    async fn post(&self, request: PostRequest) -> AppResult<PostResult> {
        request.validate()?;
        let target = target_of(&request.entity);
        let token = self.publishing_token(target).await?;

        if let Some(first) = request.media.first() {
            if request.media.len() > 1 {
                warn!(
                    "Facebook feed posts carry one photo; ignoring {} extra attachment(s)",
                    request.media.len() - 1
                );
            }
            let mut media = first.clone();
            if media.caption.is_none() {
                media.caption = request.text().map(str::to_owned);
            }
            return self.upload_photo(target, &token, media).await;
        }

        let mut form = Vec::new();
        if let Some(message) = request.text() {
            form.push(("message", message.to_owned()));
        }
        if let Some(link) = request.link.as_deref() {
            form.push(("link", link.to_owned()));
        }
        let response: Value =
            graph::post_form(PROVIDER, &self.config, &token, &format!("{target}/feed"), &form)
                .await?;
        let id = graph::created_id(PROVIDER, &response)?;
        info!("Published Facebook post {id} on {target}");
        Ok(PostResult::new(id.clone(), PROVIDER)
            .with_url(format!("https://www.facebook.com/{id}"))
            .with_raw(response))
    }

    #[instrument(skip(self, media), fields(provider = "facebook", api_call = "import_media"))]
    async fn import_media(&self, entity: &str, media: MediaUpload) -> AppResult<PostResult> {
        let target = target_of(entity);
        let token = self.publishing_token(target).await?;
        self.upload_photo(target, &token, media).await
    }

    #[instrument(skip(self), fields(provider = "facebook", api_call = "export_posts"))]
    async fn export_posts(&self, request: &ExportRequest) -> AppResult<CursorPage<ExportItem>> {
        let target = target_of(&request.entity);
        let list = self.list(&format!("{target}/feed"), POST_FIELDS, request).await?;
        let next = list.next_after();
        let items = list.data.into_iter().map(convert_post).collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, next))
    }

    #[instrument(skip(self), fields(provider = "facebook", api_call = "export_media"))]
    async fn export_media(&self, request: &ExportRequest) -> AppResult<CursorPage<ExportItem>> {
        let target = target_of(&request.entity);
        let path = if target == "me" {
            "me/photos?type=uploaded".to_owned()
        } else {
            format!("{target}/photos")
        };
        let list = self.list(&path, PHOTO_FIELDS, request).await?;
        let next = list.next_after();
        let items = list.data.into_iter().map(convert_photo).collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, next))
    }

    #[instrument(skip(self), fields(provider = "facebook", api_call = "export_followers"))]
    async fn export_followers(&self, request: &ExportRequest) -> AppResult<CursorPage<ExportItem>> {
        // Graph only lists friends who also use the app
        let target = target_of(&request.entity);
        let list = self.list(&format!("{target}/friends"), FRIEND_FIELDS, request).await?;
        let next = list.next_after();
        let items = list.data.into_iter().map(convert_friend).collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, next))
    }

    #[instrument(skip(self), fields(provider = "facebook", api_call = "export_collections"))]
    async fn export_collections(
        &self,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        let target = target_of(&request.entity);
        let list = self.list(&format!("{target}/accounts"), PAGE_FIELDS, request).await?;
        let next = list.next_after();
        let items = list.data.into_iter().map(convert_page).collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, next))
    }
}

fn convert_profile(raw: Value) -> AppResult<Profile> {
    let user: GraphUser = api::from_value(PROVIDER, &raw)?;
    Ok(Profile {
        profile_url: user
            .link
            .or_else(|| Some(format!("https://www.facebook.com/{}", user.id))),
        name: user.name,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        avatar_url: user.picture.and_then(|p| p.data.url),
        raw,
        ..Profile::new(user.id, PROVIDER)
    })
}

fn convert_post(raw: Value) -> AppResult<ExportItem> {
    let post: GraphPost = api::from_value(PROVIDER, &raw)?;
    Ok(ExportItem {
        text: post.message.or(post.story),
        url: post.permalink_url,
        media_url: post.full_picture,
        author: post.from.map(|f| f.name.unwrap_or(f.id)),
        created_at: post.created_time.as_deref().and_then(parse_datetime),
        raw,
        ..ExportItem::new(post.id, PROVIDER, ExportKind::Post)
    })
}

fn convert_photo(raw: Value) -> AppResult<ExportItem> {
    let photo: GraphPhoto = api::from_value(PROVIDER, &raw)?;
    // Graph lists image renditions largest first
    let media_url = photo.images.into_iter().next().map(|i| i.source);
    Ok(ExportItem {
        title: photo.name,
        url: photo.link,
        media_url,
        author: photo.from.map(|f| f.name.unwrap_or(f.id)),
        created_at: photo.created_time.as_deref().and_then(parse_datetime),
        raw,
        ..ExportItem::new(photo.id, PROVIDER, ExportKind::Media)
    })
}

fn convert_friend(raw: Value) -> AppResult<ExportItem> {
    let user: GraphUser = api::from_value(PROVIDER, &raw)?;
    Ok(ExportItem {
        title: user.name,
        url: user.link,
        media_url: user.picture.and_then(|p| p.data.url),
        raw,
        ..ExportItem::new(user.id, PROVIDER, ExportKind::User)
    })
}

fn convert_page(raw: Value) -> AppResult<ExportItem> {
    let page: GraphPage = api::from_value(PROVIDER, &raw)?;
    Ok(ExportItem {
        url: page
            .link
            .or_else(|| Some(format!("https://www.facebook.com/{}", page.id))),
        title: page.name,
        text: page.category,
        count: page.fan_count,
        raw,
        ..ExportItem::new(page.id, PROVIDER, ExportKind::Collection)
    })
}

// ============================================================================
// Connector Factory
// ============================================================================

/// Factory registered for `facebook` in the social family
#[must_use]
pub fn create_connector(config: ProviderConfig) -> Arc<dyn SocialNetwork> {
    Arc::new(FacebookConnector::with_config(config))
}
