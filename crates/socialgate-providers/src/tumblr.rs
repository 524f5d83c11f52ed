// ABOUTME: Tumblr API v2 connector signed with OAuth 1.0a
// ABOUTME: Blog posts, followers, followed blogs and text, link and photo publishing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::api::{self, from_unix};
use crate::core::{Connector, ConnectorState, ProviderConfig, SocialNetwork};
use crate::errors::{AppError, AppResult};
use crate::models::{
    ExportItem, ExportKind, ExportRequest, MediaSource, MediaUpload, PostRequest, PostResult,
    Profile,
};
use crate::oauth1::{signed_request, url_with_query};
use crate::pagination::{cursor_page, next_offset, vendor_offset, CursorPage};
use crate::spi::AuthScheme;
use crate::validation::clamp_page_size;

const PROVIDER: &str = "tumblr";
/// Tumblr pages at most 20 items
const MAX_RESULTS: u32 = 20;

// ============================================================================
// API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct TumblrEnvelope<T> {
    response: T,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    user: TumblrUser,
}

#[derive(Debug, Deserialize)]
struct TumblrUser {
    name: String,
    following: Option<u64>,
    #[serde(default)]
    blogs: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct TumblrBlog {
    name: String,
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
    #[serde(default)]
    primary: bool,
    followers: Option<u64>,
    posts: Option<u64>,
    updated: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct PostsResponse {
    #[serde(default)]
    posts: Vec<Value>,
    total_posts: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TumblrPost {
    id_string: Option<String>,
    id: Option<Value>,
    blog_name: Option<String>,
    post_url: Option<String>,
    timestamp: Option<i64>,
    title: Option<String>,
    summary: Option<String>,
    body: Option<String>,
    caption: Option<String>,
    #[serde(default)]
    photos: Vec<TumblrPhoto>,
}

#[derive(Debug, Deserialize)]
struct TumblrPhoto {
    original_size: Option<PhotoSize>,
}

#[derive(Debug, Deserialize)]
struct PhotoSize {
    url: String,
}

#[derive(Debug, Deserialize)]
struct FollowersResponse {
    #[serde(default)]
    users: Vec<Value>,
    total_users: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct FollowingResponse {
    #[serde(default)]
    blogs: Vec<Value>,
    total_blogs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CreatedPost {
    id_string: Option<String>,
    id: Option<Value>,
}

/// Tumblr API v2 connector
pub struct TumblrConnector {
    config: ProviderConfig,
    state: ConnectorState,
}

impl TumblrConnector {
    /// Connector for the given endpoint configuration
    #[must_use]
    pub const fn with_config(config: ProviderConfig) -> Self {
        Self {
            config,
            state: ConnectorState::new(PROVIDER),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> AppResult<T> {
        let url = url_with_query(&self.config.endpoint(path), query)?;
        let request = signed_request(&self.state, Method::GET, &url, &[]).await?;
        let envelope: TumblrEnvelope<T> = api::send_json(PROVIDER, request).await?;
        Ok(envelope.response)
    }

    async fn user_info(&self) -> AppResult<UserInfo> {
        self.get("user/info", &[]).await
    }

    /// Blog hostname for an entity; `"me"` resolves to the primary blog
    async fn blog(&self, entity: &str) -> AppResult<String> {
        let entity = entity.trim();
        if !(entity.is_empty() || entity.eq_ignore_ascii_case("me")) {
            return Ok(blog_identifier(entity));
        }
        let info = self.user_info().await?;
        let blogs = info
            .user
            .blogs
            .iter()
            .map(|raw| api::from_value::<TumblrBlog>(PROVIDER, raw))
            .collect::<AppResult<Vec<_>>>()?;
        let primary = blogs
            .iter()
            .find(|b| b.primary)
            .or_else(|| blogs.first())
            .ok_or_else(|| AppError::not_found(PROVIDER, "The account has no blog"))?;
        debug!("Resolved primary Tumblr blog {}", primary.name);
        Ok(blog_identifier(&primary.name))
    }

    fn page_query(request: &ExportRequest) -> (u64, Vec<(&'static str, String)>) {
        let offset = vendor_offset(PROVIDER, request).unwrap_or(0);
        let limit = clamp_page_size(request.max_results, MAX_RESULTS, MAX_RESULTS);
        (
            offset,
            vec![("limit", limit.to_string()), ("offset", offset.to_string())],
        )
    }

    async fn publish(&self, blog: &str, form: Vec<(&str, String)>) -> AppResult<PostResult> {
        let url = self.config.endpoint(&format!("blog/{blog}/post"));
        let signed: Vec<(&str, &str)> = form.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let request = signed_request(&self.state, Method::POST, &url, &signed)
            .await?
            .form(&form);
        self.created(blog, request).await
    }

    async fn created(&self, blog: &str, request: RequestBuilder) -> AppResult<PostResult> {
        let response: Value = api::send_json(PROVIDER, request).await?;
        let created: TumblrEnvelope<CreatedPost> = api::from_value(PROVIDER, &response)?;
        let id = created
            .response
            .id_string
            .or_else(|| created.response.id.as_ref().and_then(api::id_string))
            .ok_or_else(|| AppError::service(PROVIDER, "Post creation returned no id"))?;
        info!("Published Tumblr post {id} on {blog}");
        Ok(PostResult::new(id.clone(), PROVIDER)
            .with_url(format!("https://{blog}/post/{id}"))
            .with_raw(response))
    }

    async fn publish_photo(
        &self,
        blog: &str,
        media: MediaUpload,
        caption: Option<String>,
    ) -> AppResult<PostResult> {
        media.validate()?;
        let caption = caption.or(media.caption).unwrap_or_default();
        match media.source {
            MediaSource::Url(source) => {
                self.publish(
                    blog,
                    vec![
                        ("type", "photo".to_owned()),
                        ("source", source),
                        ("caption", caption),
                    ],
                )
                .await
            }
            MediaSource::Bytes {
                file_name,
                content_type,
                data,
            } => {
                // Multipart bodies are not part of the OAuth signature
                let url = self.config.endpoint(&format!("blog/{blog}/post"));
                let form = Form::new()
                    .text("type", "photo")
                    .text("caption", caption)
                    .part("data", api::file_part(&file_name, &content_type, data)?);
                let request = signed_request(&self.state, Method::POST, &url, &[])
                    .await?
                    .multipart(form);
                self.created(blog, request).await
            }
        }
    }
}

/// `name` becomes `name.tumblr.com`; custom domains pass through
fn blog_identifier(entity: &str) -> String {
    if entity.contains('.') {
        entity.to_owned()
    } else {
        format!("{entity}.tumblr.com")
    }
}

#[async_trait]
impl Connector for TumblrConnector {
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
        AuthScheme::OAuth1
    }

    #[instrument(skip(self), fields(provider = "tumblr", api_call = "get_profile"))]
    async fn get_profile(&self, entity: &str) -> AppResult<Profile> {
        let entity = entity.trim();
        if !(entity.is_empty() || entity.eq_ignore_ascii_case("me")) {
            let blog = blog_identifier(entity);
            let raw: Value = self.get(&format!("blog/{blog}/info"), &[]).await?;
            let info: TumblrBlog =
                api::from_value(PROVIDER, raw.get("blog").unwrap_or(&Value::Null))?;
            return Ok(Profile {
                username: Some(info.name.clone()),
                name: info.title,
                profile_url: info.url,
                followers_count: info.followers,
                posts_count: info.posts,
                raw,
                ..Profile::new(info.name, PROVIDER)
            });
        }

        let info = self.user_info().await?;
        let user = info.user;
        let primary = user
            .blogs
            .iter()
            .filter_map(|raw| api::from_value::<TumblrBlog>(PROVIDER, raw).ok())
            .find(|b| b.primary);
        let raw = serde_json::json!({
            "name": user.name,
            "following": user.following,
            "blogs": user.blogs,
        });
        Ok(Profile {
            username: Some(user.name.clone()),
            following_count: user.following,
            name: primary.as_ref().and_then(|b| b.title.clone()),
            profile_url: primary.as_ref().and_then(|b| b.url.clone()),
            followers_count: primary.as_ref().and_then(|b| b.followers),
            posts_count: primary.and_then(|b| b.posts),
            raw,
            ..Profile::new(user.name, PROVIDER)
        })
    }
}

#[async_trait]
impl SocialNetwork for TumblrConnector {
    #[instrument(skip(self, request), fields(provider = "tumblr", api_call = "post"))]
    async fn post(&self, request: PostRequest) -> AppResult<PostResult> {
        request.validate()?;
        let blog = self.blog(&request.entity).await?;

        if let Some(media) = request.media.first() {
            return self
                .publish_photo(&blog, media.clone(), request.text().map(str::to_owned))
                .await;
        }

        let mut form = Vec::new();
        if let Some(link) = request.link.as_deref().filter(|l| !l.trim().is_empty()) {
            form.push(("type", "link".to_owned()));
            form.push(("url", link.to_owned()));
            if let Some(title) = request.title.as_deref() {
                form.push(("title", title.to_owned()));
            }
            if let Some(text) = request.text() {
                form.push(("description", text.to_owned()));
            }
        } else {
            form.push(("type", "text".to_owned()));
            if let Some(title) = request.title.as_deref() {
                form.push(("title", title.to_owned()));
            }
            form.push(("body", request.text().unwrap_or_default().to_owned()));
        }
        self.publish(&blog, form).await
    }

    #[instrument(skip(self, media), fields(provider = "tumblr", api_call = "import_media"))]
    async fn import_media(&self, entity: &str, media: MediaUpload) -> AppResult<PostResult> {
        let blog = self.blog(entity).await?;
        self.publish_photo(&blog, media, None).await
    }

    #[instrument(skip(self), fields(provider = "tumblr", api_call = "export_posts"))]
    async fn export_posts(&self, request: &ExportRequest) -> AppResult<CursorPage<ExportItem>> {
        let blog = self.blog(&request.entity).await?;
        let (offset, query) = Self::page_query(request);
        let response: PostsResponse = self.get(&format!("blog/{blog}/posts"), &query).await?;
        let next = next_offset(offset, response.posts.len(), response.total_posts);
        let items = response
            .posts
            .into_iter()
            .map(convert_post)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, next))
    }

    #[instrument(skip(self), fields(provider = "tumblr", api_call = "export_followers"))]
    async fn export_followers(&self, request: &ExportRequest) -> AppResult<CursorPage<ExportItem>> {
        let blog = self.blog(&request.entity).await?;
        let (offset, query) = Self::page_query(request);
        let response: FollowersResponse =
            self.get(&format!("blog/{blog}/followers"), &query).await?;
        let next = next_offset(offset, response.users.len(), response.total_users);
        let items = response
            .users
            .into_iter()
            .map(|raw| convert_blog(raw, ExportKind::User))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, next))
    }

    /// Blogs the authenticated user follows
    #[instrument(skip(self), fields(provider = "tumblr", api_call = "export_subscriptions"))]
    async fn export_subscriptions(
        &self,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        if !request.is_me() {
            return Err(AppError::unsupported_feature(
                PROVIDER,
                "followed blogs of other users",
            ));
        }
        let (offset, query) = Self::page_query(request);
        let response: FollowingResponse = self.get("user/following", &query).await?;
        let next = next_offset(offset, response.blogs.len(), response.total_blogs);
        let items = response
            .blogs
            .into_iter()
            .map(|raw| convert_blog(raw, ExportKind::User))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, next))
    }

    /// Blogs owned by the authenticated user (single page)
    #[instrument(skip(self), fields(provider = "tumblr", api_call = "export_collections"))]
    async fn export_collections(
        &self,
        _request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        let info = self.user_info().await?;
        let items = info
            .user
            .blogs
            .into_iter()
            .map(|raw| convert_blog(raw, ExportKind::Collection))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, None))
    }
}

fn convert_post(raw: Value) -> AppResult<ExportItem> {
    let post: TumblrPost = api::from_value(PROVIDER, &raw)?;
    let id = post
        .id_string
        .or_else(|| post.id.as_ref().and_then(api::id_string))
        .ok_or_else(|| AppError::service(PROVIDER, "Post without id"))?;
    let media_url = post
        .photos
        .into_iter()
        .find_map(|p| p.original_size)
        .map(|size| size.url);
    Ok(ExportItem {
        title: post.title,
        text: post.summary.or(post.body).or(post.caption),
        url: post.post_url,
        media_url,
        author: post.blog_name,
        created_at: post.timestamp.and_then(from_unix),
        raw,
        ..ExportItem::new(id, PROVIDER, ExportKind::Post)
    })
}

fn convert_blog(raw: Value, kind: ExportKind) -> AppResult<ExportItem> {
    let blog: TumblrBlog = api::from_value(PROVIDER, &raw)?;
    Ok(ExportItem {
        title: blog.title.or_else(|| Some(blog.name.clone())),
        text: blog.description,
        url: blog.url,
        created_at: blog.updated.and_then(from_unix),
        count: blog.posts.or(blog.followers),
        raw,
        ..ExportItem::new(blog.name, PROVIDER, kind)
    })
}

// ============================================================================
// Connector Factory
// ============================================================================

/// Factory registered for `tumblr` in the social family
#[must_use]
pub fn create_connector(config: ProviderConfig) -> Arc<dyn SocialNetwork> {
    Arc::new(TumblrConnector::with_config(config))
}
