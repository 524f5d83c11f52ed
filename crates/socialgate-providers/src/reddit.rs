// ABOUTME: Reddit OAuth API connector for identities, submissions and subscribed subreddits
// ABOUTME: Submits self and link posts to a subreddit through api/submit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::api::{self, from_unix};
use crate::constants::limits::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::core::{Connector, ConnectorState, ProviderConfig, SocialNetwork};
use crate::errors::{AppError, AppResult};
use crate::http_client::shared_client;
use crate::models::{ExportItem, ExportKind, ExportRequest, PostRequest, PostResult, Profile};
use crate::oauth2::{OAuthSettings, TokenAuth};
use crate::pagination::{cursor_page, vendor_token, CursorPage};
use crate::validation::{clamp_page_size, require};

const PROVIDER: &str = "reddit";
const SITE_URL: &str = "https://www.reddit.com";

// ============================================================================
// API Response Structures
// ============================================================================

/// `{"kind": "Listing", "data": {"after": "t3_x", "children": [...]}}`
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    after: Option<String>,
    #[serde(default)]
    children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
struct Thing {
    data: Value,
}

#[derive(Debug, Deserialize)]
struct Account {
    id: String,
    name: String,
    icon_img: Option<String>,
    created_utc: Option<f64>,
    subreddit: Option<ProfileSubreddit>,
}

#[derive(Debug, Deserialize)]
struct ProfileSubreddit {
    title: Option<String>,
    subscribers: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Submission {
    name: String,
    title: Option<String>,
    selftext: Option<String>,
    url: Option<String>,
    permalink: Option<String>,
    author: Option<String>,
    created_utc: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Subreddit {
    name: String,
    display_name_prefixed: Option<String>,
    title: Option<String>,
    public_description: Option<String>,
    url: Option<String>,
    icon_img: Option<String>,
    subscribers: Option<u64>,
    created_utc: Option<f64>,
}

/// `api_type=json` wraps the outcome in `{"json": {"errors": [...], "data": {...}}}`
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    json: SubmitJson,
}

#[derive(Debug, Deserialize)]
struct SubmitJson {
    #[serde(default)]
    errors: Vec<Vec<Value>>,
    data: Option<SubmitData>,
}

#[derive(Debug, Deserialize)]
struct SubmitData {
    id: Option<String>,
    name: Option<String>,
    url: Option<String>,
}

/// Reddit OAuth API connector
pub struct RedditConnector {
    config: ProviderConfig,
    state: ConnectorState,
}

impl RedditConnector {
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
            .query(&[("raw_json", "1")])
            .query(query);
        api::send_json(PROVIDER, request).await
    }

    async fn list(&self, path: &str, request: &ExportRequest) -> AppResult<ListingData> {
        let mut query = vec![(
            "limit",
            clamp_page_size(request.max_results, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE).to_string(),
        )];
        if let Some(after) = vendor_token(PROVIDER, request) {
            query.push(("after", after));
        }
        let listing: Listing = self.get(path, &query).await?;
        Ok(listing.data)
    }

    /// Account name of `"me"` or of the given user
    async fn username(&self, entity: &str) -> AppResult<String> {
        let entity = strip_user_prefix(entity);
        if entity.is_empty() || entity.eq_ignore_ascii_case("me") {
            let me: Account = self.get("api/v1/me", &[]).await?;
            Ok(me.name)
        } else {
            Ok(entity.to_owned())
        }
    }
}

fn strip_user_prefix(entity: &str) -> &str {
    let entity = entity.trim().trim_start_matches('/');
    entity
        .strip_prefix("u/")
        .or_else(|| entity.strip_prefix("user/"))
        .unwrap_or(entity)
}

fn subreddit_name(entity: &str) -> &str {
    let entity = entity.trim().trim_start_matches('/');
    entity.strip_prefix("r/").unwrap_or(entity)
}

fn permalink(path: Option<String>) -> Option<String> {
    path.map(|p| api::endpoint(SITE_URL, &p))
}

fn from_epoch(secs: Option<f64>) -> Option<DateTime<Utc>> {
    secs.and_then(|s| from_unix(s as i64))
}

/// First error reported by `api/submit`, e.g. `["SUBREDDIT_NOEXIST", "that subreddit doesn't exist", "sr"]`
fn submit_error(errors: &[Vec<Value>]) -> Option<String> {
    let first = errors.first()?;
    let parts: Vec<&str> = first.iter().filter_map(Value::as_str).collect();
    Some(match parts.as_slice() {
        [code, message, ..] => format!("{code}: {message}"),
        [code] => (*code).to_owned(),
        [] => "unknown error".to_owned(),
    })
}

#[async_trait]
impl Connector for RedditConnector {
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
            token_auth: TokenAuth::Basic,
            extra_auth_params: &[("duration", "permanent")],
            ..OAuthSettings::default()
        }
    }

    #[instrument(skip(self), fields(provider = "reddit", api_call = "get_profile"))]
    async fn get_profile(&self, entity: &str) -> AppResult<Profile> {
        let name = strip_user_prefix(entity);
        let raw: Value = if name.is_empty() || name.eq_ignore_ascii_case("me") {
            self.get("api/v1/me", &[]).await?
        } else {
            let about: Thing = self.get(&format!("user/{name}/about"), &[]).await?;
            about.data
        };
        let account: Account = api::from_value(PROVIDER, &raw)?;
        let subreddit = account.subreddit;
        Ok(Profile {
            username: Some(account.name.clone()),
            name: subreddit
                .as_ref()
                .and_then(|s| s.title.clone())
                .filter(|t| !t.is_empty()),
            avatar_url: account.icon_img.map(|u| u.replace("&amp;", "&")),
            profile_url: Some(format!("{SITE_URL}/user/{}", account.name)),
            followers_count: subreddit.and_then(|s| s.subscribers),
            created_at: from_epoch(account.created_utc),
            raw,
            ..Profile::new(account.id, PROVIDER)
        })
    }
}

#[async_trait]
impl SocialNetwork for RedditConnector {
    /// Submit to the subreddit named by `entity`: a link post when a link is
    /// given, a self post otherwise
    #[instrument(skip(self, request), fields(provider = "reddit", api_call = "post"))]
    async fn post(&self, request: PostRequest) -> AppResult<PostResult> {
        request.validate()?;
        if request.is_me() {
            return Err(AppError::missing_parameter("entity"));
        }
        let title = require("title", request.title.as_deref())?;
        let sr = subreddit_name(&request.entity);

        let mut form = vec![
            ("api_type", "json".to_owned()),
            ("sr", sr.to_owned()),
            ("title", title.to_owned()),
            ("resubmit", "true".to_owned()),
        ];
        if let Some(link) = request.link.as_deref() {
            form.push(("kind", "link".to_owned()));
            form.push(("url", link.to_owned()));
        } else {
            form.push(("kind", "self".to_owned()));
            form.push(("text", request.message.clone().unwrap_or_default()));
        }

        let token = self.state.access_token().await?;
        let http = shared_client()
            .post(self.config.endpoint("api/submit"))
            .bearer_auth(token)
            .form(&form);
        let raw: Value = api::send_json(PROVIDER, http).await?;
        let response: SubmitResponse = api::from_value(PROVIDER, &raw)?;
        if let Some(message) = submit_error(&response.json.errors) {
            return Err(AppError::service(PROVIDER, message));
        }
        let data = response
            .json
            .data
            .ok_or_else(|| AppError::service(PROVIDER, "Submission returned no data"))?;
        let id = data
            .name
            .or(data.id)
            .ok_or_else(|| AppError::service(PROVIDER, "Submission returned no id"))?;
        info!("Submitted {id} to r/{sr}");

        let result = PostResult::new(id, PROVIDER).with_raw(raw);
        Ok(match data.url {
            Some(url) => result.with_url(url),
            None => result,
        })
    }

    #[instrument(skip(self), fields(provider = "reddit", api_call = "export_posts"))]
    async fn export_posts(&self, request: &ExportRequest) -> AppResult<CursorPage<ExportItem>> {
        let name = self.username(&request.entity).await?;
        let page = self.list(&format!("user/{name}/submitted"), request).await?;
        let items = page
            .children
            .into_iter()
            .map(|thing| convert_submission(thing.data))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, page.after))
    }

    /// Subreddits the authenticated user subscribes to
    #[instrument(skip(self), fields(provider = "reddit", api_call = "export_subscriptions"))]
    async fn export_subscriptions(
        &self,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        if !request.is_me() {
            return Err(AppError::unsupported_feature(
                PROVIDER,
                "subscriptions of other users",
            ));
        }
        let page = self.list("subreddits/mine/subscriber", request).await?;
        let items = page
            .children
            .into_iter()
            .map(|thing| convert_subreddit(thing.data))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, page.after))
    }
}

fn convert_submission(raw: Value) -> AppResult<ExportItem> {
    let post: Submission = api::from_value(PROVIDER, &raw)?;
    Ok(ExportItem {
        title: post.title,
        text: post.selftext.filter(|t| !t.is_empty()),
        url: permalink(post.permalink),
        media_url: post.url,
        author: post.author,
        created_at: from_epoch(post.created_utc),
        raw,
        ..ExportItem::new(post.name, PROVIDER, ExportKind::Post)
    })
}

fn convert_subreddit(raw: Value) -> AppResult<ExportItem> {
    let sub: Subreddit = api::from_value(PROVIDER, &raw)?;
    Ok(ExportItem {
        title: sub.display_name_prefixed.or(sub.title),
        text: sub.public_description.filter(|t| !t.is_empty()),
        url: permalink(sub.url),
        media_url: sub.icon_img.filter(|u| !u.is_empty()),
        count: sub.subscribers,
        created_at: from_epoch(sub.created_utc),
        raw,
        ..ExportItem::new(sub.name, PROVIDER, ExportKind::Collection)
    })
}

// ============================================================================
// Connector Factory
// ============================================================================

/// Factory registered for `reddit` in the social family
#[must_use]
pub fn create_connector(config: ProviderConfig) -> Arc<dyn SocialNetwork> {
    Arc::new(RedditConnector::with_config(config))
}
