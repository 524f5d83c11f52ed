// ABOUTME: Flickr REST API connector signed with OAuth 1.0a
// ABOUTME: Photos, photosets, contacts and multipart photo upload with XML responses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use reqwest::multipart::Form;
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::api::{self, from_unix};
use crate::constants::limits::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::core::{Connector, ConnectorState, ProviderConfig, SocialNetwork};
use crate::errors::{AppError, AppResult};
use crate::models::{
    ExportItem, ExportKind, ExportRequest, MediaUpload, PostRequest, PostResult, Profile,
};
use crate::oauth1::{signed_request, url_with_query};
use crate::oauth2::OAuthSettings;
use crate::pagination::{cursor_page, vendor_offset, CursorPage};
use crate::spi::AuthScheme;
use crate::validation::clamp_page_size;

const PROVIDER: &str = "flickr";
const PHOTO_EXTRAS: &str = "description,date_upload,url_l,owner_name";

/// `<photoid>123</photoid>` in an upload response
static PHOTO_ID_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"<photoid>\s*(\d+)\s*</photoid>").ok());

/// `<err code="5" msg="Filetype was not recognised" />` in an upload response
static UPLOAD_ERROR_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"<err[^>]*\bmsg="([^"]*)""#).ok());

// ============================================================================
// API Response Structures
// ============================================================================

/// Flickr wraps text in `{"_content": "..."}`
#[derive(Debug, Default, Deserialize)]
struct Content {
    #[serde(rename = "_content")]
    content: Option<Value>,
}

impl Content {
    fn text(self) -> Option<String> {
        match self.content? {
            Value::String(s) if !s.is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

fn text(content: Option<Content>) -> Option<String> {
    content.and_then(Content::text)
}

/// Page counters arrive as numbers or strings
fn number(value: Option<&Value>) -> Option<u64> {
    value.and_then(api::id_string).and_then(|s| s.parse().ok())
}

#[derive(Debug, Deserialize)]
struct Person {
    id: Option<String>,
    nsid: Option<String>,
    username: Option<Content>,
    realname: Option<Content>,
    profileurl: Option<Content>,
    photos: Option<PersonPhotos>,
    iconserver: Option<Value>,
    iconfarm: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct PersonPhotos {
    count: Option<Content>,
    firstdate: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    id: String,
    owner: Option<String>,
    title: Option<String>,
    description: Option<Content>,
    dateupload: Option<Value>,
    url_l: Option<String>,
    ownername: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Photoset {
    id: String,
    title: Option<Content>,
    description: Option<Content>,
    photos: Option<Value>,
    date_create: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Contact {
    nsid: String,
    username: Option<String>,
    realname: Option<String>,
}

/// One page of a Flickr listing: `{"page": 1, "pages": 3, "<item>": [...]}`
struct FlickrPage {
    page: u64,
    pages: u64,
    items: Vec<Value>,
}

impl FlickrPage {
    fn from_response(response: &Value, container: &str, item: &str) -> Self {
        let block = response.get(container).unwrap_or(&Value::Null);
        Self {
            page: number(block.get("page")).unwrap_or(1),
            pages: number(block.get("pages")).unwrap_or(1),
            items: block
                .get(item)
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
        }
    }

    /// Page-number cursor for the next page
    fn next(&self) -> Option<String> {
        (self.page < self.pages && !self.items.is_empty()).then(|| (self.page + 1).to_string())
    }
}

/// Flickr REST API connector
pub struct FlickrConnector {
    config: ProviderConfig,
    state: ConnectorState,
}

impl FlickrConnector {
    /// Connector for the given endpoint configuration
    #[must_use]
    pub const fn with_config(config: ProviderConfig) -> Self {
        Self {
            config,
            state: ConnectorState::new(PROVIDER),
        }
    }

    /// Call a REST method; `stat: fail` responses become service errors
    async fn call(&self, method: &str, params: &[(&str, String)]) -> AppResult<Value> {
        let mut query = vec![
            ("method", method.to_owned()),
            ("format", "json".to_owned()),
            ("nojsoncallback", "1".to_owned()),
        ];
        query.extend(params.iter().cloned());
        let url = url_with_query(&self.config.api_base_url, &query)?;
        let request = signed_request(&self.state, Method::GET, &url, &[]).await?;
        let response: Value = api::send_json(PROVIDER, request).await?;
        check_stat(method, response)
    }

    async fn page(
        &self,
        method: &str,
        mut params: Vec<(&str, String)>,
        request: &ExportRequest,
        container: &str,
        item: &str,
    ) -> AppResult<FlickrPage> {
        let page = vendor_offset(PROVIDER, request).unwrap_or(1).max(1);
        params.push((
            "per_page",
            clamp_page_size(request.max_results, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE).to_string(),
        ));
        params.push(("page", page.to_string()));
        let response = self.call(method, &params).await?;
        Ok(FlickrPage::from_response(&response, container, item))
    }

    /// Upload a photo; title and description are signed as form fields
    async fn upload(
        &self,
        media: &MediaUpload,
        title: Option<&str>,
        description: Option<&str>,
    ) -> AppResult<PostResult> {
        media.validate()?;
        let (file_name, content_type, data) = api::media_bytes(PROVIDER, &media.source).await?;

        let mut fields: Vec<(&str, String)> = Vec::new();
        if let Some(title) = title.or(media.title.as_deref()) {
            fields.push(("title", title.to_owned()));
        }
        if let Some(description) = description.or(media.caption.as_deref()) {
            fields.push(("description", description.to_owned()));
        }

        let upload_url = self.config.upload_endpoint("");
        let signed: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let mut form = Form::new();
        for (name, value) in &fields {
            form = form.text(*name, value.clone());
        }
        form = form.part("photo", api::file_part(&file_name, &content_type, data)?);

        let request = signed_request(&self.state, Method::POST, &upload_url, &signed)
            .await?
            .multipart(form);
        let body = api::send_text(PROVIDER, request).await?;
        let id = parse_upload_response(&body)?;
        info!("Uploaded Flickr photo {id}");

        let credentials = self.state.credentials().await?;
        let owner = credentials.user_id.as_deref().unwrap_or("me");
        Ok(PostResult::new(id.clone(), PROVIDER)
            .with_url(format!("https://www.flickr.com/photos/{owner}/{id}"))
            .with_raw(Value::String(body)))
    }
}

fn check_stat(method: &str, response: Value) -> AppResult<Value> {
    if response.get("stat").and_then(Value::as_str) == Some("fail") {
        let message = response
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        let code = response.get("code").and_then(api::id_string).unwrap_or_default();
        return Err(AppError::service(
            PROVIDER,
            format!("{method} failed ({code}): {message}"),
        ));
    }
    Ok(response)
}

fn parse_upload_response(body: &str) -> AppResult<String> {
    if let Some(id) = PHOTO_ID_PATTERN
        .as_ref()
        .and_then(|re| re.captures(body))
        .and_then(|caps| caps.get(1))
    {
        return Ok(id.as_str().to_owned());
    }
    let message = UPLOAD_ERROR_PATTERN
        .as_ref()
        .and_then(|re| re.captures(body))
        .and_then(|caps| caps.get(1))
        .map_or("upload response contains no photo id", |m| m.as_str());
    Err(AppError::service(PROVIDER, format!("Upload failed: {message}")))
}

fn user_param(entity: &str) -> String {
    let entity = entity.trim();
    if entity.is_empty() { "me" } else { entity }.to_owned()
}

#[async_trait]
impl Connector for FlickrConnector {
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

    fn oauth_settings(&self) -> OAuthSettings {
        OAuthSettings {
            extra_auth_params: &[("perms", "write")],
            ..OAuthSettings::default()
        }
    }

    #[instrument(skip(self), fields(provider = "flickr", api_call = "get_profile"))]
    async fn get_profile(&self, entity: &str) -> AppResult<Profile> {
        let mut user_id = user_param(entity);
        if user_id.eq_ignore_ascii_case("me") {
            let login = self.call("flickr.test.login", &[]).await?;
            user_id = login
                .pointer("/user/id")
                .and_then(api::id_string)
                .ok_or_else(|| AppError::service(PROVIDER, "test.login returned no user id"))?;
        }

        let raw = self
            .call("flickr.people.getInfo", &[("user_id", user_id.clone())])
            .await?;
        let person: Person =
            api::from_value(PROVIDER, raw.get("person").unwrap_or(&Value::Null))?;
        let nsid = person.nsid.or(person.id).unwrap_or(user_id);
        let avatar_url = match (
            number(person.iconserver.as_ref()),
            number(person.iconfarm.as_ref()),
        ) {
            (Some(server), Some(farm)) if server > 0 => Some(format!(
                "https://farm{farm}.staticflickr.com/{server}/buddyicons/{nsid}.jpg"
            )),
            _ => Some("https://www.flickr.com/images/buddyicon.gif".to_owned()),
        };
        let photos = person.photos;
        Ok(Profile {
            username: text(person.username),
            name: text(person.realname),
            profile_url: text(person.profileurl),
            avatar_url,
            posts_count: photos
                .as_ref()
                .and_then(|p| p.count.as_ref())
                .and_then(|c| c.content.as_ref())
                .and_then(api::id_string)
                .and_then(|s| s.parse().ok()),
            created_at: photos
                .and_then(|p| text(p.firstdate))
                .and_then(|s| s.parse().ok())
                .and_then(from_unix),
            raw,
            ..Profile::new(nsid, PROVIDER)
        })
    }
}

#[async_trait]
impl SocialNetwork for FlickrConnector {
    /// Flickr posts are photos: the first attachment is uploaded
    #[instrument(skip(self, request), fields(provider = "flickr", api_call = "post"))]
    async fn post(&self, request: PostRequest) -> AppResult<PostResult> {
        request.validate()?;
        let media = request
            .media
            .first()
            .ok_or_else(|| AppError::missing_parameter("media"))?;
        self.upload(media, request.title.as_deref(), request.text())
            .await
    }

    #[instrument(skip(self, media), fields(provider = "flickr", api_call = "import_media"))]
    async fn import_media(&self, _entity: &str, media: MediaUpload) -> AppResult<PostResult> {
        self.upload(&media, None, None).await
    }

    #[instrument(skip(self), fields(provider = "flickr", api_call = "export_media"))]
    async fn export_media(&self, request: &ExportRequest) -> AppResult<CursorPage<ExportItem>> {
        let page = self
            .page(
                "flickr.people.getPhotos",
                vec![
                    ("user_id", user_param(&request.entity)),
                    ("extras", PHOTO_EXTRAS.to_owned()),
                ],
                request,
                "photos",
                "photo",
            )
            .await?;
        let next = page.next();
        let items = page
            .items
            .into_iter()
            .map(convert_photo)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, next))
    }

    /// Contacts of the authenticated user
    #[instrument(skip(self), fields(provider = "flickr", api_call = "export_subscriptions"))]
    async fn export_subscriptions(
        &self,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        let page = self
            .page("flickr.contacts.getList", Vec::new(), request, "contacts", "contact")
            .await?;
        let next = page.next();
        let items = page
            .items
            .into_iter()
            .map(convert_contact)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, next))
    }

    /// Photosets (albums)
    #[instrument(skip(self), fields(provider = "flickr", api_call = "export_collections"))]
    async fn export_collections(
        &self,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        let page = self
            .page(
                "flickr.photosets.getList",
                vec![("user_id", user_param(&request.entity))],
                request,
                "photosets",
                "photoset",
            )
            .await?;
        let next = page.next();
        let items = page
            .items
            .into_iter()
            .map(convert_photoset)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, next))
    }
}

fn convert_photo(raw: Value) -> AppResult<ExportItem> {
    let photo: Photo = api::from_value(PROVIDER, &raw)?;
    let url = photo
        .owner
        .as_ref()
        .map(|owner| format!("https://www.flickr.com/photos/{owner}/{}", photo.id));
    Ok(ExportItem {
        title: photo.title.filter(|t| !t.is_empty()),
        text: text(photo.description),
        url,
        media_url: photo.url_l,
        author: photo.ownername.or(photo.owner),
        created_at: number(photo.dateupload.as_ref())
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(from_unix),
        raw,
        ..ExportItem::new(photo.id, PROVIDER, ExportKind::Media)
    })
}

fn convert_photoset(raw: Value) -> AppResult<ExportItem> {
    let set: Photoset = api::from_value(PROVIDER, &raw)?;
    Ok(ExportItem {
        title: text(set.title),
        text: text(set.description),
        count: number(set.photos.as_ref()),
        created_at: number(set.date_create.as_ref())
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(from_unix),
        raw,
        ..ExportItem::new(set.id, PROVIDER, ExportKind::Collection)
    })
}

fn convert_contact(raw: Value) -> AppResult<ExportItem> {
    let contact: Contact = api::from_value(PROVIDER, &raw)?;
    Ok(ExportItem {
        url: Some(format!("https://www.flickr.com/people/{}/", contact.nsid)),
        title: contact
            .realname
            .filter(|n| !n.is_empty())
            .or_else(|| contact.username.clone()),
        author: contact.username,
        raw,
        ..ExportItem::new(contact.nsid, PROVIDER, ExportKind::User)
    })
}

// ============================================================================
// Connector Factory
// ============================================================================

/// Factory registered for `flickr` in the social family
#[must_use]
pub fn create_connector(config: ProviderConfig) -> Arc<dyn SocialNetwork> {
    Arc::new(FlickrConnector::with_config(config))
}
