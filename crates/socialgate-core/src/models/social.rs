// ABOUTME: Social network DTOs: profiles, exported items, post and media upload requests
// ABOUTME: ExportTarget selects which listing a generic export call dispatches to
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{AppError, AppResult};
use crate::validation::{require_non_empty, validate_url};

/// A user, page, channel or shop profile
///
/// # Examples
///
/// ```rust
/// use socialgate_core::models::{Dto, Profile};
///
/// let profile = Profile::new("12345", "facebook");
/// assert_eq!(profile.to_value()["provider"], "facebook");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Vendor identifier
    pub id: String,
    /// Source provider
    pub provider: String,
    /// Handle or login name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Given name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// E-mail, when the granted scopes expose it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Avatar image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Public profile page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
    /// Followers/subscribers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followers_count: Option<u64>,
    /// Accounts followed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub following_count: Option<u64>,
    /// Posts, videos or photos published
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posts_count: Option<u64>,
    /// Account creation time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Untouched vendor payload
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub raw: Value,
}

impl Profile {
    /// Empty profile with id and provider set
    #[must_use]
    pub fn new(id: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            provider: provider.into(),
            ..Self::default()
        }
    }
}

/// What an exported item represents
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    /// Status update, tweet, pin, submission, wall post
    Post,
    /// Photo or video
    Media,
    /// Follower, friend or followed account
    User,
    /// Album, board, playlist, page, blog, subreddit, group, collection
    Collection,
    /// Shop order
    Order,
    /// Advertising account
    AdAccount,
    /// Advertising campaign
    Campaign,
    /// Custom audience
    Audience,
}

/// One element of an export listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportItem {
    /// Vendor identifier
    pub id: String,
    /// Source provider
    pub provider: String,
    /// What the item is
    pub kind: ExportKind,
    /// Title or name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Body text or description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Permalink
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Image or video URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    /// Author handle or id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Publication time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Item-specific count (pins on a board, videos in a playlist, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    /// Untouched vendor payload
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub raw: Value,
}

impl ExportItem {
    /// Item with only identity fields set
    #[must_use]
    pub fn new(id: impl Into<String>, provider: impl Into<String>, kind: ExportKind) -> Self {
        Self {
            id: id.into(),
            provider: provider.into(),
            kind,
            title: None,
            text: None,
            url: None,
            media_url: None,
            author: None,
            created_at: None,
            count: None,
            raw: Value::Null,
        }
    }
}

/// Parameters of an export listing call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    /// Whose items: `"me"` or a vendor id/handle (board, blog, ad account, ...)
    pub entity: String,
    /// Page size hint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    /// Opaque cursor from a previous page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl Default for ExportRequest {
    fn default() -> Self {
        Self {
            entity: "me".to_owned(),
            max_results: None,
            cursor: None,
        }
    }
}

impl ExportRequest {
    /// Request for the given entity
    #[must_use]
    pub fn for_entity(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            ..Self::default()
        }
    }

    /// Set the page size hint
    #[must_use]
    pub const fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Continue from `cursor`
    #[must_use]
    pub fn with_cursor(mut self, cursor: Option<String>) -> Self {
        self.cursor = cursor;
        self
    }

    /// True when the entity designates the authenticated user
    #[must_use]
    pub fn is_me(&self) -> bool {
        let entity = self.entity.trim();
        entity.is_empty() || entity.eq_ignore_ascii_case("me")
    }
}

/// Which listing a generic export call refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportTarget {
    /// Posts published by the entity
    Posts,
    /// Photos and videos
    Media,
    /// Accounts following the entity
    Followers,
    /// Accounts or communities the entity follows
    Subscriptions,
    /// Albums, boards, playlists, pages, blogs, groups
    Collections,
}

impl ExportTarget {
    /// All targets, in display order
    pub const ALL: [Self; 5] = [
        Self::Posts,
        Self::Media,
        Self::Followers,
        Self::Subscriptions,
        Self::Collections,
    ];

    /// Lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Media => "media",
            Self::Followers => "followers",
            Self::Subscriptions => "subscriptions",
            Self::Collections => "collections",
        }
    }
}

impl fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportTarget {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "posts" | "post" | "feed" => Ok(Self::Posts),
            "media" | "photos" | "videos" => Ok(Self::Media),
            "followers" | "friends" => Ok(Self::Followers),
            "subscriptions" | "following" => Ok(Self::Subscriptions),
            "collections" | "albums" | "boards" | "playlists" => Ok(Self::Collections),
            other => Err(AppError::invalid_parameter(
                "target",
                format!("unknown export target '{other}'"),
            )),
        }
    }
}

/// Where uploaded media comes from
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaSource {
    /// Publicly reachable URL the vendor fetches itself
    Url(String),
    /// Bytes sent in the request body
    Bytes {
        /// File name sent with multipart uploads
        file_name: String,
        /// MIME type
        content_type: String,
        /// File content
        data: Vec<u8>,
    },
}

impl fmt::Debug for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.debug_tuple("Url").field(url).finish(),
            Self::Bytes {
                file_name,
                content_type,
                data,
            } => f
                .debug_struct("Bytes")
                .field("file_name", file_name)
                .field("content_type", content_type)
                .field("len", &data.len())
                .finish(),
        }
    }
}

/// A photo or video to publish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaUpload {
    /// Content
    pub source: MediaSource,
    /// Title (video title, pin title, photo title)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Caption or description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl MediaUpload {
    /// Media fetched by the vendor from `url`
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            source: MediaSource::Url(url.into()),
            title: None,
            caption: None,
        }
    }

    /// Media uploaded from memory
    #[must_use]
    pub fn from_bytes(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            source: MediaSource::Bytes {
                file_name: file_name.into(),
                content_type: content_type.into(),
                data,
            },
            title: None,
            caption: None,
        }
    }

    /// Set the caption
    #[must_use]
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Set the title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// URL of URL-sourced media
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match &self.source {
            MediaSource::Url(url) => Some(url),
            MediaSource::Bytes { .. } => None,
        }
    }

    /// Reject malformed URLs and empty payloads
    ///
    /// # Errors
    ///
    /// `MalformedUrl` for a bad source URL, `EmptyParameter` for empty bytes or file name
    pub fn validate(&self) -> AppResult<()> {
        match &self.source {
            MediaSource::Url(url) => {
                validate_url("media.url", url)?;
            }
            MediaSource::Bytes {
                file_name, data, ..
            } => {
                require_non_empty("media.file_name", file_name)?;
                if data.is_empty() {
                    return Err(AppError::empty_parameter("media.data"));
                }
            }
        }
        Ok(())
    }
}

/// Content to publish
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRequest {
    /// Target: `"me"`, a page, board, blog, subreddit or group
    pub entity: String,
    /// Text body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Title, required by link aggregators
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Link to share
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Media attachments
    #[serde(default)]
    pub media: Vec<MediaUpload>,
}

impl PostRequest {
    /// Text post on the user's own timeline
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            entity: "me".to_owned(),
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Set the target entity
    #[must_use]
    pub fn on_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = entity.into();
        self
    }

    /// Set the title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the link
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Attach media
    #[must_use]
    pub fn with_media(mut self, media: MediaUpload) -> Self {
        self.media.push(media);
        self
    }

    /// True when the entity designates the authenticated user
    #[must_use]
    pub fn is_me(&self) -> bool {
        let entity = self.entity.trim();
        entity.is_empty() || entity.eq_ignore_ascii_case("me")
    }

    /// Non-blank message text
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }

    /// Require some content and check link and media
    ///
    /// # Errors
    ///
    /// `MissingRequiredField` when there is nothing to publish, `MalformedUrl`
    /// for a bad link or media URL, `EmptyParameter` for empty media bytes
    pub fn validate(&self) -> AppResult<()> {
        let has_link = self.link.as_deref().is_some_and(|l| !l.trim().is_empty());
        if self.text().is_none() && !has_link && self.media.is_empty() {
            return Err(AppError::missing_parameter("message"));
        }
        if let Some(link) = &self.link {
            validate_url("link", link)?;
        }
        for media in &self.media {
            media.validate()?;
        }
        Ok(())
    }
}

/// Outcome of a publish call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostResult {
    /// Vendor id of the created object
    pub id: String,
    /// Provider
    pub provider: String,
    /// Permalink, when the vendor returns or implies one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Untouched vendor payload
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub raw: Value,
}

impl PostResult {
    /// Result with id and provider
    #[must_use]
    pub fn new(id: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            provider: provider.into(),
            url: None,
            raw: Value::Null,
        }
    }

    /// Set the permalink
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Attach the vendor payload
    #[must_use]
    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = raw;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorCode, ErrorKind};

    #[test]
    fn test_export_target_parsing() {
        assert_eq!("Boards".parse::<ExportTarget>().unwrap(), ExportTarget::Collections);
        assert_eq!("following".parse::<ExportTarget>().unwrap(), ExportTarget::Subscriptions);
        assert!("likes".parse::<ExportTarget>().is_err());
    }

    #[test]
    fn test_post_request_requires_content() {
        let err = PostRequest::default().validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);

        let err = PostRequest::message("hi")
            .with_link("not a url")
            .validate()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedUrl);
    }

    #[test]
    fn test_media_validation() {
        let empty = MediaUpload::from_bytes("a.jpg", "image/jpeg", Vec::new());
        assert_eq!(empty.validate().unwrap_err().code, ErrorCode::EmptyParameter);
        assert!(MediaUpload::from_url("https://cdn.example.com/a.jpg").validate().is_ok());
    }
}
