// ABOUTME: Service Provider Interface (SPI) describing connectors for registration
// ABOUTME: Families, auth schemes, capability flags, descriptors, factories and bundles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

//! # Provider Service Provider Interface (SPI)
//!
//! A connector is registered as a [`ProviderBundle`]: a [`ProviderDescriptor`]
//! with static metadata (endpoints, scopes, capabilities) and a
//! [`ConnectorFactory`] that builds fresh connector instances from a
//! [`ProviderConfig`]. Factories never hold credentials.
//!
//! ## Example: Describing a Custom Connector
//!
//! ```rust,no_run
//! use socialgate_providers::spi::{
//!     AuthScheme, ConnectorFamily, OAuthEndpoints, ProviderCapabilities, ProviderDescriptor,
//! };
//!
//! pub struct MastodonDescriptor;
//!
//! impl ProviderDescriptor for MastodonDescriptor {
//!     fn name(&self) -> &'static str {
//!         "mastodon"
//!     }
//!
//!     fn display_name(&self) -> &'static str {
//!         "Mastodon"
//!     }
//!
//!     fn family(&self) -> ConnectorFamily {
//!         ConnectorFamily::Social
//!     }
//!
//!     fn auth_scheme(&self) -> AuthScheme {
//!         AuthScheme::OAuth2
//!     }
//!
//!     fn capabilities(&self) -> ProviderCapabilities {
//!         ProviderCapabilities::POST | ProviderCapabilities::POSTS
//!     }
//!
//!     fn endpoints(&self) -> OAuthEndpoints {
//!         OAuthEndpoints::oauth2(
//!             "https://mastodon.social/oauth/authorize",
//!             "https://mastodon.social/oauth/token",
//!         )
//!     }
//!
//!     fn api_base_url(&self) -> &'static str {
//!         "https://mastodon.social/api/v1"
//!     }
//!
//!     fn default_scopes(&self) -> &'static [&'static str] {
//!         &["read", "write"]
//!     }
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{Ecommerce, Marketing, ProviderConfig, SocialNetwork};
use crate::models::ExportTarget;

/// Which facade a connector belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorFamily {
    /// Social networks
    Social,
    /// E-commerce platforms
    Ecommerce,
    /// Advertising platforms
    Marketing,
}

impl ConnectorFamily {
    /// All families
    pub const ALL: [Self; 3] = [Self::Social, Self::Ecommerce, Self::Marketing];

    /// Lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Social => "social",
            Self::Ecommerce => "ecommerce",
            Self::Marketing => "marketing",
        }
    }
}

impl fmt::Display for ConnectorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a vendor authorizes users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthScheme {
    /// OAuth 2.0 authorization code
    OAuth2,
    /// OAuth 2.0 authorization code with PKCE
    OAuth2Pkce,
    /// OAuth 1.0a three-legged flow
    OAuth1,
}

impl AuthScheme {
    /// Whether credentials need a token secret
    #[must_use]
    pub const fn requires_secret(self) -> bool {
        matches!(self, Self::OAuth1)
    }

    /// Display name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OAuth2 => "OAuth 2.0",
            Self::OAuth2Pkce => "OAuth 2.0 + PKCE",
            Self::OAuth1 => "OAuth 1.0a",
        }
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authorization endpoints of a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OAuthEndpoints {
    /// Consent endpoint
    pub auth_url: &'static str,
    /// Token endpoint (access-token endpoint for OAuth 1.0a)
    pub token_url: &'static str,
    /// Optional token revocation endpoint
    pub revoke_url: Option<&'static str>,
    /// OAuth 1.0a request-token endpoint
    pub request_token_url: Option<&'static str>,
}

impl OAuthEndpoints {
    /// OAuth 2.0 endpoints without revocation
    #[must_use]
    pub const fn oauth2(auth_url: &'static str, token_url: &'static str) -> Self {
        Self {
            auth_url,
            token_url,
            revoke_url: None,
            request_token_url: None,
        }
    }

    /// Add a revocation endpoint
    #[must_use]
    pub const fn with_revoke(mut self, revoke_url: &'static str) -> Self {
        self.revoke_url = Some(revoke_url);
        self
    }

    /// OAuth 1.0a endpoints
    #[must_use]
    pub const fn oauth1(
        request_token_url: &'static str,
        auth_url: &'static str,
        access_token_url: &'static str,
    ) -> Self {
        Self {
            auth_url,
            token_url: access_token_url,
            revoke_url: None,
            request_token_url: Some(request_token_url),
        }
    }
}

bitflags::bitflags! {
    /// Operations a connector implements beyond the authorization contract
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ProviderCapabilities: u16 {
        /// Publish posts
        const POST = 1;
        /// Upload photos or videos
        const MEDIA_UPLOAD = 1 << 1;
        /// Export posts
        const POSTS = 1 << 2;
        /// Export photos and videos
        const MEDIA = 1 << 3;
        /// Export followers
        const FOLLOWERS = 1 << 4;
        /// Export followed accounts or communities
        const SUBSCRIPTIONS = 1 << 5;
        /// Export albums, boards, playlists, pages, blogs, groups
        const COLLECTIONS = 1 << 6;
        /// Product catalog
        const PRODUCTS = 1 << 7;
        /// Order export
        const ORDERS = 1 << 8;
        /// Advertising accounts, campaigns and audiences
        const ADS = 1 << 9;
    }
}

impl ProviderCapabilities {
    /// Publishing capabilities
    #[must_use]
    pub const fn publishing() -> Self {
        Self::POST.union(Self::MEDIA_UPLOAD)
    }

    /// Every social export
    #[must_use]
    pub const fn all_exports() -> Self {
        Self::POSTS
            .union(Self::MEDIA)
            .union(Self::FOLLOWERS)
            .union(Self::SUBSCRIPTIONS)
            .union(Self::COLLECTIONS)
    }

    /// Shop capabilities
    #[must_use]
    pub const fn shop() -> Self {
        Self::PRODUCTS.union(Self::ORDERS).union(Self::COLLECTIONS)
    }

    /// Flag matching an export target
    #[must_use]
    pub const fn for_target(target: ExportTarget) -> Self {
        match target {
            ExportTarget::Posts => Self::POSTS,
            ExportTarget::Media => Self::MEDIA,
            ExportTarget::Followers => Self::FOLLOWERS,
            ExportTarget::Subscriptions => Self::SUBSCRIPTIONS,
            ExportTarget::Collections => Self::COLLECTIONS,
        }
    }

    /// Check if an export target is supported
    #[must_use]
    pub const fn supports(&self, target: ExportTarget) -> bool {
        self.contains(Self::for_target(target))
    }

    /// Check if publishing is supported
    #[must_use]
    pub const fn can_post(&self) -> bool {
        self.contains(Self::POST)
    }

    /// Check if media upload is supported
    #[must_use]
    pub const fn can_upload_media(&self) -> bool {
        self.contains(Self::MEDIA_UPLOAD)
    }

    /// Lowercase names of the set flags
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.iter_names()
            .map(|(name, _)| name.to_lowercase())
            .collect()
    }
}

/// Describes a provider's identity, endpoints and capabilities
pub trait ProviderDescriptor: Send + Sync {
    /// Unique lowercase provider identifier (e.g., "facebook", "shopify")
    ///
    /// Unique per family; the Facebook social and marketing connectors share
    /// the name "facebook".
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Facade the connector belongs to
    fn family(&self) -> ConnectorFamily;

    /// How users authorize
    fn auth_scheme(&self) -> AuthScheme;

    /// Supported operations
    fn capabilities(&self) -> ProviderCapabilities;

    /// Authorization endpoints
    fn endpoints(&self) -> OAuthEndpoints;

    /// Base URL for API calls
    fn api_base_url(&self) -> &'static str;

    /// Default scopes to request
    fn default_scopes(&self) -> &'static [&'static str];

    /// Separate host for media uploads
    fn upload_url(&self) -> Option<&'static str> {
        None
    }

    /// Vendor API version
    fn api_version(&self) -> Option<&'static str> {
        None
    }

    /// Build a `ProviderConfig` from this descriptor
    fn to_config(&self) -> ProviderConfig {
        let endpoints = self.endpoints();
        ProviderConfig {
            name: self.name().to_owned(),
            auth_url: endpoints.auth_url.to_owned(),
            token_url: endpoints.token_url.to_owned(),
            api_base_url: self.api_base_url().to_owned(),
            revoke_url: endpoints.revoke_url.map(str::to_owned),
            request_token_url: endpoints.request_token_url.map(str::to_owned),
            upload_url: self.upload_url().map(str::to_owned),
            default_scopes: self
                .default_scopes()
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            api_version: self.api_version().map(str::to_owned),
        }
    }
}

/// Builds a fresh connector of one family
#[derive(Debug, Clone, Copy)]
pub enum ConnectorFactory {
    /// Social network connector
    Social(fn(ProviderConfig) -> Arc<dyn SocialNetwork>),
    /// E-commerce connector
    Ecommerce(fn(ProviderConfig) -> Arc<dyn Ecommerce>),
    /// Marketing connector
    Marketing(fn(ProviderConfig) -> Arc<dyn Marketing>),
}

impl ConnectorFactory {
    /// Family of the connectors this factory builds
    #[must_use]
    pub const fn family(&self) -> ConnectorFamily {
        match self {
            Self::Social(_) => ConnectorFamily::Social,
            Self::Ecommerce(_) => ConnectorFamily::Ecommerce,
            Self::Marketing(_) => ConnectorFamily::Marketing,
        }
    }
}

/// Complete connector package for registration
pub struct ProviderBundle {
    /// Provider descriptor with metadata and capabilities
    pub descriptor: Box<dyn ProviderDescriptor>,
    /// Factory for connector instances
    pub factory: ConnectorFactory,
}

impl ProviderBundle {
    /// Create a new provider bundle
    #[must_use]
    pub fn new(descriptor: Box<dyn ProviderDescriptor>, factory: ConnectorFactory) -> Self {
        Self {
            descriptor,
            factory,
        }
    }

    /// Get the provider name from the descriptor
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.descriptor.name()
    }
}

impl fmt::Debug for ProviderBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderBundle")
            .field("name", &self.descriptor.name())
            .field("family", &self.descriptor.family())
            .field("capabilities", &self.descriptor.capabilities())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Built-in Provider Descriptors (conditionally compiled)
// ============================================================================

#[cfg(any(feature = "provider-facebook", feature = "provider-facebook-marketing"))]
const GRAPH_AUTH_URL: &str = "https://www.facebook.com/v19.0/dialog/oauth";
#[cfg(any(feature = "provider-facebook", feature = "provider-facebook-marketing"))]
const GRAPH_TOKEN_URL: &str = "https://graph.facebook.com/v19.0/oauth/access_token";
#[cfg(any(feature = "provider-facebook", feature = "provider-facebook-marketing"))]
const GRAPH_API_URL: &str = "https://graph.facebook.com/v19.0";

/// Facebook Graph API descriptor
#[cfg(feature = "provider-facebook")]
pub struct FacebookDescriptor;

#[cfg(feature = "provider-facebook")]
impl ProviderDescriptor for FacebookDescriptor {
    fn name(&self) -> &'static str {
        "facebook"
    }

    fn display_name(&self) -> &'static str {
        "Facebook"
    }

    fn family(&self) -> ConnectorFamily {
        ConnectorFamily::Social
    }

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::OAuth2
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::publishing()
            .union(ProviderCapabilities::POSTS)
            .union(ProviderCapabilities::MEDIA)
            .union(ProviderCapabilities::FOLLOWERS)
            .union(ProviderCapabilities::COLLECTIONS)
    }

    fn endpoints(&self) -> OAuthEndpoints {
        OAuthEndpoints::oauth2(GRAPH_AUTH_URL, GRAPH_TOKEN_URL)
    }

    fn api_base_url(&self) -> &'static str {
        GRAPH_API_URL
    }

    fn default_scopes(&self) -> &'static [&'static str] {
        &[
            "public_profile",
            "email",
            "user_posts",
            "user_photos",
            "user_friends",
            "pages_show_list",
            "pages_manage_posts",
        ]
    }

    fn api_version(&self) -> Option<&'static str> {
        Some("v19.0")
    }
}

/// Google (YouTube Data API) descriptor
#[cfg(feature = "provider-google")]
pub struct GoogleDescriptor;

#[cfg(feature = "provider-google")]
impl ProviderDescriptor for GoogleDescriptor {
    fn name(&self) -> &'static str {
        "google"
    }

    fn display_name(&self) -> &'static str {
        "Google (YouTube)"
    }

    fn family(&self) -> ConnectorFamily {
        ConnectorFamily::Social
    }

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::OAuth2
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::MEDIA_UPLOAD
            .union(ProviderCapabilities::POSTS)
            .union(ProviderCapabilities::FOLLOWERS)
            .union(ProviderCapabilities::SUBSCRIPTIONS)
            .union(ProviderCapabilities::COLLECTIONS)
    }

    fn endpoints(&self) -> OAuthEndpoints {
        OAuthEndpoints::oauth2(
            "https://accounts.google.com/o/oauth2/v2/auth",
            "https://oauth2.googleapis.com/token",
        )
        .with_revoke("https://oauth2.googleapis.com/revoke")
    }

    fn api_base_url(&self) -> &'static str {
        "https://www.googleapis.com/youtube/v3"
    }

    fn default_scopes(&self) -> &'static [&'static str] {
        &[
            "openid",
            "email",
            "profile",
            "https://www.googleapis.com/auth/youtube",
            "https://www.googleapis.com/auth/youtube.upload",
        ]
    }

    fn upload_url(&self) -> Option<&'static str> {
        Some("https://www.googleapis.com/upload/youtube/v3")
    }
}

/// Instagram Graph API descriptor
#[cfg(feature = "provider-instagram")]
pub struct InstagramDescriptor;

#[cfg(feature = "provider-instagram")]
impl ProviderDescriptor for InstagramDescriptor {
    fn name(&self) -> &'static str {
        "instagram"
    }

    fn display_name(&self) -> &'static str {
        "Instagram"
    }

    fn family(&self) -> ConnectorFamily {
        ConnectorFamily::Social
    }

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::OAuth2
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::publishing().union(ProviderCapabilities::MEDIA)
    }

    fn endpoints(&self) -> OAuthEndpoints {
        OAuthEndpoints::oauth2(
            "https://www.instagram.com/oauth/authorize",
            "https://api.instagram.com/oauth/access_token",
        )
    }

    fn api_base_url(&self) -> &'static str {
        "https://graph.instagram.com"
    }

    fn default_scopes(&self) -> &'static [&'static str] {
        &["instagram_business_basic", "instagram_business_content_publish"]
    }
}

/// Pinterest API v5 descriptor
#[cfg(feature = "provider-pinterest")]
pub struct PinterestDescriptor;

#[cfg(feature = "provider-pinterest")]
impl ProviderDescriptor for PinterestDescriptor {
    fn name(&self) -> &'static str {
        "pinterest"
    }

    fn display_name(&self) -> &'static str {
        "Pinterest"
    }

    fn family(&self) -> ConnectorFamily {
        ConnectorFamily::Social
    }

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::OAuth2
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::publishing()
            .union(ProviderCapabilities::POSTS)
            .union(ProviderCapabilities::FOLLOWERS)
            .union(ProviderCapabilities::COLLECTIONS)
    }

    fn endpoints(&self) -> OAuthEndpoints {
        OAuthEndpoints::oauth2(
            "https://www.pinterest.com/oauth/",
            "https://api.pinterest.com/v5/oauth/token",
        )
    }

    fn api_base_url(&self) -> &'static str {
        "https://api.pinterest.com/v5"
    }

    fn default_scopes(&self) -> &'static [&'static str] {
        &[
            "user_accounts:read",
            "boards:read",
            "boards:write",
            "pins:read",
            "pins:write",
        ]
    }
}

/// X (Twitter) API v2 descriptor
#[cfg(feature = "provider-twitter")]
pub struct TwitterDescriptor;

#[cfg(feature = "provider-twitter")]
impl ProviderDescriptor for TwitterDescriptor {
    fn name(&self) -> &'static str {
        "twitter"
    }

    fn display_name(&self) -> &'static str {
        "X (Twitter)"
    }

    fn family(&self) -> ConnectorFamily {
        ConnectorFamily::Social
    }

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::OAuth2Pkce
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::publishing()
            .union(ProviderCapabilities::POSTS)
            .union(ProviderCapabilities::FOLLOWERS)
            .union(ProviderCapabilities::SUBSCRIPTIONS)
    }

    fn endpoints(&self) -> OAuthEndpoints {
        OAuthEndpoints::oauth2(
            "https://twitter.com/i/oauth2/authorize",
            "https://api.twitter.com/2/oauth2/token",
        )
        .with_revoke("https://api.twitter.com/2/oauth2/revoke")
    }

    fn api_base_url(&self) -> &'static str {
        "https://api.twitter.com/2"
    }

    fn default_scopes(&self) -> &'static [&'static str] {
        &[
            "tweet.read",
            "tweet.write",
            "users.read",
            "follows.read",
            "media.write",
            "offline.access",
        ]
    }

    fn upload_url(&self) -> Option<&'static str> {
        Some("https://api.twitter.com/2/media")
    }
}

/// Tumblr API v2 descriptor
#[cfg(feature = "provider-tumblr")]
pub struct TumblrDescriptor;

#[cfg(feature = "provider-tumblr")]
impl ProviderDescriptor for TumblrDescriptor {
    fn name(&self) -> &'static str {
        "tumblr"
    }

    fn display_name(&self) -> &'static str {
        "Tumblr"
    }

    fn family(&self) -> ConnectorFamily {
        ConnectorFamily::Social
    }

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::OAuth1
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::publishing()
            .union(ProviderCapabilities::POSTS)
            .union(ProviderCapabilities::FOLLOWERS)
            .union(ProviderCapabilities::SUBSCRIPTIONS)
            .union(ProviderCapabilities::COLLECTIONS)
    }

    fn endpoints(&self) -> OAuthEndpoints {
        OAuthEndpoints::oauth1(
            "https://www.tumblr.com/oauth/request_token",
            "https://www.tumblr.com/oauth/authorize",
            "https://www.tumblr.com/oauth/access_token",
        )
    }

    fn api_base_url(&self) -> &'static str {
        "https://api.tumblr.com/v2"
    }

    fn default_scopes(&self) -> &'static [&'static str] {
        &[]
    }
}

/// Flickr REST API descriptor
#[cfg(feature = "provider-flickr")]
pub struct FlickrDescriptor;

#[cfg(feature = "provider-flickr")]
impl ProviderDescriptor for FlickrDescriptor {
    fn name(&self) -> &'static str {
        "flickr"
    }

    fn display_name(&self) -> &'static str {
        "Flickr"
    }

    fn family(&self) -> ConnectorFamily {
        ConnectorFamily::Social
    }

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::OAuth1
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::publishing()
            .union(ProviderCapabilities::MEDIA)
            .union(ProviderCapabilities::SUBSCRIPTIONS)
            .union(ProviderCapabilities::COLLECTIONS)
    }

    fn endpoints(&self) -> OAuthEndpoints {
        OAuthEndpoints::oauth1(
            "https://www.flickr.com/services/oauth/request_token",
            "https://www.flickr.com/services/oauth/authorize",
            "https://www.flickr.com/services/oauth/access_token",
        )
    }

    fn api_base_url(&self) -> &'static str {
        "https://api.flickr.com/services/rest"
    }

    fn default_scopes(&self) -> &'static [&'static str] {
        &[]
    }

    fn upload_url(&self) -> Option<&'static str> {
        Some("https://up.flickr.com/services/upload/")
    }
}

/// Reddit OAuth API descriptor
#[cfg(feature = "provider-reddit")]
pub struct RedditDescriptor;

#[cfg(feature = "provider-reddit")]
impl ProviderDescriptor for RedditDescriptor {
    fn name(&self) -> &'static str {
        "reddit"
    }

    fn display_name(&self) -> &'static str {
        "Reddit"
    }

    fn family(&self) -> ConnectorFamily {
        ConnectorFamily::Social
    }

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::OAuth2
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::POST
            .union(ProviderCapabilities::POSTS)
            .union(ProviderCapabilities::SUBSCRIPTIONS)
    }

    fn endpoints(&self) -> OAuthEndpoints {
        OAuthEndpoints::oauth2(
            "https://www.reddit.com/api/v1/authorize",
            "https://www.reddit.com/api/v1/access_token",
        )
        .with_revoke("https://www.reddit.com/api/v1/revoke_token")
    }

    fn api_base_url(&self) -> &'static str {
        "https://oauth.reddit.com"
    }

    fn default_scopes(&self) -> &'static [&'static str] {
        &["identity", "read", "submit", "mysubreddits", "history"]
    }
}

/// `VKontakte` API descriptor
#[cfg(feature = "provider-vkontakte")]
pub struct VkontakteDescriptor;

#[cfg(feature = "provider-vkontakte")]
impl ProviderDescriptor for VkontakteDescriptor {
    fn name(&self) -> &'static str {
        "vkontakte"
    }

    fn display_name(&self) -> &'static str {
        "VKontakte"
    }

    fn family(&self) -> ConnectorFamily {
        ConnectorFamily::Social
    }

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::OAuth2
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::publishing()
            .union(ProviderCapabilities::POSTS)
            .union(ProviderCapabilities::FOLLOWERS)
            .union(ProviderCapabilities::SUBSCRIPTIONS)
            .union(ProviderCapabilities::COLLECTIONS)
    }

    fn endpoints(&self) -> OAuthEndpoints {
        OAuthEndpoints::oauth2(
            "https://oauth.vk.com/authorize",
            "https://oauth.vk.com/access_token",
        )
    }

    fn api_base_url(&self) -> &'static str {
        "https://api.vk.com/method"
    }

    fn default_scopes(&self) -> &'static [&'static str] {
        &["wall", "photos", "friends", "groups", "offline"]
    }

    fn api_version(&self) -> Option<&'static str> {
        Some("5.199")
    }
}

/// Shopify Admin REST API descriptor
///
/// Endpoints contain a `{shop}` placeholder replaced by the selected store.
#[cfg(feature = "provider-shopify")]
pub struct ShopifyDescriptor;

#[cfg(feature = "provider-shopify")]
impl ProviderDescriptor for ShopifyDescriptor {
    fn name(&self) -> &'static str {
        "shopify"
    }

    fn display_name(&self) -> &'static str {
        "Shopify"
    }

    fn family(&self) -> ConnectorFamily {
        ConnectorFamily::Ecommerce
    }

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::OAuth2
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::shop()
    }

    fn endpoints(&self) -> OAuthEndpoints {
        OAuthEndpoints::oauth2(
            "https://{shop}/admin/oauth/authorize",
            "https://{shop}/admin/oauth/access_token",
        )
    }

    fn api_base_url(&self) -> &'static str {
        "https://{shop}/admin/api/2024-01"
    }

    fn default_scopes(&self) -> &'static [&'static str] {
        &["read_products", "write_products", "read_orders"]
    }

    fn api_version(&self) -> Option<&'static str> {
        Some("2024-01")
    }
}

/// Facebook Marketing API descriptor
#[cfg(feature = "provider-facebook-marketing")]
pub struct FacebookMarketingDescriptor;

#[cfg(feature = "provider-facebook-marketing")]
impl ProviderDescriptor for FacebookMarketingDescriptor {
    fn name(&self) -> &'static str {
        "facebook"
    }

    fn display_name(&self) -> &'static str {
        "Facebook Marketing"
    }

    fn family(&self) -> ConnectorFamily {
        ConnectorFamily::Marketing
    }

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::OAuth2
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::ADS
    }

    fn endpoints(&self) -> OAuthEndpoints {
        OAuthEndpoints::oauth2(GRAPH_AUTH_URL, GRAPH_TOKEN_URL)
    }

    fn api_base_url(&self) -> &'static str {
        GRAPH_API_URL
    }

    fn default_scopes(&self) -> &'static [&'static str] {
        &["ads_management", "ads_read"]
    }

    fn api_version(&self) -> Option<&'static str> {
        Some("v19.0")
    }
}
