// ABOUTME: Core connector traits and the per-connector credential state
// ABOUTME: Connector, SocialNetwork, Ecommerce and Marketing contracts plus ProviderConfig
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

//! # Connector Contracts
//!
//! Every vendor integration implements [`Connector`], which covers the shared
//! authorization lifecycle:
//!
//! 1. `set_api_keys` with the application's client id and secret
//! 2. `request_authorization` to obtain the vendor consent URL
//! 3. `authorize` with the callback parameters, or `set_access_token` with
//!    credentials obtained elsewhere
//! 4. `check_credentials` / `get_profile` to prove the token works
//!
//! On top of that each connector implements one family trait:
//! [`SocialNetwork`], [`Ecommerce`] or [`Marketing`]. Family operations a
//! vendor has no equivalent for keep the default body, which fails with
//! `UnsupportedFeature`.
//!
//! ## Credential scope
//!
//! A connector instance holds exactly one user's credentials in its
//! [`ConnectorState`]. Instances are created per session by the facades and are
//! never shared between users; the registry only hands out factories.
//!
//! ## Example: Adding a New Connector
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use socialgate_providers::core::{Connector, ConnectorState, ProviderConfig, SocialNetwork};
//! use socialgate_providers::errors::AppResult;
//! use socialgate_providers::models::Profile;
//!
//! pub struct MastodonConnector {
//!     config: ProviderConfig,
//!     state: ConnectorState,
//! }
//!
//! #[async_trait]
//! impl Connector for MastodonConnector {
//!     fn name(&self) -> &'static str {
//!         "mastodon"
//!     }
//!
//!     fn config(&self) -> &ProviderConfig {
//!         &self.config
//!     }
//!
//!     fn state(&self) -> &ConnectorState {
//!         &self.state
//!     }
//!
//!     async fn get_profile(&self, _entity: &str) -> AppResult<Profile> {
//!         let _token = self.state.access_token().await?;
//!         Ok(Profile::new("1", "mastodon"))
//!     }
//! }
//!
//! #[async_trait]
//! impl SocialNetwork for MastodonConnector {}
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::endpoint;
use crate::errors::{AppError, AppResult};
use crate::models::{
    ApiKeys, AudienceUploadResult, AuthorizationCallback, AuthorizationRequest, Campaign,
    Credentials, ExportItem, ExportRequest, ExportTarget, MediaUpload, PostRequest, PostResult,
    Product, Profile,
};
use crate::oauth1;
use crate::oauth2::{self, OAuthSettings};
use crate::pagination::CursorPage;
use crate::spi::AuthScheme;

/// Endpoint and scope configuration of one connector instance
///
/// Loaded by the registry from the provider descriptor, then overridden by
/// `SOCIALGATE_<PROVIDER>_*` environment variables.
///
/// # Example
///
/// ```rust
/// use socialgate_providers::core::ProviderConfig;
///
/// let config = ProviderConfig {
///     name: "reddit".to_owned(),
///     auth_url: "https://www.reddit.com/api/v1/authorize".to_owned(),
///     token_url: "https://www.reddit.com/api/v1/access_token".to_owned(),
///     api_base_url: "https://oauth.reddit.com".to_owned(),
///     revoke_url: Some("https://www.reddit.com/api/v1/revoke_token".to_owned()),
///     request_token_url: None,
///     upload_url: None,
///     default_scopes: vec!["identity".to_owned(), "submit".to_owned()],
///     api_version: None,
/// };
/// assert_eq!(config.endpoint("api/v1/me"), "https://oauth.reddit.com/api/v1/me");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider name (e.g. "facebook", "shopify")
    pub name: String,
    /// Authorization (consent) endpoint
    pub auth_url: String,
    /// Token endpoint (access-token endpoint for OAuth 1.0a)
    pub token_url: String,
    /// Base URL for API calls; Shopify URLs contain a `{shop}` placeholder
    pub api_base_url: String,
    /// Token revocation endpoint
    pub revoke_url: Option<String>,
    /// OAuth 1.0a request-token endpoint
    pub request_token_url: Option<String>,
    /// Separate media upload host
    pub upload_url: Option<String>,
    /// Scopes requested when the API keys name none
    pub default_scopes: Vec<String>,
    /// Vendor API version sent with requests
    pub api_version: Option<String>,
}

impl ProviderConfig {
    /// Absolute URL for an API path
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        endpoint(&self.api_base_url, path)
    }

    /// Absolute URL on the upload host, falling back to the API host
    #[must_use]
    pub fn upload_endpoint(&self, path: &str) -> String {
        endpoint(
            self.upload_url.as_deref().unwrap_or(&self.api_base_url),
            path,
        )
    }
}

/// API keys and user credentials held by one connector instance
#[derive(Debug)]
pub struct ConnectorState {
    provider: &'static str,
    api_keys: RwLock<Option<ApiKeys>>,
    credentials: RwLock<Option<Credentials>>,
}

impl ConnectorState {
    /// Empty state for `provider`
    #[must_use]
    pub const fn new(provider: &'static str) -> Self {
        Self {
            provider,
            api_keys: RwLock::const_new(None),
            credentials: RwLock::const_new(None),
        }
    }

    /// Validate and store the application keys
    ///
    /// # Errors
    ///
    /// Validation errors from [`ApiKeys::validate`]
    pub async fn set_api_keys(&self, keys: ApiKeys) -> AppResult<()> {
        keys.validate()?;
        debug!(provider = self.provider, client_id = %keys.client_id, "API keys set");
        *self.api_keys.write().await = Some(keys);
        Ok(())
    }

    /// The stored application keys
    ///
    /// # Errors
    ///
    /// `ApiKeysMissing` when `set_api_keys` has not been called
    pub async fn api_keys(&self) -> AppResult<ApiKeys> {
        self.api_keys
            .read()
            .await
            .clone() // Safe: ApiKeys ownership for the outgoing request
            .ok_or_else(|| AppError::api_keys_required(self.provider))
    }

    /// Store user credentials, replacing any previous ones
    pub async fn set_credentials(&self, credentials: Credentials) {
        *self.credentials.write().await = Some(credentials);
    }

    /// The stored user credentials
    ///
    /// # Errors
    ///
    /// `AuthRequired` when no credentials are set
    pub async fn credentials(&self) -> AppResult<Credentials> {
        self.credentials
            .read()
            .await
            .clone() // Safe: Credentials ownership for the outgoing request
            .ok_or_else(|| AppError::credentials_required(self.provider))
    }

    /// The stored access token
    ///
    /// # Errors
    ///
    /// `AuthRequired` when no credentials are set
    pub async fn access_token(&self) -> AppResult<String> {
        self.credentials
            .read()
            .await
            .as_ref()
            .map(|c| c.access_token.clone())
            .ok_or_else(|| AppError::credentials_required(self.provider))
    }

    /// Whether credentials are set and not expired
    pub async fn has_credentials(&self) -> bool {
        self.credentials
            .read()
            .await
            .as_ref()
            .is_some_and(|c| !c.access_token.is_empty() && !c.is_expired())
    }

    /// Drop the stored credentials, returning them
    pub async fn clear_credentials(&self) -> Option<Credentials> {
        self.credentials.write().await.take()
    }
}

/// Shared authorization lifecycle implemented by every connector
#[async_trait]
pub trait Connector: Send + Sync {
    /// Provider name (e.g. "facebook", "shopify")
    fn name(&self) -> &'static str;

    /// Endpoint configuration
    fn config(&self) -> &ProviderConfig;

    /// Keys and credentials of this instance
    fn state(&self) -> &ConnectorState;

    /// How this vendor authorizes users
    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::OAuth2
    }

    /// Vendor quirks of the OAuth handshake
    fn oauth_settings(&self) -> OAuthSettings {
        OAuthSettings::default()
    }

    /// Validate and store the application keys
    async fn set_api_keys(&self, keys: ApiKeys) -> AppResult<()> {
        self.state().set_api_keys(keys).await
    }

    /// Build the vendor consent URL
    ///
    /// `redirect_url` overrides the one stored with the API keys. OAuth 1.0a
    /// connectors call the vendor here to obtain a request token.
    async fn request_authorization(
        &self,
        redirect_url: Option<&str>,
    ) -> AppResult<AuthorizationRequest> {
        let settings = self.oauth_settings();
        match self.auth_scheme() {
            AuthScheme::OAuth1 => {
                oauth1::begin_authorization(self.state(), self.config(), &settings, redirect_url)
                    .await
            }
            AuthScheme::OAuth2 => {
                oauth2::begin_authorization(
                    self.state(),
                    self.config(),
                    &settings,
                    redirect_url,
                    false,
                )
                .await
            }
            AuthScheme::OAuth2Pkce => {
                oauth2::begin_authorization(
                    self.state(),
                    self.config(),
                    &settings,
                    redirect_url,
                    true,
                )
                .await
            }
        }
    }

    /// Exchange the callback parameters for credentials and store them
    async fn authorize(&self, callback: AuthorizationCallback) -> AppResult<Credentials> {
        callback.check_state()?;
        let settings = self.oauth_settings();
        let credentials = match self.auth_scheme() {
            AuthScheme::OAuth1 => {
                oauth1::complete_authorization(self.state(), self.config(), &callback).await?
            }
            AuthScheme::OAuth2 | AuthScheme::OAuth2Pkce => {
                oauth2::complete_authorization(self.state(), self.config(), &settings, &callback)
                    .await?
            }
        };
        info!(provider = self.name(), "Authorization completed");
        self.state().set_credentials(credentials.clone()).await;
        Ok(credentials)
    }

    /// Validate and store credentials obtained elsewhere
    async fn set_access_token(&self, credentials: Credentials) -> AppResult<()> {
        credentials.validate(self.auth_scheme().requires_secret())?;
        self.state().set_credentials(credentials).await;
        Ok(())
    }

    /// One authenticated vendor call proving the token works
    async fn check_credentials(&self) -> AppResult<Profile> {
        self.get_profile("me").await
    }

    /// Profile of `"me"` or of a vendor id/handle
    async fn get_profile(&self, entity: &str) -> AppResult<Profile>;

    /// Whether usable credentials are set
    async fn is_authenticated(&self) -> bool {
        self.state().has_credentials().await
    }

    /// Refresh the access token when it is about to expire
    async fn refresh_token_if_needed(&self) -> AppResult<()> {
        match self.auth_scheme() {
            AuthScheme::OAuth1 => Ok(()),
            AuthScheme::OAuth2 | AuthScheme::OAuth2Pkce => {
                oauth2::refresh_if_needed(self.state(), self.config(), &self.oauth_settings())
                    .await
            }
        }
    }

    /// Best-effort token revocation, then forget the credentials
    async fn disconnect(&self) -> AppResult<()> {
        if let (Some(revoke_url), AuthScheme::OAuth2 | AuthScheme::OAuth2Pkce) =
            (self.config().revoke_url.as_deref(), self.auth_scheme())
        {
            if let Ok(credentials) = self.state().credentials().await {
                oauth2::revoke_token(
                    self.state(),
                    self.name(),
                    revoke_url,
                    &self.oauth_settings(),
                    &credentials.access_token,
                )
                .await
                .inspect_err(|e| {
                    warn!("Failed to revoke {} token during disconnect: {e}", self.name());
                })
                .ok();
            }
        }
        self.state().clear_credentials().await;
        info!(provider = self.name(), "Disconnected");
        Ok(())
    }
}

fn unsupported<T>(provider: &str, feature: &str) -> AppResult<T> {
    Err(AppError::unsupported_feature(provider, feature))
}

/// Publishing and listing operations of social networks
#[async_trait]
pub trait SocialNetwork: Connector {
    /// Publish a post
    async fn post(&self, _request: PostRequest) -> AppResult<PostResult> {
        unsupported(self.name(), "post")
    }

    /// Upload a photo or video to `entity`
    async fn import_media(&self, _entity: &str, _media: MediaUpload) -> AppResult<PostResult> {
        unsupported(self.name(), "media upload")
    }

    /// Posts published by the entity
    async fn export_posts(&self, _request: &ExportRequest) -> AppResult<CursorPage<ExportItem>> {
        unsupported(self.name(), "post export")
    }

    /// Photos and videos of the entity
    async fn export_media(&self, _request: &ExportRequest) -> AppResult<CursorPage<ExportItem>> {
        unsupported(self.name(), "media export")
    }

    /// Accounts following the entity
    async fn export_followers(
        &self,
        _request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        unsupported(self.name(), "follower export")
    }

    /// Accounts or communities the entity follows
    async fn export_subscriptions(
        &self,
        _request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        unsupported(self.name(), "subscription export")
    }

    /// Albums, boards, playlists, pages, blogs or groups of the entity
    async fn export_collections(
        &self,
        _request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        unsupported(self.name(), "collection export")
    }

    /// Dispatch to the export selected by `target`
    async fn export(
        &self,
        target: ExportTarget,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        match target {
            ExportTarget::Posts => self.export_posts(request).await,
            ExportTarget::Media => self.export_media(request).await,
            ExportTarget::Followers => self.export_followers(request).await,
            ExportTarget::Subscriptions => self.export_subscriptions(request).await,
            ExportTarget::Collections => self.export_collections(request).await,
        }
    }
}

/// Catalog and order operations of e-commerce platforms
#[async_trait]
pub trait Ecommerce: Connector {
    /// Select the store subsequent calls address
    async fn set_store(&self, domain: &str) -> AppResult<()>;

    /// The selected store
    async fn store(&self) -> Option<String>;

    /// Products of the store
    async fn export_products(&self, request: &ExportRequest) -> AppResult<CursorPage<Product>>;

    /// One product
    async fn get_product(&self, id: &str) -> AppResult<Product>;

    /// Create a product
    async fn import_product(&self, product: Product) -> AppResult<Product>;

    /// Replace the fields of a product
    async fn update_product(&self, id: &str, product: Product) -> AppResult<Product>;

    /// Delete a product
    async fn delete_product(&self, id: &str) -> AppResult<()>;

    /// Collections of the store
    async fn export_collections(
        &self,
        _request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        unsupported(self.name(), "collection export")
    }

    /// Orders of the store
    async fn export_orders(&self, _request: &ExportRequest) -> AppResult<CursorPage<ExportItem>> {
        unsupported(self.name(), "order export")
    }
}

/// Advertising operations
#[async_trait]
pub trait Marketing: Connector {
    /// Ad accounts the user can manage
    async fn export_ad_accounts(
        &self,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>>;

    /// Campaigns of the ad account named in `request.entity`
    async fn export_campaigns(&self, request: &ExportRequest)
        -> AppResult<CursorPage<ExportItem>>;

    /// Create a campaign
    async fn create_campaign(&self, ad_account_id: &str, campaign: Campaign)
        -> AppResult<Campaign>;

    /// Custom audiences of the ad account named in `request.entity`
    async fn export_audiences(&self, request: &ExportRequest)
        -> AppResult<CursorPage<ExportItem>>;

    /// Create a custom audience
    async fn create_audience(
        &self,
        ad_account_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<ExportItem>;

    /// Hash and upload e-mail addresses into an audience
    async fn add_audience_users(
        &self,
        audience_id: &str,
        emails: &[String],
    ) -> AppResult<AudienceUploadResult>;
}
