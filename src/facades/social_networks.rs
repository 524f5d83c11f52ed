// ABOUTME: SocialNetworks facade dispatching by provider name to social connectors
// ABOUTME: Capability-checked posting, media upload and paginated exports per facade session
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use std::sync::Arc;

use socialgate_providers::{
    collect_pages, global_registry, Connector, ConnectorFamily, ProviderCapabilities,
    ProviderConfig, ProviderRegistry, SocialNetwork,
};
use tracing::{debug, instrument};

use super::{auth_lifecycle, Sessions};
use crate::errors::{AppError, AppResult};
use crate::models::{
    ApiKeys, AuthorizationCallback, AuthorizationRequest, Credentials, ExportItem, ExportRequest,
    ExportTarget, MediaUpload, PostRequest, PostResult, Profile,
};
use crate::pagination::CursorPage;

/// Social network facade
///
/// Picks the connector by provider name (`"facebook"`, `"youtube"`, `"x"`,
/// ...) and forwards the call. Connectors, and the keys and tokens they hold,
/// belong to this instance.
pub struct SocialNetworks {
    registry: Arc<ProviderRegistry>,
    sessions: Sessions<dyn SocialNetwork>,
}

impl Default for SocialNetworks {
    fn default() -> Self {
        Self::new()
    }
}

impl SocialNetworks {
    const FAMILY: ConnectorFamily = ConnectorFamily::Social;

    /// Facade over the process-wide registry
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(global_registry())
    }

    /// Facade over a specific registry
    #[must_use]
    pub fn with_registry(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            sessions: Sessions::default(),
        }
    }

    /// Session connector of `provider`, created on first use
    ///
    /// # Errors
    ///
    /// `UnknownProvider` when no social connector has that name
    pub async fn connector(&self, provider: &str) -> AppResult<Arc<dyn SocialNetwork>> {
        self.sessions
            .get_or_create(provider, |name| self.registry.create_social(name))
            .await
    }

    /// Replace the session connector of `provider` with one using `config`
    ///
    /// Keys and credentials of the previous connector are dropped.
    ///
    /// # Errors
    ///
    /// `UnknownProvider` when no social connector has that name
    pub async fn configure(
        &self,
        provider: &str,
        config: ProviderConfig,
    ) -> AppResult<Arc<dyn SocialNetwork>> {
        let connector = self.registry.create_social_with_config(provider, config)?;
        self.sessions.insert(provider, Arc::clone(&connector)).await;
        debug!("Configured {provider} with custom endpoints");
        Ok(connector)
    }

    auth_lifecycle!();

    /// Publish a post
    ///
    /// # Errors
    ///
    /// `UnsupportedFeature` when the provider cannot post, validation errors
    /// for an empty request, or the vendor error
    #[instrument(skip_all, fields(provider = %provider))]
    pub async fn post(&self, provider: &str, request: PostRequest) -> AppResult<PostResult> {
        self.require(provider, ProviderCapabilities::POST, "post")?;
        request.validate()?;
        self.connector(provider).await?.post(request).await
    }

    /// Upload a photo or video to `entity` (`"me"` for the user)
    ///
    /// # Errors
    ///
    /// `UnsupportedFeature` when the provider takes no uploads, validation
    /// errors for empty media, or the vendor error
    #[instrument(skip_all, fields(provider = %provider))]
    pub async fn import_media(
        &self,
        provider: &str,
        entity: &str,
        media: MediaUpload,
    ) -> AppResult<PostResult> {
        self.require(provider, ProviderCapabilities::MEDIA_UPLOAD, "media upload")?;
        media.validate()?;
        self.connector(provider)
            .await?
            .import_media(entity, media)
            .await
    }

    /// One page of an export
    ///
    /// # Errors
    ///
    /// `UnsupportedFeature` when the provider lacks the export, or the vendor error
    #[instrument(skip_all, fields(provider = %provider, target = %target))]
    pub async fn export(
        &self,
        provider: &str,
        target: ExportTarget,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        self.require(
            provider,
            ProviderCapabilities::for_target(target),
            target.as_str(),
        )?;
        self.connector(provider).await?.export(target, request).await
    }

    /// One page of posts
    ///
    /// # Errors
    ///
    /// See [`Self::export`]
    pub async fn export_posts(
        &self,
        provider: &str,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        self.export(provider, ExportTarget::Posts, request).await
    }

    /// One page of photos and videos
    ///
    /// # Errors
    ///
    /// See [`Self::export`]
    pub async fn export_media(
        &self,
        provider: &str,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        self.export(provider, ExportTarget::Media, request).await
    }

    /// One page of followers
    ///
    /// # Errors
    ///
    /// See [`Self::export`]
    pub async fn export_followers(
        &self,
        provider: &str,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        self.export(provider, ExportTarget::Followers, request).await
    }

    /// One page of followed accounts or communities
    ///
    /// # Errors
    ///
    /// See [`Self::export`]
    pub async fn export_subscriptions(
        &self,
        provider: &str,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        self.export(provider, ExportTarget::Subscriptions, request)
            .await
    }

    /// One page of albums, boards, playlists, pages, blogs or groups
    ///
    /// # Errors
    ///
    /// See [`Self::export`]
    pub async fn export_collections(
        &self,
        provider: &str,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        self.export(provider, ExportTarget::Collections, request)
            .await
    }

    /// Every page of an export, starting at `request.cursor`
    ///
    /// `request.max_results` is the page size; `limit` caps the total.
    ///
    /// # Errors
    ///
    /// The first failing page
    #[instrument(skip_all, fields(provider = %provider, target = %target))]
    pub async fn export_all(
        &self,
        provider: &str,
        target: ExportTarget,
        request: ExportRequest,
        limit: Option<usize>,
    ) -> AppResult<Vec<ExportItem>> {
        self.require(
            provider,
            ProviderCapabilities::for_target(target),
            target.as_str(),
        )?;
        let connector = self.connector(provider).await?;
        let start = request.cursor.clone();

        collect_pages(limit, |cursor| {
            let connector = Arc::clone(&connector);
            let page_request = request
                .clone()
                .with_cursor(cursor.or_else(|| start.clone()));
            async move { connector.export(target, &page_request).await }
        })
        .await
    }

    fn require(
        &self,
        provider: &str,
        needed: ProviderCapabilities,
        feature: &str,
    ) -> AppResult<()> {
        if self.capabilities(provider)?.contains(needed) {
            Ok(())
        } else {
            Err(AppError::unsupported_feature(provider, feature))
        }
    }
}
