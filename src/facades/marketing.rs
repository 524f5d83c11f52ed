// ABOUTME: Marketing facade dispatching by provider name to advertising connectors
// ABOUTME: Ad accounts, campaigns and custom audiences with hashed customer uploads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use socialgate_providers::{
    collect_pages, global_registry, Connector, ConnectorFamily, Marketing, ProviderCapabilities,
    ProviderConfig, ProviderRegistry,
};
use tracing::{debug, info, instrument};

use super::{auth_lifecycle, Sessions};
use crate::errors::{AppError, AppResult};
use crate::models::{
    ApiKeys, AudienceUploadResult, AuthorizationCallback, AuthorizationRequest, Campaign,
    Credentials, ExportItem, ExportRequest, Profile,
};
use crate::pagination::CursorPage;

/// Listable advertising objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum MarketingExport {
    /// Ad accounts of the user
    AdAccounts,
    /// Campaigns of an ad account
    Campaigns,
    /// Custom audiences of an ad account
    Audiences,
}

impl MarketingExport {
    /// Stable name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AdAccounts => "ad_accounts",
            Self::Campaigns => "campaigns",
            Self::Audiences => "audiences",
        }
    }
}

impl fmt::Display for MarketingExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketingExport {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "ad_accounts" | "adaccounts" | "accounts" => Ok(Self::AdAccounts),
            "campaigns" => Ok(Self::Campaigns),
            "audiences" | "custom_audiences" => Ok(Self::Audiences),
            other => Err(AppError::invalid_parameter(
                "export",
                format!("unknown marketing export '{other}'"),
            )),
        }
    }
}

async fn export_page(
    connector: &dyn Marketing,
    export: MarketingExport,
    request: &ExportRequest,
) -> AppResult<CursorPage<ExportItem>> {
    match export {
        MarketingExport::AdAccounts => connector.export_ad_accounts(request).await,
        MarketingExport::Campaigns => connector.export_campaigns(request).await,
        MarketingExport::Audiences => connector.export_audiences(request).await,
    }
}

/// Advertising facade
pub struct MarketingFacade {
    registry: Arc<ProviderRegistry>,
    sessions: Sessions<dyn Marketing>,
}

impl Default for MarketingFacade {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketingFacade {
    const FAMILY: ConnectorFamily = ConnectorFamily::Marketing;

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
    /// `UnknownProvider` when no marketing connector has that name
    pub async fn connector(&self, provider: &str) -> AppResult<Arc<dyn Marketing>> {
        self.sessions
            .get_or_create(provider, |name| self.registry.create_marketing(name))
            .await
    }

    /// Replace the session connector of `provider` with one using `config`
    ///
    /// # Errors
    ///
    /// `UnknownProvider` when no marketing connector has that name
    pub async fn configure(
        &self,
        provider: &str,
        config: ProviderConfig,
    ) -> AppResult<Arc<dyn Marketing>> {
        let connector = self
            .registry
            .create_marketing_with_config(provider, config)?;
        self.sessions.insert(provider, Arc::clone(&connector)).await;
        debug!("Configured {provider} with custom endpoints");
        Ok(connector)
    }

    auth_lifecycle!();

    /// One page of ad accounts, campaigns or audiences
    ///
    /// Campaigns and audiences list the ad account in `request.entity`.
    ///
    /// # Errors
    ///
    /// `UnsupportedFeature`, `MissingRequiredField` without an ad account,
    /// or the vendor error
    #[instrument(skip_all, fields(provider = %provider, export = %export))]
    pub async fn export(
        &self,
        provider: &str,
        export: MarketingExport,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        self.require_ads(provider)?;
        let connector = self.connector(provider).await?;
        export_page(connector.as_ref(), export, request).await
    }

    /// Every page of an export, `limit` capping the total
    ///
    /// # Errors
    ///
    /// The first failing page
    #[instrument(skip_all, fields(provider = %provider, export = %export))]
    pub async fn export_all(
        &self,
        provider: &str,
        export: MarketingExport,
        request: ExportRequest,
        limit: Option<usize>,
    ) -> AppResult<Vec<ExportItem>> {
        self.require_ads(provider)?;
        let connector = self.connector(provider).await?;
        let start = request.cursor.clone();

        collect_pages(limit, |cursor| {
            let connector = Arc::clone(&connector);
            let page_request = request
                .clone()
                .with_cursor(cursor.or_else(|| start.clone()));
            async move { export_page(connector.as_ref(), export, &page_request).await }
        })
        .await
    }

    /// One page of ad accounts
    ///
    /// # Errors
    ///
    /// See [`Self::export`]
    pub async fn export_ad_accounts(
        &self,
        provider: &str,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        self.export(provider, MarketingExport::AdAccounts, request)
            .await
    }

    /// One page of campaigns of the ad account in `request.entity`
    ///
    /// # Errors
    ///
    /// See [`Self::export`]
    pub async fn export_campaigns(
        &self,
        provider: &str,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        self.export(provider, MarketingExport::Campaigns, request)
            .await
    }

    /// One page of custom audiences of the ad account in `request.entity`
    ///
    /// # Errors
    ///
    /// See [`Self::export`]
    pub async fn export_audiences(
        &self,
        provider: &str,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        self.export(provider, MarketingExport::Audiences, request)
            .await
    }

    /// Create a campaign in an ad account
    ///
    /// # Errors
    ///
    /// Validation errors for a campaign without name or objective, or the
    /// vendor error
    #[instrument(skip_all, fields(provider = %provider, ad_account = %ad_account_id))]
    pub async fn create_campaign(
        &self,
        provider: &str,
        ad_account_id: &str,
        campaign: Campaign,
    ) -> AppResult<Campaign> {
        self.require_ads(provider)?;
        campaign.validate()?;
        self.connector(provider)
            .await?
            .create_campaign(ad_account_id, campaign)
            .await
    }

    /// Create a custom audience in an ad account
    ///
    /// # Errors
    ///
    /// `MissingRequiredField` for a blank name, or the vendor error
    #[instrument(skip_all, fields(provider = %provider, ad_account = %ad_account_id))]
    pub async fn create_audience(
        &self,
        provider: &str,
        ad_account_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<ExportItem> {
        self.require_ads(provider)?;
        self.connector(provider)
            .await?
            .create_audience(ad_account_id, name, description)
            .await
    }

    /// Hash and upload e-mail addresses into an audience
    ///
    /// # Errors
    ///
    /// `MissingRequiredField` for an empty list, or the vendor error
    #[instrument(skip_all, fields(provider = %provider, audience = %audience_id, count = emails.len()))]
    pub async fn add_audience_users(
        &self,
        provider: &str,
        audience_id: &str,
        emails: &[String],
    ) -> AppResult<AudienceUploadResult> {
        self.require_ads(provider)?;
        if emails.is_empty() {
            return Err(AppError::missing_parameter("emails"));
        }
        let result = self
            .connector(provider)
            .await?
            .add_audience_users(audience_id, emails)
            .await?;
        info!("Uploaded {} audience member(s)", result.num_received);
        Ok(result)
    }

    fn require_ads(&self, provider: &str) -> AppResult<()> {
        if self.capabilities(provider)?.contains(ProviderCapabilities::ADS) {
            Ok(())
        } else {
            Err(AppError::unsupported_feature(provider, "advertising"))
        }
    }
}
