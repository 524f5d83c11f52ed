// ABOUTME: Facebook Marketing API connector for ad accounts, campaigns and custom audiences
// ABOUTME: E-mail addresses are normalized and SHA-256 hashed before upload
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use crate::api::{self, parse_datetime};
use crate::core::{Connector, ConnectorState, Marketing, ProviderConfig};
use crate::errors::{AppError, AppResult};
use crate::graph::{self, GraphList};
use crate::models::{
    AudienceUploadResult, Campaign, ExportItem, ExportKind, ExportRequest, Profile,
};
use crate::oauth2::OAuthSettings;
use crate::pagination::{cursor_page, CursorPage};
use crate::validation::{require, require_list};

const PROVIDER: &str = "facebook";
const ACCOUNT_FIELDS: &str = "id,account_id,name,currency,account_status,created_time";
const CAMPAIGN_FIELDS: &str =
    "id,name,objective,status,daily_budget,special_ad_categories,created_time";
const AUDIENCE_FIELDS: &str =
    "id,name,description,subtype,approximate_count_lower_bound,time_created";
const EMAIL_SCHEMA: &str = "EMAIL_SHA256";
/// Entries accepted by one `/users` call
const MAX_USERS_PER_BATCH: usize = 10_000;

// ============================================================================
// API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct AdAccount {
    id: String,
    name: Option<String>,
    currency: Option<String>,
    created_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphCampaign {
    id: String,
    name: Option<String>,
    objective: Option<String>,
    status: Option<String>,
    daily_budget: Option<Value>,
    created_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CustomAudience {
    id: String,
    name: Option<String>,
    description: Option<String>,
    subtype: Option<String>,
    approximate_count_lower_bound: Option<i64>,
    time_created: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct UsersResponse {
    session_id: Option<Value>,
    #[serde(default)]
    num_received: u64,
    #[serde(default)]
    num_invalid_entries: u64,
}

/// Normalize and hash an e-mail address the way custom audiences expect
///
/// The address is trimmed and lowercased, then SHA-256 hashed to lowercase hex.
#[must_use]
pub fn hash_email(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    hex::encode(Sha256::digest(normalized.as_bytes()))
}

/// `act_`-prefixed ad account id
fn ad_account(id: &str) -> AppResult<String> {
    let id = require("ad_account_id", Some(id))?.trim();
    if id.eq_ignore_ascii_case("me") {
        return Err(AppError::missing_parameter("ad_account_id"));
    }
    Ok(if id.starts_with("act_") {
        id.to_owned()
    } else {
        format!("act_{id}")
    })
}

/// Facebook Marketing API connector
pub struct FacebookMarketingConnector {
    config: ProviderConfig,
    state: ConnectorState,
}

impl FacebookMarketingConnector {
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

    async fn post(&self, path: &str, form: &[(&str, String)]) -> AppResult<Value> {
        let token = self.state.access_token().await?;
        graph::post_form(PROVIDER, &self.config, &token, path, form).await
    }
}

#[async_trait]
impl Connector for FacebookMarketingConnector {
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
        let entity = match entity.trim() {
            "" => "me",
            other => other,
        };
        let token = self.state.access_token().await?;
        let raw: Value = graph::get(
            PROVIDER,
            &self.config,
            &token,
            entity,
            &[("fields", "id,name".to_owned())],
        )
        .await?;
        let id = raw
            .get("id")
            .and_then(api::id_string)
            .ok_or_else(|| AppError::service(PROVIDER, "Profile response contains no id"))?;
        Ok(Profile {
            name: raw.get("name").and_then(Value::as_str).map(str::to_owned),
            raw,
            ..Profile::new(id, PROVIDER)
        })
    }
}

#[async_trait]
impl Marketing for FacebookMarketingConnector {
    #[instrument(skip(self), fields(provider = "facebook", api_call = "export_ad_accounts"))]
    async fn export_ad_accounts(
        &self,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        let page = self.list("me/adaccounts", ACCOUNT_FIELDS, request).await?;
        let next = page.next_after();
        let items = page
            .data
            .into_iter()
            .map(convert_ad_account)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, next))
    }

    #[instrument(skip(self), fields(provider = "facebook", api_call = "export_campaigns"))]
    async fn export_campaigns(
        &self,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        let account = ad_account(&request.entity)?;
        let page = self
            .list(&format!("{account}/campaigns"), CAMPAIGN_FIELDS, request)
            .await?;
        let next = page.next_after();
        let items = page
            .data
            .into_iter()
            .map(convert_campaign)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, next))
    }

    #[instrument(skip(self, campaign), fields(provider = "facebook", api_call = "create_campaign"))]
    async fn create_campaign(&self, ad_account_id: &str, campaign: Campaign) -> AppResult<Campaign> {
        campaign.validate()?;
        let account = ad_account(ad_account_id)?;
        let categories = json!(campaign.special_ad_categories);
        let mut form = vec![
            ("name", campaign.name.clone()),
            ("objective", campaign.objective.clone()),
            ("status", campaign.status.clone()),
            ("special_ad_categories", categories.to_string()),
        ];
        if let Some(budget) = campaign.daily_budget {
            form.push(("daily_budget", budget.to_string()));
        }

        let raw = self.post(&format!("{account}/campaigns"), &form).await?;
        let id = graph::created_id(PROVIDER, &raw)?;
        info!("Created campaign {id} in {account}");
        Ok(Campaign {
            id: Some(id),
            raw,
            ..campaign
        })
    }

    #[instrument(skip(self), fields(provider = "facebook", api_call = "export_audiences"))]
    async fn export_audiences(
        &self,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        let account = ad_account(&request.entity)?;
        let page = self
            .list(&format!("{account}/customaudiences"), AUDIENCE_FIELDS, request)
            .await?;
        let next = page.next_after();
        let items = page
            .data
            .into_iter()
            .map(convert_audience)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, next))
    }

    #[instrument(skip(self, description), fields(provider = "facebook", api_call = "create_audience"))]
    async fn create_audience(
        &self,
        ad_account_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<ExportItem> {
        let account = ad_account(ad_account_id)?;
        let name = require("name", Some(name))?;
        let mut form = vec![
            ("name", name.to_owned()),
            ("subtype", "CUSTOM".to_owned()),
            ("customer_file_source", "USER_PROVIDED_ONLY".to_owned()),
        ];
        if let Some(description) = description {
            form.push(("description", description.to_owned()));
        }

        let raw = self
            .post(&format!("{account}/customaudiences"), &form)
            .await?;
        let id = graph::created_id(PROVIDER, &raw)?;
        info!("Created custom audience {id} in {account}");
        Ok(ExportItem {
            title: Some(name.to_owned()),
            text: description.map(str::to_owned),
            raw,
            ..ExportItem::new(id, PROVIDER, ExportKind::Audience)
        })
    }

    #[instrument(skip(self, emails), fields(provider = "facebook", api_call = "add_audience_users", count = emails.len()))]
    async fn add_audience_users(
        &self,
        audience_id: &str,
        emails: &[String],
    ) -> AppResult<AudienceUploadResult> {
        let audience_id = require("audience_id", Some(audience_id))?.trim();
        require_list("emails", emails)?;
        let hashes: Vec<String> = emails
            .iter()
            .filter(|e| !e.trim().is_empty())
            .map(|e| hash_email(e))
            .collect();
        require_list("emails", &hashes)?;

        let mut result = AudienceUploadResult {
            audience_id: audience_id.to_owned(),
            ..AudienceUploadResult::default()
        };
        for batch in hashes.chunks(MAX_USERS_PER_BATCH) {
            let payload = json!({
                "schema": EMAIL_SCHEMA,
                "data": batch.iter().map(|hash| [hash]).collect::<Vec<_>>(),
            });
            debug!("Uploading {} hashed e-mails to {audience_id}", batch.len());
            let raw = self
                .post(
                    &format!("{audience_id}/users"),
                    &[("payload", payload.to_string())],
                )
                .await?;
            let response: UsersResponse = api::from_value(PROVIDER, &raw)?;
            result.num_received += response.num_received;
            result.num_invalid_entries += response.num_invalid_entries;
            if let Some(session) = response.session_id.as_ref().and_then(api::id_string) {
                result.session_id = Some(session);
            }
        }
        info!(
            "Audience {audience_id} received {} entries ({} invalid)",
            result.num_received, result.num_invalid_entries
        );
        Ok(result)
    }
}

fn convert_ad_account(raw: Value) -> AppResult<ExportItem> {
    let account: AdAccount = api::from_value(PROVIDER, &raw)?;
    Ok(ExportItem {
        title: account.name,
        text: account.currency,
        created_at: account.created_time.as_deref().and_then(parse_datetime),
        raw,
        ..ExportItem::new(account.id, PROVIDER, ExportKind::AdAccount)
    })
}

fn convert_campaign(raw: Value) -> AppResult<ExportItem> {
    let campaign: GraphCampaign = api::from_value(PROVIDER, &raw)?;
    let summary = [campaign.objective, campaign.status]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" / ");
    Ok(ExportItem {
        title: campaign.name,
        text: (!summary.is_empty()).then_some(summary),
        count: campaign
            .daily_budget
            .as_ref()
            .and_then(api::id_string)
            .and_then(|b| b.parse().ok()),
        created_at: campaign.created_time.as_deref().and_then(parse_datetime),
        raw,
        ..ExportItem::new(campaign.id, PROVIDER, ExportKind::Campaign)
    })
}

fn convert_audience(raw: Value) -> AppResult<ExportItem> {
    let audience: CustomAudience = api::from_value(PROVIDER, &raw)?;
    Ok(ExportItem {
        title: audience.name,
        text: audience.description.or(audience.subtype),
        count: audience
            .approximate_count_lower_bound
            .and_then(|n| u64::try_from(n).ok()),
        created_at: audience.time_created.and_then(api::from_unix),
        raw,
        ..ExportItem::new(audience.id, PROVIDER, ExportKind::Audience)
    })
}

// ============================================================================
// Connector Factory
// ============================================================================

/// Factory registered for `facebook` in the marketing family
#[must_use]
pub fn create_connector(config: ProviderConfig) -> Arc<dyn Marketing> {
    Arc::new(FacebookMarketingConnector::with_config(config))
}
