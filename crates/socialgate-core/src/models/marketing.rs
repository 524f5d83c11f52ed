// ABOUTME: Marketing DTOs for advertising campaigns and custom audience uploads
// ABOUTME: Ad accounts, campaigns and hashed custom audience upload results
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppResult;
use crate::validation::require;

/// An advertising campaign, both as create input and as listing output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    /// Vendor id; `None` before creation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Campaign name
    pub name: String,
    /// Objective, e.g. `OUTCOME_TRAFFIC`
    pub objective: String,
    /// `PAUSED` or `ACTIVE`
    pub status: String,
    /// Declared special ad categories; empty means `NONE`
    #[serde(default)]
    pub special_ad_categories: Vec<String>,
    /// Daily budget in the account's minor currency unit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_budget: Option<u64>,
    /// Untouched vendor payload
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub raw: Value,
}

impl Campaign {
    /// Paused campaign with a name and objective
    #[must_use]
    pub fn new(name: impl Into<String>, objective: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objective: objective.into(),
            status: "PAUSED".to_owned(),
            ..Self::default()
        }
    }

    /// Require a name and an objective
    ///
    /// # Errors
    ///
    /// `MissingRequiredField`/`EmptyParameter` for a blank name or objective
    pub fn validate(&self) -> AppResult<()> {
        require("name", Some(self.name.as_str()))?;
        require("objective", Some(self.objective.as_str()))?;
        Ok(())
    }
}

/// Vendor acknowledgement of a hashed audience upload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudienceUploadResult {
    /// Audience the users were added to
    pub audience_id: String,
    /// Upload session id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Entries the vendor received
    pub num_received: u64,
    /// Entries the vendor rejected
    pub num_invalid_entries: u64,
}
