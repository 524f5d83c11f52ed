// ABOUTME: Shared Facebook Graph API plumbing for the Facebook, Instagram and Marketing connectors
// ABOUTME: Cursor-paged list envelopes, bearer GET/POST helpers and created-object id extraction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::api::{self, id_string};
use crate::constants::limits::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::core::ProviderConfig;
use crate::errors::{AppError, AppResult};
use crate::http_client::shared_client;
use crate::models::ExportRequest;
use crate::pagination::vendor_token;
use crate::validation::clamp_page_size;

/// `{"data": [...], "paging": {...}}` list envelope
#[derive(Debug, Default, Deserialize)]
pub struct GraphList {
    /// Page elements, kept untyped so connectors retain the raw payload
    #[serde(default)]
    pub data: Vec<Value>,
    /// Cursors; absent on single-page results
    pub paging: Option<GraphPaging>,
    /// Totals requested with `summary=true`
    pub summary: Option<GraphSummary>,
}

impl GraphList {
    /// The `after` cursor, only while the API advertises a next page
    #[must_use]
    pub fn next_after(&self) -> Option<String> {
        let paging = self.paging.as_ref()?;
        paging.next.as_ref()?;
        paging.cursors.as_ref()?.after.clone()
    }
}

/// Paging block of a list envelope
#[derive(Debug, Default, Deserialize)]
pub struct GraphPaging {
    /// Before/after cursors
    pub cursors: Option<GraphCursors>,
    /// URL of the next page; the last page omits it
    pub next: Option<String>,
}

/// Cursor pair
#[derive(Debug, Default, Deserialize)]
pub struct GraphCursors {
    /// Cursor of the last element on this page
    pub after: Option<String>,
}

/// Summary block
#[derive(Debug, Default, Deserialize)]
pub struct GraphSummary {
    /// Total number of elements
    pub total_count: Option<u64>,
}

/// GET a Graph API path with a bearer token
///
/// # Errors
///
/// Transport, status and decoding errors from [`api::send_json`]
pub async fn get<T: DeserializeOwned>(
    provider: &str,
    config: &ProviderConfig,
    token: &str,
    path: &str,
    query: &[(&str, String)],
) -> AppResult<T> {
    let request = shared_client()
        .get(config.endpoint(path))
        .bearer_auth(token)
        .query(query);
    api::send_json(provider, request).await
}

/// POST form fields to a Graph API path with a bearer token
///
/// # Errors
///
/// Transport, status and decoding errors from [`api::send_json`]
pub async fn post_form<T: DeserializeOwned>(
    provider: &str,
    config: &ProviderConfig,
    token: &str,
    path: &str,
    form: &[(&str, String)],
) -> AppResult<T> {
    let request = shared_client()
        .post(config.endpoint(path))
        .bearer_auth(token)
        .form(form);
    api::send_json(provider, request).await
}

/// Fetch one page of an edge, honoring the request's page size and cursor
///
/// # Errors
///
/// As [`get`]
pub async fn list(
    provider: &str,
    config: &ProviderConfig,
    token: &str,
    path: &str,
    fields: &str,
    request: &ExportRequest,
) -> AppResult<GraphList> {
    let mut query = vec![
        ("fields", fields.to_owned()),
        (
            "limit",
            clamp_page_size(request.max_results, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE).to_string(),
        ),
    ];
    if let Some(after) = vendor_token(provider, request) {
        query.push(("after", after));
    }
    get(provider, config, token, path, &query).await
}

/// Id of an object created by a POST (`post_id` wins over `id` for photo posts)
///
/// # Errors
///
/// `ExternalServiceError` when the response names no id
pub fn created_id(provider: &str, response: &Value) -> AppResult<String> {
    ["post_id", "id"]
        .iter()
        .find_map(|key| response.get(*key).and_then(id_string))
        .ok_or_else(|| AppError::service(provider, "Graph API response contains no object id"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_next_after_requires_next_link() {
        let last: GraphList = serde_json::from_value(json!({
            "data": [],
            "paging": {"cursors": {"before": "a", "after": "b"}}
        }))
        .unwrap();
        assert_eq!(last.next_after(), None);

        let more: GraphList = serde_json::from_value(json!({
            "data": [{"id": "1"}],
            "paging": {"cursors": {"after": "b"}, "next": "https://graph.facebook.com/next"}
        }))
        .unwrap();
        assert_eq!(more.next_after().as_deref(), Some("b"));
    }

    #[test]
    fn test_created_id_prefers_post_id() {
        let response = json!({"id": "photo_1", "post_id": "page_1_post_2"});
        assert_eq!(created_id("facebook", &response).unwrap(), "page_1_post_2");
        assert!(created_id("facebook", &json!({})).is_err());
    }
}
