// ABOUTME: Request execution helpers shared by every connector
// ABOUTME: Sends requests, maps vendor status codes and error bodies to AppError, decodes JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

//! Vendor request execution.
//!
//! Connectors build a `reqwest::RequestBuilder` (URL, auth, body) and hand it
//! to one of the `send_*` helpers. The helpers own the uniform part: transport
//! errors, status mapping, vendor error message extraction, JSON decoding.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::{HeaderMap, CONTENT_TYPE, RETRY_AFTER};
use reqwest::multipart::Part;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use crate::errors::{AppError, AppResult, ProviderError};
use crate::http_client::shared_client;
use crate::models::MediaSource;

/// Seconds to wait after a 429 when the vendor gives no `Retry-After`
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Join a base URL and a path; absolute URLs are returned unchanged
#[must_use]
pub fn endpoint(base: &str, path: &str) -> String {
    if path.starts_with("https://") || path.starts_with("http://") {
        return path.to_owned();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Send a request and return the response if the status is a success
///
/// # Errors
///
/// `ExternalServiceUnavailable` for transport failures, a status-mapped
/// external error for non-2xx responses
pub async fn send(provider: &str, request: RequestBuilder) -> AppResult<Response> {
    let response = request
        .send()
        .await
        .map_err(|e| AppError::from(ProviderError::from(e)).with_provider(provider))?;

    let status = response.status();
    debug!("{provider} API response status: {status}");

    if !status.is_success() {
        let headers = response.headers().clone();
        let text = response.text().await.unwrap_or_default();
        return Err(handle_api_error(provider, status, &headers, &text));
    }

    Ok(response)
}

/// Send a request and decode the JSON body
///
/// # Errors
///
/// As [`send`], plus `SerializationError` when the body does not decode into `T`
pub async fn send_json<T: DeserializeOwned>(provider: &str, request: RequestBuilder) -> AppResult<T> {
    let (value, _) = send_json_with_headers(provider, request).await?;
    Ok(value)
}

/// Send a request and decode the JSON body, also returning the response headers
///
/// # Errors
///
/// As [`send_json`]
pub async fn send_json_with_headers<T: DeserializeOwned>(
    provider: &str,
    request: RequestBuilder,
) -> AppResult<(T, HeaderMap)> {
    let response = send(provider, request).await?;
    let headers = response.headers().clone();
    let text = read_text(provider, response).await?;
    Ok((decode(provider, &text)?, headers))
}

/// Send a request and return the raw body text
///
/// # Errors
///
/// As [`send`]
pub async fn send_text(provider: &str, request: RequestBuilder) -> AppResult<String> {
    let response = send(provider, request).await?;
    read_text(provider, response).await
}

async fn read_text(provider: &str, response: Response) -> AppResult<String> {
    response.text().await.map_err(|e| {
        AppError::service(provider, format!("Failed to read API response: {e}")).with_source(e)
    })
}

/// Decode a JSON body, keeping the provider on the error
///
/// # Errors
///
/// `SerializationError` when `text` is not valid JSON for `T`
pub fn decode<T: DeserializeOwned>(provider: &str, text: &str) -> AppResult<T> {
    serde_json::from_str(text).map_err(|e| {
        AppError::serialization(format!("Failed to parse {provider} API response: {e}"))
            .with_provider(provider)
            .with_source(e)
    })
}

/// Map a non-success vendor response to an `AppError`
#[must_use]
pub fn handle_api_error(
    provider: &str,
    status: StatusCode,
    headers: &HeaderMap,
    text: &str,
) -> AppError {
    error!(
        "{provider} API request failed - status: {status}, body_length: {} bytes",
        text.len()
    );

    let status_code = status.as_u16();
    let message = vendor_error_message(text)
        .unwrap_or_else(|| format!("{provider} API request failed with status {status}"));

    let err = match status_code {
        429 => ProviderError::RateLimitExceeded {
            provider: provider.to_owned(),
            retry_after_secs: retry_after(headers)
                .map_or(DEFAULT_RETRY_AFTER_SECS, |d| d.as_secs()),
            limit_type: message,
        },
        401 | 403 => ProviderError::AuthenticationFailed {
            provider: provider.to_owned(),
            reason: message,
        },
        _ => ProviderError::ApiError {
            provider: provider.to_owned(),
            status_code,
            message,
            retryable: status_code >= 500,
        },
    };
    err.into()
}

/// Parse `Retry-After` given in seconds
#[must_use]
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Pull the human-readable message out of the common vendor error shapes
///
/// Handles `{"error":{"message":..}}` (Graph API, Google), `{"error_description":..}`
/// (OAuth), `{"message":..}`, `{"errors":[{"message":..}]}` / `{"errors":{..}}`
/// (Shopify, X), `{"detail":..}` (X problem+json) and plain-text bodies.
#[must_use]
pub fn vendor_error_message(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
        return Some(trimmed.chars().take(500).collect());
    };

    let candidates = [
        value.pointer("/error/message"),
        value.pointer("/error/error_msg"),
        value.get("error_description"),
        value.get("message"),
        value.pointer("/errors/0/message"),
        value.pointer("/errors/0/detail"),
        value.get("errors"),
        value.get("detail"),
        value.pointer("/meta/msg"),
        value.get("error"),
    ];
    let message = candidates
        .into_iter()
        .flatten()
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Object(_) | Value::Array(_) => Some(v.to_string()),
            _ => None,
        });
    message
}

/// Decode one element of an already-parsed listing
///
/// # Errors
///
/// `SerializationError` when `value` does not have the shape of `T`
pub fn from_value<T: DeserializeOwned>(provider: &str, value: &Value) -> AppResult<T> {
    T::deserialize(value).map_err(|e| {
        AppError::serialization(format!("Failed to parse {provider} API response: {e}"))
            .with_provider(provider)
    })
}

/// Multipart file part for uploaded media bytes
///
/// # Errors
///
/// `InvalidParameter` when `content_type` is not a valid MIME type
pub fn file_part(file_name: &str, content_type: &str, data: Vec<u8>) -> AppResult<Part> {
    Part::bytes(data)
        .file_name(file_name.to_owned())
        .mime_str(content_type)
        .map_err(|e| AppError::invalid_parameter("media.content_type", e.to_string()))
}

/// Bytes of a media upload, downloading URL-sourced media first
///
/// Returns `(file_name, content_type, data)`.
///
/// # Errors
///
/// Transport and status errors while downloading, `EmptyParameter` for an
/// empty download
pub async fn media_bytes(provider: &str, source: &MediaSource) -> AppResult<(String, String, Vec<u8>)> {
    match source {
        MediaSource::Bytes {
            file_name,
            content_type,
            data,
        } => Ok((file_name.clone(), content_type.clone(), data.clone())),
        MediaSource::Url(url) => {
            let response = send(provider, shared_client().get(url)).await?;
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or(DEFAULT_CONTENT_TYPE)
                .to_owned();
            let file_name = url
                .split(['?', '#'])
                .next()
                .and_then(|path| path.rsplit('/').next())
                .filter(|name| !name.is_empty())
                .unwrap_or("upload")
                .to_owned();
            let data = response.bytes().await.map_err(|e| {
                AppError::service(provider, format!("Failed to download media: {e}")).with_source(e)
            })?;
            if data.is_empty() {
                return Err(AppError::empty_parameter("media"));
            }
            debug!("Downloaded {} byte(s) of media from {url}", data.len());
            Ok((file_name, content_type, data.to_vec()))
        }
    }
}

/// Read a JSON field that vendors send either as a string or a number
#[must_use]
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse the timestamp shapes vendors use: RFC 3339, `+0000` offsets, unix seconds
#[must_use]
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%a %b %d %H:%M:%S %z %Y") {
        return Some(dt.with_timezone(&Utc));
    }
    value.parse::<i64>().ok().and_then(from_unix)
}

/// Unix seconds to UTC
#[must_use]
pub fn from_unix(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_endpoint_joins_and_passes_absolute() {
        assert_eq!(
            endpoint("https://graph.facebook.com/v19.0/", "/me/feed"),
            "https://graph.facebook.com/v19.0/me/feed"
        );
        assert_eq!(
            endpoint("https://api.x.com/2", "https://upload.x.com/x"),
            "https://upload.x.com/x"
        );
    }

    #[test]
    fn test_vendor_error_message_shapes() {
        assert_eq!(
            vendor_error_message(r#"{"error":{"message":"Invalid OAuth access token.","code":190}}"#)
                .as_deref(),
            Some("Invalid OAuth access token.")
        );
        assert_eq!(
            vendor_error_message(r#"{"errors":"[API] Invalid API key or access token"}"#)
                .as_deref(),
            Some("[API] Invalid API key or access token")
        );
        assert_eq!(
            vendor_error_message(r#"{"error":"invalid_grant","error_description":"Bad code"}"#)
                .as_deref(),
            Some("Bad code")
        );
        assert_eq!(vendor_error_message("  "), None);
    }

    #[test]
    fn test_parse_datetime_shapes() {
        let expected = from_unix(1_704_110_400);
        assert_eq!(parse_datetime("2024-01-01T12:00:00+0000"), expected);
        assert_eq!(parse_datetime("2024-01-01T12:00:00Z"), expected);
        assert_eq!(parse_datetime("1704110400"), expected);
        assert_eq!(parse_datetime(""), None);
    }

    #[test]
    fn test_handle_api_error_maps_status() {
        let headers = HeaderMap::new();
        let err = handle_api_error("pinterest", StatusCode::UNAUTHORIZED, &headers, "{}");
        assert_eq!(err.code, ErrorCode::ExternalAuthFailed);
        let err = handle_api_error("pinterest", StatusCode::TOO_MANY_REQUESTS, &headers, "");
        assert_eq!(err.code, ErrorCode::ExternalRateLimited);
        let err = handle_api_error("pinterest", StatusCode::NOT_FOUND, &headers, "");
        assert_eq!(err.code, ErrorCode::ExternalResourceNotFound);
        assert_eq!(err.provider.as_deref(), Some("pinterest"));
    }
}
