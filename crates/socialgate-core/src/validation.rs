// ABOUTME: Input validation shared by connectors and facades
// ABOUTME: Required/empty/numeric field checks, URL classification, Shopify domain normalization
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

//! Input validation helpers.
//!
//! Missing fields fail with [`ErrorCode::MissingRequiredField`], present but
//! blank fields with [`ErrorCode::EmptyParameter`], and URLs that are not
//! absolute `http`/`https` URLs with [`ErrorCode::MalformedUrl`].
//!
//! [`ErrorCode::MissingRequiredField`]: crate::errors::ErrorCode::MissingRequiredField
//! [`ErrorCode::EmptyParameter`]: crate::errors::ErrorCode::EmptyParameter
//! [`ErrorCode::MalformedUrl`]: crate::errors::ErrorCode::MalformedUrl

use url::Url;

use crate::constants::limits::SHOPIFY_DOMAIN_SUFFIX;
use crate::errors::{AppError, AppResult};

/// Require an optional string field to be present and non-blank
///
/// # Errors
///
/// `MissingRequiredField` when `value` is `None`, `EmptyParameter` when it is blank
pub fn require<'a>(field: &str, value: Option<&'a str>) -> AppResult<&'a str> {
    value.map_or_else(
        || Err(AppError::missing_parameter(field)),
        |v| require_non_empty(field, v),
    )
}

/// Require a string field to be non-blank
///
/// # Errors
///
/// `EmptyParameter` when the trimmed value is empty
pub fn require_non_empty<'a>(field: &str, value: &'a str) -> AppResult<&'a str> {
    if value.trim().is_empty() {
        return Err(AppError::empty_parameter(field));
    }
    Ok(value)
}

/// Require a string field to consist of ASCII digits only
///
/// # Errors
///
/// `EmptyParameter` when blank, `NotNumeric` when any character is not a digit
pub fn require_numeric<'a>(field: &str, value: &'a str) -> AppResult<&'a str> {
    let value = require_non_empty(field, value)?;
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::not_numeric(field, value));
    }
    Ok(value)
}

/// Require a list to have at least one element
///
/// # Errors
///
/// `EmptyParameter` when the slice is empty
pub fn require_list<'a, T>(field: &str, values: &'a [T]) -> AppResult<&'a [T]> {
    if values.is_empty() {
        return Err(AppError::empty_parameter(field));
    }
    Ok(values)
}

/// Parse and validate an absolute `http`/`https` URL
///
/// # Errors
///
/// `EmptyParameter` when blank, `MalformedUrl` when unparsable, not http(s) or hostless
pub fn validate_url(field: &str, value: &str) -> AppResult<Url> {
    let value = require_non_empty(field, value)?;
    let parsed = Url::parse(value.trim()).map_err(|e| {
        AppError::malformed_url(field, value).with_source(e)
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::malformed_url(field, value));
    }
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed),
        _ => Err(AppError::malformed_url(field, value)),
    }
}

/// Pure classifier: is `value` a well-formed absolute http(s) URL
#[must_use]
pub fn is_valid_url(value: &str) -> bool {
    validate_url("url", value).is_ok()
}

/// Normalize a Shopify store reference to its `name.myshopify.com` host
///
/// Accepts a bare store name, the `myshopify.com` host, or a full https URL
/// pointing at it.
///
/// # Errors
///
/// `EmptyParameter` when blank, `MalformedUrl` for anything that is not a store
pub fn validate_shop_domain(value: &str) -> AppResult<String> {
    let trimmed = require_non_empty("shop", value)?.trim().to_lowercase();

    let host = if trimmed.contains("://") {
        let url = validate_url("shop", &trimmed)?;
        url.host_str().unwrap_or_default().to_owned()
    } else {
        trimmed.trim_end_matches('/').to_owned()
    };

    let name = host.strip_suffix(SHOPIFY_DOMAIN_SUFFIX).unwrap_or(&host);
    let valid_name = !name.is_empty()
        && !name.starts_with('-')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !valid_name {
        return Err(AppError::malformed_url("shop", value));
    }
    Ok(format!("{name}{SHOPIFY_DOMAIN_SUFFIX}"))
}

/// Clamp a requested page size into `1..=max`, falling back to `default`
#[must_use]
pub fn clamp_page_size(requested: Option<u32>, default: u32, max: u32) -> u32 {
    requested.unwrap_or(default).clamp(1, max.max(1))
}
