// ABOUTME: Structured error type for vendor API failures with retry information
// ABOUTME: ProviderError variants convert into AppError while keeping the vendor message
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use thiserror::Error;

use super::{AppError, ErrorCode};

/// Vendor-level failure raised while talking to a provider API
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The vendor answered with an error status or error body
    #[error("{provider} API error ({status_code}): {message}")]
    ApiError {
        /// Provider name
        provider: String,
        /// HTTP status, or 200 for errors reported inside a success body
        status_code: u16,
        /// Vendor message, verbatim
        message: String,
        /// Whether repeating the call could succeed
        retryable: bool,
    },

    /// The vendor rejected our token
    #[error("{provider} authentication failed: {reason}")]
    AuthenticationFailed {
        /// Provider name
        provider: String,
        /// Reason reported by the vendor
        reason: String,
    },

    /// The vendor throttled the request
    #[error("{provider} rate limit exceeded ({limit_type}), retry after {retry_after_secs}s")]
    RateLimitExceeded {
        /// Provider name
        provider: String,
        /// Seconds to wait, from `Retry-After` when present
        retry_after_secs: u64,
        /// Which limit was hit
        limit_type: String,
    },

    /// The vendor reported the resource as missing
    #[error("{provider} {resource_type} not found: {resource_id}")]
    NotFound {
        /// Provider name
        provider: String,
        /// Resource kind
        resource_type: String,
        /// Resource identifier
        resource_id: String,
    },

    /// The vendor payload did not have the expected shape
    #[error("{provider} returned invalid data for '{field}': {reason}")]
    InvalidData {
        /// Provider name
        provider: String,
        /// Offending field
        field: String,
        /// What was wrong
        reason: String,
    },

    /// The connector is not configured for this call
    #[error("{provider} configuration error: {details}")]
    ConfigurationError {
        /// Provider name
        provider: String,
        /// What is missing
        details: String,
    },

    /// The vendor API has no equivalent for the requested operation
    #[error("{provider} does not support {feature}")]
    UnsupportedFeature {
        /// Provider name
        provider: String,
        /// Operation name
        feature: String,
    },

    /// Transport failure before a response was received
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Whether repeating the call could succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::ApiError { retryable, .. } => *retryable,
            Self::RateLimitExceeded { .. } | Self::NetworkError(_) => true,
            _ => false,
        }
    }

    const fn code(&self) -> ErrorCode {
        match self {
            Self::ApiError { status_code, .. } => ErrorCode::from_http_status(*status_code),
            Self::AuthenticationFailed { .. } => ErrorCode::ExternalAuthFailed,
            Self::RateLimitExceeded { .. } => ErrorCode::ExternalRateLimited,
            Self::NotFound { .. } => ErrorCode::ExternalResourceNotFound,
            Self::InvalidData { .. } => ErrorCode::SerializationError,
            Self::ConfigurationError { .. } => ErrorCode::ConfigError,
            Self::UnsupportedFeature { .. } => ErrorCode::UnsupportedFeature,
            Self::NetworkError(_) => ErrorCode::ExternalServiceUnavailable,
        }
    }

    fn provider(&self) -> Option<&str> {
        match self {
            Self::ApiError { provider, .. }
            | Self::AuthenticationFailed { provider, .. }
            | Self::RateLimitExceeded { provider, .. }
            | Self::NotFound { provider, .. }
            | Self::InvalidData { provider, .. }
            | Self::ConfigurationError { provider, .. }
            | Self::UnsupportedFeature { provider, .. } => Some(provider),
            Self::NetworkError(_) => None,
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(error: ProviderError) -> Self {
        let message = match &error {
            ProviderError::ApiError { message, .. } => message.clone(),
            other => other.to_string(),
        };
        let mut app = Self::new(error.code(), message);
        if let Some(provider) = error.provider() {
            app = app.with_provider(provider);
        }
        app.with_source(error)
    }
}

#[cfg(feature = "provider-errors")]
impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        Self::NetworkError(error.to_string())
    }
}

/// Result type for vendor-level operations
pub type ProviderResult<T> = Result<T, ProviderError>;
