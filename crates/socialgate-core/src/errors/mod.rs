// ABOUTME: Unified error handling with numeric error codes and three coarse error kinds
// ABOUTME: Defines ErrorCode, ErrorKind, AppError and the named constructors used by connectors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

//! # Unified Error Handling
//!
//! Every fallible operation in the workspace returns [`AppResult`]. An
//! [`AppError`] carries a fine-grained [`ErrorCode`] for programmatic checks
//! and maps onto one of three [`ErrorKind`]s:
//!
//! - `Configuration`: the caller supplied missing, empty or invalid input
//! - `Service`: the vendor call failed
//! - `MalformedUrl`: a URL argument could not be used

use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured vendor failures with retry information
pub mod provider;

pub use provider::{ProviderError, ProviderResult};

/// Standard error codes used throughout the workspace
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Authentication & credentials (1000-1999)
    /// No credentials have been set on the connector
    #[serde(rename = "AUTH_REQUIRED")]
    AuthRequired = 1000,
    /// Credentials or callback parameters are invalid
    #[serde(rename = "AUTH_INVALID")]
    AuthInvalid = 1001,
    /// The access token has expired and cannot be refreshed
    #[serde(rename = "AUTH_EXPIRED")]
    AuthExpired = 1002,
    /// Client id/secret have not been configured
    #[serde(rename = "API_KEYS_MISSING")]
    ApiKeysMissing = 1003,

    // Validation (3000-3999)
    /// Generic invalid input
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    /// A required field is absent
    #[serde(rename = "MISSING_REQUIRED_FIELD")]
    MissingRequiredField = 3001,
    /// Data has the wrong shape
    #[serde(rename = "INVALID_FORMAT")]
    InvalidFormat = 3002,
    /// Value outside the accepted range
    #[serde(rename = "VALUE_OUT_OF_RANGE")]
    ValueOutOfRange = 3003,
    /// A required field is present but empty
    #[serde(rename = "EMPTY_PARAMETER")]
    EmptyParameter = 3004,
    /// A field that must hold digits holds something else
    #[serde(rename = "NOT_NUMERIC")]
    NotNumeric = 3005,
    /// A URL argument is not a usable http(s) URL
    #[serde(rename = "MALFORMED_URL")]
    MalformedUrl = 3006,

    // Provider lookup & capability (4000-4999)
    /// No connector is registered under the requested name
    #[serde(rename = "UNKNOWN_PROVIDER")]
    UnknownProvider = 4000,
    /// The connector does not offer the requested operation
    #[serde(rename = "UNSUPPORTED_FEATURE")]
    UnsupportedFeature = 4001,

    // External services (5000-5999)
    /// The vendor returned an error
    #[serde(rename = "EXTERNAL_SERVICE_ERROR")]
    ExternalServiceError = 5000,
    /// The vendor could not be reached
    #[serde(rename = "EXTERNAL_SERVICE_UNAVAILABLE")]
    ExternalServiceUnavailable = 5001,
    /// The vendor rejected our token
    #[serde(rename = "EXTERNAL_AUTH_FAILED")]
    ExternalAuthFailed = 5002,
    /// The vendor throttled the request
    #[serde(rename = "EXTERNAL_RATE_LIMITED")]
    ExternalRateLimited = 5003,
    /// The vendor reported the resource as missing
    #[serde(rename = "EXTERNAL_RESOURCE_NOT_FOUND")]
    ExternalResourceNotFound = 5004,

    // Configuration (6000-6999)
    /// Generic configuration error
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,
    /// Required configuration is absent
    #[serde(rename = "CONFIG_MISSING")]
    ConfigMissing = 6001,
    /// Configuration value is invalid
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6002,

    // Internal (9000-9999)
    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// A vendor payload could not be (de)serialized
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9003,
}

/// The three coarse error categories every failure falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad or missing input, unknown provider, unsupported operation
    Configuration,
    /// The vendor call (or decoding its answer) failed
    Service,
    /// A URL argument is malformed
    MalformedUrl,
}

impl ErrorCode {
    /// Numeric value of the code
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Coarse category of this code
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        match self {
            Self::MalformedUrl => ErrorKind::MalformedUrl,
            Self::ExternalServiceError
            | Self::ExternalServiceUnavailable
            | Self::ExternalAuthFailed
            | Self::ExternalRateLimited
            | Self::ExternalResourceNotFound
            | Self::SerializationError
            | Self::InternalError => ErrorKind::Service,
            Self::AuthRequired
            | Self::AuthInvalid
            | Self::AuthExpired
            | Self::ApiKeysMissing
            | Self::InvalidInput
            | Self::MissingRequiredField
            | Self::InvalidFormat
            | Self::ValueOutOfRange
            | Self::EmptyParameter
            | Self::NotNumeric
            | Self::UnknownProvider
            | Self::UnsupportedFeature
            | Self::ConfigError
            | Self::ConfigMissing
            | Self::ConfigInvalid => ErrorKind::Configuration,
        }
    }

    /// Map a non-success vendor HTTP status onto a code
    #[must_use]
    pub const fn from_http_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::ExternalAuthFailed,
            404 => Self::ExternalResourceNotFound,
            429 => Self::ExternalRateLimited,
            502..=504 => Self::ExternalServiceUnavailable,
            _ => Self::ExternalServiceError,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::AuthRequired => "Credentials are required for this operation",
            Self::AuthInvalid => "The provided credentials are invalid",
            Self::AuthExpired => "The access token has expired",
            Self::ApiKeysMissing => "API keys have not been configured",
            Self::InvalidInput => "The provided input is invalid",
            Self::MissingRequiredField => "A required field is missing",
            Self::InvalidFormat => "The data format is invalid",
            Self::ValueOutOfRange => "The provided value is outside the acceptable range",
            Self::EmptyParameter => "A required field is empty",
            Self::NotNumeric => "A numeric field contains non-digit characters",
            Self::MalformedUrl => "The URL is malformed",
            Self::UnknownProvider => "The requested provider is not registered",
            Self::UnsupportedFeature => "The provider does not support this operation",
            Self::ExternalServiceError => "An external service encountered an error",
            Self::ExternalServiceUnavailable => "An external service is currently unavailable",
            Self::ExternalAuthFailed => "Authentication with external service failed",
            Self::ExternalRateLimited => "External service rate limit exceeded",
            Self::ExternalResourceNotFound => "The external resource was not found",
            Self::ConfigError => "Configuration error encountered",
            Self::ConfigMissing => "Required configuration is missing",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::InternalError => "An internal error occurred",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }
}

/// Unified error type for the workspace
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message, vendor text preserved verbatim
    pub message: String,
    /// Provider the failure is attributed to, if any
    pub provider: Option<String>,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider: None,
            source: None,
        }
    }

    /// Attribute the error to a provider
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Coarse category of this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    /// True for throttling and transient vendor failures
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::ExternalRateLimited | ErrorCode::ExternalServiceUnavailable
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.provider {
            Some(provider) => write!(f, "[{provider}] {}: {}", self.code.description(), self.message),
            None => write!(f, "{}: {}", self.code.description(), self.message),
        }
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Convenience functions for creating common errors
impl AppError {
    /// A required parameter was not supplied
    #[must_use]
    pub fn missing_parameter(field: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("Missing required parameter: {}", field.into()),
        )
    }

    /// A required parameter was supplied but empty
    #[must_use]
    pub fn empty_parameter(field: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::EmptyParameter,
            format!("Parameter must not be empty: {}", field.into()),
        )
    }

    /// A parameter has an unusable value
    #[must_use]
    pub fn invalid_parameter(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InvalidInput,
            format!("Invalid parameter '{}': {}", field.into(), reason.into()),
        )
    }

    /// Generic invalid input
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// A parameter that must be numeric is not
    #[must_use]
    pub fn not_numeric(field: impl Into<String>, value: &str) -> Self {
        Self::new(
            ErrorCode::NotNumeric,
            format!("Parameter '{}' must be numeric, got '{value}'", field.into()),
        )
    }

    /// A URL parameter is malformed
    #[must_use]
    pub fn malformed_url(field: impl Into<String>, url: &str) -> Self {
        Self::new(
            ErrorCode::MalformedUrl,
            format!("Malformed URL for '{}': {url}", field.into()),
        )
    }

    /// API keys must be set before this operation
    #[must_use]
    pub fn api_keys_required(provider: impl Into<String>) -> Self {
        let provider = provider.into();
        Self::new(
            ErrorCode::ApiKeysMissing,
            format!("API keys are not configured for {provider}"),
        )
        .with_provider(provider)
    }

    /// Credentials must be set before this operation
    #[must_use]
    pub fn credentials_required(provider: impl Into<String>) -> Self {
        let provider = provider.into();
        Self::new(
            ErrorCode::AuthRequired,
            format!("No credentials set for {provider}"),
        )
        .with_provider(provider)
    }

    /// The OAuth callback failed a consistency check
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthInvalid, message)
    }

    /// No connector is registered under `name`
    #[must_use]
    pub fn unknown_provider(name: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::UnknownProvider,
            format!("Unsupported provider: {}", name.into()),
        )
    }

    /// The connector does not implement `feature`
    #[must_use]
    pub fn unsupported_feature(provider: impl Into<String>, feature: impl Into<String>) -> Self {
        let provider = provider.into();
        Self::new(
            ErrorCode::UnsupportedFeature,
            format!("{provider} does not support {}", feature.into()),
        )
        .with_provider(provider)
    }

    /// The vendor call failed
    #[must_use]
    pub fn service(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExternalServiceError, message).with_provider(provider)
    }

    /// The vendor answered with a non-success HTTP status
    #[must_use]
    pub fn service_status(
        provider: impl Into<String>,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ErrorCode::from_http_status(status), message).with_provider(provider)
    }

    /// The vendor rejected our credentials
    #[must_use]
    pub fn auth_failed(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExternalAuthFailed, message).with_provider(provider)
    }

    /// The vendor throttled us
    #[must_use]
    pub fn rate_limited(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExternalRateLimited, message).with_provider(provider)
    }

    /// The vendor has no such object
    #[must_use]
    pub fn not_found(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExternalResourceNotFound, message).with_provider(provider)
    }

    /// A vendor payload could not be decoded
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SerializationError, message)
    }

    /// A configuration key is absent
    #[must_use]
    pub fn config_missing(key: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ConfigMissing,
            format!("Missing configuration: {}", key.into()),
        )
    }

    /// Configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Internal error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(error.to_string()).with_source(error)
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::new(ErrorCode::MalformedUrl, error.to_string()).with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_kinds() {
        assert_eq!(ErrorCode::MissingRequiredField.kind(), ErrorKind::Configuration);
        assert_eq!(ErrorCode::EmptyParameter.kind(), ErrorKind::Configuration);
        assert_eq!(ErrorCode::MalformedUrl.kind(), ErrorKind::MalformedUrl);
        assert_eq!(ErrorCode::ExternalRateLimited.kind(), ErrorKind::Service);
        assert_eq!(ErrorCode::UnknownProvider.as_u16(), 4000);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorCode::from_http_status(401), ErrorCode::ExternalAuthFailed);
        assert_eq!(ErrorCode::from_http_status(403), ErrorCode::ExternalAuthFailed);
        assert_eq!(ErrorCode::from_http_status(404), ErrorCode::ExternalResourceNotFound);
        assert_eq!(ErrorCode::from_http_status(429), ErrorCode::ExternalRateLimited);
        assert_eq!(ErrorCode::from_http_status(400), ErrorCode::ExternalServiceError);
    }

    #[test]
    fn test_display_includes_provider() {
        let error = AppError::service("reddit", "SUBREDDIT_NOEXIST");
        let rendered = error.to_string();
        assert!(rendered.starts_with("[reddit]"));
        assert!(rendered.ends_with("SUBREDDIT_NOEXIST"));
    }
}
