// ABOUTME: Authorization DTOs: application API keys, user credentials and OAuth round-trip state
// ABOUTME: Credentials are request-scoped values with redacted Debug output
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::validation::{require, require_non_empty, validate_url};

/// Application credentials issued by the vendor's developer console
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeys {
    /// OAuth client id, or consumer key for OAuth 1.0a
    pub client_id: String,
    /// OAuth client secret, or consumer secret for OAuth 1.0a
    pub client_secret: String,
    /// Registered redirect/callback URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    /// Scopes to request; empty means the provider's defaults
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl ApiKeys {
    /// Keys without redirect URL or scopes
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_url: None,
            scopes: Vec::new(),
        }
    }

    /// Set the redirect URL
    #[must_use]
    pub fn with_redirect_url(mut self, redirect_url: impl Into<String>) -> Self {
        self.redirect_url = Some(redirect_url.into());
        self
    }

    /// Set the requested scopes
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Check that id and secret are present and the redirect URL is well-formed
    ///
    /// # Errors
    ///
    /// `EmptyParameter` for a blank id or secret, `MalformedUrl` for a bad redirect URL
    pub fn validate(&self) -> AppResult<()> {
        require_non_empty("client_id", &self.client_id)?;
        require_non_empty("client_secret", &self.client_secret)?;
        if let Some(redirect_url) = &self.redirect_url {
            validate_url("redirect_url", redirect_url)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeys")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_url", &self.redirect_url)
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Per-user credentials for one provider
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// OAuth access token
    pub access_token: String,
    /// OAuth 1.0a token secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_secret: Option<String>,
    /// OAuth 2.0 refresh token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// `OpenID` Connect id token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    /// Access token expiry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Granted scopes
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Vendor user id returned alongside the token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Credentials {
    /// Credentials holding only an access token
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..Self::default()
        }
    }

    /// Set the OAuth 1.0a token secret
    #[must_use]
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.access_token_secret = Some(secret.into());
        self
    }

    /// Set the refresh token
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Set the expiry
    #[must_use]
    pub const fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Build credentials from a loose string map
    ///
    /// Recognized keys: `access_token`, `access_token_secret` (or
    /// `oauth_token_secret`), `refresh_token`, `id_token`, `expires_at`
    /// (unix seconds), `expires_in` (seconds from now), `scope`, `user_id`.
    ///
    /// # Errors
    ///
    /// `MissingRequiredField`/`EmptyParameter` for the access token,
    /// `NotNumeric` for a non-numeric expiry, `ValueOutOfRange` for an
    /// `expires_in` that does not fit a timestamp
    pub fn from_map(map: &HashMap<String, String>) -> AppResult<Self> {
        let get = |key: &str| map.get(key).map(String::as_str).filter(|v| !v.is_empty());

        let access_token = require("access_token", map.get("access_token").map(String::as_str))?;

        let expires_at = match (get("expires_at"), get("expires_in")) {
            (Some(at), _) => Some(parse_unix_seconds("expires_at", at)?),
            (None, Some(secs)) => {
                let secs: i64 = secs
                    .parse()
                    .map_err(|_| AppError::not_numeric("expires_in", secs))?;
                Some(expiry_after_seconds(secs).ok_or_else(|| {
                    AppError::new(
                        ErrorCode::ValueOutOfRange,
                        format!("expires_in {secs} is beyond the supported time range"),
                    )
                })?)
            }
            (None, None) => None,
        };

        Ok(Self {
            access_token: access_token.to_owned(),
            access_token_secret: get("access_token_secret")
                .or_else(|| get("oauth_token_secret"))
                .map(ToOwned::to_owned),
            refresh_token: get("refresh_token").map(ToOwned::to_owned),
            id_token: get("id_token").map(ToOwned::to_owned),
            expires_at,
            scopes: get("scope")
                .map(|s| {
                    s.split([' ', ','])
                        .filter(|p| !p.is_empty())
                        .map(ToOwned::to_owned)
                        .collect()
                })
                .unwrap_or_default(),
            user_id: get("user_id").map(ToOwned::to_owned),
        })
    }

    /// Check the fields the provider's auth scheme needs
    ///
    /// # Errors
    ///
    /// `EmptyParameter` for a blank access token, `MissingRequiredField` or
    /// `EmptyParameter` for the token secret when `requires_secret` is set
    pub fn validate(&self, requires_secret: bool) -> AppResult<()> {
        require_non_empty("access_token", &self.access_token)?;
        if requires_secret {
            require("access_token_secret", self.access_token_secret.as_deref())?;
        }
        Ok(())
    }

    /// True once `expires_at` is in the past
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }

    /// True when the token expires within the next `minutes`
    #[must_use]
    pub fn expires_within(&self, minutes: i64) -> bool {
        let horizon =
            Duration::try_minutes(minutes).and_then(|d| Utc::now().checked_add_signed(d));
        match (self.expires_at, horizon) {
            (Some(at), Some(horizon)) => horizon > at,
            (Some(_), None) => minutes > 0,
            (None, _) => false,
        }
    }
}

/// `secs` seconds from now, `None` when that falls outside chrono's range
#[must_use]
pub fn expiry_after_seconds(secs: i64) -> Option<DateTime<Utc>> {
    Duration::try_seconds(secs).and_then(|d| Utc::now().checked_add_signed(d))
}

fn parse_unix_seconds(field: &str, value: &str) -> AppResult<DateTime<Utc>> {
    let secs: i64 = value
        .parse()
        .map_err(|_| AppError::not_numeric(field, value))?;
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| AppError::invalid_parameter(field, "timestamp out of range"))
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"[REDACTED]")
            .field(
                "access_token_secret",
                &self.access_token_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("id_token", &self.id_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_at", &self.expires_at)
            .field("scopes", &self.scopes)
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// Where to send the user, plus the state the caller must keep until the callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    /// Vendor consent page URL
    pub url: String,
    /// Redirect URL embedded in `url`; the token exchange must repeat it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    /// Anti-CSRF `state` embedded in `url` (OAuth 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// PKCE verifier to return with the callback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_verifier: Option<String>,
    /// OAuth 1.0a request token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_token: Option<String>,
    /// OAuth 1.0a request token secret to return with the callback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_token_secret: Option<String>,
}

/// Parameters received on the redirect URL, plus state kept by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationCallback {
    /// OAuth 2.0 authorization code
    pub code: Option<String>,
    /// `state` echoed by the vendor
    pub state: Option<String>,
    /// `state` issued by `request_authorization`; checked when set
    pub expected_state: Option<String>,
    /// PKCE verifier issued by `request_authorization`
    pub code_verifier: Option<String>,
    /// OAuth 1.0a request token echoed by the vendor
    pub oauth_token: Option<String>,
    /// OAuth 1.0a verifier
    pub oauth_verifier: Option<String>,
    /// OAuth 1.0a request token secret issued by `request_authorization`
    pub request_token_secret: Option<String>,
    /// Redirect URL used by `request_authorization`
    pub redirect_url: Option<String>,
    /// Raw callback query, needed for signed callbacks
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl AuthorizationCallback {
    /// Callback carrying only an authorization code
    #[must_use]
    pub fn from_code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }

    /// Callback built from the raw redirect query parameters
    #[must_use]
    pub fn from_query(params: HashMap<String, String>) -> Self {
        let get = |key: &str| params.get(key).cloned();
        let (code, state) = (get("code"), get("state"));
        let (oauth_token, oauth_verifier) = (get("oauth_token"), get("oauth_verifier"));
        Self {
            code,
            state,
            oauth_token,
            oauth_verifier,
            params,
            ..Self::default()
        }
    }

    /// Attach the state and secrets issued by `request_authorization`
    #[must_use]
    pub fn with_request(mut self, request: &AuthorizationRequest) -> Self {
        self.expected_state.clone_from(&request.state);
        self.code_verifier.clone_from(&request.code_verifier);
        self.request_token_secret
            .clone_from(&request.request_token_secret);
        self.redirect_url.clone_from(&request.redirect_url);
        self
    }

    /// Compare the echoed `state` with the issued one
    ///
    /// # Errors
    ///
    /// `AuthInvalid` when an expected state is set and does not match
    pub fn check_state(&self) -> AppResult<()> {
        match (&self.expected_state, &self.state) {
            (None, _) => Ok(()),
            (Some(expected), Some(actual)) if expected == actual => Ok(()),
            (Some(_), _) => Err(AppError::invalid_state(
                "OAuth state mismatch: callback does not belong to this authorization request",
            )),
        }
    }
}
