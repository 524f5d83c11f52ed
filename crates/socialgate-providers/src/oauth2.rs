// ABOUTME: OAuth 2.0 authorization-code flow shared by every OAuth 2.0 connector
// ABOUTME: Consent URLs, PKCE, code exchange, token refresh and revocation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{TimeZone, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use url::Url;

use crate::api::{self, id_string, vendor_error_message};
use crate::constants::limits::TOKEN_REFRESH_MARGIN_MINUTES;
use crate::constants::oauth::{PKCE_METHOD, PKCE_VERIFIER_LENGTH, STATE_LENGTH};
use crate::core::{ConnectorState, ProviderConfig};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::http_client::shared_client;
use crate::models::{
    expiry_after_seconds, ApiKeys, AuthorizationCallback, AuthorizationRequest, Credentials,
};
use crate::validation::{require, validate_url};

const UNRESERVED: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

/// How client credentials reach the token endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenAuth {
    /// `client_id` and `client_secret` in the form body
    #[default]
    Form,
    /// HTTP Basic with `client_id:client_secret`
    Basic,
}

/// Vendor quirks of the authorization handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OAuthSettings {
    /// Separator between scopes in the consent URL
    pub scope_separator: &'static str,
    /// Where client credentials go on token requests
    pub token_auth: TokenAuth,
    /// Extra query parameters on the consent URL
    pub extra_auth_params: &'static [(&'static str, &'static str)],
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            scope_separator: " ",
            token_auth: TokenAuth::Form,
            extra_auth_params: &[],
        }
    }
}

/// PKCE verifier and its S256 challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceParams {
    /// Random verifier kept by the caller until the callback
    pub code_verifier: String,
    /// SHA-256 of the verifier, base64url encoded
    pub code_challenge: String,
    /// Always `S256`
    pub code_challenge_method: String,
}

impl PkceParams {
    /// Generate `PKCE` parameters with `S256` challenge method
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let code_verifier: String = (0..PKCE_VERIFIER_LENGTH)
            .map(|_| char::from(UNRESERVED[rng.gen_range(0..UNRESERVED.len())]))
            .collect();
        Self::from_verifier(code_verifier)
    }

    /// Derive the challenge for a known verifier
    #[must_use]
    pub fn from_verifier(code_verifier: String) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(code_verifier.as_bytes());
        let code_challenge = URL_SAFE_NO_PAD.encode(hasher.finalize());

        Self {
            code_verifier,
            code_challenge,
            code_challenge_method: PKCE_METHOD.to_owned(),
        }
    }
}

/// Random anti-CSRF `state` value
#[must_use]
pub fn generate_state() -> String {
    let mut rng = rand::thread_rng();
    (0..STATE_LENGTH)
        .map(|_| char::from(UNRESERVED[rng.gen_range(0..62)]))
        .collect()
}

/// Build the consent URL
///
/// # Errors
///
/// `MalformedUrl` when `auth_url` does not parse
pub fn authorization_url(
    auth_url: &str,
    client_id: &str,
    redirect_url: &str,
    scopes: &[String],
    state: &str,
    settings: &OAuthSettings,
    pkce: Option<&PkceParams>,
) -> AppResult<String> {
    let mut url = Url::parse(auth_url).map_err(|_| AppError::malformed_url("auth_url", auth_url))?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", redirect_url)
            .append_pair("response_type", "code")
            .append_pair("state", state);
        if !scopes.is_empty() {
            query.append_pair("scope", &scopes.join(settings.scope_separator));
        }
        if let Some(pkce) = pkce {
            query
                .append_pair("code_challenge", &pkce.code_challenge)
                .append_pair("code_challenge_method", &pkce.code_challenge_method);
        }
        for (key, value) in settings.extra_auth_params {
            query.append_pair(key, value);
        }
    }
    Ok(url.to_string())
}

/// Token endpoint response
///
/// Vendors disagree on numeric vs string encodings of `expires_in` and
/// `user_id`, so both are kept as raw JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Access token
    pub access_token: String,
    /// Usually `bearer`
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<Value>,
    /// Absolute expiry in unix seconds
    #[serde(default)]
    pub expires_at: Option<Value>,
    /// Refresh token
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// `OpenID` Connect id token
    #[serde(default)]
    pub id_token: Option<String>,
    /// Granted scopes
    #[serde(default)]
    pub scope: Option<String>,
    /// Vendor user id
    #[serde(default)]
    pub user_id: Option<Value>,
}

fn as_seconds(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl TokenResponse {
    /// Convert into credentials, keeping `previous_refresh` when the vendor
    /// does not rotate refresh tokens
    #[must_use]
    pub fn into_credentials(self, previous_refresh: Option<String>) -> Credentials {
        // A zero lifetime means "does not expire" (VK offline scope)
        let expires_at = match (
            as_seconds(self.expires_at.as_ref()),
            as_seconds(self.expires_in.as_ref()),
        ) {
            (Some(at), _) if at > 0 => Utc.timestamp_opt(at, 0).single(),
            (_, Some(secs)) if secs > 0 => {
                let at = expiry_after_seconds(secs);
                if at.is_none() {
                    warn!("Token lifetime {secs}s is out of range, treating it as non-expiring");
                }
                at
            }
            _ => None,
        };

        Credentials {
            access_token: self.access_token,
            access_token_secret: None,
            refresh_token: self.refresh_token.or(previous_refresh),
            id_token: self.id_token,
            expires_at,
            scopes: self
                .scope
                .map(|s| {
                    s.split([' ', ','])
                        .filter(|p| !p.is_empty())
                        .map(ToOwned::to_owned)
                        .collect()
                })
                .unwrap_or_default(),
            user_id: self.user_id.as_ref().and_then(id_string),
        }
    }
}

/// Whether the token expires within `minutes`
#[must_use]
pub fn needs_refresh(credentials: &Credentials, minutes: i64) -> bool {
    credentials.expires_within(minutes)
}

async fn token_request(
    provider: &str,
    token_url: &str,
    keys: &ApiKeys,
    settings: &OAuthSettings,
    mut form: Vec<(&str, String)>,
) -> AppResult<TokenResponse> {
    form.push(("client_id", keys.client_id.clone()));
    let mut request = shared_client().post(token_url);
    match settings.token_auth {
        TokenAuth::Form => form.push(("client_secret", keys.client_secret.clone())),
        TokenAuth::Basic => {
            request = request.basic_auth(&keys.client_id, Some(&keys.client_secret));
        }
    }

    let response = request
        .header("Accept", "application/json")
        .form(&form)
        .send()
        .await
        .map_err(|e| AppError::service(provider, format!("Token request failed: {e}")).with_source(e))?;

    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    if !status.is_success() {
        warn!("{provider} token endpoint returned {status}");
        let message = vendor_error_message(&text)
            .unwrap_or_else(|| format!("token endpoint returned {status}"));
        return Err(AppError::auth_failed(provider, message));
    }

    // Some vendors report token errors with a 200 status
    let value: Value = api::decode(provider, &text)?;
    if value.get("access_token").is_none() {
        let message = vendor_error_message(&text)
            .unwrap_or_else(|| "token response carries no access_token".to_owned());
        return Err(AppError::auth_failed(provider, message));
    }
    Ok(serde_json::from_value(value)?)
}

/// Exchange an authorization code for tokens
///
/// # Errors
///
/// `ExternalAuthFailed` when the vendor rejects the code
pub async fn exchange_code(
    provider: &str,
    token_url: &str,
    keys: &ApiKeys,
    settings: &OAuthSettings,
    code: &str,
    redirect_url: &str,
    code_verifier: Option<&str>,
) -> AppResult<TokenResponse> {
    let mut form = vec![
        ("grant_type", "authorization_code".to_owned()),
        ("code", code.to_owned()),
        ("redirect_uri", redirect_url.to_owned()),
    ];
    if let Some(verifier) = code_verifier {
        form.push(("code_verifier", verifier.to_owned()));
    }
    token_request(provider, token_url, keys, settings, form).await
}

/// Obtain a fresh access token from a refresh token
///
/// # Errors
///
/// `ExternalAuthFailed` when the vendor rejects the refresh token
pub async fn refresh_credentials(
    provider: &str,
    token_url: &str,
    keys: &ApiKeys,
    settings: &OAuthSettings,
    refresh_token: &str,
) -> AppResult<Credentials> {
    let form = vec![
        ("grant_type", "refresh_token".to_owned()),
        ("refresh_token", refresh_token.to_owned()),
    ];
    let token = token_request(provider, token_url, keys, settings, form).await?;
    Ok(token.into_credentials(Some(refresh_token.to_owned())))
}

/// Resolve the redirect URL from the argument or the API keys
fn resolve_redirect(keys: &ApiKeys, redirect_url: Option<&str>) -> AppResult<String> {
    let redirect = require(
        "redirect_url",
        redirect_url.or(keys.redirect_url.as_deref()),
    )?;
    validate_url("redirect_url", redirect)?;
    Ok(redirect.to_owned())
}

/// Scopes from the API keys, or the provider defaults
fn requested_scopes(keys: &ApiKeys, config: &ProviderConfig) -> Vec<String> {
    if keys.scopes.is_empty() {
        config.default_scopes.clone()
    } else {
        keys.scopes.clone()
    }
}

/// Start an authorization: consent URL, state and optional PKCE verifier
///
/// # Errors
///
/// `ApiKeysMissing` before `set_api_keys`, `MissingRequiredField` or
/// `MalformedUrl` for the redirect URL
pub async fn begin_authorization(
    state: &ConnectorState,
    config: &ProviderConfig,
    settings: &OAuthSettings,
    redirect_url: Option<&str>,
    pkce: bool,
) -> AppResult<AuthorizationRequest> {
    let keys = state.api_keys().await?;
    let redirect = resolve_redirect(&keys, redirect_url)?;
    let csrf_state = generate_state();
    let pkce = pkce.then(PkceParams::generate);

    let url = authorization_url(
        &config.auth_url,
        &keys.client_id,
        &redirect,
        &requested_scopes(&keys, config),
        &csrf_state,
        settings,
        pkce.as_ref(),
    )?;
    debug!(provider = %config.name, pkce = pkce.is_some(), "Built authorization URL");

    Ok(AuthorizationRequest {
        url,
        redirect_url: Some(redirect),
        state: Some(csrf_state),
        code_verifier: pkce.map(|p| p.code_verifier),
        request_token: None,
        request_token_secret: None,
    })
}

/// Exchange the callback code for credentials
///
/// # Errors
///
/// `MissingRequiredField` without a code, `ApiKeysMissing` before
/// `set_api_keys`, `ExternalAuthFailed` when the vendor rejects the code
pub async fn complete_authorization(
    state: &ConnectorState,
    config: &ProviderConfig,
    settings: &OAuthSettings,
    callback: &AuthorizationCallback,
) -> AppResult<Credentials> {
    let code = require("code", callback.code.as_deref())?;
    let keys = state.api_keys().await?;
    let redirect = resolve_redirect(&keys, callback.redirect_url.as_deref())?;

    let token = exchange_code(
        &config.name,
        &config.token_url,
        &keys,
        settings,
        code,
        &redirect,
        callback.code_verifier.as_deref(),
    )
    .await?;
    Ok(token.into_credentials(None))
}

/// Refresh stored credentials when they expire soon
///
/// # Errors
///
/// `AuthRequired` without credentials, `AuthExpired` when the token is
/// expired and there is no refresh token, refresh errors from the vendor
pub async fn refresh_if_needed(
    state: &ConnectorState,
    config: &ProviderConfig,
    settings: &OAuthSettings,
) -> AppResult<()> {
    let credentials = state.credentials().await?;
    if !needs_refresh(&credentials, TOKEN_REFRESH_MARGIN_MINUTES) {
        return Ok(());
    }

    let Some(refresh_token) = credentials.refresh_token.as_deref() else {
        if credentials.is_expired() {
            return Err(AppError::new(
                ErrorCode::AuthExpired,
                "Access token expired and no refresh token is available",
            )
            .with_provider(&config.name));
        }
        return Ok(());
    };

    let keys = state.api_keys().await?;
    let refreshed =
        refresh_credentials(&config.name, &config.token_url, &keys, settings, refresh_token)
            .await?;
    state.set_credentials(refreshed).await;
    info!(provider = %config.name, "Access token refreshed");
    Ok(())
}

/// Revoke an access token
///
/// # Errors
///
/// `ApiKeysMissing` before `set_api_keys`, external errors from the vendor
pub async fn revoke_token(
    state: &ConnectorState,
    provider: &str,
    revoke_url: &str,
    settings: &OAuthSettings,
    token: &str,
) -> AppResult<()> {
    let keys = state.api_keys().await?;
    let mut form = vec![("token", token.to_owned())];
    let mut request = shared_client().post(revoke_url);
    match settings.token_auth {
        TokenAuth::Form => {
            form.push(("client_id", keys.client_id.clone()));
            form.push(("client_secret", keys.client_secret.clone()));
        }
        TokenAuth::Basic => {
            request = request.basic_auth(&keys.client_id, Some(&keys.client_secret));
        }
    }
    api::send(provider, request.form(&form)).await?;
    debug!(provider, "Token revoked");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pkce_challenge_matches_rfc7636_vector() {
        let pkce =
            PkceParams::from_verifier("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk".to_owned());
        assert_eq!(pkce.code_challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
        assert_eq!(pkce.code_challenge_method, "S256");
        assert_eq!(PkceParams::generate().code_verifier.len(), PKCE_VERIFIER_LENGTH);
    }

    #[test]
    fn test_token_response_handles_string_lifetimes() {
        let token: TokenResponse = serde_json::from_str(
            r#"{"access_token":"a","expires_in":"3600","user_id":17841400000,"scope":"read,write"}"#,
        )
        .unwrap();
        let creds = token.into_credentials(Some("old-refresh".to_owned()));
        assert!(creds.expires_at.is_some());
        assert_eq!(creds.user_id.as_deref(), Some("17841400000"));
        assert_eq!(creds.refresh_token.as_deref(), Some("old-refresh"));
        assert_eq!(creds.scopes, vec!["read".to_owned(), "write".to_owned()]);
    }

    #[test]
    fn test_zero_lifetime_never_expires() {
        let token: TokenResponse =
            serde_json::from_str(r#"{"access_token":"a","expires_in":0}"#).unwrap();
        assert!(token.into_credentials(None).expires_at.is_none());
    }

    #[test]
    fn test_lifetime_beyond_time_range_never_expires() {
        let token: TokenResponse = serde_json::from_str(
            r#"{"access_token":"a","expires_in":"9223372036854775807"}"#,
        )
        .unwrap();
        let creds = token.into_credentials(None);
        assert!(creds.expires_at.is_none());
        assert!(!needs_refresh(&creds, TOKEN_REFRESH_MARGIN_MINUTES));
    }
}
