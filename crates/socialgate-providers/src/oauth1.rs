// ABOUTME: OAuth 1.0a HMAC-SHA1 request signing and the three-legged token flow
// ABOUTME: Used by the Tumblr and Flickr connectors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

//! OAuth 1.0a (RFC 5849).
//!
//! Every request is signed with HMAC-SHA1 over the method, the normalized URL
//! and the sorted union of query, form and `oauth_*` parameters. Only the
//! signing needed to produce requests is implemented; signature verification
//! is not.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder};
use sha1::Sha1;
use tracing::debug;
use url::{form_urlencoded, Url};

use crate::api;
use crate::constants::oauth::{OAUTH1_OOB, OAUTH1_SIGNATURE_METHOD, OAUTH1_VERSION};
use crate::core::{ConnectorState, ProviderConfig};
use crate::errors::{AppError, AppResult};
use crate::http_client::shared_client;
use crate::models::{ApiKeys, AuthorizationCallback, AuthorizationRequest, Credentials};
use crate::oauth2::OAuthSettings;
use crate::validation::{require, validate_url};

type HmacSha1 = Hmac<Sha1>;

const NONCE_LENGTH: usize = 32;

/// RFC 3986 percent-encoding of everything outside the unreserved set
#[must_use]
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// `scheme://host[:port]/path` with default ports dropped and no query
///
/// # Errors
///
/// `MalformedUrl` when `url` does not parse
pub fn normalized_url(url: &str) -> AppResult<(String, Vec<(String, String)>)> {
    let parsed = Url::parse(url).map_err(|_| AppError::malformed_url("url", url))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| AppError::malformed_url("url", url))?;
    let base = parsed.port().map_or_else(
        || format!("{}://{host}{}", parsed.scheme(), parsed.path()),
        |port| format!("{}://{host}:{port}{}", parsed.scheme(), parsed.path()),
    );
    let query = parsed
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    Ok((base, query))
}

/// Signature base string over already-merged parameters
#[must_use]
pub fn signature_base_string(method: &str, normalized_url: &str, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();
    let parameter_string = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(normalized_url),
        percent_encode(&parameter_string)
    )
}

/// Consumer and (optional) token credentials used to sign requests
#[derive(Clone, Copy)]
pub struct OAuth1Signer<'a> {
    consumer_key: &'a str,
    consumer_secret: &'a str,
    token: Option<&'a str>,
    token_secret: Option<&'a str>,
}

impl<'a> OAuth1Signer<'a> {
    /// Signer without a token, for request-token calls
    #[must_use]
    pub const fn new(consumer_key: &'a str, consumer_secret: &'a str) -> Self {
        Self {
            consumer_key,
            consumer_secret,
            token: None,
            token_secret: None,
        }
    }

    /// Signer for the application keys
    #[must_use]
    pub fn from_keys(keys: &'a ApiKeys) -> Self {
        Self::new(&keys.client_id, &keys.client_secret)
    }

    /// Add a token and its secret
    #[must_use]
    pub const fn with_token(mut self, token: &'a str, token_secret: &'a str) -> Self {
        self.token = Some(token);
        self.token_secret = Some(token_secret);
        self
    }

    /// Add the user credentials
    #[must_use]
    pub fn with_credentials(self, credentials: &'a Credentials) -> Self {
        self.with_token(
            &credentials.access_token,
            credentials.access_token_secret.as_deref().unwrap_or_default(),
        )
    }

    /// HMAC-SHA1 of a base string, base64 encoded
    ///
    /// # Errors
    ///
    /// `InternalError` if the HMAC key is rejected
    pub fn signature(&self, base_string: &str) -> AppResult<String> {
        let key = format!(
            "{}&{}",
            percent_encode(self.consumer_secret),
            percent_encode(self.token_secret.unwrap_or_default())
        );
        let mut mac = HmacSha1::new_from_slice(key.as_bytes())
            .map_err(|e| AppError::internal(format!("Invalid HMAC key: {e}")))?;
        mac.update(base_string.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }

    /// `Authorization` header for a request with a fresh nonce and timestamp
    ///
    /// `params` are form fields (or multipart text fields) that are signed
    /// with the request; query parameters are taken from `url`.
    ///
    /// # Errors
    ///
    /// `MalformedUrl` for an unparsable URL
    pub fn authorization_header(
        &self,
        method: &Method,
        url: &str,
        params: &[(&str, &str)],
        oauth_extra: &[(&str, &str)],
    ) -> AppResult<String> {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(NONCE_LENGTH)
            .map(char::from)
            .collect();
        let timestamp = Utc::now().timestamp().to_string();
        self.authorization_header_with(method, url, params, oauth_extra, &nonce, &timestamp)
    }

    /// `Authorization` header with a given nonce and timestamp
    ///
    /// # Errors
    ///
    /// `MalformedUrl` for an unparsable URL
    pub fn authorization_header_with(
        &self,
        method: &Method,
        url: &str,
        params: &[(&str, &str)],
        oauth_extra: &[(&str, &str)],
        nonce: &str,
        timestamp: &str,
    ) -> AppResult<String> {
        let mut oauth_params: Vec<(String, String)> = vec![
            ("oauth_consumer_key".to_owned(), self.consumer_key.to_owned()),
            ("oauth_nonce".to_owned(), nonce.to_owned()),
            ("oauth_signature_method".to_owned(), OAUTH1_SIGNATURE_METHOD.to_owned()),
            ("oauth_timestamp".to_owned(), timestamp.to_owned()),
            ("oauth_version".to_owned(), OAUTH1_VERSION.to_owned()),
        ];
        if let Some(token) = self.token.filter(|t| !t.is_empty()) {
            oauth_params.push(("oauth_token".to_owned(), token.to_owned()));
        }
        oauth_params.extend(oauth_extra.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())));

        let (base_url, query) = normalized_url(url)?;
        let mut all_params = oauth_params.clone();
        all_params.extend(query);
        all_params.extend(params.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())));

        let base_string = signature_base_string(method.as_str(), &base_url, &all_params);
        oauth_params.push(("oauth_signature".to_owned(), self.signature(&base_string)?));
        oauth_params.sort();

        let header = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("OAuth {header}"))
    }
}

/// Parse an `application/x-www-form-urlencoded` token response
#[must_use]
pub fn parse_form_response(body: &str) -> HashMap<String, String> {
    form_urlencoded::parse(body.trim().as_bytes())
        .into_owned()
        .collect()
}

fn token_pair(provider: &str, body: &str) -> AppResult<(String, String, HashMap<String, String>)> {
    let values = parse_form_response(body);
    let token = values.get("oauth_token").filter(|v| !v.is_empty()).cloned();
    let secret = values
        .get("oauth_token_secret")
        .filter(|v| !v.is_empty())
        .cloned();
    match (token, secret) {
        (Some(token), Some(secret)) => Ok((token, secret, values)),
        _ => Err(AppError::auth_failed(
            provider,
            api::vendor_error_message(body)
                .unwrap_or_else(|| "token response carries no oauth_token".to_owned()),
        )),
    }
}

/// Append query parameters to a URL
///
/// # Errors
///
/// `MalformedUrl` for an unparsable URL
pub fn url_with_query(url: &str, query: &[(&str, String)]) -> AppResult<String> {
    Url::parse_with_params(url, query)
        .map(String::from)
        .map_err(|_| AppError::malformed_url("url", url))
}

/// Request signed with the stored API keys and user credentials
///
/// Query parameters must already be part of `url`; `form` lists the
/// url-encoded body fields to sign, which the caller still attaches.
///
/// # Errors
///
/// `ApiKeysMissing` or `AuthRequired` when keys or credentials are not set,
/// `MalformedUrl` for an unparsable URL
pub async fn signed_request(
    state: &ConnectorState,
    method: Method,
    url: &str,
    form: &[(&str, &str)],
) -> AppResult<RequestBuilder> {
    let keys = state.api_keys().await?;
    let credentials = state.credentials().await?;
    let header = OAuth1Signer::from_keys(&keys)
        .with_credentials(&credentials)
        .authorization_header(&method, url, form, &[])?;
    Ok(shared_client().request(method, url).header(AUTHORIZATION, header))
}

/// Obtain a temporary request token
///
/// # Errors
///
/// `ConfigInvalid` without a request-token URL, `ExternalAuthFailed` when the
/// vendor rejects the consumer keys
pub async fn request_token(
    config: &ProviderConfig,
    keys: &ApiKeys,
    callback: &str,
) -> AppResult<(String, String)> {
    let url = config.request_token_url.as_deref().ok_or_else(|| {
        AppError::config(format!("{} has no request token URL configured", config.name))
    })?;
    let header = OAuth1Signer::from_keys(keys).authorization_header(
        &Method::POST,
        url,
        &[],
        &[("oauth_callback", callback)],
    )?;

    let body = api::send_text(
        &config.name,
        shared_client().post(url).header(AUTHORIZATION, header),
    )
    .await?;
    let (token, secret, _) = token_pair(&config.name, &body)?;
    Ok((token, secret))
}

/// Exchange a verified request token for access credentials
///
/// # Errors
///
/// `ExternalAuthFailed` when the vendor rejects the verifier
pub async fn access_token(
    config: &ProviderConfig,
    keys: &ApiKeys,
    request_token: &str,
    request_token_secret: &str,
    verifier: &str,
) -> AppResult<Credentials> {
    let header = OAuth1Signer::from_keys(keys)
        .with_token(request_token, request_token_secret)
        .authorization_header(
            &Method::POST,
            &config.token_url,
            &[],
            &[("oauth_verifier", verifier)],
        )?;

    let body = api::send_text(
        &config.name,
        shared_client()
            .post(&config.token_url)
            .header(AUTHORIZATION, header),
    )
    .await?;
    let (token, secret, values) = token_pair(&config.name, &body)?;

    let mut credentials = Credentials::new(token).with_secret(secret);
    credentials.user_id = values
        .get("user_nsid")
        .or_else(|| values.get("user_id"))
        .cloned();
    Ok(credentials)
}

/// Obtain a request token and build the consent URL
///
/// # Errors
///
/// `ApiKeysMissing` before `set_api_keys`, `MalformedUrl` for a bad callback
/// URL, vendor errors from the request-token call
pub async fn begin_authorization(
    state: &ConnectorState,
    config: &ProviderConfig,
    settings: &OAuthSettings,
    redirect_url: Option<&str>,
) -> AppResult<AuthorizationRequest> {
    let keys = state.api_keys().await?;
    let callback = redirect_url
        .or(keys.redirect_url.as_deref())
        .unwrap_or(OAUTH1_OOB);
    if callback != OAUTH1_OOB {
        validate_url("redirect_url", callback)?;
    }

    let (token, secret) = request_token(config, &keys, callback).await?;

    let mut url = Url::parse(&config.auth_url)
        .map_err(|_| AppError::malformed_url("auth_url", &config.auth_url))?;
    url.query_pairs_mut()
        .append_pair("oauth_token", &token)
        .extend_pairs(settings.extra_auth_params.iter().copied());
    debug!(provider = %config.name, "Obtained OAuth 1.0a request token");

    Ok(AuthorizationRequest {
        url: url.to_string(),
        redirect_url: Some(callback.to_owned()),
        state: None,
        code_verifier: None,
        request_token: Some(token),
        request_token_secret: Some(secret),
    })
}

/// Exchange the callback verifier for access credentials
///
/// # Errors
///
/// `MissingRequiredField` for a missing token, verifier or request secret,
/// vendor errors from the access-token call
pub async fn complete_authorization(
    state: &ConnectorState,
    config: &ProviderConfig,
    callback: &AuthorizationCallback,
) -> AppResult<Credentials> {
    let token = require("oauth_token", callback.oauth_token.as_deref())?;
    let verifier = require("oauth_verifier", callback.oauth_verifier.as_deref())?;
    let secret = require(
        "request_token_secret",
        callback.request_token_secret.as_deref(),
    )?;
    let keys = state.api_keys().await?;
    access_token(config, &keys, token, secret, verifier).await
}

#[cfg(test)]
mod tests {
    use super::*;

    // Worked example from the X developer documentation
    const URL: &str = "https://api.twitter.com/1.1/statuses/update.json?include_entities=true";
    const STATUS: &str = "Hello Ladies + Gentlemen, a signed OAuth request!";

    fn signer() -> OAuth1Signer<'static> {
        OAuth1Signer::new(
            "xvz1evFS4wEEPTGEFPHBog",
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
        )
        .with_token(
            "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
            "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
        )
    }

    #[test]
    fn test_signature_matches_documented_example() {
        let header = signer()
            .authorization_header_with(
                &Method::POST,
                URL,
                &[("status", STATUS)],
                &[],
                "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg",
                "1318622958",
            )
            .unwrap();
        assert!(header.starts_with("OAuth "));
        assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
    }

    #[test]
    fn test_percent_encoding_is_rfc3986() {
        assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(percent_encode("a-b._~"), "a-b._~");
    }

    #[test]
    fn test_normalized_url_drops_query_and_default_port() {
        let (base, query) = normalized_url("HTTPS://Example.com:443/r%20v?b=2&a=1").unwrap();
        assert_eq!(base, "https://example.com/r%20v");
        assert_eq!(query.len(), 2);
    }

    #[test]
    fn test_parse_form_response() {
        let values = parse_form_response(
            "oauth_token=abc&oauth_token_secret=def&user_nsid=12345%40N00\n",
        );
        assert_eq!(values.get("user_nsid").map(String::as_str), Some("12345@N00"));
    }
}
