// ABOUTME: OAuth handshake and profile commands for every connector family
// ABOUTME: Loads API keys from the environment, prints consent URLs, exchanges callbacks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use serde_json::{json, Value};
use socialgate::errors::AppResult;
use socialgate::models::{AuthorizationCallback, Credentials};
use socialgate::{ConnectorFamily, EcommerceFacade, MarketingFacade, SocialNetworks};
use tracing::info;

/// Callback parameters copied from the redirect URL by the user
pub struct Callback {
    pub code: Option<String>,
    pub code_verifier: Option<String>,
    pub oauth_token: Option<String>,
    pub oauth_verifier: Option<String>,
    pub request_token_secret: Option<String>,
    pub redirect_url: Option<String>,
    pub shop: Option<String>,
}

impl Callback {
    fn into_authorization(self) -> AuthorizationCallback {
        AuthorizationCallback {
            code: self.code,
            code_verifier: self.code_verifier,
            oauth_token: self.oauth_token,
            oauth_verifier: self.oauth_verifier,
            request_token_secret: self.request_token_secret,
            redirect_url: self.redirect_url,
            ..AuthorizationCallback::default()
        }
    }
}

/// Consent URL plus the state, verifier or request-token secret to keep
pub async fn authorization_url(
    family: ConnectorFamily,
    provider: &str,
    redirect_url: Option<&str>,
    shop: Option<&str>,
) -> AppResult<Value> {
    let request = match family {
        ConnectorFamily::Social => {
            let social = SocialNetworks::new();
            social.set_api_keys_from_env(provider).await?;
            social.request_authorization(provider, redirect_url).await?
        }
        ConnectorFamily::Ecommerce => {
            let shop_facade = EcommerceFacade::new();
            shop_facade.set_api_keys_from_env(provider).await?;
            if let Some(domain) = shop {
                shop_facade.set_store(provider, domain).await?;
            }
            shop_facade
                .request_authorization(provider, redirect_url)
                .await?
        }
        ConnectorFamily::Marketing => {
            let marketing = MarketingFacade::new();
            marketing.set_api_keys_from_env(provider).await?;
            marketing
                .request_authorization(provider, redirect_url)
                .await?
        }
    };
    info!("Open the URL, then run `exchange` with the callback parameters");
    Ok(serde_json::to_value(request)?)
}

/// Credentials for the callback parameters
pub async fn exchange(
    family: ConnectorFamily,
    provider: &str,
    callback: Callback,
) -> AppResult<Value> {
    let shop = callback.shop.clone();
    let callback = callback.into_authorization();
    let credentials = match family {
        ConnectorFamily::Social => {
            let social = SocialNetworks::new();
            social.set_api_keys_from_env(provider).await?;
            social.authorize(provider, callback).await?
        }
        ConnectorFamily::Ecommerce => {
            let shop_facade = EcommerceFacade::new();
            shop_facade.set_api_keys_from_env(provider).await?;
            if let Some(domain) = shop.as_deref() {
                shop_facade.set_store(provider, domain).await?;
            }
            shop_facade.authorize(provider, callback).await?
        }
        ConnectorFamily::Marketing => {
            let marketing = MarketingFacade::new();
            marketing.set_api_keys_from_env(provider).await?;
            marketing.authorize(provider, callback).await?
        }
    };
    Ok(serde_json::to_value(credentials)?)
}

/// Profile of `entity` using the given credentials
pub async fn profile(
    family: ConnectorFamily,
    provider: &str,
    entity: &str,
    shop: Option<&str>,
    credentials: Credentials,
) -> AppResult<Value> {
    let profile = match family {
        ConnectorFamily::Social => {
            let social = SocialNetworks::new();
            social.set_access_token(provider, credentials).await?;
            social.get_profile(provider, entity).await?
        }
        ConnectorFamily::Ecommerce => {
            let shop_facade = EcommerceFacade::new();
            if let Some(domain) = shop {
                shop_facade.set_store(provider, domain).await?;
            }
            shop_facade.set_access_token(provider, credentials).await?;
            shop_facade.get_profile(provider, entity).await?
        }
        ConnectorFamily::Marketing => {
            let marketing = MarketingFacade::new();
            marketing.set_access_token(provider, credentials).await?;
            marketing.get_profile(provider, entity).await?
        }
    };
    Ok(json!({ "profile": profile }))
}
