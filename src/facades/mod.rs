// ABOUTME: Provider-name dispatching facades and the per-instance connector session map
// ABOUTME: Shared authorization lifecycle forwarding for the social, e-commerce and marketing facades
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

//! Facades resolving a provider name to a connector and forwarding calls.
//!
//! Each facade instance owns its connectors, so two facades never share
//! credentials. The registry behind them is shared and only builds
//! connectors.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::constants::providers::canonical;
use crate::errors::AppResult;

/// Shopify and other store platforms
pub mod ecommerce;
/// Facebook Marketing API
pub mod marketing;
/// Social networks
pub mod social_networks;

pub use ecommerce::EcommerceFacade;
pub use marketing::{MarketingExport, MarketingFacade};
pub use social_networks::SocialNetworks;

/// Connectors created by one facade, keyed by canonical provider name
pub(crate) struct Sessions<C: ?Sized> {
    connectors: RwLock<HashMap<String, Arc<C>>>,
}

impl<C: ?Sized> Default for Sessions<C> {
    fn default() -> Self {
        Self {
            connectors: RwLock::new(HashMap::new()),
        }
    }
}

impl<C: ?Sized + Send + Sync> Sessions<C> {
    /// Session connector for `provider`, created by `create` on first use
    pub(crate) async fn get_or_create<F>(&self, provider: &str, create: F) -> AppResult<Arc<C>>
    where
        F: FnOnce(&str) -> AppResult<Arc<C>> + Send,
    {
        let key = canonical(provider);
        let existing = self.connectors.read().await.get(&key).cloned();
        if let Some(connector) = existing {
            return Ok(connector);
        }

        let mut connectors = self.connectors.write().await;
        // Another task may have created it between the two locks
        if let Some(connector) = connectors.get(&key) {
            return Ok(Arc::clone(connector));
        }
        let connector = create(&key)?;
        connectors.insert(key, Arc::clone(&connector));
        Ok(connector)
    }

    /// Replace the session connector for `provider`
    pub(crate) async fn insert(&self, provider: &str, connector: Arc<C>) {
        self.connectors
            .write()
            .await
            .insert(canonical(provider), connector);
    }

    /// Drop the session connector for `provider`
    pub(crate) async fn remove(&self, provider: &str) -> bool {
        self.connectors
            .write()
            .await
            .remove(&canonical(provider))
            .is_some()
    }

    /// Canonical names with a live connector, sorted
    pub(crate) async fn active(&self) -> Vec<String> {
        let mut names: Vec<String> = self.connectors.read().await.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

/// Authorization lifecycle shared by every facade
///
/// Expands inside an `impl` block of a facade that has a `registry` field,
/// a `sessions` field, a `FAMILY` constant and an async `connector(provider)`
/// method. The expansion site imports `Connector`, `ApiKeys`,
/// `AuthorizationCallback`, `AuthorizationRequest`, `Credentials`, `Profile`,
/// `ProviderCapabilities`, `AppError` and `AppResult`.
macro_rules! auth_lifecycle {
    () => {
        /// Provider names of this family, sorted
        #[must_use]
        pub fn supported(&self) -> Vec<&'static str> {
            self.registry.supported(Self::FAMILY)
        }

        /// Check if `provider` is registered for this family
        #[must_use]
        pub fn is_supported(&self, provider: &str) -> bool {
            self.registry.is_supported(Self::FAMILY, provider)
        }

        /// Capabilities of `provider`
        ///
        /// # Errors
        ///
        /// `UnknownProvider` when nothing is registered under that name
        pub fn capabilities(&self, provider: &str) -> AppResult<ProviderCapabilities> {
            self.registry
                .capabilities(Self::FAMILY, provider)
                .ok_or_else(|| AppError::unknown_provider(provider))
        }

        /// Store the application keys of `provider`
        ///
        /// # Errors
        ///
        /// `UnknownProvider`, or `MissingRequiredField` for a blank id or secret
        pub async fn set_api_keys(&self, provider: &str, keys: ApiKeys) -> AppResult<()> {
            self.connector(provider).await?.set_api_keys(keys).await
        }

        /// Load the application keys of `provider` from `SOCIALGATE_<PROVIDER>_*`
        ///
        /// # Errors
        ///
        /// `UnknownProvider`, or `ConfigMissing` naming the absent variable
        pub async fn set_api_keys_from_env(&self, provider: &str) -> AppResult<()> {
            let keys = self.registry.api_keys_from_env(Self::FAMILY, provider)?;
            self.set_api_keys(provider, keys).await
        }

        /// Build the vendor consent URL
        ///
        /// Keep the returned request: PKCE verifiers and OAuth 1.0a request
        /// token secrets must come back with the callback.
        ///
        /// # Errors
        ///
        /// `UnknownProvider`, missing API keys, or a failed request-token call
        pub async fn request_authorization(
            &self,
            provider: &str,
            redirect_url: Option<&str>,
        ) -> AppResult<AuthorizationRequest> {
            self.connector(provider)
                .await?
                .request_authorization(redirect_url)
                .await
        }

        /// Exchange the vendor callback for credentials kept by this facade
        ///
        /// # Errors
        ///
        /// `AuthInvalid` on a state mismatch, `MissingRequiredField` without a
        /// code or verifier, or a vendor error from the token endpoint
        pub async fn authorize(
            &self,
            provider: &str,
            callback: AuthorizationCallback,
        ) -> AppResult<Credentials> {
            self.connector(provider).await?.authorize(callback).await
        }

        /// Use credentials obtained elsewhere
        ///
        /// # Errors
        ///
        /// `UnknownProvider`, or `MissingRequiredField` for a blank token
        pub async fn set_access_token(
            &self,
            provider: &str,
            credentials: Credentials,
        ) -> AppResult<()> {
            self.connector(provider)
                .await?
                .set_access_token(credentials)
                .await
        }

        /// Prove the stored credentials work
        ///
        /// # Errors
        ///
        /// `AuthRequired` without credentials, or the vendor error
        pub async fn check_credentials(&self, provider: &str) -> AppResult<Profile> {
            self.connector(provider).await?.check_credentials().await
        }

        /// Profile of `"me"` or of a vendor id or handle
        ///
        /// # Errors
        ///
        /// `AuthRequired` without credentials, or the vendor error
        pub async fn get_profile(&self, provider: &str, entity: &str) -> AppResult<Profile> {
            self.connector(provider).await?.get_profile(entity).await
        }

        /// Whether this facade holds credentials for `provider`
        ///
        /// # Errors
        ///
        /// `UnknownProvider`
        pub async fn is_authenticated(&self, provider: &str) -> AppResult<bool> {
            Ok(self.connector(provider).await?.is_authenticated().await)
        }

        /// Refresh the access token of `provider` when it is about to expire
        ///
        /// # Errors
        ///
        /// Token endpoint failures
        pub async fn refresh_token_if_needed(&self, provider: &str) -> AppResult<()> {
            self.connector(provider)
                .await?
                .refresh_token_if_needed()
                .await
        }

        /// Revoke and forget the credentials of `provider`
        ///
        /// # Errors
        ///
        /// `UnknownProvider`
        pub async fn disconnect(&self, provider: &str) -> AppResult<()> {
            self.connector(provider).await?.disconnect().await
        }

        /// Drop the session connector of `provider` with its keys and credentials
        pub async fn reset(&self, provider: &str) -> bool {
            self.sessions.remove(provider).await
        }

        /// Providers with a session connector
        pub async fn active_providers(&self) -> Vec<String> {
            self.sessions.active().await
        }
    };
}

pub(crate) use auth_lifecycle;
