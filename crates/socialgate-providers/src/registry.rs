// ABOUTME: Provider registry mapping (family, name) to connector factories and descriptors
// ABOUTME: Handles connector instantiation, env-based configuration, and lookup with proper error handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use tracing::{debug, info};

use crate::config::{load_provider_env_config, ProviderEnvDefaults};
use crate::constants::env_config::PROVIDER_PREFIX;
use crate::constants::providers::canonical;
use crate::core::{Ecommerce, Marketing, ProviderConfig, SocialNetwork};
use crate::errors::{AppError, AppResult};
use crate::models::ApiKeys;
use crate::spi::{
    ConnectorFactory, ConnectorFamily, ProviderBundle, ProviderCapabilities, ProviderDescriptor,
};

// Conditional imports for provider-specific types
#[cfg(feature = "provider-facebook")]
use crate::facebook;
#[cfg(feature = "provider-facebook-marketing")]
use crate::facebook_marketing;
#[cfg(feature = "provider-flickr")]
use crate::flickr;
#[cfg(feature = "provider-google")]
use crate::google;
#[cfg(feature = "provider-instagram")]
use crate::instagram;
#[cfg(feature = "provider-pinterest")]
use crate::pinterest;
#[cfg(feature = "provider-reddit")]
use crate::reddit;
#[cfg(feature = "provider-shopify")]
use crate::shopify;
#[cfg(feature = "provider-facebook")]
use crate::spi::FacebookDescriptor;
#[cfg(feature = "provider-facebook-marketing")]
use crate::spi::FacebookMarketingDescriptor;
#[cfg(feature = "provider-flickr")]
use crate::spi::FlickrDescriptor;
#[cfg(feature = "provider-google")]
use crate::spi::GoogleDescriptor;
#[cfg(feature = "provider-instagram")]
use crate::spi::InstagramDescriptor;
#[cfg(feature = "provider-pinterest")]
use crate::spi::PinterestDescriptor;
#[cfg(feature = "provider-reddit")]
use crate::spi::RedditDescriptor;
#[cfg(feature = "provider-shopify")]
use crate::spi::ShopifyDescriptor;
#[cfg(feature = "provider-tumblr")]
use crate::spi::TumblrDescriptor;
#[cfg(feature = "provider-twitter")]
use crate::spi::TwitterDescriptor;
#[cfg(feature = "provider-vkontakte")]
use crate::spi::VkontakteDescriptor;
#[cfg(feature = "provider-tumblr")]
use crate::tumblr;
#[cfg(feature = "provider-twitter")]
use crate::twitter;
#[cfg(feature = "provider-vkontakte")]
use crate::vkontakte;

type ProviderKey = (ConnectorFamily, String);

fn key(family: ConnectorFamily, provider_name: &str) -> ProviderKey {
    (family, canonical(provider_name))
}

/// Registry of every connector this build knows about
///
/// Holds factories, descriptors and default configurations only. Connector
/// instances, and with them user credentials, are created on demand and owned
/// by the caller.
pub struct ProviderRegistry {
    factories: HashMap<ProviderKey, ConnectorFactory>,
    default_configs: HashMap<ProviderKey, ProviderConfig>,
    descriptors: HashMap<ProviderKey, Box<dyn ProviderDescriptor>>,
}

impl ProviderRegistry {
    /// Create a new provider registry with every enabled connector
    ///
    /// Endpoints are configured from environment variables with fallback to
    /// the descriptor defaults. See `load_provider_env_config()` for the
    /// variable format.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::empty();

        // Register all enabled providers
        Self::register_facebook(&mut registry);
        Self::register_google(&mut registry);
        Self::register_instagram(&mut registry);
        Self::register_pinterest(&mut registry);
        Self::register_twitter(&mut registry);
        Self::register_tumblr(&mut registry);
        Self::register_flickr(&mut registry);
        Self::register_reddit(&mut registry);
        Self::register_vkontakte(&mut registry);
        Self::register_shopify(&mut registry);
        Self::register_facebook_marketing(&mut registry);

        // Log registered providers at startup
        let providers = registry
            .supported_providers()
            .iter()
            .map(|(family, name)| format!("{family}:{name}"))
            .collect::<Vec<_>>()
            .join(", ");
        info!(
            "Provider registry initialized with {} provider(s): [{providers}]",
            registry.factories.len()
        );

        registry
    }

    /// Registry without any connector
    #[must_use]
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
            default_configs: HashMap::new(),
            descriptors: HashMap::new(),
        }
    }

    /// Register a built-in connector, applying environment overrides to its endpoints
    fn register_builtin(&mut self, descriptor: Box<dyn ProviderDescriptor>, factory: ConnectorFactory) {
        let mut config = descriptor.to_config();
        let scopes: Vec<&str> = descriptor.default_scopes().to_vec();
        let env = load_provider_env_config(
            descriptor.name(),
            ProviderEnvDefaults {
                auth_url: &config.auth_url,
                token_url: &config.token_url,
                api_base_url: &config.api_base_url,
                revoke_url: config.revoke_url.as_deref(),
                scopes: &scopes,
            },
        );
        config.auth_url = env.auth_url;
        config.token_url = env.token_url;
        config.api_base_url = env.api_base_url;
        config.revoke_url = env.revoke_url;
        config.default_scopes = env.scopes;

        let key = key(descriptor.family(), descriptor.name());
        self.factories.insert(key.clone(), factory);
        self.default_configs.insert(key.clone(), config);
        self.descriptors.insert(key, descriptor);
    }

    /// Register Facebook (Graph API) connector
    #[cfg(feature = "provider-facebook")]
    fn register_facebook(registry: &mut Self) {
        registry.register_builtin(
            Box::new(FacebookDescriptor),
            ConnectorFactory::Social(facebook::create_connector),
        );
    }

    #[cfg(not(feature = "provider-facebook"))]
    fn register_facebook(_registry: &mut Self) {}

    /// Register Google (YouTube) connector
    #[cfg(feature = "provider-google")]
    fn register_google(registry: &mut Self) {
        registry.register_builtin(
            Box::new(GoogleDescriptor),
            ConnectorFactory::Social(google::create_connector),
        );
    }

    #[cfg(not(feature = "provider-google"))]
    fn register_google(_registry: &mut Self) {}

    /// Register Instagram connector
    #[cfg(feature = "provider-instagram")]
    fn register_instagram(registry: &mut Self) {
        registry.register_builtin(
            Box::new(InstagramDescriptor),
            ConnectorFactory::Social(instagram::create_connector),
        );
    }

    #[cfg(not(feature = "provider-instagram"))]
    fn register_instagram(_registry: &mut Self) {}

    /// Register Pinterest connector
    #[cfg(feature = "provider-pinterest")]
    fn register_pinterest(registry: &mut Self) {
        registry.register_builtin(
            Box::new(PinterestDescriptor),
            ConnectorFactory::Social(pinterest::create_connector),
        );
    }

    #[cfg(not(feature = "provider-pinterest"))]
    fn register_pinterest(_registry: &mut Self) {}

    /// Register X (Twitter) connector
    #[cfg(feature = "provider-twitter")]
    fn register_twitter(registry: &mut Self) {
        registry.register_builtin(
            Box::new(TwitterDescriptor),
            ConnectorFactory::Social(twitter::create_connector),
        );
    }

    #[cfg(not(feature = "provider-twitter"))]
    fn register_twitter(_registry: &mut Self) {}

    /// Register Tumblr connector
    #[cfg(feature = "provider-tumblr")]
    fn register_tumblr(registry: &mut Self) {
        registry.register_builtin(
            Box::new(TumblrDescriptor),
            ConnectorFactory::Social(tumblr::create_connector),
        );
    }

    #[cfg(not(feature = "provider-tumblr"))]
    fn register_tumblr(_registry: &mut Self) {}

    /// Register Flickr connector
    #[cfg(feature = "provider-flickr")]
    fn register_flickr(registry: &mut Self) {
        registry.register_builtin(
            Box::new(FlickrDescriptor),
            ConnectorFactory::Social(flickr::create_connector),
        );
    }

    #[cfg(not(feature = "provider-flickr"))]
    fn register_flickr(_registry: &mut Self) {}

    /// Register Reddit connector
    #[cfg(feature = "provider-reddit")]
    fn register_reddit(registry: &mut Self) {
        registry.register_builtin(
            Box::new(RedditDescriptor),
            ConnectorFactory::Social(reddit::create_connector),
        );
    }

    #[cfg(not(feature = "provider-reddit"))]
    fn register_reddit(_registry: &mut Self) {}

    /// Register `VKontakte` connector
    #[cfg(feature = "provider-vkontakte")]
    fn register_vkontakte(registry: &mut Self) {
        registry.register_builtin(
            Box::new(VkontakteDescriptor),
            ConnectorFactory::Social(vkontakte::create_connector),
        );
    }

    #[cfg(not(feature = "provider-vkontakte"))]
    fn register_vkontakte(_registry: &mut Self) {}

    /// Register Shopify connector
    #[cfg(feature = "provider-shopify")]
    fn register_shopify(registry: &mut Self) {
        registry.register_builtin(
            Box::new(ShopifyDescriptor),
            ConnectorFactory::Ecommerce(shopify::create_connector),
        );
    }

    #[cfg(not(feature = "provider-shopify"))]
    fn register_shopify(_registry: &mut Self) {}

    /// Register Facebook Marketing connector
    #[cfg(feature = "provider-facebook-marketing")]
    fn register_facebook_marketing(registry: &mut Self) {
        registry.register_builtin(
            Box::new(FacebookMarketingDescriptor),
            ConnectorFactory::Marketing(facebook_marketing::create_connector),
        );
    }

    #[cfg(not(feature = "provider-facebook-marketing"))]
    fn register_facebook_marketing(_registry: &mut Self) {}

    /// Register a complete provider bundle (factory + descriptor + config)
    ///
    /// # Errors
    ///
    /// `ConfigInvalid` when the factory builds connectors of a different
    /// family than the descriptor declares
    pub fn register_provider_bundle(&mut self, bundle: ProviderBundle) -> AppResult<()> {
        let family = bundle.descriptor.family();
        if bundle.factory.family() != family {
            return Err(AppError::config(format!(
                "Provider bundle '{}' declares family {family} but its factory builds {} connectors",
                bundle.name(),
                bundle.factory.family()
            )));
        }

        let name = bundle.name();
        let key = key(family, name);
        self.factories.insert(key.clone(), bundle.factory);
        self.default_configs
            .insert(key.clone(), bundle.descriptor.to_config());
        self.descriptors.insert(key, bundle.descriptor);

        info!("Registered external provider: {family}:{name}");
        Ok(())
    }

    /// Replace the default configuration of a registered provider
    ///
    /// # Errors
    ///
    /// `UnknownProvider` when nothing is registered under that name
    pub fn set_default_config(
        &mut self,
        family: ConnectorFamily,
        provider_name: &str,
        config: ProviderConfig,
    ) -> AppResult<()> {
        let key = key(family, provider_name);
        if !self.factories.contains_key(&key) {
            return Err(AppError::unknown_provider(provider_name));
        }
        self.default_configs.insert(key, config);
        Ok(())
    }

    /// Every registered (family, name) pair, sorted
    #[must_use]
    pub fn supported_providers(&self) -> Vec<(ConnectorFamily, &'static str)> {
        let mut providers: Vec<_> = self
            .descriptors
            .values()
            .map(|d| (d.family(), d.name()))
            .collect();
        providers.sort_unstable();
        providers
    }

    /// Names registered for a family, sorted
    #[must_use]
    pub fn supported(&self, family: ConnectorFamily) -> Vec<&'static str> {
        self.supported_providers()
            .into_iter()
            .filter(|(f, _)| *f == family)
            .map(|(_, name)| name)
            .collect()
    }

    /// Check if a provider is supported (case-insensitive, aliases accepted)
    #[must_use]
    pub fn is_supported(&self, family: ConnectorFamily, provider_name: &str) -> bool {
        self.factories.contains_key(&key(family, provider_name))
    }

    /// Get provider descriptor
    #[must_use]
    pub fn descriptor(
        &self,
        family: ConnectorFamily,
        provider_name: &str,
    ) -> Option<&dyn ProviderDescriptor> {
        self.descriptors
            .get(&key(family, provider_name))
            .map(AsRef::as_ref)
    }

    /// Get provider capabilities
    #[must_use]
    pub fn capabilities(
        &self,
        family: ConnectorFamily,
        provider_name: &str,
    ) -> Option<ProviderCapabilities> {
        self.descriptor(family, provider_name)
            .map(|d| d.capabilities())
    }

    /// Default configuration, after environment overrides
    #[must_use]
    pub fn default_config(
        &self,
        family: ConnectorFamily,
        provider_name: &str,
    ) -> Option<&ProviderConfig> {
        self.default_configs.get(&key(family, provider_name))
    }

    fn lookup(
        &self,
        family: ConnectorFamily,
        provider_name: &str,
    ) -> AppResult<(ConnectorFactory, ProviderConfig)> {
        let key = key(family, provider_name);
        let factory = self
            .factories
            .get(&key)
            .copied()
            .ok_or_else(|| AppError::unknown_provider(provider_name))?;
        let config = self
            .default_configs
            .get(&key)
            .cloned() // Safe: each connector owns its config
            .ok_or_else(|| {
                AppError::config(format!(
                    "No default configuration for provider: {provider_name}"
                ))
            })?;
        Ok((factory, config))
    }

    /// Create a social network connector with default configuration
    ///
    /// # Errors
    ///
    /// `UnknownProvider` if no social connector is registered under that name
    pub fn create_social(&self, provider_name: &str) -> AppResult<Arc<dyn SocialNetwork>> {
        let (_, config) = self.lookup(ConnectorFamily::Social, provider_name)?;
        self.create_social_with_config(provider_name, config)
    }

    /// Create a social network connector with custom configuration
    ///
    /// # Errors
    ///
    /// `UnknownProvider` if no social connector is registered under that name
    pub fn create_social_with_config(
        &self,
        provider_name: &str,
        config: ProviderConfig,
    ) -> AppResult<Arc<dyn SocialNetwork>> {
        match self.factories.get(&key(ConnectorFamily::Social, provider_name)) {
            Some(ConnectorFactory::Social(create)) => {
                debug!("Creating social connector {provider_name}");
                Ok(create(config))
            }
            _ => Err(AppError::unknown_provider(provider_name)),
        }
    }

    /// Create an e-commerce connector with default configuration
    ///
    /// # Errors
    ///
    /// `UnknownProvider` if no e-commerce connector is registered under that name
    pub fn create_ecommerce(&self, provider_name: &str) -> AppResult<Arc<dyn Ecommerce>> {
        let (_, config) = self.lookup(ConnectorFamily::Ecommerce, provider_name)?;
        self.create_ecommerce_with_config(provider_name, config)
    }

    /// Create an e-commerce connector with custom configuration
    ///
    /// # Errors
    ///
    /// `UnknownProvider` if no e-commerce connector is registered under that name
    pub fn create_ecommerce_with_config(
        &self,
        provider_name: &str,
        config: ProviderConfig,
    ) -> AppResult<Arc<dyn Ecommerce>> {
        match self
            .factories
            .get(&key(ConnectorFamily::Ecommerce, provider_name))
        {
            Some(ConnectorFactory::Ecommerce(create)) => {
                debug!("Creating e-commerce connector {provider_name}");
                Ok(create(config))
            }
            _ => Err(AppError::unknown_provider(provider_name)),
        }
    }

    /// Create a marketing connector with default configuration
    ///
    /// # Errors
    ///
    /// `UnknownProvider` if no marketing connector is registered under that name
    pub fn create_marketing(&self, provider_name: &str) -> AppResult<Arc<dyn Marketing>> {
        let (_, config) = self.lookup(ConnectorFamily::Marketing, provider_name)?;
        self.create_marketing_with_config(provider_name, config)
    }

    /// Create a marketing connector with custom configuration
    ///
    /// # Errors
    ///
    /// `UnknownProvider` if no marketing connector is registered under that name
    pub fn create_marketing_with_config(
        &self,
        provider_name: &str,
        config: ProviderConfig,
    ) -> AppResult<Arc<dyn Marketing>> {
        match self
            .factories
            .get(&key(ConnectorFamily::Marketing, provider_name))
        {
            Some(ConnectorFactory::Marketing(create)) => {
                debug!("Creating marketing connector {provider_name}");
                Ok(create(config))
            }
            _ => Err(AppError::unknown_provider(provider_name)),
        }
    }

    /// Application keys for a provider from `SOCIALGATE_<PROVIDER>_CLIENT_ID`,
    /// `_CLIENT_SECRET` and `_REDIRECT_URL`
    ///
    /// # Errors
    ///
    /// `UnknownProvider` for an unregistered name, `ConfigMissing` when the
    /// client id or secret is not set
    pub fn api_keys_from_env(
        &self,
        family: ConnectorFamily,
        provider_name: &str,
    ) -> AppResult<ApiKeys> {
        let (_, config) = self.lookup(family, provider_name)?;
        let scopes: Vec<&str> = config.default_scopes.iter().map(String::as_str).collect();
        let env = load_provider_env_config(
            &config.name,
            ProviderEnvDefaults {
                auth_url: &config.auth_url,
                token_url: &config.token_url,
                api_base_url: &config.api_base_url,
                revoke_url: config.revoke_url.as_deref(),
                scopes: &scopes,
            },
        );

        let upper = config.name.to_uppercase();
        let client_id = env
            .client_id
            .ok_or_else(|| AppError::config_missing(format!("{PROVIDER_PREFIX}_{upper}_CLIENT_ID")))?;
        let client_secret = env.client_secret.ok_or_else(|| {
            AppError::config_missing(format!("{PROVIDER_PREFIX}_{upper}_CLIENT_SECRET"))
        })?;

        let mut keys = ApiKeys::new(client_id, client_secret).with_scopes(env.scopes);
        keys.redirect_url = env.redirect_url;
        Ok(keys)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global registry instance
static REGISTRY: OnceLock<Arc<ProviderRegistry>> = OnceLock::new();

/// Get the process-wide provider registry
///
/// Initialized on first use from the environment. Holds factories only.
#[must_use]
pub fn global_registry() -> Arc<ProviderRegistry> {
    // Safe: Arc clone for global registry singleton access
    REGISTRY
        .get_or_init(|| Arc::new(ProviderRegistry::new()))
        .clone()
}

/// Create a registry with built-in connectors plus external bundles
///
/// # Errors
///
/// Propagates bundle registration errors
pub fn create_registry_with_external_providers(
    bundles: Vec<ProviderBundle>,
) -> AppResult<ProviderRegistry> {
    let mut registry = ProviderRegistry::new();
    for bundle in bundles {
        registry.register_provider_bundle(bundle)?;
    }
    Ok(registry)
}
