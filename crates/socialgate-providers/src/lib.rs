// ABOUTME: Connector implementations for ten social networks, Shopify and the Facebook Marketing API
// ABOUTME: Connector traits, OAuth helpers, provider registry, and paginated export streaming
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

#![deny(unsafe_code)]

//! Vendor connector implementations and core abstractions.
//!
//! This crate provides the unified connector system for the social networks
//! (Facebook, YouTube, Instagram, Pinterest, X, Tumblr, Flickr, Reddit,
//! `VKontakte`), Shopify and the Facebook Marketing API.

// Re-export socialgate-core modules so connectors can `use crate::errors::*` etc.
pub use socialgate_core::config;
pub use socialgate_core::constants;
pub use socialgate_core::errors;
pub use socialgate_core::models;
pub use socialgate_core::validation;

// Core connector infrastructure
/// Request execution and vendor error mapping
pub mod api;
/// Core connector traits and per-instance credential state
pub mod core;
/// Shared HTTP client for vendor API calls
pub mod http_client;
/// OAuth 1.0a request signing and token flow
pub mod oauth1;
/// OAuth 2.0 authorization-code flow
pub mod oauth2;
/// Page loop and lazy export streaming
pub mod pagination;
/// Shared Graph API plumbing
#[cfg(any(
    feature = "provider-facebook",
    feature = "provider-instagram",
    feature = "provider-facebook-marketing"
))]
pub mod graph;
/// Provider registry
pub mod registry;
/// Service Provider Interface for connector registration
pub mod spi;

// Connector implementations (conditionally compiled)

/// Facebook Graph API connector
#[cfg(feature = "provider-facebook")]
pub mod facebook;
/// Facebook Marketing API connector
#[cfg(feature = "provider-facebook-marketing")]
pub mod facebook_marketing;
/// Flickr REST API connector (OAuth 1.0a)
#[cfg(feature = "provider-flickr")]
pub mod flickr;
/// Google connector backed by the YouTube Data API
#[cfg(feature = "provider-google")]
pub mod google;
/// Instagram Graph API connector
#[cfg(feature = "provider-instagram")]
pub mod instagram;
/// Pinterest API v5 connector
#[cfg(feature = "provider-pinterest")]
pub mod pinterest;
/// Reddit OAuth API connector
#[cfg(feature = "provider-reddit")]
pub mod reddit;
/// Shopify Admin REST API connector
#[cfg(feature = "provider-shopify")]
pub mod shopify;
/// Tumblr API v2 connector (OAuth 1.0a)
#[cfg(feature = "provider-tumblr")]
pub mod tumblr;
/// X (Twitter) API v2 connector
#[cfg(feature = "provider-twitter")]
pub mod twitter;
/// `VKontakte` API connector
#[cfg(feature = "provider-vkontakte")]
pub mod vkontakte;

// Re-export key types for convenience

pub use crate::core::{Connector, ConnectorState, Ecommerce, Marketing, ProviderConfig, SocialNetwork};
pub use http_client::{initialize_shared_client, shared_client, HttpClientConfig};
pub use pagination::{collect_pages, export_stream, ExportStream};
pub use registry::{global_registry, ProviderRegistry};
pub use socialgate_core::errors::provider::{ProviderError, ProviderResult};
pub use spi::{
    AuthScheme, ConnectorFactory, ConnectorFamily, OAuthEndpoints, ProviderBundle,
    ProviderCapabilities, ProviderDescriptor,
};
#[cfg(feature = "provider-facebook")]
pub use spi::FacebookDescriptor;
#[cfg(feature = "provider-facebook-marketing")]
pub use spi::FacebookMarketingDescriptor;
#[cfg(feature = "provider-flickr")]
pub use spi::FlickrDescriptor;
#[cfg(feature = "provider-google")]
pub use spi::GoogleDescriptor;
#[cfg(feature = "provider-instagram")]
pub use spi::InstagramDescriptor;
#[cfg(feature = "provider-pinterest")]
pub use spi::PinterestDescriptor;
#[cfg(feature = "provider-reddit")]
pub use spi::RedditDescriptor;
#[cfg(feature = "provider-shopify")]
pub use spi::ShopifyDescriptor;
#[cfg(feature = "provider-tumblr")]
pub use spi::TumblrDescriptor;
#[cfg(feature = "provider-twitter")]
pub use spi::TwitterDescriptor;
#[cfg(feature = "provider-vkontakte")]
pub use spi::VkontakteDescriptor;
