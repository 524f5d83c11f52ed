// ABOUTME: Socialgate library entry point with the social, e-commerce and marketing facades
// ABOUTME: Re-exports the connector workspace crates and wires configuration and logging
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

#![deny(unsafe_code)]

//! # Socialgate
//!
//! One interface over the public APIs of Facebook, YouTube, Instagram,
//! Pinterest, X, Tumblr, Flickr, Reddit, `VKontakte`, Shopify and the
//! Facebook Marketing API.
//!
//! Three facades pick the vendor by name at runtime and forward each call to
//! a connector owned by the facade instance:
//!
//! - [`SocialNetworks`]: authorization, profiles, posting, media upload and
//!   paginated exports
//! - [`EcommerceFacade`]: Shopify stores, products, collections and orders
//! - [`MarketingFacade`]: ad accounts, campaigns and custom audiences
//!
//! Credentials live inside the connectors of one facade. Create one facade
//! per user session; the provider registry behind them is shared and holds
//! no credentials.
//!
//! ## Example
//!
//! ```rust,no_run
//! use socialgate::models::{Credentials, PostRequest};
//! use socialgate::errors::AppResult;
//! use socialgate::SocialNetworks;
//!
//! # async fn run() -> AppResult<()> {
//! let social = SocialNetworks::new();
//! social
//!     .set_access_token("twitter", Credentials::new("user-access-token"))
//!     .await?;
//! let result = social
//!     .post("twitter", PostRequest::message("Hello from socialgate"))
//!     .await?;
//! println!("posted {}", result.id);
//! # Ok(())
//! # }
//! ```

/// Application configuration from the environment
pub mod config;
/// Provider-name dispatching facades
pub mod facades;
/// Tracing subscriber setup
pub mod logging;

pub use facades::{EcommerceFacade, MarketingFacade, SocialNetworks};
pub use socialgate_core::{constants, errors, models, pagination, validation};
pub use socialgate_providers as providers;
pub use socialgate_providers::{
    ConnectorFamily, ProviderCapabilities, ProviderConfig, ProviderRegistry,
};
