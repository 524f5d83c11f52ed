// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Provider identifiers, environment variable names, paging limits and OAuth literals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

//! Constants grouped by domain.
//!
//! For dynamic provider discovery prefer `ProviderRegistry::supported()` from
//! `socialgate-providers`; it respects cargo features.

/// Provider identifiers used as registry keys
pub mod providers {
    /// Facebook Graph API (social) and Marketing API (marketing)
    pub const FACEBOOK: &str = "facebook";
    /// Google, exposed through the YouTube Data API
    pub const GOOGLE: &str = "google";
    /// Alias accepted for the Google connector
    pub const YOUTUBE: &str = "youtube";
    /// Instagram Graph API
    pub const INSTAGRAM: &str = "instagram";
    /// Pinterest API v5
    pub const PINTEREST: &str = "pinterest";
    /// X (Twitter) API v2
    pub const TWITTER: &str = "twitter";
    /// Tumblr API v2 (OAuth 1.0a)
    pub const TUMBLR: &str = "tumblr";
    /// Flickr REST API (OAuth 1.0a)
    pub const FLICKR: &str = "flickr";
    /// Reddit OAuth API
    pub const REDDIT: &str = "reddit";
    /// `VKontakte` API
    pub const VKONTAKTE: &str = "vkontakte";
    /// Shopify Admin REST API
    pub const SHOPIFY: &str = "shopify";

    /// Canonical name for a possibly aliased provider name
    #[must_use]
    pub fn canonical(name: &str) -> String {
        let lower = name.trim().to_lowercase();
        match lower.as_str() {
            YOUTUBE => GOOGLE.to_owned(),
            "x" => TWITTER.to_owned(),
            "vk" => VKONTAKTE.to_owned(),
            _ => lower,
        }
    }
}

/// Environment variable names
pub mod env_config {
    /// Prefix for every per-provider variable: `SOCIALGATE_<PROVIDER>_<KEY>`
    pub const PROVIDER_PREFIX: &str = "SOCIALGATE";
    /// Overall HTTP request timeout in seconds
    pub const HTTP_TIMEOUT_SECS: &str = "SOCIALGATE_HTTP_TIMEOUT_SECS";
    /// HTTP connect timeout in seconds
    pub const HTTP_CONNECT_TIMEOUT_SECS: &str = "SOCIALGATE_HTTP_CONNECT_TIMEOUT_SECS";
    /// User-Agent sent to vendors that require one
    pub const USER_AGENT: &str = "SOCIALGATE_USER_AGENT";
}

/// Default limits
pub mod limits {
    /// Default page size when the caller does not ask for one
    pub const DEFAULT_PAGE_SIZE: u32 = 25;
    /// Upper bound on any single page request
    pub const MAX_PAGE_SIZE: u32 = 100;
    /// Upper bound on pages fetched by one `collect_pages` run
    pub const MAX_PAGES: usize = 1000;
    /// Host suffix of every Shopify store
    pub const SHOPIFY_DOMAIN_SUFFIX: &str = ".myshopify.com";
    /// Default overall HTTP timeout
    pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
    /// Default HTTP connect timeout
    pub const DEFAULT_HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
    /// Minutes before expiry at which a token is refreshed
    pub const TOKEN_REFRESH_MARGIN_MINUTES: i64 = 5;
}

/// OAuth literals
pub mod oauth {
    /// Length of generated `state` values
    pub const STATE_LENGTH: usize = 32;
    /// Length of PKCE code verifiers
    pub const PKCE_VERIFIER_LENGTH: usize = 64;
    /// PKCE challenge method
    pub const PKCE_METHOD: &str = "S256";
    /// OAuth 1.0a signature method
    pub const OAUTH1_SIGNATURE_METHOD: &str = "HMAC-SHA1";
    /// OAuth 1.0a protocol version
    pub const OAUTH1_VERSION: &str = "1.0";
    /// Out-of-band callback used when no redirect URL is configured
    pub const OAUTH1_OOB: &str = "oob";
}

/// Default `User-Agent` header
pub const DEFAULT_USER_AGENT: &str = concat!("socialgate/", env!("CARGO_PKG_VERSION"));
