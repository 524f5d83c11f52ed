// ABOUTME: Socialgate CLI - command-line access to the social, e-commerce and marketing facades
// ABOUTME: Lists providers, runs the OAuth handshake, and posts or exports with JSON on stdout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors
//!
//! Usage:
//! ```bash
//! # Providers compiled into this build
//! socialgate-cli providers --family social
//!
//! # Consent URL (keys from SOCIALGATE_TWITTER_CLIENT_ID / _CLIENT_SECRET)
//! socialgate-cli auth-url twitter --redirect-url https://example.com/callback
//!
//! # Exchange the callback code, repeating the verifier printed by auth-url
//! socialgate-cli exchange twitter --code abc --code-verifier xyz
//!
//! # Profile, post and export with an access token
//! socialgate-cli profile reddit --access-token "$TOKEN"
//! socialgate-cli post tumblr --access-token "$TOKEN" --access-token-secret "$SECRET" --message "Hello"
//! socialgate-cli export youtube collections --access-token "$TOKEN" --all
//!
//! # Shopify catalog
//! socialgate-cli products --shop demo.myshopify.com --access-token "$TOKEN"
//! ```

mod commands;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use socialgate::config::AppConfig;
use socialgate::errors::AppResult;
use socialgate::models::{Credentials, ExportTarget};
use socialgate::providers::initialize_shared_client;
use socialgate::ConnectorFamily;
use tracing::debug;

type Result<T> = AppResult<T>;

#[derive(Parser)]
#[command(
    name = "socialgate-cli",
    about = "Socialgate command-line client",
    long_about = "Authorize against social networks, Shopify and the Facebook Marketing API, then post and export through one interface.",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

/// Connector family selector
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum Family {
    #[default]
    Social,
    Ecommerce,
    Marketing,
}

impl From<Family> for ConnectorFamily {
    fn from(family: Family) -> Self {
        match family {
            Family::Social => Self::Social,
            Family::Ecommerce => Self::Ecommerce,
            Family::Marketing => Self::Marketing,
        }
    }
}

/// Credentials for commands calling the vendor API
#[derive(Args)]
struct TokenArgs {
    /// OAuth access token
    #[arg(long, env = "SOCIALGATE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: String,

    /// OAuth 1.0a token secret (Tumblr, Flickr)
    #[arg(long, env = "SOCIALGATE_ACCESS_TOKEN_SECRET", hide_env_values = true)]
    access_token_secret: Option<String>,
}

impl TokenArgs {
    fn into_credentials(self) -> Credentials {
        let credentials = Credentials::new(self.access_token);
        match self.access_token_secret {
            Some(secret) => credentials.with_secret(secret),
            None => credentials,
        }
    }
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// List the providers compiled into this build
    Providers {
        /// Only this family
        #[arg(long, value_enum)]
        family: Option<Family>,
    },

    /// Print the consent URL and the state to keep until the callback
    AuthUrl {
        /// Provider name
        provider: String,

        /// Connector family
        #[arg(long, value_enum, default_value_t)]
        family: Family,

        /// Redirect URL overriding SOCIALGATE_<PROVIDER>_REDIRECT_URL
        #[arg(long)]
        redirect_url: Option<String>,

        /// Shopify store domain
        #[arg(long)]
        shop: Option<String>,
    },

    /// Exchange the callback parameters for credentials
    Exchange {
        /// Provider name
        provider: String,

        /// Connector family
        #[arg(long, value_enum, default_value_t)]
        family: Family,

        /// OAuth 2.0 authorization code
        #[arg(long)]
        code: Option<String>,

        /// PKCE verifier printed by auth-url
        #[arg(long)]
        code_verifier: Option<String>,

        /// OAuth 1.0a request token
        #[arg(long)]
        oauth_token: Option<String>,

        /// OAuth 1.0a verifier
        #[arg(long)]
        oauth_verifier: Option<String>,

        /// OAuth 1.0a request token secret printed by auth-url
        #[arg(long)]
        request_token_secret: Option<String>,

        /// Redirect URL used by auth-url
        #[arg(long)]
        redirect_url: Option<String>,

        /// Shopify store domain
        #[arg(long)]
        shop: Option<String>,
    },

    /// Fetch a profile
    Profile {
        /// Provider name
        provider: String,

        /// Connector family
        #[arg(long, value_enum, default_value_t)]
        family: Family,

        /// "me" or a vendor id or handle
        #[arg(long, default_value = "me")]
        entity: String,

        /// Shopify store domain
        #[arg(long)]
        shop: Option<String>,

        #[command(flatten)]
        token: TokenArgs,
    },

    /// Publish a post
    Post {
        /// Provider name
        provider: String,

        #[command(flatten)]
        token: TokenArgs,

        /// Page, board, blog, subreddit or community to post to
        #[arg(long, default_value = "me")]
        entity: String,

        /// Post text
        #[arg(long)]
        message: Option<String>,

        /// Post title (Reddit, YouTube, Pinterest)
        #[arg(long)]
        title: Option<String>,

        /// Link to share
        #[arg(long)]
        link: Option<String>,

        /// Public URL of a photo or video to attach
        #[arg(long)]
        media_url: Option<String>,
    },

    /// Export posts, media, followers, subscriptions or collections
    Export {
        /// Provider name
        provider: String,

        /// What to export
        target: ExportTarget,

        #[command(flatten)]
        token: TokenArgs,

        /// "me" or a vendor id, handle, board, playlist or blog
        #[arg(long, default_value = "me")]
        entity: String,

        /// Page size
        #[arg(long)]
        max_results: Option<u32>,

        /// Cursor returned by a previous export
        #[arg(long)]
        cursor: Option<String>,

        /// Follow cursors until the last page
        #[arg(long)]
        all: bool,

        /// Cap on the total number of items with --all
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List or fetch Shopify products
    Products {
        /// Store domain (`name.myshopify.com`)
        #[arg(long)]
        shop: String,

        #[command(flatten)]
        token: TokenArgs,

        /// Fetch one product instead of listing
        #[arg(long)]
        id: Option<String>,

        /// Page size
        #[arg(long)]
        max_results: Option<u32>,

        /// Cursor returned by a previous listing
        #[arg(long)]
        cursor: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::from_env();
    let logging = if cli.verbose {
        config.logging.clone().with_level("debug")
    } else {
        config.logging.clone()
    };
    logging.init()?;
    initialize_shared_client(config.http.clone());
    debug!("Configured providers: {}", config.configured_providers().len());

    let output: Value = match cli.command {
        Command::Providers { family } => commands::providers::list(family.map(Into::into)),
        Command::AuthUrl {
            provider,
            family,
            redirect_url,
            shop,
        } => {
            commands::auth::authorization_url(
                family.into(),
                &provider,
                redirect_url.as_deref(),
                shop.as_deref(),
            )
            .await?
        }
        Command::Exchange {
            provider,
            family,
            code,
            code_verifier,
            oauth_token,
            oauth_verifier,
            request_token_secret,
            redirect_url,
            shop,
        } => {
            let callback = commands::auth::Callback {
                code,
                code_verifier,
                oauth_token,
                oauth_verifier,
                request_token_secret,
                redirect_url,
                shop,
            };
            commands::auth::exchange(family.into(), &provider, callback).await?
        }
        Command::Profile {
            provider,
            family,
            entity,
            shop,
            token,
        } => {
            commands::auth::profile(
                family.into(),
                &provider,
                &entity,
                shop.as_deref(),
                token.into_credentials(),
            )
            .await?
        }
        Command::Post {
            provider,
            token,
            entity,
            message,
            title,
            link,
            media_url,
        } => {
            let post = commands::social::PostArgs {
                entity,
                message,
                title,
                link,
                media_url,
            };
            commands::social::post(&provider, token.into_credentials(), post).await?
        }
        Command::Export {
            provider,
            target,
            token,
            entity,
            max_results,
            cursor,
            all,
            limit,
        } => {
            let export = commands::social::ExportArgs {
                entity,
                max_results,
                cursor,
                all,
                limit,
            };
            commands::social::export(&provider, target, token.into_credentials(), export).await?
        }
        Command::Products {
            shop,
            token,
            id,
            max_results,
            cursor,
        } => {
            commands::shop::products(
                &shop,
                token.into_credentials(),
                id.as_deref(),
                max_results,
                cursor,
            )
            .await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
