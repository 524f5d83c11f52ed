// ABOUTME: Posting and export commands for social network connectors
// ABOUTME: Builds post requests from flags and follows export cursors on request
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use serde_json::{json, Value};
use socialgate::errors::AppResult;
use socialgate::models::{Credentials, ExportRequest, ExportTarget, MediaUpload, PostRequest};
use socialgate::SocialNetworks;
use tracing::info;

/// Flags of the `post` command
pub struct PostArgs {
    pub entity: String,
    pub message: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub media_url: Option<String>,
}

impl PostArgs {
    fn into_request(self) -> PostRequest {
        PostRequest {
            entity: self.entity,
            message: self.message,
            title: self.title,
            link: self.link,
            media: self.media_url.into_iter().map(MediaUpload::from_url).collect(),
        }
    }
}

/// Flags of the `export` command
pub struct ExportArgs {
    pub entity: String,
    pub max_results: Option<u32>,
    pub cursor: Option<String>,
    pub all: bool,
    pub limit: Option<usize>,
}

/// Publish a post and print the vendor id and URL
pub async fn post(provider: &str, credentials: Credentials, args: PostArgs) -> AppResult<Value> {
    let social = SocialNetworks::new();
    social.set_access_token(provider, credentials).await?;
    let result = social.post(provider, args.into_request()).await?;
    info!("Published {} on {provider}", result.id);
    Ok(serde_json::to_value(result)?)
}

/// One page, or every page with `--all`
pub async fn export(
    provider: &str,
    target: ExportTarget,
    credentials: Credentials,
    args: ExportArgs,
) -> AppResult<Value> {
    let social = SocialNetworks::new();
    social.set_access_token(provider, credentials).await?;

    let mut request = ExportRequest::for_entity(args.entity).with_cursor(args.cursor);
    if let Some(max_results) = args.max_results {
        request = request.with_max_results(max_results);
    }

    if args.all {
        let items = social
            .export_all(provider, target, request, args.limit)
            .await?;
        return Ok(json!({ "count": items.len(), "items": items }));
    }

    let page = social.export(provider, target, &request).await?;
    Ok(serde_json::to_value(page)?)
}
