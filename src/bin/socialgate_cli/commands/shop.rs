// ABOUTME: Shopify catalog command listing or fetching products of one store
// ABOUTME: Uses the e-commerce facade with an existing store access token
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use serde_json::{json, Value};
use socialgate::constants::providers::SHOPIFY;
use socialgate::errors::AppResult;
use socialgate::models::{Credentials, ExportRequest};
use socialgate::EcommerceFacade;

/// One product by id, or one page of the catalog
pub async fn products(
    shop: &str,
    credentials: Credentials,
    id: Option<&str>,
    max_results: Option<u32>,
    cursor: Option<String>,
) -> AppResult<Value> {
    let store = EcommerceFacade::new();
    store.set_store(SHOPIFY, shop).await?;
    store.set_access_token(SHOPIFY, credentials).await?;

    if let Some(id) = id {
        let product = store.get_product(SHOPIFY, id).await?;
        return Ok(json!({ "product": product }));
    }

    let mut request = ExportRequest::for_entity("me").with_cursor(cursor);
    if let Some(max_results) = max_results {
        request = request.with_max_results(max_results);
    }
    let page = store.export_products(SHOPIFY, &request).await?;
    Ok(serde_json::to_value(page)?)
}
