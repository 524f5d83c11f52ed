// ABOUTME: Shopify Admin REST API connector for products, collections and orders
// ABOUTME: Per-store OAuth with HMAC-verified callbacks and Link-header pagination
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, LINK};
use reqwest::{Method, RequestBuilder};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::Sha256;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use url::Url;

use crate::api::{self, parse_datetime};
use crate::constants::limits::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::core::{Connector, ConnectorState, Ecommerce, ProviderConfig};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::http_client::shared_client;
use crate::models::{
    AuthorizationCallback, AuthorizationRequest, Credentials, ExportItem, ExportKind,
    ExportRequest, Product, ProductImage, ProductVariant, Profile,
};
use crate::oauth2::{self, OAuthSettings};
use crate::pagination::{cursor_page, vendor_token, CursorPage};
use crate::validation::{clamp_page_size, require_numeric, validate_shop_domain};

const PROVIDER: &str = "shopify";
const SHOP_PLACEHOLDER: &str = "{shop}";
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";
/// Shopify caps REST page sizes at 250
const MAX_LIMIT: u32 = 250;

type HmacSha256 = Hmac<Sha256>;

// ============================================================================
// API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct Shop {
    id: Value,
    name: Option<String>,
    email: Option<String>,
    shop_owner: Option<String>,
    domain: Option<String>,
    myshopify_domain: Option<String>,
    created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShopifyProduct {
    id: Value,
    title: Option<String>,
    body_html: Option<String>,
    vendor: Option<String>,
    product_type: Option<String>,
    handle: Option<String>,
    status: Option<String>,
    tags: Option<String>,
    #[serde(default)]
    variants: Vec<ShopifyVariant>,
    #[serde(default)]
    images: Vec<ShopifyImage>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShopifyVariant {
    id: Option<Value>,
    title: Option<String>,
    sku: Option<String>,
    price: Option<Value>,
    compare_at_price: Option<Value>,
    inventory_quantity: Option<i64>,
    option1: Option<String>,
    option2: Option<String>,
    option3: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShopifyImage {
    id: Option<Value>,
    src: String,
    alt: Option<String>,
    position: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CustomCollection {
    id: Value,
    title: Option<String>,
    handle: Option<String>,
    body_html: Option<String>,
    updated_at: Option<String>,
    image: Option<ShopifyImage>,
}

#[derive(Debug, Deserialize)]
struct Order {
    id: Value,
    name: Option<String>,
    email: Option<String>,
    total_price: Option<String>,
    currency: Option<String>,
    order_status_url: Option<String>,
    created_at: Option<String>,
    #[serde(default)]
    line_items: Vec<Value>,
}

/// Shopify Admin REST API connector
///
/// Every call addresses the store selected with [`Ecommerce::set_store`].
pub struct ShopifyConnector {
    config: ProviderConfig,
    state: ConnectorState,
    store: RwLock<Option<String>>,
}

impl ShopifyConnector {
    /// Connector for the given endpoint configuration
    #[must_use]
    pub fn with_config(config: ProviderConfig) -> Self {
        Self {
            config,
            state: ConnectorState::new(PROVIDER),
            store: RwLock::new(None),
        }
    }

    /// Endpoint configuration with the selected store substituted
    async fn store_config(&self) -> AppResult<ProviderConfig> {
        let store = self.store.read().await.clone().ok_or_else(|| {
            AppError::new(
                ErrorCode::MissingRequiredField,
                "No Shopify store selected: call set_store first",
            )
            .with_provider(PROVIDER)
        })?;
        Ok(for_store(&self.config, &store))
    }

    async fn request(&self, method: Method, path: &str) -> AppResult<RequestBuilder> {
        let config = self.store_config().await?;
        let token = self.state.access_token().await?;
        Ok(shared_client()
            .request(method, config.endpoint(path))
            .header(ACCESS_TOKEN_HEADER, token))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let request = self.request(Method::GET, path).await?;
        api::send_json(PROVIDER, request).await
    }

    /// One page of a listing; filters apply to the first page only
    async fn list(
        &self,
        path: &str,
        key: &str,
        request: &ExportRequest,
        filters: &[(&str, &str)],
    ) -> AppResult<(Vec<Value>, Option<String>)> {
        let limit = clamp_page_size(request.max_results, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)
            .min(MAX_LIMIT)
            .to_string();
        let mut query = vec![("limit", limit)];
        match vendor_token(PROVIDER, request) {
            Some(page_info) => query.push(("page_info", page_info)),
            None => query.extend(filters.iter().map(|(k, v)| (*k, (*v).to_owned()))),
        }

        let http = self.request(Method::GET, path).await?.query(&query);
        let (body, headers): (Value, HeaderMap) =
            api::send_json_with_headers(PROVIDER, http).await?;
        let items = body
            .get(key)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok((items, next_page_info(&headers)))
    }
}

async fn product_response(request: RequestBuilder) -> AppResult<Product> {
    let body: Value = api::send_json(PROVIDER, request).await?;
    let raw = body
        .get("product")
        .cloned()
        .ok_or_else(|| AppError::service(PROVIDER, "Response contains no product"))?;
    convert_product(raw)
}

/// Copy of `config` addressing one store
fn for_store(config: &ProviderConfig, store: &str) -> ProviderConfig {
    let substitute = |url: &str| url.replace(SHOP_PLACEHOLDER, store);
    ProviderConfig {
        auth_url: substitute(&config.auth_url),
        token_url: substitute(&config.token_url),
        api_base_url: substitute(&config.api_base_url),
        revoke_url: config.revoke_url.as_deref().map(substitute),
        ..config.clone()
    }
}

/// `page_info` of the `rel="next"` entry of a Link header
fn next_page_info(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        if !params.contains("rel=\"next\"") {
            return None;
        }
        let url = Url::parse(target.trim().trim_start_matches('<').trim_end_matches('>')).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page_info")
            .map(|(_, value)| value.into_owned())
    })
}

/// Check the `hmac` parameter Shopify adds to OAuth callbacks
///
/// The message is every other parameter as `key=value`, sorted by key and
/// joined with `&`, signed with HMAC-SHA256 under the app secret.
#[must_use]
pub fn verify_callback_hmac(params: &HashMap<String, String>, client_secret: &str) -> bool {
    let Some(provided) = params.get("hmac") else {
        return false;
    };
    let Ok(expected) = hex::decode(provided) else {
        return false;
    };

    let mut pairs: Vec<(&String, &String)> = params
        .iter()
        .filter(|(key, _)| key.as_str() != "hmac" && key.as_str() != "signature")
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    let message = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let Ok(mut mac) = HmacSha256::new_from_slice(client_secret.as_bytes()) else {
        return false;
    };
    mac.update(message.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

#[async_trait]
impl Connector for ShopifyConnector {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn state(&self) -> &ConnectorState {
        &self.state
    }

    fn oauth_settings(&self) -> OAuthSettings {
        OAuthSettings {
            scope_separator: ",",
            ..OAuthSettings::default()
        }
    }

    async fn request_authorization(
        &self,
        redirect_url: Option<&str>,
    ) -> AppResult<AuthorizationRequest> {
        let config = self.store_config().await?;
        oauth2::begin_authorization(
            &self.state,
            &config,
            &self.oauth_settings(),
            redirect_url,
            false,
        )
        .await
    }

    /// Verify the callback signature and shop, then exchange the code
    async fn authorize(&self, callback: AuthorizationCallback) -> AppResult<Credentials> {
        callback.check_state()?;
        if !callback.params.is_empty() {
            let shop = callback
                .params
                .get("shop")
                .map(String::as_str)
                .map(validate_shop_domain)
                .transpose()?;
            if !callback.params.contains_key("hmac") {
                return Err(AppError::invalid_state("Shopify callback is not signed")
                    .with_provider(PROVIDER));
            }
            let keys = self.state.api_keys().await?;
            if !verify_callback_hmac(&callback.params, &keys.client_secret) {
                return Err(AppError::invalid_state("Shopify callback HMAC does not match")
                    .with_provider(PROVIDER));
            }
            if let Some(shop) = shop {
                let mut store = self.store.write().await;
                if store.as_deref().is_some_and(|current| current != shop) {
                    warn!("Shopify callback names {shop}, switching store");
                }
                *store = Some(shop);
            }
        }

        let config = self.store_config().await?;
        let credentials =
            oauth2::complete_authorization(&self.state, &config, &self.oauth_settings(), &callback)
                .await?;
        info!(provider = PROVIDER, "Authorization completed");
        self.state.set_credentials(credentials.clone()).await;
        Ok(credentials)
    }

    /// The shop; Shopify has no user profiles
    #[instrument(skip(self), fields(provider = "shopify", api_call = "get_profile"))]
    async fn get_profile(&self, _entity: &str) -> AppResult<Profile> {
        let body: Value = self.get("shop.json").await?;
        let raw = body.get("shop").cloned().unwrap_or(Value::Null);
        let shop: Shop = api::from_value(PROVIDER, &raw)?;
        let id = api::id_string(&shop.id).unwrap_or_default();
        Ok(Profile {
            username: shop.myshopify_domain.clone(),
            name: shop.name,
            first_name: shop.shop_owner,
            email: shop.email,
            profile_url: shop
                .domain
                .or(shop.myshopify_domain)
                .map(|d| format!("https://{d}")),
            created_at: shop.created_at.as_deref().and_then(parse_datetime),
            raw,
            ..Profile::new(id, PROVIDER)
        })
    }
}

#[async_trait]
impl Ecommerce for ShopifyConnector {
    async fn set_store(&self, domain: &str) -> AppResult<()> {
        let store = validate_shop_domain(domain)?;
        info!("Selected Shopify store {store}");
        *self.store.write().await = Some(store);
        Ok(())
    }

    async fn store(&self) -> Option<String> {
        self.store.read().await.clone()
    }

    #[instrument(skip(self), fields(provider = "shopify", api_call = "export_products"))]
    async fn export_products(&self, request: &ExportRequest) -> AppResult<CursorPage<Product>> {
        let (items, next) = self.list("products.json", "products", request, &[]).await?;
        let products = items
            .into_iter()
            .map(convert_product)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, products, next))
    }

    #[instrument(skip(self), fields(provider = "shopify", api_call = "get_product"))]
    async fn get_product(&self, id: &str) -> AppResult<Product> {
        let id = require_numeric("id", id.trim())?;
        let request = self
            .request(Method::GET, &format!("products/{id}.json"))
            .await?;
        product_response(request).await
    }

    #[instrument(skip(self, product), fields(provider = "shopify", api_call = "import_product"))]
    async fn import_product(&self, product: Product) -> AppResult<Product> {
        product.validate()?;
        let request = self
            .request(Method::POST, "products.json")
            .await?
            .json(&json!({ "product": product_payload(&product)? }));
        let created = product_response(request).await?;
        info!("Created Shopify product {}", created.id.as_deref().unwrap_or("?"));
        Ok(created)
    }

    #[instrument(skip(self, product), fields(provider = "shopify", api_call = "update_product"))]
    async fn update_product(&self, id: &str, product: Product) -> AppResult<Product> {
        let id = numeric_id("id", id)?;
        product.validate()?;
        let mut payload = product_payload(&product)?;
        payload["id"] = json!(id);
        let request = self
            .request(Method::PUT, &format!("products/{id}.json"))
            .await?
            .json(&json!({ "product": payload }));
        product_response(request).await
    }

    #[instrument(skip(self), fields(provider = "shopify", api_call = "delete_product"))]
    async fn delete_product(&self, id: &str) -> AppResult<()> {
        let id = require_numeric("id", id.trim())?;
        let request = self
            .request(Method::DELETE, &format!("products/{id}.json"))
            .await?;
        api::send(PROVIDER, request).await?;
        info!("Deleted Shopify product {id}");
        Ok(())
    }

    #[instrument(skip(self), fields(provider = "shopify", api_call = "export_collections"))]
    async fn export_collections(
        &self,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        let (items, next) = self
            .list("custom_collections.json", "custom_collections", request, &[])
            .await?;
        let items = items
            .into_iter()
            .map(convert_collection)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, next))
    }

    #[instrument(skip(self), fields(provider = "shopify", api_call = "export_orders"))]
    async fn export_orders(&self, request: &ExportRequest) -> AppResult<CursorPage<ExportItem>> {
        let (items, next) = self
            .list("orders.json", "orders", request, &[("status", "any")])
            .await?;
        let items = items
            .into_iter()
            .map(convert_order)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(cursor_page(PROVIDER, items, next))
    }
}

/// Shopify sends prices as decimal strings
fn decimal(value: Option<&Value>) -> Option<Decimal> {
    match value? {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.to_string().parse().ok(),
        _ => None,
    }
}

fn convert_product(raw: Value) -> AppResult<Product> {
    let product: ShopifyProduct = api::from_value(PROVIDER, &raw)?;
    let variants = product
        .variants
        .into_iter()
        .map(|v| ProductVariant {
            id: v.id.as_ref().and_then(api::id_string),
            title: v.title,
            sku: v.sku.filter(|s| !s.is_empty()),
            price: decimal(v.price.as_ref()).unwrap_or_default(),
            compare_at_price: decimal(v.compare_at_price.as_ref()),
            inventory_quantity: v.inventory_quantity,
            options: [v.option1, v.option2, v.option3].into_iter().flatten().collect(),
        })
        .collect();
    let images = product.images.into_iter().map(convert_image).collect();
    Ok(Product {
        id: api::id_string(&product.id),
        title: product.title.unwrap_or_default(),
        body_html: product.body_html,
        vendor: product.vendor,
        product_type: product.product_type.filter(|t| !t.is_empty()),
        handle: product.handle,
        status: product.status,
        tags: product
            .tags
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default(),
        variants,
        images,
        created_at: product.created_at.as_deref().and_then(parse_datetime),
        updated_at: product.updated_at.as_deref().and_then(parse_datetime),
        raw,
    })
}

fn convert_image(image: ShopifyImage) -> ProductImage {
    ProductImage {
        id: image.id.as_ref().and_then(api::id_string),
        src: image.src,
        alt: image.alt,
        position: image.position,
    }
}

/// Admin API body for a product create or update
/// Shopify resource id as the JSON number the Admin API expects
fn numeric_id(field: &str, value: &str) -> AppResult<u64> {
    let digits = require_numeric(field, value.trim())?;
    digits.parse().map_err(|_| {
        AppError::new(
            ErrorCode::ValueOutOfRange,
            format!("{field} {digits} does not fit a Shopify id"),
        )
        .with_provider(PROVIDER)
    })
}

fn product_payload(product: &Product) -> AppResult<Value> {
    let mut payload = json!({ "title": product.title });
    let optional = [
        ("body_html", &product.body_html),
        ("vendor", &product.vendor),
        ("product_type", &product.product_type),
        ("handle", &product.handle),
        ("status", &product.status),
    ];
    for (key, value) in optional
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| (key, v)))
    {
        payload[key] = json!(value);
    }
    if !product.tags.is_empty() {
        payload["tags"] = json!(product.tags.join(", "));
    }
    if !product.variants.is_empty() {
        payload["variants"] = product
            .variants
            .iter()
            .map(variant_payload)
            .collect::<AppResult<Value>>()?;
    }
    if !product.images.is_empty() {
        payload["images"] = product
            .images
            .iter()
            .map(|image| {
                let mut entry = json!({ "src": image.src });
                if let Some(alt) = &image.alt {
                    entry["alt"] = json!(alt);
                }
                if let Some(position) = image.position {
                    entry["position"] = json!(position);
                }
                entry
            })
            .collect();
    }
    Ok(payload)
}

fn variant_payload(variant: &ProductVariant) -> AppResult<Value> {
    let mut entry = json!({ "price": variant.price.to_string() });
    if let Some(id) = variant.id.as_deref() {
        entry["id"] = json!(numeric_id("variant id", id)?);
    }
    if let Some(title) = &variant.title {
        entry["title"] = json!(title);
    }
    if let Some(sku) = &variant.sku {
        entry["sku"] = json!(sku);
    }
    if let Some(compare_at) = variant.compare_at_price {
        entry["compare_at_price"] = json!(compare_at.to_string());
    }
    if let Some(quantity) = variant.inventory_quantity {
        entry["inventory_quantity"] = json!(quantity);
    }
    for (index, option) in variant.options.iter().take(3).enumerate() {
        entry[format!("option{}", index + 1)] = json!(option);
    }
    Ok(entry)
}

fn convert_collection(raw: Value) -> AppResult<ExportItem> {
    let collection: CustomCollection = api::from_value(PROVIDER, &raw)?;
    let id = api::id_string(&collection.id).unwrap_or_default();
    Ok(ExportItem {
        title: collection.title,
        text: collection.body_html.filter(|t| !t.is_empty()),
        url: collection.handle.map(|h| format!("/collections/{h}")),
        media_url: collection.image.map(|image| image.src),
        created_at: collection.updated_at.as_deref().and_then(parse_datetime),
        raw,
        ..ExportItem::new(id, PROVIDER, ExportKind::Collection)
    })
}

fn convert_order(raw: Value) -> AppResult<ExportItem> {
    let order: Order = api::from_value(PROVIDER, &raw)?;
    let id = api::id_string(&order.id).unwrap_or_default();
    let total = match (order.total_price, order.currency) {
        (Some(price), Some(currency)) => Some(format!("{price} {currency}")),
        (price, _) => price,
    };
    Ok(ExportItem {
        title: order.name,
        text: total,
        url: order.order_status_url,
        author: order.email,
        count: Some(order.line_items.len() as u64),
        created_at: order.created_at.as_deref().and_then(parse_datetime),
        raw,
        ..ExportItem::new(id, PROVIDER, ExportKind::Order)
    })
}

// ============================================================================
// Connector Factory
// ============================================================================

/// Factory registered for `shopify` in the e-commerce family
#[must_use]
pub fn create_connector(config: ProviderConfig) -> Arc<dyn Ecommerce> {
    Arc::new(ShopifyConnector::with_config(config))
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    fn signed(params: &[(&str, &str)], secret: &str) -> HashMap<String, String> {
        let mut map: HashMap<String, String> = params
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        let mut pairs: Vec<_> = map.iter().collect();
        pairs.sort();
        let message = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(message.as_bytes());
        map.insert("hmac".to_owned(), hex::encode(mac.finalize().into_bytes()));
        map
    }

    #[test]
    fn test_callback_hmac() {
        let params = signed(
            &[("code", "abc"), ("shop", "demo.myshopify.com"), ("timestamp", "1700000000")],
            "secret",
        );
        assert!(verify_callback_hmac(&params, "secret"));
        assert!(!verify_callback_hmac(&params, "other-secret"));

        let mut tampered = params;
        tampered.insert("code".to_owned(), "xyz".to_owned());
        assert!(!verify_callback_hmac(&tampered, "secret"));
    }

    #[test]
    fn test_next_page_info_from_link_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_static(
                "<https://demo.myshopify.com/admin/api/2024-01/products.json?limit=1&page_info=prev1>; rel=\"previous\", \
                 <https://demo.myshopify.com/admin/api/2024-01/products.json?limit=1&page_info=next2>; rel=\"next\"",
            ),
        );
        assert_eq!(next_page_info(&headers).as_deref(), Some("next2"));
        assert_eq!(next_page_info(&HeaderMap::new()), None);
    }

    #[test]
    fn test_product_payload_uses_shopify_shapes() {
        let product = Product {
            tags: vec!["mug".to_owned(), "gift".to_owned()],
            ..Product::new("Mug")
        }
        .with_variant(
            ProductVariant {
                options: vec!["Large".to_owned()],
                ..ProductVariant::with_price(Decimal::new(1999, 2))
            }
            .with_sku("MUG-L"),
        );
        let payload = product_payload(&product).unwrap();
        assert_eq!(payload["tags"], "mug, gift");
        assert_eq!(payload["variants"][0]["price"], "19.99");
        assert_eq!(payload["variants"][0]["option1"], "Large");
        assert_eq!(payload["variants"][0]["sku"], "MUG-L");
    }

    #[test]
    fn test_store_substitution() {
        let config = ProviderConfig {
            name: PROVIDER.to_owned(),
            auth_url: "https://{shop}/admin/oauth/authorize".to_owned(),
            token_url: "https://{shop}/admin/oauth/access_token".to_owned(),
            api_base_url: "https://{shop}/admin/api/2024-01".to_owned(),
            revoke_url: None,
            request_token_url: None,
            upload_url: None,
            default_scopes: Vec::new(),
            api_version: None,
        };
        let store = for_store(&config, "demo.myshopify.com");
        assert_eq!(
            store.endpoint("products.json"),
            "https://demo.myshopify.com/admin/api/2024-01/products.json"
        );
    }
}
