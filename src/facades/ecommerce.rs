// ABOUTME: E-commerce facade dispatching by provider name to store connectors
// ABOUTME: Store selection, product CRUD, collections and orders with full-catalog paging
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use std::sync::Arc;

use socialgate_providers::{
    collect_pages, global_registry, Connector, ConnectorFamily, Ecommerce, ProviderCapabilities,
    ProviderConfig, ProviderRegistry,
};
use tracing::{debug, instrument};

use super::{auth_lifecycle, Sessions};
use crate::errors::{AppError, AppResult};
use crate::models::{
    ApiKeys, AuthorizationCallback, AuthorizationRequest, Credentials, ExportItem, ExportRequest,
    Product, Profile,
};
use crate::pagination::CursorPage;

/// E-commerce facade
pub struct EcommerceFacade {
    registry: Arc<ProviderRegistry>,
    sessions: Sessions<dyn Ecommerce>,
}

impl Default for EcommerceFacade {
    fn default() -> Self {
        Self::new()
    }
}

impl EcommerceFacade {
    const FAMILY: ConnectorFamily = ConnectorFamily::Ecommerce;

    /// Facade over the process-wide registry
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(global_registry())
    }

    /// Facade over a specific registry
    #[must_use]
    pub fn with_registry(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            sessions: Sessions::default(),
        }
    }

    /// Session connector of `provider`, created on first use
    ///
    /// # Errors
    ///
    /// `UnknownProvider` when no e-commerce connector has that name
    pub async fn connector(&self, provider: &str) -> AppResult<Arc<dyn Ecommerce>> {
        self.sessions
            .get_or_create(provider, |name| self.registry.create_ecommerce(name))
            .await
    }

    /// Replace the session connector of `provider` with one using `config`
    ///
    /// # Errors
    ///
    /// `UnknownProvider` when no e-commerce connector has that name
    pub async fn configure(
        &self,
        provider: &str,
        config: ProviderConfig,
    ) -> AppResult<Arc<dyn Ecommerce>> {
        let connector = self
            .registry
            .create_ecommerce_with_config(provider, config)?;
        self.sessions.insert(provider, Arc::clone(&connector)).await;
        debug!("Configured {provider} with custom endpoints");
        Ok(connector)
    }

    auth_lifecycle!();

    /// Select the store subsequent calls address
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a malformed store domain
    pub async fn set_store(&self, provider: &str, domain: &str) -> AppResult<()> {
        self.connector(provider).await?.set_store(domain).await
    }

    /// The selected store
    ///
    /// # Errors
    ///
    /// `UnknownProvider`
    pub async fn store(&self, provider: &str) -> AppResult<Option<String>> {
        Ok(self.connector(provider).await?.store().await)
    }

    /// One page of products
    ///
    /// # Errors
    ///
    /// `UnsupportedFeature`, a missing store, or the vendor error
    #[instrument(skip_all, fields(provider = %provider))]
    pub async fn export_products(
        &self,
        provider: &str,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<Product>> {
        self.require(provider, ProviderCapabilities::PRODUCTS, "products")?;
        self.connector(provider)
            .await?
            .export_products(request)
            .await
    }

    /// Every product of the store, `limit` capping the total
    ///
    /// # Errors
    ///
    /// The first failing page
    #[instrument(skip_all, fields(provider = %provider))]
    pub async fn export_all_products(
        &self,
        provider: &str,
        request: ExportRequest,
        limit: Option<usize>,
    ) -> AppResult<Vec<Product>> {
        self.require(provider, ProviderCapabilities::PRODUCTS, "products")?;
        let connector = self.connector(provider).await?;
        let start = request.cursor.clone();

        collect_pages(limit, |cursor| {
            let connector = Arc::clone(&connector);
            let page_request = request
                .clone()
                .with_cursor(cursor.or_else(|| start.clone()));
            async move { connector.export_products(&page_request).await }
        })
        .await
    }

    /// One product
    ///
    /// # Errors
    ///
    /// `NotFound`, a missing store, or the vendor error
    pub async fn get_product(&self, provider: &str, id: &str) -> AppResult<Product> {
        self.require(provider, ProviderCapabilities::PRODUCTS, "products")?;
        self.connector(provider).await?.get_product(id).await
    }

    /// Create a product
    ///
    /// # Errors
    ///
    /// Validation errors for a product without title, or the vendor error
    #[instrument(skip_all, fields(provider = %provider))]
    pub async fn import_product(&self, provider: &str, product: Product) -> AppResult<Product> {
        self.require(provider, ProviderCapabilities::PRODUCTS, "products")?;
        product.validate()?;
        self.connector(provider)
            .await?
            .import_product(product)
            .await
    }

    /// Replace the fields of a product
    ///
    /// # Errors
    ///
    /// Validation errors, `NotFound`, or the vendor error
    #[instrument(skip_all, fields(provider = %provider, product_id = %id))]
    pub async fn update_product(
        &self,
        provider: &str,
        id: &str,
        product: Product,
    ) -> AppResult<Product> {
        self.require(provider, ProviderCapabilities::PRODUCTS, "products")?;
        product.validate()?;
        self.connector(provider)
            .await?
            .update_product(id, product)
            .await
    }

    /// Delete a product
    ///
    /// # Errors
    ///
    /// `NotFound`, or the vendor error
    #[instrument(skip_all, fields(provider = %provider, product_id = %id))]
    pub async fn delete_product(&self, provider: &str, id: &str) -> AppResult<()> {
        self.require(provider, ProviderCapabilities::PRODUCTS, "products")?;
        self.connector(provider).await?.delete_product(id).await
    }

    /// One page of collections
    ///
    /// # Errors
    ///
    /// `UnsupportedFeature`, or the vendor error
    pub async fn export_collections(
        &self,
        provider: &str,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        self.require(provider, ProviderCapabilities::COLLECTIONS, "collections")?;
        self.connector(provider)
            .await?
            .export_collections(request)
            .await
    }

    /// One page of orders
    ///
    /// # Errors
    ///
    /// `UnsupportedFeature`, or the vendor error
    pub async fn export_orders(
        &self,
        provider: &str,
        request: &ExportRequest,
    ) -> AppResult<CursorPage<ExportItem>> {
        self.require(provider, ProviderCapabilities::ORDERS, "orders")?;
        self.connector(provider)
            .await?
            .export_orders(request)
            .await
    }

    fn require(
        &self,
        provider: &str,
        needed: ProviderCapabilities,
        feature: &str,
    ) -> AppResult<()> {
        if self.capabilities(provider)?.contains(needed) {
            Ok(())
        } else {
            Err(AppError::unsupported_feature(provider, feature))
        }
    }
}
