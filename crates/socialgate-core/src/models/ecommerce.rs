// ABOUTME: E-commerce DTOs modelled on the Shopify product resource
// ABOUTME: Product, ProductVariant and ProductImage with decimal prices
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::validation::{require, validate_url};

/// A sellable product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Vendor id; `None` for products not yet created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Product title
    pub title: String,
    /// HTML description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_html: Option<String>,
    /// Manufacturer or brand
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    /// Merchant-defined category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    /// URL slug
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    /// `active`, `draft` or `archived`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Search tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Purchasable variants
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    /// Images
    #[serde(default)]
    pub images: Vec<ProductImage>,
    /// Creation time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Untouched vendor payload
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub raw: Value,
}

impl Product {
    /// New product with a title
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Add a variant
    #[must_use]
    pub fn with_variant(mut self, variant: ProductVariant) -> Self {
        self.variants.push(variant);
        self
    }

    /// Add an image
    #[must_use]
    pub fn with_image(mut self, image: ProductImage) -> Self {
        self.images.push(image);
        self
    }

    /// Require a title, non-negative prices and well-formed image URLs
    ///
    /// # Errors
    ///
    /// `MissingRequiredField`/`EmptyParameter` for the title, `ValueOutOfRange`
    /// for a negative price, `MalformedUrl` for a bad image source
    pub fn validate(&self) -> AppResult<()> {
        require("title", Some(self.title.as_str()))?;
        for variant in &self.variants {
            variant.validate()?;
        }
        for image in &self.images {
            validate_url("image.src", &image.src)?;
        }
        Ok(())
    }
}

/// A purchasable variant of a product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Vendor id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Variant title (`Default Title` for single-variant products)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Stock keeping unit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// Price
    pub price: Decimal,
    /// Original price shown struck through
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<Decimal>,
    /// Units in stock
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_quantity: Option<i64>,
    /// Option values, e.g. size and color
    #[serde(default)]
    pub options: Vec<String>,
}

impl ProductVariant {
    /// Variant with a price
    #[must_use]
    pub fn with_price(price: Decimal) -> Self {
        Self {
            price,
            ..Self::default()
        }
    }

    /// Set the SKU
    #[must_use]
    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    fn validate(&self) -> AppResult<()> {
        if self.price.is_sign_negative() {
            return Err(AppError::new(
                ErrorCode::ValueOutOfRange,
                format!("Variant price must not be negative: {}", self.price),
            ));
        }
        Ok(())
    }
}

/// A product image
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    /// Vendor id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Image URL
    pub src: String,
    /// Alt text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// 1-based display position
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

impl ProductImage {
    /// Image from a URL
    #[must_use]
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            ..Self::default()
        }
    }
}
