// ABOUTME: Provider-neutral data transfer objects shared by every connector
// ABOUTME: Re-exports auth, social, ecommerce and marketing DTOs plus the Dto serializer trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

//! Data models.
//!
//! Vendors answer in their own shapes; connectors map those into the flat
//! value objects defined here so callers never see vendor JSON unless they
//! ask for the `raw` payload.

use serde::Serialize;
use serde_json::Value;

mod auth;
mod ecommerce;
mod marketing;
mod social;

pub use auth::{
    expiry_after_seconds, ApiKeys, AuthorizationCallback, AuthorizationRequest, Credentials,
};
pub use ecommerce::{Product, ProductImage, ProductVariant};
pub use marketing::{AudienceUploadResult, Campaign};
pub use social::{
    ExportItem, ExportKind, ExportRequest, ExportTarget, MediaSource, MediaUpload, PostRequest,
    PostResult, Profile,
};

/// Flat value object that can be rendered as a JSON map
pub trait Dto: Serialize {
    /// Render this object as a JSON value
    ///
    /// DTOs only hold string-keyed data, so serialization cannot fail; a
    /// `Null` is returned if it ever does.
    fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Dto for Profile {}
impl Dto for ExportItem {}
impl Dto for PostResult {}
impl Dto for Product {}
impl Dto for ProductVariant {}
impl Dto for ProductImage {}
impl Dto for Campaign {}
impl Dto for AudienceUploadResult {}
impl Dto for AuthorizationRequest {}
