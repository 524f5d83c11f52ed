// ABOUTME: Core types and constants for the socialgate connector workspace
// ABOUTME: Foundation crate with error handling, DTOs, pagination, validation, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

#![deny(unsafe_code)]

//! # Socialgate Core
//!
//! Foundation crate providing the shared vocabulary of the socialgate
//! connectors: errors, provider-neutral data transfer objects, opaque
//! pagination cursors and input validation. It has no knowledge of any
//! particular vendor API.
//!
//! ## Modules
//!
//! - **errors**: `AppError`, `ErrorCode`, `ErrorKind` and the structured `ProviderError`
//! - **validation**: required-field and URL checks shared by every connector
//! - **models**: profile, export, post, product and marketing DTOs
//! - **pagination**: opaque provider-scoped cursors and `CursorPage`
//! - **constants**: provider names, environment variable names, defaults
//! - **config**: environment-based provider configuration loading

/// Unified error handling system with standard error codes
pub mod errors;

/// Required-field, numeric and URL validation
pub mod validation;

/// Provider-neutral data transfer objects
pub mod models;

/// Opaque cursor-based pagination
pub mod pagination;

/// Application constants organized by domain
pub mod constants;

/// Environment-based provider configuration
pub mod config;

pub use errors::{AppError, AppResult, ErrorCode, ErrorKind};
