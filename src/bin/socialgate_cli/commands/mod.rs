// ABOUTME: Command implementations for socialgate-cli
// ABOUTME: Provider listing, OAuth handshake, social posting and export, Shopify catalog
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

pub mod auth;
pub mod providers;
pub mod shop;
pub mod social;
