// ABOUTME: Cursor-based pagination module for vendor listings
// ABOUTME: Opaque provider-scoped cursors wrapping vendor page tokens
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use std::fmt::{self, Display, Formatter};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Opaque pagination cursor wrapping a vendor page token
///
/// Vendors use after-cursors, page tokens, bookmarks, offsets or page numbers.
/// All of them are wrapped the same way, tagged with the provider that minted
/// them, so a cursor handed to the wrong provider is ignored instead of sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a vendor token
    #[must_use]
    pub fn new(provider: &str, token: &str) -> Self {
        let cursor_data = format!("{provider}:{token}");
        let encoded = URL_SAFE_NO_PAD.encode(cursor_data.as_bytes());
        Self(encoded)
    }

    /// Decode cursor into provider and vendor token
    ///
    /// Returns `None` if cursor is invalid or malformed
    #[must_use]
    pub fn decode(&self) -> Option<(String, String)> {
        let decoded = URL_SAFE_NO_PAD.decode(&self.0).ok()?;
        let decoded_str = String::from_utf8(decoded).ok()?;

        // Split on first ':' only; vendor tokens may contain ':'
        let (provider, token) = decoded_str.split_once(':')?;
        if provider.is_empty() {
            return None;
        }

        Some((provider.to_owned(), token.to_owned()))
    }

    /// Vendor token, if this cursor was minted by `provider`
    #[must_use]
    pub fn token_for(&self, provider: &str) -> Option<String> {
        self.decode()
            .filter(|(owner, _)| owner.eq_ignore_ascii_case(provider))
            .map(|(_, token)| token)
    }

    /// Get the raw cursor string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create cursor from raw string (for deserialization)
    #[must_use]
    pub const fn from_string(s: String) -> Self {
        Self(s)
    }

    /// Consume the cursor, returning the raw string
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for Cursor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Paginated response containing items and pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorPage<T> {
    /// The items in this page
    pub items: Vec<T>,

    /// Cursor pointing to the next page (if available)
    pub next_cursor: Option<Cursor>,

    /// Whether there are more items after this page
    pub has_more: bool,

    /// Total number of items in this page
    pub count: usize,
}

impl<T> CursorPage<T> {
    /// Create a new cursor page; `has_more` follows the presence of a cursor
    #[must_use]
    pub fn new(items: Vec<T>, next_cursor: Option<Cursor>) -> Self {
        let count = items.len();
        let has_more = next_cursor.is_some();
        Self {
            items,
            next_cursor,
            has_more,
            count,
        }
    }

    /// Create an empty page
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
            has_more: false,
            count: 0,
        }
    }

    /// Convert every item, keeping the pagination metadata
    #[must_use]
    pub fn map<U, F>(self, f: F) -> CursorPage<U>
    where
        F: FnMut(T) -> U,
    {
        CursorPage {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
            has_more: self.has_more,
            count: self.count,
        }
    }

    /// Raw next-cursor string, for feeding into the next request
    #[must_use]
    pub fn next_cursor_string(&self) -> Option<String> {
        self.next_cursor.as_ref().map(|c| c.as_str().to_owned())
    }
}

/// Pagination parameters for cursor-based queries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaginationParams {
    /// Cursor to start from
    pub cursor: Option<Cursor>,

    /// Maximum number of items per page
    pub limit: Option<u32>,
}

impl PaginationParams {
    /// Parameters continuing from `cursor`
    #[must_use]
    pub const fn new(cursor: Option<Cursor>, limit: Option<u32>) -> Self {
        Self { cursor, limit }
    }

    /// Vendor token for `provider`, if the cursor belongs to it
    #[must_use]
    pub fn token_for(&self, provider: &str) -> Option<String> {
        self.cursor.as_ref().and_then(|c| c.token_for(provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_round_trip_preserves_colons() {
        let cursor = Cursor::new("shopify", "eyJsYXN0X2lkIjo0fQ:next");
        let (provider, token) = cursor.decode().unwrap();
        assert_eq!(provider, "shopify");
        assert_eq!(token, "eyJsYXN0X2lkIjo0fQ:next");
    }

    #[test]
    fn test_cursor_is_scoped_to_provider() {
        let cursor = Cursor::new("twitter", "7140dibdnow9c7btw3w29grvxfcgvpb9n9coehpk7xz5i");
        assert!(cursor.token_for("reddit").is_none());
        assert!(cursor.token_for("Twitter").is_some());
        assert!(Cursor::from_string("%%%".to_owned()).decode().is_none());
    }

    #[test]
    fn test_page_map_keeps_metadata() {
        let page = CursorPage::new(vec![1, 2, 3], Some(Cursor::new("vkontakte", "3")));
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.items, vec![10, 20, 30]);
        assert!(mapped.has_more);
        assert_eq!(mapped.count, 3);
    }
}
