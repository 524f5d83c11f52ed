// ABOUTME: Shared page loop and lazy export stream over cursor-paginated vendor listings
// ABOUTME: Re-exports the core cursor types and adds vendor-token helpers for connectors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

//! # Pagination
//!
//! Vendors page with after-cursors, page tokens, bookmarks, offsets or page
//! numbers. Connectors wrap whatever the vendor returns in an opaque
//! [`Cursor`] with [`cursor_page`]; callers hand the cursor string back through
//! `ExportRequest::cursor` and connectors unwrap it with [`vendor_token`].
//!
//! [`collect_pages`] is the one "fetch while a cursor is present" loop, and
//! [`export_stream`] yields items lazily page by page.
//!
//! ```rust,no_run
//! use futures_util::StreamExt;
//! use socialgate_providers::core::SocialNetwork;
//! use socialgate_providers::models::{ExportRequest, ExportTarget};
//! use socialgate_providers::pagination::export_stream;
//!
//! async fn print_posts(connector: &dyn SocialNetwork) {
//!     let mut stream = export_stream(connector, ExportTarget::Posts, ExportRequest::default());
//!     while let Some(item) = stream.next().await {
//!         match item {
//!             Ok(item) => println!("{}", item.id),
//!             Err(e) => eprintln!("Error: {e}"),
//!         }
//!     }
//! }
//! ```

use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::pin::Pin;

use async_stream::try_stream;
use futures_util::Stream;
use tracing::{debug, warn};

use crate::constants::limits::MAX_PAGES;
use crate::core::SocialNetwork;
use crate::errors::{AppError, AppResult};
use crate::models::{ExportItem, ExportRequest, ExportTarget};
pub use socialgate_core::pagination::{Cursor, CursorPage, PaginationParams};

/// Type alias for the stream returned by `export_stream`
pub type ExportStream<'a> = Pin<Box<dyn Stream<Item = Result<ExportItem, AppError>> + Send + 'a>>;

/// Page of items with the vendor's next-page token wrapped in a cursor
///
/// Empty tokens mean "no more pages".
#[must_use]
pub fn cursor_page<T>(provider: &str, items: Vec<T>, next_token: Option<String>) -> CursorPage<T> {
    let next_cursor = next_token
        .filter(|t| !t.is_empty())
        .map(|t| Cursor::new(provider, &t));
    CursorPage::new(items, next_cursor)
}

/// Vendor token carried by the request cursor, if it was minted by `provider`
#[must_use]
pub fn vendor_token(provider: &str, request: &ExportRequest) -> Option<String> {
    let raw = request.cursor.as_deref().filter(|c| !c.is_empty())?;
    let token = Cursor::from_string(raw.to_owned()).token_for(provider);
    if token.is_none() {
        debug!("Ignoring cursor not issued by {provider}");
    }
    token
}

/// Numeric offset or page number carried by the request cursor
#[must_use]
pub fn vendor_offset(provider: &str, request: &ExportRequest) -> Option<u64> {
    vendor_token(provider, request).and_then(|t| t.parse().ok())
}

/// Next offset for offset-paged vendors, `None` once the listing is exhausted
/// or the offset no longer fits a `u64`
#[must_use]
pub fn next_offset(offset: u64, returned: usize, total: Option<u64>) -> Option<String> {
    let next = u64::try_from(returned)
        .ok()
        .and_then(|returned| offset.checked_add(returned));
    let Some(next) = next else {
        debug!("Offset {offset} + {returned} overflows, ending pagination");
        return None;
    };
    match total {
        _ if returned == 0 => None,
        Some(total) if next >= total => None,
        _ => Some(next.to_string()),
    }
}

/// Fetch pages until the vendor stops returning a cursor
///
/// `fetch` receives the cursor of the page to load (`None` for the first one).
/// The loop stops when there is no next cursor, when `max_results` items are
/// collected (the result is truncated to it), when the vendor repeats a
/// cursor, or after `MAX_PAGES` pages.
///
/// # Errors
///
/// The first error returned by `fetch`
pub async fn collect_pages<T, F, Fut>(max_results: Option<usize>, mut fetch: F) -> AppResult<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut + Send,
    Fut: Future<Output = AppResult<CursorPage<T>>> + Send,
    T: Send,
{
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;
    let mut seen: HashSet<String> = HashSet::new();

    for page_number in 1..=MAX_PAGES {
        let page = fetch(cursor.take()).await?;
        items.extend(page.items);

        if let Some(max) = max_results {
            if items.len() >= max {
                items.truncate(max);
                break;
            }
        }

        match page.next_cursor.map(Cursor::into_string) {
            None => break,
            Some(next) if !seen.insert(next.clone()) => {
                warn!("Vendor returned the same cursor twice; stopping after page {page_number}");
                break;
            }
            Some(next) => cursor = Some(next),
        }

        if page_number == MAX_PAGES {
            warn!("Stopped paging after {MAX_PAGES} pages");
        }
    }

    debug!("Collected {} item(s)", items.len());
    Ok(items)
}

/// Lazily stream every item of an export, page by page
///
/// `request.max_results` is the page size hint; the stream ends when the
/// vendor has no more pages or repeats a cursor.
#[must_use]
pub fn export_stream(
    connector: &dyn SocialNetwork,
    target: ExportTarget,
    request: ExportRequest,
) -> ExportStream<'_> {
    Box::pin(try_stream! {
        let mut buffer: VecDeque<ExportItem> = VecDeque::new();
        let mut next_cursor = request.cursor.clone();
        let mut seen: HashSet<String> = HashSet::new();
        let mut exhausted = false;

        loop {
            // Try to yield from buffer first
            if let Some(item) = buffer.pop_front() {
                yield item;
                continue;
            }

            if exhausted {
                break;
            }

            let page_request = request.clone().with_cursor(next_cursor.take());
            let page = connector.export(target, &page_request).await?;
            buffer.extend(page.items);

            match page.next_cursor.map(Cursor::into_string) {
                Some(next) if seen.insert(next.clone()) => next_cursor = Some(next),
                _ => exhausted = true,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_offset() {
        assert_eq!(next_offset(0, 20, Some(45)).as_deref(), Some("20"));
        assert_eq!(next_offset(40, 5, Some(45)), None);
        assert_eq!(next_offset(40, 0, None), None);
        assert_eq!(next_offset(40, 20, None).as_deref(), Some("60"));
        assert_eq!(next_offset(u64::MAX, 5, None), None);
    }

    #[test]
    fn test_vendor_token_ignores_foreign_cursor() {
        let cursor = Cursor::new("reddit", "t3_abc").into_string();
        let request = ExportRequest::default().with_cursor(Some(cursor));
        assert_eq!(vendor_token("reddit", &request).as_deref(), Some("t3_abc"));
        assert_eq!(vendor_token("tumblr", &request), None);
    }
}
