//! Offset pagination for collection discovery.
//!
//! The remote API reports `meta.pagination.hasNextPage` on every list
//! response. Discovery walks the collection page by page and is capped
//! at a fixed number of pages so a misbehaving server that always
//! reports another page cannot drive an unbounded loop.

use std::future::Future;

use thiserror::Error;

use crate::error::ApiError;

/// One page of a collection listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items in the page.
    pub items: Vec<T>,
    /// Whether the server reports another page.
    pub has_next_page: bool,
    /// Total collection size, when reported.
    pub total: Option<u64>,
}

/// Pagination error type.
#[derive(Debug, Error)]
pub enum PaginationError {
    /// Underlying client error.
    #[error("listing fetch failed: {0}")]
    Client(#[from] ApiError),

    /// The page cap was reached while the server still reported more pages.
    #[error("page cap of {cap} pages exceeded during discovery")]
    PageCapExceeded {
        /// Configured maximum number of pages.
        cap: usize,
    },
}

/// Walk an offset-paginated collection until the server reports no
/// further pages, collecting all items.
///
/// `fetch_page` receives the offset of the next page. At most
/// `page_cap` pages are fetched; if the server still reports
/// `has_next_page` after that many fetches, the walk fails with
/// [`PaginationError::PageCapExceeded`] rather than looping forever.
pub async fn paginate<T, F, Fut>(
    page_size: u64,
    page_cap: usize,
    mut fetch_page: F,
) -> Result<Vec<T>, PaginationError>
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Result<Page<T>, ApiError>>,
{
    let mut out = Vec::new();
    let mut offset = 0_u64;
    let mut pages = 0_usize;

    loop {
        if pages >= page_cap {
            return Err(PaginationError::PageCapExceeded { cap: page_cap });
        }
        let page = fetch_page(offset).await?;
        pages += 1;

        let fetched = page.items.len();
        out.extend(page.items);

        // An empty page with hasNextPage set would otherwise spin on
        // the same offset forever.
        if !page.has_next_page || fetched == 0 {
            break;
        }
        offset += page_size;
    }

    Ok(out)
}
