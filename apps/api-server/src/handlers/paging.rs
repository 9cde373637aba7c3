//! `?page=N` handling shared by every feed.

use blogicum_core::POSTS_PER_PAGE;
use blogicum_core::domain::{FeedQuery, PageRequest};
use blogicum_core::ports::PostRepository;
use blogicum_shared::dto::{PageResponse, PostResponse};
use serde::Deserialize;

use crate::handlers::present;
use crate::middleware::error::{AppError, AppResult};

/// The page parameter stays a string so a malformed value becomes a 404
/// instead of a 400.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageSelector {
    Number(u64),
    Last,
}

fn invalid_page() -> AppError {
    AppError::NotFound("Invalid page".to_string())
}

impl PageQuery {
    /// Blank means the first page, `last` means the last one.
    fn selector(&self) -> AppResult<PageSelector> {
        match self.page.as_deref().map(str::trim) {
            None | Some("") => Ok(PageSelector::Number(1)),
            Some("last") => Ok(PageSelector::Last),
            Some(raw) => raw
                .parse::<u64>()
                .map(PageSelector::Number)
                .map_err(|_| invalid_page()),
        }
    }
}

/// Load one page of a feed, answering 404 for pages that do not exist.
pub async fn load_feed(
    posts: &dyn PostRepository,
    query: &FeedQuery,
    page: &PageQuery,
) -> AppResult<PageResponse<PostResponse>> {
    let number = match page.selector()? {
        PageSelector::Number(number) => number,
        PageSelector::Last => {
            let first = PageRequest::new(1, POSTS_PER_PAGE).ok_or_else(invalid_page)?;
            posts.feed(query, first).await?.total_pages()
        }
    };
    let request = PageRequest::new(number, POSTS_PER_PAGE).ok_or_else(invalid_page)?;

    let page = posts.feed(query, request).await?;
    if page.is_out_of_range() {
        tracing::debug!(page = number, total_pages = page.total_pages(), "Page out of range");
        return Err(invalid_page());
    }

    Ok(present::page(page, present::post))
}
