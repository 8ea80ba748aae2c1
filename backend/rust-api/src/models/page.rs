use axum::http::Uri;
use serde::Serialize;

use crate::error::AppError;

/// Page-number pagination envelope.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Validated 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: i64,
    pub size: i64,
}

impl PageRequest {
    pub fn new(number: Option<i64>, size: i64) -> Result<Self, AppError> {
        let number = number.unwrap_or(1);
        // Pages whose bounds overflow are past the end of any list.
        if number < 1 || number.checked_mul(size).is_none() {
            return Err(AppError::NotFound);
        }
        Ok(Self { number, size })
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1).saturating_mul(self.size)
    }

    /// A page past the end is a 404, except the first page of an empty list.
    pub fn check_in_range(&self, count: i64) -> Result<(), AppError> {
        if self.number > 1 && self.offset() >= count {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, count: i64, request: PageRequest, uri: &Uri) -> Self {
        let has_next = request.number.saturating_mul(request.size) < count;
        Self {
            count,
            next: has_next.then(|| page_link(uri, request.number + 1)),
            previous: (request.number > 1).then(|| page_link(uri, request.number - 1)),
            results,
        }
    }
}

/// Same path and filters, different page.
pub fn page_link(uri: &Uri, page: i64) -> String {
    let mut pairs: Vec<&str> = uri
        .query()
        .unwrap_or("")
        .split('&')
        .filter(|p| !p.is_empty() && !p.starts_with("page="))
        .collect();
    let page_pair = format!("page={}", page);
    pairs.push(&page_pair);
    format!("{}?{}", uri.path(), pairs.join("&"))
}
