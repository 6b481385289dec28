//! Query requests and paged results

mod engine;

pub use engine::{execute, related};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::content::Post;

/// Result ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    /// Newest first, ties by id ascending
    #[default]
    DateDesc,
    /// Oldest first, ties by id ascending
    DateAsc,
    /// Case-insensitive title, ties by id ascending
    TitleAsc,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "dateDesc" | "date-desc" | "-date" => Ok(SortOrder::DateDesc),
            "dateAsc" | "date-asc" | "date" => Ok(SortOrder::DateAsc),
            "titleAsc" | "title-asc" | "title" => Ok(SortOrder::TitleAsc),
            other => Err(format!(
                "Unknown sort order: {}. Available: date-desc, date-asc, title-asc",
                other
            )),
        }
    }
}

/// A filter, sort and pagination request. All filters combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuerySpec {
    /// Exact tag match
    pub tag: Option<String>,
    /// Exact author name match
    pub author: Option<String>,
    /// Inclusive lower date bound
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper date bound
    pub date_to: Option<NaiveDate>,
    /// Case-insensitive substring over title and excerpt
    pub text_search: Option<String>,
    pub sort: SortOrder,
    /// Maximum number of results; `None` is unbounded
    pub limit: Option<usize>,
    pub offset: usize,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn date_from(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    pub fn date_to(mut self, date: NaiveDate) -> Self {
        self.date_to = Some(date);
        self
    }

    pub fn text_search(mut self, text: impl Into<String>) -> Self {
        self.text_search = Some(text.into());
        self
    }

    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// One page of query results
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub items: Vec<Arc<Post>>,
    /// Number of posts matching the filters before pagination
    pub total: usize,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl Page {
    /// Whether results exist past this page
    pub fn has_next(&self) -> bool {
        self.offset + self.items.len() < self.total
    }

    /// Page count for the request's limit; 1 when unbounded
    pub fn total_pages(&self) -> usize {
        match self.limit {
            Some(0) => 0,
            Some(limit) => self.total.div_ceil(limit),
            None => 1,
        }
    }
}
