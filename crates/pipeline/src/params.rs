//! Request parameters for the movie listing.
//!
//! Parameters arrive as loose key/value pairs. Unrecognized keys are ignored
//! and values that fail to parse are treated as absent, so a malformed
//! request still gets a listing.

use crate::sort::SortBy;
use data_loader::CategoryId;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Personal watch-state filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchFilter {
    /// Only movies the user has marked watched
    Watched,
    /// Movies with no record, or marked not watched
    Unwatched,
}

impl WatchFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchFilter::Watched => "watched",
            WatchFilter::Unwatched => "unwatched",
        }
    }
}

impl fmt::Display for WatchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatchFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "watched" => Ok(WatchFilter::Watched),
            "unwatched" => Ok(WatchFilter::Unwatched),
            other => anyhow::bail!("unknown watch filter '{}'", other),
        }
    }
}

/// Everything that shapes one movie listing.
///
/// The default is the plain title-ordered listing of the whole year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MovieQueryParams {
    pub query: Option<String>,
    pub filter_by: Option<WatchFilter>,
    pub category_id: Option<CategoryId>,
    pub sort_by: SortBy,
}

impl MovieQueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from request pairs (`query`, `filter_by`, `category_id`, `sort_by`)
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "query" => params.query = Some(value.to_string()),
                "filter_by" => params.filter_by = value.parse().ok(),
                "category_id" => params.category_id = value.trim().parse().ok(),
                "sort_by" => params.sort_by = SortBy::from_param(Some(value)),
                other => tracing::trace!("Ignoring unknown movie query parameter '{}'", other),
            }
        }
        params
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_filter(mut self, filter_by: WatchFilter) -> Self {
        self.filter_by = Some(filter_by);
        self
    }

    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_sort(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    /// Whether answering needs the acting user's reviews
    pub fn needs_user(&self) -> bool {
        self.filter_by.is_some() || self.sort_by == SortBy::MyRating
    }
}
