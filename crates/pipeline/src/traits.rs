//! Core traits for the filtering pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible predicates to be applied to a year's movies.

use anyhow::Result;
use data_loader::{Movie, YearCatalog};
use standings::UserContext;

/// What a filter may consult besides the movies themselves.
///
/// `user` is `None` for anonymous requests; personal filters then do nothing.
#[derive(Debug, Clone, Copy)]
pub struct QueryContext<'a> {
    pub catalog: &'a YearCatalog,
    pub user: Option<&'a UserContext>,
}

/// Core trait for filtering movies.
///
/// ## Design Note
/// - `Send + Sync` allows filters to be used in concurrent contexts
/// - Filters take ownership of the Vec<Movie> and return a filtered Vec
/// - A filter may only remove movies, never add them
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of movies.
    ///
    /// # Arguments
    /// * `movies` - The movies to filter (takes ownership)
    /// * `context` - The year's catalog and the acting user's reviews
    ///
    /// # Returns
    /// * `Ok(Vec<Movie>)` - The movies that passed, in input order
    /// * `Err` - If filtering fails
    fn apply(&self, movies: Vec<Movie>, context: &QueryContext<'_>) -> Result<Vec<Movie>>;
}
