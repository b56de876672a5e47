//! The FilterPipeline orchestrates multiple filters.
//!
//! This module provides the main FilterPipeline struct that chains
//! multiple filters together using the builder pattern.

use crate::traits::{Filter, QueryContext};
use anyhow::Result;
use data_loader::Movie;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(CategoryFilter::new(category_id))
///     .add_filter(SearchFilter::new(SearchMatcher::new("dune")))
///     .add_filter(WatchStateFilter::new(WatchFilter::Unwatched));
///
/// let filtered = pipeline.apply(catalog.movies.clone(), &context)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline (builder pattern).
    ///
    /// # Arguments
    /// * `filter` - Any type implementing the Filter trait
    ///
    /// # Returns
    /// Self for method chaining
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Number of filters in the pipeline
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence to the movies.
    ///
    /// Filters only ever remove movies, so the order of the input is kept.
    ///
    /// ## Algorithm
    /// 1. Start with the input movies
    /// 2. For each filter in order:
    ///    a. Log filter name and input count
    ///    b. Apply the filter
    ///    c. Log output count
    /// 3. Return final filtered set
    ///
    /// # Arguments
    /// * `movies` - The movies to filter
    /// * `context` - Year catalog and acting user for filtering decisions
    ///
    /// # Returns
    /// * `Ok(Vec<Movie>)` - The movies left after all filters
    /// * `Err` - If any filter fails
    pub fn apply(&self, movies: Vec<Movie>, context: &QueryContext<'_>) -> Result<Vec<Movie>> {
        let mut current = movies;
        for filter in &self.filters {
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current, context)?;
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        Ok(current)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::test_support::{catalog, movie};
    use crate::filters::{CategoryFilter, SearchFilter, WatchStateFilter};
    use crate::params::WatchFilter;
    use crate::search::SearchMatcher;
    use data_loader::Review;
    use standings::UserContext;

    #[test]
    fn test_empty_pipeline() {
        let pipeline = FilterPipeline::new();
        let movies = vec![movie(1, "Avatar"), movie(2, "Batman")];
        let catalog = catalog(movies.clone(), &[(1, 1), (2, 1)]);
        let context = QueryContext { catalog: &catalog, user: None };

        assert!(pipeline.is_empty());
        let filtered = pipeline.apply(movies, &context).unwrap();
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_filters_compose() {
        let movies = vec![movie(1, "Dune"), movie(2, "Dune: Part Two"), movie(3, "Duel"), movie(4, "Barbie")];
        let catalog = catalog(movies.clone(), &[(1, 1), (2, 1), (3, 1), (4, 2)]);
        let user = UserContext::from_reviews(
            1,
            vec![Review { id: 1, user_id: 1, movie_id: 1, stars: Some(8), watched_on: None, comment: None }],
        );
        let context = QueryContext { catalog: &catalog, user: Some(&user) };

        let pipeline = FilterPipeline::new()
            .add_filter(CategoryFilter::new(1))
            .add_filter(SearchFilter::new(SearchMatcher::new("dune")))
            .add_filter(WatchStateFilter::new(WatchFilter::Unwatched));
        assert_eq!(pipeline.len(), 3);

        let filtered = pipeline.apply(movies, &context).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 2);
    }
}
