//! Filter on title or English title.

use crate::search::SearchMatcher;
use crate::traits::{Filter, QueryContext};
use anyhow::Result;
use data_loader::Movie;

/// Keeps movies whose title or English title contains the query.
pub struct SearchFilter {
    matcher: SearchMatcher,
}

impl SearchFilter {
    pub fn new(matcher: SearchMatcher) -> Self {
        Self { matcher }
    }
}

impl Filter for SearchFilter {
    fn name(&self) -> &str {
        "SearchFilter"
    }

    fn apply(&self, movies: Vec<Movie>, _context: &QueryContext<'_>) -> Result<Vec<Movie>> {
        if self.matcher.is_blank() {
            return Ok(movies);
        }
        Ok(movies
            .into_iter()
            .filter(|movie| self.matcher.matches_movie(movie))
            .collect())
    }
}
