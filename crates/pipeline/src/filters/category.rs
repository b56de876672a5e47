//! Filter to movies nominated in one category.

use crate::traits::{Filter, QueryContext};
use anyhow::Result;
use data_loader::{CategoryId, Movie};

/// Keeps movies with a nomination in the category for the catalog's year.
///
/// An id with no nominations that year leaves nothing.
pub struct CategoryFilter {
    category_id: CategoryId,
}

impl CategoryFilter {
    pub fn new(category_id: CategoryId) -> Self {
        Self { category_id }
    }
}

impl Filter for CategoryFilter {
    fn name(&self) -> &str {
        "CategoryFilter"
    }

    fn apply(&self, movies: Vec<Movie>, context: &QueryContext<'_>) -> Result<Vec<Movie>> {
        let members = context.catalog.movies_in_category(self.category_id);
        Ok(movies
            .into_iter()
            .filter(|movie| members.contains(&movie.id))
            .collect())
    }
}
