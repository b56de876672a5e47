//! Filter implementations for the movie listing.
//!
//! This module contains all the concrete filter implementations
//! that can be composed into a FilterPipeline.

pub mod category;
pub mod search;
pub mod watch_state;

// Re-export for convenience
pub use category::CategoryFilter;
pub use search::SearchFilter;
pub use watch_state::WatchStateFilter;

#[cfg(test)]
pub(crate) mod test_support {
    use data_loader::{Category, CategoryId, Movie, MovieId, Nomination, YearCatalog};

    pub fn movie(id: MovieId, title: &str) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            english_title: None,
            runtime: 100,
            rating: 7.0,
            where_to_watch: None,
            streaming_services: vec![],
            slug: String::new(),
        }
    }

    /// Catalog for 2099 with one nomination per `(movie, category)` pair
    pub fn catalog(movies: Vec<Movie>, pairs: &[(MovieId, CategoryId)]) -> YearCatalog {
        let mut categories: Vec<Category> = pairs
            .iter()
            .map(|&(_, id)| Category {
                id,
                name: format!("Category {}", id),
            })
            .collect();
        categories.sort_by_key(|c| c.id);
        categories.dedup_by_key(|c| c.id);

        YearCatalog {
            year: 2099,
            nominations: pairs
                .iter()
                .enumerate()
                .map(|(idx, &(movie_id, category_id))| Nomination {
                    id: idx as u32 + 1,
                    movie_id,
                    category_id,
                    year: 2099,
                })
                .collect(),
            movies,
            categories,
        }
    }
}
