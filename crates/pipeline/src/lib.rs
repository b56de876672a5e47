//! Query pipelines over one ceremony year.
//!
//! This crate provides:
//! - SearchMatcher for literal, case-insensitive text search
//! - Filter trait and implementations for narrowing the movie listing
//! - FilterPipeline for composing filters
//! - Sort strategies for the movie listing
//! - MovieQueryPipeline and CategoryQueryPipeline, the two entry points
//!
//! ## Architecture
//! A movie listing is processed in stages:
//! 1. The year's catalog is loaded from the repository
//! 2. Filters remove movies (category, search text, watch state)
//! 3. The survivors are sorted and paired with their nomination counts
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{MovieQueryParams, MovieQueryPipeline, SortBy, WatchFilter};
//!
//! let movies = MovieQueryPipeline::new(index.clone());
//! let params = MovieQueryParams::new()
//!     .with_filter(WatchFilter::Unwatched)
//!     .with_sort(SortBy::Shortest);
//!
//! for listed in movies.results(2025, Some(user_id), &params)? {
//!     println!("{} ({} nominations)", listed.movie.title, listed.nominations_count);
//! }
//! ```

pub mod traits;
pub mod search;
pub mod params;
pub mod sort;
pub mod filters;
pub mod filter_pipeline;
pub mod movie_query;
pub mod category_query;

// Re-export main types
pub use category_query::{search_categories, CategoryQueryPipeline, CategoryResults};
pub use filter_pipeline::FilterPipeline;
pub use movie_query::{stats_by_movie, MovieQueryPipeline};
pub use params::{MovieQueryParams, WatchFilter};
pub use search::SearchMatcher;
pub use sort::{sort_label, sort_movies, title_order, ListedMovie, SortBy, SortContext, UnknownSort};
pub use traits::{Filter, QueryContext};
