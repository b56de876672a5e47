//! The movie listing for one year.
//!
//! Steps, in order:
//! 1. Load the year's catalog (distinct nominated movies)
//! 2. Filter by category, search text and watch state
//! 3. Sort, attaching nomination counts
//!
//! The acting user's reviews are only read when a filter or sort needs them,
//! and everyone's reviews only for the mates sorts.

use crate::filter_pipeline::FilterPipeline;
use crate::filters::{CategoryFilter, SearchFilter, WatchStateFilter};
use crate::params::MovieQueryParams;
use crate::search::SearchMatcher;
use crate::sort::{sort_movies, ListedMovie, SortContext};
use crate::traits::QueryContext;
use anyhow::{Context, Result};
use data_loader::{EntityRepository, MovieId, MovieStats, Review, UserId, Year, YearCatalog};
use standings::build_user_context;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Answers movie listing requests from an EntityRepository
#[derive(Clone)]
pub struct MovieQueryPipeline {
    repo: Arc<dyn EntityRepository>,
}

impl MovieQueryPipeline {
    pub fn new(repo: Arc<dyn EntityRepository>) -> Self {
        Self { repo }
    }

    /// Movies nominated in `year`, filtered and sorted per `params`.
    ///
    /// Each movie appears once however many nominations it has. Asking for a
    /// year without nominations yields an empty list.
    #[instrument(skip(self, params), fields(sort = %params.sort_by))]
    pub fn results(&self, year: Year, user: Option<UserId>, params: &MovieQueryParams) -> Result<Vec<ListedMovie>> {
        let catalog = YearCatalog::load(self.repo.as_ref(), year)
            .with_context(|| format!("Failed to load nominations for {}", year))?;
        if catalog.is_empty() {
            debug!("No nominations for {}", year);
            return Ok(Vec::new());
        }

        let user_context = match user {
            Some(user_id) if params.needs_user() => Some(build_user_context(self.repo.as_ref(), user_id)?),
            _ => None,
        };

        let pipeline = build_filter_pipeline(params);
        let context = QueryContext {
            catalog: &catalog,
            user: user_context.as_ref(),
        };
        let movies = pipeline.apply(catalog.movies.clone(), &context)?;

        let movie_stats = if params.sort_by.needs_movie_stats() && !movies.is_empty() {
            let ids: Vec<MovieId> = movies.iter().map(|m| m.id).collect();
            let reviews = self
                .repo
                .reviews_for_movies(&ids)
                .context("Failed to read reviews for sorting")?;
            stats_by_movie(reviews)
        } else {
            HashMap::new()
        };

        let sort_context = SortContext {
            catalog: &catalog,
            user: user_context.as_ref(),
            movie_stats: &movie_stats,
        };
        let listed = sort_movies(movies, params.sort_by, &sort_context);
        debug!("Listing {} of {} movies for {}", listed.len(), catalog.movies.len(), year);
        Ok(listed)
    }
}

/// Filters for the given parameters; parameters that are absent add nothing
fn build_filter_pipeline(params: &MovieQueryParams) -> FilterPipeline {
    let mut pipeline = FilterPipeline::new();
    if let Some(category_id) = params.category_id {
        pipeline = pipeline.add_filter(CategoryFilter::new(category_id));
    }
    let matcher = SearchMatcher::from_param(params.query.as_deref());
    if !matcher.is_blank() {
        pipeline = pipeline.add_filter(SearchFilter::new(matcher));
    }
    if let Some(wanted) = params.filter_by {
        pipeline = pipeline.add_filter(WatchStateFilter::new(wanted));
    }
    pipeline
}

/// Aggregate reviews per movie. A user counts once per movie; when they
/// have several reviews the newest (highest id) is used.
pub fn stats_by_movie(reviews: Vec<Review>) -> HashMap<MovieId, MovieStats> {
    let mut by_movie: HashMap<MovieId, Vec<Review>> = HashMap::new();
    for review in reviews {
        by_movie.entry(review.movie_id).or_default().push(review);
    }
    by_movie
        .into_iter()
        .map(|(movie_id, reviews)| (movie_id, MovieStats::from_reviews(&reviews)))
        .collect()
}
