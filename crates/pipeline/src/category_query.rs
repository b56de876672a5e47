//! Category search for one year.
//!
//! A category matches when its own name contains the query or when any
//! movie nominated in it that year does. The matched-movie count only
//! counts movies whose titles matched, so a pure name hit reports 0.

use crate::search::SearchMatcher;
use anyhow::{Context, Result};
use data_loader::{Category, EntityRepository, MovieId, Year, YearCatalog};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Categories matching a query, plus how many distinct movies matched
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryResults {
    /// Name order
    pub categories: Vec<Category>,
    pub matched_movies_count: usize,
}

impl CategoryResults {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Answers category search requests from an EntityRepository
#[derive(Clone)]
pub struct CategoryQueryPipeline {
    repo: Arc<dyn EntityRepository>,
}

impl CategoryQueryPipeline {
    pub fn new(repo: Arc<dyn EntityRepository>) -> Self {
        Self { repo }
    }

    /// Categories of `year` matching `query`; a blank query lists them all
    #[instrument(skip(self))]
    pub fn results(&self, year: Year, query: Option<&str>) -> Result<CategoryResults> {
        let catalog = YearCatalog::load(self.repo.as_ref(), year)
            .with_context(|| format!("Failed to load nominations for {}", year))?;

        let results = search_categories(&catalog, &SearchMatcher::from_param(query));
        debug!(
            "{} of {} categories matched, {} movies",
            results.categories.len(),
            catalog.categories.len(),
            results.matched_movies_count
        );
        Ok(results)
    }
}

/// Match categories within an already loaded catalog
pub fn search_categories(catalog: &YearCatalog, matcher: &SearchMatcher) -> CategoryResults {
    if matcher.is_blank() {
        let mut categories = catalog.categories.clone();
        categories.sort_by(name_order);
        return CategoryResults {
            categories,
            matched_movies_count: 0,
        };
    }

    let title_hits: HashSet<MovieId> = catalog
        .movies
        .iter()
        .filter(|movie| matcher.matches_movie(movie))
        .map(|movie| movie.id)
        .collect();

    let members = catalog.category_members();
    let mut matched_movies: HashSet<MovieId> = HashSet::new();
    let mut categories: Vec<Category> = Vec::new();

    for category in &catalog.categories {
        let nominated = members.get(&category.id);
        let movie_hits: Vec<MovieId> = nominated
            .map(|ids| ids.intersection(&title_hits).copied().collect())
            .unwrap_or_default();

        if matcher.matches(&category.name) || !movie_hits.is_empty() {
            matched_movies.extend(movie_hits);
            categories.push(category.clone());
        }
    }

    categories.sort_by(name_order);
    CategoryResults {
        categories,
        matched_movies_count: matched_movies.len(),
    }
}

/// Case-insensitive name, then exact name, then id
pub fn name_order(a: &Category, b: &Category) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}
