//! # Awards Orchestrator
//!
//! Single entry point over the query pipelines, the progress calculator and
//! the ranking engine:
//! 1. Movie listing and category search for a year
//! 2. A user's progress through a year
//! 3. The year's leaderboard
//! 4. Movie detail lookup by slug
//! 5. The composed movies index page, whose independent parts run
//!    concurrently on the blocking pool
//!
//! Every call is a stateless read against the shared repository.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, instrument};

use data_loader::{Category, EntityRepository, Genre, Movie, MovieStats, Review, UserId, Year, YearCatalog};
use pipeline::{CategoryQueryPipeline, CategoryResults, ListedMovie, MovieQueryParams, MovieQueryPipeline};
use standings::{
    build_user_context, user_movie_progress, MovieProgress, Progress, RankingEngine, RankingMode, RankingTotals,
    Rankings, UserStats,
};

/// Year used when the dataset has no nominations at all
pub const DEFAULT_FALLBACK_YEAR: Year = 2025;

/// Tunables for the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub fallback_year: Year,
    /// Mode used for the ranking stats shown on the movies index page
    pub ranking_mode: RankingMode,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            fallback_year: DEFAULT_FALLBACK_YEAR,
            ranking_mode: RankingMode::Goals,
        }
    }
}

impl OrchestratorConfig {
    pub fn with_fallback_year(mut self, year: Year) -> Self {
        self.fallback_year = year;
        self
    }

    pub fn with_ranking_mode(mut self, mode: RankingMode) -> Self {
        self.ranking_mode = mode;
        self
    }
}

/// One movie with everything its detail view shows
#[derive(Debug, Clone, Serialize)]
pub struct MovieDetails {
    pub movie: Movie,
    /// Categories the movie is nominated in for the requested year, name order
    pub categories: Vec<Category>,
    /// Genres, name order
    pub genres: Vec<Genre>,
    /// All reviews, most recently watched first, undated last
    pub reviews: Vec<Review>,
    pub viewer_review: Option<Review>,
    pub stats: MovieStats,
}

/// Everything the movies index view needs for one year and user
#[derive(Debug, Clone, Serialize)]
pub struct MoviesIndexPage {
    pub year: Year,
    pub movies: Vec<ListedMovie>,
    /// The year's categories, name order
    pub categories: Vec<Category>,
    pub selected_category: Option<Category>,
    /// Review state of each listed movie, empty for anonymous requests
    pub review_states: Vec<MovieProgress>,
    pub progress: Option<Progress>,
    /// The acting user's leaderboard stats, `None` without activity
    pub user_stats: Option<UserStats>,
    pub totals: RankingTotals,
    pub all_movies_watched: bool,
}

/// Coordinates the engine components over one shared repository
#[derive(Clone)]
pub struct AwardsOrchestrator {
    repo: Arc<dyn EntityRepository>,
    movies: MovieQueryPipeline,
    categories: CategoryQueryPipeline,
    rankings: RankingEngine,
    config: OrchestratorConfig,
}

impl AwardsOrchestrator {
    /// Create an orchestrator with the default configuration
    pub fn new(repo: Arc<dyn EntityRepository>) -> Self {
        Self::with_config(repo, OrchestratorConfig::default())
    }

    pub fn with_config(repo: Arc<dyn EntityRepository>, config: OrchestratorConfig) -> Self {
        Self {
            movies: MovieQueryPipeline::new(repo.clone()),
            categories: CategoryQueryPipeline::new(repo.clone()),
            rankings: RankingEngine::new(repo.clone()),
            repo,
            config,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Movies nominated in `year`, filtered and sorted per `params`
    pub fn query_movies(&self, year: Year, user: Option<UserId>, params: &MovieQueryParams) -> Result<Vec<ListedMovie>> {
        self.movies.results(year, user, params).context("Movie query failed")
    }

    /// Categories of `year` matching `query`
    pub fn query_categories(&self, year: Year, query: Option<&str>) -> Result<CategoryResults> {
        self.categories.results(year, query).context("Category query failed")
    }

    pub fn compute_progress(&self, user: UserId, year: Year) -> Result<Progress> {
        standings::compute_progress(self.repo.as_ref(), user, year).context("Progress computation failed")
    }

    pub fn compute_rankings(&self, year: Year, user: Option<UserId>, mode: RankingMode) -> Result<Rankings> {
        self.rankings.rank(year, user, mode).context("Ranking computation failed")
    }

    /// Years with nominations, most recent first
    pub fn available_years(&self) -> Result<Vec<Year>> {
        Ok(self.repo.available_years()?)
    }

    /// Most recent year with nominations, or the configured fallback
    pub fn default_year(&self) -> Result<Year> {
        Ok(self.available_years()?.first().copied().unwrap_or(self.config.fallback_year))
    }

    /// Look up a movie by slug for its detail view.
    ///
    /// Admin viewers may open any movie; everyone else only movies nominated
    /// in `year`. `Ok(None)` means not found or not visible.
    #[instrument(skip(self))]
    pub fn find_movie(&self, year: Year, slug: &str, viewer: Option<UserId>) -> Result<Option<MovieDetails>> {
        let Some(movie) = self.repo.movie_by_slug(slug)? else {
            debug!("No movie with slug '{}'", slug);
            return Ok(None);
        };

        let viewer_is_admin = match viewer {
            Some(user_id) => self.repo.user(user_id)?.is_some_and(|user| user.admin),
            None => false,
        };

        let catalog = YearCatalog::load(self.repo.as_ref(), year)
            .with_context(|| format!("Failed to load nominations for {}", year))?;
        if !viewer_is_admin && !catalog.contains_movie(movie.id) {
            debug!("Movie '{}' is not nominated in {}", slug, year);
            return Ok(None);
        }

        let mut categories: Vec<Category> = catalog.categories_for_movie(movie.id).into_iter().cloned().collect();
        categories.sort_by(pipeline::category_query::name_order);

        let mut genres = self.repo.genres_for_movie(movie.id)?;
        genres.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let mut reviews = self.repo.reviews_for_movies(&[movie.id])?;
        // Most recent first; undated reviews go last, newest record first
        reviews.sort_by(|a, b| match (a.watched_on, b.watched_on) {
            (Some(x), Some(y)) => y.cmp(&x).then_with(|| b.id.cmp(&a.id)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => b.id.cmp(&a.id),
        });

        let viewer_review = viewer.and_then(|user_id| {
            reviews
                .iter()
                .filter(|review| review.user_id == user_id)
                .max_by_key(|review| review.id)
                .cloned()
        });
        let stats = MovieStats::from_reviews(&reviews);

        Ok(Some(MovieDetails {
            movie,
            categories,
            genres,
            reviews,
            viewer_review,
            stats,
        }))
    }

    /// Build the movies index page.
    ///
    /// The listing, the category menu, the user's progress and the
    /// leaderboard are independent, so each runs on the blocking pool and
    /// they are awaited together.
    pub async fn movies_index_page(
        &self,
        year: Year,
        user: Option<UserId>,
        params: MovieQueryParams,
    ) -> Result<MoviesIndexPage> {
        let start_time = Instant::now();
        let mode = self.config.ranking_mode;

        let (movies_result, categories_result, user_result, rankings_result) = tokio::join!(
            tokio::task::spawn_blocking({
                let movies = self.movies.clone();
                let params = params.clone();
                move || movies.results(year, user, &params)
            }),
            tokio::task::spawn_blocking({
                let categories = self.categories.clone();
                move || categories.results(year, None)
            }),
            tokio::task::spawn_blocking({
                let repo = self.repo.clone();
                move || -> Result<Option<(Progress, standings::UserContext)>> {
                    let Some(user_id) = user else {
                        return Ok(None);
                    };
                    let catalog = YearCatalog::load(repo.as_ref(), year)?;
                    let context = build_user_context(repo.as_ref(), user_id)?;
                    Ok(Some((Progress::from_catalog(&catalog, &context), context)))
                }
            }),
            tokio::task::spawn_blocking({
                let rankings = self.rankings.clone();
                move || rankings.rank(year, user, mode)
            })
        );

        let movies = movies_result.context("Movie query task panicked")??;
        let categories = categories_result.context("Category query task panicked")??.categories;
        let user_view = user_result.context("Progress task panicked")??;
        let rankings = rankings_result.context("Ranking task panicked")??;

        let selected_category = params
            .category_id
            .and_then(|id| categories.iter().find(|category| category.id == id).cloned());

        let (progress, review_states) = match user_view {
            Some((progress, context)) => {
                let listed: Vec<Movie> = movies.iter().map(|listed| listed.movie.clone()).collect();
                (Some(progress), user_movie_progress(&listed, &context))
            }
            None => (None, Vec::new()),
        };

        let page = MoviesIndexPage {
            year,
            movies,
            categories,
            selected_category,
            review_states,
            progress,
            user_stats: rankings.acting_user_stats().copied(),
            totals: rankings.totals,
            all_movies_watched: progress.is_some_and(|p| p.is_complete()),
        };

        info!(
            "Built movies index for {} ({} movies) in {:.2?}",
            year,
            page.movies.len(),
            start_time.elapsed()
        );
        Ok(page)
    }
}
