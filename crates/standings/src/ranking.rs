//! Ranking Engine - leaderboard of users for a ceremony year
//!
//! Every user who watched at least one of the year's nominated movies gets
//! an entry. Entries are ordered by the selected [`RankingMode`]; equal
//! scores always fall back to ascending user id so the order is total and
//! repeatable.
//!
//! ## Algorithm
//! 1. Load the year's catalog and every review of its movies
//! 2. Group reviews per user (newest review per movie wins)
//! 3. Compute per-user stats in parallel
//! 4. Sort by the mode's key, then by user id
//! 5. Sum totals across participants

use crate::user_context::UserContext;
use anyhow::{Context, Result};
use data_loader::{CategoryId, EntityRepository, MovieId, Review, User, UserId, Year, YearCatalog};
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Scoring strategy used to order the leaderboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
    /// Completed categories first, then watched movies, then minutes
    #[default]
    Goals,
    /// Watched movies first, then minutes
    Movies,
    /// Watched minutes first, then movies
    Minutes,
}

impl RankingMode {
    pub const ALL: [RankingMode; 3] = [RankingMode::Goals, RankingMode::Movies, RankingMode::Minutes];

    pub fn as_str(&self) -> &'static str {
        match self {
            RankingMode::Goals => "goals",
            RankingMode::Movies => "movies",
            RankingMode::Minutes => "minutes",
        }
    }

    /// Parse a request value; absent or unknown names mean `Goals`
    pub fn from_param(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    /// Order two users' stats best-first under this mode
    fn compare(&self, a: &UserStats, b: &UserStats) -> Ordering {
        match self {
            RankingMode::Goals => b
                .completed_categories
                .cmp(&a.completed_categories)
                .then_with(|| b.watched_movies.cmp(&a.watched_movies))
                .then_with(|| b.watched_minutes.cmp(&a.watched_minutes)),
            RankingMode::Movies => b
                .watched_movies
                .cmp(&a.watched_movies)
                .then_with(|| b.watched_minutes.cmp(&a.watched_minutes)),
            RankingMode::Minutes => b
                .watched_minutes
                .cmp(&a.watched_minutes)
                .then_with(|| b.watched_movies.cmp(&a.watched_movies)),
        }
    }
}

impl fmt::Display for RankingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankingMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        RankingMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s.trim())
            .ok_or_else(|| anyhow::anyhow!("Unknown ranking mode '{}'", s))
    }
}

/// One user's activity in a year
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct UserStats {
    pub watched_movies: usize,
    /// Sum of runtimes of watched movies
    pub watched_minutes: u64,
    /// Categories whose every nominee the user watched
    pub completed_categories: usize,
    /// Mean stars over the user's rated movies of the year
    pub average_stars: Option<f32>,
    pub completion_percent: f32,
}

/// A leaderboard row
#[derive(Debug, Clone, Serialize)]
pub struct RankedUser {
    /// 1-based place on the board
    pub position: usize,
    pub user: User,
    pub stats: UserStats,
}

/// Aggregates over the whole year and every ranked user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RankingTotals {
    pub participants: usize,
    pub movies: usize,
    pub categories: usize,
    pub runtime_minutes: u64,
    pub watched_movies: usize,
    pub watched_minutes: u64,
}

/// The ranked leaderboard for a year
#[derive(Debug, Clone, Serialize)]
pub struct Rankings {
    pub year: Year,
    pub mode: RankingMode,
    pub acting_user: Option<UserId>,
    pub entries: Vec<RankedUser>,
    pub totals: RankingTotals,
}

impl Rankings {
    /// Entry of a given user, `None` when the user has no qualifying activity
    pub fn entry_for(&self, user_id: UserId) -> Option<&RankedUser> {
        self.entries.iter().find(|entry| entry.user.id == user_id)
    }

    pub fn stats_for(&self, user_id: UserId) -> Option<&UserStats> {
        self.entry_for(user_id).map(|entry| &entry.stats)
    }

    /// Stats of the user the rankings were computed for
    pub fn acting_user_stats(&self) -> Option<&UserStats> {
        self.acting_user.and_then(|id| self.stats_for(id))
    }
}

/// Computes leaderboards from an EntityRepository
#[derive(Clone)]
pub struct RankingEngine {
    repo: Arc<dyn EntityRepository>,
}

impl RankingEngine {
    pub fn new(repo: Arc<dyn EntityRepository>) -> Self {
        Self { repo }
    }

    /// Rank every participating user for `year`.
    ///
    /// `acting_user` only selects whose stats `Rankings::acting_user_stats`
    /// returns; it never changes the order.
    #[instrument(skip(self))]
    pub fn rank(&self, year: Year, acting_user: Option<UserId>, mode: RankingMode) -> Result<Rankings> {
        let catalog = YearCatalog::load(self.repo.as_ref(), year)
            .with_context(|| format!("Failed to load nominations for {}", year))?;
        let reviews = self
            .repo
            .reviews_for_movies(&catalog.movie_ids())
            .context("Failed to read reviews for ranking")?;

        let per_user = compute_user_stats(&catalog, reviews);
        debug!("{} users have activity in {}", per_user.len(), year);

        let user_ids: Vec<UserId> = per_user.keys().copied().collect();
        let users: HashMap<UserId, User> = self
            .repo
            .users_by_ids(&user_ids)
            .context("Failed to read ranked users")?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        let mut scored: Vec<(User, UserStats)> = per_user
            .into_iter()
            .filter_map(|(user_id, stats)| match users.get(&user_id) {
                Some(user) => Some((user.clone(), stats)),
                None => {
                    warn!("Skipping reviews of unknown user {}", user_id);
                    None
                }
            })
            .collect();

        scored.sort_by(|(user_a, a), (user_b, b)| {
            mode.compare(a, b).then_with(|| user_a.id.cmp(&user_b.id))
        });

        let totals = RankingTotals {
            participants: scored.len(),
            movies: catalog.movies.len(),
            categories: catalog.categories.len(),
            runtime_minutes: catalog.total_runtime(),
            watched_movies: scored.iter().map(|(_, s)| s.watched_movies).sum(),
            watched_minutes: scored.iter().map(|(_, s)| s.watched_minutes).sum(),
        };

        let entries = scored
            .into_iter()
            .enumerate()
            .map(|(idx, (user, stats))| RankedUser {
                position: idx + 1,
                user,
                stats,
            })
            .collect();

        Ok(Rankings {
            year,
            mode,
            acting_user,
            entries,
            totals,
        })
    }
}

/// Stats for every user with at least one watched movie in the catalog
fn compute_user_stats(catalog: &YearCatalog, reviews: Vec<Review>) -> HashMap<UserId, UserStats> {
    let mut by_user: HashMap<UserId, Vec<Review>> = HashMap::new();
    for review in reviews {
        by_user.entry(review.user_id).or_default().push(review);
    }

    let runtimes: HashMap<MovieId, u32> = catalog.movies.iter().map(|m| (m.id, m.runtime)).collect();
    let members: HashMap<CategoryId, HashSet<MovieId>> = catalog.category_members();
    let total_movies = catalog.movies.len();

    by_user
        .into_par_iter()
        .filter_map(|(user_id, reviews)| {
            let context = UserContext::from_reviews(user_id, reviews);
            let stats = stats_for_context(&context, &runtimes, &members, total_movies);
            (stats.watched_movies > 0).then_some((user_id, stats))
        })
        .collect()
}

fn stats_for_context(
    context: &UserContext,
    runtimes: &HashMap<MovieId, u32>,
    members: &HashMap<CategoryId, HashSet<MovieId>>,
    total_movies: usize,
) -> UserStats {
    let mut stats = UserStats::default();
    let mut star_total = 0u32;

    for (movie_id, runtime) in runtimes {
        if let Some(stars) = context.stars(*movie_id) {
            stats.watched_movies += 1;
            stats.watched_minutes += u64::from(*runtime);
            star_total += u32::from(stars);
        }
    }

    stats.completed_categories = members
        .values()
        .filter(|movies| movies.iter().all(|id| context.has_watched(*id)))
        .count();

    if stats.watched_movies > 0 {
        stats.average_stars = Some(star_total as f32 / stats.watched_movies as f32);
        stats.completion_percent = stats.watched_movies as f32 * 100.0 / total_movies as f32;
    }

    stats
}
