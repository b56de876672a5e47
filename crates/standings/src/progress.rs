//! Watch progress of one user through one ceremony year.

use crate::user_context::{build_user_context, UserContext};
use anyhow::{Context, Result};
use data_loader::{EntityRepository, UserId, Year, YearCatalog};
use serde::Serialize;
use tracing::{debug, instrument};

/// How many of the year's nominated movies a user has watched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub watched: usize,
    pub total: usize,
}

impl Progress {
    /// True once every nominated movie is watched. A year without
    /// nominations is never complete.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.watched == self.total
    }

    /// Watched share in percent, 0 for an empty year
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.watched as f32 * 100.0 / self.total as f32
        }
    }

    /// Count watched movies in an already loaded catalog
    pub fn from_catalog(catalog: &YearCatalog, context: &UserContext) -> Self {
        let watched = catalog
            .movies
            .iter()
            .filter(|movie| context.has_watched(movie.id))
            .count();
        Self {
            watched,
            total: catalog.movies.len(),
        }
    }
}

/// Compute a user's progress for a year.
///
/// Pure read: nothing is cached or written.
#[instrument(skip(repo))]
pub fn compute_progress(repo: &dyn EntityRepository, user_id: UserId, year: Year) -> Result<Progress> {
    let catalog = YearCatalog::load(repo, year)
        .with_context(|| format!("Failed to load nominations for {}", year))?;
    let context = build_user_context(repo, user_id)?;

    let progress = Progress::from_catalog(&catalog, &context);
    debug!(
        "User {} watched {}/{} movies of {}",
        user_id, progress.watched, progress.total, year
    );
    Ok(progress)
}
