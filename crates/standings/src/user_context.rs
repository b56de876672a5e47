//! Helper functions to build a UserContext from an EntityRepository
//!
//! A UserContext gathers everything the engine needs to know about one
//! user's reviews up front, so filters and sorts can ask "what has this
//! user recorded for movie X" with a single hash lookup.

use anyhow::{Context, Result};
use data_loader::{EntityRepository, Movie, MovieId, Review, ReviewState, UserId};
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

/// One user's review records, keyed by movie
#[derive(Debug, Clone, Default)]
pub struct UserContext {
    pub user_id: UserId,
    pub reviews: HashMap<MovieId, Review>,
}

impl UserContext {
    /// Context for a user with no reviews
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            reviews: HashMap::new(),
        }
    }

    /// Build a context from a user's reviews.
    ///
    /// When a movie has more than one review from the same user the newest
    /// (highest id) wins.
    pub fn from_reviews(user_id: UserId, reviews: impl IntoIterator<Item = Review>) -> Self {
        let mut context = Self::new(user_id);
        for review in reviews {
            if review.user_id != user_id {
                continue;
            }
            match context.reviews.get(&review.movie_id) {
                Some(existing) if existing.id > review.id => {
                    warn!(
                        "Ignoring older duplicate review {} for user {} movie {}",
                        review.id, user_id, review.movie_id
                    );
                }
                Some(existing) => {
                    warn!(
                        "Replacing duplicate review {} with {} for user {} movie {}",
                        existing.id, review.id, user_id, review.movie_id
                    );
                    context.reviews.insert(review.movie_id, review);
                }
                None => {
                    context.reviews.insert(review.movie_id, review);
                }
            }
        }
        context
    }

    /// The user's review for a movie, if any
    pub fn review(&self, movie_id: MovieId) -> Option<&Review> {
        self.reviews.get(&movie_id)
    }

    pub fn state(&self, movie_id: MovieId) -> ReviewState {
        ReviewState::from_review(self.review(movie_id))
    }

    pub fn has_watched(&self, movie_id: MovieId) -> bool {
        self.state(movie_id).is_watched()
    }

    /// Stars the user gave a movie, `None` when unrated or never reviewed
    pub fn stars(&self, movie_id: MovieId) -> Option<u8> {
        self.state(movie_id).stars()
    }
}

/// Build a UserContext for a given user.
///
/// A user id the repository does not know simply has no reviews.
pub fn build_user_context(repo: &dyn EntityRepository, user_id: UserId) -> Result<UserContext> {
    let reviews = repo
        .reviews_for_user(user_id)
        .with_context(|| format!("Failed to read reviews for user {}", user_id))?;
    Ok(UserContext::from_reviews(user_id, reviews))
}

/// A listed movie paired with what the user recorded for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MovieProgress {
    pub movie_id: MovieId,
    pub state: ReviewState,
}

/// Review state of each movie, in the order given
pub fn user_movie_progress(movies: &[Movie], context: &UserContext) -> Vec<MovieProgress> {
    movies
        .iter()
        .map(|movie| MovieProgress {
            movie_id: movie.id,
            state: context.state(movie.id),
        })
        .collect()
}
