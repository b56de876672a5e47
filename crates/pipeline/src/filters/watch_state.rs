//! Filter on the acting user's watch state.
//!
//! "unwatched" covers both movies with no review and movies whose review is
//! marked not watched. Anonymous requests are left untouched.

use crate::params::WatchFilter;
use crate::traits::{Filter, QueryContext};
use anyhow::Result;
use data_loader::Movie;

/// Keeps movies whose watch state matches the wanted one.
///
/// ## Algorithm
/// Looks up the user's review per movie in `UserContext.reviews` (O(1)).
pub struct WatchStateFilter {
    wanted: WatchFilter,
}

impl WatchStateFilter {
    pub fn new(wanted: WatchFilter) -> Self {
        Self { wanted }
    }
}

impl Filter for WatchStateFilter {
    fn name(&self) -> &str {
        "WatchStateFilter"
    }

    fn apply(&self, movies: Vec<Movie>, context: &QueryContext<'_>) -> Result<Vec<Movie>> {
        let Some(user) = context.user else {
            return Ok(movies);
        };

        let want_watched = self.wanted == WatchFilter::Watched;
        let filtered: Vec<Movie> = movies
            .into_iter()
            .filter(|movie| user.has_watched(movie.id) == want_watched)
            .collect();
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::test_support::{catalog, movie};
    use data_loader::Review;
    use standings::UserContext;

    fn review(id: u32, movie_id: u32, watched: bool) -> Review {
        Review {
            id,
            user_id: 1,
            movie_id,
            stars: watched.then_some(7),
            watched_on: watched.then_some(1_700_000_000),
            comment: None,
        }
    }

    fn movies() -> Vec<Movie> {
        vec![movie(1, "Seen"), movie(2, "Skipped"), movie(3, "Untouched")]
    }

    #[test]
    fn test_watched_and_unwatched_partition() {
        let catalog = catalog(movies(), &[]);
        let user = UserContext::from_reviews(1, vec![review(1, 1, true), review(2, 2, false)]);
        let context = QueryContext { catalog: &catalog, user: Some(&user) };

        let watched = WatchStateFilter::new(WatchFilter::Watched).apply(movies(), &context).unwrap();
        assert_eq!(watched.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1]);

        let unwatched = WatchStateFilter::new(WatchFilter::Unwatched).apply(movies(), &context).unwrap();
        assert_eq!(unwatched.iter().map(|m| m.id).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_anonymous_request_is_unfiltered() {
        let catalog = catalog(movies(), &[]);
        let context = QueryContext { catalog: &catalog, user: None };

        let filtered = WatchStateFilter::new(WatchFilter::Watched).apply(movies(), &context).unwrap();
        assert_eq!(filtered.len(), 3);
    }
}
