//! Sort strategies for movie listings.
//!
//! Each recognized `sort_by` value maps to one [`SortBy`] variant; anything
//! else sorts by title. Whatever the primary key, ties are broken by title
//! (case-insensitive, then exact) and finally by movie id, so two calls over
//! the same data always produce the same order.

use data_loader::{Movie, MovieId, MovieStats, YearCatalog};
use serde::Serialize;
use standings::UserContext;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Ordering applied to a movie listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Title ascending
    #[default]
    Title,
    /// Runtime, longest first
    Duration,
    /// Runtime, shortest first
    Shortest,
    /// External rating, highest first
    ImdbRating,
    /// The acting user's stars, highest first, unrated last
    MyRating,
    /// Average stars over everyone's rated reviews, highest first
    WatchedByMates,
    /// Number of rated reviews, most first
    MostWatchedByMates,
    /// Nominations in the selected year, most first
    MostNominated,
}

impl SortBy {
    /// Every sort with a request key, in menu order
    pub const KEYED: [SortBy; 7] = [
        SortBy::Duration,
        SortBy::Shortest,
        SortBy::ImdbRating,
        SortBy::MyRating,
        SortBy::WatchedByMates,
        SortBy::MostWatchedByMates,
        SortBy::MostNominated,
    ];

    /// Request value selecting this sort; `Title` has none
    pub fn key(&self) -> Option<&'static str> {
        match self {
            SortBy::Title => None,
            SortBy::Duration => Some("duration"),
            SortBy::Shortest => Some("shortest"),
            SortBy::ImdbRating => Some("imdb_rating"),
            SortBy::MyRating => Some("my_rating"),
            SortBy::WatchedByMates => Some("watched_by_mates"),
            SortBy::MostWatchedByMates => Some("most_watched_by_mates"),
            SortBy::MostNominated => Some("most_nominated"),
        }
    }

    /// Short label shown next to the sort menu
    pub fn label(&self) -> &'static str {
        match self {
            SortBy::Title => "A-Z",
            SortBy::Duration => "Longest",
            SortBy::Shortest => "Shortest",
            SortBy::ImdbRating => "IMDB rating",
            SortBy::MyRating => "My rating",
            SortBy::WatchedByMates => "Mates' rating",
            SortBy::MostWatchedByMates => "Most watched",
            SortBy::MostNominated => "Nominations",
        }
    }

    /// Parse a request value; absent or unrecognized values sort by title
    pub fn from_param(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    /// Whether this sort reads everyone's reviews
    pub fn needs_movie_stats(&self) -> bool {
        matches!(self, SortBy::WatchedByMates | SortBy::MostWatchedByMates)
    }

    /// The sort actually applied: `MyRating` without a user is `Title`
    pub fn effective(&self, has_user: bool) -> Self {
        match self {
            SortBy::MyRating if !has_user => SortBy::Title,
            other => *other,
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key().unwrap_or("title"))
    }
}

/// Returned for request values that name no sort
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSort(pub String);

impl fmt::Display for UnknownSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown sort '{}'", self.0)
    }
}

impl std::error::Error for UnknownSort {}

impl FromStr for SortBy {
    type Err = UnknownSort;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortBy::KEYED
            .into_iter()
            .find(|sort| sort.key() == Some(s.trim()))
            .ok_or_else(|| UnknownSort(s.to_string()))
    }
}

/// Label for a raw `sort_by` value; blank or unknown values read "A-Z"
pub fn sort_label(value: Option<&str>) -> &'static str {
    SortBy::from_param(value).label()
}

/// A movie in a listing, with its nomination count for the listed year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListedMovie {
    pub movie: Movie,
    pub nominations_count: u32,
}

/// Data a sort may need beyond the movies themselves
#[derive(Debug, Clone, Copy)]
pub struct SortContext<'a> {
    pub catalog: &'a YearCatalog,
    pub user: Option<&'a UserContext>,
    /// Review aggregates per movie; only read by the mates sorts
    pub movie_stats: &'a HashMap<MovieId, MovieStats>,
}

/// Attach nomination counts and order movies by `sort_by`
pub fn sort_movies(movies: Vec<Movie>, sort_by: SortBy, context: &SortContext<'_>) -> Vec<ListedMovie> {
    let counts = context.catalog.nomination_counts();
    let mut listed: Vec<ListedMovie> = movies
        .into_iter()
        .map(|movie| {
            let nominations_count = counts.get(&movie.id).copied().unwrap_or(0);
            ListedMovie {
                movie,
                nominations_count,
            }
        })
        .collect();

    let sort_by = sort_by.effective(context.user.is_some());
    listed.sort_by(|a, b| primary_order(sort_by, a, b, context).then_with(|| title_order(&a.movie, &b.movie)));
    listed
}

fn primary_order(sort_by: SortBy, a: &ListedMovie, b: &ListedMovie, context: &SortContext<'_>) -> Ordering {
    match sort_by {
        SortBy::Title => Ordering::Equal,
        SortBy::Duration => b.movie.runtime.cmp(&a.movie.runtime),
        SortBy::Shortest => a.movie.runtime.cmp(&b.movie.runtime),
        SortBy::ImdbRating => b.movie.rating.total_cmp(&a.movie.rating),
        SortBy::MyRating => {
            let stars = |movie: &Movie| context.user.and_then(|user| user.stars(movie.id));
            descending_nulls_last(stars(&a.movie), stars(&b.movie), |x, y| x.cmp(y))
        }
        SortBy::WatchedByMates => {
            let avg = |movie: &Movie| context.movie_stats.get(&movie.id).and_then(|s| s.avg_stars);
            descending_nulls_last(avg(&a.movie), avg(&b.movie), |x, y| x.total_cmp(y))
        }
        SortBy::MostWatchedByMates => {
            let count = |movie: &Movie| context.movie_stats.get(&movie.id).map_or(0, |s| s.rated_count);
            count(&b.movie).cmp(&count(&a.movie))
        }
        SortBy::MostNominated => b.nominations_count.cmp(&a.nominations_count),
    }
}

/// Larger values first; `None` after every `Some`
fn descending_nulls_last<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(&b, &a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Total title order used as the final tie-break
pub fn title_order(a: &Movie, b: &Movie) -> Ordering {
    a.title
        .to_lowercase()
        .cmp(&b.title.to_lowercase())
        .then_with(|| a.title.cmp(&b.title))
        .then_with(|| a.id.cmp(&b.id))
}
