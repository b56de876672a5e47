//! Core domain types for the awards dataset.
//!
//! This module defines the record model every other crate works with:
//! movies, award categories, the nominations joining them to a year,
//! user reviews, and the in-memory [`DataIndex`] holding all of it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a movie
pub type MovieId = u32;

/// Unique identifier for an award category
pub type CategoryId = u32;

/// Unique identifier for a genre
pub type GenreId = u32;

/// Unique identifier for a nomination row
pub type NominationId = u32;

/// Unique identifier for a review row
pub type ReviewId = u32;

/// Ceremony year a nomination belongs to
pub type Year = u16;

/// Lowest and highest star rating a review may carry
pub const MIN_STARS: u8 = 1;
pub const MAX_STARS: u8 = 10;

// =============================================================================
// Users
// =============================================================================

/// A registered user of the tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub admin: bool,
}

// =============================================================================
// Movies and Categories
// =============================================================================

/// A movie that can be nominated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    /// Title used for English-speaking audiences when it differs from `title`
    pub english_title: Option<String>,
    /// Runtime in minutes
    pub runtime: u32,
    /// External (IMDb-style) rating
    pub rating: f32,
    /// Free-text note on where the movie can be watched
    pub where_to_watch: Option<String>,
    /// Streaming services carrying the movie
    pub streaming_services: Vec<String>,
    /// URL-safe identifier, unique per movie
    pub slug: String,
}

impl Movie {
    /// Title-like fields searched by the query engine
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.title.as_str()).chain(self.english_title.as_deref())
    }
}

/// An award category such as "Best Picture"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A movie genre such as "Drama"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

/// One movie nominated in one category for one ceremony year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Nomination {
    pub id: NominationId,
    pub movie_id: MovieId,
    pub category_id: CategoryId,
    pub year: Year,
}

// =============================================================================
// Reviews
// =============================================================================

/// A user's personal record for a movie.
///
/// `stars == None` means the record exists but the movie is not counted as
/// watched (the user marked it unwatched, or only left a date/comment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub stars: Option<u8>,
    /// Unix timestamp of the viewing
    pub watched_on: Option<i64>,
    pub comment: Option<String>,
}

impl Review {
    /// Whether this review counts towards "watched"
    pub fn is_watched(&self) -> bool {
        self.stars.is_some()
    }
}

/// What a user has recorded for one movie.
///
/// "Never touched" and "explicitly marked unwatched" are different states
/// even though neither counts as watched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReviewState {
    NoRecord,
    Unwatched,
    Watched { stars: u8 },
}

impl ReviewState {
    /// Derive the state from the user's review for a movie, if any
    pub fn from_review(review: Option<&Review>) -> Self {
        match review {
            None => ReviewState::NoRecord,
            Some(Review { stars: None, .. }) => ReviewState::Unwatched,
            Some(Review {
                stars: Some(stars), ..
            }) => ReviewState::Watched { stars: *stars },
        }
    }

    pub fn is_watched(&self) -> bool {
        matches!(self, ReviewState::Watched { .. })
    }

    pub fn has_record(&self) -> bool {
        !matches!(self, ReviewState::NoRecord)
    }

    pub fn stars(&self) -> Option<u8> {
        match self {
            ReviewState::Watched { stars } => Some(*stars),
            _ => None,
        }
    }
}

// =============================================================================
// Statistics Types
// =============================================================================

/// Aggregate of all users' rated reviews for one movie
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieStats {
    /// Mean stars over rated reviews, `None` when nobody rated the movie
    pub avg_stars: Option<f32>,
    /// Number of reviews with a star rating
    pub rated_count: u32,
}

impl MovieStats {
    /// Aggregate the given reviews; unrated reviews are ignored.
    ///
    /// Each user counts once. When a user has several reviews, the one with
    /// the highest id is used.
    pub fn from_reviews<'a>(reviews: impl IntoIterator<Item = &'a Review>) -> Self {
        let mut latest: HashMap<UserId, &Review> = HashMap::new();
        for review in reviews {
            let kept = latest.entry(review.user_id).or_insert(review);
            if review.id > kept.id {
                *kept = review;
            }
        }

        let (total, count) = latest
            .values()
            .filter_map(|r| r.stars)
            .fold((0u32, 0u32), |(total, count), stars| {
                (total + u32::from(stars), count + 1)
            });

        Self {
            avg_stars: (count > 0).then(|| total as f32 / count as f32),
            rated_count: count,
        }
    }

    /// Human-readable average, e.g. "7.5 stars" or "No reviews"
    pub fn average_stars_label(&self) -> String {
        match self.avg_stars {
            Some(avg) => format!("{:.1} stars", avg),
            None => "No reviews".to_string(),
        }
    }
}

/// Turn a title into a lowercase, dash-separated slug.
///
/// Example: "Sen to Chihiro no Kamikakushi" -> "sen-to-chihiro-no-kamikakushi"
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for ch in title.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            slug.push(ch);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

// =============================================================================
// DataIndex - The In-Memory Store
// =============================================================================

/// Holds every record plus the lookup indices the engine reads through.
///
/// Primary records live in HashMaps keyed by id; reviews are indexed both
/// per user and per movie, and nominations are grouped by year.
#[derive(Debug)]
pub struct DataIndex {
    // Primary data stores
    pub(crate) users: HashMap<UserId, User>,
    pub(crate) movies: HashMap<MovieId, Movie>,
    pub(crate) categories: HashMap<CategoryId, Category>,
    pub(crate) genres: HashMap<GenreId, Genre>,

    // Review indices
    /// All reviews written by each user
    pub(crate) user_reviews: HashMap<UserId, Vec<Review>>,
    /// All reviews received by each movie
    pub(crate) movie_reviews: HashMap<MovieId, Vec<Review>>,

    // Secondary indices
    /// Nominations grouped by ceremony year
    pub(crate) year_index: BTreeMap<Year, Vec<Nomination>>,
    /// Movie lookup by slug
    pub(crate) slug_index: HashMap<String, MovieId>,
    /// Genre ids tagged on each movie
    pub(crate) movie_genres: HashMap<MovieId, Vec<GenreId>>,
}

impl DataIndex {
    /// Creates a new, empty DataIndex
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
            movies: HashMap::new(),
            categories: HashMap::new(),
            genres: HashMap::new(),
            user_reviews: HashMap::new(),
            movie_reviews: HashMap::new(),
            year_index: BTreeMap::new(),
            slug_index: HashMap::new(),
            movie_genres: HashMap::new(),
        }
    }

    /// Get a user by ID
    pub fn get_user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// Get a movie by ID
    pub fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.movies.get(&id)
    }

    /// Get a movie by its slug
    pub fn get_movie_by_slug(&self, slug: &str) -> Option<&Movie> {
        self.slug_index.get(slug).and_then(|id| self.movies.get(id))
    }

    /// Get a category by ID
    pub fn get_category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.get(&id)
    }

    /// Get a genre by ID
    pub fn get_genre(&self, id: GenreId) -> Option<&Genre> {
        self.genres.get(&id)
    }

    /// Genres tagged on a movie, unknown genre ids skipped
    pub fn get_movie_genres(&self, movie_id: MovieId) -> Vec<&Genre> {
        self.movie_genres
            .get(&movie_id)
            .map(|ids| ids.iter().filter_map(|id| self.genres.get(id)).collect())
            .unwrap_or_default()
    }

    /// All users, in no particular order
    pub fn all_users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// Get all reviews written by a user
    ///
    /// Returns an empty slice if the user has no reviews
    pub fn get_user_reviews(&self, user_id: UserId) -> &[Review] {
        self.user_reviews
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get all reviews for a movie
    pub fn get_movie_reviews(&self, movie_id: MovieId) -> &[Review] {
        self.movie_reviews
            .get(&movie_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get all nominations for a ceremony year
    pub fn get_nominations_by_year(&self, year: Year) -> &[Nomination] {
        self.year_index
            .get(&year)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Years that have at least one nomination, most recent first
    pub fn nomination_years(&self) -> Vec<Year> {
        self.year_index
            .iter()
            .filter(|(_, nominations)| !nominations.is_empty())
            .map(|(year, _)| *year)
            .rev()
            .collect()
    }

    /// Insert a user into the index
    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Insert a movie into the index.
    ///
    /// An empty slug is replaced with one derived from the title.
    pub fn insert_movie(&mut self, mut movie: Movie) {
        if movie.slug.is_empty() {
            movie.slug = slugify(&movie.title);
        }
        if let Some(previous) = self.movies.get(&movie.id) {
            self.slug_index.remove(&previous.slug);
        }
        self.slug_index.insert(movie.slug.clone(), movie.id);
        self.movies.insert(movie.id, movie);
    }

    /// Insert a category into the index
    pub fn insert_category(&mut self, category: Category) {
        self.categories.insert(category.id, category);
    }

    /// Insert a genre into the index
    pub fn insert_genre(&mut self, genre: Genre) {
        self.genres.insert(genre.id, genre);
    }

    /// Tag a movie with a genre; repeated tags are ignored
    pub fn insert_movie_genre(&mut self, movie_id: MovieId, genre_id: GenreId) {
        let tags = self.movie_genres.entry(movie_id).or_default();
        if !tags.contains(&genre_id) {
            tags.push(genre_id);
        }
    }

    /// Insert a nomination into its year bucket
    pub fn insert_nomination(&mut self, nomination: Nomination) {
        self.year_index
            .entry(nomination.year)
            .or_default()
            .push(nomination);
    }

    /// Insert a review and update both review indices
    pub fn insert_review(&mut self, review: Review) {
        self.user_reviews
            .entry(review.user_id)
            .or_default()
            .push(review.clone());

        self.movie_reviews
            .entry(review.movie_id)
            .or_default()
            .push(review);
    }

    /// Get counts for debugging/validation: (users, movies, categories, nominations, reviews)
    pub fn counts(&self) -> (usize, usize, usize, usize, usize) {
        let nominations = self.year_index.values().map(|v| v.len()).sum();
        let reviews = self.user_reviews.values().map(|v| v.len()).sum();
        (
            self.users.len(),
            self.movies.len(),
            self.categories.len(),
            nominations,
            reviews,
        )
    }
}

impl Default for DataIndex {
    fn default() -> Self {
        Self::new()
    }
}
