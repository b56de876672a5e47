//! DataIndex building and validation.
//!
//! Loads the five data files in parallel, plus the optional genre files,
//! inserts every record into a fresh [`DataIndex`], then checks referential
//! integrity before handing the index out.

use crate::error::{DataError, Result};
use crate::parser;
use crate::types::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Parse an optional data file; a missing file yields no records
fn parse_optional_file<T>(path: &Path, parse: fn(&Path) -> Result<Vec<T>>) -> Result<Vec<T>> {
    if path.exists() {
        parse(path)
    } else {
        debug!("Optional data file {:?} not present", path);
        Ok(Vec::new())
    }
}

impl DataIndex {
    /// Load a full dataset from a directory
    ///
    /// Steps:
    /// 1. Parse all five files in parallel, then the optional genre files
    /// 2. Insert records (this builds the review, year and slug indices)
    /// 3. Validate data integrity
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        info!("Loading awards dataset from {:?}", data_dir);

        let users_path = data_dir.join("users.dat");
        let movies_path = data_dir.join("movies.dat");
        let categories_path = data_dir.join("categories.dat");
        let nominations_path = data_dir.join("nominations.dat");
        let reviews_path = data_dir.join("reviews.dat");

        // Nested joins give five-way parallelism
        let ((users, movies), ((categories, nominations), reviews)) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_users(&users_path),
                    || parser::parse_movies(&movies_path),
                )
            },
            || {
                rayon::join(
                    || {
                        rayon::join(
                            || parser::parse_categories(&categories_path),
                            || parser::parse_nominations(&nominations_path),
                        )
                    },
                    || parser::parse_reviews(&reviews_path),
                )
            },
        );

        let users = users?;
        let movies = movies?;
        let categories = categories?;
        let nominations = nominations?;
        let reviews = reviews?;
        let genres = parse_optional_file(&data_dir.join("genres.dat"), parser::parse_genres)?;
        let movie_genres = parse_optional_file(&data_dir.join("movie_genres.dat"), parser::parse_movie_genres)?;

        info!(
            "Parsed {} users, {} movies, {} categories, {} nominations, {} reviews",
            users.len(),
            movies.len(),
            categories.len(),
            nominations.len(),
            reviews.len()
        );

        let mut index = DataIndex::new();

        for user in users {
            index.insert_user(user);
        }
        for movie in movies {
            index.insert_movie(movie);
        }
        for category in categories {
            index.insert_category(category);
        }
        for nomination in nominations {
            index.insert_nomination(nomination);
        }
        for review in reviews {
            index.insert_review(review);
        }
        for genre in genres {
            index.insert_genre(genre);
        }
        for (movie_id, genre_id) in movie_genres {
            index.insert_movie_genre(movie_id, genre_id);
        }

        index.validate()?;
        index.report_duplicate_reviews();

        info!("DataIndex successfully built and validated");
        Ok(index)
    }

    /// Validate data integrity
    ///
    /// Checks that:
    /// - every nomination references an existing movie and category
    /// - every review references an existing user and movie
    /// - every genre tag references an existing movie and genre
    /// - star ratings are within MIN_STARS..=MAX_STARS
    /// - no two movies share a slug
    pub fn validate(&self) -> Result<()> {
        for nominations in self.year_index.values() {
            for nomination in nominations {
                if !self.movies.contains_key(&nomination.movie_id) {
                    return Err(DataError::MissingReference {
                        entity: "Movie".to_string(),
                        id: nomination.movie_id,
                    });
                }
                if !self.categories.contains_key(&nomination.category_id) {
                    return Err(DataError::MissingReference {
                        entity: "Category".to_string(),
                        id: nomination.category_id,
                    });
                }
            }
        }

        for reviews in self.user_reviews.values() {
            for review in reviews {
                if !self.users.contains_key(&review.user_id) {
                    return Err(DataError::MissingReference {
                        entity: "User".to_string(),
                        id: review.user_id,
                    });
                }
                if !self.movies.contains_key(&review.movie_id) {
                    return Err(DataError::MissingReference {
                        entity: "Movie".to_string(),
                        id: review.movie_id,
                    });
                }
                if let Some(stars) = review.stars
                    && !(MIN_STARS..=MAX_STARS).contains(&stars)
                {
                    return Err(DataError::InvalidValue {
                        field: "stars".to_string(),
                        value: stars.to_string(),
                    });
                }
            }
        }

        for (movie_id, genre_ids) in &self.movie_genres {
            if !self.movies.contains_key(movie_id) {
                return Err(DataError::MissingReference {
                    entity: "Movie".to_string(),
                    id: *movie_id,
                });
            }
            if let Some(genre_id) = genre_ids.iter().find(|id| !self.genres.contains_key(*id)) {
                return Err(DataError::MissingReference {
                    entity: "Genre".to_string(),
                    id: *genre_id,
                });
            }
        }

        let mut seen_slugs: HashMap<&str, MovieId> = HashMap::new();
        let mut movie_ids: Vec<&MovieId> = self.movies.keys().collect();
        movie_ids.sort_unstable();
        for id in movie_ids {
            let movie = &self.movies[id];
            if let Some(first) = seen_slugs.insert(movie.slug.as_str(), movie.id) {
                return Err(DataError::DuplicateSlug {
                    slug: movie.slug.clone(),
                    first,
                    second: movie.id,
                });
            }
        }

        Ok(())
    }

    /// Log (movie, user) pairs carrying more than one review.
    ///
    /// They are legal in the data; readers keep the newest review per pair.
    fn report_duplicate_reviews(&self) {
        for (user_id, reviews) in &self.user_reviews {
            let mut per_movie: HashMap<MovieId, usize> = HashMap::new();
            for review in reviews {
                *per_movie.entry(review.movie_id).or_insert(0) += 1;
            }
            for (movie_id, count) in per_movie.into_iter().filter(|(_, count)| *count > 1) {
                warn!(
                    "User {} has {} reviews for movie {}; using the newest",
                    user_id, count, movie_id
                );
            }
        }
    }
}
