//! Read access to award data, independent of where it is stored.
//!
//! The query engine only ever talks to an [`EntityRepository`]. `DataIndex`
//! is the in-memory implementation; a database-backed store would implement
//! the same trait. [`YearCatalog`] is the per-call snapshot of one ceremony
//! year that the pipelines work from.

use crate::error::Result;
use crate::types::*;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Predicate-based retrieval of awards records.
///
/// Methods return owned records so implementations are free to fetch them
/// from any backing store. Ids that do not exist are skipped, never errors.
pub trait EntityRepository: Send + Sync {
    /// Distinct years having at least one nomination, most recent first
    fn available_years(&self) -> Result<Vec<Year>>;

    /// Every nomination for the given year
    fn nominations_for_year(&self, year: Year) -> Result<Vec<Nomination>>;

    /// Movies with the given ids
    fn movies_by_ids(&self, ids: &[MovieId]) -> Result<Vec<Movie>>;

    /// Movie with the given slug, regardless of year
    fn movie_by_slug(&self, slug: &str) -> Result<Option<Movie>>;

    /// Categories with the given ids
    fn categories_by_ids(&self, ids: &[CategoryId]) -> Result<Vec<Category>>;

    /// Genres tagged on a movie, in no particular order
    fn genres_for_movie(&self, movie_id: MovieId) -> Result<Vec<Genre>>;

    /// Every review written by a user
    fn reviews_for_user(&self, user_id: UserId) -> Result<Vec<Review>>;

    /// Every review of any of the given movies
    fn reviews_for_movies(&self, ids: &[MovieId]) -> Result<Vec<Review>>;

    /// User with the given id
    fn user(&self, id: UserId) -> Result<Option<User>>;

    /// Users with the given ids
    fn users_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>>;
}

impl EntityRepository for DataIndex {
    fn available_years(&self) -> Result<Vec<Year>> {
        Ok(self.nomination_years())
    }

    fn nominations_for_year(&self, year: Year) -> Result<Vec<Nomination>> {
        Ok(self.get_nominations_by_year(year).to_vec())
    }

    fn movies_by_ids(&self, ids: &[MovieId]) -> Result<Vec<Movie>> {
        Ok(ids.iter().filter_map(|id| self.get_movie(*id)).cloned().collect())
    }

    fn movie_by_slug(&self, slug: &str) -> Result<Option<Movie>> {
        Ok(self.get_movie_by_slug(slug).cloned())
    }

    fn categories_by_ids(&self, ids: &[CategoryId]) -> Result<Vec<Category>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.get_category(*id))
            .cloned()
            .collect())
    }

    fn genres_for_movie(&self, movie_id: MovieId) -> Result<Vec<Genre>> {
        Ok(self.get_movie_genres(movie_id).into_iter().cloned().collect())
    }

    fn reviews_for_user(&self, user_id: UserId) -> Result<Vec<Review>> {
        Ok(self.get_user_reviews(user_id).to_vec())
    }

    fn reviews_for_movies(&self, ids: &[MovieId]) -> Result<Vec<Review>> {
        Ok(ids
            .iter()
            .flat_map(|id| self.get_movie_reviews(*id))
            .cloned()
            .collect())
    }

    fn user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.get_user(id).cloned())
    }

    fn users_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>> {
        Ok(ids.iter().filter_map(|id| self.get_user(*id)).cloned().collect())
    }
}

/// Everything nominated in one ceremony year, read once per engine call.
///
/// Movies and categories are de-duplicated; a movie nominated in three
/// categories appears once in `movies` and three times in `nominations`.
#[derive(Debug, Clone)]
pub struct YearCatalog {
    pub year: Year,
    pub nominations: Vec<Nomination>,
    /// Distinct nominated movies, ordered by id
    pub movies: Vec<Movie>,
    /// Distinct categories with a nomination this year, ordered by id
    pub categories: Vec<Category>,
}

impl YearCatalog {
    /// Read the year's nominations and the records they reference
    pub fn load(repo: &dyn EntityRepository, year: Year) -> Result<Self> {
        let nominations = repo.nominations_for_year(year)?;

        let movie_ids: Vec<MovieId> = nominations
            .iter()
            .map(|n| n.movie_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let category_ids: Vec<CategoryId> = nominations
            .iter()
            .map(|n| n.category_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let movies = repo.movies_by_ids(&movie_ids)?;
        let categories = repo.categories_by_ids(&category_ids)?;

        Ok(Self {
            year,
            nominations,
            movies,
            categories,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Ids of the year's movies
    pub fn movie_ids(&self) -> Vec<MovieId> {
        self.movies.iter().map(|m| m.id).collect()
    }

    pub fn contains_movie(&self, movie_id: MovieId) -> bool {
        self.nominations.iter().any(|n| n.movie_id == movie_id)
    }

    pub fn category(&self, category_id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == category_id)
    }

    /// Number of nominations each movie holds this year
    pub fn nomination_counts(&self) -> HashMap<MovieId, u32> {
        let mut counts = HashMap::new();
        for nomination in &self.nominations {
            *counts.entry(nomination.movie_id).or_insert(0) += 1;
        }
        counts
    }

    /// Movies nominated in the given category this year
    pub fn movies_in_category(&self, category_id: CategoryId) -> HashSet<MovieId> {
        self.nominations
            .iter()
            .filter(|n| n.category_id == category_id)
            .map(|n| n.movie_id)
            .collect()
    }

    /// Nominated movies per category this year
    pub fn category_members(&self) -> HashMap<CategoryId, HashSet<MovieId>> {
        let mut members: HashMap<CategoryId, HashSet<MovieId>> = HashMap::new();
        for nomination in &self.nominations {
            members
                .entry(nomination.category_id)
                .or_default()
                .insert(nomination.movie_id);
        }
        members
    }

    /// Categories a movie is nominated in this year
    pub fn categories_for_movie(&self, movie_id: MovieId) -> Vec<&Category> {
        let ids: HashSet<CategoryId> = self
            .nominations
            .iter()
            .filter(|n| n.movie_id == movie_id)
            .map(|n| n.category_id)
            .collect();
        self.categories.iter().filter(|c| ids.contains(&c.id)).collect()
    }

    /// Total runtime of every movie nominated this year, in minutes
    pub fn total_runtime(&self) -> u64 {
        self.movies.iter().map(|m| u64::from(m.runtime)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: MovieId, title: &str) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            english_title: None,
            runtime: 90 + id,
            rating: 7.0,
            where_to_watch: None,
            streaming_services: vec![],
            slug: String::new(),
        }
    }

    fn build_index() -> DataIndex {
        let mut index = DataIndex::new();
        index.insert_movie(movie(1, "Grand Hotel"));
        index.insert_movie(movie(2, "Wings"));
        index.insert_category(Category {
            id: 1,
            name: "Best Picture".to_string(),
        });
        index.insert_category(Category {
            id: 2,
            name: "Best Director".to_string(),
        });
        index.insert_nomination(Nomination {
            id: 1,
            movie_id: 1,
            category_id: 1,
            year: 2099,
        });
        index.insert_nomination(Nomination {
            id: 2,
            movie_id: 1,
            category_id: 2,
            year: 2099,
        });
        index.insert_nomination(Nomination {
            id: 3,
            movie_id: 2,
            category_id: 2,
            year: 2098,
        });
        index
    }

    #[test]
    fn test_catalog_dedupes_movies() {
        let index = build_index();
        let catalog = YearCatalog::load(&index, 2099).unwrap();

        assert_eq!(catalog.nominations.len(), 2);
        assert_eq!(catalog.movie_ids(), vec![1]);
        assert_eq!(catalog.categories.len(), 2);
        assert_eq!(catalog.nomination_counts()[&1], 2);
        assert!(catalog.contains_movie(1));
        assert!(!catalog.contains_movie(2));
    }

    #[test]
    fn test_catalog_for_unknown_year_is_empty() {
        let index = build_index();
        let catalog = YearCatalog::load(&index, 1900).unwrap();

        assert!(catalog.is_empty());
        assert!(catalog.categories.is_empty());
        assert_eq!(catalog.total_runtime(), 0);
    }

    #[test]
    fn test_categories_for_movie() {
        let index = build_index();
        let catalog = YearCatalog::load(&index, 2098).unwrap();

        let names: Vec<&str> = catalog
            .categories_for_movie(2)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Best Director"]);
        assert!(catalog.movies_in_category(1).is_empty());
    }

    #[test]
    fn test_repository_skips_unknown_ids() {
        let index = build_index();
        let movies = index.movies_by_ids(&[1, 99]).unwrap();
        assert_eq!(movies.len(), 1);
        assert!(index.user(7).unwrap().is_none());
        assert_eq!(index.available_years().unwrap(), vec![2099, 2098]);
    }
}
