//! Integration tests for the pipeline.
//!
//! These tests run the movie and category pipelines against a DataIndex
//! built in memory, covering filters and sorts working together.

use data_loader::{Category, DataIndex, Movie, MovieId, Nomination, Review, User};
use pipeline::{
    CategoryQueryPipeline, ListedMovie, MovieQueryParams, MovieQueryPipeline, SearchMatcher, SortBy,
    WatchFilter,
};
use std::sync::Arc;

const YEAR: u16 = 2099;
const OTHER_YEAR: u16 = 2098;

const AVATAR: MovieId = 1;
const BATMAN: MovieId = 2;
const CATS: MovieId = 3;

const USER: u32 = 1;

/// Test dataset builder; nomination and review ids are assigned in order
struct Fixture {
    index: DataIndex,
    next_nomination: u32,
    next_review: u32,
}

impl Fixture {
    fn new() -> Self {
        let mut index = DataIndex::new();
        index.insert_user(User {
            id: USER,
            name: "Ada".to_string(),
            admin: false,
        });
        index.insert_user(User {
            id: 2,
            name: "Grace".to_string(),
            admin: false,
        });
        index.insert_user(User {
            id: 3,
            name: "Linus".to_string(),
            admin: false,
        });
        Self {
            index,
            next_nomination: 1,
            next_review: 1,
        }
    }

    fn movie(mut self, id: MovieId, title: &str, english_title: Option<&str>, runtime: u32, rating: f32) -> Self {
        self.index.insert_movie(Movie {
            id,
            title: title.to_string(),
            english_title: english_title.map(str::to_string),
            runtime,
            rating,
            where_to_watch: None,
            streaming_services: vec![],
            slug: String::new(),
        });
        self
    }

    fn category(mut self, id: u32, name: &str) -> Self {
        self.index.insert_category(Category {
            id,
            name: name.to_string(),
        });
        self
    }

    fn nominate(mut self, movie_id: MovieId, category_id: u32, year: u16) -> Self {
        self.index.insert_nomination(Nomination {
            id: self.next_nomination,
            movie_id,
            category_id,
            year,
        });
        self.next_nomination += 1;
        self
    }

    fn review(mut self, user_id: u32, movie_id: MovieId, stars: Option<u8>) -> Self {
        self.index.insert_review(Review {
            id: self.next_review,
            user_id,
            movie_id,
            stars,
            watched_on: stars.map(|_| 1_700_000_000),
            comment: None,
        });
        self.next_review += 1;
        self
    }

    fn build(self) -> Arc<DataIndex> {
        Arc::new(self.index)
    }
}

/// Avatar and Batman nominated in 2099, Cats only in 2098
fn movies_fixture() -> Fixture {
    Fixture::new()
        .movie(AVATAR, "Avatar", None, 180, 8.0)
        .movie(BATMAN, "Batman", Some("The Dark Knight"), 120, 7.0)
        .movie(CATS, "Cats", None, 90, 5.0)
        .category(1, "Best Picture")
        .nominate(AVATAR, 1, YEAR)
        .nominate(BATMAN, 1, YEAR)
        .nominate(CATS, 1, OTHER_YEAR)
}

fn ids(listed: &[ListedMovie]) -> Vec<MovieId> {
    listed.iter().map(|l| l.movie.id).collect()
}

fn run(index: &Arc<DataIndex>, user: Option<u32>, params: MovieQueryParams) -> Vec<MovieId> {
    let pipeline = MovieQueryPipeline::new(index.clone());
    ids(&pipeline.results(YEAR, user, &params).unwrap())
}

#[test]
fn test_no_filters_lists_year_by_title() {
    let index = movies_fixture().build();
    assert_eq!(run(&index, Some(USER), MovieQueryParams::new()), vec![AVATAR, BATMAN]);
}

#[test]
fn test_search_matches_title_and_english_title() {
    let index = movies_fixture().build();
    assert_eq!(run(&index, None, MovieQueryParams::new().with_query("avatar")), vec![AVATAR]);
    assert_eq!(run(&index, None, MovieQueryParams::new().with_query("knight")), vec![BATMAN]);
    assert_eq!(run(&index, None, MovieQueryParams::new().with_query("KNIGHT")), vec![BATMAN]);
    assert!(run(&index, None, MovieQueryParams::new().with_query("cats")).is_empty());
}

#[test]
fn test_watched_and_unwatched() {
    let index = movies_fixture()
        .review(USER, AVATAR, Some(8))
        .review(USER, BATMAN, None)
        .build();

    let watched = run(&index, Some(USER), MovieQueryParams::new().with_filter(WatchFilter::Watched));
    let unwatched = run(&index, Some(USER), MovieQueryParams::new().with_filter(WatchFilter::Unwatched));

    assert_eq!(watched, vec![AVATAR]);
    // An unrated review counts as not watched
    assert_eq!(unwatched, vec![BATMAN]);

    let mut union = [watched, unwatched].concat();
    union.sort();
    assert_eq!(union, run(&index, Some(USER), MovieQueryParams::new()));
}

#[test]
fn test_watch_filter_without_user_is_ignored() {
    let index = movies_fixture().review(USER, AVATAR, Some(8)).build();
    let params = MovieQueryParams::new().with_filter(WatchFilter::Unwatched);
    assert_eq!(run(&index, None, params), vec![AVATAR, BATMAN]);
}

#[test]
fn test_runtime_and_rating_sorts() {
    let index = movies_fixture().build();
    assert_eq!(run(&index, None, MovieQueryParams::new().with_sort(SortBy::Duration)), vec![AVATAR, BATMAN]);
    assert_eq!(run(&index, None, MovieQueryParams::new().with_sort(SortBy::Shortest)), vec![BATMAN, AVATAR]);
    assert_eq!(run(&index, None, MovieQueryParams::new().with_sort(SortBy::ImdbRating)), vec![AVATAR, BATMAN]);
}

#[test]
fn test_my_rating_sort() {
    let index = movies_fixture()
        .review(USER, AVATAR, Some(5))
        .review(USER, BATMAN, Some(9))
        .build();
    let params = MovieQueryParams::new().with_sort(SortBy::MyRating);

    assert_eq!(run(&index, Some(USER), params.clone()), vec![BATMAN, AVATAR]);
    // Nobody to ask: title order
    assert_eq!(run(&index, None, params), vec![AVATAR, BATMAN]);
}

#[test]
fn test_mates_sorts() {
    let index = movies_fixture()
        .review(1, AVATAR, Some(4))
        .review(2, AVATAR, Some(6))
        .review(3, AVATAR, None)
        .review(1, BATMAN, Some(9))
        .build();

    let by_rating = run(&index, None, MovieQueryParams::new().with_sort(SortBy::WatchedByMates));
    assert_eq!(by_rating, vec![BATMAN, AVATAR]);

    let by_count = run(&index, None, MovieQueryParams::new().with_sort(SortBy::MostWatchedByMates));
    assert_eq!(by_count, vec![AVATAR, BATMAN]);
}

#[test]
fn test_most_nominated_counts_only_the_year() {
    let index = movies_fixture()
        .category(2, "Best Director")
        .category(3, "Best Editing")
        .nominate(BATMAN, 2, YEAR)
        .nominate(BATMAN, 3, YEAR)
        .nominate(AVATAR, 2, OTHER_YEAR)
        .build();

    let pipeline = MovieQueryPipeline::new(index.clone());
    let listed = pipeline
        .results(YEAR, Some(USER), &MovieQueryParams::new().with_sort(SortBy::MostNominated))
        .unwrap();

    assert_eq!(ids(&listed), vec![BATMAN, AVATAR]);
    assert_eq!(listed[0].nominations_count, 3);
    assert_eq!(listed[1].nominations_count, 1);
    assert!(!ids(&listed).contains(&CATS));
}

#[test]
fn test_category_filter() {
    let index = movies_fixture()
        .movie(4, "Dune", None, 155, 8.5)
        .category(2, "Best Director")
        .nominate(BATMAN, 2, YEAR)
        .nominate(AVATAR, 2, OTHER_YEAR)
        .nominate(4, 2, YEAR)
        .review(USER, BATMAN, Some(8))
        .build();

    let in_category = MovieQueryParams::new().with_category(2);
    assert_eq!(run(&index, Some(USER), in_category.clone()), vec![BATMAN, 4]);

    let watched = in_category.clone().with_filter(WatchFilter::Watched);
    assert_eq!(run(&index, Some(USER), watched), vec![BATMAN]);

    let by_rating = in_category.with_sort(SortBy::ImdbRating);
    assert_eq!(run(&index, Some(USER), by_rating), vec![4, BATMAN]);

    assert!(run(&index, Some(USER), MovieQueryParams::new().with_category(99)).is_empty());
}

#[test]
fn test_filters_only_narrow() {
    let index = movies_fixture()
        .category(2, "Best Director")
        .nominate(BATMAN, 2, YEAR)
        .review(USER, BATMAN, Some(8))
        .build();

    let base = run(&index, Some(USER), MovieQueryParams::new());
    let variants = [
        MovieQueryParams::new().with_query("a"),
        MovieQueryParams::new().with_category(2),
        MovieQueryParams::new().with_filter(WatchFilter::Watched),
        MovieQueryParams::new().with_filter(WatchFilter::Unwatched),
        MovieQueryParams::new().with_query("bat").with_category(2).with_filter(WatchFilter::Watched),
    ];
    for params in variants {
        let narrowed = run(&index, Some(USER), params);
        assert!(narrowed.iter().all(|id| base.contains(id)));
    }
}

#[test]
fn test_repeated_queries_agree() {
    let index = movies_fixture().review(USER, AVATAR, Some(6)).build();
    for sort in SortBy::KEYED {
        let params = MovieQueryParams::new().with_sort(sort);
        assert_eq!(run(&index, Some(USER), params.clone()), run(&index, Some(USER), params));
    }
}

#[test]
fn test_unknown_year_is_empty() {
    let index = movies_fixture().build();
    let pipeline = MovieQueryPipeline::new(index);
    assert!(pipeline.results(1900, None, &MovieQueryParams::new()).unwrap().is_empty());
}

#[test]
fn test_latin1_titles_are_searchable() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"7::Am\xE9lie::::122::8.3::::::\n").unwrap();
    let parsed = data_loader::parser::parse_movies(file.path()).unwrap();
    assert!(SearchMatcher::new("amélie").matches_movie(&parsed[0]));

    let mut fixture = movies_fixture();
    for movie in parsed {
        fixture.index.insert_movie(movie);
    }
    let index = fixture.nominate(7, 1, YEAR).build();

    assert_eq!(run(&index, None, MovieQueryParams::new().with_query("amélie")), vec![7]);
    assert_eq!(run(&index, None, MovieQueryParams::new().with_query("AMÉLIE")), vec![7]);
}

#[test]
fn test_params_from_request_pairs() {
    let index = movies_fixture().build();
    let params = MovieQueryParams::from_pairs([("sort_by", "shortest"), ("utm_source", "mail")]);
    assert_eq!(run(&index, None, params), vec![BATMAN, AVATAR]);
}

// =============================================================================
// Category search
// =============================================================================

const GRAND_HOTEL: MovieId = 10;
const SPIRITED_AWAY: MovieId = 11;

fn categories_fixture() -> Fixture {
    Fixture::new()
        .category(1, "Best Picture")
        .category(2, "Best Director")
        .category(3, "Best Actor")
        .movie(GRAND_HOTEL, "Grand Hotel", None, 112, 7.3)
        .movie(SPIRITED_AWAY, "Sen to Chihiro", Some("Spirited Away"), 125, 8.6)
        .nominate(GRAND_HOTEL, 1, YEAR)
        .nominate(GRAND_HOTEL, 2, YEAR)
        .nominate(GRAND_HOTEL, 3, OTHER_YEAR)
        .nominate(SPIRITED_AWAY, 1, YEAR)
}

fn category_ids(index: &Arc<DataIndex>, query: Option<&str>) -> (Vec<u32>, usize) {
    let results = CategoryQueryPipeline::new(index.clone()).results(YEAR, query).unwrap();
    let ids = results.categories.iter().map(|c| c.id).collect();
    (ids, results.matched_movies_count)
}

#[test]
fn test_blank_category_query_lists_the_year() {
    let index = categories_fixture().build();
    // Name order: Director before Picture, Actor is from another year
    assert_eq!(category_ids(&index, None), (vec![2, 1], 0));
    assert_eq!(category_ids(&index, Some("  ")), (vec![2, 1], 0));
}

#[test]
fn test_category_name_matches() {
    let index = categories_fixture().build();
    assert_eq!(category_ids(&index, Some("Picture")), (vec![1], 0));
    assert_eq!(category_ids(&index, Some("director")), (vec![2], 0));
}

#[test]
fn test_category_movie_title_matches() {
    let index = categories_fixture().build();
    assert_eq!(category_ids(&index, Some("Grand")), (vec![2, 1], 1));
    assert_eq!(category_ids(&index, Some("Spirited")), (vec![1], 1));
}

#[test]
fn test_category_search_is_literal() {
    let index = categories_fixture()
        .movie(20, "100% Wolf", None, 96, 5.9)
        .movie(21, "S_pecial Movie", None, 90, 6.0)
        .movie(22, "Special Movie", None, 90, 6.0)
        .nominate(20, 1, YEAR)
        .nominate(21, 2, YEAR)
        .nominate(22, 1, YEAR)
        .build();

    assert_eq!(category_ids(&index, Some("100%")), (vec![1], 1));
    assert_eq!(category_ids(&index, Some("S_pecial")), (vec![2], 1));
}

#[test]
fn test_category_query_without_match_is_empty() {
    let index = categories_fixture().build();
    assert_eq!(category_ids(&index, Some("Nonexistent")), (vec![], 0));
}
