//! Parser for the awards data files.
//!
//! Every file is `::`-separated, one record per line:
//! - users.dat: userId::name::admin
//! - movies.dat: movieId::title::englishTitle::runtime::rating::whereToWatch::streaming::slug
//! - categories.dat: categoryId::name
//! - nominations.dat: nominationId::movieId::categoryId::year
//! - reviews.dat: reviewId::userId::movieId::stars::watchedOn::comment
//! - genres.dat: genreId::name (optional)
//! - movie_genres.dat: movieId::genreId (optional)
//!
//! Empty optional fields mean "absent". The last field of a line keeps any
//! further `::` it contains, so review comments may hold the separator.

use crate::error::{DataError, Result};
use crate::types::*;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Read a file as lines, accepting ISO-8859-1 as well as UTF-8 input.
///
/// Valid UTF-8 is used as is; anything else is decoded byte-per-char as Latin-1.
fn read_lines(path: &Path) -> Result<Vec<String>> {
    let mut file = File::open(path).map_err(|_| DataError::FileNotFound {
        path: path.display().to_string(),
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    let content = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().iter().map(|&b| b as char).collect(),
    };

    Ok(content.lines().map(|s| s.to_string()).collect())
}

/// Split a record into exactly `expected` fields
fn split_fields<'a>(line: &'a str, expected: usize, file: &str, line_no: usize) -> Result<Vec<&'a str>> {
    let fields: Vec<&str> = line.splitn(expected, "::").collect();
    if fields.len() != expected {
        return Err(DataError::FieldCountMismatch {
            file: file.to_string(),
            expected,
            found: fields.len(),
            line: line_no,
        });
    }
    Ok(fields)
}

/// Parse a required field, reporting the file and line on failure
fn parse_field<T>(value: &str, file: &str, line_no: usize, field: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| DataError::ParseError {
        file: file.to_string(),
        line: line_no,
        reason: format!("Invalid {}: {}", field, e),
    })
}

/// Parse an optional field; blank means `None`
fn parse_optional<T>(value: &str, file: &str, line_no: usize, field: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if value.trim().is_empty() {
        Ok(None)
    } else {
        parse_field(value, file, line_no, field).map(Some)
    }
}

fn optional_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_admin_flag(s: &str) -> Result<bool> {
    match s.trim() {
        "" | "0" => Ok(false),
        "1" => Ok(true),
        other => Err(DataError::InvalidValue {
            field: "admin".to_string(),
            value: other.to_string(),
        }),
    }
}

/// Parse `|`-separated streaming services, dropping blanks
fn parse_streaming_services(s: &str) -> Vec<String> {
    s.split('|')
        .map(str::trim)
        .filter(|service| !service.is_empty())
        .map(str::to_string)
        .collect()
}

/// Iterate over the non-empty lines of a file with 1-based line numbers
fn records(lines: &[String]) -> impl Iterator<Item = (usize, &str)> {
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

/// Parse the users.dat file
pub fn parse_users(path: &Path) -> Result<Vec<User>> {
    const FILE: &str = "users.dat";
    let lines = read_lines(path)?;
    let mut users = Vec::new();

    for (line_no, line) in records(&lines) {
        let fields = split_fields(line, 3, FILE, line_no)?;
        users.push(User {
            id: parse_field(fields[0], FILE, line_no, "userId")?,
            name: fields[1].trim().to_string(),
            admin: parse_admin_flag(fields[2])?,
        });
    }

    Ok(users)
}

/// Parse the movies.dat file
///
/// An empty slug column leaves the slug empty; the index derives one from
/// the title on insert.
pub fn parse_movies(path: &Path) -> Result<Vec<Movie>> {
    const FILE: &str = "movies.dat";
    let lines = read_lines(path)?;
    let mut movies = Vec::new();

    for (line_no, line) in records(&lines) {
        let fields = split_fields(line, 8, FILE, line_no)?;
        let title = fields[1].trim();
        if title.is_empty() {
            return Err(DataError::ParseError {
                file: FILE.to_string(),
                line: line_no,
                reason: "Missing title".to_string(),
            });
        }

        movies.push(Movie {
            id: parse_field(fields[0], FILE, line_no, "movieId")?,
            title: title.to_string(),
            english_title: optional_text(fields[2]),
            runtime: parse_optional(fields[3], FILE, line_no, "runtime")?.unwrap_or(0),
            rating: parse_optional(fields[4], FILE, line_no, "rating")?.unwrap_or(0.0),
            where_to_watch: optional_text(fields[5]),
            streaming_services: parse_streaming_services(fields[6]),
            slug: fields[7].trim().to_string(),
        });
    }

    Ok(movies)
}

/// Parse the categories.dat file
pub fn parse_categories(path: &Path) -> Result<Vec<Category>> {
    const FILE: &str = "categories.dat";
    let lines = read_lines(path)?;
    let mut categories = Vec::new();

    for (line_no, line) in records(&lines) {
        let fields = split_fields(line, 2, FILE, line_no)?;
        categories.push(Category {
            id: parse_field(fields[0], FILE, line_no, "categoryId")?,
            name: fields[1].trim().to_string(),
        });
    }

    Ok(categories)
}

/// Parse the genres.dat file
pub fn parse_genres(path: &Path) -> Result<Vec<Genre>> {
    const FILE: &str = "genres.dat";
    let lines = read_lines(path)?;
    let mut genres = Vec::new();

    for (line_no, line) in records(&lines) {
        let fields = split_fields(line, 2, FILE, line_no)?;
        genres.push(Genre {
            id: parse_field(fields[0], FILE, line_no, "genreId")?,
            name: fields[1].trim().to_string(),
        });
    }

    Ok(genres)
}

/// Parse the movie_genres.dat file into (movie, genre) pairs
pub fn parse_movie_genres(path: &Path) -> Result<Vec<(MovieId, GenreId)>> {
    const FILE: &str = "movie_genres.dat";
    let lines = read_lines(path)?;
    let mut tags = Vec::new();

    for (line_no, line) in records(&lines) {
        let fields = split_fields(line, 2, FILE, line_no)?;
        tags.push((
            parse_field(fields[0], FILE, line_no, "movieId")?,
            parse_field(fields[1], FILE, line_no, "genreId")?,
        ));
    }

    Ok(tags)
}

/// Parse the nominations.dat file
pub fn parse_nominations(path: &Path) -> Result<Vec<Nomination>> {
    const FILE: &str = "nominations.dat";
    let lines = read_lines(path)?;
    let mut nominations = Vec::new();

    for (line_no, line) in records(&lines) {
        let fields = split_fields(line, 4, FILE, line_no)?;
        nominations.push(Nomination {
            id: parse_field(fields[0], FILE, line_no, "nominationId")?,
            movie_id: parse_field(fields[1], FILE, line_no, "movieId")?,
            category_id: parse_field(fields[2], FILE, line_no, "categoryId")?,
            year: parse_field(fields[3], FILE, line_no, "year")?,
        });
    }

    Ok(nominations)
}

/// Parse the reviews.dat file
pub fn parse_reviews(path: &Path) -> Result<Vec<Review>> {
    const FILE: &str = "reviews.dat";
    let lines = read_lines(path)?;
    let mut reviews = Vec::new();

    for (line_no, line) in records(&lines) {
        let fields = split_fields(line, 6, FILE, line_no)?;
        reviews.push(Review {
            id: parse_field(fields[0], FILE, line_no, "reviewId")?,
            user_id: parse_field(fields[1], FILE, line_no, "userId")?,
            movie_id: parse_field(fields[2], FILE, line_no, "movieId")?,
            stars: parse_optional(fields[3], FILE, line_no, "stars")?,
            watched_on: parse_optional(fields[4], FILE, line_no, "watchedOn")?,
            comment: optional_text(fields[5]),
        });
    }

    Ok(reviews)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_movies_falls_back_to_latin1() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"1::Am\xE9lie::::122::8.3::::::\n").unwrap();

        let movies = parse_movies(file.path()).unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title, "Amélie");
        assert_eq!(movies[0].runtime, 122);
        assert!(movies[0].streaming_services.is_empty());
    }

    #[test]
    fn test_parse_movies_keeps_utf8() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all("2::Amélie::::122::8.3::::::amelie\n".as_bytes()).unwrap();

        let movies = parse_movies(file.path()).unwrap();
        assert_eq!(movies[0].title, "Amélie");
        assert_eq!(movies[0].slug, "amelie");
    }

    #[test]
    fn test_missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_movies(&dir.path().join("movies.dat")).unwrap_err();
        assert!(matches!(err, DataError::FileNotFound { .. }));
    }

    #[test]
    fn test_split_fields_keeps_separator_in_last_field() {
        let fields = split_fields("1::2::3::8::::great::fun", 6, "reviews.dat", 1).unwrap();
        assert_eq!(fields.len(), 6);
        assert_eq!(fields[5], "great::fun");
    }

    #[test]
    fn test_split_fields_reports_short_lines() {
        let err = split_fields("1::Best Picture", 3, "users.dat", 7).unwrap_err();
        assert!(matches!(
            err,
            DataError::FieldCountMismatch { expected: 3, found: 2, line: 7, .. }
        ));
    }

    #[test]
    fn test_parse_optional_blank_is_none() {
        let stars: Option<u8> = parse_optional("  ", "reviews.dat", 1, "stars").unwrap();
        assert_eq!(stars, None);

        let stars: Option<u8> = parse_optional("9", "reviews.dat", 1, "stars").unwrap();
        assert_eq!(stars, Some(9));
    }

    #[test]
    fn test_parse_admin_flag() {
        assert!(parse_admin_flag("1").unwrap());
        assert!(!parse_admin_flag("0").unwrap());
        assert!(!parse_admin_flag("").unwrap());
        assert!(parse_admin_flag("yes").is_err());
    }

    #[test]
    fn test_parse_streaming_services() {
        assert_eq!(
            parse_streaming_services("Netflix| Max ||"),
            vec!["Netflix".to_string(), "Max".to_string()]
        );
        assert!(parse_streaming_services("").is_empty());
    }
}
