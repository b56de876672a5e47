//! # Data Loader Crate
//!
//! This crate holds the awards record model and the read side the query
//! engine is built on.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Movie, Category, Genre, Nomination, Review, User, DataIndex)
//! - **parser**: Parse `::`-separated .dat files into Rust structs
//! - **index**: Load, index and validate a dataset directory
//! - **repository**: The `EntityRepository` trait and per-year `YearCatalog` snapshot
//! - **error**: Error types for loading and reading data
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{DataIndex, YearCatalog};
//! use std::path::Path;
//!
//! let index = DataIndex::load_from_files(Path::new("data/sample"))?;
//! let catalog = YearCatalog::load(&index, 2025)?;
//!
//! println!("{} movies nominated in 2025", catalog.movies.len());
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;
pub mod repository;

// Re-export commonly used types for convenience
pub use error::{DataError, Result};
pub use repository::{EntityRepository, YearCatalog};
pub use types::{
    // Type aliases
    CategoryId,
    GenreId,
    MovieId,
    NominationId,
    ReviewId,
    UserId,
    Year,
    // Core types
    Category,
    DataIndex,
    Genre,
    Movie,
    MovieStats,
    Nomination,
    Review,
    ReviewState,
    User,
    // Helpers
    slugify,
    MAX_STARS,
    MIN_STARS,
};
