//! # Standings Crate
//!
//! Per-user views over the awards data: what a user has recorded for each
//! movie, how far through a year's nominations they are, and how they place
//! against everyone else.
//!
//! ## Components
//!
//! ### UserContext
//! One user's reviews keyed by movie, exposing the tri-state
//! [`data_loader::ReviewState`] (no record / marked unwatched / watched).
//!
//! ### Progress Calculator
//! `(watched, total)` for a user and year.
//!
//! ### Ranking Engine
//! Leaderboard of every user active in a year, ordered by a
//! [`RankingMode`], plus totals over the whole board.
//!
//! ## Example Usage
//!
//! ```ignore
//! use standings::{compute_progress, RankingEngine, RankingMode};
//! use data_loader::DataIndex;
//! use std::sync::Arc;
//!
//! let index = Arc::new(DataIndex::load_from_files("data/sample".as_ref())?);
//!
//! let progress = compute_progress(index.as_ref(), user_id, 2025)?;
//! let rankings = RankingEngine::new(index.clone()).rank(2025, Some(user_id), RankingMode::Goals)?;
//! let mine = rankings.acting_user_stats();
//! ```

pub mod user_context;
pub mod progress;
pub mod ranking;

pub use progress::{compute_progress, Progress};
pub use ranking::{RankedUser, RankingEngine, RankingMode, RankingTotals, Rankings, UserStats};
pub use user_context::{build_user_context, user_movie_progress, MovieProgress, UserContext};
