//! Server crate for the awards tracker.
//!
//! This crate contains the orchestrator that coordinates the query
//! pipelines, progress and rankings behind one entry point.

pub mod orchestrator;

pub use orchestrator::{AwardsOrchestrator, MovieDetails, MoviesIndexPage, OrchestratorConfig, DEFAULT_FALLBACK_YEAR};
