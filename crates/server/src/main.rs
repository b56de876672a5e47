//! Simple test harness for the awards orchestrator.
//!
//! Builds the movies index page for one user and year from a dataset
//! directory and logs what a page render would show.
//!
//! Usage: server [DATA_DIR] [USER_ID]

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use data_loader::DataIndex;
use pipeline::MovieQueryParams;
use server::AwardsOrchestrator;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,standings=debug,pipeline=debug")),
        )
        .init();

    let mut args = env::args().skip(1);
    let data_dir = PathBuf::from(args.next().unwrap_or_else(|| "data/sample".to_string()));
    let user_id = match args.next() {
        Some(raw) => Some(raw.parse().with_context(|| format!("Invalid user id '{}'", raw))?),
        None => None,
    };

    info!("Loading data index from {}...", data_dir.display());
    let data_index = Arc::new(DataIndex::load_from_files(&data_dir)?);
    let orchestrator = AwardsOrchestrator::new(data_index);

    let year = orchestrator.default_year()?;
    info!("Building movies index for {} (user: {:?})", year, user_id);
    let page = orchestrator
        .movies_index_page(year, user_id, MovieQueryParams::new())
        .await?;

    for (i, listed) in page.movies.iter().enumerate() {
        info!(
            "{}. {} - {} min, {} nominations",
            i + 1,
            listed.movie.title,
            listed.movie.runtime,
            listed.nominations_count
        );
    }
    if let Some(progress) = page.progress {
        info!("Progress: {}/{} ({:.0}%)", progress.watched, progress.total, progress.percent());
    }
    info!(
        "{} participants watched {} movies ({} minutes)",
        page.totals.participants, page.totals.watched_movies, page.totals.watched_minutes
    );

    Ok(())
}
