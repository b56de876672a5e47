//! Example: Print the leaderboard for a year
//!
//! Run with: cargo run --package standings --example leaderboard
//!
//! This example shows how to:
//! 1. Load the sample dataset
//! 2. Rank users under every ranking mode
//! 3. Show one user's progress

use data_loader::{DataIndex, EntityRepository};
use standings::{compute_progress, RankingEngine, RankingMode};
use std::path::Path;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let data_index = Arc::new(DataIndex::load_from_files(Path::new("data/sample"))?);
    let Some(year) = data_index.available_years()?.first().copied() else {
        println!("Dataset has no nominations");
        return Ok(());
    };

    let engine = RankingEngine::new(data_index.clone());
    for mode in RankingMode::ALL {
        let rankings = engine.rank(year, None, mode)?;
        println!("=== {} leaderboard ({}) ===", year, mode);
        for entry in &rankings.entries {
            println!(
                "{:>3}. {:<12} {:>3} movies {:>5} min {:>2} categories",
                entry.position,
                entry.user.name,
                entry.stats.watched_movies,
                entry.stats.watched_minutes,
                entry.stats.completed_categories
            );
        }
        println!();
    }

    let progress = compute_progress(data_index.as_ref(), 1, year)?;
    println!(
        "User 1 watched {}/{} ({:.0}%)",
        progress.watched,
        progress.total,
        progress.percent()
    );

    Ok(())
}
