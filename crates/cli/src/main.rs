use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{DataIndex, UserId, Year};
use pipeline::{ListedMovie, MovieQueryParams};
use serde::Serialize;
use server::{AwardsOrchestrator, MovieDetails};
use standings::{RankingMode, Rankings};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Awards Tracker - follow a ceremony year's nominated movies with friends
#[derive(Parser)]
#[command(name = "awards-tracker")]
#[command(about = "Query nominated movies, watch progress and leaderboards", long_about = None)]
struct Cli {
    /// Path to the awards dataset directory
    #[arg(short, long, global = true, env = "AWARDS_DATA_DIR", default_value = "data/sample")]
    data_dir: PathBuf,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List a year's nominated movies
    Movies {
        /// Ceremony year (defaults to the most recent one)
        #[arg(long)]
        year: Option<Year>,

        /// Acting user, needed for watch filters and "my_rating"
        #[arg(long)]
        user_id: Option<UserId>,

        /// Title search (case-insensitive substring)
        #[arg(long)]
        query: Option<String>,

        /// watched | unwatched
        #[arg(long)]
        filter_by: Option<String>,

        /// Only movies nominated in this category
        #[arg(long)]
        category_id: Option<String>,

        /// duration | shortest | imdb_rating | my_rating | watched_by_mates |
        /// most_watched_by_mates | most_nominated
        #[arg(long)]
        sort_by: Option<String>,
    },

    /// Search a year's categories by name or nominated title
    Categories {
        #[arg(long)]
        year: Option<Year>,

        #[arg(long)]
        query: Option<String>,
    },

    /// Show how many of a year's movies a user has watched
    Progress {
        #[arg(long)]
        user_id: UserId,

        #[arg(long)]
        year: Option<Year>,
    },

    /// Show the leaderboard for a year
    Rankings {
        #[arg(long)]
        year: Option<Year>,

        /// User whose stats are highlighted
        #[arg(long)]
        user_id: Option<UserId>,

        /// goals | movies | minutes
        #[arg(long)]
        mode: Option<String>,
    },

    /// Show one movie by slug
    Movie {
        slug: String,

        #[arg(long)]
        year: Option<Year>,

        /// Viewing user; admins may open movies from any year
        #[arg(long)]
        user_id: Option<UserId>,
    },

    /// List the years with nominations
    Years,

    /// Run benchmark to test performance
    Benchmark {
        /// Number of index page requests to make
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let start = Instant::now();
    let data_index = Arc::new(
        DataIndex::load_from_files(&cli.data_dir)
            .with_context(|| format!("Failed to load awards dataset from {}", cli.data_dir.display()))?,
    );
    if !cli.json {
        eprintln!("{} Loaded dataset in {:?}", "✓".green(), start.elapsed());
    }

    let orchestrator = AwardsOrchestrator::new(data_index.clone());
    let json = cli.json;

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Movies {
            year,
            user_id,
            query,
            filter_by,
            category_id,
            sort_by,
        } => {
            let pairs = [
                ("query", query),
                ("filter_by", filter_by),
                ("category_id", category_id),
                ("sort_by", sort_by),
            ];
            let params = MovieQueryParams::from_pairs(
                pairs
                    .into_iter()
                    .filter_map(|(key, value)| value.map(|value| (key, value))),
            );
            handle_movies(&orchestrator, year, user_id, params, json)?
        }
        Commands::Categories { year, query } => handle_categories(&orchestrator, year, query, json)?,
        Commands::Progress { user_id, year } => handle_progress(&orchestrator, &data_index, user_id, year, json)?,
        Commands::Rankings { year, user_id, mode } => {
            let mode = RankingMode::from_param(mode.as_deref());
            handle_rankings(&orchestrator, year, user_id, mode, json)?
        }
        Commands::Movie { slug, year, user_id } => handle_movie(&orchestrator, slug, year, user_id, json)?,
        Commands::Years => handle_years(&orchestrator, json)?,
        Commands::Benchmark { requests } => handle_benchmark(orchestrator, &data_index, requests).await?,
    }

    Ok(())
}

fn resolve_year(orchestrator: &AwardsOrchestrator, year: Option<Year>) -> Result<Year> {
    match year {
        Some(year) => Ok(year),
        None => {
            let year = orchestrator.default_year()?;
            tracing::debug!("No year given, using {}", year);
            Ok(year)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Handle the 'movies' command
fn handle_movies(
    orchestrator: &AwardsOrchestrator,
    year: Option<Year>,
    user_id: Option<UserId>,
    params: MovieQueryParams,
    json: bool,
) -> Result<()> {
    let year = resolve_year(orchestrator, year)?;
    let movies = orchestrator.query_movies(year, user_id, &params)?;
    if json {
        return print_json(&movies);
    }

    println!(
        "{}",
        format!("Nominated movies of {} ({})", year, params.sort_by.label()).bold().blue()
    );
    print_movies(&movies);
    Ok(())
}

/// Handle the 'categories' command
fn handle_categories(
    orchestrator: &AwardsOrchestrator,
    year: Option<Year>,
    query: Option<String>,
    json: bool,
) -> Result<()> {
    let year = resolve_year(orchestrator, year)?;
    let results = orchestrator.query_categories(year, query.as_deref())?;
    if json {
        return print_json(&results);
    }

    println!("{}", format!("Categories of {}:", year).bold().blue());
    if results.is_empty() {
        println!("  No categories match");
        return Ok(());
    }
    for category in &results.categories {
        println!("{}{} (id {})", "• ".green(), category.name, category.id);
    }
    if results.matched_movies_count > 0 {
        println!("{} movie title(s) matched", results.matched_movies_count.to_string().cyan());
    }
    Ok(())
}

/// Handle the 'progress' command
fn handle_progress(
    orchestrator: &AwardsOrchestrator,
    data_index: &DataIndex,
    user_id: UserId,
    year: Option<Year>,
    json: bool,
) -> Result<()> {
    let name = display_name(data_index, user_id);
    let year = resolve_year(orchestrator, year)?;
    let progress = orchestrator.compute_progress(user_id, year)?;
    if json {
        return print_json(&progress);
    }

    println!("{}", format!("{} in {}", name, year).bold().blue());
    println!(
        "{}Watched {}/{} ({:.0}%)",
        "• ".green(),
        progress.watched,
        progress.total,
        progress.percent()
    );
    if progress.is_complete() {
        println!("{}", "All nominated movies watched!".green().bold());
    }
    Ok(())
}

/// Name shown for a user; unknown ids still get progress, just no name
fn display_name(data_index: &DataIndex, user_id: UserId) -> String {
    match data_index.get_user(user_id) {
        Some(user) => user.name.clone(),
        None => {
            tracing::warn!("User {} not found in dataset", user_id);
            format!("User {}", user_id)
        }
    }
}

/// Handle the 'rankings' command
fn handle_rankings(
    orchestrator: &AwardsOrchestrator,
    year: Option<Year>,
    user_id: Option<UserId>,
    mode: RankingMode,
    json: bool,
) -> Result<()> {
    let year = resolve_year(orchestrator, year)?;
    let rankings = orchestrator.compute_rankings(year, user_id, mode)?;
    if json {
        return print_json(&rankings);
    }
    print_rankings(&rankings);
    Ok(())
}

/// Handle the 'movie' command
fn handle_movie(
    orchestrator: &AwardsOrchestrator,
    slug: String,
    year: Option<Year>,
    user_id: Option<UserId>,
    json: bool,
) -> Result<()> {
    let year = resolve_year(orchestrator, year)?;
    let details = orchestrator
        .find_movie(year, &slug, user_id)?
        .ok_or_else(|| anyhow!("Movie '{}' not found in {}", slug, year))?;
    if json {
        return print_json(&details);
    }
    print_movie_details(&details);
    Ok(())
}

/// Handle the 'years' command
fn handle_years(orchestrator: &AwardsOrchestrator, json: bool) -> Result<()> {
    let years = orchestrator.available_years()?;
    if json {
        return print_json(&years);
    }
    if years.is_empty() {
        println!("No nominations yet (default year {})", orchestrator.default_year()?);
    }
    for year in years {
        println!("{}{}", "• ".green(), year);
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(orchestrator: AwardsOrchestrator, data_index: &DataIndex, requests: usize) -> Result<()> {
    if requests == 0 {
        bail!("Benchmark needs at least one request");
    }
    let users: Vec<UserId> = data_index.all_users().map(|user| user.id).collect();
    if users.is_empty() {
        bail!("Dataset has no users to benchmark with");
    }
    let year = orchestrator.default_year()?;

    // Random users, each asking for a random sort of the index page
    let sorts = ["", "duration", "my_rating", "watched_by_mates", "most_nominated"];
    let mut handles = vec![];
    for _ in 0..requests {
        let user = users[rand::random::<u32>() as usize % users.len()];
        let sort = sorts[rand::random::<u32>() as usize % sorts.len()];
        let orchestrator = orchestrator.clone();
        let handle = tokio::spawn(async move {
            let start = Instant::now();
            let params = MovieQueryParams::from_pairs([("sort_by", sort)]);
            orchestrator.movies_index_page(year, Some(user), params).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    let wall = Instant::now();
    let mut timings = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }
    let wall_time = wall.elapsed();

    let total_time: Duration = timings.iter().sum();
    let avg_latency = total_time / (timings.len() as u32);
    timings.sort();
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {}", requests);
    println!("Wall time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", requests as f32 / wall_time.as_secs_f32());

    Ok(())
}

/// Helper function to format and print a movie listing
fn print_movies(movies: &[ListedMovie]) {
    if movies.is_empty() {
        println!("  No movies match");
        return;
    }
    for (rank, listed) in movies.iter().enumerate() {
        let movie = &listed.movie;
        let english = movie
            .english_title
            .as_deref()
            .map(|title| format!(" ({})", title))
            .unwrap_or_default();
        println!(
            "{}. {}{} - {} min, IMDB {:.1}, {} nomination(s)",
            (rank + 1).to_string().green(),
            movie.title.bold(),
            english,
            movie.runtime,
            movie.rating,
            listed.nominations_count
        );
    }
}

fn print_rankings(rankings: &Rankings) {
    println!(
        "{}",
        format!("Leaderboard {} by {}", rankings.year, rankings.mode).bold().blue()
    );
    for entry in &rankings.entries {
        let line = format!(
            "{:>3}. {:<20} {:>3} categories {:>4} movies {:>6} min",
            entry.position,
            entry.user.name,
            entry.stats.completed_categories,
            entry.stats.watched_movies,
            entry.stats.watched_minutes
        );
        if Some(entry.user.id) == rankings.acting_user {
            println!("{}", line.yellow().bold());
        } else {
            println!("{}", line);
        }
    }

    let totals = &rankings.totals;
    println!(
        "{}{} participants, {} movies in {} categories ({} min)",
        "• ".cyan(),
        totals.participants,
        totals.movies,
        totals.categories,
        totals.runtime_minutes
    );
    println!(
        "{}{} movies watched in total ({} min)",
        "• ".cyan(),
        totals.watched_movies,
        totals.watched_minutes
    );
    if rankings.acting_user.is_some() && rankings.acting_user_stats().is_none() {
        println!("{}No stats for you yet this year", "• ".cyan());
    }
}

fn print_movie_details(details: &MovieDetails) {
    let movie = &details.movie;
    println!("{}", movie.title.bold().blue());
    if let Some(english) = &movie.english_title {
        println!("  {}", english.italic());
    }
    println!("{}{} min, IMDB {:.1}", "• ".green(), movie.runtime, movie.rating);
    if let Some(place) = &movie.where_to_watch {
        println!("{}Where to watch: {}", "• ".green(), place);
    }
    if !movie.streaming_services.is_empty() {
        println!("{}Streaming: {}", "• ".green(), movie.streaming_services.join(", "));
    }
    let genres: Vec<&str> = details.genres.iter().map(|g| g.name.as_str()).collect();
    if !genres.is_empty() {
        println!("{}Genres: {}", "• ".green(), genres.join(", "));
    }
    let categories: Vec<&str> = details.categories.iter().map(|c| c.name.as_str()).collect();
    if !categories.is_empty() {
        println!("{}Nominated for: {}", "• ".green(), categories.join(", "));
    }
    println!(
        "{}{} ({} rated)",
        "• ".cyan(),
        details.stats.average_stars_label(),
        details.stats.rated_count
    );
    if let Some(review) = &details.viewer_review {
        match review.stars {
            Some(stars) => println!("{}You gave it {} stars", "• ".yellow(), stars),
            None => println!("{}You marked it as not watched", "• ".yellow()),
        }
    }
    for review in &details.reviews {
        let stars = review
            .stars
            .map(|s| format!("{} stars", s))
            .unwrap_or_else(|| "not watched".to_string());
        let comment = review.comment.as_deref().unwrap_or("");
        println!("  - user {}: {} {}", review.user_id, stars, comment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use data_loader::{Category, Movie, Nomination, User};
    use pipeline::sort_label;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_movies_arguments_parse() {
        let cli = Cli::try_parse_from([
            "awards-tracker",
            "--data-dir",
            "/tmp/awards",
            "movies",
            "--year",
            "2024",
            "--sort-by",
            "shortest",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.data_dir, PathBuf::from("/tmp/awards"));
        assert!(cli.json);
        match cli.command {
            Commands::Movies { year, sort_by, .. } => {
                assert_eq!(year, Some(2024));
                assert_eq!(sort_label(sort_by.as_deref()), "Shortest");
            }
            _ => panic!("expected movies command"),
        }
    }

    fn small_index() -> DataIndex {
        let mut index = DataIndex::new();
        index.insert_user(User { id: 1, name: "Ada".to_string(), admin: false });
        index.insert_category(Category { id: 1, name: "Best Picture".to_string() });
        index.insert_movie(Movie {
            id: 1,
            title: "Dune".to_string(),
            english_title: None,
            runtime: 155,
            rating: 8.0,
            where_to_watch: None,
            streaming_services: vec![],
            slug: String::new(),
        });
        index.insert_nomination(Nomination { id: 1, movie_id: 1, category_id: 1, year: 2099 });
        index
    }

    #[test]
    fn test_display_name_for_unknown_user() {
        let index = small_index();
        assert_eq!(display_name(&index, 1), "Ada");
        assert_eq!(display_name(&index, 77), "User 77");
    }

    #[test]
    fn test_progress_for_unknown_user_succeeds() {
        let index = Arc::new(small_index());
        let orchestrator = AwardsOrchestrator::new(index.clone());

        assert!(handle_progress(&orchestrator, &index, 77, Some(2099), true).is_ok());
        let progress = orchestrator.compute_progress(77, 2099).unwrap();
        assert_eq!((progress.watched, progress.total), (0, 1));
    }
}
