use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use aggression_analyzer::aggressiveness::{AggressivenessScorer, OpenAiCompletion};
use aggression_analyzer::config::Config;
use aggression_analyzer::models::{AnalyzedRow, Post};
use aggression_analyzer::moderation::openai::OpenAiModeration;
use aggression_analyzer::openai::client::OpenAiClient;
use aggression_analyzer::output::{export, terminal};
use aggression_analyzer::pipeline::Analyzer;
use aggression_analyzer::source::bluesky::BlueskySource;
use aggression_analyzer::source::{fetch_posts_or_empty, file, PostSource, DEFAULT_POST_LIMIT};

/// Aggression analyzer: rate social media posts for hostility.
///
/// Runs each post through a moderation classifier and a generative
/// aggressiveness rating, then combines both into one weighted score
/// for manual review.
#[derive(Parser)]
#[command(name = "aggression-analyzer", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze posts from a JSON file
    Analyze {
        /// JSON array of posts with a `content` field
        #[arg(long)]
        input: PathBuf,

        /// Write analyzed rows to this JSON file
        #[arg(long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Fetch a Bluesky account's recent posts into a JSON file
    Fetch {
        /// The handle to fetch (e.g. someone.bsky.social)
        handle: String,

        /// Number of posts to collect (default: 20)
        #[arg(long, default_value_t = DEFAULT_POST_LIMIT)]
        limit: usize,

        /// Where to write the posts (default: <handle>.posts.json)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Fetch a Bluesky account's recent posts and analyze them
    Scan {
        /// The handle to scan (e.g. someone.bsky.social)
        handle: String,

        /// Number of posts to collect (default: 20)
        #[arg(long, default_value_t = DEFAULT_POST_LIMIT)]
        limit: usize,

        /// Write analyzed rows to this JSON file
        #[arg(long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Show the effective weight table
    Weights,
}

/// Options shared by every command that runs the analysis.
#[derive(clap::Args)]
struct RunArgs {
    /// Number of posts to analyze in parallel (default: from config, 8)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Highlight posts whose total aggression reaches this value
    #[arg(long, default_value_t = terminal::DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Sampling temperature for the aggressiveness model
    #[arg(long)]
    temperature: Option<f32>,

    /// Nucleus sampling for the aggressiveness model
    #[arg(long)]
    top_p: Option<f32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("aggression_analyzer=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { input, output, run } => {
            let config = Config::load()?;
            let analyzer = build_analyzer(&config, &run)?;

            let posts = file::load_posts_file(&input)?;
            println!("Loaded {} posts from {}", posts.len(), input.display());

            let rows = analyze_with_progress(&analyzer, &posts).await;
            report(&rows, &analyzer, &run, output.as_deref())?;
        }

        Commands::Fetch {
            handle,
            limit,
            output,
        } => {
            let config = Config::load()?;
            let source = BlueskySource::new(&config.public_api_url, config.request_timeout)?;

            println!("Fetching up to {limit} posts from @{handle}...");
            let posts = source.fetch_posts(&handle, limit).await?;

            let path = output.unwrap_or_else(|| default_posts_path(&handle));
            file::write_posts_file(&path, &posts)?;
            println!("Saved {} posts to {}", posts.len(), path.display());
        }

        Commands::Scan {
            handle,
            limit,
            output,
            run,
        } => {
            let config = Config::load()?;
            // Build the analyzer first so a missing key fails before any network call.
            let analyzer = build_analyzer(&config, &run)?;
            let source = BlueskySource::new(&config.public_api_url, config.request_timeout)?;

            println!("Fetching up to {limit} posts from @{handle}...");
            let posts = fetch_posts_or_empty(&source, &handle, limit).await;

            if posts.is_empty() {
                println!("@{handle} has no posts to analyze.");
                return Ok(());
            }

            let rows = analyze_with_progress(&analyzer, &posts).await;
            report(&rows, &analyzer, &run, output.as_deref())?;
        }

        Commands::Weights => {
            let config = Config::load()?;
            let weights = config.load_weights()?;
            if let Some(path) = &config.weights_path {
                println!("Weights file: {}", path.display());
            }
            terminal::display_weights(&weights);
        }
    }

    Ok(())
}

/// Build the clients, scorer and weights for one run.
///
/// Fails fast on configuration problems (missing API key, unreadable
/// weights or prompt file) before any post is processed.
fn build_analyzer(config: &Config, run: &RunArgs) -> Result<Analyzer> {
    config.require_openai()?;

    let weights = config.load_weights()?;
    let template = config.load_prompt()?;

    let client = OpenAiClient::new(
        &config.openai_base_url,
        &config.openai_api_key,
        config.request_timeout,
    )?;

    let moderation = OpenAiModeration::new(client.clone(), config.moderation_model.clone());
    let scorer = AggressivenessScorer::new(Box::new(OpenAiCompletion::new(client)), template)
        .with_model(config.aggression_model.clone())
        .with_sampling(
            run.temperature.unwrap_or(config.temperature),
            run.top_p.unwrap_or(config.top_p),
        )
        .with_max_retries(config.max_retries);

    info!(
        moderation_model = %config.moderation_model,
        aggression_model = %config.aggression_model,
        temperature = scorer.temperature(),
        top_p = scorer.top_p(),
        "Analyzer ready"
    );

    Ok(Analyzer {
        moderation: Box::new(moderation),
        scorer,
        weights,
        concurrency: run.concurrency.unwrap_or(config.concurrency),
    })
}

/// Run the analysis with a terminal progress bar.
async fn analyze_with_progress(analyzer: &Analyzer, posts: &[Post]) -> Vec<AnalyzedRow> {
    println!(
        "Analyzing {} posts ({} concurrent)...",
        posts.len(),
        analyzer.concurrency.max(1)
    );

    let pb = ProgressBar::new(posts.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Analyzing [{bar:30}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut on_progress = |done: usize, _total: usize| pb.set_position(done as u64);
    let rows = analyzer.run(posts, Some(&mut on_progress)).await;

    pb.finish_and_clear();
    rows
}

/// Print the review table and optionally export the rows.
fn report(
    rows: &[AnalyzedRow],
    analyzer: &Analyzer,
    run: &RunArgs,
    output: Option<&Path>,
) -> Result<()> {
    terminal::display_results(rows, run.threshold);

    if let Some(path) = output {
        export::write_results(path, rows, &analyzer.weights)?;
        println!("\n{} {}", "Results saved to".bold(), path.display());
    }

    Ok(())
}

fn default_posts_path(handle: &str) -> PathBuf {
    PathBuf::from(format!("{}.posts.json", handle.trim_start_matches('@')))
}
