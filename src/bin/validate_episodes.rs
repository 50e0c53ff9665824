//! Offline check of the episodes data file. Prints one line per problem and
//! exits non-zero when anything is wrong.

use clap::Parser;
use episode_showcase::{repository, validate, EpisodeRepository, SiteConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Validate episodes.json against the episode schema
#[derive(Parser)]
#[command(name = "validate-episodes")]
#[command(about = "Check the episodes data file for missing fields and bad values", long_about = None)]
struct Cli {
    /// Episodes JSON file (defaults to the configured data path)
    path: Option<PathBuf>,

    /// Site config file (TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// After a clean run, load the file and print the featured episode and tag index
    #[arg(long)]
    summary: bool,
}

/// Logs go to stderr; RUST_LOG overrides the default filter and
/// EPISODES_LOG_JSON=1 switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("episode_showcase=info,warn"));
    let json = std::env::var("EPISODES_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> ExitCode {
    // .env is optional
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("❌ Validation error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<bool> {
    let cfg = match &cli.config {
        Some(p) => SiteConfig::load_from(p)?,
        None => SiteConfig::load_default()?,
    };
    let path = cli.path.clone().unwrap_or_else(|| cfg.data_path.clone());

    let report = validate::validate_file(&path)?;
    println!("📋 Validating {} episodes...", report.checked);
    println!();

    for v in &report.violations {
        eprintln!("❌ {v}");
    }
    if !report.violations.is_empty() {
        println!();
    }

    if !report.is_valid() {
        println!(
            "❌ Validation failed with {} problem(s). Please fix the errors above.",
            report.violations.len()
        );
        return Ok(false);
    }
    println!("✅ All episodes are valid!");

    if cli.summary {
        let repo = EpisodeRepository::from_path(&path);
        let episodes = repo.load_all()?;
        match repository::featured(&episodes) {
            Some(ep) => println!("Featured: {} ({}, {})", ep.title, ep.slug, ep.formatted_duration()),
            None => println!("Featured: none"),
        }
        println!("Tags: {}", repository::collect_tags(&episodes).join(", "));
    }

    Ok(true)
}
