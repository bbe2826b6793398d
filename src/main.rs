//! comic-scrape CLI
//!
//! Merges Comicvine API data with a League of Comic Geeks page scrape and
//! emits the result as CSV, JSON, and HTML. Can optionally pre-fill the
//! Metron issue creation form for manual review.

use anyhow::Result;
use clap::{Parser, Subcommand};

use comic_scrape::fetch::{run_fetch, FetchArgs};
use comic_scrape::prompt::StdinPrompter;
use comic_scrape::scrape::{run_scrape, ScrapeArgs};

#[derive(Parser)]
#[command(name = "comic-scrape")]
#[command(version)]
#[command(about = "Comic issue metadata scraper")]
#[command(
    long_about = "Merges Comicvine API data with a League of Comic Geeks page scrape.\n\nCommands:\n  fetch    Fetch, merge, and emit issue metadata\n  scrape   Scrape a single LCG page and print the fields as JSON"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, merge, and emit issue metadata (CSV/JSON/HTML)
    Fetch(FetchArgs),
    /// Scrape a single LCG page and print the extracted fields as JSON
    Scrape(ScrapeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch(args) => run_fetch(args, &StdinPrompter).await,
        Commands::Scrape(args) => run_scrape(args).await,
    }
}
