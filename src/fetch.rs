//! fetch command: the full metadata pipeline
//!
//! Sequential flow: resolve inputs, fetch the issue from Comicvine, scrape
//! the LCG page, merge both into one Issue Record, emit CSV/JSON/HTML, and
//! optionally hand the record to the Metron form filler.

use anyhow::{Context, Result};
use clap::Args;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::comicvine::Comicvine;
use crate::emit::{write_all, OutputPaths};
use crate::form::{fill_metron_form, MetronCredentials};
use crate::prompt::Prompter;
use crate::record::build_record;
use crate::scrape::scrape_issue_page;
use crate::text::{extract_issue_id, truncate};

#[derive(Args)]
pub struct FetchArgs {
    /// Comicvine issue URL or numeric issue ID (prompted if omitted)
    #[arg(long)]
    pub issue: Option<String>,

    /// League of Comic Geeks issue page URL (prompted if omitted)
    #[arg(long)]
    pub page: Option<String>,

    /// Output directory for the emitted files
    #[arg(long, short, default_value = "./output")]
    pub output: PathBuf,

    /// Comicvine API key
    #[arg(long, env = "COMICVINE_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Fill the Metron create form without asking
    #[arg(long)]
    pub fill_form: bool,

    /// Skip the form-filling step entirely
    #[arg(long, conflicts_with = "fill_form")]
    pub no_form: bool,
}

pub async fn run_fetch(args: FetchArgs, prompter: &dyn Prompter) -> Result<()> {
    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create output directory {}", args.output.display()))?;
    let paths = OutputPaths::in_dir(&args.output);

    let issue_input = match &args.issue {
        Some(issue) => issue.clone(),
        None => prompter.ask("Enter the Comicvine Issue URL")?,
    };
    let issue_id = extract_issue_id(&issue_input)?;

    let page_url = match &args.page {
        Some(page) => page.clone(),
        None => prompter.ask("Enter the LCG Comic page URL")?,
    };
    url::Url::parse(&page_url).with_context(|| format!("Invalid page URL: {}", page_url))?;

    log_message(
        &paths.log,
        &format!("User Input - Comicvine Issue ID: {}", issue_id),
    );
    log_message(&paths.log, &format!("User Input - LCG URL: {}", page_url));

    match run_pipeline(&args, issue_id, &page_url, &paths, prompter).await {
        Ok(()) => Ok(()),
        Err(e) => {
            log_message(&paths.log, &format!("An error occurred: {:#}", e));
            Err(e)
        }
    }
}

async fn run_pipeline(
    args: &FetchArgs,
    issue_id: u64,
    page_url: &str,
    paths: &OutputPaths,
    prompter: &dyn Prompter,
) -> Result<()> {
    let comicvine = Comicvine::new(&args.api_key)?;
    let page_client = reqwest::Client::new();

    eprintln!("Fetching issue with ID {} from Comicvine...", issue_id);
    log_message(
        &paths.log,
        &format!("Fetching issue with ID {} from Comicvine...", issue_id),
    );

    // Fixed artificial delay before the API call
    tokio::time::sleep(Duration::from_secs(2)).await;
    let issue = comicvine.get_issue(issue_id).await?;

    eprintln!("Scraping {}", truncate(page_url, 80));
    let scraped = scrape_issue_page(&page_client, page_url).await?;

    let record = build_record(&issue, &scraped);

    eprintln!("\n--- Issue Details ---");
    for (name, value) in record.cells() {
        eprintln!("{}: {}", name, value);
    }
    eprintln!();

    write_all(&record, paths)?;
    log_message(
        &paths.log,
        &format!(
            "Data saved to:\n  - JSON: {}\n  - CSV: {}\n  - HTML: {}",
            paths.json.display(),
            paths.csv.display(),
            paths.html.display()
        ),
    );
    eprintln!(
        "Data saved to:\n  JSON: {}\n  CSV: {}\n  HTML: {}",
        paths.json.display(),
        paths.csv.display(),
        paths.html.display()
    );

    if !args.no_form {
        let fill = args.fill_form
            || prompter.confirm("Do you want to fill the Metron form with the data?", true)?;
        if fill {
            let credentials = MetronCredentials::from_env()?;
            // A failed fill leaves the emitted files in place
            if let Err(e) = fill_metron_form(&record, &credentials, prompter).await {
                eprintln!("Error filling form: {:#}", e);
                log_message(&paths.log, &format!("Error filling form: {:#}", e));
            }
        }
    }

    Ok(())
}

/// Append a line to the run log. Logging never fails the pipeline.
pub fn log_message(path: &Path, message: &str) {
    let result = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| writeln!(file, "{}", message));
    if let Err(e) = result {
        eprintln!("Failed to write log {}: {}", path.display(), e);
    }
}
