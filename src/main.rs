//! # Tabular Scraper
//!
//! Two scraping jobs built on one pipeline:
//!
//! - **news**: reads The Star's business listing in headless Chrome, fetches
//!   every linked article, and writes Title/Author/Day/Date/Content to a
//!   `DDMMYY.csv` file
//! - **population**: pages through UNdata's population table for one or more
//!   reference years and collects the foreign-born totals per country
//!
//! ## Usage
//!
//! ```sh
//! tabular_scraper news -o ./out
//! tabular_scraper population 2019 --output foreign_born.csv
//! ```
//!
//! ## Architecture
//!
//! Data flows one way through the pipeline:
//! 1. **Source** ([`source`], [`browser`]): fetch a page as a parsed document
//! 2. **Index** ([`index`]): select elements by tag, attribute or class
//! 3. **Extract** ([`extract`]): turn elements into records, degrading bad
//!    records to `NA` fields instead of failing
//! 4. **Paginate** ([`paginator`]): walk every page of a paged query
//! 5. **Store** ([`store`]): merge record sets and export CSV

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod browser;
mod cli;
mod config;
mod error;
mod extract;
mod index;
mod models;
mod paginator;
mod scrapers;
mod source;
mod store;
mod utils;

use cli::{Cli, Command};
use config::Config;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("tabular_scraper starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = Config::load(args.config.as_deref())?;

    match args.command {
        Command::News { output_dir } => {
            // Fail before launching a browser if there is nowhere to write.
            if let Err(e) = ensure_writable_dir(&output_dir).await {
                error!(
                    path = %output_dir.display(),
                    error = %e,
                    "Output directory is not writable (fix perms or choose a different path)"
                );
                return Err(e.into());
            }

            let today = Local::now().date_naive();
            match scrapers::thestar::run(&config, &output_dir, today).await {
                Ok(path) => info!(path = %path.display(), "News scrape complete"),
                Err(e) => {
                    error!(error = %e, "News scrape failed");
                    return Err(e.into());
                }
            }
        }
        Command::Population { years, output } => {
            let records = match scrapers::undata::run(&config, &years).await {
                Ok(records) => records,
                Err(e) => {
                    error!(error = %e, "Population scrape failed");
                    return Err(e.into());
                }
            };
            info!(count = records.len(), "Population scrape complete");
            write_population(&records, output.as_deref())?;
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

/// Persist population records to `output`, or print them when no path is set.
fn write_population(records: &models::RecordCollection, output: Option<&Path>) -> Result<(), error::WriteError> {
    match output {
        Some(path) => store::export(records, path),
        None => store::write_csv(records, std::io::stdout().lock()).map_err(|source| {
            error::WriteError::Csv {
                path: "-".into(),
                source,
            }
        }),
    }
}
