//! Command-line interface definitions.
//!
//! Options can also come from environment variables, and site-specific
//! defaults can be overridden with a YAML config file (see [`crate::config`]).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Scrape business news or UN population tables into CSV records.
///
/// # Examples
///
/// ```sh
/// # Today's business news into ./out/DDMMYY.csv
/// tabular_scraper news -o ./out
///
/// # Foreign-born population for two reference years
/// tabular_scraper population 2019 2020 --output foreign_born.csv
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, global = true, env = "SCRAPER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Scrape the business-news listing and every linked article
    News {
        /// Directory for the dated CSV file
        #[arg(short, long, env = "NEWS_OUTPUT_DIR", default_value = ".")]
        output_dir: PathBuf,
    },

    /// Scrape foreign-born population rows from UNdata
    Population {
        /// Reference years, scraped in the given order
        #[arg(required = true)]
        years: Vec<String>,

        /// CSV file to write; prints to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
