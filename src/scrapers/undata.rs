//! UNdata foreign-born population scraper.
//!
//! For each reference year, pages through the UNdata population table and
//! keeps the "Both Sexes / Total / Total Foreign-Born" rows. Years run one
//! after another and their records are concatenated in argument order.

use crate::config::Config;
use crate::error::Result;
use crate::extract::StrideTableExtractor;
use crate::models::{RecordCollection, Schema};
use crate::paginator::{Paginator, UnDataQuery};
use crate::source::{HttpSource, PageSource};
use tracing::{info, instrument, warn};

/// Scrape every year in `years` over HTTP.
///
/// # Errors
///
/// Fails on the first page fetch or page-count failure of any year.
#[instrument(level = "info", skip_all, fields(years = ?years))]
pub async fn run(config: &Config, years: &[String]) -> Result<RecordCollection> {
    let http = HttpSource::new(&config.http)?;
    scan_years(config, http, years).await
}

pub async fn scan_years<S: PageSource>(
    config: &Config,
    source: S,
    years: &[String],
) -> Result<RecordCollection> {
    let paginator = Paginator::new(source, StrideTableExtractor::default());
    let mut all = RecordCollection::new(Schema::population());
    for year in years {
        let query = UnDataQuery::new(&config.population, year);
        let records = paginator.run(&query).await?;
        if records.is_empty() {
            warn!(%year, "No matching rows for year");
        }
        info!(%year, count = records.len(), "Year complete");
        all.extend(records);
    }
    Ok(all)
}
