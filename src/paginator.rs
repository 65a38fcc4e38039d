//! Paged UNdata queries.
//!
//! The first page carries a `span#spanPageCountB` whose digits are the number
//! of result pages. [`Paginator::run`] reads it, then fetches pages
//! `1..=final_page` one after another and concatenates what the extractor
//! finds on each.

use crate::config::PopulationConfig;
use crate::error::{PageCountError, Result};
use crate::extract::{RecordExtractor, digit_runs};
use crate::index::{Document, Predicate};
use crate::models::RecordCollection;
use crate::source::PageSource;
use tracing::{info, instrument};

const PAGE_COUNT_ID: &str = "spanPageCountB";

/// Columns requested from UNdata, in the order the stride layout expects.
const COLUMNS: &str = "2,3,6,8,10,12,14,16,17,18";
const SORT: &str = "_countryEnglishNameOrderBy:asc,refYear:desc,areaCode:asc";

/// Builds the URL of one result page for a reference year.
#[derive(Debug, Clone)]
pub struct UnDataQuery {
    base_url: String,
    table_code: u32,
    year: String,
}

impl UnDataQuery {
    pub fn new(config: &PopulationConfig, year: &str) -> Self {
        Self {
            base_url: config.base_url.clone(),
            table_code: config.table_code,
            year: year.to_string(),
        }
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    /// URL of 1-based page `page`.
    pub fn page_url(&self, page: u32) -> String {
        let filter = format!("tableCode:{};refYear:{}", self.table_code, self.year);
        format!(
            "{}?d=POP&f={}&c={}&s={}&v={}",
            self.base_url,
            urlencoding::encode(&filter),
            COLUMNS,
            SORT,
            page
        )
    }
}

/// Drives an extractor over every page of a query.
pub struct Paginator<S, E> {
    source: S,
    extractor: E,
}

impl<S: PageSource, E: RecordExtractor> Paginator<S, E> {
    pub fn new(source: S, extractor: E) -> Self {
        Self { source, extractor }
    }

    /// Fetch every page of `query` and return all records in page order.
    ///
    /// Page 1 is fetched once to read the page count and again as the first
    /// page of results.
    ///
    /// # Arguments
    ///
    /// * `query` - The year-specific query to page through
    ///
    /// # Returns
    ///
    /// Records of pages `1..=final_page`, concatenated in page order.
    ///
    /// # Errors
    ///
    /// * [`crate::error::Error::Fetch`] if any page cannot be fetched
    /// * [`crate::error::Error::PageCount`] if page 1 carries no usable page count
    #[instrument(level = "info", skip_all, fields(year = %query.year()))]
    pub async fn run(&self, query: &UnDataQuery) -> Result<RecordCollection> {
        let first_url = query.page_url(1);
        let first = self.source.fetch(&first_url).await?;
        let final_page = page_count(&first, &first_url)?;
        drop(first);
        info!(final_page, "Discovered page count");

        let mut collection = RecordCollection::new(self.extractor.schema());
        for page in 1..=final_page {
            let url = query.page_url(page);
            let document = self.source.fetch(&url).await?;
            let records = self.extractor.extract_document(&document);
            info!(page, final_page, matched = records.len(), "Scanned page");
            collection.extend(records);
        }

        info!(count = collection.len(), "Pagination complete");
        Ok(collection)
    }
}

/// Number of result pages advertised by `document`.
///
/// Reads the first digit run of `span#spanPageCountB`, so `"of 12"` gives 12.
///
/// # Errors
///
/// [`PageCountError::Missing`] when the span is absent and
/// [`PageCountError::NoDigits`] when its text holds no number. `url` only
/// labels the error.
pub fn page_count(document: &Document, url: &str) -> std::result::Result<u32, PageCountError> {
    let indicator = Predicate::TagWithId {
        tag: "span".to_string(),
        id: PAGE_COUNT_ID.to_string(),
    };
    let span = document
        .select(&indicator)
        .into_iter()
        .next()
        .ok_or_else(|| PageCountError::Missing {
            indicator: indicator.to_css(),
            url: url.to_string(),
        })?;
    digit_runs(&span.text)
        .first()
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| PageCountError::NoDigits {
            indicator: indicator.to_css(),
            text: span.text.clone(),
        })
}
