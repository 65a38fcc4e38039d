//! Detail pass of the news job.
//!
//! An article page is reduced to the text of its `<p>` elements. Those lines
//! follow a loose layout:
//!
//! ```text
//! 0: "Friday, 12 Mar 2021"      day, date
//! 1: "By Jane Doe"               optional byline
//! 2..: paragraphs                content
//! n: "... Tags / Keywords ..."   end marker
//! ```
//!
//! Content runs up to, but not including, the line just before the marker.

use super::{RecordExtractor, recover};
use crate::error::{ExtractionError, FetchError};
use crate::index::{Document, Element, Predicate};
use crate::models::{AUTHOR, CONTENT, DATE, DAY, LINK, NA, Record, RecordCollection, Schema};
use crate::source::PageSource;
use crate::utils::truncate_for_log;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument};

pub const END_MARKER: &str = "Tags / Keywords";

/// Pause after every detail-page fetch.
pub const DETAIL_FETCH_DELAY: Duration = Duration::from_secs(2);

/// Bylines are short; longer lines mentioning "by" are prose.
const MAX_BYLINE_CHARS: usize = 50;

#[derive(Debug, Clone)]
pub struct DetailExtractor {
    schema: Arc<Schema>,
    delay: Duration,
}

impl DetailExtractor {
    pub fn new(delay: Duration) -> Self {
        Self {
            schema: Schema::detail(),
            delay,
        }
    }

    /// Parse the paragraph lines of one article. `Link` is left as `NA`.
    pub fn parse_lines(&self, lines: &[String]) -> Result<Record, ExtractionError> {
        if lines.is_empty() {
            return Err(ExtractionError::MissingLine(0));
        }
        let marker = lines
            .iter()
            .rposition(|line| line.contains(END_MARKER))
            .ok_or(ExtractionError::MissingMarker(END_MARKER))?;
        let trim_index = marker
            .checked_sub(1)
            .ok_or(ExtractionError::MissingMarker(END_MARKER))?;

        let date_line = lines[0].replace('\n', "");
        let date_line = date_line.trim();
        let (day, date) = date_line
            .split_once(',')
            .ok_or_else(|| ExtractionError::MalformedDateLine(date_line.to_string()))?;

        let second = lines.get(1).ok_or(ExtractionError::MissingLine(1))?;
        let lowered = second.to_lowercase();
        let (author, content_start) =
            if lowered.contains("by") && second.chars().count() < MAX_BYLINE_CHARS {
                (strip_byline(&lowered).to_string(), 2)
            } else {
                (NA.to_string(), 1)
            };

        Ok(Record::sentinel(&self.schema)
            .with(DAY, day)
            .with(DATE, date.trim())
            .with(AUTHOR, author)
            .with(CONTENT, join_lines(lines, content_start, trim_index)))
    }

    /// Fetch every link in order and extract one detail record per link.
    ///
    /// Each fetch is followed by the configured pause, whether or not the page
    /// parsed. Pages that fail to parse still yield a record carrying their
    /// `Link` and `NA` everywhere else.
    ///
    /// # Arguments
    ///
    /// * `source` - Where article pages are fetched from
    /// * `links` - Absolute article URLs, in listing order
    ///
    /// # Returns
    ///
    /// One record per link, in the order of `links`, with the detail schema.
    ///
    /// # Errors
    ///
    /// The first [`FetchError`] aborts the pass; later links are not fetched.
    #[instrument(level = "info", skip_all, fields(count = links.len()))]
    pub async fn scrape<S: PageSource>(
        &self,
        source: &S,
        links: &[String],
    ) -> Result<RecordCollection, FetchError> {
        let records: Vec<Record> = stream::iter(links)
            .then(|link| async move {
                info!(%link, "Scraping article");
                let document = source.fetch(link).await?;
                let record = self
                    .extract_document(&document)
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| Record::sentinel(&self.schema))
                    .with(LINK, link.as_str());
                drop(document);
                debug!(
                    %link,
                    content = %truncate_for_log(record.get(CONTENT).unwrap_or(NA), 80),
                    "Parsed article"
                );
                sleep(self.delay).await;
                Ok::<_, FetchError>(record)
            })
            .try_collect()
            .await?;

        let mut collection = RecordCollection::new(self.schema());
        collection.extend(records);
        info!(count = collection.len(), "Scraped article details");
        Ok(collection)
    }
}

impl Default for DetailExtractor {
    fn default() -> Self {
        Self::new(DETAIL_FETCH_DELAY)
    }
}

impl RecordExtractor for DetailExtractor {
    fn schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    fn select(&self, document: &Document) -> Vec<Element> {
        document.select(&Predicate::tag("p"))
    }

    /// Always exactly one record: the article, or its `NA` stand-in.
    fn extract(&self, elements: &[Element]) -> Vec<Record> {
        let lines: Vec<String> = elements.iter().map(|el| el.text.clone()).collect();
        vec![recover(&self.schema, self.parse_lines(&lines), "article detail")]
    }
}

/// Remove leading and trailing `"by"` and the whitespace around the name.
fn strip_byline(line: &str) -> &str {
    line.trim()
        .trim_start_matches("by")
        .trim_end_matches("by")
        .trim()
}

/// Concatenate `lines[start..end]`; empty when the range is empty or inverted.
fn join_lines(lines: &[String], start: usize, end: usize) -> String {
    lines
        .get(start..end.min(lines.len()))
        .map(|slice| slice.concat())
        .unwrap_or_default()
}
