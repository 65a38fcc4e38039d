//! Record extraction strategies.
//!
//! Each strategy turns the elements selected from one page into zero or more
//! [`Record`]s:
//!
//! | Strategy | Module | Input | Output |
//! |----------|--------|-------|--------|
//! | Listing | [`listing`] | listing anchors | Title, Author, Link |
//! | Detail | [`detail`] | article paragraphs | Link, Day, Date, Author, Content |
//! | Stride table | [`stride`] | flattened table cells | CountryName, OtherAttribute, Value |
//!
//! Parsing a single record yields `Result<Record, ExtractionError>`. The
//! strategies hand that result to [`recover`], the one place where a failed
//! record becomes a sentinel-filled one, so a malformed article or table row
//! never aborts a run.

pub mod detail;
pub mod listing;
pub mod stride;

use crate::error::ExtractionError;
use crate::index::{Document, Element};
use crate::models::{Record, Schema};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::warn;

pub use detail::DetailExtractor;
pub use listing::ListingExtractor;
pub use stride::StrideTableExtractor;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digit regex"));

/// A page-layout-specific extraction strategy.
pub trait RecordExtractor {
    /// Schema of every record this extractor produces.
    fn schema(&self) -> Arc<Schema>;

    /// Pick the elements this strategy consumes out of `document`.
    fn select(&self, document: &Document) -> Vec<Element>;

    /// Convert one page's elements into records.
    fn extract(&self, elements: &[Element]) -> Vec<Record>;

    fn extract_document(&self, document: &Document) -> Vec<Record> {
        self.extract(&self.select(document))
    }
}

/// Map a failed record to an all-`NA` one.
pub fn recover(schema: &Arc<Schema>, result: Result<Record, ExtractionError>, context: &str) -> Record {
    result.unwrap_or_else(|e| {
        warn!(%context, error = %e, "Record extraction failed; using NA fields");
        Record::sentinel(schema)
    })
}

/// All digit runs in `text`, in order.
pub fn digit_runs(text: &str) -> Vec<&str> {
    DIGIT_RUN.find_iter(text).map(|m| m.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NA, TITLE};

    #[test]
    fn test_digit_runs() {
        assert_eq!(digit_runs("<td>1,234,567</td>"), vec!["1", "234", "567"]);
        assert!(digit_runs("of many").is_empty());
    }

    #[test]
    fn test_recover_maps_error_to_sentinel() {
        let schema = Schema::listing();
        let record = recover(&schema, Err(ExtractionError::MissingLine(1)), "test");
        assert_eq!(record, Record::sentinel(&schema));

        let ok = Record::sentinel(&schema).with(TITLE, "kept");
        let record = recover(&schema, Ok(ok.clone()), "test");
        assert_eq!(record, ok);
        assert_ne!(record.get(TITLE), Some(NA));
    }
}
