//! Listing pass of the news job: one record per headline anchor.

use super::RecordExtractor;
use crate::index::{Document, Element, Predicate};
use crate::models::{AUTHOR, LINK, NA, Record, Schema, TITLE};
use std::sync::Arc;
use tracing::debug;

const TITLE_ATTR: &str = "data-content-title";
const AUTHOR_ATTR: &str = "data-content-author";
const HREF_ATTR: &str = "href";

/// Title the listing page carries on anchors that are not articles.
const NO_TITLE: &str = "None";

#[derive(Debug, Clone)]
pub struct ListingExtractor {
    predicate: Predicate,
    schema: Arc<Schema>,
}

impl ListingExtractor {
    pub fn new(selector: &str) -> Self {
        Self {
            predicate: Predicate::css(selector),
            schema: Schema::listing(),
        }
    }

    /// Anchors this pass reads.
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }
}

impl Default for ListingExtractor {
    fn default() -> Self {
        Self::new("h2 > a[href]")
    }
}

impl RecordExtractor for ListingExtractor {
    fn schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    fn select(&self, document: &Document) -> Vec<Element> {
        document.select_resolved(&self.predicate)
    }

    fn extract(&self, elements: &[Element]) -> Vec<Record> {
        elements
            .iter()
            .filter_map(|el| {
                let title = match el.attr(TITLE_ATTR) {
                    Some(title) if title != NO_TITLE => title,
                    _ => {
                        debug!(href = ?el.attr(HREF_ATTR), "Skipping untitled listing anchor");
                        return None;
                    }
                };
                Some(
                    Record::sentinel(&self.schema)
                        .with(TITLE, title)
                        .with(AUTHOR, el.attr(AUTHOR_ATTR).unwrap_or(NA))
                        .with(LINK, el.attr(HREF_ATTR).unwrap_or(NA)),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    const LISTING: &str = r#"
        <h2><a href="/business/2021/03/12/ringgit" data-content-title="Ringgit opens higher" data-content-author="Reuters">Ringgit</a></h2>
        <h2><a href="/business/markets" data-content-title="None">Markets</a></h2>
        <h2><a href="/business/more">More</a></h2>
        <h2><a href="https://www.thestar.com.my/business/2021/03/12/palm" data-content-title="Palm oil dips">Palm</a></h2>
        <h3><a href="/business/elsewhere" data-content-title="Not a headline">x</a></h3>
    "#;

    fn document() -> Document {
        Document::parse(LISTING, Url::parse("https://www.thestar.com.my/business").ok())
    }

    #[test]
    fn test_listing_filters_untitled_and_none() {
        let extractor = ListingExtractor::default();
        let records = extractor.extract_document(&document());

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get(TITLE), Some("Ringgit opens higher"));
        assert_eq!(records[0].get(AUTHOR), Some("Reuters"));
        assert_eq!(
            records[0].get(LINK),
            Some("https://www.thestar.com.my/business/2021/03/12/ringgit")
        );
        assert_eq!(records[1].get(TITLE), Some("Palm oil dips"));
        assert_eq!(records[1].get(AUTHOR), Some(NA));
        assert!(records.iter().all(|r| r.get(TITLE) != Some(NO_TITLE)));
    }

    #[test]
    fn test_no_matching_elements_is_empty() {
        let doc = Document::parse("<p>Nothing to see</p>", None);
        assert!(ListingExtractor::default().extract_document(&doc).is_empty());
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let extractor = ListingExtractor::default();
        let doc = document();
        assert_eq!(extractor.extract_document(&doc), extractor.extract_document(&doc));
    }
}
