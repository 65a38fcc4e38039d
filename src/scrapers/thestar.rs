//! The Star business-news scraper.
//!
//! 1. **Listing**: open the business page in Chrome (its headlines are
//!    rendered client-side) and read title, author and link from every
//!    headline anchor.
//! 2. **Detail**: fetch each article over HTTP and parse day, date, byline
//!    and body text, pausing after each fetch.
//! 3. **Merge**: left join details onto listings by link; the detail byline
//!    replaces the listing author.
//! 4. **Export**: write Title, Author, Day, Date, Content to `DDMMYY.csv`.

use crate::browser;
use crate::config::Config;
use crate::error::{FetchError, Result};
use crate::extract::{DetailExtractor, ListingExtractor, RecordExtractor};
use crate::models::{LINK, NA, RecordCollection, Schema};
use crate::source::{HttpSource, PageSource};
use crate::store;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Scrape today's business news and export it under `output_dir`.
///
/// # Returns
///
/// Path of the written `DDMMYY.csv` file for `today`.
///
/// # Errors
///
/// Browser or article fetch failures, and export failures. Articles that
/// fetch but do not parse are exported with `NA` fields.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn run(config: &Config, output_dir: &Path, today: NaiveDate) -> Result<PathBuf> {
    let listing_extractor = ListingExtractor::new(&config.news.listing_selector);
    let anchors = browser::read_listing(&config.news, listing_extractor.predicate().clone()).await?;

    let mut listing = RecordCollection::new(listing_extractor.schema());
    listing.extend(listing_extractor.extract(&anchors));
    info!(anchors = anchors.len(), articles = listing.len(), "Indexed listing page");

    let http = HttpSource::new(&config.http)?;
    let articles = scrape_articles(&listing, &http, &DetailExtractor::default()).await?;

    let path = output_dir.join(store::dated_filename(today));
    store::export(&articles, &path)?;
    info!(path = %path.display(), count = articles.len(), "Wrote article file");
    Ok(path)
}

/// Detail pass plus merge: one export-ready record per listing record.
pub async fn scrape_articles<S: PageSource>(
    listing: &RecordCollection,
    source: &S,
    detail: &DetailExtractor,
) -> std::result::Result<RecordCollection, FetchError> {
    let links: Vec<String> = listing
        .iter()
        .filter_map(|r| r.get(LINK))
        .filter(|link| *link != NA)
        .map(str::to_string)
        .collect();

    let details = detail.scrape(source, &links).await?;
    let merged = store::merge(listing, &details, LINK);
    Ok(store::project(&merged, Schema::article()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use crate::index::Document;
    use crate::models::{AUTHOR, CONTENT, DATE, DAY, TITLE};
    use std::time::Duration;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn listing_page(base: &str) -> String {
        format!(
            r#"<h2><a href="{base}/business/ringgit" data-content-title="Ringgit opens higher" data-content-author="Reuters">x</a></h2>
               <h2><a href="{base}/business/markets" data-content-title="None">Markets</a></h2>
               <h2><a href="/business/palm" data-content-title="Palm oil dips" data-content-author="Bernama">y</a></h2>"#
        )
    }

    #[tokio::test]
    async fn test_listing_detail_merge() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/business/ringgit"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<p>Friday, 12 Mar 2021</p><p>By Jane Doe</p><p>Ringgit up.</p><p>ad</p><p>Tags / Keywords</p>",
            ))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/business/palm"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>No marker here</p>"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/business/markets"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let base = server.uri();
        let doc = Document::parse(&listing_page(&base), Url::parse(&format!("{base}/business")).ok());
        let extractor = ListingExtractor::default();
        let mut listing = RecordCollection::new(extractor.schema());
        listing.extend(extractor.extract_document(&doc));
        assert_eq!(listing.len(), 2);

        let http = HttpSource::new(&HttpConfig::default()).unwrap();
        let articles = scrape_articles(&listing, &http, &DetailExtractor::new(Duration::ZERO))
            .await
            .unwrap();

        assert_eq!(articles.schema().fields(), &[TITLE, AUTHOR, DAY, DATE, CONTENT]);
        assert_eq!(articles.len(), 2);
        assert_eq!(
            articles.records()[0].values(),
            &["Ringgit opens higher", "jane doe", "Friday", "12 Mar 2021", "Ringgit up."]
        );
        // Detail pass failed, so its NA author replaces "Bernama".
        assert_eq!(
            articles.records()[1].values(),
            &["Palm oil dips", "NA", "NA", "NA", "NA"]
        );
    }
}
