//! Page sources: turn a locator into a parsed [`Document`].
//!
//! [`HttpSource`] fetches over HTTP with reqwest. The browser-backed source
//! lives in [`crate::browser`] because its driver is synchronous.

use crate::config::HttpConfig;
use crate::error::FetchError;
use crate::index::Document;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Anything that can produce a [`Document`] for a URL.
pub trait PageSource {
    /// Fetch and parse the page at `locator`.
    async fn fetch(&self, locator: &str) -> Result<Document, FetchError>;
}

impl<T: PageSource> PageSource for &T {
    async fn fetch(&self, locator: &str) -> Result<Document, FetchError> {
        (**self).fetch(locator).await
    }
}

/// Plain HTTP GET source.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|source| FetchError::Http {
                url: String::new(),
                source,
            })?;
        Ok(Self { client })
    }
}

impl PageSource for HttpSource {
    #[instrument(level = "debug", skip_all, fields(url = %locator))]
    async fn fetch(&self, locator: &str) -> Result<Document, FetchError> {
        let http_err = |source| FetchError::Http {
            url: locator.to_string(),
            source,
        };

        let response = self.client.get(locator).send().await.map_err(http_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: locator.to_string(),
                status,
            });
        }
        let body = response.text().await.map_err(http_err)?;
        debug!(bytes = body.len(), %status, "Fetched page");

        Ok(Document::parse(&body, Url::parse(locator).ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Predicate;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source() -> HttpSource {
        HttpSource::new(&HttpConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_parses_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/business"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>one</p><p>two</p>"))
            .mount(&server)
            .await;

        let url = format!("{}/business", server.uri());
        let doc = source().fetch(&url).await.unwrap();
        assert_eq!(doc.select(&Predicate::tag("p")).len(), 2);
        assert_eq!(doc.url().map(Url::as_str), Some(url.as_str()));
    }

    #[tokio::test]
    async fn test_non_success_status_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = source().fetch(&server.uri()).await.err().unwrap();
        match err {
            FetchError::Status { status, .. } => assert_eq!(status.as_u16(), 503),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_is_fetch_error() {
        let err = source().fetch("http://127.0.0.1:1/").await.err().unwrap();
        assert!(matches!(err, FetchError::Http { .. }));
    }
}
