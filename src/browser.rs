//! Headless Chrome session for pages that only render their listings with
//! JavaScript.
//!
//! The session is a scoped resource: [`BrowserSession::open`] launches Chrome
//! and navigates to the start page, [`BrowserSession::find_all`] reads the
//! live DOM, and the browser is released exactly once, either by
//! [`BrowserSession::close`] or when the session is dropped on an error path.
//!
//! The driver is blocking, so async callers go through [`read_listing`],
//! which runs the whole session on tokio's blocking pool.

use crate::config::NewsConfig;
use crate::error::FetchError;
use crate::index::{Document, Element, Predicate};
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// The browser operations a session relies on.
pub trait Driver {
    /// Load `url` and wait for navigation to finish.
    fn navigate(&self, url: &str) -> Result<(), FetchError>;

    /// Serialized markup of the page as currently rendered.
    fn content(&self) -> Result<String, FetchError>;

    /// Release browser-side resources. Called once per driver.
    fn shutdown(&mut self);
}

/// Chrome over the DevTools protocol.
pub struct ChromeDriver {
    // Dropping the Browser terminates the Chrome process.
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeDriver {
    /// Launch an incognito Chrome with one blank tab.
    pub fn launch(config: &NewsConfig) -> Result<Self, FetchError> {
        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .args(vec![OsStr::new("--incognito")])
            .build()
            .map_err(|e| FetchError::Browser(e.to_string()))?;
        let browser = Browser::new(options).map_err(|e| FetchError::Browser(e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| FetchError::Browser(e.to_string()))?;
        Ok(Self {
            _browser: browser,
            tab,
        })
    }
}

impl Driver for ChromeDriver {
    fn navigate(&self, url: &str) -> Result<(), FetchError> {
        self.tab
            .navigate_to(url)
            .and_then(|t| t.wait_until_navigated())
            .map(|_| ())
            .map_err(|e| FetchError::Browser(format!("navigating to {url}: {e}")))
    }

    fn content(&self) -> Result<String, FetchError> {
        self.tab
            .get_content()
            .map_err(|e| FetchError::Browser(e.to_string()))
    }

    fn shutdown(&mut self) {
        if let Err(e) = self.tab.close(true) {
            warn!(error = %e, "Failed to close browser tab");
        }
    }
}

pub struct BrowserSession<D: Driver = ChromeDriver> {
    driver: Option<D>,
    url: String,
}

impl BrowserSession<ChromeDriver> {
    /// Launch an incognito Chrome and navigate to `config.start_url`.
    ///
    /// # Errors
    ///
    /// [`FetchError::Browser`] if Chrome cannot be started or the start page
    /// does not load. A browser that was already launched is released first.
    #[instrument(level = "info", skip_all, fields(url = %config.start_url))]
    pub fn open(config: &NewsConfig) -> Result<Self, FetchError> {
        Self::attach(ChromeDriver::launch(config)?, &config.start_url)
    }
}

impl<D: Driver> BrowserSession<D> {
    /// Take ownership of `driver` and navigate it to `url`.
    pub fn attach(driver: D, url: &str) -> Result<Self, FetchError> {
        // From here on `Drop` owns cleanup.
        let session = Self {
            driver: Some(driver),
            url: url.to_string(),
        };
        session.driver()?.navigate(url)?;
        info!(%url, "Browser session opened");
        Ok(session)
    }

    fn driver(&self) -> Result<&D, FetchError> {
        self.driver
            .as_ref()
            .ok_or_else(|| FetchError::Browser("session is closed".to_string()))
    }

    /// Snapshot the rendered page as a static [`Document`].
    pub fn snapshot(&self) -> Result<Document, FetchError> {
        let html = self.driver()?.content()?;
        debug!(bytes = html.len(), "Captured rendered DOM");
        Ok(Document::parse(&html, Url::parse(&self.url).ok()))
    }

    /// Elements of the live page matching `predicate`. Relative `href`
    /// attributes are resolved against the start URL.
    pub fn find_all(&self, predicate: &Predicate) -> Result<Vec<Element>, FetchError> {
        Ok(self.snapshot()?.select_resolved(predicate))
    }

    /// Release the session now instead of at drop.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(mut driver) = self.driver.take() {
            driver.shutdown();
            info!(url = %self.url, "Browser session closed");
        }
    }
}

impl<D: Driver> Drop for BrowserSession<D> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Open a session, read every element matching `predicate` from the start
/// page, and close the session again.
///
/// # Errors
///
/// [`FetchError::Browser`] if the session cannot be opened, the page cannot
/// be read, or the blocking task itself fails.
#[instrument(level = "info", skip_all, fields(url = %config.start_url))]
pub async fn read_listing(config: &NewsConfig, predicate: Predicate) -> Result<Vec<Element>, FetchError> {
    let config = config.clone();
    tokio::task::spawn_blocking(move || {
        let session = BrowserSession::open(&config)?;
        let elements = session.find_all(&predicate)?;
        session.close();
        Ok::<_, FetchError>(elements)
    })
    .await
    .map_err(|e| FetchError::Browser(format!("browser task failed: {e}")))?
}
