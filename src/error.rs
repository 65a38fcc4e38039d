//! Error types for the scraping pipeline.
//!
//! Failures fall into two groups:
//! - **Surfaced** errors abort the current run: [`FetchError`] (a page could
//!   not be reached), [`PageCountError`] (the amount of work could not be
//!   discovered), [`WriteError`] (export failed) and [`ConfigError`].
//! - **Local** errors ([`ExtractionError`]) describe why a single record could
//!   not be parsed. Extractors turn them into sentinel-filled records and they
//!   never travel past the record boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error returned by the `news` and `population` jobs.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    PageCount(#[from] PageCountError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A page could not be reached.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP request failed before a response arrived (DNS, TLS, timeout...).
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("request to {url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The browser driver failed to launch, navigate or snapshot the page.
    #[error("browser session error: {0}")]
    Browser(String),
}

/// Pagination metadata was missing or unparseable.
#[derive(Debug, Error)]
pub enum PageCountError {
    /// The page-count indicator element is absent from the first page.
    #[error("page count indicator `{indicator}` not found at {url}")]
    Missing { indicator: String, url: String },

    /// The indicator exists but carries no digits.
    #[error("page count indicator `{indicator}` has no digits: {text:?}")]
    NoDigits { indicator: String, text: String },
}

/// Why one record could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("marker {0:?} not found")]
    MissingMarker(&'static str),

    #[error("line {0} missing")]
    MissingLine(usize),

    #[error("date line has no comma: {0:?}")]
    MalformedDateLine(String),

    #[error("cell {index} out of range ({len} cells)")]
    CellOutOfRange { index: usize, len: usize },

    #[error("cell markup too short to trim: {0:?}")]
    MarkupTooShort(String),

    #[error("no digits in value cell: {0:?}")]
    NoDigits(String),
}

/// Export failed.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// The configuration file could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
