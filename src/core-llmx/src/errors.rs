//! Error types for the llms.txt pipeline.
//!
//! Only conditions that abort a whole operation live here. Anything that
//! happens during discovery, nested sitemap fetches, or per-URL validation
//! is recovered locally and turned into a data-level signal (an analysis
//! warning or a validation issue) instead.

use thiserror::Error;

/// Main error type for llms.txt pipeline operations.
#[derive(Debug, Error)]
pub enum LlmxError {
    /// HTTP request failed at the client layer
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request failed inside a non-reqwest transport (fakes, proxies)
    #[error("request failed: {0}")]
    Transport(String),

    /// A required resource answered with a non-success status
    #[error("fetch failed for {url}: HTTP status {status}")]
    FetchStatus { url: String, status: u16 },

    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A filter rule pattern failed to compile
    #[error("invalid filter pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },

    /// Sitemap handling failed in a way that cannot degrade to a warning
    #[error("sitemap error: {0}")]
    Sitemap(String),

    /// No conventional sitemap path answered for the domain
    #[error("no sitemap found for {0}")]
    NoSitemapFound(String),

    /// Manifest structured-section serialization failed
    #[error("manifest serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The plan gate refused the generation request
    #[error("generation refused by plan gate: {0}")]
    QuotaDenied(String),
}

/// Type alias for Result with LlmxError
pub type Result<T> = std::result::Result<T, LlmxError>;
