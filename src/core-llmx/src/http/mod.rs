//! The injected HTTP capability the pipeline performs all network I/O through.
//!
//! The fetcher and validator never talk to reqwest directly; they accept any
//! [`HttpTransport`], which keeps both testable against a scripted fake.

pub mod mock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::config::PipelineConfig;
use crate::errors::Result;

/// What a lightweight HEAD-style probe of a URL reported.
#[derive(Debug, Clone, Default)]
pub struct ProbeResponse {
    /// HTTP status code
    pub status: u16,
    /// Canonical target from a `Link: <...>; rel="canonical"` header, if any
    pub canonical: Option<String>,
    /// Raw `X-Robots-Tag` header value, if any
    pub robots: Option<String>,
    /// Whether the response carried a `WWW-Authenticate` challenge
    pub auth_challenge: bool,
    /// Parsed `Last-Modified` header, if present and well-formed
    pub last_modified: Option<DateTime<Utc>>,
}

impl ProbeResponse {
    /// A minimal successful probe, useful as a starting point in tests.
    pub fn ok() -> Self {
        Self {
            status: 200,
            ..Self::default()
        }
    }
}

/// A fetched document body with its status code.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub status: u16,
    pub body: String,
}

impl FetchedDocument {
    /// True when the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Interface to an HTTP client that can probe and fetch URLs.
///
/// The two operations mirror what the pipeline needs and nothing more:
/// a header-only existence/health probe, and a full text fetch.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issues a HEAD-style request and reports the headers the validator
    /// cares about. Transport-level failures (DNS, timeout, refused
    /// connection) are errors; any HTTP status is a successful probe.
    async fn probe(&self, url: &str) -> Result<ProbeResponse>;

    /// Issues a GET request and returns the status code and body text.
    async fn get(&self, url: &str) -> Result<FetchedDocument>;
}

/// Production [`HttpTransport`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a client with the configured User-Agent and request timeout.
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn probe(&self, url: &str) -> Result<ProbeResponse> {
        let response = self.client.head(url).send().await?;
        let headers = response.headers();

        let canonical = headers
            .get("link")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_canonical_link);
        let robots = headers
            .get("x-robots-tag")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let auth_challenge = headers.contains_key("www-authenticate");
        let last_modified = headers
            .get("last-modified")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Ok(ProbeResponse {
            status: response.status().as_u16(),
            canonical,
            robots,
            auth_challenge,
            last_modified,
        })
    }

    async fn get(&self, url: &str) -> Result<FetchedDocument> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(FetchedDocument { status, body })
    }
}

/// Extracts the canonical target from a `Link` header value.
///
/// Handles multi-valued headers; only the `rel="canonical"` part counts.
fn parse_canonical_link(value: &str) -> Option<String> {
    for part in value.split(',') {
        let part = part.trim();
        if !part.to_ascii_lowercase().contains("rel=\"canonical\"")
            && !part.to_ascii_lowercase().contains("rel=canonical")
        {
            continue;
        }
        let start = part.find('<')?;
        let end = part.find('>')?;
        if start < end {
            return Some(part[start + 1..end].to_string());
        }
    }
    None
}
