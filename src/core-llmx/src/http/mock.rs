//! Mock HTTP transport for testing
//!
//! This module provides a mock implementation of the `HttpTransport` trait
//! that serves scripted responses per URL, without making real requests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

use crate::errors::{LlmxError, Result};
use crate::http::{FetchedDocument, HttpTransport, ProbeResponse};

/// Mock HTTP transport for testing
///
/// Can be configured to:
/// - Serve a document body per URL
/// - Serve a detailed probe response per URL
/// - Simulate transport failures for specific URLs
pub struct MockTransport {
    /// Map of URL to document served by `get`
    documents: HashMap<String, FetchedDocument>,
    /// Map of URL to probe response served by `probe`
    probes: HashMap<String, ProbeResponse>,
    /// URLs whose requests fail at the transport level
    failing: HashSet<String>,
    /// Probe served for URLs with no specific configuration
    default_probe: Option<ProbeResponse>,
}

impl MockTransport {
    /// Create a new empty mock transport
    pub fn new() -> Self {
        Self {
            documents: HashMap::new(),
            probes: HashMap::new(),
            failing: HashSet::new(),
            default_probe: None,
        }
    }

    /// Create a mock serving one document
    pub fn with_document(url: &str, status: u16, body: &str) -> Self {
        let mut transport = Self::new();
        transport.add_document(url, status, body);
        transport
    }

    /// Add a document served by `get` for the given URL.
    /// Probes of the same URL answer with the document's status unless a
    /// specific probe is configured.
    pub fn add_document(&mut self, url: &str, status: u16, body: &str) {
        self.documents.insert(
            url.to_string(),
            FetchedDocument {
                status,
                body: body.to_string(),
            },
        );
    }

    /// Add a probe response served by `probe` for the given URL
    pub fn add_probe(&mut self, url: &str, probe: ProbeResponse) {
        self.probes.insert(url.to_string(), probe);
    }

    /// Serve this probe for any URL with no specific configuration
    pub fn set_default_probe(&mut self, probe: ProbeResponse) {
        self.default_probe = Some(probe);
    }

    /// Make every request for this URL fail at the transport level
    pub fn fail_url(&mut self, url: &str) {
        self.failing.insert(url.to_string());
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn probe(&self, url: &str) -> Result<ProbeResponse> {
        if self.failing.contains(url) {
            return Err(LlmxError::Transport(format!(
                "mock transport configured to fail for {}",
                url
            )));
        }

        if let Some(probe) = self.probes.get(url) {
            return Ok(probe.clone());
        }

        if let Some(document) = self.documents.get(url) {
            return Ok(ProbeResponse {
                status: document.status,
                ..ProbeResponse::default()
            });
        }

        if let Some(default) = &self.default_probe {
            return Ok(default.clone());
        }

        Err(LlmxError::Transport(format!(
            "mock transport has no probe configured for {}",
            url
        )))
    }

    async fn get(&self, url: &str) -> Result<FetchedDocument> {
        if self.failing.contains(url) {
            return Err(LlmxError::Transport(format!(
                "mock transport configured to fail for {}",
                url
            )));
        }

        self.documents.get(url).cloned().ok_or_else(|| {
            LlmxError::Transport(format!("mock transport has no document configured for {}", url))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_serves_document() {
        let transport = MockTransport::with_document("https://a.com/sitemap.xml", 200, "<urlset/>");
        let doc = transport.get("https://a.com/sitemap.xml").await.unwrap();
        assert_eq!(doc.status, 200);
        assert_eq!(doc.body, "<urlset/>");
    }

    #[tokio::test]
    async fn test_mock_probe_falls_back_to_document_status() {
        let transport = MockTransport::with_document("https://a.com/x", 404, "missing");
        let probe = transport.probe("https://a.com/x").await.unwrap();
        assert_eq!(probe.status, 404);
    }

    #[tokio::test]
    async fn test_mock_specific_probe_wins() {
        let mut transport = MockTransport::with_document("https://a.com/x", 200, "ok");
        transport.add_probe(
            "https://a.com/x",
            ProbeResponse {
                status: 301,
                canonical: Some("https://a.com/y".to_string()),
                ..ProbeResponse::default()
            },
        );

        let probe = transport.probe("https://a.com/x").await.unwrap();
        assert_eq!(probe.status, 301);
        assert_eq!(probe.canonical.as_deref(), Some("https://a.com/y"));
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let mut transport = MockTransport::new();
        transport.fail_url("https://a.com/x");

        assert!(transport.probe("https://a.com/x").await.is_err());
        assert!(transport.get("https://a.com/x").await.is_err());
    }

    #[tokio::test]
    async fn test_mock_unconfigured_url_is_an_error() {
        let transport = MockTransport::new();
        assert!(transport.probe("https://a.com/x").await.is_err());
        assert!(transport.get("https://a.com/x").await.is_err());
    }

    #[tokio::test]
    async fn test_mock_default_probe() {
        let mut transport = MockTransport::new();
        transport.set_default_probe(ProbeResponse::ok());

        let probe = transport.probe("https://anything.example").await.unwrap();
        assert_eq!(probe.status, 200);
    }
}
