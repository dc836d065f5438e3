//! Sitemap discovery, fetching, and parsing.
//!
//! Supports leaf sitemaps (`<urlset>` of page entries) and sitemap indexes
//! (`<sitemapindex>` of references to other sitemaps), with bounded
//! recursive expansion of the latter. Parsing is structural: the parser
//! extracts the tags it knows and degrades to whatever it collected when
//! the XML is defective, recording the defect as an analysis warning.

use chrono::{DateTime, NaiveDate, Utc};
use futures::future::join_all;
use quick_xml::Reader;
use quick_xml::events::Event;
use url::Url;

use crate::config::PipelineConfig;
use crate::errors::{LlmxError, Result};
use crate::http::HttpTransport;

/// Conventional sitemap locations probed during discovery, in order.
pub const SITEMAP_CANDIDATE_PATHS: [&str; 3] = ["/sitemap.xml", "/sitemap_index.xml", "/sitemaps.xml"];

/// Upper bound on nested sitemap locations extracted from one index document.
const NESTED_LOCATION_LIMIT: usize = 10;

/// A single page entry in a leaf sitemap.
///
/// Immutable once parsed; uniqueness is by the exact `location` string
/// until the validator's duplicate pass normalizes.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    /// The page URL
    pub location: String,
    /// Raw `<lastmod>` value, if present
    pub last_modified: Option<String>,
    /// Raw `<changefreq>` value, if present
    pub change_frequency: Option<String>,
    /// Parsed `<priority>` value, if present and numeric
    pub priority: Option<f64>,
}

impl SitemapEntry {
    /// Creates an entry carrying only a location.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            last_modified: None,
            change_frequency: None,
            priority: None,
        }
    }

    /// The `<lastmod>` value as a UTC instant, when it parses as RFC 3339
    /// or as a plain `YYYY-MM-DD` date.
    pub fn parsed_last_modified(&self) -> Option<DateTime<Utc>> {
        let raw = self.last_modified.as_deref()?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }
}

/// What a fetch learned about a sitemap document, beyond its entries.
#[derive(Debug, Clone, Default)]
pub struct SitemapAnalysis {
    /// The sitemap URL this analysis describes
    pub source_url: String,
    /// Whether the document was a sitemap index
    pub has_nested_sitemaps: bool,
    /// Nested sitemap locations found in an index document (bounded)
    pub nested_sitemap_urls: Vec<String>,
    /// Leaf entry count before truncation
    pub total_discovered: usize,
    /// Whether entries were cut down to the configured budget
    pub truncated: bool,
    /// Non-fatal defects encountered along the way
    pub warnings: Vec<String>,
}

/// A fetched sitemap: its page entries plus the analysis.
#[derive(Debug, Clone)]
pub struct SitemapFetch {
    pub entries: Vec<SitemapEntry>,
    pub analysis: SitemapAnalysis,
}

/// Normalizes a user-supplied domain into a base URL, prefixing `https://`
/// when no scheme is given.
pub fn normalize_domain(domain: &str) -> Result<Url> {
    let trimmed = domain.trim().trim_end_matches('/');
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    Ok(Url::parse(&with_scheme)?)
}

/// Probes the conventional sitemap paths for a domain and returns every
/// candidate that answered with a success status, in probe order.
///
/// Probe failures are logged and skipped; discovery itself only fails on a
/// malformed domain.
pub async fn discover<T: HttpTransport>(transport: &T, domain: &str) -> Result<Vec<String>> {
    let base = normalize_domain(domain)?;

    let mut found = Vec::new();
    for path in SITEMAP_CANDIDATE_PATHS {
        let candidate = match base.join(path) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::debug!("cannot build sitemap candidate {}{}: {}", base, path, e);
                continue;
            }
        };

        match transport.probe(&candidate).await {
            Ok(probe) if (200..300).contains(&probe.status) => {
                tracing::debug!("sitemap candidate responded: {}", candidate);
                found.push(candidate);
            }
            Ok(probe) => {
                tracing::debug!("sitemap candidate {} answered HTTP {}", candidate, probe.status);
            }
            Err(e) => {
                tracing::debug!("sitemap probe failed for {}: {}", candidate, e);
            }
        }
    }

    Ok(found)
}

/// Fetches and parses one sitemap document.
///
/// A non-success HTTP status on this primary fetch is an error; everything
/// inside the document degrades to analysis warnings instead. Index
/// documents yield zero entries and up to ten nested locations; leaf
/// documents yield entries bounded by `config.max_urls`, recency-sorted
/// first when `config.prefer_recent` is set.
pub async fn fetch<T: HttpTransport>(
    transport: &T,
    sitemap_url: &str,
    config: &PipelineConfig,
) -> Result<SitemapFetch> {
    let document = transport.get(sitemap_url).await?;
    if !document.is_success() {
        return Err(LlmxError::FetchStatus {
            url: sitemap_url.to_string(),
            status: document.status,
        });
    }

    let parsed = parse_sitemap(&document.body);

    let mut analysis = SitemapAnalysis {
        source_url: sitemap_url.to_string(),
        has_nested_sitemaps: parsed.is_index,
        nested_sitemap_urls: parsed.nested,
        total_discovered: parsed.entries.len(),
        truncated: false,
        warnings: parsed.warnings,
    };

    if analysis.has_nested_sitemaps {
        return Ok(SitemapFetch {
            entries: Vec::new(),
            analysis,
        });
    }

    let (entries, truncated) = bound_entries(parsed.entries, config.max_urls, config.prefer_recent);
    analysis.truncated = truncated;

    Ok(SitemapFetch { entries, analysis })
}

/// Fetches a sitemap and, when it turns out to be an index, expands up to
/// `config.nested_sitemap_cap` nested sitemaps concurrently.
///
/// Nested fetches settle as a group; a failing nested sitemap is logged,
/// recorded as a warning, and skipped. The combined entries obey the same
/// budget and recency policy as a single leaf fetch.
pub async fn fetch_recursive<T: HttpTransport>(
    transport: &T,
    sitemap_url: &str,
    config: &PipelineConfig,
) -> Result<SitemapFetch> {
    let top = fetch(transport, sitemap_url, config).await?;
    if !top.analysis.has_nested_sitemaps {
        return Ok(top);
    }

    let mut analysis = top.analysis;
    let nested: Vec<String> = analysis
        .nested_sitemap_urls
        .iter()
        .take(config.nested_sitemap_cap)
        .cloned()
        .collect();

    tracing::debug!(
        "expanding sitemap index {} into {} nested sitemaps",
        analysis.source_url,
        nested.len()
    );

    let results = join_all(nested.iter().map(|nested_url| fetch(transport, nested_url, config))).await;

    let mut entries: Vec<SitemapEntry> = Vec::new();
    for (nested_url, result) in nested.iter().zip(results) {
        match result {
            Ok(child) => {
                analysis.warnings.extend(child.analysis.warnings);
                entries.extend(child.entries);
            }
            Err(e) => {
                tracing::warn!("skipping nested sitemap {}: {}", nested_url, e);
                analysis.warnings.push(format!("nested sitemap {} skipped: {}", nested_url, e));
            }
        }
    }

    analysis.total_discovered = entries.len();
    let (entries, truncated) = bound_entries(entries, config.max_urls, config.prefer_recent);
    analysis.truncated = truncated;

    Ok(SitemapFetch { entries, analysis })
}

/// Applies the URL budget: recency sort (entries without a parseable
/// timestamp sort oldest) before truncating when requested, document order
/// otherwise. Returns whether anything was cut.
fn bound_entries(
    mut entries: Vec<SitemapEntry>,
    max_count: usize,
    prefer_recent: bool,
) -> (Vec<SitemapEntry>, bool) {
    if entries.len() <= max_count {
        return (entries, false);
    }

    if prefer_recent {
        // stable sort: entries with equal (or missing) timestamps keep document order
        entries.sort_by_key(|e| {
            std::cmp::Reverse(e.parsed_last_modified().unwrap_or(DateTime::<Utc>::MIN_UTC))
        });
    }
    entries.truncate(max_count);
    (entries, true)
}

/// Outcome of structurally parsing one sitemap document.
struct ParsedSitemap {
    is_index: bool,
    nested: Vec<String>,
    entries: Vec<SitemapEntry>,
    warnings: Vec<String>,
}

/// Parses sitemap XML into entries or nested locations.
///
/// Detection is structural, not schema validation: a `<sitemapindex>` root
/// makes the document an index, and index and leaf syntax are mutually
/// exclusive in one parse: an index's coincidental `<url>` entries are
/// ignored, as are `<sitemap>` elements inside a leaf document. Malformed
/// XML stops the parse and keeps what was collected.
fn parse_sitemap(xml: &str) -> ParsedSitemap {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut parsed = ParsedSitemap {
        is_index: false,
        nested: Vec::new(),
        entries: Vec::new(),
        warnings: Vec::new(),
    };

    let mut current_location: Option<String> = None;
    let mut current_lastmod: Option<String> = None;
    let mut current_changefreq: Option<String> = None;
    let mut current_priority: Option<f64> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"sitemapindex" => {
                    parsed.is_index = true;
                }
                b"sitemap" | b"url" => {
                    // start of an entry of either kind
                    current_location = None;
                    current_lastmod = None;
                    current_changefreq = None;
                    current_priority = None;
                }
                b"loc" => {
                    current_location = read_text(&mut reader);
                }
                b"lastmod" => {
                    current_lastmod = read_text(&mut reader);
                }
                b"changefreq" => {
                    current_changefreq = read_text(&mut reader);
                }
                b"priority" => {
                    current_priority = read_text(&mut reader).and_then(|v| v.trim().parse::<f64>().ok());
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"sitemap" => {
                    if parsed.is_index
                        && parsed.nested.len() < NESTED_LOCATION_LIMIT
                        && let Some(location) = current_location.take()
                    {
                        parsed.nested.push(location);
                    }
                }
                b"url" => {
                    if !parsed.is_index
                        && let Some(location) = current_location.take()
                    {
                        parsed.entries.push(SitemapEntry {
                            location,
                            last_modified: current_lastmod.take(),
                            change_frequency: current_changefreq.take(),
                            priority: current_priority.take(),
                        });
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                parsed.warnings.push(format!("sitemap XML parsing stopped early: {}", e));
                break;
            }
            _ => {}
        }
    }

    parsed
}

/// Reads the text content following a start tag, unescaping entities.
fn read_text(reader: &mut Reader<&[u8]>) -> Option<String> {
    match reader.read_event() {
        Ok(Event::Text(text)) => text.unescape().ok().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
        _ => None,
    }
}
