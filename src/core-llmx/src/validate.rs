//! Concurrent URL validation and the AI-readiness score.
//!
//! Every URL is probed once with a lightweight request; each check emits
//! zero or more issues and no per-URL failure is ever fatal to the run.
//! Scoring, duplicate detection, and the heuristic parsing pass are pure
//! functions over the collected data.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::batch::process_in_batches;
use crate::config::PipelineConfig;
use crate::errors::LlmxError;
use crate::http::{HttpTransport, ProbeResponse};
use crate::sitemap::SitemapEntry;

/// Path markers that usually indicate machine-generated listing pages.
const DYNAMIC_CONTENT_MARKERS: [&str; 5] = ["search?", "filter?", "page=", "sort=", "sessionid"];

/// What kind of defect an issue describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Status,
    Canonical,
    Robots,
    Freshness,
    Duplicate,
    Parsing,
}

/// How severe an issue is; drives both scoring and presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// One validation finding for one URL. Immutable once created; issues are
/// collected, never merged or deduplicated across categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub category: IssueCategory,
    pub severity: Severity,
    pub message: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    fn new(category: IssueCategory, severity: Severity, message: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            category,
            severity,
            message: message.into(),
            url: url.into(),
            suggestion: None,
        }
    }

    fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Issue counts by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
}

/// The outcome of a validation run. Derived data; recomputed on every run
/// and never persisted by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
    /// AI-readiness score, 0-100
    pub score: u8,
    pub summary: ValidationSummary,
}

/// Runs every validation pass over the entries and builds the report:
/// batched HTTP probes, the pure duplicate pass, and the heuristic parsing
/// pass over the first `config.heuristic_sample` entries (0 disables it).
pub async fn validate_entries<T: HttpTransport>(
    transport: &T,
    entries: &[SitemapEntry],
    config: &PipelineConfig,
) -> ValidationReport {
    let mut issues = probe_entries(transport, entries, config).await;
    issues.extend(detect_duplicates(entries));
    issues.extend(simulate_llm_parsing(entries, config.heuristic_sample));
    build_report(issues)
}

/// Probes each entry once, in sequential fixed-size batches whose members
/// run concurrently and settle together. A probe failure becomes a single
/// error-severity issue citing the reason; it never aborts the batch.
pub async fn probe_entries<T: HttpTransport>(
    transport: &T,
    entries: &[SitemapEntry],
    config: &PipelineConfig,
) -> Vec<ValidationIssue> {
    let now = Utc::now();

    let per_entry = process_in_batches(entries.to_vec(), config.batch_size, |entry, _index| async move {
        match transport.probe(&entry.location).await {
            Ok(probe) => {
                tracing::debug!("probed {} -> HTTP {}", entry.location, probe.status);
                issues_for_probe(&entry, &probe, now)
            }
            Err(e) => {
                tracing::debug!("probe failed for {}: {}", entry.location, e);
                vec![probe_failure_issue(&entry.location, &e)]
            }
        }
    })
    .await;

    per_entry.into_iter().flatten().collect()
}

/// The checks driven by one probe response.
fn issues_for_probe(entry: &SitemapEntry, probe: &ProbeResponse, now: DateTime<Utc>) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let url = entry.location.as_str();

    // status
    if probe.status >= 400 {
        let issue = ValidationIssue::new(
            IssueCategory::Status,
            Severity::Error,
            format!("URL returns HTTP {}", probe.status),
            url,
        )
        .suggest("Remove the URL from the sitemap or fix the page");
        issues.push(issue);
    } else if probe.status >= 300 {
        let suggestion = match &probe.canonical {
            Some(target) => format!("Reference the redirect target directly: {}", target),
            None => "Reference the redirect target directly".to_string(),
        };
        issues.push(
            ValidationIssue::new(
                IssueCategory::Status,
                Severity::Warning,
                format!("URL redirects (HTTP {})", probe.status),
                url,
            )
            .suggest(suggestion),
        );
    }

    // canonical
    if let Some(canonical) = &probe.canonical
        && canonical != url
    {
        issues.push(
            ValidationIssue::new(
                IssueCategory::Canonical,
                Severity::Warning,
                format!("Canonical URL differs from sitemap URL: {}", canonical),
                url,
            )
            .suggest(format!("List the canonical URL instead: {}", canonical)),
        );
    }

    // robots
    if let Some(robots) = &probe.robots {
        let directives = robots.to_lowercase();
        if directives.contains("noindex") || directives.contains("none") {
            issues.push(
                ValidationIssue::new(
                    IssueCategory::Robots,
                    Severity::Error,
                    "Page is excluded from indexing via X-Robots-Tag",
                    url,
                )
                .suggest("Remove the noindex directive or drop the URL from the sitemap"),
            );
        }
    }
    if probe.status == 401 || probe.auth_challenge {
        issues.push(
            ValidationIssue::new(
                IssueCategory::Robots,
                Severity::Error,
                "Page requires authentication (password-protected)",
                url,
            )
            .suggest("Crawlers cannot read protected pages; drop the URL from the sitemap"),
        );
    }

    // freshness: age since the sitemap-declared lastmod
    if let Some(last_modified) = entry.parsed_last_modified() {
        let age = now.signed_duration_since(last_modified);
        if age > Duration::days(365) {
            issues.push(
                ValidationIssue::new(
                    IssueCategory::Freshness,
                    Severity::Warning,
                    format!("Page has not been updated in over a year (lastmod {})", last_modified.date_naive()),
                    url,
                )
                .suggest("Review whether the content is still accurate"),
            );
        } else if age > Duration::days(90) {
            issues.push(ValidationIssue::new(
                IssueCategory::Freshness,
                Severity::Info,
                format!("Page has not been updated in over 90 days (lastmod {})", last_modified.date_naive()),
                url,
            ));
        }
    }

    issues
}

/// The single issue emitted when a probe fails outright.
fn probe_failure_issue(url: &str, error: &LlmxError) -> ValidationIssue {
    ValidationIssue::new(
        IssueCategory::Status,
        Severity::Error,
        format!("Request failed: {}", error),
        url,
    )
    .suggest("Check that the URL is reachable")
}

/// Computes the AI-readiness score from an issue list.
///
/// Start at 100; subtract 10 per error, 5 per warning, 2 per info; add a
/// flat +10 when no error-severity issue exists; clamp to [0, 100].
pub fn compute_score(issues: &[ValidationIssue]) -> u8 {
    let summary = summarize(issues);

    let mut score: i64 = 100;
    score -= 10 * summary.errors as i64;
    score -= 5 * summary.warnings as i64;
    score -= 2 * summary.info as i64;
    if summary.errors == 0 {
        score += 10;
    }
    score.clamp(0, 100) as u8
}

/// Counts issues by severity.
pub fn summarize(issues: &[ValidationIssue]) -> ValidationSummary {
    let mut summary = ValidationSummary::default();
    for issue in issues {
        match issue.severity {
            Severity::Error => summary.errors += 1,
            Severity::Warning => summary.warnings += 1,
            Severity::Info => summary.info += 1,
        }
    }
    summary
}

/// Wraps an issue list into a report with its score and summary.
pub fn build_report(issues: Vec<ValidationIssue>) -> ValidationReport {
    let score = compute_score(&issues);
    let summary = summarize(&issues);
    ValidationReport {
        issues,
        score,
        summary,
    }
}

/// Pure duplicate pass, separate from per-URL validation.
///
/// Locations are normalized by lowercasing the whole string and stripping
/// one trailing slash; each group with more than one member yields one
/// warning listing all members, in first-seen order.
pub fn detect_duplicates(entries: &[SitemapEntry]) -> Vec<ValidationIssue> {
    let mut groups: HashMap<String, Vec<&str>> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();

    for entry in entries {
        let normalized = normalize_location(&entry.location);
        let group = groups.entry(normalized.clone()).or_insert_with(|| {
            first_seen.push(normalized);
            Vec::new()
        });
        group.push(entry.location.as_str());
    }

    first_seen
        .iter()
        .filter_map(|normalized| {
            let members = &groups[normalized];
            if members.len() < 2 {
                return None;
            }
            Some(
                ValidationIssue::new(
                    IssueCategory::Duplicate,
                    Severity::Warning,
                    format!("Duplicate URLs after normalization: {}", members.join(", ")),
                    members[0],
                )
                .suggest("Keep one variant and drop the rest"),
            )
        })
        .collect()
}

fn normalize_location(location: &str) -> String {
    let lower = location.to_lowercase();
    match lower.strip_suffix('/') {
        Some(stripped) => stripped.to_string(),
        None => lower,
    }
}

/// Heuristic "LLM parsing simulation" over the first `sample` entries.
///
/// No network traffic; flags URL shapes that crawlers commonly mangle.
pub fn simulate_llm_parsing(entries: &[SitemapEntry], sample: usize) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for entry in entries.iter().take(sample) {
        let url = entry.location.as_str();

        if url.len() > 200 {
            issues.push(
                ValidationIssue::new(
                    IssueCategory::Parsing,
                    Severity::Warning,
                    format!("URL is very long ({} characters)", url.len()),
                    url,
                )
                .suggest("Long URLs are often truncated by crawlers; consider a shorter path"),
            );
        }

        let query_params = url
            .split_once('?')
            .map(|(_, query)| query.split('&').count())
            .unwrap_or(0);
        if query_params > 5 {
            issues.push(
                ValidationIssue::new(
                    IssueCategory::Parsing,
                    Severity::Warning,
                    format!("URL carries {} query parameters", query_params),
                    url,
                )
                .suggest("Parameter-heavy URLs usually point at filtered views, not content"),
            );
        }

        if url.chars().any(|c| !c.is_ascii()) {
            issues.push(ValidationIssue::new(
                IssueCategory::Parsing,
                Severity::Info,
                "URL contains non-ASCII characters",
                url,
            ));
        }

        let lower = url.to_lowercase();
        if let Some(marker) = DYNAMIC_CONTENT_MARKERS.iter().find(|m| lower.contains(*m)) {
            issues.push(ValidationIssue::new(
                IssueCategory::Parsing,
                Severity::Info,
                format!("URL looks like dynamic content ('{}')", marker),
                url,
            ));
        }
    }

    issues
}
