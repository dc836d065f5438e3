//! Rendering and textual validation of the `llms.txt` manifest.
//!
//! A manifest is two sections separated by a blank line: a robots.txt-style
//! directive section for human readers, and a delimited JSON block carrying
//! the same URL set for machine consumers. The two must stay referentially
//! consistent: same URLs, same order.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::filter::FilterRule;
use crate::sitemap::SitemapEntry;

/// First line of every generated manifest.
pub const HEADER_MARKER: &str = "# llms.txt";
/// Opening delimiter of the structured JSON block.
pub const DATA_BEGIN: &str = "# BEGIN LLMX DATA";
/// Closing delimiter of the structured JSON block.
pub const DATA_END: &str = "# END LLMX DATA";

/// Version tag embedded in the structured section.
const FORMAT_VERSION: &str = "1.0";

/// A rendered manifest.
#[derive(Debug, Clone)]
pub struct ManifestDocument {
    /// Comment header plus one `Allow:` line per URL
    pub directive_section: String,
    /// The delimited JSON twin of the directive section
    pub structured_section: String,
    /// Both sections joined with a blank line
    pub full_text: String,
}

/// The JSON payload of the structured section.
#[derive(Debug, Serialize, Deserialize)]
struct ManifestData {
    version: String,
    generated_at: String,
    total_urls: usize,
    rules: Vec<FilterRule>,
    urls: Vec<ManifestUrl>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ManifestUrl {
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    change_frequency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<f64>,
}

/// Renders the manifest for the given entries and applied rules.
///
/// Pure for a fixed `generated_at`: identical inputs at the same instant
/// produce byte-identical output. Entries appear in the order given,
/// whatever order survived filtering.
pub fn generate(
    entries: &[SitemapEntry],
    rules: &[FilterRule],
    generated_at: DateTime<Utc>,
) -> Result<ManifestDocument> {
    let timestamp = generated_at.to_rfc3339_opts(SecondsFormat::Secs, true);

    let mut directive = String::new();
    directive.push_str(&format!("{} - Generated by LLMX\n", HEADER_MARKER));
    directive.push_str(&format!("# Generated: {}\n", timestamp));
    directive.push_str(&format!("# Total URLs: {}\n", entries.len()));
    for rule in rules {
        match &rule.description {
            Some(description) => {
                directive.push_str(&format!("# Rule: {} {} ({})\n", rule.kind, rule.pattern, description));
            }
            None => {
                directive.push_str(&format!("# Rule: {} {}\n", rule.kind, rule.pattern));
            }
        }
    }
    directive.push('\n');
    for entry in entries {
        directive.push_str(&format!("Allow: {}\n", entry.location));
    }
    let directive_section = directive.trim_end().to_string();

    let data = ManifestData {
        version: FORMAT_VERSION.to_string(),
        generated_at: timestamp,
        total_urls: entries.len(),
        rules: rules.to_vec(),
        urls: entries
            .iter()
            .map(|entry| ManifestUrl {
                url: entry.location.clone(),
                last_modified: entry.last_modified.clone(),
                change_frequency: entry.change_frequency.clone(),
                priority: entry.priority,
            })
            .collect(),
    };
    let json = serde_json::to_string_pretty(&data)?;
    let structured_section = format!("{}\n{}\n{}", DATA_BEGIN, json, DATA_END);

    let full_text = format!("{}\n\n{}\n", directive_section, structured_section);

    Ok(ManifestDocument {
        directive_section,
        structured_section,
        full_text,
    })
}

/// Outcome of the textual well-formedness check.
#[derive(Debug, Clone)]
pub struct ManifestCheck {
    pub is_valid: bool,
    pub problems: Vec<String>,
}

/// Checks a manifest's textual well-formedness: the header marker, at
/// least one `Allow:` line, and a parseable delimited JSON block.
///
/// Never fails; defects come back as human-readable strings.
pub fn validate_manifest(text: &str) -> ManifestCheck {
    let mut problems = Vec::new();

    if !text.lines().any(|line| line.starts_with(HEADER_MARKER)) {
        problems.push(format!("missing '{}' header marker", HEADER_MARKER));
    }

    if !text.lines().any(|line| line.starts_with("Allow: ")) {
        problems.push("no 'Allow:' directive lines found".to_string());
    }

    match extract_data_block(text) {
        Some(block) => {
            if let Err(e) = serde_json::from_str::<serde_json::Value>(block) {
                problems.push(format!("structured data block is not valid JSON: {}", e));
            }
        }
        None => {
            problems.push(format!(
                "missing structured data block delimited by '{}' and '{}'",
                DATA_BEGIN, DATA_END
            ));
        }
    }

    ManifestCheck {
        is_valid: problems.is_empty(),
        problems,
    }
}

/// The text between the data delimiters, if both are present in order.
fn extract_data_block(text: &str) -> Option<&str> {
    let start = text.find(DATA_BEGIN)? + DATA_BEGIN.len();
    let end = text[start..].find(DATA_END)? + start;
    Some(&text[start..end])
}
