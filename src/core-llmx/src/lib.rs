//! # llms.txt Generation Pipeline
//!
//! The functional core of LLMX: crawl a website's sitemap, apply ordered
//! include/exclude filtering rules, validate the surviving URLs, and emit
//! a dual-section `llms.txt` manifest for LLM crawlers.
//!
//! ## Features
//!
//! - Discover conventional sitemap locations for a domain
//! - Fetch and parse XML sitemaps, with bounded sitemap-index recursion
//! - Filter URLs with ordered case-insensitive regex rules
//! - Probe each URL in settle-all batches and derive an AI-readiness score
//! - Render and textually validate the `llms.txt` manifest
//!
//! All network I/O goes through the injected [`HttpTransport`] capability,
//! so every stage is testable against the scripted [`http::mock`]
//! transport. Persistence and plan/quota policy stay with the surrounding
//! application behind [`ProjectStore`] and [`PlanGate`].
//!
//! ## Examples
//!
//! ```no_run
//! use core_llmx::{FilterRule, PipelineConfig, ReqwestTransport, run_pipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::builder().max_urls(100).build();
//!     let transport = ReqwestTransport::new(&config)?;
//!     let rules = vec![FilterRule::exclude("/blog/")];
//!
//!     let outcome = run_pipeline(&transport, "example.com", &rules, &config).await?;
//!     println!("score: {}", outcome.report.score);
//!     println!("{}", outcome.manifest.full_text);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod batch;
pub mod common;
mod config;
mod errors;
mod filter;
pub mod http;
mod manifest;
mod pipeline;
mod presets;
mod sitemap;
mod store;
mod validate;

// Public API re-exports
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use errors::{LlmxError, Result};
pub use filter::{CompiledRule, FilterRule, RuleKind, apply_rules, compile_rules, should_keep};
pub use http::{FetchedDocument, HttpTransport, ProbeResponse, ReqwestTransport};
pub use manifest::{
    DATA_BEGIN, DATA_END, HEADER_MARKER, ManifestCheck, ManifestDocument, generate, validate_manifest,
};
pub use pipeline::{PipelineOutcome, generate_for_project, run_pipeline};
pub use presets::{preset_names, preset_rules};
pub use sitemap::{
    SITEMAP_CANDIDATE_PATHS, SitemapAnalysis, SitemapEntry, SitemapFetch, discover, fetch, fetch_recursive,
    normalize_domain,
};
pub use store::{PlanGate, ProjectStore};
pub use validate::{
    IssueCategory, Severity, ValidationIssue, ValidationReport, ValidationSummary, build_report, compute_score,
    detect_duplicates, probe_entries, simulate_llm_parsing, summarize, validate_entries,
};
