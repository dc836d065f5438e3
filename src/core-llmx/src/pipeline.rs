//! The end-to-end generation pipeline.
//!
//! Fetcher -> filter -> validator -> generator. Callers receive either a
//! complete (possibly degraded) outcome or one clear top-level error;
//! nothing throws mid-pipeline.

use chrono::Utc;

use crate::config::PipelineConfig;
use crate::errors::{LlmxError, Result};
use crate::filter::{FilterRule, apply_rules, compile_rules};
use crate::http::HttpTransport;
use crate::manifest::{ManifestDocument, generate};
use crate::sitemap::{SitemapAnalysis, SitemapEntry, discover, fetch_recursive, normalize_domain};
use crate::store::{PlanGate, ProjectStore};
use crate::validate::{ValidationReport, validate_entries};

/// Everything one pipeline run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub manifest: ManifestDocument,
    pub report: ValidationReport,
    /// Analysis of the sitemap the run was fed from
    pub analysis: SitemapAnalysis,
    /// The entries that survived filtering, in manifest order
    pub entries: Vec<SitemapEntry>,
    /// The sitemap document the run resolved to
    pub sitemap_url: String,
}

/// Runs the whole pipeline against a domain or an explicit sitemap URL.
///
/// A bare domain goes through discovery first (the first responding
/// conventional path wins); a target that already names a document path is
/// fetched directly. Rules are compiled up front so a bad pattern fails
/// before any network traffic.
pub async fn run_pipeline<T: HttpTransport>(
    transport: &T,
    target: &str,
    rules: &[FilterRule],
    config: &PipelineConfig,
) -> Result<PipelineOutcome> {
    let compiled = compile_rules(rules)?;

    let sitemap_url = resolve_sitemap_url(transport, target).await?;
    tracing::info!("generating llms.txt from {}", sitemap_url);

    let fetched = fetch_recursive(transport, &sitemap_url, config).await?;
    tracing::debug!(
        "fetched {} entries ({} discovered, truncated: {})",
        fetched.entries.len(),
        fetched.analysis.total_discovered,
        fetched.analysis.truncated
    );

    let entries = apply_rules(fetched.entries, &compiled);
    tracing::debug!("{} entries kept after {} rules", entries.len(), compiled.len());

    let report = validate_entries(transport, &entries, config).await;
    let manifest = generate(&entries, rules, Utc::now())?;

    Ok(PipelineOutcome {
        manifest,
        report,
        analysis: fetched.analysis,
        entries,
        sitemap_url,
    })
}

/// Generates on behalf of a project: consult the plan gate, cap the URL
/// budget at the tier limit, run the pipeline, and hand the result to the
/// project store.
pub async fn generate_for_project<T, S, G>(
    transport: &T,
    store: &S,
    gate: &G,
    project_id: &str,
    target: &str,
    rules: &[FilterRule],
    config: &PipelineConfig,
) -> Result<PipelineOutcome>
where
    T: HttpTransport,
    S: ProjectStore,
    G: PlanGate,
{
    if !gate.may_generate(project_id).await? {
        return Err(LlmxError::QuotaDenied(format!(
            "project {} may not generate right now",
            project_id
        )));
    }

    let tier_budget = gate.max_urls(project_id).await?;
    let config = PipelineConfig {
        max_urls: config.max_urls.min(tier_budget),
        ..config.clone()
    };

    let outcome = run_pipeline(transport, target, rules, &config).await?;

    store.save_manifest(project_id, &outcome.manifest, &outcome.report).await?;
    tracing::info!("saved manifest for project {} (score {})", project_id, outcome.report.score);

    Ok(outcome)
}

/// Turns a pipeline target into a concrete sitemap URL.
async fn resolve_sitemap_url<T: HttpTransport>(transport: &T, target: &str) -> Result<String> {
    let normalized = normalize_domain(target)?;

    // a target that already names a document is used as-is
    if normalized.path() != "/" {
        return Ok(normalized.to_string());
    }

    let candidates = discover(transport, target).await?;
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| LlmxError::NoSitemapFound(target.to_string()))
}
