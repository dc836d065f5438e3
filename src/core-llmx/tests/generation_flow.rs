//! End-to-end pipeline tests over a scripted transport: no network traffic.

use async_trait::async_trait;
use std::sync::Mutex;

use core_llmx::http::mock::MockTransport;
use core_llmx::{
    FilterRule, LlmxError, ManifestDocument, PipelineConfig, PlanGate, ProjectStore, Result, ValidationReport,
    generate_for_project, run_pipeline, validate_manifest,
};
use indoc::indoc;

/// Project store fake that records every save.
#[derive(Default)]
struct MemoryStore {
    saved: Mutex<Vec<(String, String, u8)>>,
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn save_manifest(&self, project_id: &str, manifest: &ManifestDocument, report: &ValidationReport) -> Result<()> {
        self.saved
            .lock()
            .unwrap()
            .push((project_id.to_string(), manifest.full_text.clone(), report.score));
        Ok(())
    }
}

/// Plan gate fake with a fixed answer and tier budget.
struct FixedPlanGate {
    allow: bool,
    tier_max_urls: usize,
}

#[async_trait]
impl PlanGate for FixedPlanGate {
    async fn may_generate(&self, _project_id: &str) -> Result<bool> {
        Ok(self.allow)
    }

    async fn max_urls(&self, _project_id: &str) -> Result<usize> {
        Ok(self.tier_max_urls)
    }
}

fn example_sitemap() -> &'static str {
    indoc! {r#"
        <?xml version="1.0" encoding="UTF-8"?>
        <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
          <url>
            <loc>https://example.com/a</loc>
          </url>
          <url>
            <loc>https://example.com/b</loc>
            <lastmod>2020-01-01</lastmod>
          </url>
          <url>
            <loc>https://example.com/blog/c</loc>
            <lastmod>2024-01-01</lastmod>
          </url>
        </urlset>
    "#}
}

fn example_transport() -> MockTransport {
    let mut transport = MockTransport::new();
    transport.add_document("https://example.com/sitemap.xml", 200, example_sitemap());
    transport.set_default_probe(core_llmx::ProbeResponse::ok());
    transport
}

#[tokio::test]
async fn generates_manifest_for_domain_with_blog_excluded() {
    let transport = example_transport();
    let rules = vec![FilterRule::exclude("/blog/").describe("Skip blog posts")];

    let outcome = run_pipeline(&transport, "example.com", &rules, &PipelineConfig::default())
        .await
        .unwrap();

    assert_eq!(outcome.sitemap_url, "https://example.com/sitemap.xml");

    let kept: Vec<&str> = outcome.entries.iter().map(|e| e.location.as_str()).collect();
    assert_eq!(kept, vec!["https://example.com/a", "https://example.com/b"]);

    let allows: Vec<&str> = outcome
        .manifest
        .directive_section
        .lines()
        .filter(|line| line.starts_with("Allow: "))
        .collect();
    assert_eq!(
        allows,
        vec!["Allow: https://example.com/a", "Allow: https://example.com/b"]
    );
    assert!(!outcome.manifest.full_text.contains("Allow: https://example.com/blog/c"));

    // /b's 2020 lastmod is over a year old
    assert!(
        outcome
            .report
            .issues
            .iter()
            .any(|i| i.url == "https://example.com/b" && i.message.contains("over a year"))
    );
}

#[tokio::test]
async fn generated_manifest_round_trips_the_validator() {
    let transport = example_transport();

    let outcome = run_pipeline(&transport, "example.com", &[], &PipelineConfig::default())
        .await
        .unwrap();

    let check = validate_manifest(&outcome.manifest.full_text);
    assert!(check.is_valid, "unexpected problems: {:?}", check.problems);
}

#[tokio::test]
async fn expands_sitemap_index_through_the_pipeline() {
    let mut transport = MockTransport::new();
    transport.add_document(
        "https://example.com/sitemap_index.xml",
        200,
        indoc! {r#"
            <sitemapindex>
              <sitemap><loc>https://example.com/sitemap-a.xml</loc></sitemap>
              <sitemap><loc>https://example.com/sitemap-b.xml</loc></sitemap>
            </sitemapindex>
        "#},
    );
    transport.add_document(
        "https://example.com/sitemap-a.xml",
        200,
        "<urlset><url><loc>https://example.com/one</loc></url></urlset>",
    );
    transport.add_document(
        "https://example.com/sitemap-b.xml",
        200,
        "<urlset><url><loc>https://example.com/two</loc></url></urlset>",
    );
    transport.set_default_probe(core_llmx::ProbeResponse::ok());

    let outcome = run_pipeline(
        &transport,
        "https://example.com/sitemap_index.xml",
        &[],
        &PipelineConfig::default(),
    )
    .await
    .unwrap();

    assert!(outcome.analysis.has_nested_sitemaps);
    let kept: Vec<&str> = outcome.entries.iter().map(|e| e.location.as_str()).collect();
    assert_eq!(kept, vec!["https://example.com/one", "https://example.com/two"]);
}

#[tokio::test]
async fn project_generation_respects_the_plan_gate() {
    let transport = example_transport();
    let store = MemoryStore::default();
    let gate = FixedPlanGate {
        allow: false,
        tier_max_urls: 100,
    };

    let result = generate_for_project(
        &transport,
        &store,
        &gate,
        "proj-1",
        "example.com",
        &[],
        &PipelineConfig::default(),
    )
    .await;

    assert!(matches!(result, Err(LlmxError::QuotaDenied(_))));
    assert!(store.saved.lock().unwrap().is_empty());
}

#[tokio::test]
async fn project_generation_caps_budget_and_saves_once() {
    let transport = example_transport();
    let store = MemoryStore::default();
    let gate = FixedPlanGate {
        allow: true,
        tier_max_urls: 1,
    };

    let outcome = generate_for_project(
        &transport,
        &store,
        &gate,
        "proj-2",
        "example.com",
        &[],
        &PipelineConfig::default(),
    )
    .await
    .unwrap();

    // tier budget of 1 with prefer_recent keeps only the newest entry
    assert_eq!(outcome.entries.len(), 1);
    assert_eq!(outcome.entries[0].location, "https://example.com/blog/c");

    let saved = store.saved.lock().unwrap();
    assert_eq!(saved.len(), 1);
    let (project_id, manifest_text, score) = &saved[0];
    assert_eq!(project_id, "proj-2");
    assert!(manifest_text.contains("Allow: https://example.com/blog/c"));
    assert_eq!(*score, outcome.report.score);
}
