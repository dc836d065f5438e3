//! Collaborator seams for persistence and plan gating.
//!
//! The surrounding application owns projects, billing tiers, and storage.
//! The core only needs two capabilities from it: somewhere to hand a
//! finished manifest, and an answer to "may this project generate, and how
//! many URLs is its tier allowed". Both are injected so the pipeline never
//! grows platform knowledge.

use async_trait::async_trait;

use crate::errors::Result;
use crate::manifest::ManifestDocument;
use crate::validate::ValidationReport;

/// Interface to the project storage service a generated manifest is handed
/// to. The core writes and never reads back.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn save_manifest(
        &self,
        project_id: &str,
        manifest: &ManifestDocument,
        report: &ValidationReport,
    ) -> Result<()>;
}

/// Interface to the billing/plan policy that gates generation.
#[async_trait]
pub trait PlanGate: Send + Sync {
    /// Whether this project may generate right now.
    async fn may_generate(&self, project_id: &str) -> Result<bool>;

    /// The maximum URL count for this project's tier.
    async fn max_urls(&self, project_id: &str) -> Result<usize>;
}
