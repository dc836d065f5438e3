//! Configuration for the llms.txt generation pipeline.
//!
//! Every bound the pipeline honors lives in one place instead of being
//! scattered across call sites as ad hoc constants.

/// Configuration for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum number of page URLs to carry through the pipeline (default: 500)
    pub max_urls: usize,
    /// Number of URLs probed concurrently per validation batch (default: 10)
    pub batch_size: usize,
    /// Maximum number of nested sitemaps expanded from a sitemap index (default: 3)
    pub nested_sitemap_cap: usize,
    /// Number of leading entries covered by the heuristic parsing pass (default: 10)
    pub heuristic_sample: usize,
    /// Sort entries by recency before truncating to `max_urls` (default: true)
    pub prefer_recent: bool,
    /// Per-request timeout in seconds (default: 10)
    pub request_timeout_secs: u64,
    /// User-Agent sent with every probe and fetch
    pub user_agent: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_urls: 500,
            batch_size: 10,
            nested_sitemap_cap: 3,
            heuristic_sample: 10,
            prefer_recent: true,
            request_timeout_secs: 10,
            user_agent: "LLMX/1.0 (+https://llmx.dev/bot)".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Creates a new builder for PipelineConfig.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

/// Builder for PipelineConfig.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    max_urls: Option<usize>,
    batch_size: Option<usize>,
    nested_sitemap_cap: Option<usize>,
    heuristic_sample: Option<usize>,
    prefer_recent: Option<bool>,
    request_timeout_secs: Option<u64>,
    user_agent: Option<String>,
}

impl PipelineConfigBuilder {
    /// Sets the maximum number of page URLs carried through the pipeline.
    pub fn max_urls(mut self, max_urls: usize) -> Self {
        self.max_urls = Some(max_urls);
        self
    }

    /// Sets the validation batch size (concurrent probes per batch).
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Sets the nested sitemap expansion cap.
    pub fn nested_sitemap_cap(mut self, cap: usize) -> Self {
        self.nested_sitemap_cap = Some(cap);
        self
    }

    /// Sets the number of entries covered by the heuristic parsing pass.
    pub fn heuristic_sample(mut self, sample: usize) -> Self {
        self.heuristic_sample = Some(sample);
        self
    }

    /// Sets whether entries are recency-sorted before truncation.
    pub fn prefer_recent(mut self, prefer_recent: bool) -> Self {
        self.prefer_recent = Some(prefer_recent);
        self
    }

    /// Sets the per-request timeout in seconds.
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// Sets the User-Agent sent with every request.
    pub fn user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = Some(user_agent);
        self
    }

    /// Builds the PipelineConfig, falling back to defaults for unset fields.
    pub fn build(self) -> PipelineConfig {
        let defaults = PipelineConfig::default();
        PipelineConfig {
            max_urls: self.max_urls.unwrap_or(defaults.max_urls),
            batch_size: self.batch_size.unwrap_or(defaults.batch_size),
            nested_sitemap_cap: self.nested_sitemap_cap.unwrap_or(defaults.nested_sitemap_cap),
            heuristic_sample: self.heuristic_sample.unwrap_or(defaults.heuristic_sample),
            prefer_recent: self.prefer_recent.unwrap_or(defaults.prefer_recent),
            request_timeout_secs: self
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_urls, 500);
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.nested_sitemap_cap, 3);
        assert_eq!(config.heuristic_sample, 10);
        assert!(config.prefer_recent);
        assert_eq!(config.request_timeout_secs, 10);
        assert!(config.user_agent.contains("LLMX"));
    }

    #[test]
    fn test_builder_overrides() {
        let config = PipelineConfig::builder()
            .max_urls(50)
            .batch_size(4)
            .prefer_recent(false)
            .user_agent("TestBot/0.1".to_string())
            .build();

        assert_eq!(config.max_urls, 50);
        assert_eq!(config.batch_size, 4);
        assert!(!config.prefer_recent);
        assert_eq!(config.user_agent, "TestBot/0.1");
        // untouched fields keep their defaults
        assert_eq!(config.nested_sitemap_cap, 3);
    }
}
