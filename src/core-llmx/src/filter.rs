//! Ordered include/exclude rule filtering over sitemap entries.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::errors::{LlmxError, Result};
use crate::sitemap::SitemapEntry;

/// Whether a rule keeps matching URLs or drops them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Include,
    Exclude,
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleKind::Include => write!(f, "include"),
            RuleKind::Exclude => write!(f, "exclude"),
        }
    }
}

/// One filtering rule. Rules are evaluated in input order; order is
/// significant (see [`apply_rules`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRule {
    pub kind: RuleKind,
    /// Case-insensitive regular expression matched against the full location
    pub pattern: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FilterRule {
    /// An include rule for the given pattern.
    pub fn include(pattern: impl Into<String>) -> Self {
        Self {
            kind: RuleKind::Include,
            pattern: pattern.into(),
            description: None,
        }
    }

    /// An exclude rule for the given pattern.
    pub fn exclude(pattern: impl Into<String>) -> Self {
        Self {
            kind: RuleKind::Exclude,
            pattern: pattern.into(),
            description: None,
        }
    }

    /// Attaches a human-readable description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A rule whose pattern has been compiled.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub rule: FilterRule,
    regex: Regex,
}

/// Compiles every rule's pattern as a case-insensitive regex.
///
/// # Errors
///
/// Returns a [`LlmxError::Pattern`] for the first pattern that fails to
/// compile.
pub fn compile_rules(rules: &[FilterRule]) -> Result<Vec<CompiledRule>> {
    rules
        .iter()
        .map(|rule| {
            let regex = RegexBuilder::new(&rule.pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| LlmxError::Pattern {
                    pattern: rule.pattern.clone(),
                    source,
                })?;
            Ok(CompiledRule {
                rule: rule.clone(),
                regex,
            })
        })
        .collect()
}

/// Decides whether one location survives the rule list.
///
/// First failing rule wins: walking rules in order, an `Exclude` rule whose
/// pattern matches drops the entry immediately, and an `Include` rule whose
/// pattern does **not** match drops it immediately. An entry that never
/// fails a rule is kept. This is deliberately not "most specific wins" or
/// "last rule wins".
pub fn should_keep(location: &str, rules: &[CompiledRule]) -> bool {
    for compiled in rules {
        match compiled.rule.kind {
            RuleKind::Exclude => {
                if compiled.regex.is_match(location) {
                    return false;
                }
            }
            RuleKind::Include => {
                if !compiled.regex.is_match(location) {
                    return false;
                }
            }
        }
    }
    true
}

/// Applies the rules to a list of entries, keeping input order.
///
/// Pure and synchronous; an empty rule list is the identity.
pub fn apply_rules(entries: Vec<SitemapEntry>, rules: &[CompiledRule]) -> Vec<SitemapEntry> {
    if rules.is_empty() {
        return entries;
    }
    entries
        .into_iter()
        .filter(|entry| should_keep(&entry.location, rules))
        .collect()
}
