//! Canned rule sets for common site shapes.
//!
//! Callers pick a preset by name instead of hand-authoring regexes.

use crate::filter::FilterRule;

/// The preset names [`preset_rules`] understands, in display order.
pub fn preset_names() -> &'static [&'static str] {
    &["blog", "docs", "ecommerce", "saas"]
}

/// The rule list for a named preset, or `None` for an unknown name.
pub fn preset_rules(name: &str) -> Option<Vec<FilterRule>> {
    match name {
        "blog" => Some(vec![
            FilterRule::exclude(r"/tag/").describe("Skip tag archives"),
            FilterRule::exclude(r"/category/").describe("Skip category archives"),
            FilterRule::exclude(r"/author/").describe("Skip author archives"),
            FilterRule::exclude(r"/page/\d+").describe("Skip pagination"),
        ]),
        "docs" => Some(vec![
            FilterRule::include(r"/(docs|guides|reference|api)/").describe("Documentation sections only"),
        ]),
        "ecommerce" => Some(vec![
            FilterRule::exclude(r"/(cart|checkout|account)").describe("Skip transactional pages"),
            FilterRule::exclude(r"\?(sort|filter|page)=").describe("Skip filtered listings"),
        ]),
        "saas" => Some(vec![
            FilterRule::exclude(r"/(login|signup|dashboard)").describe("Skip application pages"),
            FilterRule::exclude(r"/legal/").describe("Skip legal boilerplate"),
        ]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{compile_rules, should_keep};

    #[test]
    fn test_every_preset_name_resolves() {
        for name in preset_names() {
            let rules = preset_rules(name).unwrap_or_else(|| panic!("preset {} missing", name));
            assert!(!rules.is_empty());
            // every canned pattern must compile
            compile_rules(&rules).unwrap_or_else(|e| panic!("preset {} has a bad pattern: {}", name, e));
        }
    }

    #[test]
    fn test_unknown_preset_is_none() {
        assert!(preset_rules("weblog").is_none());
        assert!(preset_rules("").is_none());
    }

    #[test]
    fn test_blog_preset_drops_archives() {
        let rules = compile_rules(&preset_rules("blog").unwrap()).unwrap();
        assert!(should_keep("https://a.com/2024/hello-world", &rules));
        assert!(!should_keep("https://a.com/tag/rust", &rules));
        assert!(!should_keep("https://a.com/page/2", &rules));
    }

    #[test]
    fn test_docs_preset_keeps_docs_only() {
        let rules = compile_rules(&preset_rules("docs").unwrap()).unwrap();
        assert!(should_keep("https://a.com/docs/install", &rules));
        assert!(should_keep("https://a.com/api/v2/users", &rules));
        assert!(!should_keep("https://a.com/pricing", &rules));
    }

    #[test]
    fn test_ecommerce_preset_drops_transactional_pages() {
        let rules = compile_rules(&preset_rules("ecommerce").unwrap()).unwrap();
        assert!(should_keep("https://a.com/products/widget", &rules));
        assert!(!should_keep("https://a.com/cart", &rules));
        assert!(!should_keep("https://a.com/products?sort=price", &rules));
    }
}
