pub mod tag_uri_proxy;
pub mod uri_proxy;

use super::{classifier::LineType, context::TransformContext};
use crate::config::RewriteConfig;

pub use tag_uri_proxy::TagUriProxyRule;
pub use uri_proxy::UriLineProxyRule;

/// Trait for transform rules.
///
/// A rule replaces one line with exactly one line, so rewritten playlists
/// keep their line count and order.
pub trait TransformRule: Send + Sync {
    /// Check if this rule should be applied.
    fn matches(&self, line: &str, line_type: &LineType, context: &TransformContext) -> bool;

    /// Transform the line.
    fn transform(&self, line: &str, context: &TransformContext) -> String;
}

/// Create default set of transform rules.
pub fn default_rules() -> Vec<Box<dyn TransformRule>> {
    vec![Box::new(UriLineProxyRule)]
}

/// Rules for the configured rewrite options.
pub fn rules_for(config: &RewriteConfig) -> Vec<Box<dyn TransformRule>> {
    let mut rules = default_rules();
    if config.tag_uris {
        rules.push(Box::new(TagUriProxyRule));
    }
    rules
}
