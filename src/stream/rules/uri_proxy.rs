use super::{LineType, TransformContext, TransformRule};

/// Rule for rewriting relative URI lines (segments, variants, keys listed
/// on their own line) into proxy URLs.
pub struct UriLineProxyRule;

impl TransformRule for UriLineProxyRule {
    fn matches(&self, _line: &str, line_type: &LineType, _context: &TransformContext) -> bool {
        line_type.is_rewrite_candidate()
    }

    fn transform(&self, line: &str, context: &TransformContext) -> String {
        let reference = line.trim_end();

        match context.resolve_url(reference) {
            Ok(resolved) => context.build_proxy_url(&resolved),
            Err(e) => {
                tracing::warn!("Leaving unresolvable playlist line as is: {reference} ({e})");
                line.to_string()
            }
        }
    }
}
