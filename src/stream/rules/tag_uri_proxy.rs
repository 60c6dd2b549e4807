use super::{LineType, TransformContext, TransformRule};
use crate::hls::{UriAttribute, tag_name};

/// Tags whose `URI` attribute names a resource the player fetches.
const URI_TAGS: &[&str] = &[
    "#EXT-X-KEY",
    "#EXT-X-SESSION-KEY",
    "#EXT-X-MAP",
    "#EXT-X-MEDIA",
    "#EXT-X-I-FRAME-STREAM-INF",
];

/// Rule for rewriting the quoted `URI` attribute of key, map and rendition
/// tags. Relative and absolute values are both proxied so cross-origin keys
/// become reachable. Opt-in, see `RewriteConfig::tag_uris`.
pub struct TagUriProxyRule;

impl TransformRule for TagUriProxyRule {
    fn matches(&self, line: &str, line_type: &LineType, _context: &TransformContext) -> bool {
        *line_type == LineType::Directive
            && URI_TAGS.contains(&tag_name(line))
            && UriAttribute::find(line).is_some()
    }

    fn transform(&self, line: &str, context: &TransformContext) -> String {
        let Some(attr) = UriAttribute::find(line) else {
            return line.to_string();
        };

        let uri = attr.value(line);
        if uri.is_empty() || context.is_proxied(uri) {
            return line.to_string();
        }

        match context.resolve_url(uri) {
            Ok(resolved) => attr.replace(line, &context.build_proxy_url(&resolved)),
            Err(e) => {
                tracing::warn!("Leaving unresolvable tag URI as is: {uri} ({e})");
                line.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn create_test_context() -> TransformContext {
        TransformContext::new(
            Url::parse("https://cdn.example.com/vod/abc/index.m3u8").unwrap(),
            "https://myproxy.example.com/api/proxy",
        )
    }

    #[test]
    fn test_matches_key_tag() {
        let rule = TagUriProxyRule;
        let context = create_test_context();

        let line = r#"#EXT-X-KEY:METHOD=AES-128,URI="key.bin""#;
        assert!(rule.matches(line, &LineType::Directive, &context));
        assert!(!rule.matches("#EXT-X-KEY:METHOD=NONE", &LineType::Directive, &context));
        assert!(!rule.matches("#EXTINF:6.0,", &LineType::Directive, &context));
    }

    #[test]
    fn test_rewrites_absolute_key_uri() {
        let rule = TagUriProxyRule;
        let context = create_test_context();

        let line = r#"#EXT-X-KEY:METHOD=AES-128,URI="https://keys.other.com/k1",IV=0x1F"#;
        let result = rule.transform(line, &context);

        assert_eq!(
            result,
            r#"#EXT-X-KEY:METHOD=AES-128,URI="https://myproxy.example.com/api/proxy?url=https%3A%2F%2Fkeys.other.com%2Fk1",IV=0x1F"#
        );
    }

    #[test]
    fn test_rewrites_relative_map_uri() {
        let rule = TagUriProxyRule;
        let context = create_test_context();

        let line = r#"#EXT-X-MAP:URI="init.mp4",BYTERANGE="617@0""#;
        let result = rule.transform(line, &context);

        assert!(result.starts_with(
            r#"#EXT-X-MAP:URI="https://myproxy.example.com/api/proxy?url=https%3A%2F%2Fcdn.example.com%2Fvod%2Fabc%2Finit.mp4""#
        ));
        assert!(result.ends_with(r#",BYTERANGE="617@0""#));
    }

    #[test]
    fn test_already_proxied_uri_is_untouched() {
        let rule = TagUriProxyRule;
        let context = create_test_context();

        let line = r#"#EXT-X-KEY:METHOD=AES-128,URI="https://myproxy.example.com/api/proxy?url=https%3A%2F%2Fk""#;
        assert_eq!(rule.transform(line, &context), line);
    }
}
