use super::context::TransformContext;

/// Represents the type of a line in an M3U8 playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    Blank,
    /// Tag or comment, anything starting with `#`.
    Directive,
    /// `http://` or `https://` reference, left as is.
    AbsoluteUri,
    /// Reference that already points back at this proxy.
    ProxiedUri,
    /// Reference resolved against the playlist directory and proxied.
    RelativeUri,
}

impl LineType {
    pub fn is_rewrite_candidate(&self) -> bool {
        matches!(self, Self::RelativeUri)
    }
}

/// Classifier for M3U8 lines.
pub struct LineClassifier;

impl LineClassifier {
    /// Classify a line from an M3U8 playlist.
    pub fn classify(line: &str, context: &TransformContext) -> LineType {
        let line = line.trim().trim_start_matches('\u{feff}');

        if line.is_empty() {
            return LineType::Blank;
        }

        if line.starts_with('#') {
            return LineType::Directive;
        }

        if context.is_proxied(line) {
            LineType::ProxiedUri
        } else if has_http_scheme(line) {
            LineType::AbsoluteUri
        } else {
            LineType::RelativeUri
        }
    }
}

/// Case-insensitive `http://` / `https://` prefix check.
pub fn has_http_scheme(s: &str) -> bool {
    let starts_with = |prefix: &str| {
        s.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    };
    starts_with("http://") || starts_with("https://")
}
