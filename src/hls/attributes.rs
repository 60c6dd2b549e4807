//! Attribute-list scanning for HLS tag lines.
//!
//! Only locates things; callers splice the original text so every other
//! byte of the line survives untouched.

use std::ops::Range;

/// Tag name of a directive line (`#EXT-X-KEY` for `#EXT-X-KEY:METHOD=...`).
pub fn tag_name(line: &str) -> &str {
    let line = line.trim();
    line.split_once(':').map_or(line, |(name, _)| name)
}

/// Quoted `URI` attribute found in a tag line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriAttribute {
    /// Byte range of the value inside the quotes.
    pub span: Range<usize>,
}

impl UriAttribute {
    /// Locate the quoted `URI` attribute of a tag line, if any.
    pub fn find(line: &str) -> Option<Self> {
        let (_, content) = line.split_once(':')?;
        let offset = line.len() - content.len();

        for span in attribute_spans(content) {
            let attr = &content[span.clone()];
            let Some((key, value)) = attr.split_once('=') else {
                continue;
            };
            if !key.trim().eq_ignore_ascii_case("URI") {
                continue;
            }

            let leading = value.len() - value.trim_start().len();
            let value = value.trim();
            if value.len() < 2 || !value.starts_with('"') || !value.ends_with('"') {
                return None;
            }

            let start = offset + span.start + key.len() + 1 + leading + 1;
            return Some(Self {
                span: start..start + value.len() - 2,
            });
        }

        None
    }

    pub fn value<'a>(&self, line: &'a str) -> &'a str {
        &line[self.span.clone()]
    }

    /// Rebuild `line` with the attribute value replaced.
    pub fn replace(&self, line: &str, value: &str) -> String {
        let mut out = String::with_capacity(line.len() + value.len());
        out.push_str(&line[..self.span.start]);
        out.push_str(value);
        out.push_str(&line[self.span.end..]);
        out
    }
}

/// Split an attribute list on commas that are not inside quotes.
fn attribute_spans(s: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;

    for (i, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                spans.push(start..i);
                start = i + 1;
            }
            _ => {}
        }
    }

    if start < s.len() {
        spans.push(start..s.len());
    }

    spans
}
