use super::{
    classifier::{LineClassifier, LineType},
    context::TransformContext,
    rules::TransformRule,
};

/// Line-by-line M3U8 rewriter.
pub struct StreamProcessor {
    context: TransformContext,
    rules: Vec<Box<dyn TransformRule>>,
}

impl StreamProcessor {
    pub fn new(context: TransformContext, rules: Vec<Box<dyn TransformRule>>) -> Self {
        Self { context, rules }
    }

    /// Process entire playlist content and return transformed content.
    ///
    /// Output has the same lines in the same order; a trailing newline is
    /// kept and CRLF endings become LF.
    pub fn process(&self, input: &str) -> String {
        let mut output = String::with_capacity(input.len() + input.len() / 2);
        let mut lines = 0usize;
        let mut rewritten = 0usize;

        for (i, line) in input.lines().enumerate() {
            if i > 0 {
                output.push('\n');
            }
            match self.process_line(line) {
                Some(replacement) => {
                    rewritten += 1;
                    output.push_str(&replacement);
                }
                None => output.push_str(line),
            }
            lines += 1;
        }

        if input.ends_with('\n') {
            output.push('\n');
        }

        tracing::debug!(lines, rewritten, playlist = %self.context.original_url, "Rewrote playlist");
        output
    }

    /// Transform a single line. `None` means the line passes through verbatim.
    pub fn process_line(&self, line: &str) -> Option<String> {
        let line_type = LineClassifier::classify(line, &self.context);
        if line_type == LineType::Blank {
            return None;
        }

        // First matching rule wins.
        self.rules
            .iter()
            .find(|rule| rule.matches(line, &line_type, &self.context))
            .map(|rule| rule.transform(line, &self.context))
    }

    /// Get context (for inspection/testing).
    pub fn context(&self) -> &TransformContext {
        &self.context
    }
}
