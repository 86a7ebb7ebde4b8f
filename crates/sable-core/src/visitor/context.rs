//! Per-file context handed to visitor hooks.
//!
//! Wraps the parsed file and turns spans into the locations and
//! [`Diagnostic`] values rules report with.

use swc_common::Span;

use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use crate::rules::RuleMetadata;

pub struct VisitorContext<'a> {
    file: &'a ParsedFile,
}

impl<'a> VisitorContext<'a> {
    pub fn new(file: &'a ParsedFile) -> Self {
        Self { file }
    }

    pub fn file(&self) -> &ParsedFile {
        self.file
    }

    /// 1-based line and column of the span start.
    pub fn span_to_location(&self, span: Span) -> (usize, usize) {
        self.file.line_col(span.lo.0)
    }

    /// Full text of the line the span starts on.
    pub fn line_text(&self, span: Span) -> Option<&str> {
        let (line, _) = self.span_to_location(span);
        self.file.get_line(line)
    }

    pub fn get_source_text(&self, span: Span) -> Option<&str> {
        let source = self.file.source();
        let lo = span.lo.0 as usize;
        let hi = span.hi.0 as usize;

        (lo <= hi && hi <= source.len()).then(|| &source[lo..hi])
    }

    /// Start a diagnostic at `span` with the rule's id, severity and
    /// this file's name filled in; `message_id`, `data` and
    /// `suggestion` chain on top.
    pub fn report(
        &self,
        metadata: &RuleMetadata,
        span: Span,
        message: impl Into<String>,
    ) -> Diagnostic {
        let (line, column) = self.span_to_location(span);
        Diagnostic::new(
            metadata.id,
            metadata.severity,
            message,
            &self.file.metadata().filename,
            line,
            column,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{RuleCategory, Severity};
    use swc_common::BytePos;

    #[test]
    fn context_provides_file_reference() {
        let parsed = ParsedFile::from_source("test.js", "const x = 1;");
        let ctx = VisitorContext::new(&parsed);

        assert_eq!(ctx.file().metadata().filename, "test.js");
    }

    #[test]
    fn span_to_location_returns_line_and_column() {
        let code = "const x = 1;\nconst y = 2;";
        let parsed = ParsedFile::from_source("test.js", code);
        let ctx = VisitorContext::new(&parsed);

        assert_eq!(
            ctx.span_to_location(Span::new(BytePos(0), BytePos(5))),
            (1, 1)
        );
        assert_eq!(
            ctx.span_to_location(Span::new(BytePos(13), BytePos(18))).0,
            2
        );
    }

    #[test]
    fn line_text_returns_the_whole_line() {
        let code = "const x = 1;\nconst y = 2;";
        let parsed = ParsedFile::from_source("test.js", code);
        let ctx = VisitorContext::new(&parsed);

        let text = ctx.line_text(Span::new(BytePos(13), BytePos(18)));

        assert_eq!(text, Some("const y = 2;"));
    }

    #[test]
    fn get_source_text_returns_span_content() {
        let code = "const x = 1;";
        let parsed = ParsedFile::from_source("test.js", code);
        let ctx = VisitorContext::new(&parsed);

        let text = ctx.get_source_text(Span::new(BytePos(6), BytePos(7)));

        assert_eq!(text, Some("x"));
    }

    #[test]
    fn report_fills_in_rule_and_location() {
        let metadata = RuleMetadata {
            id: "R999",
            name: "example",
            description: "",
            category: RuleCategory::Correctness,
            severity: Severity::Info,
            docs_url: None,
            examples: None,
        };
        let parsed = ParsedFile::from_source("test.js", "const x = 1;\nfoo();");
        let ctx = VisitorContext::new(&parsed);

        let diagnostic = ctx
            .report(&metadata, Span::new(BytePos(13), BytePos(18)), "dropped")
            .with_message_id("exampleFinding");

        assert_eq!(diagnostic.rule_id, "R999");
        assert_eq!(diagnostic.severity, Severity::Info);
        assert_eq!(diagnostic.file, "test.js");
        assert_eq!(diagnostic.line, 2);
        assert_eq!(diagnostic.message_id.as_deref(), Some("exampleFinding"));
    }
}
