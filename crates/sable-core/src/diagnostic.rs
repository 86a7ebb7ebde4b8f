//! Diagnostic reporting for analysis results
//!
//! A diagnostic carries a stable message id plus structured data so that
//! external consumers can render it through their own message templates;
//! the `message` field is a pre-rendered courtesy string.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::rules::Severity;

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub rule_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    pub severity: Severity,
    pub message: String,
    pub file: String,
    pub line: usize,
    pub column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column: Option<usize>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(
        rule_id: &str,
        severity: Severity,
        message: impl Into<String>,
        file: &str,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            message_id: None,
            severity,
            message: message.into(),
            file: file.to_string(),
            line,
            column,
            end_line: None,
            end_column: None,
            data: BTreeMap::new(),
            suggestion: None,
        }
    }

    pub fn with_message_id(mut self, message_id: &str) -> Self {
        self.message_id = Some(message_id.to_string());
        self
    }

    pub fn with_data(mut self, key: &str, value: impl Into<String>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn with_end(mut self, line: usize, column: usize) -> Self {
        self.end_line = Some(line);
        self.end_column = Some(column);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_carries_message_id_and_data() {
        let diagnostic = Diagnostic::new(
            "R002",
            Severity::Warning,
            "Loop condition flag 'f' is never modified in the loop body",
            "test.js",
            1,
            1,
        )
        .with_message_id("externalFlagWhileLoop")
        .with_data("flagName", "f");

        assert_eq!(
            diagnostic.message_id.as_deref(),
            Some("externalFlagWhileLoop")
        );
        assert_eq!(diagnostic.data.get("flagName").map(String::as_str), Some("f"));
    }

    #[test]
    fn serializes_to_json_without_empty_fields() {
        let diagnostic = Diagnostic::new("C001", Severity::Warning, "msg", "a.js", 3, 7);

        let json = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(json["rule_id"], "C001");
        assert_eq!(json["line"], 3);
        assert!(json.get("data").is_none());
        assert!(json.get("suggestion").is_none());
    }

    #[test]
    fn with_end_records_span_end() {
        let diagnostic =
            Diagnostic::new("R005", Severity::Warning, "msg", "a.js", 1, 1).with_end(1, 4);

        assert_eq!(diagnostic.end_line, Some(1));
        assert_eq!(diagnostic.end_column, Some(4));
    }
}
