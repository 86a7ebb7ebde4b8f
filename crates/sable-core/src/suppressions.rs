//! Inline suppression directives for silencing diagnostics
//!
//! Supports ESLint-style disable comments:
//! - `// sable-disable-next-line C001` - disable C001 for the next line
//! - `// sable-disable-line C001` - disable C001 for the current line
//! - `// sable-disable-next-line` - disable all rules for the next line
//! - `// sable-disable-next-line C001, R002` - disable multiple rules

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuppressionDirective {
    pub line: usize,
    pub rule_ids: Vec<String>,
}

impl SuppressionDirective {
    pub fn new(line: usize, rule_ids: Vec<String>) -> Self {
        Self { line, rule_ids }
    }

    pub fn for_all_rules(line: usize) -> Self {
        Self {
            line,
            rule_ids: Vec::new(),
        }
    }

    pub fn suppresses_all(&self) -> bool {
        self.rule_ids.is_empty()
    }

    pub fn suppresses_rule(&self, rule_id: &str) -> bool {
        self.rule_ids.is_empty() || self.rule_ids.iter().any(|id| id == rule_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Suppressions {
    by_line: HashMap<usize, SuppressionDirective>,
}

impl Suppressions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_source(source: &str) -> Self {
        let mut suppressions = Self::new();

        for (line_idx, line) in source.lines().enumerate() {
            let line_num = line_idx + 1;

            if let Some(comment_start) = line.find("//") {
                let comment = &line[comment_start + 2..].trim();

                if let Some(rest) = comment.strip_prefix("sable-disable-next-line") {
                    let rule_ids = parse_rule_ids(rest);
                    suppressions.add(SuppressionDirective::new(line_num + 1, rule_ids));
                } else if let Some(rest) = comment.strip_prefix("sable-disable-line") {
                    let rule_ids = parse_rule_ids(rest);
                    suppressions.add(SuppressionDirective::new(line_num, rule_ids));
                }
            }
        }

        suppressions
    }

    pub fn add(&mut self, directive: SuppressionDirective) {
        self.by_line.insert(directive.line, directive);
    }

    pub fn is_suppressed(&self, line: usize, rule_id: &str) -> bool {
        self.by_line
            .get(&line)
            .is_some_and(|d| d.suppresses_rule(rule_id))
    }

    pub fn directives(&self) -> impl Iterator<Item = &SuppressionDirective> {
        self.by_line.values()
    }

    pub fn is_empty(&self) -> bool {
        self.by_line.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_line.len()
    }
}

fn parse_rule_ids(rest: &str) -> Vec<String> {
    let trimmed = rest.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    trimmed
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
