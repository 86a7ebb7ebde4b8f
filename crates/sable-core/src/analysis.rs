//! Analysis engine tying parsing, rules, and suppressions together
//!
//! The engine owns a configured rule registry and turns one parsed
//! file into a list of diagnostics: parse errors first, then rule
//! findings, with inline suppression directives applied to both.

use crate::config::Config;
use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use crate::rules::{RuleRegistry, Severity};

pub struct AnalysisEngine {
    registry: RuleRegistry,
}

impl AnalysisEngine {
    pub fn new() -> Self {
        Self {
            registry: RuleRegistry::with_default_rules(),
        }
    }

    pub fn with_config(config: &Config) -> Self {
        let mut registry = RuleRegistry::with_default_rules();
        registry.configure(&config.rules);
        Self { registry }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn analyze(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        let suppressions = file.suppressions();
        let mut diagnostics = Vec::new();

        for error in file.errors() {
            let diagnostic = Diagnostic::new(
                "PARSE",
                Severity::Error,
                &error.message,
                &file.metadata().filename,
                error.line,
                error.column,
            );
            if !suppressions.is_suppressed(diagnostic.line, &diagnostic.rule_id) {
                diagnostics.push(diagnostic);
            }
        }

        for diagnostic in self.registry.run_all(file) {
            if !suppressions.is_suppressed(diagnostic.line, &diagnostic.rule_id) {
                diagnostics.push(diagnostic);
            }
        }

        tracing::debug!(
            file = %file.metadata().filename,
            count = diagnostics.len(),
            "analysis finished"
        );

        diagnostics
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}
