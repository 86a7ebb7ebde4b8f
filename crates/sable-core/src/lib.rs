//! Core analysis library for sable
//!
//! Parses JavaScript and TypeScript sources with swc, runs the
//! built-in complexity and correctness rules over the AST, and
//! produces structured diagnostics. The CLI and editor integrations
//! are thin shells around [`AnalysisEngine`].

pub mod analysis;
pub mod config;
pub mod diagnostic;
pub mod parser;
pub mod rules;
pub mod semantic;
pub mod suppressions;
pub mod visitor;

pub use analysis::AnalysisEngine;
pub use config::{Config, ConfigError, RulesConfig, find_config_file, load_config};
pub use diagnostic::Diagnostic;
pub use parser::ParsedFile;
pub use rules::{Rule, RuleCategory, RuleMetadata, RuleRegistry, Severity};
pub use suppressions::Suppressions;
