//! Rule system for code analysis
//!
//! Provides complexity and correctness rules for analyzing
//! JavaScript/TypeScript code.

pub mod complexity;
pub mod correctness;
pub mod helpers;

use crate::config::RulesConfig;
use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use std::collections::{HashMap, HashSet};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleCategory {
    Complexity,
    Correctness,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMetadata {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: RuleCategory,
    pub severity: Severity,
    pub docs_url: Option<&'static str>,
    pub examples: Option<&'static str>,
}

pub trait Rule: Send + Sync {
    fn metadata(&self) -> &RuleMetadata;
    fn check(&self, file: &ParsedFile) -> Vec<Diagnostic>;

    /// Apply per-rule settings from the configuration file. Rules
    /// without options ignore this.
    fn configure(&mut self, _settings: &toml::Value) {}
}

/// Deserialize a rule's settings table, keeping defaults when the
/// table does not match the rule's option shape.
pub fn parse_rule_options<T>(rule_name: &str, settings: &toml::Value) -> Option<T>
where
    T: serde::de::DeserializeOwned,
{
    match settings.clone().try_into() {
        Ok(options) => Some(options),
        Err(err) => {
            tracing::warn!(rule = rule_name, %err, "ignoring invalid rule settings");
            None
        }
    }
}

pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
    disabled_rules: HashSet<String>,
    severity_overrides: HashMap<String, Severity>,
    complexity_enabled: bool,
    correctness_enabled: bool,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            disabled_rules: HashSet::new(),
            severity_overrides: HashMap::new(),
            complexity_enabled: true,
            correctness_enabled: true,
        }
    }

    /// Registry with every built-in rule registered.
    pub fn with_default_rules() -> Self {
        let mut registry = Self::new();

        registry.register(Box::new(complexity::MaxNestingDepth::new()));
        registry.register(Box::new(complexity::NoRecursion::new()));
        registry.register(Box::new(complexity::MaxPromiseChain::new()));
        registry.register(Box::new(complexity::MaxAwaitCount::new()));
        registry.register(Box::new(complexity::MaxReferenceDepth::new()));
        registry.register(Box::new(complexity::MinAssertions::new()));
        registry.register(Box::new(correctness::NoIgnoredReturn::new()));
        registry.register(Box::new(correctness::NoUnboundedLoops::new()));
        registry.register(Box::new(correctness::PreferNarrowerScope::new()));
        registry.register(Box::new(correctness::NoGlobalMutation::new()));
        registry.register(Box::new(correctness::NoVar::new()));

        registry
    }

    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn configure(&mut self, config: &RulesConfig) {
        self.disabled_rules.clear();
        self.severity_overrides.clear();

        for rule_ref in &config.disabled {
            self.disabled_rules.insert(rule_ref.clone());
        }

        for (rule_ref, severity_value) in &config.severity {
            self.severity_overrides
                .insert(rule_ref.clone(), (*severity_value).into());
        }

        self.complexity_enabled = config.complexity.unwrap_or(true);
        self.correctness_enabled = config.correctness.unwrap_or(true);

        for (rule_ref, settings) in &config.settings {
            if let Some(rule) = self
                .rules
                .iter_mut()
                .find(|r| r.metadata().id == rule_ref || r.metadata().name == rule_ref)
            {
                rule.configure(settings);
            } else {
                tracing::warn!(rule = rule_ref.as_str(), "settings for unknown rule");
            }
        }
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn run_all(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        self.rules
            .iter()
            .filter(|rule| self.should_run_rule(rule.as_ref()))
            .flat_map(|rule| {
                let mut diagnostics = rule.check(file);
                self.apply_severity_overrides(rule.as_ref(), &mut diagnostics);
                diagnostics
            })
            .collect()
    }

    fn should_run_rule(&self, rule: &dyn Rule) -> bool {
        let metadata = rule.metadata();

        if !self.complexity_enabled && metadata.category == RuleCategory::Complexity {
            return false;
        }
        if !self.correctness_enabled && metadata.category == RuleCategory::Correctness {
            return false;
        }

        !self.is_rule_disabled(metadata)
    }

    fn is_rule_disabled(&self, metadata: &RuleMetadata) -> bool {
        self.disabled_rules.contains(metadata.id) || self.disabled_rules.contains(metadata.name)
    }

    fn apply_severity_overrides(&self, rule: &dyn Rule, diagnostics: &mut [Diagnostic]) {
        let metadata = rule.metadata();

        let override_severity = self
            .severity_overrides
            .get(metadata.id)
            .or_else(|| self.severity_overrides.get(metadata.name));

        if let Some(severity) = override_severity {
            for diag in diagnostics.iter_mut() {
                diag.severity = *severity;
            }
        }
    }

    pub fn is_rule_enabled(&self, id_or_name: &str) -> bool {
        if let Some(rule) = self
            .get_rule(id_or_name)
            .or_else(|| self.get_rule_by_name(id_or_name))
        {
            self.should_run_rule(rule)
        } else {
            false
        }
    }

    pub fn get_rule(&self, id: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|r| r.metadata().id == id)
            .map(|r| r.as_ref())
    }

    pub fn get_rule_by_name(&self, name: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|r| r.metadata().name == name)
            .map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[macro_export]
macro_rules! declare_rule {
    (
        $name:ident,
        id = $id:literal,
        name = $rule_name:literal,
        description = $desc:literal,
        category = $cat:ident,
        severity = $sev:ident
        $(, options = $options:ty)?
        $(, docs_url = $url:literal)?
        $(, examples = $examples:literal)?
    ) => {
        pub struct $name {
            metadata: $crate::rules::RuleMetadata,
            $( options: $options, )?
        }

        impl $name {
            pub fn new() -> Self {
                Self {
                    metadata: $crate::rules::RuleMetadata {
                        id: $id,
                        name: $rule_name,
                        description: $desc,
                        category: $crate::rules::RuleCategory::$cat,
                        severity: $crate::rules::Severity::$sev,
                        docs_url: declare_rule!(@docs_url $($url)?),
                        examples: declare_rule!(@examples $($examples)?),
                    },
                    $( options: <$options as Default>::default(), )?
                }
            }
        }

        $(
            impl $name {
                pub fn with_options(options: $options) -> Self {
                    let mut rule = Self::new();
                    rule.options = options;
                    rule
                }
            }
        )?

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
    (@docs_url $url:literal) => { Some($url) };
    (@docs_url) => { None };
    (@examples $examples:literal) => { Some($examples) };
    (@examples) => { None };
}
