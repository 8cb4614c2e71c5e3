//! Widget rule settings
//!
//! This module defines the `WidgetSettings` struct describing which widget
//! rules a user has configured, with serde support for JSON persistence.
//! Settings only carry patterns; render functions come from the host when the
//! rules are compiled.

use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::widget::{ToDom, WidgetRule};

// ─────────────────────────────────────────────────────────────────────────────
// Rule Configuration
// ─────────────────────────────────────────────────────────────────────────────

fn default_enabled() -> bool {
    true
}

/// A single configured widget rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetRuleConfig {
    /// Name the host uses to pick a renderer (e.g. "math", "mention")
    #[serde(default)]
    pub name: String,
    /// Regular expression selecting the widget text
    #[serde(default)]
    pub pattern: String,
    /// Disabled rules are kept in the file but not registered
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl WidgetRuleConfig {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            enabled: true,
        }
    }

    /// Compile the pattern.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` if the pattern is not a valid regex.
    pub fn compile(&self) -> Result<Regex> {
        Regex::new(&self.pattern).map_err(|source| Error::InvalidPattern {
            name: self.name.clone(),
            source,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// Configured widget rules, in priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetSettings {
    pub rules: Vec<WidgetRuleConfig>,
}

impl WidgetSettings {
    /// Clean up settings loaded from a hand-edited file.
    ///
    /// Names and patterns are trimmed, rules without a pattern are dropped and
    /// rules without a name are named after their position.
    pub fn sanitize(&mut self) {
        for rule in &mut self.rules {
            rule.name = rule.name.trim().to_string();
            rule.pattern = rule.pattern.trim().to_string();
        }

        let before = self.rules.len();
        self.rules.retain(|rule| !rule.pattern.is_empty());
        if self.rules.len() < before {
            debug!(
                "Dropped {} widget rule(s) without a pattern",
                before - self.rules.len()
            );
        }

        for (index, rule) in self.rules.iter_mut().enumerate() {
            if rule.name.is_empty() {
                rule.name = format!("rule{}", index);
            }
        }
    }

    /// Load settings and sanitize them to ensure validity.
    pub fn from_json_sanitized(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Build widget rules for the enabled entries.
    ///
    /// `render` is asked for a render function for each enabled rule. Rules it
    /// has no renderer for are skipped, so the rest keep their relative order.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` for the first pattern that fails to compile.
    pub fn compile_rules<R, F>(&self, mut render: F) -> Result<Vec<WidgetRule<R>>>
    where
        F: FnMut(&WidgetRuleConfig) -> Option<ToDom<R>>,
    {
        let mut rules = Vec::new();

        for config in self.rules.iter().filter(|rule| rule.enabled) {
            let pattern = config.compile()?;
            match render(config) {
                Some(to_dom) => rules.push(WidgetRule {
                    rule: pattern,
                    to_dom,
                }),
                None => warn!("No renderer for widget rule '{}', skipping", config.name),
            }
        }

        debug!(
            "Compiled {} of {} configured widget rule(s)",
            rules.len(),
            self.rules.len()
        );
        Ok(rules)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
