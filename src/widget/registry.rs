//! Widget rule registry
//!
//! Rules are identified by their position in the registered list. Rule `i`
//! tags every widget it produces with the id `widget<i>`, and the registry
//! keeps an id → index map so renderers can find the rule again.
//!
//! The registry is owned by the editor instance rather than living in global
//! state. Replacing the rules takes `&mut self`, so no reader can observe a
//! half-rebuilt map.

use std::collections::HashMap;
use std::fmt;

use log::{debug, warn};
use regex::Regex;

use crate::error::{Error, Result};
use crate::widget::codec::{trim_trailing_separator, unwrap_widget_syntax};

/// Render function attached to a widget rule.
pub type ToDom<R> = Box<dyn Fn(&str) -> R>;

/// Prefix of every synthetic widget id.
const WIDGET_ID_PREFIX: &str = "widget";

/// Build the synthetic id for the rule at `index`.
pub fn widget_id(index: usize) -> String {
    format!("{}{}", WIDGET_ID_PREFIX, index)
}

// ─────────────────────────────────────────────────────────────────────────────
// Widget Rule
// ─────────────────────────────────────────────────────────────────────────────

/// A pattern that turns matching text into a widget, plus its renderer.
pub struct WidgetRule<R> {
    /// Pattern selecting the text spans that become widgets
    pub rule: Regex,
    /// Converts the matched text into the host's render output
    pub to_dom: ToDom<R>,
}

impl<R> WidgetRule<R> {
    pub fn new(rule: Regex, to_dom: impl Fn(&str) -> R + 'static) -> Self {
        Self {
            rule,
            to_dom: Box::new(to_dom),
        }
    }
}

impl<R> fmt::Debug for WidgetRule<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetRule")
            .field("rule", &self.rule.as_str())
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered widget rules and their id lookup table.
pub struct WidgetRegistry<R> {
    rules: Vec<WidgetRule<R>>,
    ids: HashMap<String, usize>,
}

impl<R> Default for WidgetRegistry<R> {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            ids: HashMap::new(),
        }
    }
}

impl<R> fmt::Debug for WidgetRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetRegistry")
            .field("rules", &self.rules)
            .finish()
    }
}

impl<R> WidgetRegistry<R> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding `rules`.
    pub fn with_rules(rules: Vec<WidgetRule<R>>) -> Self {
        let mut registry = Self::new();
        registry.set_widget_rules(rules);
        registry
    }

    /// Replace all rules. Ids from the previous set are dropped.
    pub fn set_widget_rules(&mut self, rules: Vec<WidgetRule<R>>) {
        self.ids.clear();
        self.ids
            .extend((0..rules.len()).map(|index| (widget_id(index), index)));
        self.rules = rules;

        debug!("Registered {} widget rule(s)", self.rules.len());
    }

    /// The registered rules, in priority order.
    pub fn get_widget_rules(&self) -> &[WidgetRule<R>] {
        &self.rules
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Position of the rule registered under `info`.
    pub fn rule_index(&self, info: &str) -> Option<usize> {
        self.ids.get(info).copied()
    }

    /// The rule registered under `info`.
    pub fn rule(&self, info: &str) -> Option<&WidgetRule<R>> {
        self.rule_index(info).and_then(|index| self.rules.get(index))
    }

    /// Render widget text through the rule registered under `info`.
    ///
    /// The text is decoded first and the separator escaping adds after a
    /// trailing `$` is dropped. The result is matched against the rule again.
    /// The renderer receives the matched span, or the whole decoded text when
    /// the pattern no longer matches.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownWidget` if no rule is registered under `info`.
    pub fn widget_to_dom(&self, info: &str, text: &str) -> Result<R> {
        let rule = self.rule(info).ok_or_else(|| {
            warn!("Widget '{}' is not registered", info);
            Error::UnknownWidget(info.to_string())
        })?;

        let decoded = unwrap_widget_syntax(text);
        let text = trim_trailing_separator(&decoded);
        let content = match rule.rule.find(text) {
            Some(matched) => matched.as_str(),
            None => text,
        };

        Ok((rule.to_dom)(content))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::codec::create_widget_content;

    fn tagged(pattern: &str, tag: &'static str) -> WidgetRule<String> {
        WidgetRule::new(Regex::new(pattern).unwrap(), move |text: &str| {
            format!("{}:{}", tag, text)
        })
    }

    #[test]
    fn test_widget_id() {
        assert_eq!(widget_id(0), "widget0");
        assert_eq!(widget_id(15), "widget15");
    }

    #[test]
    fn test_set_and_get_rules_keeps_order() {
        let mut registry = WidgetRegistry::new();
        registry.set_widget_rules(vec![
            tagged(r"a+", "a"),
            tagged(r"b+", "b"),
            tagged(r"c+", "c"),
        ]);

        let patterns: Vec<&str> = registry
            .get_widget_rules()
            .iter()
            .map(|r| r.rule.as_str())
            .collect();
        assert_eq!(patterns, vec!["a+", "b+", "c+"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_widget_to_dom_dispatches_by_index() {
        let registry = WidgetRegistry::with_rules(vec![
            tagged(r"a+", "a"),
            tagged(r"b+", "b"),
            tagged(r"c+", "c"),
        ]);

        assert_eq!(registry.widget_to_dom("widget1", "bbb").unwrap(), "b:bbb");
        assert_eq!(registry.rule_index("widget2"), Some(2));
    }

    #[test]
    fn test_widget_to_dom_decodes_and_narrows_match() {
        let registry = WidgetRegistry::with_rules(vec![tagged(r"\$\S+", "math")]);
        let encoded = create_widget_content("widget0", "$x+1");

        assert_eq!(
            registry.widget_to_dom("widget0", &encoded).unwrap(),
            "math:$x+1"
        );
        assert_eq!(
            registry.widget_to_dom("widget0", "see $y here").unwrap(),
            "math:$y"
        );
    }

    #[test]
    fn test_widget_to_dom_without_match_uses_decoded_text() {
        let registry = WidgetRegistry::with_rules(vec![tagged(r"#\w+", "tag")]);
        let encoded = create_widget_content("widget0", "no tag");

        assert_eq!(
            registry.widget_to_dom("widget0", &encoded).unwrap(),
            "tag:no tag"
        );
    }

    #[test]
    fn test_widget_to_dom_drops_trailing_separator() {
        let registry = WidgetRegistry::with_rules(vec![tagged(r"\S+", "price")]);

        let encoded = create_widget_content("widget0", "cost$");
        assert_eq!(
            registry.widget_to_dom("widget0", &encoded).unwrap(),
            "price:cost$"
        );

        let inner = create_widget_content("widget0", "a$$b");
        assert_eq!(
            registry.widget_to_dom("widget0", &inner).unwrap(),
            "price:a$\u{200B}$b"
        );
    }

    #[test]
    fn test_widget_to_dom_unknown_id() {
        let registry = WidgetRegistry::with_rules(vec![tagged(r"x", "x")]);
        let result = registry.widget_to_dom("widget5", "x");
        assert!(matches!(result, Err(Error::UnknownWidget(id)) if id == "widget5"));
    }

    #[test]
    fn test_shrinking_rules_drops_stale_ids() {
        let mut registry = WidgetRegistry::with_rules(vec![
            tagged(r"a", "a"),
            tagged(r"b", "b"),
        ]);
        registry.set_widget_rules(vec![tagged(r"z", "z")]);

        assert!(registry.rule("widget1").is_none());
        assert!(matches!(
            registry.widget_to_dom("widget1", "b"),
            Err(Error::UnknownWidget(_))
        ));
        assert_eq!(registry.widget_to_dom("widget0", "z").unwrap(), "z:z");
    }

    #[test]
    fn test_empty_registry() {
        let registry: WidgetRegistry<String> = WidgetRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get_widget_rules().is_empty());
        assert!(registry.widget_to_dom("widget0", "").is_err());
    }

    #[test]
    fn test_widget_to_dom_empty_text() {
        let registry = WidgetRegistry::with_rules(vec![tagged(r"x+", "x")]);
        assert_eq!(registry.widget_to_dom("widget0", "").unwrap(), "x:");
    }
}
