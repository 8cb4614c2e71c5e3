//! Text segmentation into plain text and widget nodes
//!
//! Rules are applied in priority order. The rule at `rule_index` splits the
//! text into matched spans and the gaps between them. Matched spans become
//! widget nodes and are never looked at again; gaps are handed to the next
//! rule. Once no rules are left, a gap becomes a plain text node.

use log::trace;
use regex::{Match, Regex};

use crate::widget::codec::{create_widget_content, unwrap_widget_syntax};
use crate::widget::node::{
    to_markdown, InlineNodeFactory, NodeFactory, WidgetAttrs, WIDGET_NODE_TYPE,
};
use crate::widget::registry::{widget_id, WidgetRegistry};

/// Earliest non-empty match of `rule` in `text`.
///
/// Empty matches cannot become widgets and would stall the scan.
fn next_match<'t>(rule: &Regex, text: &'t str) -> Option<Match<'t>> {
    rule.find_iter(text).find(|m| !m.is_empty())
}

impl<R> WidgetRegistry<R> {
    /// Segment `text` starting with the highest priority rule.
    pub fn create_nodes<F: NodeFactory>(&self, text: &str, factory: &F) -> Vec<F::Node> {
        self.create_nodes_with_widget(text, factory, 0)
    }

    /// Segment `text` into plain text and widget nodes, starting at `rule_index`.
    ///
    /// The text is decoded first, so input that already carries widget markers
    /// (pasted or round-tripped content) is segmented in its canonical form.
    /// Each widget node is a `widget` element tagged with `widget<rule_index>`
    /// whose single text child is the encoded matched span.
    ///
    /// # Example
    /// ```ignore
    /// let nodes = registry.create_nodes_with_widget("$a and #b", &InlineNodeFactory, 0);
    /// // [widget0 "$a", text " and ", widget1 "#b"]
    /// ```
    pub fn create_nodes_with_widget<F: NodeFactory>(
        &self,
        text: &str,
        factory: &F,
        rule_index: usize,
    ) -> Vec<F::Node> {
        let text = unwrap_widget_syntax(text);
        self.segment(&text, factory, rule_index)
    }

    fn segment<F: NodeFactory>(&self, text: &str, factory: &F, rule_index: usize) -> Vec<F::Node> {
        if text.is_empty() {
            return Vec::new();
        }

        let Some(widget_rule) = self.get_widget_rules().get(rule_index) else {
            return vec![factory.text(text)];
        };

        let mut nodes = Vec::new();
        let mut rest = text;
        let info = widget_id(rule_index);

        while let Some(matched) = next_match(&widget_rule.rule, rest) {
            let before = &rest[..matched.start()];
            if !before.is_empty() {
                nodes.extend(self.segment(before, factory, rule_index + 1));
            }

            let literal = matched.as_str();
            trace!("Rule {} matched {:?}", info, literal);

            let content = create_widget_content(&info, literal);
            nodes.push(factory.create(
                WIDGET_NODE_TYPE,
                WidgetAttrs::new(info.as_str()),
                factory.text(&content),
            ));

            rest = &rest[matched.end()..];
        }

        nodes.extend(self.segment(rest, factory, rule_index + 1));
        nodes
    }

    /// Re-encode `text` with widget markers for every rule match.
    ///
    /// This is the insert path: raw user text goes in, markdown source with
    /// encoded widgets comes out.
    pub fn encode_widgets(&self, text: &str) -> String {
        to_markdown(&self.create_nodes(text, &InlineNodeFactory))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
