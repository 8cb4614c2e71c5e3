//! Widget payload extraction
//!
//! Inside a parsed document a widget's payload may have been turned into a
//! small subtree, e.g. `*` pairs in the payload become emphasis. Extraction
//! recovers the flat payload text: text children are copied as-is and any
//! other child is collapsed to its inline markdown in one step, without
//! walking into it.

use log::debug;

use crate::error::Result;
use crate::markdown::{MarkdownDocument, MarkdownNode, MarkdownNodeType, NodeWalker};
use crate::widget::codec::create_widget_content;
use crate::widget::registry::WidgetRegistry;

/// Recover the payload text of `widget`.
///
/// Nested nodes are written back as inline markdown, so `a*b*c` comes back
/// with its emphasis markers.
pub fn get_widget_content(widget: &MarkdownNode) -> String {
    get_widget_content_with(widget, MarkdownNode::to_inline_markdown)
}

/// Recover the payload text of `widget`.
///
/// `inline_text` renders a nested non-text node back to text. It is called
/// once per nested node; that node's descendants are never visited.
pub fn get_widget_content_with<F>(widget: &MarkdownNode, inline_text: F) -> String
where
    F: Fn(&MarkdownNode) -> String,
{
    let mut walker = NodeWalker::new(widget);
    let mut content = String::new();

    while let Some(event) = walker.next() {
        if !event.entering {
            continue;
        }

        let node = event.node;
        if std::ptr::eq(node, widget) {
            continue;
        }

        match &node.node_type {
            MarkdownNodeType::Text(text) => content.push_str(text),
            other => {
                content.push_str(&inline_text(node));
                if other.is_container() {
                    walker.resume_at(node, false);
                    walker.next();
                }
            }
        }
    }

    content
}

/// Encoded markdown for a widget node, ready to be written back to source.
///
/// Returns `None` if `node` is not a widget.
pub fn widget_to_markdown(node: &MarkdownNode) -> Option<String> {
    let info = node.widget_info()?;
    Some(create_widget_content(info, &get_widget_content(node)))
}

impl<R> WidgetRegistry<R> {
    /// Render a single widget node of a parsed document.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownWidget` if the node's id is not registered.
    /// Nodes that are not widgets are reported the same way with an empty id.
    pub fn render_widget(&self, node: &MarkdownNode) -> Result<R> {
        let info = node.widget_info().unwrap_or_default();
        self.widget_to_dom(info, &get_widget_content(node))
    }

    /// Render every widget in `document`, in document order.
    pub fn render_widgets(&self, document: &MarkdownDocument) -> Result<Vec<R>> {
        let widgets = document.widgets();
        debug!("Rendering {} widget(s)", widgets.len());

        widgets
            .into_iter()
            .map(|node| self.render_widget(node))
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::markdown::parse_markdown;
    use crate::widget::registry::WidgetRule;
    use regex::Regex;
    use std::cell::RefCell;

    fn text(t: &str) -> MarkdownNode {
        MarkdownNode::new(MarkdownNodeType::Text(t.to_string()), 1, 1)
    }

    fn widget(info: &str, children: Vec<MarkdownNode>) -> MarkdownNode {
        MarkdownNode::new(
            MarkdownNodeType::Widget {
                info: info.to_string(),
            },
            1,
            1,
        )
        .with_children(children)
    }

    fn emphasis(children: Vec<MarkdownNode>) -> MarkdownNode {
        MarkdownNode::new(MarkdownNodeType::Emphasis, 1, 1).with_children(children)
    }

    #[test]
    fn test_text_and_emphasis() {
        let node = widget("widget0", vec![text("foo"), emphasis(vec![text("bar")])]);
        assert_eq!(
            get_widget_content_with(&node, MarkdownNode::text_content),
            "foobar"
        );
        assert_eq!(get_widget_content(&node), "foo*bar*");
    }

    #[test]
    fn test_nested_node_rendered_once() {
        let node = widget(
            "widget0",
            vec![
                text("foo"),
                emphasis(vec![text("bar"), emphasis(vec![text("baz")])]),
                text("!"),
            ],
        );

        let calls = RefCell::new(Vec::new());
        let content = get_widget_content_with(&node, |n| {
            calls.borrow_mut().push(n.node_type.clone());
            format!("<{}>", n.text_content())
        });

        assert_eq!(content, "foo<barbaz>!");
        assert_eq!(calls.into_inner(), vec![MarkdownNodeType::Emphasis]);
    }

    #[test]
    fn test_leaf_nodes_use_inline_text() {
        let node = widget(
            "widget0",
            vec![
                text("a"),
                MarkdownNode::new(MarkdownNodeType::Code("b".to_string()), 1, 1),
                text("c"),
            ],
        );
        assert_eq!(get_widget_content(&node), "a`b`c");
    }

    #[test]
    fn test_empty_widget() {
        assert_eq!(get_widget_content(&widget("widget0", vec![])), "");
    }

    #[test]
    fn test_parsed_payload_with_emphasis() {
        let doc = parse_markdown("$$widget0 a*b*c$$").unwrap();
        let widgets = doc.widgets();
        assert_eq!(get_widget_content(widgets[0]), "a*b*c");
    }

    #[test]
    fn test_parsed_payload_with_strong_and_link() {
        let doc = parse_markdown("$$widget0 **x** ~~y~~ [z](http://z.io)$$").unwrap();
        assert_eq!(
            get_widget_content(doc.widgets()[0]),
            "**x** ~~y~~ [z](http://z.io)"
        );
    }

    #[test]
    fn test_widget_to_markdown() {
        let node = widget("widget3", vec![text("$x$\u{200B}$y")]);
        assert_eq!(
            widget_to_markdown(&node).unwrap(),
            "$$widget3 $x$\u{200B}$y$$"
        );
        assert!(widget_to_markdown(&text("plain")).is_none());
    }

    #[test]
    fn test_render_widgets_end_to_end() {
        let registry = WidgetRegistry::with_rules(vec![
            WidgetRule::new(Regex::new(r"\$\S+").unwrap(), |t: &str| format!("math({})", t)),
            WidgetRule::new(Regex::new(r"@\w+").unwrap(), |t: &str| format!("user({})", t)),
        ]);

        let markdown = registry.encode_widgets("Ask @ann about $e=mc^2 today");
        let doc = parse_markdown(&markdown).unwrap();
        let rendered = registry.render_widgets(&doc).unwrap();

        assert_eq!(rendered, vec!["user(@ann)", "math($e=mc^2)"]);
    }

    #[test]
    fn test_render_widgets_keeps_markdown_in_payload() {
        let registry = WidgetRegistry::with_rules(vec![WidgetRule::new(
            Regex::new(r"\$\S+").unwrap(),
            |t: &str| t.to_string(),
        )]);

        let markdown = registry.encode_widgets("see $a*b*c and $x_1_y");
        let doc = parse_markdown(&markdown).unwrap();

        assert_eq!(
            registry.render_widgets(&doc).unwrap(),
            vec!["$a*b*c", "$x_1_y"]
        );

        let reencoded: Vec<_> = doc
            .widgets()
            .into_iter()
            .filter_map(widget_to_markdown)
            .collect();
        assert_eq!(
            reencoded,
            vec![
                create_widget_content("widget0", "$a*b*c"),
                create_widget_content("widget0", "$x_1_y"),
            ]
        );
    }

    #[test]
    fn test_render_widgets_with_escaped_payload() {
        let registry = WidgetRegistry::with_rules(vec![WidgetRule::new(
            Regex::new(r"\$\S+").unwrap(),
            |t: &str| t.replace('\u{200B}', ""),
        )]);

        let markdown = registry.encode_widgets("total $a$$b");
        let doc = parse_markdown(&markdown).unwrap();

        assert_eq!(registry.render_widgets(&doc).unwrap(), vec!["$a$$b"]);
    }

    #[test]
    fn test_render_widget_unknown_id() {
        let registry: WidgetRegistry<String> = WidgetRegistry::new();
        let node = widget("widget0", vec![text("x")]);
        assert!(matches!(
            registry.render_widget(&node),
            Err(Error::UnknownWidget(_))
        ));
    }
}
