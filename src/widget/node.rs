//! Inline document nodes produced by widget segmentation
//!
//! The segmentation engine never builds nodes itself. It calls into a
//! [`NodeFactory`] supplied by the host document model. [`InlineNodeFactory`]
//! is a small self-contained model used when no host model is involved, for
//! example when re-encoding pasted text.

use crate::widget::codec::unwrap_widget_syntax;

/// Node type name given to every widget node.
pub const WIDGET_NODE_TYPE: &str = "widget";

/// Attributes attached to a widget node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WidgetAttrs {
    /// Synthetic id of the rule that produced the widget (`widget<index>`)
    pub info: String,
}

impl WidgetAttrs {
    pub fn new(info: impl Into<String>) -> Self {
        Self { info: info.into() }
    }
}

/// Builds document nodes for the segmentation engine.
pub trait NodeFactory {
    /// The node type of the host document model.
    type Node;

    /// Create an element node of `node_type` wrapping a single child.
    fn create(&self, node_type: &str, attrs: WidgetAttrs, child: Self::Node) -> Self::Node;

    /// Create a plain text leaf.
    fn text(&self, text: &str) -> Self::Node;
}

// ─────────────────────────────────────────────────────────────────────────────
// Default Inline Model
// ─────────────────────────────────────────────────────────────────────────────

/// A node in the default inline document model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineNode {
    /// Plain text
    Text(String),
    /// Element node such as a widget
    Element {
        node_type: String,
        attrs: WidgetAttrs,
        children: Vec<InlineNode>,
    },
}

impl InlineNode {
    /// Whether this node is a widget element.
    pub fn is_widget(&self) -> bool {
        matches!(self, InlineNode::Element { node_type, .. } if node_type == WIDGET_NODE_TYPE)
    }

    /// The widget id, if this node is a widget.
    pub fn info(&self) -> Option<&str> {
        match self {
            InlineNode::Element { node_type, attrs, .. } if node_type == WIDGET_NODE_TYPE => {
                Some(&attrs.info)
            }
            _ => None,
        }
    }

    /// Raw text stored in this node and its descendants.
    ///
    /// For a widget this is the encoded form, `$$widget0 ...$$`.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, output: &mut String) {
        match self {
            InlineNode::Text(t) => output.push_str(t),
            InlineNode::Element { children, .. } => {
                for child in children {
                    child.collect_text(output);
                }
            }
        }
    }

    /// Text as the user sees it, with widget markers removed.
    pub fn literal(&self) -> String {
        unwrap_widget_syntax(&self.text_content())
    }
}

/// Concatenate the encoded text of a node sequence.
///
/// Plain text is emitted verbatim and widgets keep their `$$` markers, so the
/// result can be written back into markdown source.
pub fn to_markdown(nodes: &[InlineNode]) -> String {
    nodes.iter().map(InlineNode::text_content).collect()
}

/// [`NodeFactory`] for [`InlineNode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineNodeFactory;

impl NodeFactory for InlineNodeFactory {
    type Node = InlineNode;

    fn create(&self, node_type: &str, attrs: WidgetAttrs, child: InlineNode) -> InlineNode {
        InlineNode::Element {
            node_type: node_type.to_string(),
            attrs,
            children: vec![child],
        }
    }

    fn text(&self, text: &str) -> InlineNode {
        InlineNode::Text(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::codec::create_widget_content;

    fn widget(info: &str, content: &str) -> InlineNode {
        let factory = InlineNodeFactory;
        factory.create(
            WIDGET_NODE_TYPE,
            WidgetAttrs::new(info),
            factory.text(&create_widget_content(info, content)),
        )
    }

    #[test]
    fn test_widget_node_accessors() {
        let node = widget("widget2", "@bob");
        assert!(node.is_widget());
        assert_eq!(node.info(), Some("widget2"));
        assert_eq!(node.text_content(), "$$widget2 @bob$$");
        assert_eq!(node.literal(), "@bob");
    }

    #[test]
    fn test_text_node_accessors() {
        let node = InlineNodeFactory.text("plain");
        assert!(!node.is_widget());
        assert_eq!(node.info(), None);
        assert_eq!(node.literal(), "plain");
    }

    #[test]
    fn test_non_widget_element_has_no_info() {
        let node = InlineNodeFactory.create(
            "span",
            WidgetAttrs::default(),
            InlineNode::Text("x".into()),
        );
        assert!(!node.is_widget());
        assert_eq!(node.info(), None);
    }

    #[test]
    fn test_to_markdown_keeps_markers() {
        let nodes = vec![
            InlineNode::Text("hi ".to_string()),
            widget("widget0", "$x"),
            InlineNode::Text("!".to_string()),
        ];
        assert_eq!(to_markdown(&nodes), "hi $$widget0 $x$$!");
        assert_eq!(to_markdown(&[]), "");
    }
}
