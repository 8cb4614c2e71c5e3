//! Markdown parser implementation using comrak
//!
//! This module wraps comrak's parser and converts its arena AST into an owned
//! `MarkdownNode` tree. Encoded widgets (`$$widget<n> ...$$`) are plain text
//! to comrak; after conversion they are regrouped into `Widget` nodes whose
//! children are whatever comrak parsed inside the payload.

use comrak::{
    nodes::{AstNode, ListDelimType, ListType as ComrakListType, NodeValue},
    parse_document, Arena, Options,
};
use log::trace;

use crate::error::Result;
use crate::widget::codec::{
    create_widget_content, find_close_delimiter, find_open_marker, WIDGET_DELIMITER,
};

// ─────────────────────────────────────────────────────────────────────────────
// Public Types
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration options for markdown parsing.
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    /// Enable strikethrough syntax (~~text~~)
    pub strikethrough: bool,
    /// Enable autolink URLs and emails
    pub autolink: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            strikethrough: true,
            autolink: true,
        }
    }
}

impl MarkdownOptions {
    /// Convert to comrak Options.
    fn to_comrak_options(&self) -> Options {
        let mut options = Options::default();

        options.extension.strikethrough = self.strikethrough;
        options.extension.autolink = self.autolink;

        options
    }
}

/// Heading level (H1-H6)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    H1 = 1,
    H2 = 2,
    H3 = 3,
    H4 = 4,
    H5 = 5,
    H6 = 6,
}

impl From<u8> for HeadingLevel {
    fn from(level: u8) -> Self {
        match level {
            1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            3 => HeadingLevel::H3,
            4 => HeadingLevel::H4,
            5 => HeadingLevel::H5,
            _ => HeadingLevel::H6,
        }
    }
}

/// List type (ordered or unordered)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListType {
    Bullet,
    Ordered { start: u32, delimiter: char },
}

/// Represents the type of a markdown node.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkdownNodeType {
    /// Root document node
    Document,
    /// Block quote (>)
    BlockQuote,
    /// List container
    List { list_type: ListType, tight: bool },
    /// List item
    Item,
    /// Code block with its info string
    CodeBlock { info: String, literal: String },
    /// HTML block
    HtmlBlock(String),
    /// Paragraph
    Paragraph,
    /// Heading (H1-H6)
    Heading { level: HeadingLevel, setext: bool },
    /// Thematic break (horizontal rule)
    ThematicBreak,
    /// Inline text content
    Text(String),
    /// Soft line break
    SoftBreak,
    /// Hard line break
    LineBreak,
    /// Inline code
    Code(String),
    /// Inline HTML
    HtmlInline(String),
    /// Emphasis (italic)
    Emphasis,
    /// Strong emphasis (bold)
    Strong,
    /// Strikethrough
    Strikethrough,
    /// Link
    Link { url: String, title: String },
    /// Image
    Image { url: String, title: String },
    /// Inline widget; children hold the parsed payload
    Widget { info: String },
}

impl MarkdownNodeType {
    /// Whether a walk visits this node twice (entering and leaving).
    ///
    /// Leaves only produce an entering event.
    pub fn is_container(&self) -> bool {
        !matches!(
            self,
            MarkdownNodeType::Text(_)
                | MarkdownNodeType::SoftBreak
                | MarkdownNodeType::LineBreak
                | MarkdownNodeType::Code(_)
                | MarkdownNodeType::HtmlInline(_)
                | MarkdownNodeType::ThematicBreak
                | MarkdownNodeType::CodeBlock { .. }
                | MarkdownNodeType::HtmlBlock(_)
        )
    }
}

/// A node in the markdown AST with position information.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkdownNode {
    /// The type of this node
    pub node_type: MarkdownNodeType,
    /// Child nodes
    pub children: Vec<MarkdownNode>,
    /// Start line in source (1-indexed)
    pub start_line: usize,
    /// End line in source (1-indexed)
    pub end_line: usize,
}

impl MarkdownNode {
    /// Create a new markdown node without children.
    pub fn new(node_type: MarkdownNodeType, start_line: usize, end_line: usize) -> Self {
        Self {
            node_type,
            children: Vec::new(),
            start_line,
            end_line,
        }
    }

    /// Builder-style helper to attach children.
    pub fn with_children(mut self, children: Vec<MarkdownNode>) -> Self {
        self.children = children;
        self
    }

    /// Get all text content from this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, output: &mut String) {
        match &self.node_type {
            MarkdownNodeType::Text(t) => output.push_str(t),
            MarkdownNodeType::Code(t) => output.push_str(t),
            MarkdownNodeType::SoftBreak => output.push(' '),
            MarkdownNodeType::LineBreak => output.push('\n'),
            _ => {}
        }
        for child in &self.children {
            child.collect_text(output);
        }
    }

    /// Render this node and its descendants back to inline markdown.
    ///
    /// Emphasis is always written with `*` because the tree does not record
    /// which delimiter the source used. Bare autolinks are written as their
    /// text.
    pub fn to_inline_markdown(&self) -> String {
        let mut output = String::new();
        self.write_inline_markdown(&mut output);
        output
    }

    fn children_markdown(&self) -> String {
        let mut output = String::new();
        for child in &self.children {
            child.write_inline_markdown(&mut output);
        }
        output
    }

    fn write_inline_markdown(&self, output: &mut String) {
        match &self.node_type {
            MarkdownNodeType::Text(t) | MarkdownNodeType::HtmlInline(t) => output.push_str(t),
            MarkdownNodeType::Code(code) => write_code_span(code, output),
            MarkdownNodeType::SoftBreak => output.push('\n'),
            MarkdownNodeType::LineBreak => output.push_str("  \n"),
            MarkdownNodeType::Emphasis => write_wrapped("*", &self.children_markdown(), output),
            MarkdownNodeType::Strong => write_wrapped("**", &self.children_markdown(), output),
            MarkdownNodeType::Strikethrough => {
                write_wrapped("~~", &self.children_markdown(), output)
            }
            MarkdownNodeType::Link { url, title } => {
                let label = self.children_markdown();
                if title.is_empty() && is_bare_autolink(url, &label) {
                    output.push_str(&label);
                } else {
                    write_link(&label, url, title, output);
                }
            }
            MarkdownNodeType::Image { url, title } => {
                output.push('!');
                write_link(&self.children_markdown(), url, title, output);
            }
            MarkdownNodeType::Widget { info } => {
                output.push_str(&create_widget_content(info, &self.children_markdown()))
            }
            _ => output.push_str(&self.children_markdown()),
        }
    }

    /// The widget id if this is a widget node.
    pub fn widget_info(&self) -> Option<&str> {
        match &self.node_type {
            MarkdownNodeType::Widget { info } => Some(info),
            _ => None,
        }
    }

    fn collect_widgets<'a>(&'a self, output: &mut Vec<&'a MarkdownNode>) {
        if self.widget_info().is_some() {
            output.push(self);
        }
        for child in &self.children {
            child.collect_widgets(output);
        }
    }
}

/// A parsed markdown document.
#[derive(Debug, Clone)]
pub struct MarkdownDocument {
    /// Root node of the AST
    pub root: MarkdownNode,
    /// Original source text
    source: String,
}

impl MarkdownDocument {
    /// The markdown source this document was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// All widget nodes, in document order.
    pub fn widgets(&self) -> Vec<&MarkdownNode> {
        let mut widgets = Vec::new();
        self.root.collect_widgets(&mut widgets);
        widgets
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inline Markdown Output
// ─────────────────────────────────────────────────────────────────────────────

fn write_wrapped(marker: &str, inner: &str, output: &mut String) {
    output.push_str(marker);
    output.push_str(inner);
    output.push_str(marker);
}

/// Write a code span with a fence longer than any backtick run inside it.
fn write_code_span(code: &str, output: &mut String) {
    let longest_run = code
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest_run + 1);
    let pad = if code.starts_with('`') || code.ends_with('`') {
        " "
    } else {
        ""
    };

    output.push_str(&fence);
    output.push_str(pad);
    output.push_str(code);
    output.push_str(pad);
    output.push_str(&fence);
}

fn write_link(label: &str, url: &str, title: &str, output: &mut String) {
    output.push('[');
    output.push_str(label);
    output.push_str("](");
    output.push_str(url);
    if !title.is_empty() {
        output.push_str(" \"");
        output.push_str(&title.replace('"', "\\\""));
        output.push('"');
    }
    output.push(')');
}

/// Whether a link was produced by autolinking `label` itself.
fn is_bare_autolink(url: &str, label: &str) -> bool {
    url == label
        || ["http://", "https://", "mailto:"]
            .iter()
            .any(|scheme| url.strip_prefix(scheme) == Some(label))
}

// ─────────────────────────────────────────────────────────────────────────────
// Public API Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Parse markdown text into an AST document.
///
/// # Example
/// ```ignore
/// let doc = parse_markdown("Hi $$widget0 @ann$$")?;
/// assert_eq!(doc.widgets().len(), 1);
/// ```
pub fn parse_markdown(markdown: &str) -> Result<MarkdownDocument> {
    parse_markdown_with_options(markdown, &MarkdownOptions::default())
}

/// Parse markdown text with custom options.
pub fn parse_markdown_with_options(
    markdown: &str,
    options: &MarkdownOptions,
) -> Result<MarkdownDocument> {
    let arena = Arena::new();
    let comrak_options = options.to_comrak_options();

    let root = parse_document(&arena, markdown, &comrak_options);

    Ok(MarkdownDocument {
        root: convert_node(root),
        source: markdown.to_string(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal Conversion Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Convert a comrak AST node to our MarkdownNode structure.
fn convert_node<'a>(node: &'a AstNode<'a>) -> MarkdownNode {
    let ast = node.data.borrow();
    let sourcepos = ast.sourcepos;

    let children = node.children().map(convert_node).collect();

    MarkdownNode::new(
        convert_node_value(&ast.value),
        sourcepos.start.line,
        sourcepos.end.line,
    )
    .with_children(group_widgets(children))
}

/// Convert a comrak NodeValue to our MarkdownNodeType.
fn convert_node_value(value: &NodeValue) -> MarkdownNodeType {
    match value {
        NodeValue::Document => MarkdownNodeType::Document,
        NodeValue::BlockQuote => MarkdownNodeType::BlockQuote,
        NodeValue::List(list) => {
            let list_type = match list.list_type {
                ComrakListType::Bullet => ListType::Bullet,
                ComrakListType::Ordered => ListType::Ordered {
                    start: list.start as u32,
                    delimiter: if list.delimiter == ListDelimType::Period {
                        '.'
                    } else {
                        ')'
                    },
                },
            };
            MarkdownNodeType::List {
                list_type,
                tight: list.tight,
            }
        }
        NodeValue::Item(_) => MarkdownNodeType::Item,
        NodeValue::CodeBlock(code) => MarkdownNodeType::CodeBlock {
            info: code.info.clone(),
            literal: code.literal.clone(),
        },
        NodeValue::HtmlBlock(html) => MarkdownNodeType::HtmlBlock(html.literal.clone()),
        NodeValue::Paragraph => MarkdownNodeType::Paragraph,
        NodeValue::Heading(heading) => MarkdownNodeType::Heading {
            level: HeadingLevel::from(heading.level),
            setext: heading.setext,
        },
        NodeValue::ThematicBreak => MarkdownNodeType::ThematicBreak,
        NodeValue::Text(text) => MarkdownNodeType::Text(text.clone()),
        NodeValue::SoftBreak => MarkdownNodeType::SoftBreak,
        NodeValue::LineBreak => MarkdownNodeType::LineBreak,
        NodeValue::Code(code) => MarkdownNodeType::Code(code.literal.clone()),
        NodeValue::HtmlInline(html) => MarkdownNodeType::HtmlInline(html.clone()),
        NodeValue::Emph => MarkdownNodeType::Emphasis,
        NodeValue::Strong => MarkdownNodeType::Strong,
        NodeValue::Strikethrough => MarkdownNodeType::Strikethrough,
        NodeValue::Link(link) => MarkdownNodeType::Link {
            url: link.url.clone(),
            title: link.title.clone(),
        },
        NodeValue::Image(image) => MarkdownNodeType::Image {
            url: image.url.clone(),
            title: image.title.clone(),
        },
        // Extensions we do not enable still need a node; keep it inert
        _ => MarkdownNodeType::Text(String::new()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Widget Grouping
// ─────────────────────────────────────────────────────────────────────────────

/// A widget whose open marker has been seen but not its close marker.
struct OpenWidget {
    info: String,
    marker: String,
    children: Vec<MarkdownNode>,
    start_line: usize,
    end_line: usize,
}

impl OpenWidget {
    fn finish(self) -> MarkdownNode {
        MarkdownNode::new(
            MarkdownNodeType::Widget { info: self.info },
            self.start_line,
            self.end_line,
        )
        .with_children(self.children)
    }

    /// Give back the marker and children as ordinary siblings.
    fn into_unclosed(self) -> Vec<MarkdownNode> {
        let mut nodes = Vec::with_capacity(self.children.len() + 1);
        nodes.push(MarkdownNode::new(
            MarkdownNodeType::Text(self.marker),
            self.start_line,
            self.start_line,
        ));
        nodes.extend(self.children);
        nodes
    }
}

fn push_text(nodes: &mut Vec<MarkdownNode>, text: &str, source: &MarkdownNode) {
    if !text.is_empty() {
        nodes.push(MarkdownNode::new(
            MarkdownNodeType::Text(text.to_string()),
            source.start_line,
            source.end_line,
        ));
    }
}

/// Merge runs of sibling text nodes into one node.
fn merge_adjacent_text(nodes: Vec<MarkdownNode>) -> Vec<MarkdownNode> {
    let mut merged: Vec<MarkdownNode> = Vec::with_capacity(nodes.len());

    for node in nodes {
        if let (Some(last), MarkdownNodeType::Text(text)) = (merged.last_mut(), &node.node_type) {
            if let MarkdownNodeType::Text(previous) = &mut last.node_type {
                previous.push_str(text);
                last.end_line = node.end_line;
                continue;
            }
        }
        merged.push(node);
    }

    merged
}

/// Wrap encoded widget spans among `children` into `Widget` nodes.
///
/// Everything between an open marker and its close marker becomes a child of
/// the widget, including structure comrak found inside the payload. A marker
/// that is never closed is left as plain text.
fn group_widgets(children: Vec<MarkdownNode>) -> Vec<MarkdownNode> {
    let children = merge_adjacent_text(children);
    let mut grouped = Vec::with_capacity(children.len());
    let mut open: Option<OpenWidget> = None;

    for child in children {
        let MarkdownNodeType::Text(text) = &child.node_type else {
            match open.as_mut() {
                Some(widget) => {
                    widget.end_line = child.end_line;
                    widget.children.push(child);
                }
                None => grouped.push(child),
            }
            continue;
        };

        let mut rest = text.as_str();
        loop {
            match open.take() {
                Some(mut widget) => match find_close_delimiter(rest) {
                    Some(close) => {
                        push_text(&mut widget.children, &rest[..close], &child);
                        widget.end_line = child.end_line;
                        trace!("Grouped widget {}", widget.info);
                        grouped.push(widget.finish());
                        rest = &rest[close + WIDGET_DELIMITER.len()..];
                    }
                    None => {
                        push_text(&mut widget.children, rest, &child);
                        widget.end_line = child.end_line;
                        open = Some(widget);
                        break;
                    }
                },
                None => match find_open_marker(rest) {
                    Some(marker) => {
                        push_text(&mut grouped, &rest[..marker.start], &child);
                        open = Some(OpenWidget {
                            info: marker.info.to_string(),
                            marker: rest[marker.start..marker.end].to_string(),
                            children: Vec::new(),
                            start_line: child.start_line,
                            end_line: child.end_line,
                        });
                        rest = &rest[marker.end..];
                    }
                    None => {
                        push_text(&mut grouped, rest, &child);
                        break;
                    }
                },
            }
        }
    }

    if let Some(widget) = open {
        trace!("Widget {} is never closed", widget.info);
        grouped.extend(widget.into_unclosed());
        return merge_adjacent_text(grouped);
    }

    grouped
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
