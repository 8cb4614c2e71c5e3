//! Markdown parsing for widget-aware documents
//!
//! This module provides markdown parsing using the comrak library, a
//! CommonMark + GFM compatible parser, and a depth-first walker over the
//! resulting tree.
//!
//! # Features
//! - Parse markdown text to an owned AST
//! - Encoded widgets (`$$widget<n> ...$$`) become `Widget` nodes
//! - Enter/exit event walks with subtree skipping
//!
//! # Example
//! ```ignore
//! use ferrite_widgets::markdown::{parse_markdown, NodeWalker};
//!
//! let doc = parse_markdown("Say $$widget0 @ann$$")?;
//! for event in NodeWalker::new(&doc.root) {
//!     println!("{:?} {}", event.node.node_type, event.entering);
//! }
//! ```

mod parser;
mod walker;

pub use parser::{
    parse_markdown, parse_markdown_with_options, HeadingLevel, ListType, MarkdownDocument,
    MarkdownNode, MarkdownNodeType, MarkdownOptions,
};
pub use walker::{NodeWalker, WalkEvent};
