//! Ferrite Widgets
//!
//! Inline widget syntax for the Ferrite WYSIWYG markdown editor. Plugins
//! register pattern rules; matching spans of text become widgets that render
//! through plugin-supplied functions (math, mentions, emoji, ...).
//!
//! Widgets travel through markdown source as `$$widget<n> <payload>$$`, where
//! `n` is the position of the rule that produced them.
//!
//! # Example
//! ```ignore
//! use ferrite_widgets::{parse_markdown, WidgetRegistry, WidgetRule};
//!
//! let registry = WidgetRegistry::with_rules(vec![
//!     WidgetRule::new(Regex::new(r"@\w+")?, |name| format!("<a>{}</a>", name)),
//! ]);
//!
//! let source = registry.encode_widgets("ping @ann");
//! let doc = parse_markdown(&source)?;
//! let html = registry.render_widgets(&doc)?;
//! ```

pub mod config;
pub mod error;
pub mod markdown;
pub mod widget;

pub use config::{load_config, WidgetRuleConfig, WidgetSettings};
pub use error::{Error, Result};
pub use markdown::{parse_markdown, MarkdownDocument, MarkdownNode, MarkdownNodeType};
pub use widget::{
    create_widget_content, get_widget_content, unwrap_widget_syntax, InlineNode,
    InlineNodeFactory, NodeFactory, WidgetRegistry, WidgetRule,
};
