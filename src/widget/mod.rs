//! Inline widget syntax
//!
//! Widgets let plugins turn spans of markdown text (formulas, mentions, emoji)
//! into custom rendered fragments.
//!
//! # Flow
//! 1. The host registers an ordered list of [`WidgetRule`]s.
//! 2. Raw text is segmented into text and widget nodes by rule priority;
//!    widget nodes carry `$$widget<n> ...$$` encoded text.
//! 3. A renderer resolves a widget through [`WidgetRegistry::widget_to_dom`].
//! 4. When reading a parsed widget back, [`get_widget_content`] recovers the
//!    flat payload.
//!
//! # Example
//! ```ignore
//! use ferrite_widgets::widget::{WidgetRegistry, WidgetRule, InlineNodeFactory};
//!
//! let registry = WidgetRegistry::with_rules(vec![
//!     WidgetRule::new(Regex::new(r"\$\S+")?, |tex| render_math(tex)),
//! ]);
//! let nodes = registry.create_nodes("area is $pi*r^2", &InlineNodeFactory);
//! ```

pub(crate) mod codec;
mod content;
mod node;
mod registry;
mod segment;

pub use codec::{
    create_widget_content, escape_widget_delimiter, trim_trailing_separator,
    unwrap_widget_syntax, WIDGET_DELIMITER, ZERO_WIDTH_SPACE,
};
pub use content::{get_widget_content, get_widget_content_with, widget_to_markdown};
pub use node::{
    to_markdown, InlineNode, InlineNodeFactory, NodeFactory, WidgetAttrs, WIDGET_NODE_TYPE,
};
pub use registry::{widget_id, ToDom, WidgetRegistry, WidgetRule};
