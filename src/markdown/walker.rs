//! Depth-first enter/exit walk over a `MarkdownNode` tree
//!
//! Containers produce an entering and a leaving event; leaves produce only an
//! entering event. The walk is an explicit stack of pending events, which makes
//! skipping a subtree a matter of discarding the pending entries above it.

use crate::markdown::parser::MarkdownNode;

/// One step of a walk.
#[derive(Debug, Clone, Copy)]
pub struct WalkEvent<'a> {
    pub node: &'a MarkdownNode,
    pub entering: bool,
}

/// Stack-based walker rooted at a single node.
#[derive(Debug, Clone)]
pub struct NodeWalker<'a> {
    pending: Vec<(&'a MarkdownNode, bool)>,
}

impl<'a> NodeWalker<'a> {
    pub fn new(root: &'a MarkdownNode) -> Self {
        Self {
            pending: vec![(root, true)],
        }
    }

    /// Reposition the walk so the next event is `(node, entering)`.
    ///
    /// Pending events above that event are discarded. Resuming at a
    /// container's leaving event therefore skips its remaining descendants.
    /// If the event is not pending at all, the walk restarts from it alone.
    pub fn resume_at(&mut self, node: &'a MarkdownNode, entering: bool) {
        while let Some(&(pending, pending_entering)) = self.pending.last() {
            if std::ptr::eq(pending, node) && pending_entering == entering {
                return;
            }
            self.pending.pop();
        }
        self.pending.push((node, entering));
    }
}

impl<'a> Iterator for NodeWalker<'a> {
    type Item = WalkEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (node, entering) = self.pending.pop()?;

        if entering && node.node_type.is_container() {
            self.pending.push((node, false));
            self.pending
                .extend(node.children.iter().rev().map(|child| (child, true)));
        }

        Some(WalkEvent { node, entering })
    }
}
