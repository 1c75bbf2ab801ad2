//! Syntax query layer.
//!
//! The five primitives every detection rule and the scope model build on:
//! pre-order traversal, kind search, ancestor search, text extraction, and
//! 1-indexed position conversion. All operations are pure; nothing here
//! mutates the tree.

use crate::tree::{NodeId, NodeKind, SyntaxTree};

impl SyntaxTree {
    /// Pre-order traversal starting at (and including) `from`.
    pub fn walk<F: FnMut(NodeId)>(&self, from: NodeId, visitor: &mut F) {
        visitor(from);
        for child in self.children(from).to_vec() {
            self.walk(child, visitor);
        }
    }

    /// All nodes under `from` (inclusive) whose kind is in `kinds`, in
    /// document order.
    pub fn find_nodes(&self, from: NodeId, kinds: &[NodeKind]) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(from, &mut |id| {
            if kinds.contains(&self.kind(id)) {
                out.push(id);
            }
        });
        out
    }

    /// Nearest strict ancestor of `id` whose kind is in `kinds`.
    pub fn find_ancestor(&self, id: NodeId, kinds: &[NodeKind]) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if kinds.contains(&self.kind(node)) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Whether any strict ancestor of `id` has a kind in `kinds`.
    pub fn is_inside(&self, id: NodeId, kinds: &[NodeKind]) -> bool {
        self.find_ancestor(id, kinds).is_some()
    }

    /// Exact source text of the node, via its byte span.
    pub fn text_of<'s>(&self, id: NodeId, source: &'s str) -> &'s str {
        let node = self.node(id);
        &source[node.start_byte..node.end_byte]
    }

    /// 1-indexed line of the node's start position.
    pub fn line_of(&self, id: NodeId) -> usize {
        self.node(id).start_row + 1
    }

    /// 1-indexed column of the node's start position.
    pub fn column_of(&self, id: NodeId) -> usize {
        self.node(id).start_col + 1
    }
}
