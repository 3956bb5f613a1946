// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Stateful pre-order navigation over a [`SyntaxTree`](super::SyntaxTree).

use super::{NodeId, SyntaxNode, SyntaxTree};

/// A cursor over the subtree rooted at the node it was created from.
///
/// The cursor never moves above its starting node: `goto_parent` returns
/// `false` there even when the node has a parent in the full tree.
#[derive(Clone)]
pub struct TreeCursor<'t> {
    tree: &'t SyntaxTree,
    current: NodeId,
    /// Child index taken at each level below the starting node.
    path: Vec<usize>,
}

impl<'t> TreeCursor<'t> {
    pub fn new(node: SyntaxNode<'t>) -> Self {
        TreeCursor {
            tree: node.tree(),
            current: node.id(),
            path: Vec::new(),
        }
    }

    /// The node under the cursor.
    pub fn node(&self) -> SyntaxNode<'t> {
        self.tree.node(self.current)
    }

    /// Depth below the starting node.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn goto_first_child(&mut self) -> bool {
        match self.node().child(0) {
            Some(child) => {
                self.current = child.id();
                self.path.push(0);
                true
            }
            None => false,
        }
    }

    pub fn goto_next_sibling(&mut self) -> bool {
        let Some(&index) = self.path.last() else {
            return false;
        };
        let Some(parent) = self.node().parent() else {
            return false;
        };
        match parent.child(index + 1) {
            Some(sibling) => {
                self.current = sibling.id();
                if let Some(last) = self.path.last_mut() {
                    *last = index + 1;
                }
                true
            }
            None => false,
        }
    }

    pub fn goto_parent(&mut self) -> bool {
        if self.path.pop().is_none() {
            return false;
        }
        match self.node().parent() {
            Some(parent) => {
                self.current = parent.id();
                true
            }
            None => false,
        }
    }

    /// Pre-order walk of the subtree under the cursor, starting with the
    /// current node itself.
    pub fn descendants(&self) -> Descendants<'t> {
        Descendants {
            tree: self.tree,
            stack: vec![self.current],
        }
    }
}

/// Iterator returned by [`TreeCursor::descendants`].
pub struct Descendants<'t> {
    tree: &'t SyntaxTree,
    stack: Vec<NodeId>,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = SyntaxNode<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.node(id);
        let before = self.stack.len();
        self.stack.extend(node.children().map(|c| c.id()));
        self.stack[before..].reverse();
        Some(node)
    }
}
