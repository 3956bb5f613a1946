// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Syntax tree types.
//!
//! The grammar builds an owned tree of [`Node`] values. [`SyntaxTree`]
//! flattens that tree into an arena with parent links so that nodes can be
//! navigated in every direction through cheap, copyable [`SyntaxNode`]
//! handles and a [`TreeCursor`].

mod cursor;
mod kind;

pub use cursor::{Descendants, TreeCursor};
pub use kind::SyntaxKind;

use cellscope_core::document::Document;
use cellscope_core::types::Span;

// ============================================================================
// Node (parser output)
// ============================================================================

/// A node as produced by the grammar: kind, byte range and owned children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: SyntaxKind,
    pub span: Span,
    pub children: Vec<Node>,
}

impl Node {
    /// A childless node.
    pub fn leaf(kind: SyntaxKind, span: Span) -> Self {
        Node {
            kind,
            span,
            children: Vec::new(),
        }
    }

    /// A node with an explicit range.
    pub fn new(kind: SyntaxKind, span: Span, children: Vec<Node>) -> Self {
        Node {
            kind,
            span,
            children,
        }
    }

    /// A node whose range covers its children.
    ///
    /// With no children the range is empty at offset 0; callers that can
    /// produce an empty child list use [`Node::new`] instead.
    pub fn wrap(kind: SyntaxKind, children: Vec<Node>) -> Self {
        let span = children
            .iter()
            .map(|c| c.span)
            .reduce(Span::cover)
            .unwrap_or_default();
        Node {
            kind,
            span,
            children,
        }
    }
}

// ============================================================================
// SyntaxTree (arena)
// ============================================================================

/// Index of a node inside a [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: SyntaxKind,
    span: Span,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An immutable syntax tree with parent links.
///
/// Nodes are stored in pre-order, so the root is always `NodeId(0)`.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
}

impl SyntaxTree {
    /// Flatten a parsed node tree.
    pub fn from_node(root: Node) -> Self {
        let mut tree = SyntaxTree { nodes: Vec::new() };
        tree.add(root, None);
        tree
    }

    fn add(&mut self, node: Node, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind: node.kind,
            span: node.span,
            parent,
            children: Vec::new(),
        });
        let children = node
            .children
            .into_iter()
            .map(|child| self.add(child, Some(id)))
            .collect();
        self.nodes[id.0].children = children;
        id
    }

    /// The root node.
    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode {
            tree: self,
            id: NodeId(0),
        }
    }

    /// Handle for `id`.
    pub fn node(&self, id: NodeId) -> SyntaxNode<'_> {
        SyntaxNode { tree: self, id }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// A cursor positioned at the root.
    pub fn cursor(&self) -> TreeCursor<'_> {
        TreeCursor::new(self.root())
    }

    /// Render the tree one node per line, indented by depth:
    /// `Kind[from,to]: "text"`.
    pub fn dump(&self, source: &str) -> String {
        let mut out = String::new();
        self.dump_node(self.root(), source, 0, &mut out);
        out
    }

    fn dump_node(&self, node: SyntaxNode<'_>, source: &str, depth: usize, out: &mut String) {
        let span = node.span();
        let text = source
            .get(span.start..span.end)
            .unwrap_or("")
            .replace('\n', "\\n");
        out.push_str(&"  ".repeat(depth));
        out.push_str(&format!(
            "{}[{},{}]: \"{}\"\n",
            node.kind(),
            span.start,
            span.end,
            text
        ));
        for child in node.children() {
            self.dump_node(child, source, depth + 1, out);
        }
    }

    /// True if any node in the tree is an error node.
    pub fn has_errors(&self) -> bool {
        self.nodes.iter().any(|n| n.kind == SyntaxKind::Error)
    }
}

// ============================================================================
// SyntaxNode (handle)
// ============================================================================

/// A copyable handle to one node of a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct SyntaxNode<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl<'t> SyntaxNode<'t> {
    fn data(&self) -> &'t NodeData {
        &self.tree.nodes[self.id.0]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    pub fn kind(&self) -> SyntaxKind {
        self.data().kind
    }

    /// Half-open byte range `[from, to)`.
    pub fn span(&self) -> Span {
        self.data().span
    }

    pub fn parent(&self) -> Option<SyntaxNode<'t>> {
        self.data().parent.map(|id| self.tree.node(id))
    }

    /// Children in source order.
    pub fn children(&self) -> impl Iterator<Item = SyntaxNode<'t>> + 't {
        let tree = self.tree;
        self.data().children.iter().map(move |&id| tree.node(id))
    }

    pub fn child(&self, index: usize) -> Option<SyntaxNode<'t>> {
        self.data()
            .children
            .get(index)
            .map(|&id| self.tree.node(id))
    }

    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    /// First child of the given kind.
    pub fn child_of_kind(&self, kind: SyntaxKind) -> Option<SyntaxNode<'t>> {
        self.children().find(|c| c.kind() == kind)
    }

    /// The source text under this node, if `doc` covers its range.
    pub fn text<'d, D: Document + ?Sized>(&self, doc: &'d D) -> Option<&'d str> {
        doc.slice(self.span())
    }

    /// A cursor rooted at this node.
    pub fn walk(&self) -> TreeCursor<'t> {
        TreeCursor::new(*self)
    }
}

impl std::fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.kind(), self.span())
    }
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SyntaxNode<'_> {}
