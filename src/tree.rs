//! Owned syntax tree arena.
//!
//! The engine never works on borrowed tree-sitter nodes directly. Each parse
//! is converted into an index-addressed arena: nodes live in one `Vec`,
//! children and parents are `NodeId` indices, and named fields are a small
//! per-node lookup table. The arena is immutable once built.

use crate::parser::Language;

/// Index of a node within a [`SyntaxTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Closed set of node kinds the detection rules consume.
///
/// Raw tree-sitter kind strings are classified into this sum type once, at
/// arena construction. Kinds no rule looks at collapse into `Other`; the raw
/// kind string stays available for the rare language-specific check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    Function,
    Class,
    Block,
    Call,
    Member,
    Subscript,
    Await,
    Binary,
    Ternary,
    Assignment,
    /// Function-scoped `var` declaration (javascript only).
    VarDeclaration,
    /// Block-scoped `let`/`const` declaration.
    LexicalDeclaration,
    Declarator,
    If,
    For,
    /// Iterator-style loop that binds a loop variable (`for..of`, python `for`).
    ForIn,
    While,
    Try,
    Catch,
    Finally,
    Return,
    ExpressionStatement,
    Parameters,
    Arguments,
    Identifier,
    PropertyIdentifier,
    StringLiteral,
    NumberLiteral,
    /// `null`, `undefined`, or `None`.
    NullLiteral,
    Comment,
    /// No-op placeholder statement: python `pass`, javascript `;`.
    Pass,
    Other,
}

/// One node of the arena.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: NodeKind,
    /// The grammar's kind string, e.g. `"lexical_declaration"`.
    pub raw_kind: &'static str,
    pub is_named: bool,
    pub start_byte: usize,
    pub end_byte: usize,
    /// 0-indexed start row as reported by the grammar.
    pub start_row: usize,
    /// 0-indexed start column as reported by the grammar.
    pub start_col: usize,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Named-field children, e.g. `("condition", id)` on an if statement.
    pub fields: Vec<(&'static str, NodeId)>,
}

/// An immutable syntax tree for one source unit.
#[derive(Debug)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
    pub language: Language,
}

impl SyntaxTree {
    /// Build an arena from a parsed tree-sitter tree.
    pub fn from_ts_tree(tree: &tree_sitter::Tree, language: Language) -> Self {
        let classify = language.classifier();
        let mut nodes = Vec::new();
        let mut cursor = tree.walk();
        build_subtree(&mut cursor, None, &mut nodes, classify);
        SyntaxTree { nodes, language }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.index()].kind
    }

    pub fn raw_kind(&self, id: NodeId) -> &'static str {
        self.nodes[id.index()].raw_kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// Named (non-token) children only.
    pub fn named_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id.index()]
            .children
            .iter()
            .copied()
            .filter(|c| self.nodes[c.index()].is_named)
    }

    /// First child stored under the given field name.
    pub fn field(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[id.index()]
            .fields
            .iter()
            .find(|(f, _)| *f == name)
            .map(|(_, c)| *c)
    }

    /// All children stored under the given field name (e.g. python's
    /// chained comparison `operators`).
    pub fn field_all(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        self.nodes[id.index()]
            .fields
            .iter()
            .filter(|(f, _)| *f == name)
            .map(|(_, c)| *c)
            .collect()
    }
}

fn build_subtree(
    cursor: &mut tree_sitter::TreeCursor,
    parent: Option<NodeId>,
    nodes: &mut Vec<NodeData>,
    classify: fn(&str) -> NodeKind,
) -> NodeId {
    let node = cursor.node();
    let id = NodeId(nodes.len() as u32);
    let start = node.start_position();
    nodes.push(NodeData {
        kind: classify(node.kind()),
        raw_kind: node.kind(),
        is_named: node.is_named(),
        start_byte: node.start_byte(),
        end_byte: node.end_byte(),
        start_row: start.row,
        start_col: start.column,
        parent,
        children: Vec::new(),
        fields: Vec::new(),
    });

    if cursor.goto_first_child() {
        loop {
            // Field name refers to the cursor's current node; read it before
            // descending.
            let field = cursor.field_name();
            let child = build_subtree(cursor, Some(id), nodes, classify);
            nodes[id.index()].children.push(child);
            if let Some(f) = field {
                nodes[id.index()].fields.push((f, child));
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }

    id
}
