//! Nested-scope model for shadowing analysis.
//!
//! One top-down pass builds a scope tree over the syntax arena and records
//! identifier declarations into the scope current at the point of visit.
//! Binding forms recorded: declarator names, parameters, loop-bound
//! variables, and exception-binding names. Function names are not
//! declarations here.

use std::collections::HashMap;

use phf::phf_set;

use crate::parser::Language;
use crate::tree::{NodeId, NodeKind, SyntaxTree};

/// Conventional names whose shadowing is idiomatic and never reported.
static IGNORED_NAMES: phf::Set<&'static str> = phf_set! {
    "i", "j", "k", "n", "_", "e", "err", "error", "ex", "exc",
};

/// One scope in the tree. Parent indices only point outward; the structure
/// is never cyclic.
#[derive(Debug)]
pub struct ScopeNode {
    /// The syntax node that introduced this scope (the root for scope 0).
    pub node: NodeId,
    /// Identifier name to first-declaration line within this scope.
    pub declarations: HashMap<String, usize>,
    pub parent: Option<usize>,
    pub depth: usize,
}

/// A recorded declaration, kept flat for cross-scope grouping.
#[derive(Debug, Clone)]
pub struct DeclarationRecord {
    pub name: String,
    pub line: usize,
    pub column: usize,
    pub scope: usize,
    pub depth: usize,
}

/// An inner declaration hiding an outer one of the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowingPair {
    pub name: String,
    pub outer_line: usize,
    pub inner_line: usize,
    pub inner_column: usize,
    pub scopes_between: usize,
}

/// Scope tree plus flat declaration records, built fresh per analysis.
#[derive(Debug)]
pub struct ScopeModel {
    scopes: Vec<ScopeNode>,
    records: Vec<DeclarationRecord>,
}

fn scope_kinds(language: Language) -> &'static [NodeKind] {
    match language {
        Language::Javascript | Language::Typescript => &[
            NodeKind::Function,
            NodeKind::Class,
            NodeKind::Block,
            NodeKind::For,
            NodeKind::ForIn,
            NodeKind::While,
            NodeKind::Catch,
        ],
        Language::Python => &[
            NodeKind::Function,
            NodeKind::Class,
            NodeKind::Block,
            NodeKind::ForIn,
            NodeKind::While,
            NodeKind::Catch,
        ],
    }
}

impl ScopeModel {
    pub fn build(tree: &SyntaxTree, source: &str) -> Self {
        let mut model = ScopeModel {
            scopes: vec![ScopeNode {
                node: tree.root(),
                declarations: HashMap::new(),
                parent: None,
                depth: 0,
            }],
            records: Vec::new(),
        };
        let kinds = scope_kinds(tree.language);
        model.visit(tree, source, tree.root(), 0, kinds);
        model
    }

    pub fn scopes(&self) -> &[ScopeNode] {
        &self.scopes
    }

    pub fn records(&self) -> &[DeclarationRecord] {
        &self.records
    }

    fn visit(
        &mut self,
        tree: &SyntaxTree,
        source: &str,
        node: NodeId,
        current: usize,
        kinds: &'static [NodeKind],
    ) {
        let mut scope = current;
        if node != tree.root() && kinds.contains(&tree.kind(node)) {
            let depth = self.scopes[current].depth + 1;
            self.scopes.push(ScopeNode {
                node,
                declarations: HashMap::new(),
                parent: Some(current),
                depth,
            });
            scope = self.scopes.len() - 1;
        }

        self.record_bindings(tree, source, node, scope);

        for child in tree.children(node).to_vec() {
            self.visit(tree, source, child, scope, kinds);
        }
    }

    fn record_bindings(&mut self, tree: &SyntaxTree, source: &str, node: NodeId, scope: usize) {
        match tree.kind(node) {
            NodeKind::Declarator => {
                if let Some(name) = tree.field(node, "name") {
                    self.record_identifiers(tree, source, name, scope);
                }
            }
            NodeKind::Assignment => {
                // Python's declaration form is plain assignment. Augmented
                // assignment reuses an existing binding and is skipped.
                if tree.language == Language::Python && tree.raw_kind(node) == "assignment" {
                    if let Some(left) = tree.field(node, "left") {
                        self.record_identifiers(tree, source, left, scope);
                    }
                }
            }
            NodeKind::Parameters => {
                for child in tree.named_children(node).collect::<Vec<_>>() {
                    self.record_identifiers(tree, source, child, scope);
                }
            }
            NodeKind::ForIn => {
                if let Some(left) = tree.field(node, "left") {
                    // `for (const x of xs)` routes through its declarator.
                    if !matches!(
                        tree.kind(left),
                        NodeKind::LexicalDeclaration | NodeKind::VarDeclaration
                    ) {
                        self.record_identifiers(tree, source, left, scope);
                    }
                }
            }
            NodeKind::Catch => {
                if let Some(param) = tree.field(node, "parameter") {
                    self.record_identifiers(tree, source, param, scope);
                } else {
                    // python: `except ValueError as e` binds via as_pattern
                    for child in tree.named_children(node).collect::<Vec<_>>() {
                        if tree.raw_kind(child) == "as_pattern" {
                            self.record_identifiers(tree, source, child, scope);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    /// Record every binding identifier reachable from `node`, skipping
    /// default values and type annotations.
    fn record_identifiers(&mut self, tree: &SyntaxTree, source: &str, node: NodeId, scope: usize) {
        let mut bindings = Vec::new();
        collect_binding_identifiers(tree, node, &mut bindings);
        for id in bindings {
            let name = tree.text_of(id, source).to_string();
            if name.is_empty() {
                continue;
            }
            self.record(name, tree.line_of(id), tree.column_of(id), scope);
        }
    }

    /// Only the first declaration of a name counts within one scope;
    /// redeclaration in the same scope is not shadowing.
    fn record(&mut self, name: String, line: usize, column: usize, scope: usize) {
        if self.scopes[scope].declarations.contains_key(&name) {
            return;
        }
        self.scopes[scope].declarations.insert(name.clone(), line);
        let depth = self.scopes[scope].depth;
        self.records.push(DeclarationRecord {
            name,
            line,
            column,
            scope,
            depth,
        });
    }

    fn is_ancestor(&self, outer: usize, inner: usize) -> bool {
        let mut current = self.scopes[inner].parent;
        while let Some(scope) = current {
            if scope == outer {
                return true;
            }
            current = self.scopes[scope].parent;
        }
        false
    }

    /// All shadowing pairs: for each non-ignored name declared in two or
    /// more scopes, the shallowest declaration is the outer target and every
    /// strictly deeper declaration in an enclosed scope is reported against
    /// it. Same-depth redeclarations (sibling scopes) are never flagged, and
    /// neither are deeper declarations in scopes the outer one does not
    /// enclose.
    pub fn shadowing_pairs(&self) -> Vec<ShadowingPair> {
        let mut by_name: HashMap<&str, Vec<&DeclarationRecord>> = HashMap::new();
        for record in &self.records {
            by_name.entry(&record.name).or_default().push(record);
        }

        let mut pairs = Vec::new();
        for (name, mut group) in by_name {
            if group.len() < 2 || IGNORED_NAMES.contains(name) {
                continue;
            }
            group.sort_by_key(|r| (r.depth, r.line));
            let outer = group[0];
            for inner in &group[1..] {
                if inner.depth > outer.depth && self.is_ancestor(outer.scope, inner.scope) {
                    pairs.push(ShadowingPair {
                        name: name.to_string(),
                        outer_line: outer.line,
                        inner_line: inner.line,
                        inner_column: inner.column,
                        scopes_between: inner.depth - outer.depth,
                    });
                }
            }
        }

        pairs.sort_by(|a, b| {
            (a.inner_line, a.inner_column, &a.name).cmp(&(b.inner_line, b.inner_column, &b.name))
        });
        pairs
    }
}

fn collect_binding_identifiers(tree: &SyntaxTree, node: NodeId, out: &mut Vec<NodeId>) {
    if tree.kind(node) == NodeKind::Identifier {
        out.push(node);
        return;
    }

    for field in ["name", "pattern", "left", "alias"] {
        if let Some(inner) = tree.field(node, field) {
            collect_binding_identifiers(tree, inner, out);
            return;
        }
    }

    // Destructuring patterns and wrapped targets: descend into named
    // children, skipping default-value and annotation subtrees.
    let skipped: Vec<NodeId> = ["right", "value", "type"]
        .iter()
        .flat_map(|f| tree.field(node, f))
        .collect();
    for child in tree.named_children(node).collect::<Vec<_>>() {
        if skipped.contains(&child) || tree.kind(child) == NodeKind::Block {
            continue;
        }
        collect_binding_identifiers(tree, child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn pairs(source: &str, language: Language) -> Vec<ShadowingPair> {
        let tree = parser::parse(source, language).unwrap();
        ScopeModel::build(&tree, source).shadowing_pairs()
    }

    #[test]
    fn python_module_variable_shadowed_in_function() {
        let source = "\
result = []

def process(items):
    result = []
    return result
";
        let found = pairs(source, Language::Python);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "result");
        assert_eq!(found[0].outer_line, 1);
        assert_eq!(found[0].inner_line, 4);
        assert!(found[0].scopes_between >= 1);
    }

    #[test]
    fn javascript_nested_chain_reports_each_inner_level() {
        let source = "\
let total = 0;
function outer() {
    let total = 1;
    function inner() {
        let total = 2;
    }
}
";
        let found = pairs(source, Language::Javascript);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].outer_line, 1);
        assert_eq!(found[0].inner_line, 3);
        assert_eq!(found[1].outer_line, 1);
        assert_eq!(found[1].inner_line, 5);
        // Deeper nesting means strictly more scopes between.
        assert!(found[1].scopes_between > found[0].scopes_between);
    }

    #[test]
    fn sibling_scopes_are_not_shadowing() {
        let source = "\
function first() {
    let value = 1;
}
function second() {
    let value = 2;
}
";
        assert!(pairs(source, Language::Javascript).is_empty());
    }

    #[test]
    fn deeper_sibling_does_not_shadow_non_enclosing_outer() {
        // `count` in g's nested block is deeper than the one in f, but f's
        // scope does not enclose it, so nothing is reported.
        let source = "\
function f() {
    let count = 1;
}
function g() {
    if (true) {
        let count = 2;
    }
}
";
        assert!(pairs(source, Language::Javascript).is_empty());
    }

    #[test]
    fn ignored_names_never_flagged() {
        let source = "\
i = 0
for i in range(3):
    for i in range(2):
        pass
";
        assert!(pairs(source, Language::Python).is_empty());
    }

    #[test]
    fn parameter_shadowed_by_inner_declaration() {
        let source = "\
function handle(data) {
    if (data) {
        let data = [];
    }
}
";
        let found = pairs(source, Language::Javascript);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "data");
        assert_eq!(found[0].outer_line, 1);
        assert_eq!(found[0].inner_line, 3);
    }

    #[test]
    fn same_scope_redeclaration_not_recorded_twice() {
        let source = "x = 1\nx = 2\n";
        let tree = parser::parse(source, Language::Python).unwrap();
        let model = ScopeModel::build(&tree, source);
        assert_eq!(model.records().len(), 1);
        assert!(model.shadowing_pairs().is_empty());
    }

    #[test]
    fn except_binding_is_recorded() {
        let source = "\
try:
    risky()
except ValueError as problem:
    print(problem)
";
        let tree = parser::parse(source, Language::Python).unwrap();
        let model = ScopeModel::build(&tree, source);
        assert!(model.records().iter().any(|r| r.name == "problem"));
    }
}
