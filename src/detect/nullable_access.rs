//! Member or index access on values that may be null.
//!
//! Two triggers with very different certainty: an identifier assigned a
//! null-like literal earlier in scope and then dereferenced is definite;
//! a bare parameter dereferenced without any null test is a heuristic.
//! Optional chaining or a conditional that tests the identifier suppresses
//! the finding.

use std::collections::{HashMap, HashSet};

use crate::parser::Language;
use crate::tree::{NodeId, NodeKind, SyntaxTree};

use super::{
    guarded_by_conditional, mentions_identifier, Certainty, Facts, Finding, FindingScope, Rule,
    RuleContext, RuleName, Severity,
};

pub struct NullableAccess;

/// The function a node's bindings live in; `None` at module level.
fn enclosing_function(tree: &SyntaxTree, id: NodeId) -> Option<NodeId> {
    tree.find_ancestor(id, &[NodeKind::Function])
}

/// Identifiers assigned `null`/`undefined`/`None`, keyed by their enclosing
/// function so a null in one function never taints a same-named local in a
/// sibling function.
fn null_assignments(tree: &SyntaxTree, source: &str) -> HashMap<(Option<NodeId>, String), usize> {
    let mut map = HashMap::new();

    for decl in tree.find_nodes(tree.root(), &[NodeKind::Declarator]) {
        let (Some(name), Some(value)) = (tree.field(decl, "name"), tree.field(decl, "value"))
        else {
            continue;
        };
        if tree.kind(name) == NodeKind::Identifier && tree.kind(value) == NodeKind::NullLiteral {
            let key = (
                enclosing_function(tree, decl),
                tree.text_of(name, source).to_string(),
            );
            map.entry(key).or_insert_with(|| tree.line_of(decl));
        }
    }

    for assign in tree.find_nodes(tree.root(), &[NodeKind::Assignment]) {
        let (Some(left), Some(right)) = (tree.field(assign, "left"), tree.field(assign, "right"))
        else {
            continue;
        };
        if tree.kind(left) == NodeKind::Identifier && tree.kind(right) == NodeKind::NullLiteral {
            let key = (
                enclosing_function(tree, assign),
                tree.text_of(left, source).to_string(),
            );
            map.entry(key).or_insert_with(|| tree.line_of(assign));
        }
    }

    map
}

/// Parameter names of the function, from its parameter list.
fn parameter_names(tree: &SyntaxTree, func: NodeId, source: &str) -> HashSet<String> {
    let mut names = HashSet::new();
    let Some(params) = tree
        .field(func, "parameters")
        .or_else(|| tree.named_children(func).find(|&c| tree.kind(c) == NodeKind::Parameters))
    else {
        return names;
    };

    for child in tree.named_children(params) {
        let ident = if tree.kind(child) == NodeKind::Identifier {
            Some(child)
        } else {
            ["name", "pattern", "left"]
                .iter()
                .find_map(|f| tree.field(child, f))
                .filter(|&n| tree.kind(n) == NodeKind::Identifier)
        };
        if let Some(ident) = ident {
            names.insert(tree.text_of(ident, source).to_string());
        }
    }
    names
}

/// Whether any if-condition inside `func` tests `name`.
fn tested_inside(tree: &SyntaxTree, func: NodeId, source: &str, name: &str) -> bool {
    tree.find_nodes(func, &[NodeKind::If, NodeKind::Ternary])
        .into_iter()
        .filter_map(|n| tree.field(n, "condition"))
        .any(|cond| mentions_identifier(tree.text_of(cond, source), name))
}

impl Rule for NullableAccess {
    fn name(&self) -> RuleName {
        RuleName::NullableAccess
    }

    fn languages(&self) -> &'static [Language] {
        Language::ALL
    }

    fn check(&self, ctx: &RuleContext) -> anyhow::Result<Vec<Finding>> {
        let tree = ctx.tree;
        let nulls = null_assignments(tree, ctx.source);
        let mut param_cache: HashMap<NodeId, HashSet<String>> = HashMap::new();
        let mut seen_null: HashSet<(Option<NodeId>, String)> = HashSet::new();
        let mut seen_param: HashSet<(NodeId, String)> = HashSet::new();
        let mut findings = Vec::new();

        for access in tree.find_nodes(tree.root(), &[NodeKind::Member, NodeKind::Subscript]) {
            let Some(object) = tree
                .field(access, "object")
                .or_else(|| tree.field(access, "value"))
            else {
                continue;
            };
            if tree.kind(object) != NodeKind::Identifier {
                continue;
            }
            let name = tree.text_of(object, ctx.source);

            // Optional chaining already handles the null case.
            if tree.text_of(access, ctx.source).contains("?.") {
                continue;
            }
            if guarded_by_conditional(tree, ctx.source, access, name) {
                continue;
            }

            let null_key = (enclosing_function(tree, access), name.to_string());
            if let Some(&assignment_line) = nulls.get(&null_key) {
                if tree.line_of(access) <= assignment_line || !seen_null.insert(null_key) {
                    continue;
                }

                let null_word = match ctx.language {
                    Language::Python => "None",
                    _ => "null",
                };
                let mut facts = Facts::new();
                facts.set_str("variable_name", name);
                facts.set_str("reason", "assigned_null");
                facts.set_int("null_assignment_line", assignment_line as i64);
                facts.set_str("language", ctx.language.as_str());

                findings.push(Finding {
                    rule: RuleName::NullableAccess,
                    line: tree.line_of(access),
                    column: tree.column_of(access),
                    severity: Severity::Error,
                    certainty: Certainty::Definite,
                    confidence: 0.9,
                    scope: FindingScope::Local,
                    message: format!(
                        "'{}' is {} here (assigned on line {}) but is accessed anyway",
                        name, null_word, assignment_line
                    ),
                    facts,
                });
                continue;
            }

            let Some(func) = tree.find_ancestor(access, &[NodeKind::Function]) else {
                continue;
            };
            let params = param_cache
                .entry(func)
                .or_insert_with(|| parameter_names(tree, func, ctx.source));
            if !params.contains(name) {
                continue;
            }
            if tested_inside(tree, func, ctx.source, name) {
                continue;
            }
            if !seen_param.insert((func, name.to_string())) {
                continue;
            }

            let mut facts = Facts::new();
            facts.set_str("variable_name", name);
            facts.set_str("reason", "parameter");
            facts.set_str("language", ctx.language.as_str());

            findings.push(Finding {
                rule: RuleName::NullableAccess,
                line: tree.line_of(access),
                column: tree.column_of(access),
                severity: Severity::Info,
                certainty: Certainty::Heuristic,
                confidence: 0.35,
                scope: FindingScope::Function,
                message: format!(
                    "parameter '{}' is accessed without checking it first",
                    name
                ),
                facts,
            });
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn run(source: &str, language: Language) -> Vec<Finding> {
        let tree = parser::parse(source, language).unwrap();
        let ctx = RuleContext {
            source,
            language,
            tree: &tree,
        };
        NullableAccess.check(&ctx).unwrap()
    }

    #[test]
    fn python_none_then_attribute() {
        let source = "\
value = None
result = value.strip()
";
        let findings = run(source, Language::Python);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 2);
        assert_eq!(findings[0].certainty, Certainty::Definite);
        assert_eq!(findings[0].facts.str_value("reason"), Some("assigned_null"));
        assert_eq!(findings[0].facts.int_value("null_assignment_line"), Some(1));
    }

    #[test]
    fn null_in_sibling_function_does_not_taint_a_fresh_local() {
        let source = "\
def setup():
    value = None

def clean(text):
    value = text.strip()
    return value.upper()
";
        let findings = run(source, Language::Python);
        assert!(findings
            .iter()
            .all(|f| f.facts.str_value("reason") != Some("assigned_null")));
    }

    #[test]
    fn null_stays_scoped_to_its_own_function() {
        let source = "\
def broken():
    value = None
    return value.strip()
";
        let findings = run(source, Language::Python);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].facts.str_value("reason"), Some("assigned_null"));
        assert_eq!(findings[0].facts.int_value("null_assignment_line"), Some(2));
    }

    #[test]
    fn conditional_guard_suppresses() {
        let source = "\
value = None
if value is not None:
    print(value.strip())
";
        assert!(run(source, Language::Python).is_empty());
    }

    #[test]
    fn optional_chaining_suppresses() {
        let source = "\
let user = null;
console.log(user?.name);
";
        assert!(run(source, Language::Javascript).is_empty());
    }

    #[test]
    fn unchecked_parameter_is_heuristic() {
        let source = "\
function greet(user) {
    return user.name;
}
";
        let findings = run(source, Language::Javascript);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].certainty, Certainty::Heuristic);
        assert_eq!(findings[0].facts.str_value("reason"), Some("parameter"));
        assert!(findings[0].confidence <= 0.5);
    }

    #[test]
    fn tested_parameter_is_fine() {
        let source = "\
function greet(user) {
    if (user) {
        return user.name;
    }
    return \"\";
}
";
        assert!(run(source, Language::Javascript).is_empty());
    }

    #[test]
    fn one_finding_per_parameter() {
        let source = "\
function dump(data) {
    print(data.a);
    print(data.b);
}
";
        assert_eq!(run(source, Language::Javascript).len(), 1);
    }
}
