//! Calls to functions declared `async` in the same unit that drop the
//! returned promise/coroutine.
//!
//! Guards: the call is already awaited, its result is assigned somewhere,
//! or it is chained into a deferred continuation (`.then`/`.catch`).

use std::collections::HashMap;

use crate::parser::Language;
use crate::tree::{NodeId, NodeKind, SyntaxTree};

use super::{
    callee_name, member_property, Certainty, Facts, Finding, FindingScope, Rule, RuleContext,
    RuleName, Severity,
};

pub struct MissingAwait;

const CONTINUATIONS: &[&str] = &["then", "catch", "finally"];

/// Names of functions declared async anywhere in this unit, with their
/// declaration lines.
fn async_declarations(tree: &SyntaxTree, source: &str) -> HashMap<String, usize> {
    let mut names = HashMap::new();

    for func in tree.find_nodes(tree.root(), &[NodeKind::Function]) {
        if !tree.text_of(func, source).starts_with("async") {
            continue;
        }
        if let Some(name) = tree.field(func, "name") {
            names
                .entry(tree.text_of(name, source).to_string())
                .or_insert_with(|| tree.line_of(func));
        }
    }

    // `const f = async () => {}` declares through a declarator.
    for decl in tree.find_nodes(tree.root(), &[NodeKind::Declarator]) {
        let (Some(name), Some(value)) = (tree.field(decl, "name"), tree.field(decl, "value"))
        else {
            continue;
        };
        if tree.kind(value) == NodeKind::Function && tree.text_of(value, source).starts_with("async")
        {
            names
                .entry(tree.text_of(name, source).to_string())
                .or_insert_with(|| tree.line_of(decl));
        }
    }

    names
}

/// Immediate consumer of the call's value, looking through parentheses only.
fn immediate_parent(tree: &SyntaxTree, id: NodeId) -> Option<NodeId> {
    let mut current = tree.parent(id)?;
    while tree.raw_kind(current) == "parenthesized_expression" {
        current = tree.parent(current)?;
    }
    Some(current)
}

impl Rule for MissingAwait {
    fn name(&self) -> RuleName {
        RuleName::MissingAwait
    }

    fn languages(&self) -> &'static [Language] {
        Language::ALL
    }

    fn check(&self, ctx: &RuleContext) -> anyhow::Result<Vec<Finding>> {
        let tree = ctx.tree;
        let declared = async_declarations(tree, ctx.source);
        if declared.is_empty() {
            return Ok(Vec::new());
        }

        let mut findings = Vec::new();
        for call in tree.find_nodes(tree.root(), &[NodeKind::Call]) {
            let Some(name) = callee_name(tree, call, ctx.source) else {
                continue;
            };
            let Some(&declaration_line) = declared.get(name) else {
                continue;
            };

            match immediate_parent(tree, call).map(|p| (p, tree.kind(p))) {
                Some((_, NodeKind::Await)) => continue,
                Some((_, NodeKind::Declarator)) | Some((_, NodeKind::Assignment)) => continue,
                Some((parent, NodeKind::Member)) => {
                    // Chained continuation keeps the promise alive.
                    let chained = member_property(tree, parent)
                        .map(|p| CONTINUATIONS.contains(&tree.text_of(p, ctx.source)))
                        .unwrap_or(false);
                    if chained {
                        continue;
                    }
                }
                _ => {}
            }

            let mut facts = Facts::new();
            facts.set_str("function_name", name);
            facts.set_int("declaration_line", declaration_line as i64);
            facts.set_str("language", ctx.language.as_str());

            findings.push(Finding {
                rule: RuleName::MissingAwait,
                line: tree.line_of(call),
                column: tree.column_of(call),
                severity: Severity::Error,
                certainty: Certainty::Possible,
                confidence: 0.7,
                scope: FindingScope::Local,
                message: format!(
                    "call to async function '{}' is not awaited (declared on line {})",
                    name, declaration_line
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
        MissingAwait.check(&ctx).unwrap()
    }

    #[test]
    fn flags_dropped_async_call() {
        let source = "\
async function fetchData() {
    return 1;
}
fetchData();
";
        let findings = run(source, Language::Javascript);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 4);
        assert_eq!(findings[0].facts.str_value("function_name"), Some("fetchData"));
        assert_eq!(findings[0].facts.int_value("declaration_line"), Some(1));
    }

    #[test]
    fn awaited_assigned_and_chained_calls_pass() {
        let source = "\
async function fetchData() {
    return 1;
}
async function main() {
    await fetchData();
    const p = fetchData();
    fetchData().then(use);
    fetchData().catch(log);
}
";
        assert!(run(source, Language::Javascript).is_empty());
    }

    #[test]
    fn arrow_declarations_count() {
        let source = "\
const load = async () => 1;
load();
";
        let findings = run(source, Language::Javascript);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].facts.str_value("function_name"), Some("load"));
    }

    #[test]
    fn python_async_def() {
        let source = "\
async def fetch_data():
    return 1

async def main():
    fetch_data()
    await fetch_data()
";
        let findings = run(source, Language::Python);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 5);
    }

    #[test]
    fn sync_functions_ignored() {
        let source = "\
function plain() {}
plain();
";
        assert!(run(source, Language::Javascript).is_empty());
    }
}
