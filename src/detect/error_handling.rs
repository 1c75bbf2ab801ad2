//! Fallible calls with nowhere for the error to go.
//!
//! Triggers on awaited calls and on calls into a known I/O vocabulary.
//! An enclosing exception handler, a recovery continuation (`.catch`), or
//! returning the result to the caller all suppress the finding.

use phf::phf_set;

use crate::parser::Language;
use crate::tree::{NodeId, NodeKind, SyntaxTree};

use super::{
    callee_name, member_property, Certainty, Facts, Finding, FindingScope, Rule, RuleContext,
    RuleName, Severity,
};

/// Function names that reach the outside world and can fail.
static IO_VOCABULARY: phf::Set<&'static str> = phf_set! {
    "fetch", "axios", "open", "urlopen", "connect", "send", "recv",
    "readFile", "readFileSync", "writeFile", "writeFileSync",
    "request", "query", "execute",
};

pub struct NoErrorHandling;

/// The call an await expression applies to, looking through parentheses.
/// Awaiting anything else (a plain identifier holding a promise made and
/// possibly handled elsewhere) is not a trigger.
fn awaited_call(tree: &SyntaxTree, await_node: NodeId) -> Option<NodeId> {
    let mut operand = tree.named_children(await_node).next()?;
    while tree.raw_kind(operand) == "parenthesized_expression" {
        operand = tree.named_children(operand).next()?;
    }
    (tree.kind(operand) == NodeKind::Call).then_some(operand)
}

/// Climb the expression chain the node belongs to. Reports whether a
/// recovery continuation (`.catch`/`.finally`) consumes it and whether
/// the value is returned to the caller. Stops at the first statement
/// boundary.
fn chain_state(tree: &SyntaxTree, source: &str, id: NodeId) -> (bool, bool) {
    let mut recovered = false;
    let mut returned = false;
    let mut current = tree.parent(id);

    while let Some(node) = current {
        let advance = match tree.kind(node) {
            NodeKind::Member => {
                if let Some(prop) = member_property(tree, node) {
                    let name = tree.text_of(prop, source);
                    if name == "catch" || name == "finally" {
                        recovered = true;
                    }
                }
                true
            }
            NodeKind::Return => {
                returned = true;
                false
            }
            NodeKind::Call | NodeKind::Await | NodeKind::Subscript | NodeKind::Arguments => true,
            _ => tree.raw_kind(node) == "parenthesized_expression",
        };
        if !advance || recovered {
            break;
        }
        current = tree.parent(node);
    }

    (recovered, returned)
}

impl Rule for NoErrorHandling {
    fn name(&self) -> RuleName {
        RuleName::NoErrorHandling
    }

    fn languages(&self) -> &'static [Language] {
        Language::ALL
    }

    fn check(&self, ctx: &RuleContext) -> anyhow::Result<Vec<Finding>> {
        let tree = ctx.tree;
        let mut findings = Vec::new();

        let mut flag = |node: NodeId, trigger: &str, name: Option<&str>| {
            let mut facts = Facts::new();
            facts.set_str("trigger", trigger);
            if let Some(name) = name {
                facts.set_str("function_name", name);
            }
            facts.set_str("language", ctx.language.as_str());

            let message = match name {
                Some(name) => format!(
                    "call to '{}' can fail but nothing handles the error",
                    name
                ),
                None => "awaited call can fail but nothing handles the error".to_string(),
            };

            findings.push(Finding {
                rule: RuleName::NoErrorHandling,
                line: tree.line_of(node),
                column: tree.column_of(node),
                severity: Severity::Warning,
                certainty: Certainty::Heuristic,
                confidence: if trigger == "await" { 0.5 } else { 0.4 },
                scope: FindingScope::Function,
                message,
                facts,
            });
        };

        for await_node in tree.find_nodes(tree.root(), &[NodeKind::Await]) {
            if awaited_call(tree, await_node).is_none() {
                continue;
            }
            if tree.is_inside(await_node, &[NodeKind::Try]) {
                continue;
            }
            let (recovered, returned) = chain_state(tree, ctx.source, await_node);
            if recovered || returned {
                continue;
            }
            flag(await_node, "await", None);
        }

        for call in tree.find_nodes(tree.root(), &[NodeKind::Call]) {
            // Awaited calls are covered by the await pass.
            if tree.is_inside(call, &[NodeKind::Await]) {
                continue;
            }
            let Some(name) = callee_name(tree, call, ctx.source) else {
                continue;
            };
            if !IO_VOCABULARY.contains(name) {
                continue;
            }
            if tree.is_inside(call, &[NodeKind::Try]) {
                continue;
            }
            let (recovered, returned) = chain_state(tree, ctx.source, call);
            if recovered || returned {
                continue;
            }
            flag(call, "io_call", Some(name));
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
        NoErrorHandling.check(&ctx).unwrap()
    }

    #[test]
    fn bare_await_is_flagged() {
        let source = "\
async function main() {
    const data = await loadData();
}
";
        let findings = run(source, Language::Javascript);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].facts.str_value("trigger"), Some("await"));
    }

    #[test]
    fn awaiting_a_plain_identifier_is_fine() {
        let source = "\
async function main(p) {
    await p;
    await (p);
}
";
        assert!(run(source, Language::Javascript).is_empty());
    }

    #[test]
    fn try_block_suppresses() {
        let source = "\
async function main() {
    try {
        const data = await loadData();
    } catch (e) {
        report(e);
    }
}
";
        assert!(run(source, Language::Javascript).is_empty());
    }

    #[test]
    fn catch_continuation_suppresses() {
        let source = "fetch(url).then(handle).catch(report);\n";
        assert!(run(source, Language::Javascript).is_empty());
    }

    #[test]
    fn returned_result_suppresses() {
        let source = "\
function load() {
    return fetch(url);
}
";
        assert!(run(source, Language::Javascript).is_empty());
    }

    #[test]
    fn io_vocabulary_call_is_flagged() {
        let source = "\
def read_config(path):
    f = open(path)
    return f
";
        let findings = run(source, Language::Python);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].facts.str_value("function_name"), Some("open"));
        assert_eq!(findings[0].facts.str_value("trigger"), Some("io_call"));
    }

    #[test]
    fn python_try_suppresses() {
        let source = "\
def read_config(path):
    try:
        f = open(path)
    except OSError:
        return None
    return f
";
        assert!(run(source, Language::Python).is_empty());
    }
}
