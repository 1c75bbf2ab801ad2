//! Leftover debug output (`console.*` calls).
//!
//! Debug prints that are clearly intentional are not flagged: calls under a
//! conditional that tests debug/environment vocabulary, and error/warn
//! calls that live inside an exception handler.

use lazy_static::lazy_static;
use phf::phf_set;
use regex::Regex;

use crate::parser::Language;
use crate::tree::{NodeId, NodeKind, SyntaxTree};

use super::{
    callee, member_object, member_property, Certainty, Facts, Finding, FindingScope, Rule,
    RuleContext, RuleName, Severity,
};

static CONSOLE_METHODS: phf::Set<&'static str> = phf_set! {
    "log", "debug", "info", "warn", "error", "trace", "table", "dir",
};

lazy_static! {
    /// Vocabulary that marks a conditional as an intentional debug gate.
    static ref DEBUG_GATE: Regex =
        Regex::new(r"(?i)\b(debug|verbose|node_env|env|test|dev|development)\b").unwrap();
}

pub struct ConsoleLogLeft;

impl ConsoleLogLeft {
    fn inside_debug_gate(tree: &SyntaxTree, source: &str, id: NodeId) -> bool {
        let mut current = tree.parent(id);
        while let Some(node) = current {
            if matches!(tree.kind(node), NodeKind::If | NodeKind::Ternary) {
                if let Some(cond) = tree.field(node, "condition") {
                    if DEBUG_GATE.is_match(tree.text_of(cond, source)) {
                        return true;
                    }
                }
            }
            current = tree.parent(node);
        }
        false
    }
}

impl Rule for ConsoleLogLeft {
    fn name(&self) -> RuleName {
        RuleName::ConsoleLogLeft
    }

    fn languages(&self) -> &'static [Language] {
        &[Language::Javascript, Language::Typescript]
    }

    fn check(&self, ctx: &RuleContext) -> anyhow::Result<Vec<Finding>> {
        let tree = ctx.tree;
        let mut findings = Vec::new();

        for call in tree.find_nodes(tree.root(), &[NodeKind::Call]) {
            let Some(callee) = callee(tree, call) else {
                continue;
            };
            if tree.kind(callee) != NodeKind::Member {
                continue;
            }
            let (Some(object), Some(property)) =
                (member_object(tree, callee), member_property(tree, callee))
            else {
                continue;
            };
            if tree.text_of(object, ctx.source) != "console" {
                continue;
            }
            let method = tree.text_of(property, ctx.source);
            if !CONSOLE_METHODS.contains(method) {
                continue;
            }

            if Self::inside_debug_gate(tree, ctx.source, call) {
                continue;
            }
            let in_handler = tree.is_inside(call, &[NodeKind::Catch]);
            if in_handler && matches!(method, "error" | "warn") {
                continue;
            }

            let mut facts = Facts::new();
            facts.set_str("method", method);
            facts.set_bool("inside_catch", in_handler);

            findings.push(Finding {
                rule: RuleName::ConsoleLogLeft,
                line: tree.line_of(call),
                column: tree.column_of(call),
                severity: Severity::Info,
                certainty: Certainty::Heuristic,
                confidence: 0.45,
                scope: FindingScope::Local,
                message: format!("console.{} looks like leftover debug output", method),
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

    fn run(source: &str) -> Vec<Finding> {
        let tree = parser::parse(source, Language::Javascript).unwrap();
        let ctx = RuleContext {
            source,
            language: Language::Javascript,
            tree: &tree,
        };
        ConsoleLogLeft.check(&ctx).unwrap()
    }

    #[test]
    fn flags_plain_console_log() {
        let findings = run("console.log(\"here\");\n");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].facts.str_value("method"), Some("log"));
    }

    #[test]
    fn debug_gated_call_is_fine() {
        let source = "\
if (process.env.DEBUG) {
    console.log(\"state\", state);
}
";
        assert!(run(source).is_empty());
    }

    #[test]
    fn error_in_catch_is_fine_but_log_is_not() {
        let source = "\
try {
    risky();
} catch (e) {
    console.error(e);
    console.log(e);
}
";
        let findings = run(source);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].facts.str_value("method"), Some("log"));
        assert_eq!(findings[0].facts.bool_value("inside_catch"), Some(true));
    }

    #[test]
    fn other_loggers_untouched() {
        assert!(run("logger.info(\"x\");\n").is_empty());
    }
}
