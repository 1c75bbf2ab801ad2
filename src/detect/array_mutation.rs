//! In-place mutation of arrays/lists through the append/remove/insert/
//! sort/reverse/fill method family.
//!
//! Mutation itself is only a judgment call, so certainty stays heuristic;
//! confidence is raised when the target looks like framework state, where
//! in-place mutation is a real bug.

use lazy_static::lazy_static;
use phf::phf_set;
use regex::Regex;

use crate::parser::Language;
use crate::tree::NodeKind;

use super::{
    callee, member_object, member_property, Certainty, Facts, Finding, FindingScope, Rule,
    RuleContext, RuleName, Severity,
};

static JS_MUTATORS: phf::Set<&'static str> = phf_set! {
    "push", "pop", "shift", "unshift", "splice", "sort", "reverse", "fill", "copyWithin",
};

static PY_MUTATORS: phf::Set<&'static str> = phf_set! {
    "append", "remove", "insert", "sort", "reverse", "extend", "pop", "clear",
};

lazy_static! {
    static ref STATE_LIKE: Regex =
        Regex::new(r"(?i)(^|\.)(state|props|store)(\.|$|\[)").unwrap();
}

pub struct ArrayMutation;

impl Rule for ArrayMutation {
    fn name(&self) -> RuleName {
        RuleName::ArrayMutation
    }

    fn languages(&self) -> &'static [Language] {
        Language::ALL
    }

    fn check(&self, ctx: &RuleContext) -> anyhow::Result<Vec<Finding>> {
        let tree = ctx.tree;
        let mutators = match ctx.language {
            Language::Python => &PY_MUTATORS,
            _ => &JS_MUTATORS,
        };
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
            let method = tree.text_of(property, ctx.source);
            if !mutators.contains(method) {
                continue;
            }

            let target = tree.text_of(object, ctx.source).to_string();
            let state_like = STATE_LIKE.is_match(&target);

            let mut facts = Facts::new();
            facts.set_str("method", method);
            facts.set_str("target", target.clone());
            facts.set_bool("state_like", state_like);
            facts.set_str("language", ctx.language.as_str());

            findings.push(Finding {
                rule: RuleName::ArrayMutation,
                line: tree.line_of(call),
                column: tree.column_of(call),
                severity: if state_like {
                    Severity::Warning
                } else {
                    Severity::Info
                },
                certainty: Certainty::Heuristic,
                confidence: if state_like { 0.5 } else { 0.3 },
                scope: FindingScope::Local,
                message: format!("'{}.{}' mutates the collection in place", target, method),
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
        ArrayMutation.check(&ctx).unwrap()
    }

    #[test]
    fn flags_python_append() {
        let findings = run("items.append(x)\n", Language::Python);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].facts.str_value("method"), Some("append"));
        assert_eq!(findings[0].facts.bool_value("state_like"), Some(false));
        assert_eq!(findings[0].severity, Severity::Info);
    }

    #[test]
    fn state_target_raises_confidence_and_severity() {
        let plain = run("items.push(x);\n", Language::Javascript);
        let state = run("this.state.items.push(x);\n", Language::Javascript);
        assert_eq!(state.len(), 1);
        assert_eq!(state[0].facts.bool_value("state_like"), Some(true));
        assert!(state[0].confidence > plain[0].confidence);
        assert_eq!(state[0].severity, Severity::Warning);
    }

    #[test]
    fn non_mutating_methods_pass() {
        assert!(run("items.map(f);\n", Language::Javascript).is_empty());
        assert!(run("items.index(x)\n", Language::Python).is_empty());
    }
}
