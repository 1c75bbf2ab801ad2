//! Loose equality (`==`/`!=`) in JavaScript and TypeScript.
//!
//! Always flagged; this is a style call, not an error, so severity stays at
//! warning while certainty is definite.

use crate::parser::Language;
use crate::tree::NodeKind;

use super::{Certainty, Facts, Finding, FindingScope, Rule, RuleContext, RuleName, Severity};

pub struct DoubleEquals;

impl Rule for DoubleEquals {
    fn name(&self) -> RuleName {
        RuleName::DoubleEquals
    }

    fn languages(&self) -> &'static [Language] {
        &[Language::Javascript, Language::Typescript]
    }

    fn check(&self, ctx: &RuleContext) -> anyhow::Result<Vec<Finding>> {
        let tree = ctx.tree;
        let mut findings = Vec::new();

        for binary in tree.find_nodes(tree.root(), &[NodeKind::Binary]) {
            let Some(op_node) = tree.field(binary, "operator") else {
                continue;
            };
            let operator = tree.text_of(op_node, ctx.source);
            let suggested = match operator {
                "==" => "===",
                "!=" => "!==",
                _ => continue,
            };

            let mut facts = Facts::new();
            facts.set_str("operator", operator);
            facts.set_str("suggested_operator", suggested);

            findings.push(Finding {
                rule: RuleName::DoubleEquals,
                line: tree.line_of(op_node),
                column: tree.column_of(op_node),
                severity: Severity::Warning,
                certainty: Certainty::Definite,
                confidence: 0.9,
                scope: FindingScope::Local,
                message: format!("loose equality '{}'; prefer '{}'", operator, suggested),
                facts,
            });
        }

        Ok(findings)
    }
}
