//! Function-scoped `var` declarations. JavaScript only; always flagged.

use crate::parser::Language;
use crate::tree::NodeKind;

use super::{Certainty, Facts, Finding, FindingScope, Rule, RuleContext, RuleName, Severity};

pub struct VarUsage;

impl Rule for VarUsage {
    fn name(&self) -> RuleName {
        RuleName::VarUsage
    }

    fn languages(&self) -> &'static [Language] {
        &[Language::Javascript]
    }

    fn check(&self, ctx: &RuleContext) -> anyhow::Result<Vec<Finding>> {
        let tree = ctx.tree;
        let mut findings = Vec::new();

        for decl in tree.find_nodes(tree.root(), &[NodeKind::VarDeclaration]) {
            let names: Vec<String> = tree
                .find_nodes(decl, &[NodeKind::Declarator])
                .into_iter()
                .filter_map(|d| tree.field(d, "name"))
                .map(|n| tree.text_of(n, ctx.source).to_string())
                .collect();

            let mut facts = Facts::new();
            facts.set_list("variable_names", names.clone());

            let subject = names.first().cloned().unwrap_or_else(|| "it".to_string());
            findings.push(Finding {
                rule: RuleName::VarUsage,
                line: tree.line_of(decl),
                column: tree.column_of(decl),
                severity: Severity::Info,
                certainty: Certainty::Definite,
                confidence: 0.9,
                scope: FindingScope::Local,
                message: format!("'var' used to declare '{}'; prefer 'let' or 'const'", subject),
                facts,
            });
        }

        Ok(findings)
    }
}
