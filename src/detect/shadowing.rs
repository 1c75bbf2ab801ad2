//! Variable shadowing detection, backed by the scope model.

use crate::parser::Language;
use crate::scope::ScopeModel;

use super::{Certainty, Facts, Finding, FindingScope, Rule, RuleContext, RuleName, Severity};

pub struct VariableShadowing;

impl Rule for VariableShadowing {
    fn name(&self) -> RuleName {
        RuleName::VariableShadowing
    }

    fn languages(&self) -> &'static [Language] {
        Language::ALL
    }

    fn check(&self, ctx: &RuleContext) -> anyhow::Result<Vec<Finding>> {
        let model = ScopeModel::build(ctx.tree, ctx.source);

        let findings = model
            .shadowing_pairs()
            .into_iter()
            .map(|pair| {
                let mut facts = Facts::new();
                facts.set_str("variable_name", pair.name.clone());
                facts.set_int("outer_declaration_line", pair.outer_line as i64);
                facts.set_int("inner_declaration_line", pair.inner_line as i64);
                facts.set_int("scopes_between", pair.scopes_between as i64);

                Finding {
                    rule: RuleName::VariableShadowing,
                    line: pair.inner_line,
                    column: pair.inner_column,
                    severity: Severity::Warning,
                    certainty: Certainty::Possible,
                    confidence: 0.6,
                    scope: FindingScope::Function,
                    message: format!(
                        "'{}' shadows the declaration on line {}",
                        pair.name, pair.outer_line
                    ),
                    facts,
                }
            })
            .collect();

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
        VariableShadowing.check(&ctx).unwrap()
    }

    #[test]
    fn reports_inner_redeclaration_with_both_lines() {
        let source = "\
let x = 1;
function f() {
    let x = 2;
}
";
        let findings = run(source, Language::Javascript);
        assert_eq!(findings.len(), 1);
        let f = &findings[0];
        assert_eq!(f.line, 3);
        assert_eq!(f.facts.int_value("outer_declaration_line"), Some(1));
        assert_eq!(f.facts.int_value("inner_declaration_line"), Some(3));
        assert!(f.facts.int_value("scopes_between").unwrap() >= 1);
    }

    #[test]
    fn no_findings_without_shadowing() {
        let findings = run("let a = 1;\nlet b = 2;\n", Language::Javascript);
        assert!(findings.is_empty());
    }
}
