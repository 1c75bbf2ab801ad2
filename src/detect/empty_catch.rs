//! Exception handlers that swallow errors without doing anything.
//!
//! A handler body is summarized as `"empty"`, `"only pass"` (a single no-op
//! placeholder), or `"only comments"`. Any real statement suppresses the
//! finding.

use crate::parser::Language;
use crate::tree::{NodeId, NodeKind, SyntaxTree};

use super::{Certainty, Facts, Finding, FindingScope, Rule, RuleContext, RuleName, Severity};

pub struct EmptyCatch;

fn handler_body(tree: &SyntaxTree, catch: NodeId) -> Option<NodeId> {
    tree.field(catch, "body").or_else(|| {
        tree.named_children(catch)
            .find(|&c| tree.kind(c) == NodeKind::Block)
    })
}

/// Classify the handler body, or return `None` when it has real work in it.
fn summarize(tree: &SyntaxTree, body: NodeId) -> Option<&'static str> {
    let mut pass_count = 0usize;
    let mut comment_count = 0usize;

    for child in tree.named_children(body) {
        match tree.kind(child) {
            NodeKind::Comment => comment_count += 1,
            NodeKind::Pass => pass_count += 1,
            _ => return None,
        }
    }

    if pass_count > 0 {
        Some("only pass")
    } else if comment_count > 0 {
        Some("only comments")
    } else {
        Some("empty")
    }
}

impl Rule for EmptyCatch {
    fn name(&self) -> RuleName {
        RuleName::EmptyCatch
    }

    fn languages(&self) -> &'static [Language] {
        Language::ALL
    }

    fn check(&self, ctx: &RuleContext) -> anyhow::Result<Vec<Finding>> {
        let tree = ctx.tree;
        let handler_word = match ctx.language {
            Language::Python => "except",
            _ => "catch",
        };
        let mut findings = Vec::new();

        for catch in tree.find_nodes(tree.root(), &[NodeKind::Catch]) {
            let Some(body) = handler_body(tree, catch) else {
                continue;
            };
            let Some(summary) = summarize(tree, body) else {
                continue;
            };

            let mut facts = Facts::new();
            facts.set_str("summary", summary);
            facts.set_str("language", ctx.language.as_str());
            facts.set_int("handler_line", tree.line_of(catch) as i64);

            let message = match summary {
                "empty" => format!("{} block is empty; the error disappears", handler_word),
                "only pass" => format!(
                    "{} block contains only a no-op placeholder; the error disappears",
                    handler_word
                ),
                _ => format!(
                    "{} block contains only comments; the error disappears",
                    handler_word
                ),
            };

            findings.push(Finding {
                rule: RuleName::EmptyCatch,
                line: tree.line_of(catch),
                column: tree.column_of(catch),
                severity: Severity::Warning,
                certainty: Certainty::Definite,
                confidence: 0.9,
                scope: FindingScope::Local,
                message,
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
        EmptyCatch.check(&ctx).unwrap()
    }

    #[test]
    fn empty_javascript_catch() {
        let source = "try {\n    f();\n} catch (e) {}\n";
        let findings = run(source, Language::Javascript);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].facts.str_value("summary"), Some("empty"));
    }

    #[test]
    fn comment_only_catch() {
        let source = "try {\n    f();\n} catch (e) {\n    // ignore\n}\n";
        let findings = run(source, Language::Javascript);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].facts.str_value("summary"), Some("only comments"));
    }

    #[test]
    fn pass_only_except() {
        let source = "\
try:
    risky()
except Exception:
    pass
";
        let findings = run(source, Language::Python);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].facts.str_value("summary"), Some("only pass"));
        assert!(findings[0].message.contains("except"));
    }

    #[test]
    fn pass_with_comment_still_counts_as_pass() {
        let source = "\
try:
    risky()
except Exception:
    # silently ignored
    pass
";
        let findings = run(source, Language::Python);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].facts.str_value("summary"), Some("only pass"));
    }

    #[test]
    fn real_statement_suppresses() {
        let source = "\
try:
    risky()
except Exception as e:
    log.error(e)
";
        assert!(run(source, Language::Python).is_empty());
    }
}
