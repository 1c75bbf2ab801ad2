//! Off-by-one loop bounds.
//!
//! Two recognized shapes: a loop condition comparing with an inclusive
//! operator (`<=`/`>=`) against a length-like expression, and python's
//! `range(len(xs) + 1)`. Constant-only bounds are never flagged.

use crate::parser::Language;
use crate::tree::{NodeId, NodeKind, SyntaxTree};

use super::{
    callee, Certainty, Facts, Finding, FindingScope, Rule, RuleContext, RuleName, Severity,
};

pub struct OffByOneLoop;

/// The operator token of a binary node (`operator` field in JS grammars,
/// `operators` in python's chained comparisons).
fn binary_operator<'s>(tree: &SyntaxTree, node: NodeId, source: &'s str) -> Option<&'s str> {
    if let Some(op) = tree.field(node, "operator") {
        return Some(tree.text_of(op, source));
    }
    tree.field_all(node, "operators")
        .first()
        .map(|&op| tree.text_of(op, source))
}

fn binary_sides(tree: &SyntaxTree, node: NodeId) -> Option<(NodeId, NodeId)> {
    if let (Some(left), Some(right)) = (tree.field(node, "left"), tree.field(node, "right")) {
        return Some((left, right));
    }
    let operands: Vec<NodeId> = tree.named_children(node).collect();
    if operands.len() >= 2 {
        Some((operands[0], operands[1]))
    } else {
        None
    }
}

/// Whether an expression reads like a collection length.
fn is_length_like(text: &str) -> bool {
    let text = text.trim();
    text.ends_with(".length")
        || text.ends_with(".length()")
        || text.ends_with(".size()")
        || text.ends_with(".count()")
        || (text.starts_with("len(") && text.ends_with(')'))
}

/// `range(len(xs) + 1)` and friends: a range argument adding a constant
/// offset to a length call. Returns the offset and the length text.
fn range_overshoot<'s>(
    tree: &SyntaxTree,
    iterable: NodeId,
    source: &'s str,
) -> Option<(i64, &'s str)> {
    if tree.kind(iterable) != NodeKind::Call {
        return None;
    }
    let callee = callee(tree, iterable)?;
    if tree.text_of(callee, source) != "range" {
        return None;
    }
    let args = tree
        .named_children(iterable)
        .find(|&c| tree.kind(c) == NodeKind::Arguments)?;

    for arg in tree.named_children(args).collect::<Vec<_>>() {
        if tree.kind(arg) != NodeKind::Binary {
            continue;
        }
        if binary_operator(tree, arg, source) != Some("+") {
            continue;
        }
        let (left, right) = binary_sides(tree, arg)?;
        let (length_side, const_side) = if is_length_like(tree.text_of(left, source)) {
            (left, right)
        } else if is_length_like(tree.text_of(right, source)) {
            (right, left)
        } else {
            continue;
        };
        if tree.kind(const_side) == NodeKind::NumberLiteral {
            if let Ok(offset) = tree.text_of(const_side, source).parse::<i64>() {
                return Some((offset, tree.text_of(length_side, source)));
            }
        }
    }
    None
}

impl Rule for OffByOneLoop {
    fn name(&self) -> RuleName {
        RuleName::OffByOneLoop
    }

    fn languages(&self) -> &'static [Language] {
        Language::ALL
    }

    fn check(&self, ctx: &RuleContext) -> anyhow::Result<Vec<Finding>> {
        let tree = ctx.tree;
        let mut findings = Vec::new();

        // Inclusive comparison against a length-like bound.
        for lop in tree.find_nodes(tree.root(), &[NodeKind::For, NodeKind::While]) {
            let Some(cond) = tree.field(lop, "condition") else {
                continue;
            };
            let cond = if tree.kind(cond) == NodeKind::Binary {
                cond
            } else {
                // python wraps while conditions; JS wraps them in parens
                match tree
                    .named_children(cond)
                    .find(|&c| tree.kind(c) == NodeKind::Binary)
                {
                    Some(inner) => inner,
                    None => continue,
                }
            };
            let Some(operator) = binary_operator(tree, cond, ctx.source) else {
                continue;
            };
            if operator != "<=" && operator != ">=" {
                continue;
            }
            let Some((left, right)) = binary_sides(tree, cond) else {
                continue;
            };
            let bound = [left, right]
                .into_iter()
                .map(|side| tree.text_of(side, ctx.source))
                .find(|text| is_length_like(text));
            let Some(bound) = bound else {
                continue;
            };

            let mut facts = Facts::new();
            facts.set_str("condition_operator", operator);
            facts.set_str("bound", bound);
            facts.set_str("language", ctx.language.as_str());

            findings.push(Finding {
                rule: RuleName::OffByOneLoop,
                line: tree.line_of(cond),
                column: tree.column_of(cond),
                severity: Severity::Warning,
                certainty: Certainty::Possible,
                confidence: 0.65,
                scope: FindingScope::Local,
                message: format!(
                    "loop bound '{}' compares with '{}'; the last index is one past the end",
                    bound, operator
                ),
                facts,
            });
        }

        // python: range(len(xs) + 1)
        if ctx.language == Language::Python {
            for lop in tree.find_nodes(tree.root(), &[NodeKind::ForIn]) {
                let Some(iterable) = tree.field(lop, "right") else {
                    continue;
                };
                let Some((offset, bound)) = range_overshoot(tree, iterable, ctx.source) else {
                    continue;
                };

                let mut facts = Facts::new();
                facts.set_int("range_offset", offset);
                facts.set_str("bound", bound);
                facts.set_str("language", ctx.language.as_str());

                findings.push(Finding {
                    rule: RuleName::OffByOneLoop,
                    line: tree.line_of(iterable),
                    column: tree.column_of(iterable),
                    severity: Severity::Warning,
                    certainty: Certainty::Possible,
                    confidence: 0.7,
                    scope: FindingScope::Local,
                    message: format!(
                        "range over '{}' plus {} runs one past the last valid index",
                        bound, offset
                    ),
                    facts,
                });
            }
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
        OffByOneLoop.check(&ctx).unwrap()
    }

    #[test]
    fn inclusive_length_bound_flagged_once() {
        let source = "for (let i = 0; i <= items.length; i++) { use(items[i]); }\n";
        let findings = run(source, Language::Javascript);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].facts.str_value("condition_operator"), Some("<="));
        assert_eq!(findings[0].facts.str_value("bound"), Some("items.length"));
    }

    #[test]
    fn exclusive_bound_is_fine() {
        let source = "for (let i = 0; i < items.length; i++) { use(items[i]); }\n";
        assert!(run(source, Language::Javascript).is_empty());
    }

    #[test]
    fn constant_bound_never_flagged() {
        let source = "for (let i = 0; i <= 10; i++) { use(i); }\n";
        assert!(run(source, Language::Javascript).is_empty());
    }

    #[test]
    fn python_range_len_plus_one() {
        let source = "\
for i in range(len(items) + 1):
    print(items[i])
";
        let findings = run(source, Language::Python);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].facts.int_value("range_offset"), Some(1));
        assert_eq!(findings[0].facts.str_value("bound"), Some("len(items)"));
    }

    #[test]
    fn python_plain_range_len_is_fine() {
        let source = "\
for i in range(len(items)):
    print(items[i])
";
        assert!(run(source, Language::Python).is_empty());
    }

    #[test]
    fn python_while_inclusive_len() {
        let source = "\
while i <= len(items):
    i += 1
";
        let findings = run(source, Language::Python);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].facts.str_value("condition_operator"), Some("<="));
    }
}
