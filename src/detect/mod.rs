//! Detection rules for common beginner mistakes.
//!
//! Every rule is stateless and language-gated: it consumes the shared
//! immutable syntax tree plus source text and produces findings in
//! traversal order. Rules never mutate process-wide state and may run
//! concurrently, both across analyses and within one.

mod array_mutation;
mod console_log;
mod double_equals;
mod empty_catch;
mod error_handling;
mod missing_await;
mod nullable_access;
mod off_by_one;
mod shadowing;
mod types;
mod var_usage;

use lazy_static::lazy_static;

use crate::parser::Language;
use crate::tree::{NodeId, NodeKind, SyntaxTree};

pub use array_mutation::ArrayMutation;
pub use console_log::ConsoleLogLeft;
pub use double_equals::DoubleEquals;
pub use empty_catch::EmptyCatch;
pub use error_handling::NoErrorHandling;
pub use missing_await::MissingAwait;
pub use nullable_access::NullableAccess;
pub use off_by_one::OffByOneLoop;
pub use shadowing::VariableShadowing;
pub use types::{Certainty, Facts, FactValue, Finding, FindingScope, RuleName, Severity};
pub use var_usage::VarUsage;

/// Everything a rule may look at for one analysis.
pub struct RuleContext<'a> {
    pub source: &'a str,
    pub language: Language,
    pub tree: &'a SyntaxTree,
}

/// One stateless, language-gated detection rule.
pub trait Rule: Send + Sync {
    fn name(&self) -> RuleName;

    /// The language tags this rule applies to.
    fn languages(&self) -> &'static [Language];

    /// Run the rule. Findings come back in tree-traversal order; the
    /// orchestrator re-sorts globally. An `Err` is logged and the rule is
    /// skipped without affecting any other rule.
    fn check(&self, ctx: &RuleContext) -> anyhow::Result<Vec<Finding>>;
}

lazy_static! {
    static ref RULES: Vec<Box<dyn Rule>> = vec![
        Box::new(MissingAwait),
        Box::new(DoubleEquals),
        Box::new(NullableAccess),
        Box::new(VariableShadowing),
        Box::new(OffByOneLoop),
        Box::new(NoErrorHandling),
        Box::new(ArrayMutation),
        Box::new(VarUsage),
        Box::new(ConsoleLogLeft),
        Box::new(EmptyCatch),
    ];
}

/// The full rule catalogue, in a fixed registration order.
pub fn all_rules() -> &'static [Box<dyn Rule>] {
    &RULES
}

// ---------------------------------------------------------------------------
// Shared node helpers used by several rules.
// ---------------------------------------------------------------------------

/// The callee node of a call expression.
pub(crate) fn callee(tree: &SyntaxTree, call: NodeId) -> Option<NodeId> {
    tree.field(call, "function")
}

/// The property/attribute identifier of a member expression.
pub(crate) fn member_property(tree: &SyntaxTree, member: NodeId) -> Option<NodeId> {
    tree.field(member, "property")
        .or_else(|| tree.field(member, "attribute"))
}

/// The object a member expression is accessed on.
pub(crate) fn member_object(tree: &SyntaxTree, member: NodeId) -> Option<NodeId> {
    tree.field(member, "object")
}

/// The simple name a call resolves to: `f()` gives `f`, `obj.method()`
/// gives `method`.
pub(crate) fn callee_name<'s>(tree: &SyntaxTree, call: NodeId, source: &'s str) -> Option<&'s str> {
    let callee = callee(tree, call)?;
    match tree.kind(callee) {
        NodeKind::Identifier => Some(tree.text_of(callee, source)),
        NodeKind::Member => {
            let prop = member_property(tree, callee)?;
            Some(tree.text_of(prop, source))
        }
        _ => None,
    }
}

/// Whether `text` contains `name` as a whole identifier (not a substring of
/// a longer identifier).
pub(crate) fn mentions_identifier(text: &str, name: &str) -> bool {
    let mut start = 0;
    while let Some(pos) = text[start..].find(name) {
        let at = start + pos;
        let before_ok = at == 0
            || !text[..at]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric() || c == '_');
        let after = at + name.len();
        let after_ok = after >= text.len()
            || !text[after..]
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric() || c == '_');
        if before_ok && after_ok {
            return true;
        }
        start = at + name.len();
    }
    false
}

/// Whether any enclosing conditional's test mentions the identifier.
pub(crate) fn guarded_by_conditional(
    tree: &SyntaxTree,
    source: &str,
    id: NodeId,
    name: &str,
) -> bool {
    let mut current = tree.parent(id);
    while let Some(node) = current {
        if matches!(
            tree.kind(node),
            NodeKind::If | NodeKind::While | NodeKind::Ternary
        ) {
            if let Some(cond) = tree.field(node, "condition") {
                if mentions_identifier(tree.text_of(cond, source), name) {
                    return true;
                }
            }
        }
        current = tree.parent(node);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    #[test]
    fn registry_covers_the_whole_catalogue() {
        let names: Vec<_> = all_rules().iter().map(|r| r.name()).collect();
        for rule in RuleName::ALL {
            assert!(names.contains(rule), "missing rule {}", rule);
        }
        assert_eq!(names.len(), RuleName::ALL.len());
    }

    #[test]
    fn every_rule_supports_at_least_one_language() {
        for rule in all_rules() {
            assert!(!rule.languages().is_empty(), "{} gates nothing", rule.name());
        }
    }

    #[test]
    fn callee_name_handles_plain_and_member_calls() {
        let source = "f();\nobj.method();\n";
        let tree = parser::parse(source, Language::Javascript).unwrap();
        let calls = tree.find_nodes(tree.root(), &[NodeKind::Call]);
        assert_eq!(callee_name(&tree, calls[0], source), Some("f"));
        assert_eq!(callee_name(&tree, calls[1], source), Some("method"));
    }

    #[test]
    fn mentions_identifier_respects_boundaries() {
        assert!(mentions_identifier("if (user) {", "user"));
        assert!(mentions_identifier("user.name", "user"));
        assert!(!mentions_identifier("username", "user"));
        assert!(!mentions_identifier("a_user_b", "user"));
    }
}
