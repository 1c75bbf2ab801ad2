//! TypeScript kind classification.
//!
//! The TypeScript grammar is a superset of the JavaScript grammar; every
//! kind a rule consumes is shared, and TypeScript-only kinds (type
//! annotations, interfaces, as-expressions) carry no detection semantics,
//! so they classify as `Other` through the shared table.

use crate::tree::NodeKind;

pub fn classify(raw: &str) -> NodeKind {
    super::javascript::classify(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typescript_only_kinds_are_other() {
        assert_eq!(classify("type_annotation"), NodeKind::Other);
        assert_eq!(classify("interface_declaration"), NodeKind::Other);
        assert_eq!(classify("call_expression"), NodeKind::Call);
    }
}
