//! Python kind classification.

use crate::tree::NodeKind;

pub fn classify(raw: &str) -> NodeKind {
    match raw {
        "module" => NodeKind::Program,
        "function_definition" | "lambda" => NodeKind::Function,
        "class_definition" => NodeKind::Class,
        "block" => NodeKind::Block,
        "call" => NodeKind::Call,
        "attribute" => NodeKind::Member,
        "subscript" => NodeKind::Subscript,
        "await" => NodeKind::Await,
        "binary_operator" | "comparison_operator" | "boolean_operator" => NodeKind::Binary,
        "conditional_expression" => NodeKind::Ternary,
        "assignment" | "augmented_assignment" => NodeKind::Assignment,
        "if_statement" => NodeKind::If,
        // Python's only for loop binds a target, like JS for..of.
        "for_statement" => NodeKind::ForIn,
        "while_statement" => NodeKind::While,
        "try_statement" => NodeKind::Try,
        "except_clause" => NodeKind::Catch,
        "finally_clause" => NodeKind::Finally,
        "return_statement" => NodeKind::Return,
        "expression_statement" => NodeKind::ExpressionStatement,
        "parameters" | "lambda_parameters" => NodeKind::Parameters,
        "argument_list" => NodeKind::Arguments,
        "identifier" => NodeKind::Identifier,
        "string" => NodeKind::StringLiteral,
        "integer" | "float" => NodeKind::NumberLiteral,
        "none" => NodeKind::NullLiteral,
        "comment" => NodeKind::Comment,
        "pass_statement" => NodeKind::Pass,
        _ => NodeKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_core_kinds() {
        assert_eq!(classify("attribute"), NodeKind::Member);
        assert_eq!(classify("except_clause"), NodeKind::Catch);
        assert_eq!(classify("pass_statement"), NodeKind::Pass);
        assert_eq!(classify("none"), NodeKind::NullLiteral);
        assert_eq!(classify("decorator"), NodeKind::Other);
    }
}
