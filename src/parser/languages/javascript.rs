//! JavaScript kind classification.

use crate::tree::NodeKind;

pub fn classify(raw: &str) -> NodeKind {
    match raw {
        "program" => NodeKind::Program,
        "function_declaration"
        | "function_expression"
        | "function"
        | "arrow_function"
        | "method_definition"
        | "generator_function"
        | "generator_function_declaration" => NodeKind::Function,
        "class_declaration" | "class" => NodeKind::Class,
        "statement_block" | "class_body" => NodeKind::Block,
        "call_expression" => NodeKind::Call,
        "member_expression" => NodeKind::Member,
        "subscript_expression" => NodeKind::Subscript,
        "await_expression" => NodeKind::Await,
        "binary_expression" => NodeKind::Binary,
        "ternary_expression" => NodeKind::Ternary,
        "assignment_expression" | "augmented_assignment_expression" => NodeKind::Assignment,
        "variable_declaration" => NodeKind::VarDeclaration,
        "lexical_declaration" => NodeKind::LexicalDeclaration,
        "variable_declarator" => NodeKind::Declarator,
        "if_statement" => NodeKind::If,
        "for_statement" => NodeKind::For,
        "for_in_statement" => NodeKind::ForIn,
        "while_statement" | "do_statement" => NodeKind::While,
        "try_statement" => NodeKind::Try,
        "catch_clause" => NodeKind::Catch,
        "finally_clause" => NodeKind::Finally,
        "return_statement" => NodeKind::Return,
        "expression_statement" => NodeKind::ExpressionStatement,
        "formal_parameters" => NodeKind::Parameters,
        "arguments" => NodeKind::Arguments,
        "identifier" | "shorthand_property_identifier" | "shorthand_property_identifier_pattern" => {
            NodeKind::Identifier
        }
        "property_identifier" => NodeKind::PropertyIdentifier,
        "string" | "template_string" => NodeKind::StringLiteral,
        "number" => NodeKind::NumberLiteral,
        "null" | "undefined" => NodeKind::NullLiteral,
        "comment" => NodeKind::Comment,
        "empty_statement" => NodeKind::Pass,
        _ => NodeKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_core_kinds() {
        assert_eq!(classify("call_expression"), NodeKind::Call);
        assert_eq!(classify("variable_declaration"), NodeKind::VarDeclaration);
        assert_eq!(classify("lexical_declaration"), NodeKind::LexicalDeclaration);
        assert_eq!(classify("undefined"), NodeKind::NullLiteral);
        assert_eq!(classify("jsx_element"), NodeKind::Other);
    }
}
