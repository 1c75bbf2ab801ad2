//! Parser adapter over tree-sitter.
//!
//! This is the engine's only boundary with the grammar crates: it turns
//! `(source text, language tag)` into an owned [`SyntaxTree`] arena. The
//! grammar registry is initialized once, process-wide, and read-only after
//! that; concurrent analyses share it freely.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::tree::{NodeKind, SyntaxTree};

pub mod languages;

/// The languages the engine can analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Javascript,
    Typescript,
    Python,
}

impl Language {
    pub const ALL: &'static [Language] =
        &[Language::Javascript, Language::Typescript, Language::Python];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Javascript => "javascript",
            Language::Typescript => "typescript",
            Language::Python => "python",
        }
    }

    /// Infer the language from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::Javascript),
            "ts" | "tsx" | "mts" | "cts" => Some(Language::Typescript),
            "py" => Some(Language::Python),
            _ => None,
        }
    }

    /// The raw-kind classifier for this language's grammar.
    pub fn classifier(&self) -> fn(&str) -> NodeKind {
        match self {
            Language::Javascript => languages::javascript::classify,
            Language::Typescript => languages::typescript::classify,
            Language::Python => languages::python::classify,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "javascript" | "js" => Ok(Language::Javascript),
            "typescript" | "ts" => Ok(Language::Typescript),
            "python" | "py" => Ok(Language::Python),
            _ => Err(format!("unknown language: {}", s)),
        }
    }
}

/// Parse failure. Fatal to the whole analysis; the engine returns no
/// partial findings.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("could not analyze {language} source: parser produced no tree")]
    NoTree { language: Language },
    #[error("could not analyze {language} source: syntax error near line {line}")]
    SyntaxError { language: Language, line: usize },
}

/// Grammar registry, built once on first use and read-only thereafter.
static GRAMMARS: Lazy<HashMap<Language, tree_sitter::Language>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert(
        Language::Javascript,
        tree_sitter::Language::from(tree_sitter_javascript::LANGUAGE),
    );
    map.insert(
        Language::Typescript,
        tree_sitter::Language::from(tree_sitter_typescript::LANGUAGE_TYPESCRIPT),
    );
    map.insert(
        Language::Python,
        tree_sitter::Language::from(tree_sitter_python::LANGUAGE),
    );
    map
});

/// Force grammar registry construction. Call once at startup; optional,
/// since the registry also initializes lazily on first parse.
pub fn init() {
    Lazy::force(&GRAMMARS);
}

/// Parse source text into an owned syntax tree arena.
///
/// A tree containing syntax errors is treated as a parse failure: the
/// engine reports "could not analyze" instead of findings over a
/// half-recovered tree.
pub fn parse(source: &str, language: Language) -> Result<SyntaxTree, ParseError> {
    let grammar = &GRAMMARS[&language];
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(grammar)
        .map_err(|_| ParseError::NoTree { language })?;

    let tree = parser
        .parse(source, None)
        .ok_or(ParseError::NoTree { language })?;

    let root = tree.root_node();
    if root.has_error() {
        let line = first_error_line(root).unwrap_or(1);
        return Err(ParseError::SyntaxError { language, line });
    }

    Ok(SyntaxTree::from_ts_tree(&tree, language))
}

fn first_error_line(node: tree_sitter::Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row + 1);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            if let Some(line) = first_error_line(child) {
                return Some(line);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_all_languages() {
        assert!(parse("let x = 1;\n", Language::Javascript).is_ok());
        assert!(parse("const x: number = 1;\n", Language::Typescript).is_ok());
        assert!(parse("x = 1\n", Language::Python).is_ok());
    }

    #[test]
    fn syntax_error_is_fatal() {
        let err = parse("def broken(:\n", Language::Python).unwrap_err();
        assert!(matches!(err, ParseError::SyntaxError { .. }));
        assert!(err.to_string().contains("could not analyze"));
    }

    #[test]
    fn language_from_extension() {
        assert_eq!(Language::from_extension("js"), Some(Language::Javascript));
        assert_eq!(Language::from_extension("tsx"), Some(Language::Typescript));
        assert_eq!(Language::from_extension("py"), Some(Language::Python));
        assert_eq!(Language::from_extension("rb"), None);
    }

    #[test]
    fn language_parse_aliases() {
        assert_eq!("js".parse::<Language>().unwrap(), Language::Javascript);
        assert_eq!("PYTHON".parse::<Language>().unwrap(), Language::Python);
        assert!("ruby".parse::<Language>().is_err());
    }
}
