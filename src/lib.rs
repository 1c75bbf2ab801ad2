//! Slipcheck - beginner-mistake detection engine.
//!
//! Slipcheck parses JavaScript, TypeScript or Python source and runs a
//! catalogue of detectors for the mistakes beginners actually make:
//! missing awaits, loose equality, null dereferences, shadowed variables,
//! off-by-one loops, swallowed errors and friends. Every finding carries
//! its location, severity, certainty, the facts it was derived from, and
//! rendered explanation/fix text.
//!
//! # Architecture
//!
//! The engine uses tree-sitter for parsing; everything downstream works
//! on an owned arena copy of the tree:
//!
//! - `parser`: grammar registry and the tree-sitter boundary
//! - `tree` / `query`: the owned syntax-tree arena and its query layer
//! - `scope`: lexical scope model used by the shadowing detector
//! - `detect`: the detection rules and the finding taxonomy
//! - `explain`: fact-driven explanation rendering
//! - `engine`: orchestration (rule selection, ordering, scoring)
//! - `report`: output formatting (pretty, JSON)
//!
//! # Adding a New Rule
//!
//! Implement the `Rule` trait in a new file under `src/detect/` and
//! register it in `detect/mod.rs`; see any existing rule for the shape.

pub mod cli;
pub mod detect;
pub mod engine;
pub mod explain;
pub mod parser;
pub mod query;
pub mod report;
pub mod scope;
pub mod tree;

pub use detect::{all_rules, Certainty, Facts, Finding, FindingScope, Rule, RuleName, Severity};
pub use engine::{analyze, analyze_filtered, Analysis, EngineError, ReportedFinding};
pub use explain::Explanation;
pub use parser::{init as init_parsers, Language, ParseError};
pub use tree::{NodeId, NodeKind, SyntaxTree};

/// Initialize all subsystems.
///
/// Call this once at startup. Optional; the grammar registry also
/// initializes lazily on first parse.
pub fn init() {
    init_parsers();
}
