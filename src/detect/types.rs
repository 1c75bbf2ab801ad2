//! Core types for detection results.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Severity levels for findings. Communicates user-facing priority,
/// independent of how mechanically sound the detection is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// How mechanically sound a detection is, independent of severity.
///
/// By convention confidence tracks certainty (definite >= 0.85, possible
/// 0.55-0.75, heuristic <= 0.5) but every rule sets it explicitly per
/// detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Certainty {
    /// No heuristic judgment involved, e.g. provably-null then accessed.
    Definite,
    /// The pattern strongly suggests the issue but alternate readings exist.
    Possible,
    /// A stylistic judgment call.
    Heuristic,
}

impl std::fmt::Display for Certainty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Certainty::Definite => write!(f, "definite"),
            Certainty::Possible => write!(f, "possible"),
            Certainty::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// How far the reported mistake reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingScope {
    Local,
    Function,
    Module,
}

/// Rule names for the mistake catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RuleName {
    #[serde(rename = "missing_await")]
    MissingAwait,
    #[serde(rename = "double_equals")]
    DoubleEquals,
    #[serde(rename = "nullable_access")]
    NullableAccess,
    #[serde(rename = "variable_shadowing")]
    VariableShadowing,
    #[serde(rename = "off_by_one_loop")]
    OffByOneLoop,
    #[serde(rename = "no_error_handling")]
    NoErrorHandling,
    #[serde(rename = "array_mutation")]
    ArrayMutation,
    #[serde(rename = "var_usage")]
    VarUsage,
    #[serde(rename = "console_log_left")]
    ConsoleLogLeft,
    #[serde(rename = "empty_catch")]
    EmptyCatch,
}

impl RuleName {
    pub const ALL: &'static [RuleName] = &[
        RuleName::MissingAwait,
        RuleName::DoubleEquals,
        RuleName::NullableAccess,
        RuleName::VariableShadowing,
        RuleName::OffByOneLoop,
        RuleName::NoErrorHandling,
        RuleName::ArrayMutation,
        RuleName::VarUsage,
        RuleName::ConsoleLogLeft,
        RuleName::EmptyCatch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleName::MissingAwait => "missing_await",
            RuleName::DoubleEquals => "double_equals",
            RuleName::NullableAccess => "nullable_access",
            RuleName::VariableShadowing => "variable_shadowing",
            RuleName::OffByOneLoop => "off_by_one_loop",
            RuleName::NoErrorHandling => "no_error_handling",
            RuleName::ArrayMutation => "array_mutation",
            RuleName::VarUsage => "var_usage",
            RuleName::ConsoleLogLeft => "console_log_left",
            RuleName::EmptyCatch => "empty_catch",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        RuleName::ALL.iter().copied().find(|r| r.as_str() == s)
    }
}

impl std::fmt::Display for RuleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A scalar or array fact value attached to a finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FactValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<String>),
}

impl FactValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FactValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FactValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FactValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Insertion-ordered map of fact name to value.
///
/// Findings carry their extracted facts here; the explanation renderer
/// derives its text from these values alone, so ordering is preserved to
/// keep serialized output byte-stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Facts(Vec<(String, FactValue)>);

impl Facts {
    pub fn new() -> Self {
        Facts(Vec::new())
    }

    pub fn set(&mut self, name: &str, value: FactValue) {
        if let Some(entry) = self.0.iter_mut().find(|(n, _)| n == name) {
            entry.1 = value;
        } else {
            self.0.push((name.to_string(), value));
        }
    }

    pub fn set_str(&mut self, name: &str, value: impl Into<String>) {
        self.set(name, FactValue::Str(value.into()));
    }

    pub fn set_int(&mut self, name: &str, value: i64) {
        self.set(name, FactValue::Int(value));
    }

    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.set(name, FactValue::Bool(value));
    }

    pub fn set_list(&mut self, name: &str, value: Vec<String>) {
        self.set(name, FactValue::List(value));
    }

    pub fn get(&self, name: &str) -> Option<&FactValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn str_value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FactValue::as_str)
    }

    pub fn int_value(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FactValue::as_int)
    }

    pub fn bool_value(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(FactValue::as_bool)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FactValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl Serialize for Facts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A single detected mistake.
///
/// Created by exactly one detector invocation; never merged across
/// detectors. `line` and `column` are 1-indexed positions inside the
/// analyzed text.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub rule: RuleName,
    pub line: usize,
    pub column: usize,
    pub severity: Severity,
    pub certainty: Certainty,
    pub confidence: f64,
    pub scope: FindingScope,
    pub message: String,
    pub facts: Facts,
}
