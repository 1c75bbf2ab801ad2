//! Analysis orchestrator.
//!
//! `analyze` is the crate's main entry point: parse, select the rules that
//! apply to the language, run them with per-rule isolation, then order,
//! number and explain the findings. The engine keeps no state between
//! calls; identical input produces byte-identical output.

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::detect::{all_rules, Finding, Rule, RuleContext, RuleName};
use crate::explain;
use crate::parser::{self, Language, ParseError};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A finding plus its rendered explanation, as reported to the user.
/// Ids are 1-based and sequential after the (line, column) sort.
#[derive(Debug, Clone, Serialize)]
pub struct ReportedFinding {
    pub id: usize,
    #[serde(flatten)]
    pub finding: Finding,
    pub explanation: String,
    pub fix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

/// The complete result of analyzing one piece of source text.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub language: Language,
    pub findings: Vec<ReportedFinding>,
    pub score: u32,
}

const MAX_SCORE: u32 = 10;

/// Analyze source text with the full rule catalogue.
pub fn analyze(source: &str, language: Language) -> Result<Analysis, EngineError> {
    analyze_filtered(source, language, &[])
}

/// Analyze source text with some rules disabled.
pub fn analyze_filtered(
    source: &str,
    language: Language,
    disabled: &[RuleName],
) -> Result<Analysis, EngineError> {
    let tree = parser::parse(source, language)?;
    let ctx = RuleContext {
        source,
        language,
        tree: &tree,
    };

    let selected: Vec<&dyn Rule> = all_rules()
        .iter()
        .map(|r| r.as_ref())
        .filter(|r| r.languages().contains(&language))
        .filter(|r| !disabled.contains(&r.name()))
        .collect();

    let mut findings = run_rules(&selected, &ctx);
    findings.sort_by(|a, b| (a.line, a.column).cmp(&(b.line, b.column)));

    let score = MAX_SCORE.saturating_sub(findings.len() as u32);
    let findings = findings
        .into_iter()
        .enumerate()
        .map(|(index, finding)| {
            let rendered = explain::render(finding.rule, &finding.facts);
            ReportedFinding {
                id: index + 1,
                finding,
                explanation: rendered.explanation,
                fix: rendered.fix,
                example: rendered.example,
            }
        })
        .collect();

    Ok(Analysis {
        language,
        findings,
        score,
    })
}

/// Run the selected rules in parallel. A rule that returns an error is
/// logged and contributes nothing; the others are unaffected. Collection
/// preserves registration order, so the result is deterministic.
fn run_rules(rules: &[&dyn Rule], ctx: &RuleContext) -> Vec<Finding> {
    let per_rule: Vec<Vec<Finding>> = rules
        .par_iter()
        .map(|rule| match rule.check(ctx) {
            Ok(findings) => findings,
            Err(err) => {
                log::warn!("rule {} failed, skipping it: {:#}", rule.name(), err);
                Vec::new()
            }
        })
        .collect();
    per_rule.into_iter().flatten().collect()
}
