//! Output formatting for analysis results.
//!
//! Two formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};

use crate::detect::Severity;
use crate::engine::{Analysis, ReportedFinding};

// =============================================================================
// JSON Format
// =============================================================================

/// Top-level JSON report structure.
#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    pub language: String,
    pub score: u32,
    pub findings: Vec<JsonFinding>,
}

/// One finding as serialized into the JSON report.
#[derive(Serialize, Deserialize)]
pub struct JsonFinding {
    pub id: usize,
    pub rule: String,
    pub line: usize,
    pub column: usize,
    pub severity: String,
    pub certainty: String,
    pub confidence: f64,
    pub scope: String,
    pub message: String,
    pub facts: serde_json::Value,
    pub explanation: String,
    pub fix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

pub fn to_json_report(path: &str, analysis: &Analysis) -> anyhow::Result<JsonReport> {
    let findings = analysis
        .findings
        .iter()
        .map(finding_to_json)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        language: analysis.language.to_string(),
        score: analysis.score,
        findings,
    })
}

fn finding_to_json(f: &ReportedFinding) -> anyhow::Result<JsonFinding> {
    Ok(JsonFinding {
        id: f.id,
        rule: f.finding.rule.to_string(),
        line: f.finding.line,
        column: f.finding.column,
        severity: f.finding.severity.to_string(),
        certainty: f.finding.certainty.to_string(),
        confidence: f.finding.confidence,
        scope: serde_json::to_value(f.finding.scope)?
            .as_str()
            .unwrap_or_default()
            .to_string(),
        message: f.finding.message.clone(),
        facts: serde_json::to_value(&f.finding.facts)?,
        explanation: f.explanation.clone(),
        fix: f.fix.clone(),
        example: f.example.clone(),
    })
}

/// Write results in JSON format.
pub fn write_json(path: &str, analysis: &Analysis) -> anyhow::Result<()> {
    let report = to_json_report(path, analysis)?;
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(path: &str, analysis: &Analysis) {
    // Header
    println!();
    print!("  ");
    print!("{}", "slipcheck".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Analyzing: ".dimmed());
    println!("{}", path);
    print!("  {}", "Language:  ".dimmed());
    println!("{}", analysis.language);
    println!();

    if analysis.findings.is_empty() {
        println!("  {}", "✓ No mistakes found".green());
    } else {
        write_findings(&analysis.findings);
    }
    println!();

    write_score_line(analysis);
    println!();
}

fn write_findings(findings: &[ReportedFinding]) {
    println!("  {} ({}):", "Findings".bold(), findings.len());
    println!();

    for f in findings {
        write_severity_tag(&f.finding.severity);
        print!("{:<20}", f.finding.rule.to_string().dimmed());
        print!(
            "{}",
            format!("{}:{}", f.finding.line, f.finding.column).blue()
        );
        print!(
            "  {}",
            format!("({}, {:.0}%)", f.finding.certainty, f.finding.confidence * 100.0).dimmed()
        );
        println!();

        println!("            {}", f.finding.message);
        println!("            {}", f.explanation.dimmed());
        println!("            {} {}", "fix:".bold(), f.fix);
        println!();
    }
}

fn write_severity_tag(severity: &Severity) {
    match severity {
        Severity::Error => print!("    {} ", "ERROR".red()),
        Severity::Warning => print!("    {} ", "WARN ".yellow()),
        Severity::Info => print!("    {} ", "INFO ".blue()),
    }
}

fn write_score_line(analysis: &Analysis) {
    print!("  Score: ");
    write_colored_score(analysis.score);
    print!("{}", "/10  ".dimmed());

    if analysis.score == 10 {
        print!("{}", "CLEAN".green());
    } else {
        let plural = if analysis.findings.len() != 1 { "s" } else { "" };
        print!(
            "{}",
            format!("{} finding{}", analysis.findings.len(), plural).yellow()
        );
    }
    println!();
}

fn write_colored_score(score: u32) {
    match score {
        10 => print!("{}", score.to_string().green().bold()),
        7..=9 => print!("{}", score.to_string().green()),
        4..=6 => print!("{}", score.to_string().yellow()),
        _ => print!("{}", score.to_string().red()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::analyze;
    use crate::parser::Language;

    #[test]
    fn json_report_round_trips() {
        let source = "var a = 1;\nif (a == 1) { a.push(2); }\n";
        let analysis = analyze(source, Language::Javascript).unwrap();
        let report = to_json_report("snippet.js", &analysis).unwrap();

        let json = serde_json::to_string(&report).unwrap();
        let back: JsonReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.path, "snippet.js");
        assert_eq!(back.language, "javascript");
        assert_eq!(back.score, analysis.score);
        assert_eq!(back.findings.len(), analysis.findings.len());
    }

    #[test]
    fn json_findings_carry_facts_and_fix() {
        let source = "if (a == 1) { b(); }\n";
        let analysis = analyze(source, Language::Javascript).unwrap();
        let report = to_json_report("snippet.js", &analysis).unwrap();

        let finding = &report.findings[0];
        assert_eq!(finding.rule, "double_equals");
        assert_eq!(finding.facts["operator"], "==");
        assert!(!finding.fix.is_empty());
    }
}
