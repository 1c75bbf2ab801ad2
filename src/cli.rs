//! Command-line interface for slipcheck.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::detect::{all_rules, RuleName};
use crate::engine;
use crate::parser::{self, Language};
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Beginner-mistake detection for JavaScript, TypeScript and Python.
///
/// Slipcheck parses one source file and runs a catalogue of detectors for
/// the mistakes beginners actually make: missing awaits, loose equality,
/// null dereferences, shadowed variables, off-by-one loops, swallowed
/// errors and friends. Every finding comes with an explanation and a fix.
#[derive(Parser)]
#[command(name = "slipcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a source file for common mistakes
    #[command(visible_alias = "check")]
    Analyze(AnalyzeArgs),
    /// List the rule catalogue
    Rules,
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Source file to analyze
    pub path: PathBuf,

    /// Language override (default: inferred from the file extension)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Disable a rule by name (repeatable)
    #[arg(long = "disable", value_name = "RULE")]
    pub disabled: Vec<String>,
}

/// Static per-rule metadata for the `rules` listing.
fn rule_info(rule: RuleName) -> (&'static str, &'static str) {
    match rule {
        RuleName::MissingAwait => ("error", "async function called without await"),
        RuleName::DoubleEquals => ("warning", "loose equality (== / !=)"),
        RuleName::NullableAccess => ("error", "member access on a possibly-null value"),
        RuleName::VariableShadowing => ("warning", "inner declaration hides an outer variable"),
        RuleName::OffByOneLoop => ("warning", "loop bound one past the end of a collection"),
        RuleName::NoErrorHandling => ("warning", "fallible call with no error handling"),
        RuleName::ArrayMutation => ("info", "in-place mutation of an array or list"),
        RuleName::VarUsage => ("info", "var instead of let/const"),
        RuleName::ConsoleLogLeft => ("info", "console output left in the code"),
        RuleName::EmptyCatch => ("warning", "exception handler that swallows the error"),
    }
}

/// Resolve the analysis language from the override flag or the extension.
fn resolve_language(args: &AnalyzeArgs) -> anyhow::Result<Language> {
    if let Some(tag) = &args.language {
        return tag.parse::<Language>().map_err(anyhow::Error::msg);
    }
    let ext = args
        .path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    Language::from_extension(ext).ok_or_else(|| {
        anyhow::anyhow!(
            "cannot infer language from {:?}; pass --language javascript|typescript|python",
            args.path
        )
    })
}

fn parse_disabled(names: &[String]) -> anyhow::Result<Vec<RuleName>> {
    names
        .iter()
        .map(|name| {
            RuleName::parse(name).ok_or_else(|| {
                anyhow::anyhow!(
                    "unknown rule {:?}; run 'slipcheck rules' to see the catalogue",
                    name
                )
            })
        })
        .collect()
}

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    // Initialize tree-sitter grammars
    parser::init();

    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let language = match resolve_language(args) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let disabled = match parse_disabled(&args.disabled) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let source = match std::fs::read_to_string(&args.path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: cannot read {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let analysis = match engine::analyze_filtered(&source, language, &disabled) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let path_str = args.path.to_string_lossy().to_string();
    match args.format.as_str() {
        "json" => report::write_json(&path_str, &analysis)?,
        _ => report::write_pretty(&path_str, &analysis),
    }

    if analysis.findings.is_empty() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the rules command.
pub fn run_rules() -> anyhow::Result<i32> {
    println!("{:<22} {:<10} {:<34} languages", "rule", "severity", "detects");
    for rule in all_rules() {
        let (severity, description) = rule_info(rule.name());
        let languages: Vec<&str> = rule.languages().iter().map(|l| l.as_str()).collect();
        println!(
            "{:<22} {:<10} {:<34} {}",
            rule.name(),
            severity,
            description,
            languages.join(", ")
        );
    }
    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_source(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn analyze_args(path: PathBuf) -> AnalyzeArgs {
        AnalyzeArgs {
            path,
            language: None,
            format: "json".to_string(),
            disabled: Vec::new(),
        }
    }

    #[test]
    fn clean_file_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "clean.js", "const x = 1;\n");
        assert_eq!(run_analyze(&analyze_args(path)).unwrap(), EXIT_SUCCESS);
    }

    #[test]
    fn findings_exit_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "bad.js", "var x = 1;\n");
        assert_eq!(run_analyze(&analyze_args(path)).unwrap(), EXIT_FAILED);
    }

    #[test]
    fn syntax_error_exits_two() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "broken.py", "def broken(:\n");
        assert_eq!(run_analyze(&analyze_args(path)).unwrap(), EXIT_ERROR);
    }

    #[test]
    fn unknown_extension_needs_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "script.txt", "var x = 1;\n");
        assert_eq!(
            run_analyze(&analyze_args(path.clone())).unwrap(),
            EXIT_ERROR
        );

        let mut args = analyze_args(path);
        args.language = Some("javascript".to_string());
        assert_eq!(run_analyze(&args).unwrap(), EXIT_FAILED);
    }

    #[test]
    fn disabling_the_only_rule_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "bad.js", "var x = 1;\n");
        let mut args = analyze_args(path);
        args.disabled = vec!["var_usage".to_string()];
        assert_eq!(run_analyze(&args).unwrap(), EXIT_SUCCESS);
    }

    #[test]
    fn unknown_rule_name_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "bad.js", "var x = 1;\n");
        let mut args = analyze_args(path);
        args.disabled = vec!["nope".to_string()];
        assert_eq!(run_analyze(&args).unwrap(), EXIT_ERROR);
    }
}
