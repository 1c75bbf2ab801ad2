//! Explanation rendering.
//!
//! Turns a finding's rule name and extracted facts into beginner-facing
//! prose: what went wrong, how to fix it, and (usually) a bad/good example
//! pair in the analyzed language. Rendering is a pure function of the
//! facts, so identical findings always produce identical text. A finding
//! missing an expected fact falls back to a generic explanation without
//! affecting any other finding.

use serde::Serialize;

use crate::detect::{FactValue, Facts, RuleName};

/// Rendered beginner-facing text for one finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub explanation: String,
    pub fix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

pub fn render(rule: RuleName, facts: &Facts) -> Explanation {
    let rendered = match rule {
        RuleName::MissingAwait => missing_await(facts),
        RuleName::DoubleEquals => double_equals(facts),
        RuleName::NullableAccess => nullable_access(facts),
        RuleName::VariableShadowing => variable_shadowing(facts),
        RuleName::OffByOneLoop => off_by_one_loop(facts),
        RuleName::NoErrorHandling => no_error_handling(facts),
        RuleName::ArrayMutation => array_mutation(facts),
        RuleName::VarUsage => var_usage(facts),
        RuleName::ConsoleLogLeft => console_log_left(facts),
        RuleName::EmptyCatch => empty_catch(facts),
    };
    rendered.unwrap_or_else(|| fallback(rule))
}

fn fallback(rule: RuleName) -> Explanation {
    Explanation {
        explanation: format!(
            "This line matches the '{}' pattern, which commonly hides a bug.",
            rule
        ),
        fix: "Read the flagged line carefully and make sure it does what you intended.".to_string(),
        example: None,
    }
}

fn is_python(facts: &Facts) -> bool {
    facts.str_value("language") == Some("python")
}

/// A bad/good snippet pair with the comment marker of the language.
fn pair(python: bool, bad: &str, good: &str) -> String {
    let marker = if python { "#" } else { "//" };
    format!("{m} bad\n{bad}\n{m} good\n{good}", m = marker)
}

fn missing_await(facts: &Facts) -> Option<Explanation> {
    let name = facts.str_value("function_name")?;
    let line = facts.int_value("declaration_line")?;
    let python = is_python(facts);

    let explanation = if python {
        format!(
            "'{}' is an async def (line {}), so calling it only builds a coroutine. \
             Without await the coroutine is thrown away and the body never runs.",
            name, line
        )
    } else {
        format!(
            "'{}' is declared async (line {}), so calling it returns a promise immediately. \
             Without await the result is discarded and the code keeps going before the work finishes.",
            name, line
        )
    };
    let fix = if python {
        format!("Write 'await {}(...)' inside an async def.", name)
    } else {
        format!(
            "Write 'await {}(...)' inside an async function, or chain '.then(...)' if you \
             really want to continue without waiting.",
            name
        )
    };
    let example = if python {
        pair(true, &format!("{}()", name), &format!("await {}()", name))
    } else {
        pair(
            false,
            &format!("const data = {}();", name),
            &format!("const data = await {}();", name),
        )
    };

    Some(Explanation {
        explanation,
        fix,
        example: Some(example),
    })
}

fn double_equals(facts: &Facts) -> Option<Explanation> {
    let operator = facts.str_value("operator")?;
    let suggested = facts.str_value("suggested_operator")?;

    Some(Explanation {
        explanation: format!(
            "'{}' compares after type coercion, so values like 0, \"\" and null can look \
             equal when they are not the same thing.",
            operator
        ),
        fix: format!("Use '{}' to compare both value and type.", suggested),
        example: Some(pair(
            false,
            &format!("if (count {} \"0\") {{ ... }}", operator),
            &format!("if (count {} 0) {{ ... }}", suggested),
        )),
    })
}

fn nullable_access(facts: &Facts) -> Option<Explanation> {
    let name = facts.str_value("variable_name")?;
    let reason = facts.str_value("reason")?;
    let python = is_python(facts);
    let null_word = if python { "None" } else { "null" };

    match reason {
        "assigned_null" => {
            let assigned = facts.int_value("null_assignment_line")?;
            let explanation = format!(
                "'{}' still holds {} from line {} when this access runs, which crashes at runtime.",
                name, null_word, assigned
            );
            let fix = format!(
                "Check '{}' for {} before using it, or give it a real value first.",
                name, null_word
            );
            let example = if python {
                pair(
                    true,
                    &format!("{n} = None\nprint({n}.strip())", n = name),
                    &format!("{n} = None\nif {n} is not None:\n    print({n}.strip())", n = name),
                )
            } else {
                pair(
                    false,
                    &format!("let {n} = null;\nuse({n}.value);", n = name),
                    &format!("let {n} = null;\nif ({n}) {{\n    use({n}.value);\n}}", n = name),
                )
            };
            Some(Explanation {
                explanation,
                fix,
                example: Some(example),
            })
        }
        "parameter" => {
            let explanation = format!(
                "'{}' comes straight from the caller and is never checked here; a missing \
                 value makes this access crash.",
                name
            );
            let fix = format!(
                "Test '{}' before the first access, or give it a safe default.",
                name
            );
            let example = if python {
                pair(
                    true,
                    &format!("def show({n}):\n    print({n}.name)", n = name),
                    &format!(
                        "def show({n}):\n    if {n} is None:\n        return\n    print({n}.name)",
                        n = name
                    ),
                )
            } else {
                pair(
                    false,
                    &format!("function show({n}) {{\n    return {n}.name;\n}}", n = name),
                    &format!(
                        "function show({n}) {{\n    if (!{n}) return \"\";\n    return {n}.name;\n}}",
                        n = name
                    ),
                )
            };
            Some(Explanation {
                explanation,
                fix,
                example: Some(example),
            })
        }
        _ => None,
    }
}

fn variable_shadowing(facts: &Facts) -> Option<Explanation> {
    let name = facts.str_value("variable_name")?;
    let outer = facts.int_value("outer_declaration_line")?;
    let inner = facts.int_value("inner_declaration_line")?;

    Some(Explanation {
        explanation: format!(
            "The '{}' declared on line {} hides the '{}' from line {}. Inside this scope \
             every read and write touches the inner one, which is easy to misread.",
            name, inner, name, outer
        ),
        fix: format!(
            "Rename one of the two '{}' variables so each value keeps its own name.",
            name
        ),
        example: None,
    })
}

fn off_by_one_loop(facts: &Facts) -> Option<Explanation> {
    let bound = facts.str_value("bound")?;
    let python = is_python(facts);

    if let Some(operator) = facts.str_value("condition_operator") {
        let tightened = operator.replace('=', "");
        let explanation = format!(
            "The loop keeps running while the index is {} {}, so its last pass uses an \
             index equal to the length, one past the final element.",
            operator, bound
        );
        let fix = format!("Compare with '{}' so the index stays in range.", tightened);
        let example = pair(
            python,
            &format!("i {} {}", operator, bound),
            &format!("i {} {}", tightened, bound),
        );
        return Some(Explanation {
            explanation,
            fix,
            example: Some(example),
        });
    }

    let offset = facts.int_value("range_offset")?;
    Some(Explanation {
        explanation: format!(
            "range({} + {}) ends at an index equal to the length, which is out of range \
             for the collection.",
            bound, offset
        ),
        fix: format!(
            "Iterate range({}), or better, loop over the items directly.",
            bound
        ),
        example: Some(pair(
            true,
            &format!("for i in range({} + {}):", bound, offset),
            &format!("for i in range({}):", bound),
        )),
    })
}

fn no_error_handling(facts: &Facts) -> Option<Explanation> {
    let trigger = facts.str_value("trigger")?;
    let python = is_python(facts);
    let handler = if python { "try/except" } else { "try/catch" };

    let explanation = match trigger {
        "await" => {
            if python {
                "If this awaited call raises, the exception escapes the function and \
                 nothing here records or recovers from it."
                    .to_string()
            } else {
                "If this awaited call rejects, the error escapes the function and shows \
                 up as an unhandled rejection."
                    .to_string()
            }
        }
        "io_call" => {
            let name = facts.str_value("function_name")?;
            format!(
                "'{}' talks to the outside world and can fail at any time; right now a \
                 failure crashes the caller.",
                name
            )
        }
        _ => return None,
    };

    let fix = if python {
        format!("Wrap the call in {} and decide what a failure should do.", handler)
    } else {
        format!(
            "Wrap the call in {} (or chain '.catch(...)') and decide what a failure \
             should do.",
            handler
        )
    };
    let example = if python {
        pair(
            true,
            "data = await load()",
            "try:\n    data = await load()\nexcept OSError as exc:\n    handle(exc)",
        )
    } else {
        pair(
            false,
            "const data = await load();",
            "try {\n    const data = await load();\n} catch (error) {\n    handle(error);\n}",
        )
    };

    Some(Explanation {
        explanation,
        fix,
        example: Some(example),
    })
}

fn array_mutation(facts: &Facts) -> Option<Explanation> {
    let method = facts.str_value("method")?;
    let target = facts.str_value("target")?;
    let state_like = facts.bool_value("state_like")?;
    let python = is_python(facts);

    let explanation = if state_like {
        format!(
            "'{}.{}()' rewrites '{}' in place. Frameworks that compare references to \
             decide what changed will not notice the update.",
            target, method, target
        )
    } else {
        format!(
            "'{}' changes '{}' in place, which surprises any other code still holding a \
             reference to the old contents.",
            method, target
        )
    };
    let fix = if python {
        "Build a new list (sorted(...), list slicing, a comprehension) and assign that instead."
            .to_string()
    } else {
        "Build a new array ([...items], .slice(), .toSorted()) and assign that instead."
            .to_string()
    };
    let example = if python {
        pair(
            true,
            &format!("{}.{}(x)", target, method),
            &format!("updated = [*{}, x]", target),
        )
    } else {
        pair(
            false,
            &format!("{}.{}(x);", target, method),
            &format!("const updated = [...{}, x];", target),
        )
    };

    Some(Explanation {
        explanation,
        fix,
        example: Some(example),
    })
}

fn var_usage(facts: &Facts) -> Option<Explanation> {
    let names = match facts.get("variable_names") {
        Some(FactValue::List(names)) if !names.is_empty() => names.join(", "),
        _ => return None,
    };

    Some(Explanation {
        explanation: format!(
            "'var' declarations ({}) are function-scoped and hoisted: they leak out of \
             the block they appear in and can be redeclared silently.",
            names
        ),
        fix: "Use 'const' for values that never change and 'let' for the rest.".to_string(),
        example: Some(pair(
            false,
            "var total = 0;",
            "let total = 0;",
        )),
    })
}

fn console_log_left(facts: &Facts) -> Option<Explanation> {
    let method = facts.str_value("method")?;
    let inside_catch = facts.bool_value("inside_catch")?;

    let explanation = if inside_catch {
        format!(
            "console.{} inside an error handler is not real error reporting; the failure \
             is printed once and then forgotten.",
            method
        )
    } else {
        format!(
            "console.{} left in the code prints on every run, including production.",
            method
        )
    };
    let fix = if inside_catch {
        "Route the error through your logging or reporting layer instead of the console."
            .to_string()
    } else {
        "Remove the call, or move it behind a debug flag or a proper logger.".to_string()
    };

    Some(Explanation {
        explanation,
        fix,
        example: Some(pair(
            false,
            &format!("console.{}(result);", method),
            "if (DEBUG) {\n    console.debug(result);\n}",
        )),
    })
}

fn empty_catch(facts: &Facts) -> Option<Explanation> {
    let summary = facts.str_value("summary")?;
    let line = facts.int_value("handler_line")?;
    let python = is_python(facts);
    let handler = if python { "except" } else { "catch" };

    let body = match summary {
        "empty" => "has an empty body",
        "only comments" => "contains only comments",
        "only pass" => "contains only 'pass'",
        _ => return None,
    };

    let example = if python {
        pair(
            true,
            "try:\n    risky()\nexcept ValueError:\n    pass",
            "try:\n    risky()\nexcept ValueError as exc:\n    log.warning(\"risky failed: %s\", exc)",
        )
    } else {
        pair(
            false,
            "try {\n    risky();\n} catch (error) {\n}",
            "try {\n    risky();\n} catch (error) {\n    report(error);\n}",
        )
    };

    Some(Explanation {
        explanation: format!(
            "The {} block on line {} {}. The error is swallowed and nothing records that \
             it ever happened.",
            handler, line, body
        ),
        fix: "Handle the error, or at least log it; re-raise it if this code cannot \
              decide what to do."
            .to_string(),
        example: Some(example),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendering_is_deterministic() {
        let mut facts = Facts::new();
        facts.set_str("operator", "==");
        facts.set_str("suggested_operator", "===");

        let a = render(RuleName::DoubleEquals, &facts);
        let b = render(RuleName::DoubleEquals, &facts);
        assert_eq!(a, b);
        assert!(a.explanation.contains("coercion"));
        assert!(a.fix.contains("==="));
    }

    #[test]
    fn missing_fact_falls_back() {
        let rendered = render(RuleName::DoubleEquals, &Facts::new());
        assert_eq!(rendered, fallback(RuleName::DoubleEquals));
        assert!(rendered.explanation.contains("double_equals"));
        assert!(rendered.example.is_none());
    }

    #[test]
    fn language_fact_switches_the_example() {
        let mut facts = Facts::new();
        facts.set_str("function_name", "load");
        facts.set_int("declaration_line", 1);
        facts.set_str("language", "python");
        let py = render(RuleName::MissingAwait, &facts);
        assert!(py.explanation.contains("coroutine"));
        assert!(py.example.as_deref().unwrap().starts_with("# bad"));

        facts.set_str("language", "javascript");
        let js = render(RuleName::MissingAwait, &facts);
        assert!(js.explanation.contains("promise"));
        assert!(js.example.as_deref().unwrap().starts_with("// bad"));
    }

    #[test]
    fn nullable_reason_branches() {
        let mut facts = Facts::new();
        facts.set_str("variable_name", "user");
        facts.set_str("reason", "assigned_null");
        facts.set_int("null_assignment_line", 3);
        facts.set_str("language", "javascript");
        let assigned = render(RuleName::NullableAccess, &facts);
        assert!(assigned.explanation.contains("line 3"));

        let mut facts = Facts::new();
        facts.set_str("variable_name", "user");
        facts.set_str("reason", "parameter");
        facts.set_str("language", "javascript");
        let param = render(RuleName::NullableAccess, &facts);
        assert!(param.explanation.contains("caller"));
        assert_ne!(assigned.explanation, param.explanation);
    }

    #[test]
    fn empty_catch_summaries_render_distinct_text() {
        let mut seen = Vec::new();
        for summary in ["empty", "only comments", "only pass"] {
            let mut facts = Facts::new();
            facts.set_str("summary", summary);
            facts.set_str("language", "python");
            facts.set_int("handler_line", 4);
            let rendered = render(RuleName::EmptyCatch, &facts);
            assert!(!seen.contains(&rendered.explanation));
            seen.push(rendered.explanation);
        }
    }

    #[test]
    fn off_by_one_renders_both_shapes() {
        let mut facts = Facts::new();
        facts.set_str("condition_operator", "<=");
        facts.set_str("bound", "items.length");
        facts.set_str("language", "javascript");
        let cond = render(RuleName::OffByOneLoop, &facts);
        assert!(cond.fix.contains("'<'"));

        let mut facts = Facts::new();
        facts.set_int("range_offset", 1);
        facts.set_str("bound", "len(items)");
        facts.set_str("language", "python");
        let range = render(RuleName::OffByOneLoop, &facts);
        assert!(range.explanation.contains("range(len(items) + 1)"));
    }

    #[test]
    fn every_rule_has_a_fallback() {
        for rule in RuleName::ALL {
            let rendered = render(*rule, &Facts::new());
            assert!(!rendered.explanation.is_empty());
            assert!(!rendered.fix.is_empty());
        }
    }
}
