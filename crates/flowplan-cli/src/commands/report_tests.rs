use flowplan_core::PipelineDef;
use flowplan_planner::{Planner, PlannerConfig};
use indoc::indoc;

use super::report::render_error;

fn compile_error(json: &str) -> flowplan_planner::Error {
    let def = PipelineDef::from_json(json).unwrap();
    Planner::new(PlannerConfig::default())
        .compile(&def)
        .unwrap_err()
}

#[test]
fn verification_failure_lists_diagnostics() {
    let err = compile_error(indoc! {r#"
        {
          "name": "p",
          "stages": [
            { "name": "src", "type": "source", "scheme": "text", "identifier": "in" },
            { "name": "a", "type": "each", "inputs": ["src"], "operation": "parse" },
            { "name": "sum", "type": "every", "inputs": ["a"], "operation": "sum", "declared": ["total"] },
            { "name": "out", "type": "sink", "inputs": ["sum"], "scheme": "text", "identifier": "out" }
          ]
        }
    "#});

    insta::assert_snapshot!(render_error(&err), @r"
    error: verify failed: pipeline failed verification with 1 error(s)
    error: `sum`: every must directly follow a grouping or another every
      note: `a`: fed by each
      hint: add a group_by or co_group in front of it
    ");
}

#[test]
fn phase_failure_shows_graph() {
    let err = compile_error(indoc! {r#"
        {
          "name": "p",
          "stages": [
            { "name": "src", "type": "source", "scheme": "text", "identifier": "in", "fields": ["line"] },
            { "name": "split", "type": "each", "inputs": ["src"], "operation": "tokenize", "arguments": ["text"], "declared": ["word"] },
            { "name": "out", "type": "sink", "inputs": ["split"], "scheme": "text", "identifier": "out" }
          ]
        }
    "#});

    let rendered = render_error(&err);
    assert!(rendered.starts_with(
        "error: field-resolution failed: `split` selects [text] missing from its input\n"
    ));
    assert!(rendered.contains("\ngraph when field-resolution failed:\n"));
    assert!(rendered.contains("e3: each split →"));
}

#[test]
fn definition_error_is_one_line() {
    let err = compile_error(indoc! {r#"
        {
          "name": "p",
          "stages": [
            { "name": "out", "type": "sink", "inputs": ["nowhere"], "scheme": "text", "identifier": "out" }
          ]
        }
    "#});

    assert_eq!(
        render_error(&err),
        "error: stage `out` reads from unknown stage `nowhere`\n"
    );
}
