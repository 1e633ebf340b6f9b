//! Integration tests for converting single ladder networks.

mod common;

use common::{convert, reported};
use lad2scl_problems::Problem;

#[test]
fn convert_when_series_contacts_then_and_of_operands() {
    let (logic, lines) = convert("series.json");

    assert!(logic[0].diagnostics.is_empty());
    assert_eq!(
        lines,
        vec![
            "REGION \"Motor start\"",
            "   \"Motor\" := \"Start\" AND NOT (\"Stop\");",
            "END_REGION",
            "",
        ]
    );
}

#[test]
fn convert_when_parallel_branch_then_or_in_parentheses() {
    let (_, lines) = convert("parallel.json");

    assert_eq!(lines[0], "REGION \"Network 1\"");
    assert_eq!(lines[1], "   #out := (#a OR #b) AND #c;");
}

#[test]
fn convert_when_counter_without_preset_then_defaults_injected() {
    let (logic, lines) = convert("counter.json");

    assert!(!reported(&logic, Problem::UnresolvedInput));
    assert_eq!(
        lines,
        vec![
            "REGION \"Count pulses\"",
            "   \"Counter\"(",
            "      CU := \"Pulse\",",
            "      R := FALSE,",
            "      PV := 0,",
            "      CV => \"Count\"",
            "   );",
            "END_REGION",
            "",
        ]
    );
}

#[test]
fn convert_when_duplicate_coils_then_single_assignment() {
    let (_, lines) = convert("duplicate_coils.json");

    let assignments: Vec<&String> = lines
        .iter()
        .filter(|line| line.trim_start().starts_with("\"Motor\" :="))
        .collect();
    assert_eq!(assignments.len(), 1);
}

#[test]
fn convert_when_move_enable_unresolved_then_move_skipped() {
    let (logic, lines) = convert("unresolved_move.json");

    assert!(reported(&logic, Problem::UnsupportedPartKind));
    assert!(lines
        .iter()
        .any(|line| line.contains("// WARNING: Unresolved enable logic")));
    assert!(lines
        .iter()
        .any(|line| line.contains("// TODO: Manually verify:")));
    assert!(!lines.iter().any(|line| line.contains("\"Y\" := \"X\";")));
}

#[test]
fn convert_when_cycle_then_marker_and_next_network_converted() {
    let (logic, lines) = convert("cycle.json");

    assert!(reported(&logic, Problem::CycleDetected));
    assert!(lines
        .iter()
        .any(|line| line.trim_start() == "\"Lamp\" := \"__UNRESOLVED__\";"));
    assert!(lines
        .iter()
        .any(|line| line.trim_start() == "\"Running\" := \"Run\";"));
    assert!(logic[1].diagnostics.is_empty());
}

#[test]
fn convert_when_timer_input_unresolved_then_marker_and_warning() {
    let (logic, lines) = convert("unresolved_timer.json");

    assert!(reported(&logic, Problem::UnresolvedInput));
    assert_eq!(
        lines,
        vec![
            "REGION \"Delay start\"",
            "   // WARNING: Unresolved input logic in call of \"T1\"",
            "   \"T1\"(",
            "      IN := \"__UNRESOLVED__\",",
            "      PT := T#5s",
            "   );",
            "END_REGION",
            "",
        ]
    );
}

#[test]
fn convert_when_call_result_stored_and_consumed_then_called_once() {
    let (logic, lines) = convert("stored_call.json");

    let calls = lines.iter().filter(|line| line.contains("\"Check\"(")).count();
    assert_eq!(calls, 1);
    assert!(logic[0].diagnostics.is_empty());
    assert_eq!(
        lines,
        vec![
            "REGION \"Network 1\"",
            "   \"Status\" := \"Check\"(raw := \"X\");",
            "   \"Ok\" := \"Status\";",
            "END_REGION",
            "",
        ]
    );
}
