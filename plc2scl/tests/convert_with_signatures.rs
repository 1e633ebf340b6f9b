//! Integration tests for conversions that use signature files.

mod common;

use common::{convert, convert_with, reported};
use lad2scl_dsl::options::ConversionOptions;
use lad2scl_dsl::signature::SignatureRegistry;
use lad2scl_problems::Problem;
use lad2scl_test::shared_signature_dir;

fn registry() -> SignatureRegistry {
    let (loaded, diagnostics) = SignatureRegistry::from_dir(&shared_signature_dir());
    assert!(diagnostics.is_empty());
    SignatureRegistry::builtin().merge(loaded)
}

#[test]
fn from_dir_when_shared_signatures_then_all_loaded() {
    let registry = registry();

    assert!(registry.contains("SCALE"));
    assert_eq!(
        registry
            .get("valve_control")
            .and_then(|block| block.parameter("timeout"))
            .and_then(|param| param.default_literal.as_deref()),
        Some("T#5s")
    );
}

#[test]
fn convert_when_user_function_known_then_defaults_and_outputs_bound() {
    let (logic, lines) = convert_with("scaling.json", &registry(), &ConversionOptions::default());

    assert!(!reported(&logic, Problem::UnresolvedInput));
    assert_eq!(
        lines,
        vec![
            "REGION \"Network 1\"",
            "   \"Scaled\" := \"Scale\"(IN := \"Raw\", FACTOR := 2, BIPOLAR := FALSE, STATUS => \"Status\");",
            "   \"Shifted\" := (\"Scaled\" + \"Offset\");",
            "END_REGION",
            "",
        ]
    );
}

#[test]
fn convert_when_user_function_unknown_then_wired_inputs_only() {
    let (_, lines) = convert("scaling.json");

    assert_eq!(
        lines[1],
        "   \"Scaled\" := \"Scale\"(IN := \"Raw\", STATUS => \"Status\");"
    );
}
