//! Shared helpers for conversion integration tests.

use lad2scl_analyzer::stages::{analyze_block, NetworkLogic};
use lad2scl_dsl::interchange::parse_document;
use lad2scl_dsl::options::ConversionOptions;
use lad2scl_dsl::signature::SignatureRegistry;
use lad2scl_plc2scl::emit_block;
use lad2scl_problems::Problem;
use lad2scl_test::read_shared_resource;

/// Converts a fixture from the shared resources and returns the analyzed
/// networks with the generated lines.
pub fn convert_with(
    name: &str,
    registry: &SignatureRegistry,
    options: &ConversionOptions,
) -> (Vec<NetworkLogic>, Vec<String>) {
    let text = read_shared_resource(name);
    let networks = parse_document(&text, options.wire_conflicts).unwrap();
    let logic = analyze_block(&networks, registry, options);
    let lines = emit_block(&logic, registry, options);
    (logic, lines)
}

pub fn convert(name: &str) -> (Vec<NetworkLogic>, Vec<String>) {
    convert_with(
        name,
        &SignatureRegistry::builtin(),
        &ConversionOptions::default(),
    )
}

/// Whether any network reported the problem.
#[allow(dead_code)]
pub fn reported(logic: &[NetworkLogic], problem: Problem) -> bool {
    logic
        .iter()
        .flat_map(|network| network.diagnostics.iter())
        .any(|diagnostic| diagnostic.is(problem))
}
