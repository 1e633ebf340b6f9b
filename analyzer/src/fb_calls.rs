//! Extracts the block calls of a network.
//!
//! A call part with an instance is always a call statement. A stateless
//! call is a statement only when its result is neither consumed by another
//! part nor written to a variable; otherwise it appears inside an
//! expression.
use log::debug;

use lad2scl_dsl::{graph::Part, kind::PartKind, operation::FbCall};
use lad2scl_problems::Problem;

use crate::extractor::value_destination;
use crate::resolver::Resolver;

/// Extracts the call records of the network the resolver walks.
pub fn extract_fb_calls(resolver: &mut Resolver) -> Vec<FbCall> {
    let graph = resolver.graph();
    graph
        .parts()
        .iter()
        .filter_map(|part| match &part.kind {
            PartKind::Call { block_name } => fb_call(resolver, part, block_name),
            _ => None,
        })
        .collect()
}

fn fb_call(resolver: &mut Resolver, part: &Part, block_type: &str) -> Option<FbCall> {
    let graph = resolver.graph();
    if part.instance_name.is_none() {
        if graph.connections().feeds_parts(&part.id) {
            debug!("Call {} is used inline", part.id);
            return None;
        }
        if value_destination(graph, part).is_some() {
            return None;
        }
    }

    let enable = resolver.resolve_enable(&part.id);
    if enable.contains_unresolved() {
        resolver.report(
            Problem::UnresolvedEnable,
            &part.id,
            format!("call of {} will not be emitted", block_type),
        );
    }

    let resolved_inputs = resolver.resolve_call_inputs(part, block_type);
    for (name, expr) in &resolved_inputs {
        if expr.contains_unresolved() {
            resolver.report(
                Problem::UnresolvedInput,
                &part.id,
                format!("input {} of {} is unresolved", name, block_type),
            );
        }
    }

    let resolved_outputs = graph
        .connections()
        .outputs_of(&part.id)
        .filter_map(|binding| {
            graph
                .access(&binding.access)
                .map(|access| (binding.source.pin.clone(), access.symbol.clone()))
        })
        .collect();

    let call = FbCall {
        instance_name: part.instance_name.clone(),
        block_type: block_type.to_string(),
        version: part.version.clone(),
        enable,
        resolved_inputs,
        resolved_outputs,
    };
    debug!(
        "Call {} of {} with {} inputs",
        call.call_name(),
        block_type,
        call.resolved_inputs.len()
    );
    Some(call)
}
