//! The analysis of networks and blocks as individual stages (to enable
//! testing).
use std::thread;

use log::{debug, info};

use lad2scl_dsl::{
    core::NetworkId,
    diagnostic::{Diagnostic, Diagnostics, Label},
    graph::{Connection, Graph, Network, NetworkBody},
    operation::{FbCall, Operation},
    options::{ConversionOptions, WireConflictPolicy},
    signature::SignatureRegistry,
};
use lad2scl_problems::Problem;

use crate::{extractor, fb_calls, resolver::Resolver};

/// The content of an analyzed network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogicBody {
    Graph {
        fb_calls: Vec<FbCall>,
        operations: Vec<Operation>,
    },
    /// Structured text copied from the network.
    Text(String),
}

/// The result of analyzing one network.
#[derive(Clone, Debug)]
pub struct NetworkLogic {
    pub id: NetworkId,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub body: LogicBody,
    pub diagnostics: Vec<Diagnostic>,
}

/// Analyzes one network into its call records and operations.
pub fn analyze_network(
    network: &Network,
    registry: &SignatureRegistry,
    options: &ConversionOptions,
) -> NetworkLogic {
    let (body, diagnostics) = match &network.body {
        NetworkBody::Text(code) => (LogicBody::Text(code.clone()), vec![]),
        NetworkBody::Graph(graph) => {
            let mut diagnostics = Diagnostics::new();
            report_conflicts(network.id, graph, options.wire_conflicts, &mut diagnostics);

            let mut resolver = Resolver::new(graph, registry, network.id);
            let fb_calls = fb_calls::extract_fb_calls(&mut resolver);
            let operations = extractor::extract(&mut resolver);
            diagnostics.append(resolver.into_diagnostics());

            debug!(
                "Network {}: {} calls, {} operations, {} diagnostics",
                network.id,
                fb_calls.len(),
                operations.len(),
                diagnostics.len()
            );
            (
                LogicBody::Graph {
                    fb_calls,
                    operations,
                },
                diagnostics.into_vec(),
            )
        }
    };

    NetworkLogic {
        id: network.id,
        title: network.title.clone(),
        comment: network.comment.clone(),
        body,
        diagnostics,
    }
}

/// Analyzes the networks of a block one after another.
pub fn analyze_block(
    networks: &[Network],
    registry: &SignatureRegistry,
    options: &ConversionOptions,
) -> Vec<NetworkLogic> {
    info!("Analyzing {} networks", networks.len());
    networks
        .iter()
        .map(|network| analyze_network(network, registry, options))
        .collect()
}

/// Analyzes the networks of a block with one worker thread per network.
///
/// Workers share the registry and options by reference. The result is in
/// the order of the input.
pub fn analyze_block_parallel(
    networks: &[Network],
    registry: &SignatureRegistry,
    options: &ConversionOptions,
) -> Vec<NetworkLogic> {
    info!("Analyzing {} networks in parallel", networks.len());
    thread::scope(|scope| {
        let workers: Vec<_> = networks
            .iter()
            .map(|network| scope.spawn(move || analyze_network(network, registry, options)))
            .collect();

        workers
            .into_iter()
            .map(|worker| match worker.join() {
                Ok(logic) => logic,
                Err(payload) => std::panic::resume_unwind(payload),
            })
            .collect()
    })
}

/// Reports every pin driven by more than one wire. The report is made
/// under either policy.
fn report_conflicts(
    network: NetworkId,
    graph: &Graph,
    policy: WireConflictPolicy,
    diagnostics: &mut Diagnostics,
) {
    for pin in graph.connections().conflicts() {
        let count = match graph.connections().get(pin) {
            Some(Connection::Conflicting(sources)) => sources.len(),
            _ => 2,
        };
        let outcome = match policy {
            WireConflictPolicy::Reject => "left unresolved",
            WireConflictPolicy::LastWins => "last wire used",
        };
        diagnostics.push(
            Diagnostic::problem(
                Problem::AmbiguousDestination,
                Label::part(network, &pin.part, format!("pin {} {}", pin.pin, outcome)),
            )
            .with_context("wires", &count),
        );
    }
}
