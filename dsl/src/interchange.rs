//! A loader-neutral JSON description of networks.
//!
//! A graph loader that walks a vendor export can emit this description so
//! that the conversion runs without knowing the vendor format. Parts are
//! named the way the programming tool names them and are classified into
//! [`PartKind`] here.
//!
//! ```json
//! {"networks": [{
//!     "title": "Start",
//!     "parts": [{"id": "21", "name": "Contact"}, {"id": "22", "name": "Coil"}],
//!     "accesses": [{"id": "1", "scope": "global", "symbol": "\"Start\""},
//!                  {"id": "2", "scope": "global", "symbol": "\"Motor\""}],
//!     "wires": [
//!         {"from": {"powerrail": true}, "to": [{"part": "21", "pin": "in"}]},
//!         {"from": {"access": "1"}, "to": [{"part": "21", "pin": "operand"}]},
//!         {"from": {"part": "21", "pin": "out"}, "to": [{"part": "22", "pin": "in"}]},
//!         {"from": {"access": "2"}, "to": [{"part": "22", "pin": "operand"}]}
//!     ]
//! }]}
//! ```
use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::core::{AccessId, NetworkId, PartId, PinRef};
use crate::graph::{Access, Graph, Network, Part, Scope, SourceRef, Wire, WireTarget};
use crate::kind::PartKind;
use crate::options::WireConflictPolicy;

#[derive(Debug, Error)]
pub enum InterchangeError {
    #[error("malformed network description: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("wire in network {network} has no source")]
    MissingSource { network: NetworkId },
}

#[derive(Deserialize)]
struct DocumentRecord {
    networks: Vec<NetworkRecord>,
}

#[derive(Deserialize)]
struct NetworkRecord {
    title: Option<String>,
    comment: Option<String>,
    /// Networks already written as structured text.
    scl: Option<String>,
    #[serde(default)]
    parts: Vec<PartRecord>,
    #[serde(default)]
    accesses: Vec<AccessRecord>,
    #[serde(default)]
    wires: Vec<WireRecord>,
}

#[derive(Deserialize)]
struct PartRecord {
    id: PartId,
    name: String,
    #[serde(default)]
    negated: bool,
    instance: Option<String>,
    version: Option<String>,
    #[serde(default)]
    template: BTreeMap<String, String>,
    /// Declared as a block call even without an instance.
    #[serde(default)]
    call: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum ScopeRecord {
    Local,
    Global,
    Constant,
    Predefined,
}

#[derive(Deserialize)]
struct AccessRecord {
    id: AccessId,
    scope: ScopeRecord,
    symbol: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EndpointRecord {
    Pin { part: PartId, pin: String },
    Access { access: AccessId },
    PowerRail { powerrail: bool },
}

#[derive(Deserialize)]
struct WireRecord {
    from: EndpointRecord,
    to: Vec<EndpointRecord>,
}

/// Reads every network of a document, numbering networks from 1.
pub fn parse_document(
    text: &str,
    policy: WireConflictPolicy,
) -> Result<Vec<Network>, InterchangeError> {
    let document: DocumentRecord = serde_json::from_str(text)?;
    document
        .networks
        .into_iter()
        .enumerate()
        .map(|(idx, record)| build_network(NetworkId(idx + 1), record, policy))
        .collect()
}

fn build_network(
    id: NetworkId,
    record: NetworkRecord,
    policy: WireConflictPolicy,
) -> Result<Network, InterchangeError> {
    let mut network = match record.scl {
        Some(code) => Network::text(id, code),
        None => {
            let parts = record.parts.into_iter().map(build_part).collect();
            let accesses = record.accesses.into_iter().map(build_access).collect();
            let wires = record
                .wires
                .into_iter()
                .map(|wire| build_wire(id, wire))
                .collect::<Result<Vec<_>, _>>()?;
            Network::graph(id, Graph::new(parts, accesses, wires, policy))
        }
    };
    network.title = record.title;
    network.comment = record.comment;
    Ok(network)
}

fn build_part(record: PartRecord) -> Part {
    let is_call = record.call || record.instance.is_some();
    let kind = PartKind::classify(&record.name, &record.template, record.negated, is_call);
    Part {
        id: record.id,
        kind,
        negated: record.negated,
        instance_name: record.instance,
        version: record.version,
        template_params: record.template,
    }
}

fn build_access(record: AccessRecord) -> Access {
    let scope = match record.scope {
        ScopeRecord::Local => Scope::Local,
        ScopeRecord::Global => Scope::Global,
        ScopeRecord::Constant => Scope::Constant,
        ScopeRecord::Predefined => Scope::Predefined,
    };
    Access::new(record.id, scope, record.symbol)
}

fn build_wire(network: NetworkId, record: WireRecord) -> Result<Wire, InterchangeError> {
    let source = match record.from {
        EndpointRecord::Pin { part, pin } => SourceRef::FromPart(part, pin),
        EndpointRecord::Access { access } => SourceRef::FromAccess(access),
        EndpointRecord::PowerRail { powerrail: true } => SourceRef::PowerRail,
        EndpointRecord::PowerRail { powerrail: false } => {
            return Err(InterchangeError::MissingSource { network })
        }
    };

    let targets = record
        .to
        .into_iter()
        .filter_map(|end| match end {
            EndpointRecord::Pin { part, pin } => Some(WireTarget::Pin(PinRef::new(part, pin))),
            EndpointRecord::Access { access } => Some(WireTarget::Access(access)),
            EndpointRecord::PowerRail { .. } => None,
        })
        .collect();

    Ok(Wire::new(source, targets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Connection, NetworkBody};

    #[test]
    fn parse_document_when_contact_and_coil_then_graph() {
        let text = r#"{"networks": [{
            "title": "Start",
            "parts": [{"id": "21", "name": "Contact", "negated": true},
                      {"id": "22", "name": "Coil"}],
            "accesses": [{"id": "1", "scope": "global", "symbol": "a"},
                         {"id": "2", "scope": "local", "symbol": "out"}],
            "wires": [
                {"from": {"powerrail": true}, "to": [{"part": "21", "pin": "in"}]},
                {"from": {"access": "1"}, "to": [{"part": "21", "pin": "operand"}]},
                {"from": {"part": "21", "pin": "out"}, "to": [{"part": "22", "pin": "in"}]},
                {"from": {"access": "2"}, "to": [{"part": "22", "pin": "operand"}]}
            ]
        }]}"#;

        let networks = parse_document(text, WireConflictPolicy::Reject).unwrap();

        assert_eq!(networks.len(), 1);
        assert_eq!(networks[0].id, NetworkId(1));
        assert_eq!(networks[0].title.as_deref(), Some("Start"));
        let graph = match &networks[0].body {
            NetworkBody::Graph(graph) => graph,
            NetworkBody::Text(_) => panic!("expected graph"),
        };
        assert_eq!(
            graph.part(&PartId::new("21")).unwrap().kind,
            PartKind::NegatedContact
        );
        assert_eq!(
            graph.connections().get(&PinRef::new("21", "in")),
            Some(&Connection::Single(SourceRef::PowerRail))
        );
    }

    #[test]
    fn parse_document_when_scl_then_text_body() {
        let text = r#"{"networks": [{"scl": "a := b;"}]}"#;

        let networks = parse_document(text, WireConflictPolicy::Reject).unwrap();

        assert!(matches!(&networks[0].body, NetworkBody::Text(code) if code == "a := b;"));
    }

    #[test]
    fn parse_document_when_instance_then_call_kind() {
        let text = r#"{"networks": [{
            "parts": [{"id": "3", "name": "TON", "instance": "T1"}]
        }]}"#;

        let networks = parse_document(text, WireConflictPolicy::Reject).unwrap();
        let NetworkBody::Graph(graph) = &networks[0].body else {
            panic!("expected graph");
        };
        assert_eq!(
            graph.parts()[0].kind,
            PartKind::Call {
                block_name: "TON".to_string()
            }
        );
    }

    #[test]
    fn parse_document_when_not_json_then_malformed() {
        let result = parse_document("[", WireConflictPolicy::Reject);
        assert!(matches!(result, Err(InterchangeError::Malformed(_))));
    }

    #[test]
    fn parse_document_when_shared_counter_fixture_then_output_bound_to_access() {
        let text = lad2scl_test::read_shared_resource("counter.json");

        let networks = parse_document(&text, WireConflictPolicy::Reject).unwrap();
        let NetworkBody::Graph(graph) = &networks[0].body else {
            panic!("expected graph");
        };

        assert_eq!(networks[0].title.as_deref(), Some("Count pulses"));
        let counter = graph.part(&PartId::new("22")).unwrap();
        assert_eq!(counter.instance_name.as_deref(), Some("Counter"));
        assert_eq!(counter.version.as_deref(), Some("1.0"));
        let bound: Vec<&str> = graph
            .connections()
            .outputs_of(&counter.id)
            .map(|binding| binding.access.as_str())
            .collect();
        assert_eq!(bound, vec!["2"]);
    }
}
