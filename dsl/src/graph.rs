//! The graph model of one compiled network: parts, accesses and the index
//! of which source drives each input pin.
//!
//! A graph is built once from the loader's output and is never mutated
//! afterwards, so it can be shared freely between threads.
use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::core::{AccessId, NetworkId, PartId, PinRef};
use crate::kind::PartKind;
use crate::options::WireConflictPolicy;

/// A graph node: operator, contact, coil, call or control-flow primitive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Part {
    pub id: PartId,
    pub kind: PartKind,
    /// Set for contact-like parts whose operand is inverted.
    pub negated: bool,
    /// Instance of a stateful block (timer, counter, edge trigger).
    pub instance_name: Option<String>,
    /// Version of the called block, if the tool recorded one.
    pub version: Option<String>,
    /// Structural parameters such as jump targets or conversion types.
    pub template_params: BTreeMap<String, String>,
}

impl Part {
    pub fn new(id: impl Into<PartId>, kind: PartKind) -> Self {
        Self {
            id: id.into(),
            kind,
            negated: false,
            instance_name: None,
            version: None,
            template_params: BTreeMap::new(),
        }
    }

    pub fn with_negated(mut self, negated: bool) -> Self {
        self.negated = negated;
        self
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance_name = Some(instance.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_template(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.template_params.insert(name.into(), value.into());
        self
    }

    pub fn template(&self, name: &str) -> Option<&str> {
        self.template_params.get(name).map(|v| v.as_str())
    }
}

/// Where the referenced variable or literal lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    Local,
    Global,
    Constant,
    Predefined,
}

/// A leaf node referring to a variable or a literal value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Access {
    pub id: AccessId,
    pub scope: Scope,
    /// Fully resolved text: dotted for members, bracketed for indices.
    pub symbol: String,
}

impl Access {
    pub fn new(id: impl Into<AccessId>, scope: Scope, symbol: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            scope,
            symbol: symbol.into(),
        }
    }
}

/// What drives a destination pin.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SourceRef {
    /// The left rail; an implicit boolean TRUE at the start of a rung.
    PowerRail,
    FromAccess(AccessId),
    FromPart(PartId, String),
}

/// Where a wire ends.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum WireTarget {
    /// An input pin of a part.
    Pin(PinRef),
    /// A variable that receives the value of an output pin.
    Access(AccessId),
}

/// A directed connection from one source to one or more targets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wire {
    pub source: SourceRef,
    pub targets: Vec<WireTarget>,
}

impl Wire {
    pub fn new(source: SourceRef, targets: Vec<WireTarget>) -> Self {
        Self { source, targets }
    }
}

/// The source recorded for an input pin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Connection {
    Single(SourceRef),
    /// More than one wire targets the pin, in wire order.
    Conflicting(Vec<SourceRef>),
}

impl Connection {
    fn sources(&self) -> impl Iterator<Item = &SourceRef> {
        let sources: Vec<&SourceRef> = match self {
            Connection::Single(source) => vec![source],
            Connection::Conflicting(sources) => sources.iter().collect(),
        };
        sources.into_iter()
    }
}

/// A binding of a part output pin to the variable it writes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputBinding {
    pub source: PinRef,
    pub access: AccessId,
}

/// Maps `(destination part, destination pin)` to the driving source.
#[derive(Clone, Debug, Default)]
pub struct ConnectionIndex {
    inputs: HashMap<PinRef, Connection>,
    pin_order: HashMap<PartId, Vec<String>>,
    outputs: Vec<OutputBinding>,
    conflicts: Vec<PinRef>,
}

impl ConnectionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one wire target.
    pub fn connect(&mut self, source: SourceRef, target: WireTarget, policy: WireConflictPolicy) {
        match target {
            WireTarget::Access(access) => match source {
                SourceRef::FromPart(part, pin) => self.outputs.push(OutputBinding {
                    source: PinRef::new(part, pin),
                    access,
                }),
                other => debug!("Ignoring wire from {:?} into access {}", other, access),
            },
            WireTarget::Pin(pin) => match self.inputs.get_mut(&pin) {
                None => {
                    self.pin_order
                        .entry(pin.part.clone())
                        .or_default()
                        .push(pin.pin.clone());
                    self.inputs.insert(pin, Connection::Single(source));
                }
                Some(existing) => {
                    if !self.conflicts.contains(&pin) {
                        self.conflicts.push(pin.clone());
                    }
                    *existing = match (policy, existing.clone()) {
                        (WireConflictPolicy::LastWins, _) => Connection::Single(source),
                        (WireConflictPolicy::Reject, Connection::Single(first)) => {
                            Connection::Conflicting(vec![first, source])
                        }
                        (WireConflictPolicy::Reject, Connection::Conflicting(mut all)) => {
                            all.push(source);
                            Connection::Conflicting(all)
                        }
                    };
                }
            },
        }
    }

    pub fn get(&self, pin: &PinRef) -> Option<&Connection> {
        self.inputs.get(pin)
    }

    /// Looks up a pin ignoring the case of the pin name.
    pub fn get_ignore_case(&self, part: &PartId, pin: &str) -> Option<(&str, &Connection)> {
        self.input_pins(part)
            .iter()
            .find(|name| name.eq_ignore_ascii_case(pin))
            .and_then(|name| {
                self.inputs
                    .get(&PinRef::new(part, name.as_str()))
                    .map(|connection| (name.as_str(), connection))
            })
    }

    /// The wired input pins of a part in the order the wires were supplied.
    pub fn input_pins(&self, part: &PartId) -> &[String] {
        self.pin_order
            .get(part)
            .map(|pins| pins.as_slice())
            .unwrap_or(&[])
    }

    /// Variables written by the output pin of a part (pin matched ignoring case).
    pub fn driven_accesses<'a>(
        &'a self,
        part: &PartId,
        pin: &str,
    ) -> impl Iterator<Item = &'a AccessId> + 'a {
        let part = part.clone();
        let pin = pin.to_string();
        self.outputs
            .iter()
            .filter(move |o| o.source.part == part && o.source.pin.eq_ignore_ascii_case(&pin))
            .map(|o| &o.access)
    }

    /// All output bindings of a part in wire order.
    pub fn outputs_of<'a>(&'a self, part: &PartId) -> impl Iterator<Item = &'a OutputBinding> + 'a {
        let part = part.clone();
        self.outputs.iter().filter(move |o| o.source.part == part)
    }

    /// Whether any output of the part drives an input pin of another part.
    pub fn feeds_parts(&self, part: &PartId) -> bool {
        self.inputs.values().any(|connection| {
            connection
                .sources()
                .any(|source| matches!(source, SourceRef::FromPart(id, _) if id == part))
        })
    }

    /// Pins that more than one wire targets, in the order the conflicts were seen.
    pub fn conflicts(&self) -> &[PinRef] {
        &self.conflicts
    }
}

/// The immutable graph of one network.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    parts: Vec<Part>,
    part_index: HashMap<PartId, usize>,
    accesses: HashMap<AccessId, Access>,
    connections: ConnectionIndex,
}

impl Graph {
    pub fn new(
        parts: Vec<Part>,
        accesses: Vec<Access>,
        wires: Vec<Wire>,
        policy: WireConflictPolicy,
    ) -> Self {
        let part_index = parts
            .iter()
            .enumerate()
            .map(|(idx, part)| (part.id.clone(), idx))
            .collect();
        let accesses = accesses
            .into_iter()
            .map(|access| (access.id.clone(), access))
            .collect();

        let mut connections = ConnectionIndex::new();
        for wire in wires {
            for target in wire.targets {
                connections.connect(wire.source.clone(), target, policy);
            }
        }

        Self {
            parts,
            part_index,
            accesses,
            connections,
        }
    }

    /// Parts in the order the loader enumerated them.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn part(&self, id: &PartId) -> Option<&Part> {
        self.part_index.get(id).map(|idx| &self.parts[*idx])
    }

    pub fn access(&self, id: &AccessId) -> Option<&Access> {
        self.accesses.get(id)
    }

    pub fn connections(&self) -> &ConnectionIndex {
        &self.connections
    }
}

/// The content of a network.
#[derive(Clone, Debug)]
pub enum NetworkBody {
    /// A graphical network.
    Graph(Graph),
    /// A network already written as structured text.
    Text(String),
}

/// One self-contained logic diagram.
#[derive(Clone, Debug)]
pub struct Network {
    pub id: NetworkId,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub body: NetworkBody,
}

impl Network {
    pub fn graph(id: NetworkId, graph: Graph) -> Self {
        Self {
            id,
            title: None,
            comment: None,
            body: NetworkBody::Graph(graph),
        }
    }

    pub fn text(id: NetworkId, code: impl Into<String>) -> Self {
        Self {
            id,
            title: None,
            comment: None,
            body: NetworkBody::Text(code.into()),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin(part: &str, pin: &str) -> WireTarget {
        WireTarget::Pin(PinRef::new(part, pin))
    }

    #[test]
    fn connect_when_fan_out_then_each_target_has_source() {
        let graph = Graph::new(
            vec![Part::new("1", PartKind::Contact), Part::new("2", PartKind::Contact)],
            vec![],
            vec![Wire::new(SourceRef::PowerRail, vec![pin("1", "in"), pin("2", "in")])],
            WireConflictPolicy::Reject,
        );

        let connections = graph.connections();
        assert_eq!(
            connections.get(&PinRef::new("1", "in")),
            Some(&Connection::Single(SourceRef::PowerRail))
        );
        assert_eq!(
            connections.get(&PinRef::new("2", "in")),
            Some(&Connection::Single(SourceRef::PowerRail))
        );
        assert!(connections.conflicts().is_empty());
    }

    #[test]
    fn connect_when_two_wires_and_reject_then_conflicting() {
        let mut index = ConnectionIndex::new();
        index.connect(SourceRef::PowerRail, pin("1", "in"), WireConflictPolicy::Reject);
        index.connect(
            SourceRef::FromAccess(AccessId::new("9")),
            pin("1", "in"),
            WireConflictPolicy::Reject,
        );

        assert!(matches!(
            index.get(&PinRef::new("1", "in")),
            Some(Connection::Conflicting(sources)) if sources.len() == 2
        ));
        assert_eq!(index.conflicts(), &[PinRef::new("1", "in")]);
    }

    #[test]
    fn connect_when_two_wires_and_last_wins_then_second_source() {
        let mut index = ConnectionIndex::new();
        index.connect(SourceRef::PowerRail, pin("1", "in"), WireConflictPolicy::LastWins);
        index.connect(
            SourceRef::FromAccess(AccessId::new("9")),
            pin("1", "in"),
            WireConflictPolicy::LastWins,
        );

        assert_eq!(
            index.get(&PinRef::new("1", "in")),
            Some(&Connection::Single(SourceRef::FromAccess(AccessId::new("9"))))
        );
        assert_eq!(index.conflicts().len(), 1);
    }

    #[test]
    fn input_pins_when_wired_then_in_wire_order() {
        let mut index = ConnectionIndex::new();
        index.connect(SourceRef::PowerRail, pin("5", "in2"), WireConflictPolicy::Reject);
        index.connect(SourceRef::PowerRail, pin("5", "in1"), WireConflictPolicy::Reject);

        assert_eq!(index.input_pins(&PartId::new("5")), &["in2", "in1"]);
    }

    #[test]
    fn driven_accesses_when_output_wired_then_ignores_pin_case() {
        let mut index = ConnectionIndex::new();
        index.connect(
            SourceRef::FromPart(PartId::new("3"), "OUT1".to_string()),
            WireTarget::Access(AccessId::new("8")),
            WireConflictPolicy::Reject,
        );

        let part = PartId::new("3");
        let driven: Vec<_> = index.driven_accesses(&part, "out1").collect();
        assert_eq!(driven, vec![&AccessId::new("8")]);
    }

    #[test]
    fn outputs_of_when_queried_with_temporary_id_then_binding_outlives_id() {
        let mut index = ConnectionIndex::new();
        index.connect(
            SourceRef::FromPart(PartId::new("3"), "out".to_string()),
            WireTarget::Access(AccessId::new("8")),
            WireConflictPolicy::Reject,
        );

        let binding = {
            let id = PartId::new("3");
            index.outputs_of(&id).next()
        };
        let access = {
            let id = PartId::new("3");
            index.driven_accesses(&id, "OUT").next()
        };

        assert_eq!(binding.map(|b| &b.access), Some(&AccessId::new("8")));
        assert_eq!(access, Some(&AccessId::new("8")));
    }

    #[test]
    fn feeds_parts_when_output_drives_input_then_true() {
        let mut index = ConnectionIndex::new();
        index.connect(
            SourceRef::FromPart(PartId::new("3"), "out".to_string()),
            pin("4", "in"),
            WireConflictPolicy::Reject,
        );

        assert!(index.feeds_parts(&PartId::new("3")));
        assert!(!index.feeds_parts(&PartId::new("4")));
    }
}
