//! Builders for networks used in tests.
use lad2scl_dsl::{
    core::{AccessId, NetworkId, PinRef},
    graph::{Access, Graph, Network, Part, Scope, SourceRef, Wire, WireTarget},
    kind::PartKind,
    options::WireConflictPolicy,
};

#[ctor::ctor]
fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Builds a network graph one part and wire at a time.
///
/// Every variable or constant wired to a pin gets its own access.
#[derive(Default)]
pub struct NetworkBuilder {
    parts: Vec<Part>,
    accesses: Vec<Access>,
    wires: Vec<Wire>,
    policy: WireConflictPolicy,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: WireConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn add(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    pub fn part(self, id: &str, kind: PartKind) -> Self {
        self.add(Part::new(id, kind))
    }

    pub fn contact(self, id: &str, symbol: &str) -> Self {
        self.part(id, PartKind::Contact).variable(id, "operand", symbol)
    }

    pub fn negated_contact(self, id: &str, symbol: &str) -> Self {
        self.add(Part::new(id, PartKind::NegatedContact).with_negated(true))
            .variable(id, "operand", symbol)
    }

    pub fn coil(self, id: &str, symbol: &str) -> Self {
        self.part(id, PartKind::Coil).variable(id, "operand", symbol)
    }

    /// Wires the power rail to a pin.
    pub fn rail(mut self, part: &str, pin: &str) -> Self {
        self.wires.push(Wire::new(
            SourceRef::PowerRail,
            vec![WireTarget::Pin(PinRef::new(part, pin))],
        ));
        self
    }

    /// Wires an output pin of one part to an input pin of another.
    pub fn link(mut self, from: &str, from_pin: &str, to: &str, to_pin: &str) -> Self {
        self.wires.push(Wire::new(
            SourceRef::FromPart(from.into(), from_pin.to_string()),
            vec![WireTarget::Pin(PinRef::new(to, to_pin))],
        ));
        self
    }

    /// Wires a variable to an input pin.
    pub fn variable(self, part: &str, pin: &str, symbol: &str) -> Self {
        self.access_to_pin(part, pin, Scope::Local, symbol)
    }

    /// Wires a literal to an input pin.
    pub fn constant(self, part: &str, pin: &str, text: &str) -> Self {
        self.access_to_pin(part, pin, Scope::Constant, text)
    }

    /// Wires an output pin to a variable.
    pub fn output(mut self, part: &str, pin: &str, symbol: &str) -> Self {
        let id = self.next_access(Scope::Local, symbol);
        self.wires.push(Wire::new(
            SourceRef::FromPart(part.into(), pin.to_string()),
            vec![WireTarget::Access(id)],
        ));
        self
    }

    pub fn build(self) -> Graph {
        Graph::new(self.parts, self.accesses, self.wires, self.policy)
    }

    pub fn network(self, id: usize) -> Network {
        Network::graph(NetworkId(id), self.build())
    }

    fn access_to_pin(mut self, part: &str, pin: &str, scope: Scope, symbol: &str) -> Self {
        let id = self.next_access(scope, symbol);
        self.wires.push(Wire::new(
            SourceRef::FromAccess(id),
            vec![WireTarget::Pin(PinRef::new(part, pin))],
        ));
        self
    }

    fn next_access(&mut self, scope: Scope, symbol: &str) -> AccessId {
        let id = AccessId::new(format!("acc{}", self.accesses.len() + 1));
        self.accesses.push(Access::new(id.clone(), scope, symbol));
        id
    }
}
