//! Reconstructs the expression that drives a pin by walking the wiring
//! backwards from the pin to its ultimate sources.
//!
//! Resolution never fails. A dangling pin, a cycle or a part without an
//! expression equivalent degrades to [`Expression::Unresolved`] and is
//! reported as a diagnostic so that the rest of the network still converts.
//!
//! ## Example
//!
//! ```ignore
//! powerrail -> Contact(a) -> Contact(b) -> Coil(out)
//! ```
//!
//! Resolving the `in` pin of the coil yields `And([a, b])`.
use std::collections::HashSet;

use lazy_static::lazy_static;
use log::{debug, trace};
use regex::Regex;

use lad2scl_dsl::{
    core::{NetworkId, PartId, PinRef},
    diagnostic::{Diagnostic, Diagnostics, Label},
    expr::{Arg, Expression},
    graph::{Access, Connection, Graph, Part, Scope, SourceRef},
    kind::{EdgeForm, PartKind},
    signature::{BlockSignature, SignatureRegistry},
};
use lad2scl_problems::Problem;

use crate::extractor::{is_value_output, value_destination};

lazy_static! {
    static ref NUMBERED_INPUT: Regex = Regex::new(r"(?i)^in(\d+)$").unwrap();
}

/// Pins that never become call arguments.
const RESERVED_PINS: [&str; 7] = ["en", "eno", "out", "out1", "value", "ret_val", "retval"];

pub(crate) fn is_reserved_pin(pin: &str) -> bool {
    RESERVED_PINS.iter().any(|r| r.eq_ignore_ascii_case(pin))
}

/// The parts on the current resolution path.
///
/// A part is entered before its inputs are resolved and left afterwards,
/// so a part reached twice through fan-out is not mistaken for a cycle.
#[derive(Debug, Default)]
pub struct TraversalContext {
    path: HashSet<PartId>,
}

impl TraversalContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the part is already on the path.
    fn enter(&mut self, part: &PartId) -> bool {
        self.path.insert(part.clone())
    }

    fn leave(&mut self, part: &PartId) {
        self.path.remove(part);
    }
}

/// Converts literal text into an expression.
pub(crate) fn literal_expression(text: &str) -> Expression {
    if text.eq_ignore_ascii_case("TRUE") {
        Expression::Literal(true)
    } else if text.eq_ignore_ascii_case("FALSE") {
        Expression::Literal(false)
    } else {
        Expression::Constant(text.to_string())
    }
}

/// The symbol of a member of an instance, such as `#T1.Q`.
pub(crate) fn instance_member(instance: &str, member: &str) -> String {
    if instance.starts_with('"') || instance.starts_with('#') {
        format!("{}.{}", instance, member)
    } else {
        format!("#{}.{}", instance, member)
    }
}

/// Resolves pins of one network graph.
pub struct Resolver<'a> {
    graph: &'a Graph,
    registry: &'a SignatureRegistry,
    network: NetworkId,
    diagnostics: Diagnostics,
    reported: HashSet<(Problem, PartId)>,
}

impl<'a> Resolver<'a> {
    pub fn new(graph: &'a Graph, registry: &'a SignatureRegistry, network: NetworkId) -> Self {
        Self {
            graph,
            registry,
            network,
            diagnostics: Diagnostics::new(),
            reported: HashSet::new(),
        }
    }

    pub fn graph(&self) -> &'a Graph {
        self.graph
    }

    /// Reconstructs the expression driving the pin. Returns
    /// [`Expression::Unresolved`] when nothing drives the pin; substituting
    /// a contextual default is up to the caller.
    pub fn resolve(&mut self, pin: &PinRef) -> Expression {
        let mut ctx = TraversalContext::new();
        self.input(&mut ctx, &pin.part, &pin.pin)
            .unwrap_or(Expression::Unresolved)
    }

    /// Like [`Resolver::resolve`] but returns the default for an unwired pin.
    pub fn resolve_or(&mut self, part: &PartId, pin: &str, default: Expression) -> Expression {
        let mut ctx = TraversalContext::new();
        self.input(&mut ctx, part, pin).unwrap_or(default)
    }

    /// Like [`Resolver::resolve`] but reports an unwired pin.
    pub fn resolve_required(&mut self, part: &PartId, pin: &str) -> Expression {
        let mut ctx = TraversalContext::new();
        self.required_input(&mut ctx, part, pin)
    }

    /// The condition on the `en` pin of a part, `TRUE` when unwired.
    pub fn resolve_enable(&mut self, part: &PartId) -> Expression {
        self.resolve_or(part, "en", Expression::Literal(true))
    }

    /// Records a diagnostic once per problem and part.
    pub fn report(&mut self, problem: Problem, part: &PartId, message: impl Into<String>) {
        if self.reported.insert((problem, part.clone())) {
            self.diagnostics.push(Diagnostic::problem(
                problem,
                Label::part(self.network, part, message),
            ));
        }
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// Resolves a wired input pin. Returns `None` when the pin is unwired.
    fn input(&mut self, ctx: &mut TraversalContext, part: &PartId, pin: &str) -> Option<Expression> {
        let graph = self.graph;
        let (name, connection) = graph.connections().get_ignore_case(part, pin)?;
        trace!("Resolving {}.{}", part, name);
        match connection {
            Connection::Single(source) => Some(self.source(ctx, source, part)),
            Connection::Conflicting(sources) => {
                debug!(
                    "Pin {}.{} has {} sources, leaving unresolved",
                    part,
                    name,
                    sources.len()
                );
                Some(Expression::Unresolved)
            }
        }
    }

    fn required_input(&mut self, ctx: &mut TraversalContext, part: &PartId, pin: &str) -> Expression {
        match self.input(ctx, part, pin) {
            Some(expr) => expr,
            None => {
                self.report(
                    Problem::UnresolvedReference,
                    part,
                    format!("pin {} is not connected", pin),
                );
                Expression::Unresolved
            }
        }
    }

    fn enable_input(&mut self, ctx: &mut TraversalContext, part: &PartId) -> Expression {
        self.input(ctx, part, "en")
            .unwrap_or(Expression::Literal(true))
    }

    fn source(&mut self, ctx: &mut TraversalContext, source: &SourceRef, consumer: &PartId) -> Expression {
        let graph = self.graph;
        match source {
            SourceRef::PowerRail => Expression::Literal(true),
            SourceRef::FromAccess(id) => match graph.access(id) {
                Some(access) => access_expression(access),
                None => {
                    self.report(
                        Problem::UnresolvedReference,
                        consumer,
                        format!("access {} does not exist", id),
                    );
                    Expression::Unresolved
                }
            },
            SourceRef::FromPart(id, pin) => self.part_output(ctx, id, pin, consumer),
        }
    }

    fn part_output(
        &mut self,
        ctx: &mut TraversalContext,
        id: &PartId,
        pin: &str,
        consumer: &PartId,
    ) -> Expression {
        let graph = self.graph;
        let Some(part) = graph.part(id) else {
            self.report(
                Problem::UnresolvedReference,
                consumer,
                format!("part {} does not exist", id),
            );
            return Expression::Unresolved;
        };

        if !ctx.enter(id) {
            self.report(
                Problem::CycleDetected,
                id,
                format!("part {} is reached again through its own output", id),
            );
            return Expression::Unresolved;
        }

        let expr = if pin.eq_ignore_ascii_case("eno") {
            self.enable_input(ctx, id)
        } else {
            self.part_expression(ctx, part, pin)
        };

        ctx.leave(id);
        expr
    }

    fn part_expression(&mut self, ctx: &mut TraversalContext, part: &Part, pin: &str) -> Expression {
        let id = &part.id;
        match &part.kind {
            PartKind::Contact | PartKind::NegatedContact => {
                let power = self.input(ctx, id, "in").unwrap_or(Expression::Literal(true));
                if power.is_false() || power.is_unresolved() {
                    return power;
                }
                let operand = self.required_input(ctx, id, "operand");
                let operand = if part.kind == PartKind::NegatedContact || part.negated {
                    Expression::not(operand)
                } else {
                    operand
                };
                Expression::and_then(power, operand)
            }
            PartKind::Coil | PartKind::SetCoil | PartKind::ResetCoil => {
                self.input(ctx, id, "in").unwrap_or(Expression::Literal(false))
            }
            PartKind::OrBlock => {
                let mut terms = self.numbered_inputs(ctx, id);
                match terms.len() {
                    0 => {
                        self.report(Problem::UnresolvedInput, id, "branch has no inputs");
                        Expression::Unresolved
                    }
                    1 => terms.remove(0),
                    _ => Expression::Or(terms),
                }
            }
            PartKind::AndBlock => {
                let mut terms = self.numbered_inputs(ctx, id);
                match terms.len() {
                    0 => {
                        self.report(Problem::UnresolvedInput, id, "box has no inputs");
                        Expression::Unresolved
                    }
                    1 => terms.remove(0),
                    _ => Expression::And(terms),
                }
            }
            PartKind::NotBlock => Expression::not(self.required_input(ctx, id, "in")),
            PartKind::Comparator { op } => {
                let pre = self.input(ctx, id, "pre").unwrap_or(Expression::Literal(true));
                if pre.is_false() || pre.is_unresolved() {
                    return pre;
                }
                let left = self.required_input(ctx, id, "in1");
                let right = self.required_input(ctx, id, "in2");
                Expression::and_then(pre, Expression::compare(*op, left, right))
            }
            PartKind::ArithmeticOp { op } => {
                let terms = self.numbered_inputs(ctx, id);
                if terms.len() < 2 {
                    self.report(
                        Problem::UnresolvedInput,
                        id,
                        format!("{} needs two inputs", op.symbol()),
                    );
                    return Expression::Unresolved;
                }
                terms
                    .into_iter()
                    .reduce(|acc, term| Expression::arithmetic(*op, acc, term))
                    .unwrap_or(Expression::Unresolved)
            }
            PartKind::EdgeDetector { polarity, form } => match form {
                EdgeForm::Contact => {
                    let power = self.input(ctx, id, "in").unwrap_or(Expression::Literal(true));
                    if power.is_false() || power.is_unresolved() {
                        return power;
                    }
                    let edge = match &part.instance_name {
                        Some(instance) => Expression::var(instance_member(instance, "Q")),
                        None => {
                            let operand = self.required_input(ctx, id, "operand");
                            Expression::builtin(polarity.marker(), vec![Arg::Positional(operand)])
                        }
                    };
                    Expression::and_then(power, edge)
                }
                EdgeForm::Box => match &part.instance_name {
                    Some(instance) => Expression::var(instance_member(instance, "Q")),
                    None => {
                        let mut args = vec![Arg::Positional(self.required_input(ctx, id, "in"))];
                        if let Some(bit) = self.input(ctx, id, "bit") {
                            args.push(Arg::Positional(bit));
                        }
                        Expression::builtin(polarity.marker(), args)
                    }
                },
            },
            PartKind::MathFunction { name } => {
                let args = self.function_arguments(ctx, part, name);
                Expression::builtin(name.clone(), args)
            }
            PartKind::TypeConversion { from, to } => {
                let value = self.required_input(ctx, id, "in");
                let name = match (from, to) {
                    (Some(from), Some(to)) => {
                        format!("{}_TO_{}", from.to_ascii_uppercase(), to.to_ascii_uppercase())
                    }
                    _ => "CONVERT".to_string(),
                };
                Expression::builtin(name, vec![Arg::Positional(value)])
            }
            PartKind::Call { block_name } => match &part.instance_name {
                Some(instance) => Expression::var(instance_member(instance, pin)),
                None if value_destination(self.graph, part).is_some() => {
                    self.stored_call_output(part, block_name, pin)
                }
                None => {
                    let args = self
                        .call_inputs(ctx, part, block_name)
                        .into_iter()
                        .map(|(name, expr)| Arg::Named(name, expr))
                        .collect();
                    self.call_expression(block_name, args)
                }
            },
            PartKind::Move => self.required_input(ctx, id, "in"),
            PartKind::SrLatch { .. } => self.required_input(ctx, id, "operand"),
            PartKind::Jump { .. }
            | PartKind::Label
            | PartKind::Return
            | PartKind::Exit
            | PartKind::Continue => {
                self.report(
                    Problem::UnsupportedPartKind,
                    id,
                    format!("{} has no output", part.kind.describe()),
                );
                Expression::Unresolved
            }
            PartKind::Unsupported { name } => {
                self.report(
                    Problem::UnsupportedPartKind,
                    id,
                    format!("no conversion for {}", name),
                );
                Expression::Unresolved
            }
        }
    }

    /// Resolves the `in1`..`inN` pins that are wired, in numeric order.
    fn numbered_inputs(&mut self, ctx: &mut TraversalContext, part: &PartId) -> Vec<Expression> {
        let mut pins: Vec<(u32, String)> = self
            .graph
            .connections()
            .input_pins(part)
            .iter()
            .filter_map(|pin| {
                NUMBERED_INPUT
                    .captures(pin)
                    .and_then(|caps| caps[1].parse::<u32>().ok())
                    .map(|n| (n, pin.clone()))
            })
            .collect();
        pins.sort_by_key(|(n, _)| *n);

        pins.into_iter()
            .map(|(_, pin)| self.required_input(ctx, part, &pin))
            .collect()
    }

    /// Arguments of a standard function.
    ///
    /// A single `in` renders positionally and `LIMIT` orders its bounds
    /// around the value. Other arguments are named in upper case.
    fn function_arguments(&mut self, ctx: &mut TraversalContext, part: &Part, name: &str) -> Vec<Arg> {
        let pins: Vec<String> = self
            .graph
            .connections()
            .input_pins(&part.id)
            .iter()
            .filter(|pin| !is_reserved_pin(pin))
            .cloned()
            .collect();

        if name == "LIMIT" {
            return ["MN", "IN", "MX"]
                .iter()
                .filter_map(|bound| {
                    self.input(ctx, &part.id, bound)
                        .map(|expr| Arg::Named(bound.to_string(), expr))
                })
                .collect();
        }

        if pins.len() == 1 && pins[0].eq_ignore_ascii_case("in") {
            return vec![Arg::Positional(self.required_input(ctx, &part.id, &pins[0]))];
        }

        pins.iter()
            .map(|pin| {
                let expr = self.required_input(ctx, &part.id, pin);
                Arg::Named(pin.to_ascii_uppercase(), expr)
            })
            .collect()
    }

    /// Input bindings of a block call: declared parameters in signature
    /// order (wired value or default), then wired pins the signature does
    /// not declare in wire order. Unwired parameters without a default are
    /// left out.
    fn call_inputs(
        &mut self,
        ctx: &mut TraversalContext,
        part: &Part,
        block_type: &str,
    ) -> Vec<(String, Expression)> {
        let registry = self.registry;
        let graph = self.graph;
        let wired: Vec<String> = graph
            .connections()
            .input_pins(&part.id)
            .iter()
            .filter(|pin| !is_reserved_pin(pin))
            .cloned()
            .collect();

        let mut inputs = vec![];
        let signature: Option<&BlockSignature> = registry.get(block_type);
        if let Some(signature) = signature {
            for param in &signature.parameters {
                match wired.iter().find(|pin| pin.eq_ignore_ascii_case(&param.name)) {
                    Some(pin) => {
                        let expr = self.required_input(ctx, &part.id, pin);
                        inputs.push((pin.clone(), expr));
                    }
                    None => {
                        if let Some(default) = &param.default_literal {
                            trace!("Injecting default {} := {}", param.name, default);
                            inputs.push((param.name.clone(), literal_expression(default)));
                        }
                    }
                }
            }
        }

        for pin in &wired {
            let declared = signature.map_or(false, |s| s.parameter(pin).is_some());
            if !declared {
                let expr = self.required_input(ctx, &part.id, pin);
                inputs.push((pin.clone(), expr));
            }
        }
        inputs
    }

    /// Input bindings of a block call with a fresh traversal.
    pub fn resolve_call_inputs(&mut self, part: &Part, block_type: &str) -> Vec<(String, Expression)> {
        let mut ctx = TraversalContext::new();
        ctx.enter(&part.id);
        self.call_inputs(&mut ctx, part, block_type)
    }

    /// Arguments of a standard function with a fresh traversal.
    pub fn resolve_function_arguments(&mut self, part: &Part, name: &str) -> Vec<Arg> {
        let mut ctx = TraversalContext::new();
        ctx.enter(&part.id);
        self.function_arguments(&mut ctx, part, name)
    }

    /// The expression of an output pin of a part with a fresh traversal.
    pub fn resolve_output(&mut self, part: &Part, pin: &str) -> Expression {
        let mut ctx = TraversalContext::new();
        self.part_output(&mut ctx, &part.id, pin, &part.id)
    }

    /// An output of a stateless call that runs as a statement of its own.
    ///
    /// The call already wrote its outputs to variables, so the consumer
    /// reads the variable.
    fn stored_call_output(&mut self, part: &Part, block_type: &str, pin: &str) -> Expression {
        let graph = self.graph;
        let access = if is_value_output(pin) {
            value_destination(graph, part)
        } else {
            graph.connections().driven_accesses(&part.id, pin).next()
        };
        match access.and_then(|id| graph.access(id)) {
            Some(access) => access_expression(access),
            None => {
                self.report(
                    Problem::UnresolvedReference,
                    &part.id,
                    format!("output {} of {} is not stored in a variable", pin, block_type),
                );
                Expression::Unresolved
            }
        }
    }

    /// A call of a block. System blocks are not quoted.
    pub fn call_expression(&self, block_type: &str, args: Vec<Arg>) -> Expression {
        if self.registry.is_system(block_type) {
            Expression::builtin(block_type, args)
        } else {
            Expression::block(block_type, args)
        }
    }
}

fn access_expression(access: &Access) -> Expression {
    match access.scope {
        Scope::Constant => literal_expression(&access.symbol),
        Scope::Local | Scope::Global | Scope::Predefined => Expression::var(access.symbol.clone()),
    }
}
