//! Classifies the effectful parts of a network into a list of operations.
//!
//! Parts are visited once, in the order the graph enumerates them, and the
//! resulting operations keep that order. Parts that only feed another
//! part's expression produce no operation.
use std::collections::HashSet;

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use lad2scl_dsl::{
    core::{AccessId, PinRef},
    expr::{Arg, Expression},
    graph::{Graph, Part},
    kind::PartKind,
    operation::Operation,
};
use lad2scl_problems::Problem;

use crate::resolver::Resolver;

lazy_static! {
    static ref MOVE_OUTPUT: Regex = Regex::new(r"(?i)^out\d*$").unwrap();
}

/// Output pins that carry the value of a value-producing part.
const VALUE_OUTPUTS: [&str; 5] = ["out", "out1", "value", "ret_val", "retval"];

pub(crate) fn is_value_output(pin: &str) -> bool {
    VALUE_OUTPUTS.iter().any(|v| v.eq_ignore_ascii_case(pin))
}

/// The variable written by the value output of a part, if any.
pub(crate) fn value_destination<'g>(graph: &'g Graph, part: &Part) -> Option<&'g AccessId> {
    graph
        .connections()
        .outputs_of(&part.id)
        .find(|binding| is_value_output(&binding.source.pin))
        .map(|binding| &binding.access)
}

/// Extracts the operations of the network the resolver walks.
pub fn extract(resolver: &mut Resolver) -> Vec<Operation> {
    let graph = resolver.graph();
    let mut operations = vec![];
    for part in graph.parts() {
        operations.extend(extract_part(resolver, part));
    }
    dedup(operations)
}

/// Drops operations equal to an earlier one, keeping the first.
pub fn dedup(operations: Vec<Operation>) -> Vec<Operation> {
    let mut seen = HashSet::new();
    operations
        .into_iter()
        .filter(|op| {
            let fresh = seen.insert(op.clone());
            if !fresh {
                debug!(
                    "Dropping duplicate {} operation on {}",
                    op.kind_name(),
                    op.target().unwrap_or("-")
                );
            }
            fresh
        })
        .collect()
}

fn extract_part(resolver: &mut Resolver, part: &Part) -> Vec<Operation> {
    let id = &part.id;
    match &part.kind {
        PartKind::Coil => {
            let Some(var) = operand_symbol(resolver, part) else {
                return vec![];
            };
            let expr = resolver.resolve_or(id, "in", Expression::Literal(false));
            let expr = if part.negated {
                Expression::not(expr)
            } else {
                expr
            };
            vec![Operation::Assign { var, expr }]
        }
        PartKind::SetCoil | PartKind::ResetCoil => {
            let Some(var) = operand_symbol(resolver, part) else {
                return vec![];
            };
            let cond = resolver.resolve_or(id, "in", Expression::Literal(false));
            if part.kind == PartKind::SetCoil {
                vec![Operation::Set { var, cond }]
            } else {
                vec![Operation::Reset { var, cond }]
            }
        }
        PartKind::SrLatch { variant } => {
            let Some(var) = operand_symbol(resolver, part) else {
                return vec![];
            };
            let set = first_wired(resolver, part, &["S", "S1"]);
            let reset = first_wired(resolver, part, &["R", "R1"]);
            vec![Operation::SrLatch {
                var,
                set,
                reset,
                dominant: variant.dominance(),
            }]
        }
        PartKind::Move => {
            let graph = resolver.graph();
            let destinations: Vec<String> = graph
                .connections()
                .outputs_of(id)
                .filter(|binding| MOVE_OUTPUT.is_match(&binding.source.pin))
                .filter_map(|binding| graph.access(&binding.access))
                .map(|access| access.symbol.clone())
                .collect();
            if destinations.is_empty() {
                return vec![];
            }

            let enable = enable(resolver, part);
            let src = resolver.resolve_required(id, "in");
            destinations
                .into_iter()
                .map(|dest| Operation::Move {
                    dest,
                    src: src.clone(),
                    enable: enable.clone(),
                })
                .collect()
        }
        PartKind::MathFunction { name } if part.kind.is_void_function() => {
            let enable = enable(resolver, part);
            let args = resolver.resolve_function_arguments(part, name);
            vec![Operation::InstrCall {
                expr: Expression::builtin(name.clone(), args),
                enable,
            }]
        }
        PartKind::MathFunction { .. }
        | PartKind::ArithmeticOp { .. }
        | PartKind::AndBlock
        | PartKind::OrBlock
        | PartKind::NotBlock
        | PartKind::Comparator { .. }
        | PartKind::TypeConversion { .. } => {
            let Some(var) = value_destination(resolver.graph(), part).and_then(|id| symbol(resolver, id))
            else {
                return vec![];
            };
            let enable = enable(resolver, part);
            let expr = resolver.resolve_output(part, "out");
            vec![Operation::InstrAssign { var, expr, enable }]
        }
        PartKind::Call { block_name } => {
            if part.instance_name.is_some() {
                return vec![];
            }
            let Some(var) = value_destination(resolver.graph(), part).and_then(|id| symbol(resolver, id))
            else {
                return vec![];
            };
            let enable = enable(resolver, part);

            let mut args: Vec<Arg> = resolver
                .resolve_call_inputs(part, block_name)
                .into_iter()
                .map(|(name, expr)| Arg::Named(name, expr))
                .collect();
            let graph = resolver.graph();
            args.extend(
                graph
                    .connections()
                    .outputs_of(id)
                    .filter(|binding| {
                        !is_value_output(&binding.source.pin)
                            && !binding.source.pin.eq_ignore_ascii_case("eno")
                    })
                    .filter_map(|binding| {
                        graph
                            .access(&binding.access)
                            .map(|access| Arg::Output(binding.source.pin.clone(), access.symbol.clone()))
                    }),
            );

            let expr = resolver.call_expression(block_name, args);
            vec![Operation::InstrAssign { var, expr, enable }]
        }
        PartKind::Jump { if_not } => {
            let Some(target_label) = part.template("Target").map(str::to_string) else {
                resolver.report(Problem::MissingJumpTarget, id, "jump has no Target");
                return vec![];
            };
            let cond = condition(resolver, part);
            vec![Operation::Jump {
                target_label,
                cond,
                negated: *if_not,
            }]
        }
        PartKind::Label => match part.template("Name") {
            Some(name) => vec![Operation::Label {
                name: name.to_string(),
            }],
            None => {
                resolver.report(Problem::MissingLabelName, id, "label has no Name");
                vec![]
            }
        },
        PartKind::Return => vec![Operation::Return {
            cond: condition(resolver, part),
        }],
        PartKind::Exit => vec![Operation::Exit {
            cond: condition(resolver, part),
        }],
        PartKind::Continue => vec![Operation::Continue {
            cond: condition(resolver, part),
        }],
        PartKind::Unsupported { name } => {
            resolver.report(
                Problem::UnsupportedPartKind,
                id,
                format!("no conversion for {}", name),
            );
            vec![]
        }
        PartKind::Contact | PartKind::NegatedContact | PartKind::EdgeDetector { .. } => vec![],
    }
}

fn symbol(resolver: &Resolver, id: &AccessId) -> Option<String> {
    resolver.graph().access(id).map(|access| access.symbol.clone())
}

/// The variable on the `operand` pin of a coil-like part.
fn operand_symbol(resolver: &mut Resolver, part: &Part) -> Option<String> {
    match resolver.resolve(&PinRef::new(&part.id, "operand")) {
        Expression::VarRef(symbol) => Some(symbol),
        _ => {
            resolver.report(
                Problem::MissingOperand,
                &part.id,
                format!("{} has no variable", part.kind.describe()),
            );
            None
        }
    }
}

fn first_wired(resolver: &mut Resolver, part: &Part, pins: &[&str]) -> Expression {
    let graph = resolver.graph();
    let wired = pins.iter().find(|pin| {
        graph
            .connections()
            .get_ignore_case(&part.id, pin)
            .is_some()
    });
    match wired {
        Some(pin) => resolver.resolve_or(&part.id, pin, Expression::Literal(false)),
        None => Expression::Literal(false),
    }
}

/// The enable of a part. An enable that cannot be reconstructed is
/// reported because the statement it guards will be skipped.
fn enable(resolver: &mut Resolver, part: &Part) -> Expression {
    let enable = resolver.resolve_enable(&part.id);
    if enable.contains_unresolved() {
        resolver.report(
            Problem::UnresolvedEnable,
            &part.id,
            format!("{} will not be emitted", part.kind.describe()),
        );
    }
    enable
}

/// The condition of a control-flow part, read from `en` or else `in`.
fn condition(resolver: &mut Resolver, part: &Part) -> Expression {
    let graph = resolver.graph();
    let pin = if graph.connections().get_ignore_case(&part.id, "en").is_some() {
        "en"
    } else {
        "in"
    };
    let cond = resolver.resolve_or(&part.id, pin, Expression::Literal(true));
    if cond.contains_unresolved() {
        resolver.report(
            Problem::UnresolvedEnable,
            &part.id,
            format!("{} will not be emitted", part.kind.describe()),
        );
    }
    cond
}
