//! Normalized effect records extracted from a network and the call records
//! for blocks invoked by the network.
use crate::expr::Expression;
use crate::kind::Dominance;

/// An effect of a network, in the order the network's parts were scanned.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `var := expr;`
    Assign { var: String, expr: Expression },
    /// `IF cond THEN var := TRUE; END_IF;`
    Set { var: String, cond: Expression },
    /// `IF cond THEN var := FALSE; END_IF;`
    Reset { var: String, cond: Expression },
    SrLatch {
        var: String,
        set: Expression,
        reset: Expression,
        dominant: Dominance,
    },
    Move {
        dest: String,
        src: Expression,
        enable: Expression,
    },
    /// A value-producing instruction whose result is written to a variable.
    InstrAssign {
        var: String,
        expr: Expression,
        enable: Expression,
    },
    /// An instruction called for its side effects.
    InstrCall { expr: Expression, enable: Expression },
    Jump {
        target_label: String,
        cond: Expression,
        /// Jump when the condition is false.
        negated: bool,
    },
    Label { name: String },
    Return { cond: Expression },
    Exit { cond: Expression },
    Continue { cond: Expression },
}

impl Operation {
    /// The short name of the variant, used in logs and diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Operation::Assign { .. } => "assign",
            Operation::Set { .. } => "set",
            Operation::Reset { .. } => "reset",
            Operation::SrLatch { .. } => "sr_latch",
            Operation::Move { .. } => "move",
            Operation::InstrAssign { .. } => "instr_assign",
            Operation::InstrCall { .. } => "instr_call",
            Operation::Jump { .. } => "jump",
            Operation::Label { .. } => "label",
            Operation::Return { .. } => "return",
            Operation::Exit { .. } => "exit",
            Operation::Continue { .. } => "continue",
        }
    }

    /// The variable (or label) the operation writes or names, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            Operation::Assign { var, .. }
            | Operation::Set { var, .. }
            | Operation::Reset { var, .. }
            | Operation::SrLatch { var, .. }
            | Operation::InstrAssign { var, .. } => Some(var),
            Operation::Move { dest, .. } => Some(dest),
            Operation::Jump { target_label, .. } => Some(target_label),
            Operation::Label { name } => Some(name),
            Operation::InstrCall { .. }
            | Operation::Return { .. }
            | Operation::Exit { .. }
            | Operation::Continue { .. } => None,
        }
    }
}

/// A call to a block, rendered as a call statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FbCall {
    /// The instance data of a function block. Absent for stateless calls.
    pub instance_name: Option<String>,
    pub block_type: String,
    pub version: Option<String>,
    /// Condition wired to the `en` pin; `TRUE` when unwired.
    pub enable: Expression,
    /// `name := expr` bindings in parameter order.
    pub resolved_inputs: Vec<(String, Expression)>,
    /// `name => symbol` bindings in wire order.
    pub resolved_outputs: Vec<(String, String)>,
}

impl FbCall {
    /// The name written before the argument list.
    pub fn call_name(&self) -> &str {
        self.instance_name.as_deref().unwrap_or(&self.block_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_when_move_then_destination() {
        let op = Operation::Move {
            dest: "b".to_string(),
            src: Expression::var("a"),
            enable: Expression::Literal(true),
        };
        assert_eq!(op.target(), Some("b"));
        assert_eq!(op.kind_name(), "move");
    }

    #[test]
    fn call_name_when_no_instance_then_block_type() {
        let call = FbCall {
            instance_name: None,
            block_type: "Scale".to_string(),
            version: None,
            enable: Expression::Literal(true),
            resolved_inputs: vec![],
            resolved_outputs: vec![],
        };
        assert_eq!(call.call_name(), "Scale");
    }
}
