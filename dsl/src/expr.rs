//! The expression tree reconstructed from the wiring that drives a pin.
//!
//! Expressions are built fresh for each resolution and are serialized to
//! text only at the emitter boundary, so precedence is decided in exactly
//! one place.
use crate::kind::{ArithmeticOp, CompareOp};

/// Who is being called by a [`Expression::Call`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Callee {
    /// A built-in function or marker rendered without quotes (`ABS`,
    /// `INT_TO_REAL`, `PosEdge`).
    Builtin(String),
    /// A user or library block rendered with quotes (`"Scale"`).
    Block(String),
}

impl Callee {
    pub fn name(&self) -> &str {
        match self {
            Callee::Builtin(name) => name,
            Callee::Block(name) => name,
        }
    }
}

/// An argument in a call.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Arg {
    Positional(Expression),
    /// An input binding `name := expr`.
    Named(String, Expression),
    /// An output binding `name => symbol`.
    Output(String, String),
}

impl Arg {
    pub fn expression(&self) -> Option<&Expression> {
        match self {
            Arg::Positional(expr) | Arg::Named(_, expr) => Some(expr),
            Arg::Output(_, _) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expression {
    Literal(bool),
    /// A non-boolean literal such as `0` or `T#5s`.
    Constant(String),
    /// A variable reference. The symbol is emitted as written.
    VarRef(String),
    Not(Box<Expression>),
    And(Vec<Expression>),
    Or(Vec<Expression>),
    Compare {
        op: CompareOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Arithmetic {
        op: ArithmeticOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Call {
        callee: Callee,
        args: Vec<Arg>,
    },
    /// Nothing could be reconstructed. Never coerced to a boolean.
    Unresolved,
}

impl Expression {
    pub fn var(symbol: impl Into<String>) -> Self {
        Expression::VarRef(symbol.into())
    }

    pub fn not(expr: Expression) -> Self {
        Expression::Not(Box::new(expr))
    }

    pub fn compare(op: CompareOp, left: Expression, right: Expression) -> Self {
        Expression::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn arithmetic(op: ArithmeticOp, left: Expression, right: Expression) -> Self {
        Expression::Arithmetic {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn builtin(name: impl Into<String>, args: Vec<Arg>) -> Self {
        Expression::Call {
            callee: Callee::Builtin(name.into()),
            args,
        }
    }

    pub fn block(name: impl Into<String>, args: Vec<Arg>) -> Self {
        Expression::Call {
            callee: Callee::Block(name.into()),
            args,
        }
    }

    /// Conjunction of two terms where a literal `TRUE` on the left is
    /// dropped. Nested conjunctions are not flattened.
    pub fn and_then(lhs: Expression, rhs: Expression) -> Self {
        if lhs.is_true() {
            rhs
        } else {
            Expression::And(vec![lhs, rhs])
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Expression::Literal(true))
    }

    pub fn is_false(&self) -> bool {
        matches!(self, Expression::Literal(false))
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Expression::Unresolved)
    }

    /// Whether the marker appears anywhere in the tree.
    pub fn contains_unresolved(&self) -> bool {
        match self {
            Expression::Unresolved => true,
            Expression::Literal(_) | Expression::Constant(_) | Expression::VarRef(_) => false,
            Expression::Not(inner) => inner.contains_unresolved(),
            Expression::And(terms) | Expression::Or(terms) => {
                terms.iter().any(Expression::contains_unresolved)
            }
            Expression::Compare { left, right, .. } | Expression::Arithmetic { left, right, .. } => {
                left.contains_unresolved() || right.contains_unresolved()
            }
            Expression::Call { args, .. } => args
                .iter()
                .filter_map(Arg::expression)
                .any(Expression::contains_unresolved),
        }
    }
}
