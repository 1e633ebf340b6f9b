//! Serializes expressions to structured text with minimal parentheses.
//!
//! Each expression has a precedence level. A child is parenthesized only
//! when its level is lower than the level its parent requires.
//!
//! | Expression         | Level |
//! |--------------------|-------|
//! | `OR`               | 0     |
//! | `AND`              | 1     |
//! | `NOT`              | 2     |
//! | comparison         | 3     |
//! | leaf, call, `(a + b)` | 4  |
use dsl::expr::{Arg, Callee, Expression};

const OR: u8 = 0;
const AND: u8 = 1;
const NOT: u8 = 2;
const COMPARE: u8 = 3;
const LEAF: u8 = 4;

fn level(expr: &Expression) -> u8 {
    match expr {
        Expression::Or(_) => OR,
        Expression::And(_) => AND,
        Expression::Not(_) => NOT,
        Expression::Compare { .. } => COMPARE,
        Expression::Literal(_)
        | Expression::Constant(_)
        | Expression::VarRef(_)
        | Expression::Arithmetic { .. }
        | Expression::Call { .. }
        | Expression::Unresolved => LEAF,
    }
}

/// Renders an expression. `Unresolved` renders as the marker.
pub fn render(expr: &Expression, marker: &str) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr, OR, marker);
    out
}

fn write_expr(out: &mut String, expr: &Expression, required: u8, marker: &str) {
    let wrap = level(expr) < required;
    if wrap {
        out.push('(');
    }

    match expr {
        Expression::Literal(true) => out.push_str("TRUE"),
        Expression::Literal(false) => out.push_str("FALSE"),
        Expression::Constant(text) | Expression::VarRef(text) => out.push_str(text),
        Expression::Unresolved => out.push_str(marker),
        Expression::Not(inner) => {
            out.push_str("NOT (");
            write_expr(out, inner, OR, marker);
            out.push(')');
        }
        Expression::And(terms) => write_joined(out, terms, " AND ", AND, marker),
        Expression::Or(terms) => write_joined(out, terms, " OR ", OR, marker),
        Expression::Compare { op, left, right } => {
            write_expr(out, left, LEAF, marker);
            out.push(' ');
            out.push_str(op.symbol());
            out.push(' ');
            write_expr(out, right, LEAF, marker);
        }
        Expression::Arithmetic { op, left, right } => {
            out.push('(');
            write_expr(out, left, LEAF, marker);
            out.push(' ');
            out.push_str(op.symbol());
            out.push(' ');
            write_expr(out, right, LEAF, marker);
            out.push(')');
        }
        Expression::Call { callee, args } => {
            match callee {
                Callee::Builtin(name) => out.push_str(name),
                Callee::Block(name) => {
                    out.push('"');
                    out.push_str(name);
                    out.push('"');
                }
            }
            out.push('(');
            for (idx, arg) in args.iter().enumerate() {
                if idx > 0 {
                    out.push_str(", ");
                }
                write_arg(out, arg, marker);
            }
            out.push(')');
        }
    }

    if wrap {
        out.push(')');
    }
}

fn write_joined(out: &mut String, terms: &[Expression], separator: &str, required: u8, marker: &str) {
    for (idx, term) in terms.iter().enumerate() {
        if idx > 0 {
            out.push_str(separator);
        }
        write_expr(out, term, required, marker);
    }
}

fn write_arg(out: &mut String, arg: &Arg, marker: &str) {
    match arg {
        Arg::Positional(expr) => write_expr(out, expr, OR, marker),
        Arg::Named(name, expr) => {
            out.push_str(name);
            out.push_str(" := ");
            write_expr(out, expr, OR, marker);
        }
        Arg::Output(name, symbol) => {
            out.push_str(name);
            out.push_str(" => ");
            out.push_str(symbol);
        }
    }
}

#[cfg(test)]
mod tests {
    use dsl::kind::{ArithmeticOp, CompareOp};
    use rstest::rstest;

    use super::*;

    const MARKER: &str = "\"__UNRESOLVED__\"";

    fn var(name: &str) -> Expression {
        Expression::var(name)
    }

    #[test]
    fn render_when_and_at_top_level_then_no_parentheses() {
        let expr = Expression::And(vec![var("a"), var("b")]);
        assert_eq!(render(&expr, MARKER), "a AND b");
    }

    #[test]
    fn render_when_or_inside_and_then_or_parenthesized() {
        let expr = Expression::And(vec![Expression::Or(vec![var("a"), var("b")]), var("c")]);
        assert_eq!(render(&expr, MARKER), "(a OR b) AND c");
    }

    #[test]
    fn render_when_and_inside_or_then_no_parentheses() {
        let expr = Expression::Or(vec![Expression::And(vec![var("a"), var("b")]), var("c")]);
        assert_eq!(render(&expr, MARKER), "a AND b OR c");
    }

    #[test]
    fn render_when_double_negation_then_kept() {
        let expr = Expression::not(Expression::not(var("a")));
        assert_eq!(render(&expr, MARKER), "NOT (NOT (a))");
    }

    #[test]
    fn render_when_and_inside_comparison_then_parenthesized() {
        let expr = Expression::compare(
            CompareOp::Eq,
            Expression::And(vec![var("a"), var("b")]),
            var("c"),
        );
        assert_eq!(render(&expr, MARKER), "(a AND b) = c");
    }

    #[test]
    fn render_when_comparison_inside_and_then_no_parentheses() {
        let expr = Expression::And(vec![
            var("en"),
            Expression::compare(CompareOp::Ge, var("level"), Expression::Constant("10".to_string())),
        ]);
        assert_eq!(render(&expr, MARKER), "en AND level >= 10");
    }

    #[rstest]
    #[case(ArithmeticOp::Add, "(a + b)")]
    #[case(ArithmeticOp::Mod, "(a MOD b)")]
    #[case(ArithmeticOp::Xor, "(a XOR b)")]
    fn render_when_arithmetic_then_self_parenthesized(#[case] op: ArithmeticOp, #[case] expected: &str) {
        let expr = Expression::arithmetic(op, var("a"), var("b"));
        assert_eq!(render(&expr, MARKER), expected);
    }

    #[test]
    fn render_when_block_call_then_quoted_with_bindings() {
        let expr = Expression::block(
            "Scale",
            vec![
                Arg::Named("IN".to_string(), Expression::Or(vec![var("a"), var("b")])),
                Arg::Output("OUT".to_string(), "y".to_string()),
            ],
        );
        assert_eq!(render(&expr, MARKER), "\"Scale\"(IN := a OR b, OUT => y)");
    }

    #[test]
    fn render_when_unresolved_then_marker() {
        let expr = Expression::And(vec![var("a"), Expression::Unresolved]);
        assert_eq!(render(&expr, MARKER), "a AND \"__UNRESOLVED__\"");
    }
}
