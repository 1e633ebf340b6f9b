//! Output writer for the statements of analyzed networks. The writer
//! transforms call records and operations into indented lines of
//! structured text.
//!
//! A statement whose guard could not be reconstructed is never written.
//! The writer leaves a warning comment in its place so that a reviewer can
//! find it without the log.
use log::{debug, warn};

use dsl::{
    expr::Expression,
    kind::Dominance,
    operation::{FbCall, Operation},
    options::ConversionOptions,
    signature::SignatureRegistry,
};

use crate::expression::render;

pub(crate) struct StatementRenderer<'a> {
    lines: Vec<String>,
    indents: usize,
    options: &'a ConversionOptions,
    registry: &'a SignatureRegistry,
}

impl<'a> StatementRenderer<'a> {
    pub(crate) fn new(registry: &'a SignatureRegistry, options: &'a ConversionOptions) -> Self {
        Self {
            lines: vec![],
            indents: 0,
            options,
            registry,
        }
    }

    pub(crate) fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub(crate) fn write_line(&mut self, val: &str) {
        if val.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines
                .push(format!("{}{}", self.options.indent.repeat(self.indents), val));
        }
    }

    pub(crate) fn indent(&mut self) {
        self.indents += 1;
    }

    pub(crate) fn outdent(&mut self) {
        self.indents = self.indents.saturating_sub(1);
    }

    fn expr(&self, expr: &Expression) -> String {
        render(expr, &self.options.unresolved_marker)
    }

    /// Writes the body when the guard holds.
    fn guarded<F>(&mut self, guard: &Expression, what: &str, body: F)
    where
        F: FnOnce(&mut Self),
    {
        if guard.contains_unresolved() {
            warn!("Skipping {}: condition is unresolved", what);
            self.write_line(&format!(
                "// WARNING: Unresolved enable logic - {} skipped",
                what
            ));
            self.write_line(&format!(
                "// TODO: Manually verify: IF {} THEN {}",
                self.expr(guard),
                what
            ));
        } else if guard.is_false() {
            debug!("Not writing {}: condition is FALSE", what);
            self.write_line(&format!("// {} is never executed (condition is FALSE)", what));
        } else if guard.is_true() {
            body(self);
        } else {
            let cond = self.expr(guard);
            self.write_line(&format!("IF {} THEN", cond));
            self.indent();
            body(self);
            self.outdent();
            self.write_line("END_IF;");
        }
    }

    /// Writes `target := value;`, flagging a value that is incomplete.
    fn assignment(&mut self, target: &str, value: &Expression) {
        if value.contains_unresolved() {
            self.write_line(&format!(
                "// WARNING: Unresolved logic in assignment to {}",
                target
            ));
        }
        let value = self.expr(value);
        self.write_line(&format!("{} := {};", target, value));
    }

    pub(crate) fn fb_call(&mut self, call: &FbCall) {
        let name = match &call.instance_name {
            Some(instance) => quote(instance),
            None if self.registry.is_system(&call.block_type) => call.block_type.clone(),
            None => quote(&call.block_type),
        };

        self.guarded(&call.enable, &format!("call of {}", name), |r| {
            if call
                .resolved_inputs
                .iter()
                .any(|(_, expr)| expr.contains_unresolved())
            {
                r.write_line(&format!("// WARNING: Unresolved input logic in call of {}", name));
            }
            let mut params: Vec<String> = call
                .resolved_inputs
                .iter()
                .map(|(param, expr)| format!("{} := {}", param, r.expr(expr)))
                .collect();
            params.extend(
                call.resolved_outputs
                    .iter()
                    .map(|(param, symbol)| format!("{} => {}", param, symbol)),
            );

            if params.is_empty() {
                r.write_line(&format!("{}();", name));
                return;
            }

            r.write_line(&format!("{}(", name));
            r.indent();
            let last = params.len() - 1;
            for (idx, param) in params.iter().enumerate() {
                if idx == last {
                    r.write_line(param);
                } else {
                    r.write_line(&format!("{},", param));
                }
            }
            r.outdent();
            r.write_line(");");
        });
    }

    pub(crate) fn operation(&mut self, op: &Operation) {
        match op {
            Operation::Assign { var, expr } => self.assignment(var, expr),
            Operation::Set { var, cond } => {
                self.guarded(cond, &format!("set of {}", var), |r| {
                    r.write_line(&format!("{} := TRUE;", var))
                });
            }
            Operation::Reset { var, cond } => {
                self.guarded(cond, &format!("reset of {}", var), |r| {
                    r.write_line(&format!("{} := FALSE;", var))
                });
            }
            Operation::SrLatch {
                var,
                set,
                reset,
                dominant,
            } => self.latch(var, set, reset, *dominant),
            Operation::Move { dest, src, enable } => {
                self.guarded(enable, &format!("move to {}", dest), |r| r.assignment(dest, src));
            }
            Operation::InstrAssign { var, expr, enable } => {
                self.guarded(enable, &format!("assignment to {}", var), |r| {
                    r.assignment(var, expr)
                });
            }
            Operation::InstrCall { expr, enable } => {
                let call = self.expr(expr);
                self.guarded(enable, &format!("instruction {}", call), |r| {
                    if expr.contains_unresolved() {
                        r.write_line("// WARNING: Unresolved logic in instruction arguments");
                    }
                    r.write_line(&format!("{};", call));
                });
            }
            Operation::Jump {
                target_label,
                cond,
                negated,
            } => {
                let cond = match (*negated, cond) {
                    (false, cond) => cond.clone(),
                    (true, Expression::Literal(value)) => Expression::Literal(!value),
                    (true, cond) => Expression::not(cond.clone()),
                };
                self.guarded(&cond, &format!("jump to {}", target_label), |r| {
                    r.write_line(&format!("GOTO {};", target_label))
                });
            }
            Operation::Label { name } => {
                let outer = self.options.indent.repeat(self.indents.saturating_sub(1));
                self.lines.push(format!("{}{}:", outer, name));
                self.write_line(";");
            }
            Operation::Return { cond } => {
                self.guarded(cond, "RETURN", |r| r.write_line("RETURN;"));
            }
            Operation::Exit { cond } => {
                self.guarded(cond, "EXIT", |r| r.write_line("EXIT;"));
            }
            Operation::Continue { cond } => {
                self.guarded(cond, "CONTINUE", |r| r.write_line("CONTINUE;"));
            }
        }
    }

    fn latch(&mut self, var: &str, set: &Expression, reset: &Expression, dominant: Dominance) {
        if set.contains_unresolved() || reset.contains_unresolved() {
            let unresolved = if set.contains_unresolved() { set } else { reset };
            self.guarded(unresolved, &format!("latch of {}", var), |_| {});
            return;
        }

        let set_branch = (self.expr(set), "TRUE");
        let reset_branch = (self.expr(reset), "FALSE");
        let (first, second) = match dominant {
            Dominance::Reset => (reset_branch, set_branch),
            Dominance::Set => (set_branch, reset_branch),
        };

        self.write_line(&format!("IF {} THEN", first.0));
        self.indent();
        self.write_line(&format!("{} := {};", var, first.1));
        self.outdent();
        self.write_line(&format!("ELSIF {} THEN", second.0));
        self.indent();
        self.write_line(&format!("{} := {};", var, second.1));
        self.outdent();
        self.write_line("END_IF;");
    }
}

/// Quotes a name unless it is already quoted or refers to local data.
fn quote(name: &str) -> String {
    if name.starts_with('"') || name.starts_with('#') {
        name.to_string()
    } else {
        format!("\"{}\"", name)
    }
}
