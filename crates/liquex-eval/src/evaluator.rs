//! Core expression evaluator.

use liquex_types::ast::*;
use liquex_types::Span;
use liquex_value::{AccessError, AccessResult, Value, ValueRange};

use crate::context::Context;
use crate::error::{EvalError, EvalResult, FilterError};

/// Walks an expression tree against a [`Context`].
///
/// Children are evaluated left to right, depth first. Only `and` and `or`
/// skip an operand. Failed property, index and method access degrades to
/// nil; filter failures and strict-mode violations abort the evaluation.
pub struct Evaluator<'ctx> {
    ctx: &'ctx dyn Context,
}

impl<'ctx> Evaluator<'ctx> {
    pub fn new(ctx: &'ctx dyn Context) -> Self {
        Self { ctx }
    }

    /// Evaluate an expression to a Value.
    #[tracing::instrument(level = "debug", skip_all, fields(span = %expr.span))]
    pub fn eval(&self, expr: &Expr) -> EvalResult<Value> {
        self.eval_expr(expr)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expression evaluation
    // ══════════════════════════════════════════════════════════════════════

    fn eval_expr(&self, expr: &Expr) -> EvalResult<Value> {
        match &expr.kind {
            ExprKind::Literal(lit) => Ok(eval_literal(lit)),
            ExprKind::Identifier(name) => self.eval_identifier(name),

            ExprKind::Property { object, name } => self.eval_property(object, name),
            ExprKind::Index { object, index } => self.eval_index(object, index),
            ExprKind::MethodCall {
                object,
                method,
                args,
            } => self.eval_method_call(object, method, args),

            ExprKind::Range { start, end } => self.eval_range(start, end),
            ExprKind::Contains { left, op, right } => self.eval_contains(left, *op, right),
            ExprKind::Filter { input, name, args } => self.eval_filter(input, name, args),
            ExprKind::Logical { left, op, right } => self.eval_logical(left, *op, right),
            ExprKind::Compare { left, op, right } => self.eval_compare(left, *op, right),
        }
    }

    fn eval_args(&self, args: &[Expr]) -> EvalResult<Vec<Value>> {
        args.iter().map(|arg| self.eval_expr(arg)).collect()
    }

    // ── Identifiers ──────────────────────────────────────────────────────

    fn eval_identifier(&self, name: &str) -> EvalResult<Value> {
        match self.ctx.lookup(name) {
            Some(value) => Ok(value),
            None if self.ctx.strict_variables() => Err(EvalError::UndefinedVariable(name.to_string())),
            None => Ok(Value::Nil),
        }
    }

    // ── Access ───────────────────────────────────────────────────────────

    fn eval_property(&self, object: &Expr, name: &Ident) -> EvalResult<Value> {
        let object = self.eval_expr(object)?;
        Ok(degrade(object.property_value(&name.name), name.span))
    }

    fn eval_index(&self, object: &Expr, index: &Expr) -> EvalResult<Value> {
        let object = self.eval_expr(object)?;
        let index_value = self.eval_expr(index)?;
        Ok(degrade(object.index_value(&index_value), index.span))
    }

    fn eval_method_call(&self, object: &Expr, method: &Ident, args: &[Expr]) -> EvalResult<Value> {
        let object = self.eval_expr(object)?;
        let args = self.eval_args(args)?;
        match object.method_value(&method.name, &args) {
            Err(AccessError::ArgumentMismatch { method, reason })
                if self.ctx.strict_method_arguments() =>
            {
                Err(EvalError::ArgumentMismatch { method, reason })
            }
            result => Ok(degrade(result, method.span)),
        }
    }

    // ── Ranges & membership ──────────────────────────────────────────────

    fn eval_range(&self, start: &Expr, end: &Expr) -> EvalResult<Value> {
        let start = self.eval_expr(start)?;
        let end = self.eval_expr(end)?;
        match (start.as_int(), end.as_int()) {
            (Some(a), Some(b)) => Ok(Value::Range(ValueRange::new(a, b))),
            _ => {
                tracing::trace!(
                    start = start.type_name(),
                    end = end.type_name(),
                    "range bound is not an integer; evaluating to nil"
                );
                Ok(Value::Nil)
            }
        }
    }

    fn eval_contains(&self, left: &Expr, op: MembershipOp, right: &Expr) -> EvalResult<Value> {
        let left = self.eval_expr(left)?;
        let right = self.eval_expr(right)?;
        let found = match op {
            MembershipOp::Contains => left.contains(&right),
            MembershipOp::In => right.contains(&left),
        };
        Ok(Value::Bool(found))
    }

    // ── Filters ──────────────────────────────────────────────────────────

    fn eval_filter(&self, input: &Expr, name: &Ident, args: &[Expr]) -> EvalResult<Value> {
        let input = self.eval_expr(input)?;
        let args = self.eval_args(args)?;
        self.ctx.apply_filter(&name.name, input, args).map_err(|cause| {
            tracing::debug!(filter = %name.name, error = %cause, "filter failed");
            EvalError::Filter(FilterError {
                filter_name: name.name.clone(),
                cause,
            })
        })
    }

    // ── Operators ────────────────────────────────────────────────────────

    /// `and` / `or` with short-circuit; the result is always a Bool.
    fn eval_logical(&self, left: &Expr, op: LogicalOp, right: &Expr) -> EvalResult<Value> {
        let left = self.eval_expr(left)?.is_truthy();
        let result = match op {
            LogicalOp::And => left && self.eval_expr(right)?.is_truthy(),
            LogicalOp::Or => left || self.eval_expr(right)?.is_truthy(),
        };
        Ok(Value::Bool(result))
    }

    fn eval_compare(&self, left: &Expr, op: CompareOp, right: &Expr) -> EvalResult<Value> {
        let left = self.eval_expr(left)?;
        let right = self.eval_expr(right)?;
        let result = match op {
            CompareOp::Eq => left.equals(&right),
            CompareOp::NotEq => !left.equals(&right),
            CompareOp::Less => left.compare(&right).is_some_and(|o| o.is_lt()),
            CompareOp::Greater => left.compare(&right).is_some_and(|o| o.is_gt()),
            CompareOp::LessEq => left.compare(&right).is_some_and(|o| o.is_le()),
            CompareOp::GreaterEq => left.compare(&right).is_some_and(|o| o.is_ge()),
        };
        Ok(Value::Bool(result))
    }
}

fn eval_literal(lit: &Literal) -> Value {
    match lit {
        Literal::Nil => Value::Nil,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Int(n) => Value::Int(*n),
        Literal::Float(f) => Value::Float(*f),
        Literal::String(s) => Value::String(s.clone()),
    }
}

/// Failed access evaluates to nil.
fn degrade(result: AccessResult<Value>, span: Span) -> Value {
    result.unwrap_or_else(|err| {
        tracing::trace!(%span, error = %err, "access failed; evaluating to nil");
        Value::Nil
    })
}
