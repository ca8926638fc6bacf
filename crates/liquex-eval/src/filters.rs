//! Filter registry and the standard filter set.
//!
//! A filter takes the piped input and the evaluated arguments and returns a
//! new value. The evaluator never inspects filter names; resolution is the
//! context's job, and [`RenderContext`](crate::RenderContext) delegates it
//! to a [`FilterRegistry`].

use std::collections::HashMap;
use std::fmt;

use liquex_value::{Value, ValueRange};

use crate::error::FilterFailure;

/// Signature of a filter implementation.
pub type FilterFn = dyn Fn(&Value, &[Value]) -> Result<Value, FilterFailure> + Send + Sync;

/// Filters by name.
#[derive(Default)]
pub struct FilterRegistry {
    filters: HashMap<String, Box<FilterFn>>,
}

impl FilterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `filter` under `name`, replacing any previous filter of that
    /// name.
    pub fn register<F>(&mut self, name: impl Into<String>, filter: F)
    where
        F: Fn(&Value, &[Value]) -> Result<Value, FilterFailure> + Send + Sync + 'static,
    {
        self.filters.insert(name.into(), Box::new(filter));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn apply(&self, name: &str, input: &Value, args: &[Value]) -> Result<Value, FilterFailure> {
        let filter = self.filters.get(name).ok_or(FilterFailure::UnknownFilter)?;
        filter(input, args)
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.names())
            .finish()
    }
}

/// A registry holding the standard Liquid-compatible filters.
pub fn standard_filters() -> FilterRegistry {
    let mut registry = FilterRegistry::new();
    registry.register("append", append);
    registry.register("prepend", prepend);
    registry.register("upcase", |input, args| {
        arity(args, 0)?;
        Ok(Value::String(input.to_display().to_uppercase()))
    });
    registry.register("downcase", |input, args| {
        arity(args, 0)?;
        Ok(Value::String(input.to_display().to_lowercase()))
    });
    registry.register("capitalize", capitalize);
    registry.register("strip", |input, args| {
        arity(args, 0)?;
        Ok(Value::String(input.to_display().trim().to_string()))
    });
    registry.register("size", |input, args| {
        arity(args, 0)?;
        Ok(Value::from(input.size().unwrap_or(0)))
    });
    registry.register("join", join);
    registry.register("split", split);
    registry.register("first", |input, args| {
        arity(args, 0)?;
        Ok(input.property_value("first").unwrap_or(Value::Nil))
    });
    registry.register("last", |input, args| {
        arity(args, 0)?;
        Ok(input.property_value("last").unwrap_or(Value::Nil))
    });
    registry.register("reverse", reverse);
    registry.register("default", default);
    registry.register("plus", |input, args| arithmetic("plus", input, args, i64::checked_add, |a, b| a + b));
    registry.register("minus", |input, args| arithmetic("minus", input, args, i64::checked_sub, |a, b| a - b));
    registry.register("times", |input, args| arithmetic("times", input, args, i64::checked_mul, |a, b| a * b));
    registry
}

// ══════════════════════════════════════════════════════════════════════════
// Standard filters
// ══════════════════════════════════════════════════════════════════════════

fn arity(args: &[Value], expected: usize) -> Result<(), FilterFailure> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(FilterFailure::Arity {
            expected,
            got: args.len(),
        })
    }
}

fn append(input: &Value, args: &[Value]) -> Result<Value, FilterFailure> {
    arity(args, 1)?;
    Ok(Value::String(input.to_display() + &args[0].to_display()))
}

fn prepend(input: &Value, args: &[Value]) -> Result<Value, FilterFailure> {
    arity(args, 1)?;
    Ok(Value::String(args[0].to_display() + &input.to_display()))
}

/// Uppercase the first character and lowercase the rest.
fn capitalize(input: &Value, args: &[Value]) -> Result<Value, FilterFailure> {
    arity(args, 0)?;
    let text = input.to_display();
    let mut chars = text.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
    };
    Ok(Value::String(capitalized))
}

/// `join` with an optional separator, `" "` by default.
fn join(input: &Value, args: &[Value]) -> Result<Value, FilterFailure> {
    if args.len() > 1 {
        return Err(FilterFailure::Arity {
            expected: 1,
            got: args.len(),
        });
    }
    let separator = args.first().map_or_else(|| " ".to_string(), Value::to_display);
    let joined = match input {
        Value::Sequence(items) => items
            .iter()
            .map(Value::to_display)
            .collect::<Vec<_>>()
            .join(&separator),
        Value::Range(r) => materialize("join", r)?
            .iter()
            .map(Value::to_display)
            .collect::<Vec<_>>()
            .join(&separator),
        other => other.to_display(),
    };
    Ok(Value::String(joined))
}

/// Split on a separator. An empty separator splits into characters.
fn split(input: &Value, args: &[Value]) -> Result<Value, FilterFailure> {
    arity(args, 1)?;
    let text = input.to_display();
    let separator = args[0].to_display();
    let parts: Vec<Value> = if separator.is_empty() {
        text.chars().map(|c| Value::String(c.to_string())).collect()
    } else {
        text.split(separator.as_str())
            .map(|part| Value::String(part.to_string()))
            .collect()
    };
    Ok(Value::Sequence(parts))
}

fn reverse(input: &Value, args: &[Value]) -> Result<Value, FilterFailure> {
    arity(args, 0)?;
    match input {
        Value::Sequence(items) => Ok(items.iter().rev().cloned().collect()),
        Value::Range(r) => Ok(materialize("reverse", r)?.into_iter().rev().collect()),
        other => Err(FilterFailure::InvalidArgument(format!(
            "reverse expects a sequence, got {}",
            other.type_name()
        ))),
    }
}

/// The members of `range`, or an error past the materialization limit.
fn materialize(filter: &str, range: &ValueRange) -> Result<Vec<Value>, FilterFailure> {
    range.materialize().ok_or_else(|| {
        FilterFailure::InvalidArgument(format!(
            "{filter}: range {range} has more than {} members",
            ValueRange::MAX_MATERIALIZED_LEN
        ))
    })
}

/// The fallback when the input is nil, false or empty.
fn default(input: &Value, args: &[Value]) -> Result<Value, FilterFailure> {
    arity(args, 1)?;
    let blank = match input {
        Value::Nil | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        Value::Sequence(items) => items.is_empty(),
        Value::Mapping(map) => map.is_empty(),
        _ => false,
    };
    Ok(if blank { args[0].clone() } else { input.clone() })
}

/// A numeric operand. Nil counts as zero and numeric strings are parsed.
enum Number {
    Int(i64),
    Float(f64),
}

fn number(filter: &str, value: &Value) -> Result<Number, FilterFailure> {
    let number = match value {
        Value::Nil => Some(Number::Int(0)),
        Value::Int(n) => Some(Number::Int(*n)),
        Value::Float(f) => Some(Number::Float(*f)),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Number::Int)
            .ok()
            .or_else(|| value.as_float().map(Number::Float)),
        _ => None,
    };
    number.ok_or_else(|| {
        FilterFailure::InvalidArgument(format!("{filter} expects a number, got {}", value.type_name()))
    })
}

fn arithmetic(
    filter: &str,
    input: &Value,
    args: &[Value],
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, FilterFailure> {
    arity(args, 1)?;
    match (number(filter, input)?, number(filter, &args[0])?) {
        (Number::Int(a), Number::Int(b)) => int_op(a, b)
            .map(Value::Int)
            .ok_or_else(|| FilterFailure::InvalidArgument(format!("{filter}: integer overflow"))),
        (a, b) => Ok(Value::Float(float_op(as_f64(a), as_f64(b)))),
    }
}

fn as_f64(n: Number) -> f64 {
    match n {
        Number::Int(i) => i as f64,
        Number::Float(f) => f,
    }
}
