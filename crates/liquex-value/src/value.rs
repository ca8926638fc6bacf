//! The dynamically typed runtime value.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{AccessError, AccessResult};
use crate::host::{integral, Capabilities, Describe, Described, HostObject};

/// String-keyed mapping, ordered by key.
pub type Mapping = BTreeMap<String, Value>;

/// A runtime value.
///
/// Values are immutable once built. Comparison, indexing and containment
/// are pure functions of their operands.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(Mapping),
    /// Inclusive integer range, materialized on demand.
    Range(ValueRange),
    /// Shared application object.
    Host(Arc<dyn HostObject>),
}

/// Inclusive integer range `start..=end`. Empty when `start > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueRange {
    pub start: i64,
    pub end: i64,
}

impl ValueRange {
    /// Longest range [`materialize`](Self::materialize) expands.
    pub const MAX_MATERIALIZED_LEN: usize = 1_000_000;

    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Ascending iterator over the members. Restartable: each call starts
    /// from `start` again.
    pub fn iter(&self) -> std::ops::RangeInclusive<i64> {
        self.start..=self.end
    }

    pub fn len(&self) -> usize {
        if self.start > self.end {
            return 0;
        }
        let len = i128::from(self.end) - i128::from(self.start) + 1;
        usize::try_from(len).unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, n: i64) -> bool {
        self.start <= n && n <= self.end
    }

    /// The members as integer values, or `None` when the range is longer
    /// than [`MAX_MATERIALIZED_LEN`](Self::MAX_MATERIALIZED_LEN).
    pub fn materialize(&self) -> Option<Vec<Value>> {
        if self.len() > Self::MAX_MATERIALIZED_LEN {
            return None;
        }
        Some(self.iter().map(Value::Int).collect())
    }

    /// The member at zero-based position `i`, if any.
    pub fn get(&self, i: usize) -> Option<i64> {
        if i < self.len() {
            Some(self.start + i as i64)
        } else {
            None
        }
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl Value {
    // ══════════════════════════════════════════════════════════════════════
    // Construction
    // ══════════════════════════════════════════════════════════════════════

    pub fn range(start: i64, end: i64) -> Value {
        Value::Range(ValueRange::new(start, end))
    }

    /// Wrap a described application value as a host object.
    pub fn host<T>(value: T) -> Value
    where
        T: Describe + fmt::Debug + Send + Sync,
    {
        Value::Host(Arc::new(Described(value)))
    }

    /// Wrap an already shared host object.
    pub fn from_host(host: Arc<dyn HostObject>) -> Value {
        Value::Host(host)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Inspection & coercion
    // ══════════════════════════════════════════════════════════════════════

    pub fn type_name(&self) -> &str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
            Value::Range(_) => "range",
            Value::Host(host) => host.type_name(),
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Only `nil` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view: ints as-is, floats truncated, numeric strings parsed.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Float(f) => integral(f.trunc()),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(|f| integral(f.trunc())))
            }
            _ => None,
        }
    }

    /// Float view: numbers widened, numeric strings parsed.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Text of the value as it renders into a template.
    pub fn to_display(&self) -> String {
        match self {
            Value::Nil => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::Sequence(items) => items.iter().map(Value::to_display).collect(),
            Value::Mapping(map) => {
                let entries: Vec<String> = map
                    .iter()
                    .map(|(k, v)| format!("{k}: {}", v.to_display()))
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
            Value::Range(r) => r.to_string(),
            Value::Host(host) => host.display().unwrap_or_default(),
        }
    }

    /// Element count for sequences, strings (in characters), mappings and
    /// ranges.
    pub fn size(&self) -> Option<usize> {
        match self {
            Value::Sequence(items) => Some(items.len()),
            Value::String(s) => Some(s.chars().count()),
            Value::Mapping(map) => Some(map.len()),
            Value::Range(r) => Some(r.len()),
            _ => None,
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Equality, ordering, containment
    // ══════════════════════════════════════════════════════════════════════

    /// Language equality.
    ///
    /// Ints and floats compare numerically. Sequences and mappings compare
    /// element-wise, ranges by bounds, and host objects by identity.
    /// Mismatched kinds are unequal.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                self.as_float() == other.as_float()
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equals(y))
            }
            (Value::Mapping(a), Value::Mapping(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.equals(vb))
            }
            (Value::Range(a), Value::Range(b)) => a == b,
            (Value::Host(a), Value::Host(b)) => same_host(a, b),
            _ => false,
        }
    }

    /// Ordering for numbers and strings; `None` for every other pair.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                self.as_float()?.partial_cmp(&other.as_float()?)
            }
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Whether `needle` is a member of this value.
    ///
    /// Sequences test element equality, strings test for a substring,
    /// mappings test for a key and ranges test integer membership. Any
    /// other combination is `false`.
    pub fn contains(&self, needle: &Value) -> bool {
        match (self, needle) {
            (Value::Sequence(items), _) => items.iter().any(|item| item.equals(needle)),
            (Value::String(s), Value::String(sub)) => s.contains(sub.as_str()),
            (Value::Mapping(map), Value::String(key)) => map.contains_key(key),
            (Value::Range(r), Value::Int(n)) => r.contains(*n),
            (Value::Range(r), Value::Float(f)) => integral(*f).is_some_and(|n| r.contains(n)),
            _ => false,
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Access
    // ══════════════════════════════════════════════════════════════════════

    /// `self[index]`.
    ///
    /// Positions count from the end when negative. Out-of-range positions
    /// and absent mapping keys yield nil.
    pub fn index_value(&self, index: &Value) -> AccessResult<Value> {
        match self {
            Value::Sequence(items) => {
                let pos = self.position(index, items.len())?;
                Ok(pos.and_then(|i| items.get(i)).cloned().unwrap_or(Value::Nil))
            }
            Value::Range(r) => {
                let pos = self.position(index, r.len())?;
                Ok(pos.and_then(|i| r.get(i)).map(Value::Int).unwrap_or(Value::Nil))
            }
            Value::String(s) => {
                let pos = self.position(index, s.chars().count())?;
                Ok(pos
                    .and_then(|i| s.chars().nth(i))
                    .map(|c| Value::String(c.to_string()))
                    .unwrap_or(Value::Nil))
            }
            Value::Mapping(map) => match index {
                Value::String(key) => Ok(map.get(key).cloned().unwrap_or(Value::Nil)),
                _ => Err(self.not_indexable(index)),
            },
            Value::Host(host) => host_index(host.as_ref(), index).ok_or_else(|| self.not_indexable(index)),
            _ => Err(self.not_indexable(index)),
        }
    }

    /// `self.name`.
    ///
    /// Mapping keys take priority over the `size`, `first` and `last`
    /// pseudo-properties. On a host, a declared field wins over a
    /// zero-argument method of the same name.
    pub fn property_value(&self, name: &str) -> AccessResult<Value> {
        if let Value::Mapping(map) = self {
            if let Some(value) = map.get(name) {
                return Ok(value.clone());
            }
        }
        if let Value::Host(host) = self {
            return host_property(host.as_ref(), name).ok_or_else(|| self.no_such_property(name));
        }

        if let ("size", Some(size)) = (name, self.size()) {
            return Ok(Value::Int(i64::try_from(size).unwrap_or(i64::MAX)));
        }
        match (name, self) {
            ("first", Value::Sequence(items)) => Ok(items.first().cloned().unwrap_or(Value::Nil)),
            ("last", Value::Sequence(items)) => Ok(items.last().cloned().unwrap_or(Value::Nil)),
            ("first", Value::Range(r)) if !r.is_empty() => Ok(Value::Int(r.start)),
            ("last", Value::Range(r)) if !r.is_empty() => Ok(Value::Int(r.end)),
            ("first" | "last", Value::Range(_)) => Ok(Value::Nil),
            (_, Value::Mapping(_)) => Ok(Value::Nil),
            _ => Err(self.no_such_property(name)),
        }
    }

    /// `self.name(args)`. Only host objects have methods.
    ///
    /// Arguments are converted to the method's declared parameter types;
    /// an arity or type mismatch is an [`AccessError::ArgumentMismatch`].
    pub fn method_value(&self, name: &str, args: &[Value]) -> AccessResult<Value> {
        let Value::Host(host) = self else {
            return Err(self.no_such_method(name));
        };
        if !host.capabilities().contains(Capabilities::METHODS) {
            return Err(self.no_such_method(name));
        }
        let params = host.method_params(name).ok_or_else(|| self.no_such_method(name))?;
        if params.len() != args.len() {
            return Err(AccessError::ArgumentMismatch {
                method: name.to_string(),
                reason: format!("expected {} arguments, got {}", params.len(), args.len()),
            });
        }
        let converted = params
            .iter()
            .zip(args)
            .enumerate()
            .map(|(i, (param, arg))| {
                param.convert(arg).ok_or_else(|| AccessError::ArgumentMismatch {
                    method: name.to_string(),
                    reason: format!(
                        "argument {} expects {}, got {}",
                        i + 1,
                        param,
                        arg.type_name()
                    ),
                })
            })
            .collect::<AccessResult<Vec<_>>>()?;
        host.call_method(name, &converted)
            .ok_or_else(|| self.no_such_method(name))
    }

    // ── Access helpers ───────────────────────────────────────────────────

    /// Resolve a numeric index against a collection of `len` elements.
    /// `Ok(None)` means out of range.
    fn position(&self, index: &Value, len: usize) -> AccessResult<Option<usize>> {
        let i = match index {
            Value::Int(n) => *n,
            Value::Float(f) => integral(f.trunc()).ok_or_else(|| self.not_indexable(index))?,
            _ => return Err(self.not_indexable(index)),
        };
        let len = i64::try_from(len).unwrap_or(i64::MAX);
        let i = if i < 0 { i + len } else { i };
        Ok(if (0..len).contains(&i) { Some(i as usize) } else { None })
    }

    fn not_indexable(&self, index: &Value) -> AccessError {
        AccessError::NotIndexable {
            type_name: self.type_name().to_string(),
            index: index.type_name().to_string(),
        }
    }

    fn no_such_property(&self, name: &str) -> AccessError {
        AccessError::NoSuchProperty {
            type_name: self.type_name().to_string(),
            name: name.to_string(),
        }
    }

    fn no_such_method(&self, name: &str) -> AccessError {
        AccessError::NoSuchMethod {
            type_name: self.type_name().to_string(),
            name: name.to_string(),
        }
    }
}

/// Field, then zero-argument method.
fn host_property(host: &dyn HostObject, name: &str) -> Option<Value> {
    let caps = host.capabilities();
    if caps.contains(Capabilities::FIELDS) {
        if let Some(value) = host.field(name) {
            return Some(value);
        }
    }
    if caps.contains(Capabilities::METHODS) && host.method_params(name).is_some_and(<[_]>::is_empty) {
        return host.call_method(name, &[]);
    }
    None
}

/// Field by string key, then the host's own keyed lookup.
fn host_index(host: &dyn HostObject, key: &Value) -> Option<Value> {
    let caps = host.capabilities();
    if let (true, Value::String(name)) = (caps.contains(Capabilities::FIELDS), key) {
        if let Some(value) = host.field(name) {
            return Some(value);
        }
    }
    if caps.contains(Capabilities::INDEX) {
        return Some(host.index(key).unwrap_or(Value::Nil));
    }
    None
}

fn same_host(a: &Arc<dyn HostObject>, b: &Arc<dyn HostObject>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// Structural equality: same variant and same contents. Unlike
/// [`Value::equals`], `Int(1)` and `Float(1.0)` differ.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            (Value::Mapping(a), Value::Mapping(b)) => a == b,
            (Value::Range(a), Value::Range(b)) => a == b,
            (Value::Host(a), Value::Host(b)) => same_host(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display())
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Nil
    }
}
