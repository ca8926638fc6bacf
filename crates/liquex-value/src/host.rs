//! Host object capability model.
//!
//! Application types are exposed to expressions through [`HostObject`]. A
//! host declares which access forms it supports ([`Capabilities`]) and
//! answers field, method and index lookups by name. Most hosts do not
//! implement the trait directly: they describe themselves with a static
//! [`TypeDescriptor`] table and are wrapped in [`Described`].

use bitflags::bitflags;
use std::fmt;

use crate::Value;

bitflags! {
    /// Access forms a host object supports.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct Capabilities: u8 {
        /// Named fields: `obj.name`.
        const FIELDS = 1 << 0;
        /// Named methods: `obj.name(args)`.
        const METHODS = 1 << 1;
        /// Keyed lookup: `obj[key]`.
        const INDEX = 1 << 2;
    }
}

/// An application value reachable from expressions.
///
/// Lookups return `None` when the name or key is not declared. Arguments
/// passed to [`call_method`](HostObject::call_method) have already been
/// converted to the types reported by
/// [`method_params`](HostObject::method_params).
pub trait HostObject: fmt::Debug + Send + Sync {
    fn type_name(&self) -> &str;

    fn capabilities(&self) -> Capabilities;

    fn field(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Declared parameter types of a method, or `None` if there is no
    /// method of that name.
    fn method_params(&self, _name: &str) -> Option<&[ParamType]> {
        None
    }

    fn call_method(&self, _name: &str, _args: &[Value]) -> Option<Value> {
        None
    }

    fn index(&self, _key: &Value) -> Option<Value> {
        None
    }

    /// Text used when the host is rendered. `None` renders as empty.
    fn display(&self) -> Option<String> {
        None
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Parameter types
// ══════════════════════════════════════════════════════════════════════════

/// Declared type of a host method parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// A string. No other kind converts.
    String,
    /// An integer, or a float with no fractional part.
    Int,
    /// An integer or a float.
    Float,
    Bool,
    /// A sequence, or a range materialized into one.
    Sequence,
    /// Any value, passed through unchanged.
    Any,
}

impl ParamType {
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Sequence => "sequence",
            Self::Any => "any",
        }
    }

    /// Convert `value` to this parameter type, or `None` if it does not fit.
    pub fn convert(self, value: &Value) -> Option<Value> {
        match (self, value) {
            (Self::Any, v) => Some(v.clone()),
            (Self::String, Value::String(_)) => Some(value.clone()),
            (Self::Bool, Value::Bool(_)) => Some(value.clone()),
            (Self::Int, Value::Int(_)) => Some(value.clone()),
            (Self::Int, Value::Float(f)) => integral(*f).map(Value::Int),
            (Self::Float, Value::Int(n)) => Some(Value::Float(*n as f64)),
            (Self::Float, Value::Float(_)) => Some(value.clone()),
            (Self::Sequence, Value::Sequence(_)) => Some(value.clone()),
            (Self::Sequence, Value::Range(r)) => r.materialize().map(Value::Sequence),
            _ => None,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `f` as an i64 if it is finite, has no fractional part and is in range.
pub(crate) fn integral(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Descriptor tables
// ══════════════════════════════════════════════════════════════════════════

/// A readable field of `T`.
pub struct FieldDescriptor<T> {
    pub name: &'static str,
    pub get: fn(&T) -> Value,
}

/// A callable method of `T`. `call` receives arguments already converted
/// to `params`.
pub struct MethodDescriptor<T> {
    pub name: &'static str,
    pub params: &'static [ParamType],
    pub call: fn(&T, &[Value]) -> Value,
}

/// Static description of a host type.
///
/// ```
/// use liquex_value::{Describe, FieldDescriptor, MethodDescriptor, ParamType, TypeDescriptor, Value};
///
/// #[derive(Debug)]
/// struct Counter { count: i64 }
///
/// static COUNTER: TypeDescriptor<Counter> = TypeDescriptor {
///     name: "Counter",
///     fields: &[FieldDescriptor { name: "count", get: |c| Value::Int(c.count) }],
///     methods: &[MethodDescriptor {
///         name: "plus",
///         params: &[ParamType::Int],
///         call: |c, args| Value::Int(c.count + args[0].as_int().unwrap_or(0)),
///     }],
///     index: None,
///     display: None,
/// };
///
/// impl Describe for Counter {
///     fn descriptor() -> &'static TypeDescriptor<Self> {
///         &COUNTER
///     }
/// }
///
/// let counter = Value::host(Counter { count: 2 });
/// assert_eq!(counter.property_value("count").unwrap(), Value::Int(2));
/// assert_eq!(counter.method_value("plus", &[Value::Int(3)]).unwrap(), Value::Int(5));
/// ```
pub struct TypeDescriptor<T: 'static> {
    pub name: &'static str,
    pub fields: &'static [FieldDescriptor<T>],
    pub methods: &'static [MethodDescriptor<T>],
    /// Keyed lookup, if the type supports `value[key]`.
    pub index: Option<fn(&T, &Value) -> Option<Value>>,
    /// Rendered text, if the type has one.
    pub display: Option<fn(&T) -> String>,
}

impl<T: 'static> TypeDescriptor<T> {
    pub fn capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::empty();
        caps.set(Capabilities::FIELDS, !self.fields.is_empty());
        caps.set(Capabilities::METHODS, !self.methods.is_empty());
        caps.set(Capabilities::INDEX, self.index.is_some());
        caps
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor<T>> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor<T>> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Types that carry a static [`TypeDescriptor`].
pub trait Describe: Sized + 'static {
    fn descriptor() -> &'static TypeDescriptor<Self>;
}

/// Adapts a [`Describe`] type into a [`HostObject`].
#[derive(Debug)]
pub struct Described<T>(pub T);

impl<T> HostObject for Described<T>
where
    T: Describe + fmt::Debug + Send + Sync,
{
    fn type_name(&self) -> &str {
        T::descriptor().name
    }

    fn capabilities(&self) -> Capabilities {
        T::descriptor().capabilities()
    }

    fn field(&self, name: &str) -> Option<Value> {
        T::descriptor().field(name).map(|f| (f.get)(&self.0))
    }

    fn method_params(&self, name: &str) -> Option<&[ParamType]> {
        T::descriptor().method(name).map(|m| m.params)
    }

    fn call_method(&self, name: &str, args: &[Value]) -> Option<Value> {
        T::descriptor().method(name).map(|m| (m.call)(&self.0, args))
    }

    fn index(&self, key: &Value) -> Option<Value> {
        T::descriptor().index.and_then(|index| index(&self.0, key))
    }

    fn display(&self) -> Option<String> {
        T::descriptor().display.map(|display| display(&self.0))
    }
}
