//! Runtime values for the liquex evaluator.
//!
//! [`Value`] unifies the primitive kinds, sequences, mappings, integer
//! ranges and host objects. Host objects are application types exposed to
//! templates through a declared capability set ([`HostObject`]), usually by
//! describing them with a static [`TypeDescriptor`] table.

mod convert;
mod error;
mod host;
mod value;

pub use error::{AccessError, AccessResult};
pub use host::{
    Capabilities, Describe, Described, FieldDescriptor, HostObject, MethodDescriptor, ParamType,
    TypeDescriptor,
};
pub use value::{Mapping, Value, ValueRange};
