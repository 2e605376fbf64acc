// crates/policy-expr/src/value.rs
// ============================================================================
// Module: Dynamic Values
// Description: Boxed runtime values exchanged with registered functions.
// Purpose: Provide a closed value model plus native object hosting.
// Dependencies: crate::types, std
// ============================================================================

//! ## Overview
//! [`Value`] is the only representation a binding ever receives or returns.
//! Scalars, sequences, and mappings are held structurally; opaque and
//! structured records are hosted behind [`NativeObject`] and shared by
//! reference, so cloning a value never deep-copies a record.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::types::Type;

// ============================================================================
// SECTION: Native Objects
// ============================================================================

/// Native record hosted inside a [`Value::Object`].
///
/// Implementors are immutable once boxed; the environment only ever reads
/// them through [`NativeObject::field`].
pub trait NativeObject: Any + Send + Sync + fmt::Debug {
    /// Returns the declared opaque or object type of this record.
    fn value_type(&self) -> Type;

    /// Returns the value of a reflective field, if the record exposes it.
    fn field(&self, name: &str) -> Option<Value> {
        let _ = name;
        None
    }
}

// ============================================================================
// SECTION: Value
// ============================================================================

/// Boxed dynamic value.
///
/// # Invariants
/// - `Map` keys are unique and iterate in sorted order.
/// - `Absent` is distinct from `Null`: it marks a lookup that found nothing.
#[derive(Debug, Clone)]
pub enum Value {
    /// The null value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Floating point number.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// Byte sequence.
    Bytes(Vec<u8>),
    /// Ordered sequence.
    List(Vec<Self>),
    /// String-keyed mapping.
    Map(BTreeMap<String, Self>),
    /// Opaque or structured native record.
    Object(Arc<dyn NativeObject>),
    /// Explicit absent indicator returned by keyed lookups.
    Absent,
}

impl Value {
    /// Boxes a native record.
    #[must_use]
    pub fn object<T: NativeObject>(object: T) -> Self {
        Self::Object(Arc::new(object))
    }

    /// Returns the runtime type of the value.
    #[must_use]
    pub fn value_type(&self) -> Type {
        match self {
            Self::Null => Type::Null,
            Self::Bool(_) => Type::Bool,
            Self::Int(_) => Type::Int,
            Self::UInt(_) => Type::UInt,
            Self::Double(_) => Type::Double,
            Self::String(_) => Type::String,
            Self::Bytes(_) => Type::Bytes,
            Self::List(_) => Type::List,
            Self::Map(_) => Type::Map,
            Self::Object(object) => object.value_type(),
            Self::Absent => Type::Absent,
        }
    }

    /// Returns the string payload, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Returns the byte payload, if any.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(value) => Some(value.as_slice()),
            _ => None,
        }
    }

    /// Returns the boolean payload, if any.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the mapping payload, if any.
    #[must_use]
    pub const fn as_map(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Map(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the sequence payload, if any.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(value) => Some(value.as_slice()),
            _ => None,
        }
    }

    /// Returns true for the absent indicator.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Downcasts a hosted native record to its concrete type.
    #[must_use]
    pub fn downcast_ref<T: NativeObject>(&self) -> Option<&T> {
        match self {
            Self::Object(object) => {
                let any: &dyn Any = &**object;
                any.downcast_ref::<T>()
            }
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) | (Self::Absent, Self::Absent) => true,
            (Self::Bool(left), Self::Bool(right)) => left == right,
            (Self::Int(left), Self::Int(right)) => left == right,
            (Self::UInt(left), Self::UInt(right)) => left == right,
            (Self::Double(left), Self::Double(right)) => left == right,
            (Self::String(left), Self::String(right)) => left == right,
            (Self::Bytes(left), Self::Bytes(right)) => left == right,
            (Self::List(left), Self::List(right)) => left == right,
            (Self::Map(left), Self::Map(right)) => left == right,
            (Self::Object(left), Self::Object(right)) => Arc::ptr_eq(left, right),
            _ => false,
        }
    }
}

// ============================================================================
// SECTION: Conversions
// ============================================================================

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::UInt(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Self>) -> Self {
        Self::List(value)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(value: BTreeMap<String, Self>) -> Self {
        Self::Map(value)
    }
}
