// crates/policy-expr/src/types.rs
// ============================================================================
// Module: Expression Types
// Description: Static type descriptors used by declarations and dispatch.
// Purpose: Describe parameter, result, and variable types for overloads.
// Dependencies: crate::value, std
// ============================================================================

//! ## Overview
//! [`Type`] is the closed set of types an environment can declare. Opaque and
//! object types are nominal: two declarations match only when their names are
//! identical.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use crate::value::Value;

// ============================================================================
// SECTION: Type Descriptor
// ============================================================================

/// Type descriptor for declared variables, parameters, and results.
///
/// # Invariants
/// - `Dyn` is only meaningful as a declaration; no value reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Type {
    /// The null value.
    Null,
    /// Boolean.
    Bool,
    /// Signed 64-bit integer.
    Int,
    /// Unsigned 64-bit integer.
    UInt,
    /// 64-bit float.
    Double,
    /// UTF-8 string.
    String,
    /// Byte sequence.
    Bytes,
    /// Ordered sequence of values.
    List,
    /// String-keyed mapping of values.
    Map,
    /// Any value; accepted by every operand position.
    Dyn,
    /// Type of the explicit absent indicator.
    Absent,
    /// Named opaque capability without fields.
    Opaque(&'static str),
    /// Named structured record with reflective fields.
    Object(&'static str),
}

impl Type {
    /// Returns true when a runtime value may be passed where `self` is declared.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Dyn => true,
            _ => value.value_type() == *self,
        }
    }

    /// Returns the declared name for opaque and object types.
    #[must_use]
    pub const fn nominal_name(&self) -> Option<&'static str> {
        match self {
            Self::Opaque(name) | Self::Object(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Double => "double",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::List => "list",
            Self::Map => "map",
            Self::Dyn => "dyn",
            Self::Absent => "absent",
            Self::Opaque(name) | Self::Object(name) => name,
        };
        f.write_str(label)
    }
}
