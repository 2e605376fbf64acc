// crates/mcp-policy/src/bridge.rs
// ============================================================================
// Module: Dynamic Value Bridge
// Description: Conversions between structured data and policy values.
// Purpose: Box decoded protocol data for policy functions and unbox it back.
// Dependencies: policy-expr, serde, serde_json
// ============================================================================

//! ## Overview
//! Both directions fail explicitly instead of coercing. [`from_json`] rejects
//! numbers that have no numeric form in the value model; [`to_json`] rejects
//! bytes, native objects, the absent indicator, and non-finite doubles.
//!
//! [`FromValue`] is the typed unboxing used by function bindings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use policy_expr::Type;
use policy_expr::Value;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value as JsonValue;

use crate::error::ConversionError;

// ============================================================================
// SECTION: JSON Conversion
// ============================================================================

/// Boxes a JSON value.
///
/// Integers become `Int` when they fit `i64` and `UInt` when they only fit
/// `u64`. Integers beyond `u64::MAX` widen to the nearest `Double`, which is
/// lossy: `18446744073709551616` boxes as `1.8446744073709552e19`.
///
/// # Errors
///
/// Returns [`ConversionError::Unrepresentable`] for a number with no `f64`
/// form, including when nested inside arrays or objects.
pub fn from_json(json: JsonValue) -> Result<Value, ConversionError> {
    match json {
        JsonValue::Null => Ok(Value::Null),
        JsonValue::Bool(value) => Ok(Value::Bool(value)),
        JsonValue::Number(number) => from_number(&number),
        JsonValue::String(value) => Ok(Value::String(value)),
        JsonValue::Array(items) => {
            items.into_iter().map(from_json).collect::<Result<Vec<_>, _>>().map(Value::List)
        }
        JsonValue::Object(entries) => from_json_map(entries).map(Value::Map),
    }
}

/// Boxes every entry of a JSON object.
///
/// # Errors
///
/// Returns [`ConversionError::Unrepresentable`] when any entry holds a number
/// with no `f64` form.
pub fn from_json_map(
    entries: Map<String, JsonValue>,
) -> Result<BTreeMap<String, Value>, ConversionError> {
    entries.into_iter().map(|(key, value)| from_json(value).map(|value| (key, value))).collect()
}

/// Unboxes a value into JSON.
///
/// # Errors
///
/// Returns [`ConversionError`] for bytes, objects, the absent indicator, and
/// non-finite doubles, including when nested inside lists or maps.
pub fn to_json(value: &Value) -> Result<JsonValue, ConversionError> {
    match value {
        Value::Null => Ok(JsonValue::Null),
        Value::Bool(value) => Ok(JsonValue::Bool(*value)),
        Value::Int(value) => Ok(JsonValue::Number(Number::from(*value))),
        Value::UInt(value) => Ok(JsonValue::Number(Number::from(*value))),
        Value::Double(value) => Number::from_f64(*value)
            .map(JsonValue::Number)
            .ok_or_else(|| ConversionError::NonFinite(value.to_string())),
        Value::String(value) => Ok(JsonValue::String(value.clone())),
        Value::List(items) => items.iter().map(to_json).collect::<Result<Vec<_>, _>>().map(JsonValue::Array),
        Value::Map(entries) => entries
            .iter()
            .map(|(key, value)| to_json(value).map(|json| (key.clone(), json)))
            .collect::<Result<Map<_, _>, _>>()
            .map(JsonValue::Object),
        Value::Bytes(_) | Value::Object(_) | Value::Absent => {
            Err(ConversionError::Unsupported(value.value_type()))
        }
    }
}

/// Converts a JSON number, keeping integer precision where `i64` or `u64`
/// can hold it.
fn from_number(number: &Number) -> Result<Value, ConversionError> {
    if let Some(value) = number.as_i64() {
        Ok(Value::Int(value))
    } else if let Some(value) = number.as_u64() {
        Ok(Value::UInt(value))
    } else {
        number
            .as_f64()
            .map(Value::Double)
            .ok_or_else(|| ConversionError::Unrepresentable(number.to_string()))
    }
}

// ============================================================================
// SECTION: Serde Conversion
// ============================================================================

/// Boxes any serializable native record.
///
/// # Errors
///
/// Returns [`ConversionError::Native`] when serialization fails.
pub fn to_value<T: Serialize + ?Sized>(native: &T) -> Result<Value, ConversionError> {
    let json = serde_json::to_value(native).map_err(|err| ConversionError::Native(err.to_string()))?;
    from_json(json)
}

/// Unboxes a value into a deserializable native record.
///
/// # Errors
///
/// Returns [`ConversionError`] when the value has no JSON form or does not
/// match the target shape.
pub fn from_value<T: DeserializeOwned>(value: &Value) -> Result<T, ConversionError> {
    let json = to_json(value)?;
    serde_json::from_value(json).map_err(|err| ConversionError::Native(err.to_string()))
}

// ============================================================================
// SECTION: Typed Extraction
// ============================================================================

/// Typed unboxing of a single value.
pub trait FromValue<'a>: Sized {
    /// Extracts `Self` from the value.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] when the value kind does not match.
    fn extract(value: &'a Value) -> Result<Self, ConversionError>;
}

/// Builds the kind-mismatch error for a value.
fn unexpected(expected: Type, value: &Value) -> ConversionError {
    ConversionError::UnexpectedKind {
        expected,
        actual: value.value_type(),
    }
}

impl<'a> FromValue<'a> for &'a str {
    fn extract(value: &'a Value) -> Result<Self, ConversionError> {
        value.as_str().ok_or_else(|| unexpected(Type::String, value))
    }
}

impl<'a> FromValue<'a> for &'a [u8] {
    fn extract(value: &'a Value) -> Result<Self, ConversionError> {
        value.as_bytes().ok_or_else(|| unexpected(Type::Bytes, value))
    }
}

impl FromValue<'_> for bool {
    fn extract(value: &Value) -> Result<Self, ConversionError> {
        value.as_bool().ok_or_else(|| unexpected(Type::Bool, value))
    }
}

impl FromValue<'_> for i64 {
    fn extract(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Int(number) => Ok(*number),
            Value::UInt(number) => Self::try_from(*number).map_err(|_| unexpected(Type::Int, value)),
            _ => Err(unexpected(Type::Int, value)),
        }
    }
}

impl FromValue<'_> for u64 {
    fn extract(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::UInt(number) => Ok(*number),
            Value::Int(number) => Self::try_from(*number).map_err(|_| unexpected(Type::UInt, value)),
            _ => Err(unexpected(Type::UInt, value)),
        }
    }
}

impl FromValue<'_> for f64 {
    fn extract(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Double(number) => Ok(*number),
            _ => Err(unexpected(Type::Double, value)),
        }
    }
}

impl FromValue<'_> for JsonValue {
    fn extract(value: &Value) -> Result<Self, ConversionError> {
        to_json(value)
    }
}
