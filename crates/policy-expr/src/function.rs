// crates/policy-expr/src/function.rs
// ============================================================================
// Module: Function Overloads
// Description: Overload declarations and the bindings that implement them.
// Purpose: Describe callable signatures and adapt native closures to values.
// Dependencies: crate::{error, types, value}, std
// ============================================================================

//! ## Overview
//! An [`Overload`] pairs a signature (member flag, parameter types, result
//! type) with a [`Binding`]. Bindings are shared, immutable closures: the
//! same binding may run on any number of threads at once, so it must not
//! capture anything mutable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use crate::error::BindingError;
use crate::types::Type;
use crate::value::Value;

// ============================================================================
// SECTION: Bindings
// ============================================================================

/// Result returned by a binding.
pub type BindingResult = Result<Value, BindingError>;

/// Shared unary closure.
type UnaryFn = dyn Fn(&Value) -> BindingResult + Send + Sync;
/// Shared binary closure.
type BinaryFn = dyn Fn(&Value, &Value) -> BindingResult + Send + Sync;
/// Shared variadic closure.
type VariadicFn = dyn Fn(&[Value]) -> BindingResult + Send + Sync;

/// Native implementation of an overload.
#[derive(Clone)]
pub enum Binding {
    /// Single operand (receiver for member overloads).
    Unary(Arc<UnaryFn>),
    /// Two operands (receiver plus one argument for member overloads).
    Binary(Arc<BinaryFn>),
    /// Any number of operands.
    Variadic(Arc<VariadicFn>),
}

impl Binding {
    /// Wraps a unary closure whose error converts into a [`BindingError`].
    pub fn unary<F, E>(function: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, E> + Send + Sync + 'static,
        E: Into<BindingError>,
    {
        let wrapped: Arc<UnaryFn> = Arc::new(move |operand: &Value| -> BindingResult {
            function(operand).map_err(Into::into)
        });
        Self::Unary(wrapped)
    }

    /// Wraps a binary closure whose error converts into a [`BindingError`].
    pub fn binary<F, E>(function: F) -> Self
    where
        F: Fn(&Value, &Value) -> Result<Value, E> + Send + Sync + 'static,
        E: Into<BindingError>,
    {
        let wrapped: Arc<BinaryFn> = Arc::new(move |left: &Value, right: &Value| -> BindingResult {
            function(left, right).map_err(Into::into)
        });
        Self::Binary(wrapped)
    }

    /// Wraps a variadic closure whose error converts into a [`BindingError`].
    pub fn variadic<F, E>(function: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, E> + Send + Sync + 'static,
        E: Into<BindingError>,
    {
        let wrapped: Arc<VariadicFn> = Arc::new(move |operands: &[Value]| -> BindingResult {
            function(operands).map_err(Into::into)
        });
        Self::Variadic(wrapped)
    }

    /// Returns the fixed arity, or `None` for variadic bindings.
    #[must_use]
    pub const fn arity(&self) -> Option<usize> {
        match self {
            Self::Unary(_) => Some(1),
            Self::Binary(_) => Some(2),
            Self::Variadic(_) => None,
        }
    }

    /// Returns true when both bindings share the same closure allocation.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unary(left), Self::Unary(right)) => Arc::ptr_eq(left, right),
            (Self::Binary(left), Self::Binary(right)) => Arc::ptr_eq(left, right),
            (Self::Variadic(left), Self::Variadic(right)) => Arc::ptr_eq(left, right),
            _ => false,
        }
    }

    /// Invokes the binding with the supplied operands.
    ///
    /// # Errors
    ///
    /// Returns the binding's own error, or an arity error when the operand
    /// count does not fit a fixed-arity binding.
    pub fn invoke(&self, operands: &[Value]) -> BindingResult {
        match (self, operands) {
            (Self::Unary(function), [operand]) => function(operand),
            (Self::Binary(function), [left, right]) => function(left, right),
            (Self::Variadic(function), operands) => function(operands),
            _ => Err(format!("binding expects {} operands", self.arity().unwrap_or_default())
                .into()),
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unary(_) => "Binding::Unary",
            Self::Binary(_) => "Binding::Binary",
            Self::Variadic(_) => "Binding::Variadic",
        };
        f.write_str(label)
    }
}

// ============================================================================
// SECTION: Overloads
// ============================================================================

/// Single overload of a named function.
///
/// # Invariants
/// - For member overloads `params[0]` is the receiver type.
#[derive(Debug, Clone)]
pub struct Overload {
    /// Stable overload identifier.
    id: &'static str,
    /// Whether the overload is invoked as `receiver.function(...)`.
    member: bool,
    /// Operand types, receiver first for member overloads.
    params: Vec<Type>,
    /// Result type.
    result: Type,
    /// Native implementation.
    binding: Binding,
}

impl Overload {
    /// Declares a global overload (`function(args...)`).
    #[must_use]
    pub fn global(
        id: &'static str,
        params: Vec<Type>,
        result: Type,
        binding: Binding,
    ) -> Self {
        Self {
            id,
            member: false,
            params,
            result,
            binding,
        }
    }

    /// Declares a member overload (`receiver.function(args...)`).
    #[must_use]
    pub fn member(
        id: &'static str,
        params: Vec<Type>,
        result: Type,
        binding: Binding,
    ) -> Self {
        Self {
            id,
            member: true,
            params,
            result,
            binding,
        }
    }

    /// Returns the overload identifier.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        self.id
    }

    /// Returns true for member overloads.
    #[must_use]
    pub const fn is_member(&self) -> bool {
        self.member
    }

    /// Returns the operand types.
    #[must_use]
    pub fn params(&self) -> &[Type] {
        &self.params
    }

    /// Returns the result type.
    #[must_use]
    pub const fn result(&self) -> Type {
        self.result
    }

    /// Returns the native binding.
    #[must_use]
    pub const fn binding(&self) -> &Binding {
        &self.binding
    }

    /// Returns true when both overloads occupy the same dispatch slot.
    #[must_use]
    pub fn collides_with(&self, other: &Self) -> bool {
        self.member == other.member && self.params == other.params
    }

    /// Returns true when both overloads declare the same full signature.
    #[must_use]
    pub fn same_signature(&self, other: &Self) -> bool {
        self.collides_with(other) && self.result == other.result
    }

    /// Returns true when every operand fits the declared parameter types.
    #[must_use]
    pub fn accepts(&self, operands: &[Value]) -> bool {
        self.params.len() == operands.len()
            && self.params.iter().zip(operands).all(|(param, operand)| param.accepts(operand))
    }
}
