// crates/policy-expr/src/error.rs
// ============================================================================
// Module: Environment Error Definitions
// Description: Build-time and evaluation-time failures for environments.
// Purpose: Keep registration conflicts and call failures structurally distinct.
// Dependencies: thiserror, std
// ============================================================================

//! ## Overview
//! [`EnvError`] is raised only while an environment is being built, so a
//! conflicting registration can never surface during evaluation.
//! [`EvalError`] is the value-level failure returned from a call; the
//! evaluator treats it as the enclosing expression producing no result.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::error::Error;

use thiserror::Error;

use crate::types::Type;

// ============================================================================
// SECTION: Binding Errors
// ============================================================================

/// Boxed error returned by a function binding.
pub type BindingError = Box<dyn Error + Send + Sync + 'static>;

// ============================================================================
// SECTION: Build Errors
// ============================================================================

/// Errors raised while building an environment.
///
/// # Invariants
/// - Every variant is detected in `EnvBuilder::build`, never during a call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    /// Two overloads share a signature under different ids.
    #[error("function `{function}`: overload `{incoming}` conflicts with `{existing}`")]
    OverloadConflict {
        /// Function name.
        function: String,
        /// Overload id already registered.
        existing: &'static str,
        /// Overload id being registered.
        incoming: &'static str,
    },
    /// An overload id was re-declared with a different signature.
    #[error("function `{function}`: overload `{overload}` redeclared with a different signature")]
    OverloadRedeclared {
        /// Function name.
        function: String,
        /// Overload id.
        overload: &'static str,
    },
    /// An overload id was re-declared with a different binding.
    #[error("function `{function}`: overload `{overload}` redeclared with a different binding")]
    BindingRedeclared {
        /// Function name.
        function: String,
        /// Overload id.
        overload: &'static str,
    },
    /// A binding's arity does not match the declared parameters.
    #[error("overload `{overload}` declares {declared} parameters but binds {bound}")]
    ArityMismatch {
        /// Overload id.
        overload: &'static str,
        /// Declared parameter count.
        declared: usize,
        /// Arity of the binding.
        bound: usize,
    },
    /// A declaration references an opaque or object type that was never declared.
    #[error("{context} references undeclared type `{type_name}`")]
    UnknownType {
        /// Declaration that holds the reference.
        context: String,
        /// Referenced type name.
        type_name: &'static str,
    },
    /// A type name was declared twice with different shapes.
    #[error("type `{0}` declared twice with different shapes")]
    TypeConflict(&'static str),
    /// A variable was declared twice with different types.
    #[error("variable `{name}` declared as both {existing} and {incoming}")]
    VariableConflict {
        /// Variable name.
        name: String,
        /// Type already declared.
        existing: Type,
        /// Type being declared.
        incoming: Type,
    },
    /// A global value was bound without a variable declaration.
    #[error("global `{0}` has no variable declaration")]
    UndeclaredGlobal(String),
    /// A global value does not match its declared variable type.
    #[error("global `{name}` is {actual}, declared as {declared}")]
    GlobalTypeMismatch {
        /// Variable name.
        name: String,
        /// Declared type.
        declared: Type,
        /// Runtime type of the bound value.
        actual: Type,
    },
    /// A library failed to install its declarations.
    #[error("library `{library}` failed to install: {reason}")]
    Library {
        /// Library name.
        library: &'static str,
        /// Failure description.
        reason: String,
    },
}

// ============================================================================
// SECTION: Evaluation Errors
// ============================================================================

/// Value-level failure returned from a function call or field selection.
#[derive(Debug, Error)]
pub enum EvalError {
    /// No function with the given name is registered.
    #[error("unknown function `{0}`")]
    UnknownFunction(String),
    /// No overload accepts the supplied operands.
    #[error("no matching overload for `{function}` with operands ({operands})")]
    NoMatchingOverload {
        /// Function name.
        function: String,
        /// Comma-separated runtime operand types.
        operands: String,
    },
    /// The selected field is not exposed by the operand type.
    #[error("no such field `{field}` on {operand}")]
    NoSuchField {
        /// Requested field.
        field: String,
        /// Runtime operand type.
        operand: Type,
    },
    /// The bound function returned an error.
    #[error("`{function}` ({overload}) failed: {source}")]
    Function {
        /// Function name.
        function: String,
        /// Overload id that was invoked.
        overload: &'static str,
        /// Error returned by the binding.
        #[source]
        source: BindingError,
    },
}

impl EvalError {
    /// Returns the binding error downcast to a concrete type, if it matches.
    #[must_use]
    pub fn binding_error<E: Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Function {
                source, ..
            } => source.downcast_ref::<E>(),
            _ => None,
        }
    }
}
