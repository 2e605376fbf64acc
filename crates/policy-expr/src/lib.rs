// crates/policy-expr/src/lib.rs
// ============================================================================
// Module: Policy Expression Root
// Description: Public API surface for the policy expression environment.
// Purpose: Wire together values, types, overloads, and the environment table.
// Dependencies: crate::{env, error, function, types, value}
// ============================================================================

//! ## Overview
//! `policy-expr` is the domain-agnostic half of a policy evaluator: the boxed
//! value model, the overload table, and the calling convention registered
//! functions are invoked through. Protocol-specific libraries plug into it via
//! [`Library`]; parsing and executing policy text is left to the evaluator
//! that embeds the resulting [`Env`].

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod env;
pub mod error;
pub mod function;
pub mod types;
pub mod value;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use env::Env;
pub use env::EnvBuilder;
pub use env::Library;
pub use env::TypeDecl;
pub use error::BindingError;
pub use error::EnvError;
pub use error::EvalError;
pub use function::Binding;
pub use function::BindingResult;
pub use function::Overload;
pub use types::Type;
pub use value::NativeObject;
pub use value::Value;
