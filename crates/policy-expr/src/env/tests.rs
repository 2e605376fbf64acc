// crates/policy-expr/src/env/tests.rs
// ============================================================================
// Module: Environment Unit Tests
// Description: Unit tests for build-time validation and call dispatch.
// Purpose: Prove conflicts fail at build time and dispatch honours overloads.
// ============================================================================

//! ## Overview
//! Builds small environments by hand and checks every `EnvError` path plus
//! the single-candidate and typed-resolution dispatch rules.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::unnecessary_wraps,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use std::fmt;
use std::sync::Arc;
use std::thread;

use super::Env;
use super::EnvBuilder;
use super::Library;
use crate::error::EnvError;
use crate::error::EvalError;
use crate::function::Binding;
use crate::function::Overload;
use crate::types::Type;
use crate::value::NativeObject;
use crate::value::Value;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

#[derive(Debug)]
struct Handle;

impl NativeObject for Handle {
    fn value_type(&self) -> Type {
        Type::Opaque("test.Handle")
    }
}

#[derive(Debug)]
struct Point {
    x: i64,
}

impl NativeObject for Point {
    fn value_type(&self) -> Type {
        Type::Object("test.Point")
    }

    fn field(&self, name: &str) -> Option<Value> {
        (name == "x").then_some(Value::Int(self.x))
    }
}

#[derive(Debug)]
struct Rejected;

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("rejected")
    }
}

impl std::error::Error for Rejected {}

fn len_string(value: &Value) -> Result<Value, Rejected> {
    value.as_str().map(|text| Value::from(text.len() as u64)).ok_or(Rejected)
}

fn len_bytes(value: &Value) -> Result<Value, Rejected> {
    value.as_bytes().map(|bytes| Value::from(bytes.len() as u64)).ok_or(Rejected)
}

fn size_overloads() -> Vec<Overload> {
    vec![
        Overload::global("size_string", vec![Type::String], Type::UInt, Binding::unary(len_string)),
        Overload::global("size_bytes", vec![Type::Bytes], Type::UInt, Binding::unary(len_bytes)),
    ]
}

struct SizeLibrary;

impl Library for SizeLibrary {
    fn name(&self) -> &'static str {
        "test.size"
    }

    fn install(&self, builder: &mut EnvBuilder) -> Result<(), EnvError> {
        builder.function("size", size_overloads());
        Ok(())
    }
}

// ============================================================================
// SECTION: Build Validation
// ============================================================================

#[test]
fn conflicting_overloads_fail_at_build() {
    let mut builder = Env::builder();
    builder.function("size", size_overloads());
    builder.function(
        "size",
        [Overload::global(
            "size_string_again",
            vec![Type::String],
            Type::UInt,
            Binding::unary(len_string),
        )],
    );
    let err = builder.build().expect_err("conflict");
    assert_eq!(
        err,
        EnvError::OverloadConflict {
            function: "size".to_string(),
            existing: "size_string",
            incoming: "size_string_again",
        }
    );
}

#[test]
fn identical_redeclaration_is_idempotent() {
    let overloads = size_overloads();
    let mut builder = Env::builder();
    builder.function("size", overloads.clone());
    builder.function("size", overloads);
    let env = builder.build().expect("env");
    let (_, overloads) = env.functions().next().expect("size");
    assert_eq!(overloads.len(), 2);
}

#[test]
fn redeclared_id_with_new_binding_fails() {
    let mut builder = Env::builder();
    builder.function("size", size_overloads());
    builder.function("size", size_overloads());
    assert!(matches!(
        builder.build(),
        Err(EnvError::BindingRedeclared {
            overload: "size_string",
            ..
        })
    ));
}

#[test]
fn redeclared_binding_is_not_silently_dropped() {
    let mut builder = Env::builder();
    builder.function(
        "size",
        [Overload::global("size_string", vec![Type::String], Type::UInt, Binding::unary(len_string))],
    );
    builder.function(
        "size",
        [Overload::global(
            "size_string",
            vec![Type::String],
            Type::UInt,
            Binding::unary(|_: &Value| Ok::<_, Rejected>(Value::UInt(0))),
        )],
    );
    let err = builder.build().expect_err("conflicting binding");
    assert_eq!(
        err.to_string(),
        "function `size`: overload `size_string` redeclared with a different binding"
    );
}

#[test]
fn redeclared_id_with_new_signature_fails() {
    let mut builder = Env::builder();
    builder.function("size", size_overloads());
    builder.function(
        "size",
        [Overload::global("size_string", vec![Type::Int], Type::UInt, Binding::unary(len_string))],
    );
    assert!(matches!(builder.build(), Err(EnvError::OverloadRedeclared { .. })));
}

#[test]
fn arity_mismatch_fails_at_build() {
    let mut builder = Env::builder();
    builder.function(
        "size",
        [Overload::global(
            "size_pair",
            vec![Type::String, Type::String],
            Type::UInt,
            Binding::unary(len_string),
        )],
    );
    assert!(matches!(
        builder.build(),
        Err(EnvError::ArityMismatch {
            declared: 2,
            bound: 1,
            ..
        })
    ));
}

#[test]
fn undeclared_types_fail_at_build() {
    let mut builder = Env::builder();
    builder.variable("handle", Type::Opaque("test.Handle"));
    assert!(matches!(builder.build(), Err(EnvError::UnknownType { .. })));

    let mut builder = Env::builder();
    builder.opaque_type("test.Point");
    builder.function(
        "x",
        [Overload::member(
            "point_x",
            vec![Type::Object("test.Point")],
            Type::Int,
            Binding::unary(len_string),
        )],
    );
    assert!(matches!(builder.build(), Err(EnvError::UnknownType { .. })));
}

#[test]
fn type_and_variable_conflicts_fail_at_build() {
    let mut builder = Env::builder();
    builder.opaque_type("test.Point");
    builder.object_type("test.Point", &[("x", Type::Int)]);
    assert_eq!(builder.build().expect_err("type"), EnvError::TypeConflict("test.Point"));

    let mut builder = Env::builder();
    builder.variable("limit", Type::Int);
    builder.variable("limit", Type::String);
    assert!(matches!(builder.build(), Err(EnvError::VariableConflict { .. })));
}

#[test]
fn globals_require_matching_declarations() {
    let mut builder = Env::builder();
    builder.global("handle", Value::object(Handle));
    assert_eq!(builder.build().expect_err("undeclared"), EnvError::UndeclaredGlobal("handle".into()));

    let mut builder = Env::builder();
    builder.opaque_type("test.Handle");
    builder.variable("handle", Type::String);
    builder.global("handle", Value::object(Handle));
    assert!(matches!(builder.build(), Err(EnvError::GlobalTypeMismatch { .. })));
}

#[test]
fn library_installs_once() {
    let mut builder = Env::builder();
    builder.library(&SizeLibrary).expect("first");
    builder.library(&SizeLibrary).expect("second");
    let env = builder.build().expect("env");
    assert!(env.has_library("test.size"));
    let (_, overloads) = env.functions().next().expect("size");
    assert_eq!(overloads.len(), 2);
}

// ============================================================================
// SECTION: Dispatch
// ============================================================================

fn size_env() -> Env {
    let mut builder = Env::builder();
    builder.library(&SizeLibrary).expect("library");
    builder.build().expect("env")
}

#[test]
fn dispatch_resolves_by_runtime_type() {
    let env = size_env();
    assert_eq!(env.call("size", &[Value::from("abc")]).expect("string"), Value::UInt(3));
    assert_eq!(env.call("size", &[Value::from(vec![1_u8, 2])]).expect("bytes"), Value::UInt(2));
    let err = env.call("size", &[Value::Int(1)]).expect_err("int");
    assert!(matches!(err, EvalError::NoMatchingOverload { .. }));
    assert!(err.to_string().contains("int"));
}

#[test]
fn single_candidate_binds_directly() {
    let mut builder = Env::builder();
    builder.function(
        "len",
        [Overload::global("len_string", vec![Type::String], Type::UInt, Binding::unary(len_string))],
    );
    let env = builder.build().expect("env");
    let err = env.call("len", &[Value::Int(4)]).expect_err("binding rejects");
    assert!(err.binding_error::<Rejected>().is_some());
    assert!(matches!(
        err,
        EvalError::Function {
            overload: "len_string",
            ..
        }
    ));
}

#[test]
fn unknown_function_and_member_mismatch() {
    let env = size_env();
    assert!(matches!(env.call("missing", &[]), Err(EvalError::UnknownFunction(_))));
    let err = env.call_member("size", &Value::from("abc"), &[]).expect_err("not a member");
    assert!(matches!(err, EvalError::NoMatchingOverload { .. }));
}

#[test]
fn select_reads_declared_fields_only() {
    let mut builder = Env::builder();
    builder.object_type("test.Point", &[("x", Type::Int)]);
    builder.opaque_type("test.Handle");
    builder.variable("handle", Type::Opaque("test.Handle"));
    builder.global("handle", Value::object(Handle));
    let env = builder.build().expect("env");

    let point = Value::object(Point {
        x: 5,
    });
    assert_eq!(env.select(&point, "x").expect("x"), Value::Int(5));
    assert!(matches!(env.select(&point, "y"), Err(EvalError::NoSuchField { .. })));
    let handle = env.global("handle").expect("handle");
    assert!(matches!(env.select(handle, "x"), Err(EvalError::NoSuchField { .. })));
    assert_eq!(env.variable_type("handle"), Some(Type::Opaque("test.Handle")));
}

#[test]
fn env_is_shared_across_threads() {
    let env = Arc::new(size_env());
    let handles: Vec<_> = (0 .. 8_u64)
        .map(|index| {
            let env = Arc::clone(&env);
            thread::spawn(move || {
                let text = "x".repeat(usize::try_from(index).unwrap_or_default());
                env.call("size", &[Value::from(text)]).expect("size")
            })
        })
        .collect();
    for (index, handle) in handles.into_iter().enumerate() {
        let value = handle.join().expect("join");
        assert_eq!(value, Value::UInt(index as u64));
    }
}
