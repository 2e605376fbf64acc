// crates/policy-expr/src/env.rs
// ============================================================================
// Module: Expression Environment
// Description: Registration table and call dispatch for policy expressions.
// Purpose: Build an immutable function/type/variable table once and dispatch
//          calls against it from any number of concurrent evaluations.
// Dependencies: crate::{error, function, types, value}, std
// ============================================================================

//! ## Overview
//! [`EnvBuilder`] accumulates declarations from libraries and validates them
//! in [`EnvBuilder::build`]. The resulting [`Env`] is immutable, `Send` and
//! `Sync`; evaluations share it by reference and never mutate it.
//!
//! Dispatch follows the usual calling convention for overloaded functions:
//! candidates are filtered by name, member flag, and arity. A lone candidate
//! binds directly and validates its own operands; several candidates are
//! resolved against the runtime operand types.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::error::EnvError;
use crate::error::EvalError;
use crate::function::Overload;
use crate::types::Type;
use crate::value::Value;

// ============================================================================
// SECTION: Libraries
// ============================================================================

/// Installable environment extension.
pub trait Library: Send + Sync {
    /// Returns the unique library name; a name is installed at most once.
    fn name(&self) -> &'static str;

    /// Adds the library's declarations to the builder.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError`] when the library cannot describe its declarations.
    fn install(&self, builder: &mut EnvBuilder) -> Result<(), EnvError>;
}

// ============================================================================
// SECTION: Type Declarations
// ============================================================================

/// Declared shape of an opaque or object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDecl {
    /// Opaque capability with no fields.
    Opaque,
    /// Structured record with reflective fields.
    Object {
        /// Field names and their declared types.
        fields: BTreeMap<&'static str, Type>,
    },
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Accumulates declarations for an [`Env`].
#[derive(Debug, Default)]
pub struct EnvBuilder {
    /// Installed library names.
    libraries: BTreeSet<&'static str>,
    /// Variable declarations in registration order.
    variables: Vec<(String, Type)>,
    /// Global values in registration order.
    globals: Vec<(String, Value)>,
    /// Type declarations in registration order.
    types: Vec<(&'static str, TypeDecl)>,
    /// Function overloads in registration order.
    functions: Vec<(String, Overload)>,
}

impl EnvBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a library unless one with the same name is already installed.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError`] when the library fails to install.
    pub fn library<L: Library + ?Sized>(&mut self, library: &L) -> Result<&mut Self, EnvError> {
        if self.libraries.insert(library.name()) {
            library.install(self)?;
        }
        Ok(self)
    }

    /// Declares a variable.
    pub fn variable(&mut self, name: impl Into<String>, ty: Type) -> &mut Self {
        self.variables.push((name.into(), ty));
        self
    }

    /// Binds a global value to a declared variable.
    pub fn global(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.globals.push((name.into(), value));
        self
    }

    /// Declares an opaque type.
    pub fn opaque_type(&mut self, name: &'static str) -> &mut Self {
        self.types.push((name, TypeDecl::Opaque));
        self
    }

    /// Declares an object type with reflective fields.
    pub fn object_type(&mut self, name: &'static str, fields: &[(&'static str, Type)]) -> &mut Self {
        let fields = fields.iter().copied().collect();
        self.types.push((
            name,
            TypeDecl::Object {
                fields,
            },
        ));
        self
    }

    /// Declares overloads for a function name.
    pub fn function(
        &mut self,
        name: impl Into<String>,
        overloads: impl IntoIterator<Item = Overload>,
    ) -> &mut Self {
        let name = name.into();
        for overload in overloads {
            self.functions.push((name.clone(), overload));
        }
        self
    }

    /// Validates every declaration and freezes the environment.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError`] on conflicting or dangling declarations.
    pub fn build(self) -> Result<Env, EnvError> {
        let types = merge_types(self.types)?;
        let variables = merge_variables(self.variables, &types)?;
        let globals = bind_globals(self.globals, &variables)?;
        let functions = merge_functions(self.functions, &types)?;
        Ok(Env {
            libraries: self.libraries,
            variables,
            globals,
            types,
            functions,
        })
    }
}

// ============================================================================
// SECTION: Environment
// ============================================================================

/// Immutable, shareable registration table.
#[derive(Debug)]
pub struct Env {
    /// Installed library names.
    libraries: BTreeSet<&'static str>,
    /// Declared variables.
    variables: BTreeMap<String, Type>,
    /// Bound global values.
    globals: BTreeMap<String, Value>,
    /// Declared opaque and object types.
    types: BTreeMap<&'static str, TypeDecl>,
    /// Overloads grouped by function name.
    functions: BTreeMap<String, Vec<Overload>>,
}

impl Env {
    /// Returns a new builder.
    #[must_use]
    pub fn builder() -> EnvBuilder {
        EnvBuilder::new()
    }

    /// Returns true when the named library is installed.
    #[must_use]
    pub fn has_library(&self, name: &str) -> bool {
        self.libraries.contains(name)
    }

    /// Returns the declared type of a variable.
    #[must_use]
    pub fn variable_type(&self, name: &str) -> Option<Type> {
        self.variables.get(name).copied()
    }

    /// Returns the global value bound to a variable.
    #[must_use]
    pub fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    /// Returns the declaration of an opaque or object type.
    #[must_use]
    pub fn type_decl(&self, name: &str) -> Option<&TypeDecl> {
        self.types.get(name)
    }

    /// Iterates over every function and its overloads in name order.
    pub fn functions(&self) -> impl Iterator<Item = (&str, &[Overload])> {
        self.functions.iter().map(|(name, overloads)| (name.as_str(), overloads.as_slice()))
    }

    /// Calls a global function.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] when no overload applies or the binding fails.
    pub fn call(&self, function: &str, args: &[Value]) -> Result<Value, EvalError> {
        self.dispatch(function, false, args)
    }

    /// Calls a member function on `target`.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] when no overload applies or the binding fails.
    pub fn call_member(
        &self,
        function: &str,
        target: &Value,
        args: &[Value],
    ) -> Result<Value, EvalError> {
        let mut operands = Vec::with_capacity(args.len() + 1);
        operands.push(target.clone());
        operands.extend_from_slice(args);
        self.dispatch(function, true, &operands)
    }

    /// Selects a reflective field from an object value.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::NoSuchField`] when the operand type does not
    /// declare the field.
    pub fn select(&self, target: &Value, field: &str) -> Result<Value, EvalError> {
        let operand = target.value_type();
        let declared = match (operand, target) {
            (Type::Object(name), Value::Object(object)) => match self.types.get(name) {
                Some(TypeDecl::Object {
                    fields,
                }) if fields.contains_key(field) => object.field(field),
                _ => None,
            },
            _ => None,
        };
        declared.ok_or_else(|| EvalError::NoSuchField {
            field: field.to_string(),
            operand,
        })
    }

    /// Resolves and invokes an overload.
    fn dispatch(&self, function: &str, member: bool, operands: &[Value]) -> Result<Value, EvalError> {
        let overloads = self
            .functions
            .get(function)
            .ok_or_else(|| EvalError::UnknownFunction(function.to_string()))?;
        let candidates: Vec<&Overload> = overloads
            .iter()
            .filter(|overload| {
                overload.is_member() == member && overload.params().len() == operands.len()
            })
            .collect();
        let selected = match candidates.as_slice() {
            [only] => Some(*only),
            many => many.iter().copied().find(|overload| overload.accepts(operands)),
        };
        let Some(overload) = selected else {
            return Err(EvalError::NoMatchingOverload {
                function: function.to_string(),
                operands: describe_operands(operands),
            });
        };
        overload.binding().invoke(operands).map_err(|source| EvalError::Function {
            function: function.to_string(),
            overload: overload.id(),
            source,
        })
    }
}

// ============================================================================
// SECTION: Validation Helpers
// ============================================================================

/// Merges type declarations, rejecting conflicting shapes.
fn merge_types(
    declared: Vec<(&'static str, TypeDecl)>,
) -> Result<BTreeMap<&'static str, TypeDecl>, EnvError> {
    let mut types = BTreeMap::new();
    for (name, decl) in declared {
        match types.get(name) {
            Some(existing) if *existing != decl => return Err(EnvError::TypeConflict(name)),
            Some(_) => {}
            None => {
                types.insert(name, decl);
            }
        }
    }
    for decl in types.values() {
        if let TypeDecl::Object {
            fields,
        } = decl
        {
            for (field, ty) in fields {
                ensure_declared(&types, *ty, || format!("field `{field}`"))?;
            }
        }
    }
    Ok(types)
}

/// Merges variable declarations, rejecting conflicting types.
fn merge_variables(
    declared: Vec<(String, Type)>,
    types: &BTreeMap<&'static str, TypeDecl>,
) -> Result<BTreeMap<String, Type>, EnvError> {
    let mut variables: BTreeMap<String, Type> = BTreeMap::new();
    for (name, ty) in declared {
        ensure_declared(types, ty, || format!("variable `{name}`"))?;
        match variables.get(&name) {
            Some(existing) if *existing != ty => {
                return Err(EnvError::VariableConflict {
                    name,
                    existing: *existing,
                    incoming: ty,
                });
            }
            Some(_) => {}
            None => {
                variables.insert(name, ty);
            }
        }
    }
    Ok(variables)
}

/// Binds global values to their declared variables.
fn bind_globals(
    bound: Vec<(String, Value)>,
    variables: &BTreeMap<String, Type>,
) -> Result<BTreeMap<String, Value>, EnvError> {
    let mut globals = BTreeMap::new();
    for (name, value) in bound {
        let Some(declared) = variables.get(&name) else {
            return Err(EnvError::UndeclaredGlobal(name));
        };
        if !declared.accepts(&value) {
            return Err(EnvError::GlobalTypeMismatch {
                name,
                declared: *declared,
                actual: value.value_type(),
            });
        }
        globals.insert(name, value);
    }
    Ok(globals)
}

/// Groups overloads by function name, rejecting conflicts.
fn merge_functions(
    declared: Vec<(String, Overload)>,
    types: &BTreeMap<&'static str, TypeDecl>,
) -> Result<BTreeMap<String, Vec<Overload>>, EnvError> {
    let mut functions: BTreeMap<String, Vec<Overload>> = BTreeMap::new();
    for (name, overload) in declared {
        if let Some(bound) = overload.binding().arity()
            && bound != overload.params().len()
        {
            return Err(EnvError::ArityMismatch {
                overload: overload.id(),
                declared: overload.params().len(),
                bound,
            });
        }
        let result = overload.result();
        for ty in overload.params().iter().chain(std::iter::once(&result)) {
            ensure_declared(types, *ty, || format!("overload `{}`", overload.id()))?;
        }
        let entry = functions.entry(name.clone()).or_default();
        if let Some(existing) = entry.iter().find(|existing| existing.id() == overload.id()) {
            if !existing.same_signature(&overload) {
                return Err(EnvError::OverloadRedeclared {
                    function: name,
                    overload: overload.id(),
                });
            }
            if existing.binding().same_as(overload.binding()) {
                continue;
            }
            return Err(EnvError::BindingRedeclared {
                function: name,
                overload: overload.id(),
            });
        }
        if let Some(existing) = entry.iter().find(|existing| existing.collides_with(&overload)) {
            return Err(EnvError::OverloadConflict {
                function: name,
                existing: existing.id(),
                incoming: overload.id(),
            });
        }
        entry.push(overload);
    }
    Ok(functions)
}

/// Ensures a nominal type reference points at a declared type of the same kind.
fn ensure_declared(
    types: &BTreeMap<&'static str, TypeDecl>,
    ty: Type,
    context: impl FnOnce() -> String,
) -> Result<(), EnvError> {
    let matches = match ty {
        Type::Opaque(name) => matches!(types.get(name), Some(TypeDecl::Opaque)),
        Type::Object(name) => matches!(types.get(name), Some(TypeDecl::Object { .. })),
        _ => true,
    };
    match (matches, ty.nominal_name()) {
        (false, Some(type_name)) => Err(EnvError::UnknownType {
            context: context(),
            type_name,
        }),
        _ => Ok(()),
    }
}

/// Renders runtime operand types for diagnostics.
fn describe_operands(operands: &[Value]) -> String {
    operands.iter().map(|operand| operand.value_type().to_string()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests;
