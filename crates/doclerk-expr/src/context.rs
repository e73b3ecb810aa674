/*
 * context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Scoping contexts.
//!
//! A scope resolves two independent namespaces, variables and functions,
//! each falling back to a parent scope when a name is not bound locally.
//! A name never resolves across the variable/function boundary.
//!
//! Resolution is lexical: a lookup returns the binding together with the
//! scope that owns it, and the bound expression is evaluated in that scope,
//! never in the scope that asked for it.
//!
//! Macro nesting is tracked per evaluation, not per scope: a [`Binding`]
//! carries the depth it is evaluated at, so a variable resolved in an outer
//! context still counts the macro calls that led to it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::ast::Expression;
use crate::error::{ExprError, ExprResult};
use crate::function::{FunctionPrototype, Invocation};
use crate::value::Value;

/// A namespace chain resolving variable and function names.
pub trait Scope {
    /// Resolve a variable to its (unevaluated) expression.
    fn get_var(&self, name: &str) -> ExprResult<Binding<'_>>;

    /// Resolve a function to its prototype.
    fn get_function(&self, name: &str) -> ExprResult<FunctionRef<'_>>;
}

/// An expression paired with the scope it must be evaluated in.
#[derive(Clone, Copy)]
pub struct Binding<'a> {
    expr: &'a Expression,
    scope: &'a dyn Scope,
    depth: usize,
}

impl<'a> Binding<'a> {
    pub fn new(expr: &'a Expression, scope: &'a dyn Scope) -> Self {
        Self {
            expr,
            scope,
            depth: 0,
        }
    }

    /// Evaluate at no less than `depth` enclosing macro calls.
    pub fn at_depth(self, depth: usize) -> Self {
        Self {
            depth: self.depth.max(depth),
            ..self
        }
    }

    /// Macro calls enclosing this binding's evaluation.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn expression(&self) -> &'a Expression {
        self.expr
    }

    pub fn scope(&self) -> &'a dyn Scope {
        self.scope
    }

    pub fn evaluate(&self) -> ExprResult<Value> {
        self.expr.evaluate_at(self.scope, self.depth)
    }

    pub fn evaluate_string(&self) -> ExprResult<String> {
        Ok(self.evaluate()?.render())
    }
}

impl fmt::Debug for Binding<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("expr", self.expr)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

/// A function paired with the scope it was defined in.
#[derive(Clone, Copy)]
pub struct FunctionRef<'a> {
    function: &'a dyn FunctionPrototype,
    scope: &'a dyn Scope,
}

impl<'a> FunctionRef<'a> {
    pub fn new(function: &'a dyn FunctionPrototype, scope: &'a dyn Scope) -> Self {
        Self { function, scope }
    }

    /// Invoke the function with unevaluated arguments from `caller`, which
    /// sits inside `depth` macro calls.
    pub fn call(
        &self,
        name: &str,
        args: &[Binding<'_>],
        caller: &dyn Scope,
        depth: usize,
    ) -> ExprResult<Value> {
        self.function.call(&Invocation {
            name,
            args,
            caller,
            definition: self.scope,
            depth,
        })
    }
}

impl fmt::Debug for FunctionRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRef").finish_non_exhaustive()
    }
}

/// An immutable namespace with an optional shared parent.
///
/// Build one with [`Context::builder`]; it is never mutated afterwards.
#[derive(Clone, Default)]
pub struct Context {
    vars: HashMap<String, Expression>,
    functions: HashMap<String, Arc<dyn FunctionPrototype>>,
    parent: Option<Arc<Context>>,
}

impl Context {
    /// Create an empty context with no parent.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }

    pub fn parent(&self) -> Option<&Context> {
        self.parent.as_deref()
    }

    pub fn has_local_var(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn has_local_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Locally bound variable names, sorted.
    pub fn var_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.vars.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Locally bound function names, sorted.
    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Scope for Context {
    fn get_var(&self, name: &str) -> ExprResult<Binding<'_>> {
        if let Some(expr) = self.vars.get(name) {
            return Ok(Binding::new(expr, self));
        }
        match &self.parent {
            Some(parent) => parent.get_var(name),
            None => Err(ExprError::undefined_variable(name)),
        }
    }

    fn get_function(&self, name: &str) -> ExprResult<FunctionRef<'_>> {
        if let Some(function) = self.functions.get(name) {
            return Ok(FunctionRef::new(function.as_ref(), self));
        }
        match &self.parent {
            Some(parent) => parent.get_function(name),
            None => Err(ExprError::undefined_function(name)),
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("vars", &self.var_names())
            .field("functions", &self.function_names())
            .field("parent", &self.parent)
            .finish()
    }
}

/// Assembles a [`Context`] from single-purpose maps.
#[derive(Default)]
pub struct ContextBuilder {
    context: Context,
}

impl ContextBuilder {
    /// Bind a variable to an expression.
    pub fn var(mut self, name: impl Into<String>, expr: Expression) -> Self {
        self.context.vars.insert(name.into(), expr);
        self
    }

    /// Bind every entry of `vars`.
    pub fn vars(mut self, vars: impl IntoIterator<Item = (String, Expression)>) -> Self {
        self.context.vars.extend(vars);
        self
    }

    /// Bind a function.
    pub fn function(
        self,
        name: impl Into<String>,
        function: impl FunctionPrototype + 'static,
    ) -> Self {
        self.shared_function(name, Arc::new(function))
    }

    /// Bind a function that is shared with other contexts.
    pub fn shared_function(
        mut self,
        name: impl Into<String>,
        function: Arc<dyn FunctionPrototype>,
    ) -> Self {
        self.context.functions.insert(name.into(), function);
        self
    }

    /// Fall back to `parent` for names not bound here.
    pub fn parent(mut self, parent: Arc<Context>) -> Self {
        self.context.parent = Some(parent);
        self
    }

    pub fn build(self) -> Context {
        self.context
    }
}

/// The short-lived scope of one macro call.
///
/// Parameters are bound to the caller's argument expressions, still
/// unevaluated and still paired with the caller's scope. Everything else is
/// looked up in the macro's definition scope.
pub struct CallScope<'a> {
    params: HashMap<&'a str, Binding<'a>>,
    parent: &'a dyn Scope,
}

impl<'a> CallScope<'a> {
    pub fn new(params: HashMap<&'a str, Binding<'a>>, parent: &'a dyn Scope) -> Self {
        Self { params, parent }
    }
}

impl Scope for CallScope<'_> {
    fn get_var(&self, name: &str) -> ExprResult<Binding<'_>> {
        match self.params.get(name) {
            Some(binding) => Ok(*binding),
            None => self.parent.get_var(name),
        }
    }

    fn get_function(&self, name: &str) -> ExprResult<FunctionRef<'_>> {
        self.parent.get_function(name)
    }
}
