/*
 * function.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Function prototypes and user-defined macros.
//!
//! A function receives its arguments unevaluated. Each argument is a
//! [`Binding`] that remembers the scope the argument was written in, so a
//! function decides if and when an argument is evaluated.

use std::collections::HashMap;
use std::fmt;

use tracing::{trace, warn};

use crate::ast::Expression;
use crate::context::{Binding, CallScope, Scope};
use crate::error::{ExprError, ExprResult};
use crate::parser::parse_template;
use crate::value::Value;

/// Everything a function needs to know about one call.
pub struct Invocation<'a> {
    /// The name the function was called by.
    pub name: &'a str,
    /// Unevaluated arguments, in call order.
    pub args: &'a [Binding<'a>],
    /// The scope the call expression is evaluated in.
    pub caller: &'a dyn Scope,
    /// The scope the function was found in.
    pub definition: &'a dyn Scope,
    /// Macro calls enclosing the call site.
    pub depth: usize,
}

impl<'a> Invocation<'a> {
    /// The `index`th argument, if supplied.
    pub fn arg(&self, index: usize) -> Option<&Binding<'a>> {
        self.args.get(index)
    }

    /// Evaluate the `index`th argument to a string. A missing argument
    /// renders as the empty string.
    pub fn arg_string(&self, index: usize) -> ExprResult<String> {
        match self.args.get(index) {
            Some(arg) => arg.evaluate_string(),
            None => Ok(String::new()),
        }
    }
}

impl fmt::Debug for Invocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

/// A callable registered in a context's function namespace.
pub trait FunctionPrototype: Send + Sync {
    fn call(&self, invocation: &Invocation<'_>) -> ExprResult<Value>;
}

/// A function implemented in Rust.
pub struct NativeFunction<F> {
    f: F,
}

/// Wrap a closure as a [`FunctionPrototype`].
pub fn native<F>(f: F) -> NativeFunction<F>
where
    F: Fn(&Invocation<'_>) -> ExprResult<Value> + Send + Sync,
{
    NativeFunction { f }
}

impl<F> FunctionPrototype for NativeFunction<F>
where
    F: Fn(&Invocation<'_>) -> ExprResult<Value> + Send + Sync,
{
    fn call(&self, invocation: &Invocation<'_>) -> ExprResult<Value> {
        (self.f)(invocation)
    }
}

/// A user-defined function: named parameters and a template body.
///
/// The body is compiled once. It is evaluated in a fresh [`CallScope`] whose
/// parent is the scope the macro was defined in, so variables visible at the
/// call site never leak into the body.
#[derive(Debug, Clone, PartialEq)]
pub struct Macro {
    params: Vec<String>,
    body: Expression,
    max_depth: Option<usize>,
}

impl Macro {
    pub fn new(params: Vec<String>, body: Expression) -> Self {
        Self {
            params,
            body,
            max_depth: None,
        }
    }

    /// Compile `body` as a template.
    pub fn compile(params: Vec<String>, body: Option<&str>) -> ExprResult<Self> {
        Ok(Self::new(params, parse_template(body)?))
    }

    /// Fail calls nested deeper than `max_depth` macro calls. `None`
    /// leaves recursion unbounded.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn body(&self) -> &Expression {
        &self.body
    }
}

impl FunctionPrototype for Macro {
    fn call(&self, invocation: &Invocation<'_>) -> ExprResult<Value> {
        let depth = invocation.depth + 1;
        if let Some(max_depth) = self.max_depth {
            if depth > max_depth {
                return Err(ExprError::RecursionLimit {
                    name: invocation.name.to_string(),
                    max_depth,
                });
            }
        }

        if invocation.args.len() > self.params.len() {
            warn!(
                name = invocation.name,
                expected = self.params.len(),
                got = invocation.args.len(),
                "Ignoring surplus macro arguments"
            );
        }
        trace!(name = invocation.name, depth, "Calling macro");

        let params: HashMap<&str, Binding<'_>> = self
            .params
            .iter()
            .map(String::as_str)
            .zip(invocation.args.iter().copied())
            .collect();
        let scope = CallScope::new(params, invocation.definition);
        self.body.evaluate_at(&scope, depth)
    }
}
