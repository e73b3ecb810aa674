/*
 * ast.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Expression tree types.
//!
//! An [`Expression`] is built once by the compiler and never changes. It does
//! not know which scope it will be evaluated against; callers pair it with a
//! scope through a [`crate::Binding`].

use crate::value::Value;

/// A lazily evaluated expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A constant.
    Literal(Value),

    /// Variable reference: `&name`
    VarRef(String),

    /// Function call: `$name(arg, ...)`. Arguments are handed to the
    /// function unevaluated.
    Call { name: String, args: Vec<Expression> },

    /// Template text: each child is rendered and the results concatenated.
    Concat(Vec<Expression>),
}

impl Expression {
    /// A constant string.
    pub fn text(text: impl Into<String>) -> Self {
        Expression::Literal(Value::text(text))
    }

    /// The constant of an absent field.
    pub fn null() -> Self {
        Expression::Literal(Value::Null)
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expression::VarRef(name.into())
    }

    pub fn call(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::Call {
            name: name.into(),
            args,
        }
    }
}

impl Default for Expression {
    fn default() -> Self {
        Expression::null()
    }
}
