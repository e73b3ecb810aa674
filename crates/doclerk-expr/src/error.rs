/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for expression compilation and evaluation.

use thiserror::Error;

use crate::value::ExpectedType;

/// Errors raised while compiling or evaluating expressions.
///
/// `Syntax` and `TypeMismatch` are raised at compile time. The undefined
/// name kinds are only raised when an expression is evaluated, so a branch
/// that is never evaluated never fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    /// Malformed mini-language text.
    #[error("Syntax error: {message}")]
    Syntax { message: String },

    /// A variable name is absent along the whole scope chain.
    #[error("Undefined variable: {name}")]
    UndefinedVariable { name: String },

    /// A function name is absent along the whole scope chain.
    #[error("Undefined function: {name}")]
    UndefinedFunction { name: String },

    /// The requested result type cannot be produced by the expression's shape.
    #[error("Type mismatch: expression {expression:?} cannot produce {expected}")]
    TypeMismatch {
        expression: String,
        expected: ExpectedType,
    },

    /// Macro nesting went deeper than the configured guard.
    #[error("Macro recursion limit exceeded (depth > {max_depth}): {name}")]
    RecursionLimit { name: String, max_depth: usize },
}

impl ExprError {
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
        }
    }

    pub fn undefined_variable(name: impl Into<String>) -> Self {
        Self::UndefinedVariable { name: name.into() }
    }

    pub fn undefined_function(name: impl Into<String>) -> Self {
        Self::UndefinedFunction { name: name.into() }
    }

    /// Whether this is one of the "name not found" kinds.
    pub fn is_undefined(&self) -> bool {
        matches!(
            self,
            Self::UndefinedVariable { .. } | Self::UndefinedFunction { .. }
        )
    }
}

/// Result type for expression operations.
pub type ExprResult<T> = Result<T, ExprError>;
