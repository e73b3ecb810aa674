/*
 * value.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Values produced by expression evaluation.
//!
//! The expression language only distinguishes "string" from "anything else".
//! Anything else is carried as an opaque, shareable value that the language
//! itself never inspects.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A value that is not a string, produced by a registered function.
///
/// Implemented for every `Debug + Display + Send + Sync` type.
pub trait OpaqueValue: fmt::Debug + fmt::Display + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<T> OpaqueValue for T
where
    T: Any + fmt::Debug + fmt::Display + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The result of evaluating an expression.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// The value of an absent field.
    #[default]
    Null,

    /// A string value.
    Text(String),

    /// A non-string value.
    Opaque(Arc<dyn OpaqueValue>),
}

impl Value {
    pub fn text(text: impl Into<String>) -> Self {
        Value::Text(text.into())
    }

    pub fn opaque<T: OpaqueValue + 'static>(value: T) -> Self {
        Value::Opaque(Arc::new(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Borrow an opaque value as its concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Opaque(value) => (**value).as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Render this value as a string for output.
    ///
    /// - Null: ""
    /// - Text: returned as-is
    /// - Opaque: its `Display` form
    pub fn render(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Text(text) => text.clone(),
            Value::Opaque(value) => value.to_string(),
        }
    }

    /// Like [`Value::render`], but keeps `Null` distinguishable.
    pub fn into_option(self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Text(text) => Some(text),
            Value::Opaque(value) => Some(value.to_string()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Opaque(a), Value::Opaque(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

/// The result type a caller asks the compiler for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpectedType {
    /// A string.
    Text,
    /// Any value, string or not.
    Any,
    /// A non-string value.
    Opaque,
}

impl ExpectedType {
    /// Whether a plain string satisfies this type.
    pub fn accepts_text(self) -> bool {
        !matches!(self, ExpectedType::Opaque)
    }
}

impl fmt::Display for ExpectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedType::Text => write!(f, "a text value"),
            ExpectedType::Any => write!(f, "any value"),
            ExpectedType::Opaque => write!(f, "an opaque value"),
        }
    }
}
