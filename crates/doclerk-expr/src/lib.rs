/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Expression mini-language for Doclerk documents.
//!
//! Raw document fields are compiled once into [`Expression`] trees and
//! evaluated later, on demand, against a [`Scope`]. The language has:
//!
//! - Variable references: `&name`
//! - Function calls: `$name(arg, ...)`, with arguments passed unevaluated
//! - String literals: `"text"`, with `\"` and `\\` escapes
//! - Templates: free text mixing literal runs with the references above
//!
//! # Scoping
//!
//! A [`Context`] binds variables and functions in two independent
//! namespaces and falls back to an optional parent. Resolution is lexical:
//! a variable's expression is evaluated in the context that owns it, and a
//! [`Macro`] body sees its parameters plus the context it was defined in,
//! never the caller's.
//!
//! # Example
//!
//! ```
//! use doclerk_expr::{Context, Expression, Value, native, parse_template};
//!
//! let ctx = Context::builder()
//!     .var("name", Expression::text("Ada"))
//!     .function("count", native(|_| Ok(Value::text("3"))))
//!     .build();
//!
//! let template = parse_template(Some("Hello, &name, you have $count() items.")).unwrap();
//! assert_eq!(
//!     template.evaluate_string(&ctx).unwrap(),
//!     "Hello, Ada, you have 3 items."
//! );
//! ```

pub mod ast;
pub mod builtins;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod function;
pub mod parser;
pub mod value;

// Re-export main types at crate root
pub use ast::Expression;
pub use context::{Binding, CallScope, Context, ContextBuilder, FunctionRef, Scope};
pub use error::{ExprError, ExprResult};
pub use function::{FunctionPrototype, Invocation, Macro, NativeFunction, native};
pub use parser::{FUNCTION_SIGIL, VAR_SIGIL, parse_expression, parse_template};
pub use value::{ExpectedType, OpaqueValue, Value};
