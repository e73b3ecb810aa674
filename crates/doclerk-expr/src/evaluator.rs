/*
 * evaluator.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Expression evaluation.

use tracing::trace;

use crate::ast::Expression;
use crate::context::{Binding, Scope};
use crate::error::ExprResult;
use crate::value::Value;

impl Expression {
    /// Evaluate this expression against `scope`.
    ///
    /// Variable references are evaluated in the scope that owns the binding.
    /// Call arguments are bound to `scope` and handed over unevaluated.
    ///
    /// In a [`Expression::Concat`], a child that fails contributes its error
    /// message in place of its output and the remaining children still run.
    pub fn evaluate(&self, scope: &dyn Scope) -> ExprResult<Value> {
        self.evaluate_at(scope, 0)
    }

    /// Evaluate inside `depth` enclosing macro calls.
    ///
    /// The depth is handed to every binding and call this evaluation
    /// reaches, whichever scope they resolve in.
    pub fn evaluate_at(&self, scope: &dyn Scope, depth: usize) -> ExprResult<Value> {
        match self {
            Expression::Literal(value) => Ok(value.clone()),

            Expression::VarRef(name) => {
                trace!(name = name.as_str(), "Resolving variable");
                scope.get_var(name)?.at_depth(depth).evaluate()
            }

            Expression::Call { name, args } => {
                let function = scope.get_function(name)?;
                let bound: Vec<Binding<'_>> = args
                    .iter()
                    .map(|arg| Binding::new(arg, scope).at_depth(depth))
                    .collect();
                function.call(name, &bound, scope, depth)
            }

            Expression::Concat(parts) => {
                let mut output = String::new();
                for part in parts {
                    match part.evaluate_at(scope, depth) {
                        Ok(value) => output.push_str(&value.render()),
                        Err(e) => output.push_str(&e.to_string()),
                    }
                }
                Ok(Value::Text(output))
            }
        }
    }

    /// Evaluate and render as a string.
    pub fn evaluate_string(&self, scope: &dyn Scope) -> ExprResult<String> {
        Ok(self.evaluate(scope)?.render())
    }
}
