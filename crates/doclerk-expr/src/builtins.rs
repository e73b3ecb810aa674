/*
 * builtins.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The builtin function library.
//!
//! | Function | Result |
//! |---|---|
//! | `upper(x)` | `x` in upper case |
//! | `lower(x)` | `x` in lower case |
//! | `trim(x)` | `x` without surrounding whitespace |
//! | `concat(a, ...)` | all arguments joined together |
//! | `default(x, fallback)` | `x`, or `fallback` when `x` names something undefined |
//!
//! The library is a single shared context, meant to sit at the top of a
//! document's scope chain.

use std::sync::{Arc, LazyLock};

use crate::context::Context;
use crate::error::ExprResult;
use crate::function::{Invocation, native};
use crate::value::Value;

static LIBRARY: LazyLock<Arc<Context>> = LazyLock::new(|| {
    Arc::new(
        Context::builder()
            .function("upper", native(|inv| map_first(inv, |s| s.to_uppercase())))
            .function("lower", native(|inv| map_first(inv, |s| s.to_lowercase())))
            .function("trim", native(|inv| map_first(inv, |s| s.trim().to_string())))
            .function("concat", native(concat))
            .function("default", native(default))
            .build(),
    )
});

/// The shared builtin library context.
pub fn library() -> Arc<Context> {
    Arc::clone(&LIBRARY)
}

fn map_first(invocation: &Invocation<'_>, f: impl Fn(&str) -> String) -> ExprResult<Value> {
    Ok(Value::Text(f(&invocation.arg_string(0)?)))
}

fn concat(invocation: &Invocation<'_>) -> ExprResult<Value> {
    let mut output = String::new();
    for arg in invocation.args {
        output.push_str(&arg.evaluate_string()?);
    }
    Ok(Value::Text(output))
}

fn default(invocation: &Invocation<'_>) -> ExprResult<Value> {
    let Some(primary) = invocation.arg(0) else {
        return invocation.arg(1).map_or(Ok(Value::Null), |fallback| fallback.evaluate());
    };
    match primary.evaluate() {
        Err(e) if e.is_undefined() => match invocation.arg(1) {
            Some(fallback) => fallback.evaluate(),
            None => Err(e),
        },
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExprError;
    use crate::parser::parse_template;
    use pretty_assertions::assert_eq;

    fn eval(source: &str) -> ExprResult<String> {
        let ctx = Context::builder()
            .var("name", parse_template(Some("  Ada Lovelace ")).unwrap())
            .parent(library())
            .build();
        parse_template(Some(source))?.evaluate_string(&ctx)
    }

    #[test]
    fn test_case_and_trim() {
        assert_eq!(eval("$upper(&name)").unwrap(), "  ADA LOVELACE ");
        assert_eq!(eval("$lower(\"MiXeD\")").unwrap(), "mixed");
        assert_eq!(eval("[$trim(&name)]").unwrap(), "[Ada Lovelace]");
        assert_eq!(eval("$upper($trim(&name))").unwrap(), "ADA LOVELACE");
    }

    #[test]
    fn test_missing_argument_is_empty() {
        assert_eq!(eval("[$upper()]").unwrap(), "[]");
    }

    #[test]
    fn test_concat() {
        assert_eq!(eval("$concat(\"a\", \"-\", $trim(&name))").unwrap(), "a-Ada Lovelace");
        assert_eq!(eval("$concat()").unwrap(), "");
    }

    #[test]
    fn test_default() {
        assert_eq!(eval("$default(&nickname, \"anon\")").unwrap(), "anon");
        assert_eq!(eval("$default($trim(&name), \"anon\")").unwrap(), "Ada Lovelace");
        assert_eq!(eval("$default($missing(), \"none\")").unwrap(), "none");
        // The fallback is only evaluated when needed.
        assert_eq!(eval("$default(\"x\", &undefined)").unwrap(), "x");
        assert_eq!(
            eval("$default(&nickname)"),
            Err(ExprError::undefined_variable("nickname"))
        );
    }

    #[test]
    fn test_library_is_shared() {
        assert!(Arc::ptr_eq(&library(), &library()));
        assert_eq!(
            library().function_names(),
            vec!["concat", "default", "lower", "trim", "upper"]
        );
    }
}
