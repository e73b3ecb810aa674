/*
 * proptest_composition.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Property-based tests for composite lookup precedence.
 */

use doclerk_core::{
    BuildOptions, DocRoot, Document, MergePolicy, RootSource, build, compose, prefer_last, union,
};
use doclerk_expr::{ExprError, ExprResult, Expression, Scope};
use indexmap::IndexMap;
use proptest::prelude::*;

const NAMES: [&str; 4] = ["a", "b", "c", "d"];

fn document(properties: &IndexMap<String, String>) -> Document {
    let source = RootSource {
        properties: properties.clone(),
        ..RootSource::default()
    };
    build(&source, &BuildOptions::default()).unwrap()
}

fn properties() -> impl Strategy<Value = IndexMap<String, String>> {
    prop::collection::vec((prop::sample::select(NAMES.to_vec()), "[a-z ]{0,6}"), 0..4).prop_map(
        |pairs| {
            pairs
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect()
        },
    )
}

fn lookup(scope: &dyn Scope, name: &str) -> ExprResult<String> {
    Expression::var(name).evaluate_string(scope)
}

fn expected(
    earlier: &IndexMap<String, String>,
    later: &IndexMap<String, String>,
    name: &str,
) -> ExprResult<String> {
    later
        .get(name)
        .or_else(|| earlier.get(name))
        .cloned()
        .ok_or_else(|| ExprError::undefined_variable(name))
}

proptest! {
    #[test]
    fn later_component_takes_precedence(left in properties(), right in properties()) {
        let policy = MergePolicy::new(prefer_last, prefer_last, union);
        let a = document(&left);
        let b = document(&right);
        let ab = compose(policy.clone(), [&a as &dyn DocRoot, &b]).unwrap();
        let ba = compose(policy, [&b as &dyn DocRoot, &a]).unwrap();

        for name in NAMES {
            prop_assert_eq!(lookup(&ab, name), expected(&left, &right, name));
            prop_assert_eq!(lookup(&ba, name), expected(&right, &left, name));
        }
    }
}
