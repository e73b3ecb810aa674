/*
 * compose.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Document composition.
//!
//! A [`CompositeDocument`] presents two or more document roots as one:
//!
//! - id, title and parts are folded left to right with the combinators of a
//!   [`MergePolicy`];
//! - variable and function lookups try the last component first and move
//!   towards the first only while the name is undefined.
//!
//! Components are borrowed and never modified. A composite is itself a
//! [`DocRoot`], so composites nest.

use std::fmt;
use std::sync::Arc;

use doclerk_expr::{Binding, ExprError, ExprResult, FunctionRef, Scope};
use tracing::trace;

use crate::error::{ComposeError, ComposeResult};
use crate::parts::PartSet;
use crate::root::{DocRoot, Titled};

type TextMerge = Arc<dyn Fn(Option<String>, Option<String>) -> Option<String> + Send + Sync>;
type PartsMerge = Arc<dyn for<'d> Fn(PartSet<'d>, PartSet<'d>) -> PartSet<'d> + Send + Sync>;

/// How a composite combines its components' id, title and parts.
///
/// Each combinator receives the value accumulated so far and the next
/// component's value.
#[derive(Clone)]
pub struct MergePolicy {
    id: TextMerge,
    title: TextMerge,
    parts: PartsMerge,
}

impl MergePolicy {
    pub fn new<I, T, P>(id: I, title: T, parts: P) -> Self
    where
        I: Fn(Option<String>, Option<String>) -> Option<String> + Send + Sync + 'static,
        T: Fn(Option<String>, Option<String>) -> Option<String> + Send + Sync + 'static,
        P: for<'d> Fn(PartSet<'d>, PartSet<'d>) -> PartSet<'d> + Send + Sync + 'static,
    {
        Self {
            id: Arc::new(id),
            title: Arc::new(title),
            parts: Arc::new(parts),
        }
    }

    pub fn merge_id(&self, current: Option<String>, next: Option<String>) -> Option<String> {
        (self.id)(current, next)
    }

    pub fn merge_title(&self, current: Option<String>, next: Option<String>) -> Option<String> {
        (self.title)(current, next)
    }

    pub fn merge_parts<'d>(&self, current: PartSet<'d>, next: PartSet<'d>) -> PartSet<'d> {
        (self.parts)(current, next)
    }
}

impl fmt::Debug for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergePolicy").finish_non_exhaustive()
    }
}

/// Join both values with `separator`; an absent value yields the other.
pub fn join_with(
    separator: impl Into<String>,
) -> impl Fn(Option<String>, Option<String>) -> Option<String> + Clone + Send + Sync + 'static {
    let separator = separator.into();
    move |current, next| match (current, next) {
        (Some(current), Some(next)) => Some(format!("{current}{separator}{next}")),
        (current, next) => current.or(next),
    }
}

/// Keep the later value unless it is absent.
pub fn prefer_last(current: Option<String>, next: Option<String>) -> Option<String> {
    next.or(current)
}

/// Keep the earlier value unless it is absent.
pub fn prefer_first(current: Option<String>, next: Option<String>) -> Option<String> {
    current.or(next)
}

/// Every part of both sets, earlier parts first.
pub fn union<'d>(current: PartSet<'d>, next: PartSet<'d>) -> PartSet<'d> {
    current.union(next)
}

/// Several document roots presented as one.
pub struct CompositeDocument<'a> {
    first: &'a dyn DocRoot,
    rest: Vec<&'a dyn DocRoot>,
    policy: MergePolicy,
}

impl<'a> CompositeDocument<'a> {
    /// Compose `components` in order. At least two are required.
    pub fn new(mut components: Vec<&'a dyn DocRoot>, policy: MergePolicy) -> ComposeResult<Self> {
        if components.len() < 2 {
            return Err(ComposeError::TooFewComponents {
                count: components.len(),
            });
        }
        let first = components.remove(0);
        Ok(Self {
            first,
            rest: components,
            policy,
        })
    }

    pub fn component_count(&self) -> usize {
        1 + self.rest.len()
    }

    /// Try each component from last to first, moving on only while
    /// `lookup` reports a miss. The first component's answer is final.
    fn search<T>(
        &self,
        lookup: impl Fn(&'a dyn DocRoot) -> ExprResult<T>,
        is_miss: impl Fn(&ExprError) -> bool,
    ) -> ExprResult<T> {
        for (index, component) in self.rest.iter().enumerate().rev() {
            match lookup(*component) {
                Err(e) if is_miss(&e) => {
                    trace!(component = index + 1, error = %e, "Not found in composite component");
                }
                result => return result,
            }
        }
        lookup(self.first)
    }
}

/// Compose documents under `policy`.
pub fn compose<'a>(
    policy: MergePolicy,
    components: impl IntoIterator<Item = &'a dyn DocRoot>,
) -> ComposeResult<CompositeDocument<'a>> {
    CompositeDocument::new(components.into_iter().collect(), policy)
}

impl Scope for CompositeDocument<'_> {
    fn get_var(&self, name: &str) -> ExprResult<Binding<'_>> {
        self.search(
            |component| component.get_var(name),
            |e| matches!(e, ExprError::UndefinedVariable { .. }),
        )
    }

    fn get_function(&self, name: &str) -> ExprResult<FunctionRef<'_>> {
        self.search(
            |component| component.get_function(name),
            |e| matches!(e, ExprError::UndefinedFunction { .. }),
        )
    }
}

impl Titled for CompositeDocument<'_> {
    fn title(&self) -> ExprResult<Option<String>> {
        self.rest
            .iter()
            .try_fold(self.first.title()?, |title, component| -> ExprResult<_> {
                Ok(self.policy.merge_title(title, component.title()?))
            })
    }
}

impl DocRoot for CompositeDocument<'_> {
    fn id(&self) -> Option<String> {
        self.rest.iter().fold(self.first.id(), |id, component| {
            self.policy.merge_id(id, component.id())
        })
    }

    fn parts(&self) -> PartSet<'_> {
        self.rest.iter().fold(self.first.parts(), |parts, component| {
            self.policy.merge_parts(parts, component.parts())
        })
    }
}

impl fmt::Debug for CompositeDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeDocument")
            .field("components", &self.component_count())
            .finish_non_exhaustive()
    }
}
