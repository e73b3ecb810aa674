/*
 * root.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Narrow views over documents.
//!
//! Renderers and composition only need a few capabilities of a tree: its
//! title, its identifier, its top-level parts and name resolution. Both
//! single documents and composites provide them.

use doclerk_expr::{ExprResult, Scope};

use crate::parts::PartSet;

/// Something with an evaluable title.
pub trait Titled {
    /// Evaluate the title. `None` when the title is absent.
    fn title(&self) -> ExprResult<Option<String>>;
}

/// The top of a document tree, single or composite.
pub trait DocRoot: Scope + Titled {
    fn id(&self) -> Option<String>;

    /// Top-level parts, in order.
    fn parts(&self) -> PartSet<'_>;
}
