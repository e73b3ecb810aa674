/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! YAML test plans for Doclerk.
//!
//! [`load`] reads a test-plan directory (see [`loader`] for the layout) and
//! builds a [`doclerk_core::Document`]. [`TestPlanStage`] exposes the loader
//! as the `TestPlan` stage, configured through the `workDir`,
//! `testplan.root` and `testplan.maxMacroDepth` settings.

pub mod error;
pub mod loader;
pub mod stage;

pub use error::{LoadError, LoadResult};
pub use loader::{load, load_source};
pub use stage::TestPlanStage;
