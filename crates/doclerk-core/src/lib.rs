/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Document trees for Doclerk.
//!
//! - [`build`] turns [`RootSource`] data into a [`Document`]: an arena of
//!   root, section, scenario, step and step-reference nodes whose text fields
//!   are compiled expressions, evaluated on every access.
//! - [`compose`] presents several documents as one [`CompositeDocument`],
//!   combining ids, titles and parts under a [`MergePolicy`] and resolving
//!   names from the last component to the first.
//! - [`Stage`]s produce documents from [`Settings`] and are looked up in a
//!   [`StageRegistry`].
//!
//! This crate performs no I/O.

pub mod builder;
pub mod compose;
pub mod document;
pub mod error;
pub mod parts;
pub mod reference;
pub mod root;
pub mod settings;
pub mod source;
pub mod stage;

// Re-export main types at crate root
pub use builder::{BuildOptions, build};
pub use compose::{
    CompositeDocument, MergePolicy, compose, join_with, prefer_first, prefer_last, union,
};
pub use document::{Document, Node, NodeId, NodeKind, NodeRef, StepField};
pub use error::{BuildError, BuildResult, ComposeError, ComposeResult, StageError, StageResult};
pub use parts::PartSet;
pub use reference::{REFERENCE_MARKER, StepTarget};
pub use root::{DocRoot, Titled};
pub use settings::{SettingValue, Settings, SettingsLayer};
pub use source::{MacroSource, RootSource, ScenarioSource, SectionSource, StepEntry, StepSource};
pub use stage::{Stage, StageFactory, StageInfo, StageRegistry, StageRun, run_chain};
