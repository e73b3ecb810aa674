/*
 * stage.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Stages and the stage registry.
//!
//! A [`Stage`] turns the document accumulated so far into a new document.
//! Input stages ignore their input and load one; output stages render their
//! input and return a blank document. Stages are looked up by name in a
//! [`StageRegistry`], an explicit table filled at startup.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info};

use crate::compose::{CompositeDocument, MergePolicy};
use crate::document::Document;
use crate::error::{StageError, StageResult};
use crate::root::DocRoot;
use crate::settings::Settings;

/// Name and version of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StageInfo {
    pub name: &'static str,
    pub version: &'static str,
}

impl fmt::Display for StageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.version)
    }
}

/// One step of a document chain.
///
/// Stages hold no state between runs; everything a run needs comes from
/// its input and its settings.
pub trait Stage: Send + Sync {
    fn info(&self) -> StageInfo;

    /// Produce this stage's document from the chain's input so far.
    fn run(&self, input: &dyn DocRoot, settings: &Settings) -> StageResult<Document>;
}

/// Creates a fresh stage instance.
pub type StageFactory = fn() -> Box<dyn Stage>;

/// Stage factories by name.
#[derive(Debug, Clone, Default)]
pub struct StageRegistry {
    factories: BTreeMap<String, StageFactory>,
}

impl StageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, factory: StageFactory) {
        let name = name.into();
        debug!(name = name.as_str(), "Registering stage");
        self.factories.insert(name, factory);
    }

    /// Builder-style [`StageRegistry::register`].
    pub fn with(mut self, name: impl Into<String>, factory: StageFactory) -> Self {
        self.register(name, factory);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Instantiate the stage registered under `name`.
    pub fn create(&self, name: &str) -> StageResult<Box<dyn Stage>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| StageError::unknown_stage(name))?;
        Ok(factory())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

/// A stage paired with the settings it runs with.
pub struct StageRun {
    pub stage: Box<dyn Stage>,
    pub settings: Settings,
}

impl fmt::Debug for StageRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageRun")
            .field("stage", &self.stage.info())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Run stages in order and return their outputs.
///
/// The first stage receives `seed`. Each later stage receives the
/// composition of `seed` and every earlier output under `policy`. The
/// first failure stops the chain.
pub fn run_chain(
    seed: &Document,
    runs: &[StageRun],
    policy: &MergePolicy,
) -> StageResult<Vec<Document>> {
    let mut outputs: Vec<Document> = Vec::with_capacity(runs.len());
    for run in runs {
        let info = run.stage.info();
        info!(stage = info.name, version = info.version, "Running stage");
        let output = if outputs.is_empty() {
            run.stage.run(seed, &run.settings)?
        } else {
            let input = CompositeDocument::new(components(seed, &outputs), policy.clone())?;
            run.stage.run(&input, &run.settings)?
        };
        debug!(
            stage = info.name,
            id = output.id().as_deref(),
            parts = output.parts().len(),
            "Stage finished"
        );
        outputs.push(output);
    }
    Ok(outputs)
}

/// `seed` followed by `outputs`, as composite components.
pub fn components<'a>(seed: &'a Document, outputs: &'a [Document]) -> Vec<&'a dyn DocRoot> {
    std::iter::once(seed as &dyn DocRoot)
        .chain(outputs.iter().map(|output| output as &dyn DocRoot))
        .collect()
}
