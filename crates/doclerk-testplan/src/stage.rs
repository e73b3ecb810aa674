/*
 * stage.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The `TestPlan` input stage.

use std::path::Path;

use doclerk_core::settings::WORK_DIR;
use doclerk_core::{
    BuildOptions, DocRoot, Document, Settings, Stage, StageError, StageInfo, StageResult,
};
use tracing::debug;

use crate::error::LoadError;
use crate::loader::load;

/// Root file name, relative to the working directory.
pub const ROOT_KEY: &str = "testplan.root";

/// Optional macro nesting limit.
pub const MAX_MACRO_DEPTH_KEY: &str = "testplan.maxMacroDepth";

pub const DEFAULT_ROOT: &str = "root.yml";

const NAME: &str = "TestPlan";

/// Loads a YAML test plan. Its input is ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct TestPlanStage;

impl TestPlanStage {
    pub fn factory() -> Box<dyn Stage> {
        Box::new(TestPlanStage)
    }
}

impl Stage for TestPlanStage {
    fn info(&self) -> StageInfo {
        StageInfo {
            name: NAME,
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    fn run(&self, _input: &dyn DocRoot, settings: &Settings) -> StageResult<Document> {
        let work_dir = Path::new(settings.get_or(WORK_DIR, "."));
        let root_file = work_dir.join(settings.get_or(ROOT_KEY, DEFAULT_ROOT));
        debug!(path = %root_file.display(), "Computed test plan root");

        let max_macro_depth = match settings.get(MAX_MACRO_DEPTH_KEY) {
            Some(raw) => Some(raw.trim().parse::<usize>().map_err(|e| {
                StageError::failed(NAME, format!("invalid {MAX_MACRO_DEPTH_KEY} {raw:?}: {e}"))
            })?),
            None => None,
        };
        let options = BuildOptions {
            max_macro_depth,
            ..BuildOptions::default()
        };

        load(&root_file, &options).map_err(|e| match e {
            LoadError::Build(source) => StageError::build(NAME, source),
            other => StageError::failed(NAME, other),
        })
    }
}
