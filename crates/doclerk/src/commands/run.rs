/*
 * run.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Run command implementation
 */

//! Run command implementation.
//!
//! Reads an execution plan and runs each execution as an independent stage
//! chain starting from a blank document. A failing execution is logged and
//! counted; the remaining executions still run.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, error, info};

use doclerk_core::settings::{INPUT_FILE, WORK_DIR};
use doclerk_core::{
    CompositeDocument, DocRoot, Document, MergePolicy, Settings, StageRegistry, StageResult,
    StageRun, Titled, join_with, run_chain, stage, union,
};

use super::registry;
use crate::plan::{Execution, ExecutionPlan};

/// Arguments for the run command
#[derive(Debug)]
pub struct RunArgs {
    /// Working directory stages resolve their files against
    pub work_dir: PathBuf,
    /// Execution plan file
    pub input_file: PathBuf,
}

/// Ids are joined with `,`, titles with ` - `, parts are unioned.
pub fn merge_policy() -> MergePolicy {
    MergePolicy::new(join_with(","), join_with(" - "), union)
}

/// Execute the run command. Returns the number of failed executions.
pub fn execute(args: &RunArgs) -> Result<usize> {
    info!(path = %args.input_file.display(), "Input file");
    info!(path = %args.work_dir.display(), "Work directory");

    let plan = ExecutionPlan::read(&args.input_file)?;
    let registry = registry();
    info!(stages = ?registry.names(), "Found stages");

    let settings = base_settings(&args.work_dir, &args.input_file);
    Ok(run_plan(&plan, &registry, &settings))
}

/// Environment variables below command-line options.
fn base_settings(work_dir: &Path, input_file: &Path) -> Settings {
    Settings::new()
        .with_values("environment", unicode_vars(std::env::vars_os()))
        .with_values(
            "options",
            [
                (WORK_DIR, work_dir.display().to_string()),
                (INPUT_FILE, input_file.display().to_string()),
            ],
        )
}

/// Variables whose name or value is not valid Unicode are skipped.
fn unicode_vars(
    vars: impl IntoIterator<Item = (OsString, OsString)>,
) -> impl Iterator<Item = (String, String)> {
    vars.into_iter().filter_map(|(key, value)| {
        match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (key, _) => {
                debug!(variable = ?key, "Skipping non-Unicode environment variable");
                None
            }
        }
    })
}

/// Run every execution and count the failures.
pub fn run_plan(plan: &ExecutionPlan, registry: &StageRegistry, settings: &Settings) -> usize {
    let mut failures = 0;
    for execution in &plan.plan {
        if let Err(e) = run_execution(execution, registry, settings) {
            error!(execution = execution.id.as_str(), error = %e, "Execution failed");
            failures += 1;
        }
    }
    failures
}

fn run_execution(
    execution: &Execution,
    registry: &StageRegistry,
    settings: &Settings,
) -> StageResult<()> {
    info!(execution = execution.id.as_str(), "Starting execution");
    let runs = execution
        .modules
        .iter()
        .map(|module| -> StageResult<StageRun> {
            Ok(StageRun {
                stage: registry.create(&module.module)?,
                settings: settings.with_values(
                    format!("{} params", module.module),
                    module.params.iter().map(|(k, v)| (k.as_str(), v.as_str())),
                ),
            })
        })
        .collect::<StageResult<Vec<_>>>()?;

    let seed = Document::blank();
    let outputs = run_chain(&seed, &runs, &merge_policy())?;
    if outputs.is_empty() {
        info!(execution = execution.id.as_str(), "Execution has no modules");
        return Ok(());
    }

    let result = CompositeDocument::new(stage::components(&seed, &outputs), merge_policy())?;
    match result.title() {
        Ok(title) => info!(
            execution = execution.id.as_str(),
            id = result.id().as_deref(),
            title = title.as_deref(),
            parts = result.parts().len(),
            "Execution finished"
        ),
        Err(e) => info!(
            execution = execution.id.as_str(),
            error = %e,
            "Execution finished with an unreadable title"
        ),
    }
    Ok(())
}
