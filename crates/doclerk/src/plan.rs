/*
 * plan.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Execution plan files.
//!
//! ```yaml
//! plan:
//!   - id: acceptance
//!     modules:
//!       - module: TestPlan
//!         params:
//!           testplan.root: plans/acceptance.yml
//!       - module: Outline
//!         params:
//!           outline.output: out/acceptance.md
//! ```
//!
//! Each execution runs its modules in order as one stage chain. The `params`
//! of a module become the top settings layer of that stage.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExecutionPlan {
    pub plan: Vec<Execution>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Execution {
    pub id: String,
    #[serde(default)]
    pub modules: Vec<ModuleExecution>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModuleExecution {
    /// Registered stage name.
    pub module: String,
    #[serde(default)]
    pub params: IndexMap<String, String>,
}

impl ExecutionPlan {
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("Invalid execution plan")
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read execution plan {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("in {}", path.display()))
    }
}
