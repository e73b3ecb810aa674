//! Command implementations for the Doclerk CLI
//!
//! Each command module handles the CLI interface and delegates to the
//! library crates for the actual work.

pub mod run;
pub mod stages;

use doclerk_core::StageRegistry;
use doclerk_testplan::TestPlanStage;

use crate::outline::OutlineStage;

/// Every stage this binary ships with.
pub fn registry() -> StageRegistry {
    StageRegistry::new()
        .with("TestPlan", TestPlanStage::factory)
        .with("Outline", OutlineStage::factory)
}
