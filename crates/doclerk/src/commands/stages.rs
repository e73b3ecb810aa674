/*
 * stages.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Stages command implementation
 */

//! Lists the registered stages with their versions.

use super::registry;

/// Execute the stages command
pub fn execute() {
    let registry = registry();
    for name in registry.names() {
        match registry.create(name) {
            Ok(stage) => println!("{}", stage.info()),
            Err(_) => println!("{name}"),
        }
    }
}
