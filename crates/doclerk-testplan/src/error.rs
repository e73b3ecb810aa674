/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for test-plan loading.

use std::path::PathBuf;

use doclerk_core::BuildError;
use thiserror::Error;

/// Errors raised while loading a test plan.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A file that must hold a mapping is empty.
    #[error("Empty YAML file: {}", path.display())]
    Empty { path: PathBuf },

    #[error(transparent)]
    Build(#[from] BuildError),
}

impl LoadError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for test-plan loading.
pub type LoadResult<T> = Result<T, LoadError>;
