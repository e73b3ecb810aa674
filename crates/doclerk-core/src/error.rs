/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for building, composing and running documents.

use doclerk_expr::ExprError;
use thiserror::Error;

/// Errors raised while building a document from source data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A raw field failed to compile.
    #[error("Failed to compile {location}: {source}")]
    Expression {
        location: String,
        #[source]
        source: ExprError,
    },

    /// A cross-reference token without both a section and a scenario id.
    #[error("Invalid step reference: {token}")]
    InvalidReference { token: String },

    /// A step entry that is neither a reference nor a step definition.
    #[error("Invalid step in {location}: {entry:?} is not a step reference")]
    InvalidStep { location: String, entry: String },
}

impl BuildError {
    /// Wrap a compile error with the place it came from.
    pub fn expression(location: impl Into<String>, source: ExprError) -> Self {
        Self::Expression {
            location: location.into(),
            source,
        }
    }
}

/// Result type for document building.
pub type BuildResult<T> = Result<T, BuildError>;

/// Errors raised while composing documents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error("A composite document needs at least two components, got {count}")]
    TooFewComponents { count: usize },
}

/// Result type for composition.
pub type ComposeResult<T> = Result<T, ComposeError>;

/// Errors raised while looking up or running a stage.
#[derive(Debug, Error)]
pub enum StageError {
    /// No stage is registered under this name.
    #[error("Stage not found: {name}")]
    UnknownStage { name: String },

    /// A required setting is absent from every layer.
    #[error("Stage '{stage}' requires setting '{key}'")]
    MissingSetting { stage: String, key: String },

    /// The stage built an invalid document.
    #[error("Stage '{stage}' failed to build its document: {source}")]
    Build {
        stage: String,
        #[source]
        source: BuildError,
    },

    /// A document field failed to evaluate.
    #[error("Stage '{stage}' failed to evaluate its input: {source}")]
    Evaluate {
        stage: String,
        #[source]
        source: ExprError,
    },

    #[error(transparent)]
    Compose(#[from] ComposeError),

    /// Any other stage-specific failure.
    #[error("Stage '{stage}' failed: {source}")]
    Failed {
        stage: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StageError {
    pub fn unknown_stage(name: impl Into<String>) -> Self {
        Self::UnknownStage { name: name.into() }
    }

    pub fn missing_setting(stage: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingSetting {
            stage: stage.into(),
            key: key.into(),
        }
    }

    pub fn build(stage: impl Into<String>, source: BuildError) -> Self {
        Self::Build {
            stage: stage.into(),
            source,
        }
    }

    pub fn evaluate(stage: impl Into<String>, source: ExprError) -> Self {
        Self::Evaluate {
            stage: stage.into(),
            source,
        }
    }

    pub fn failed(
        stage: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Failed {
            stage: stage.into(),
            source: source.into(),
        }
    }
}

/// Result type for stages.
pub type StageResult<T> = Result<T, StageError>;
