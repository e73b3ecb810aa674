/*
 * loader.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Test-plan directory loader.
//!
//! A test plan is a directory tree:
//!
//! ```text
//! plan/
//! ├── root.yml          # id, title, properties, extra macro folders, sections
//! ├── macro/            # one macro per file: {args: [...], return: "..."}
//! │   └── greet.yml
//! └── login/            # one folder per section listed in root.yml
//!     ├── valid.yml     # one scenario per file: {title, goal, context, steps}
//!     └── invalid.yml
//! ```
//!
//! File stems name macros and scenarios. Only `.yml` files are read, in file
//! name order. Macro folders are read in order, `macro/` first; a later
//! definition replaces an earlier one with the same name.

use std::fs;
use std::path::{Path, PathBuf};

use doclerk_core::{BuildOptions, Document, MacroSource, RootSource, ScenarioSource, SectionSource};
use indexmap::IndexMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::error::{LoadError, LoadResult};

/// Default macro folder, next to the root file.
pub const MACRO_DIR: &str = "macro";

/// Extension of every file the loader reads.
pub const YAML_EXTENSION: &str = "yml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RootFile {
    id: Option<String>,
    title: Option<String>,
    properties: IndexMap<String, String>,
    /// Extra macro folders, relative to the root file.
    macros: Vec<String>,
    sections: IndexMap<String, SectionFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SectionFile {
    title: Option<String>,
}

/// Load and build the test plan rooted at `root_file`.
pub fn load(root_file: &Path, options: &BuildOptions) -> LoadResult<Document> {
    let source = load_source(root_file)?;
    Ok(doclerk_core::build(&source, options)?)
}

/// Read the test plan rooted at `root_file` into source data.
pub fn load_source(root_file: &Path) -> LoadResult<RootSource> {
    debug!(path = %root_file.display(), "Loading test plan");
    let root: RootFile = read_yaml(root_file)?;
    let base = root_file.parent().unwrap_or_else(|| Path::new("."));

    let mut macro_dirs = vec![base.join(MACRO_DIR)];
    macro_dirs.extend(root.macros.iter().map(|dir| base.join(dir)));

    let mut macros = IndexMap::new();
    for dir in &macro_dirs {
        if !dir.is_dir() {
            trace!(path = %dir.display(), "No macro folder");
            continue;
        }
        for (name, path) in yaml_files(dir)? {
            macros.insert(name, read_yaml::<MacroSource>(&path)?);
        }
    }

    let mut sections = IndexMap::new();
    for (id, section) in root.sections {
        let scenarios = load_scenarios(&base.join(&id))?;
        sections.insert(
            id,
            SectionSource {
                title: section.title,
                scenarios,
            },
        );
    }

    debug!(
        macros = macros.len(),
        sections = sections.len(),
        "Loaded test plan"
    );
    Ok(RootSource {
        id: root.id,
        title: root.title,
        properties: root.properties,
        macros,
        sections,
    })
}

fn load_scenarios(dir: &Path) -> LoadResult<IndexMap<String, ScenarioSource>> {
    yaml_files(dir)?
        .into_iter()
        .map(|(id, path)| -> LoadResult<(String, ScenarioSource)> {
            Ok((id, read_yaml(&path)?))
        })
        .collect()
}

/// `.yml` files directly inside `dir` as `(stem, path)`, sorted by file name.
fn yaml_files(dir: &Path) -> LoadResult<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(dir).map_err(|e| LoadError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| LoadError::io(dir, e))?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(YAML_EXTENSION) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            files.push((stem.to_string(), path.clone()));
        }
    }
    files.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(files)
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> LoadResult<T> {
    let text = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    if text.trim().is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }
    serde_yaml::from_str(&text).map_err(|source| LoadError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}
