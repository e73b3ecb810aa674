/*
 * source.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Source data for document trees.
//!
//! These types describe already-parsed key/value data. Every text field is a
//! raw mini-language string that the builder compiles; nothing here is
//! evaluated. Maps keep their insertion order, which is also the order of the
//! built tree's parts.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

/// A whole document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RootSource {
    pub id: Option<String>,
    pub title: Option<String>,
    /// Variables of the document context, compiled as templates.
    pub properties: IndexMap<String, String>,
    /// Functions of the document context, keyed by name.
    pub macros: IndexMap<String, MacroSource>,
    pub sections: IndexMap<String, SectionSource>,
}

/// A user-defined function.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MacroSource {
    /// Parameter names, in call order.
    pub args: Vec<String>,
    /// Body template.
    #[serde(rename = "return")]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SectionSource {
    pub title: Option<String>,
    pub scenarios: IndexMap<String, ScenarioSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScenarioSource {
    pub title: Option<String>,
    pub goal: Option<String>,
    pub context: Option<String>,
    /// Null entries, and a null list, are skipped.
    #[serde(deserialize_with = "non_null_steps")]
    pub steps: Vec<StepEntry>,
}

fn non_null_steps<'de, D>(deserializer: D) -> Result<Vec<StepEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Option<Vec<Option<StepEntry>>> = Option::deserialize(deserializer)?;
    Ok(entries.into_iter().flatten().flatten().collect())
}

/// One entry of a scenario's step list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StepEntry {
    /// A cross-reference token such as `§section§scenario§step`.
    Reference(String),
    /// A step defined in place.
    Inline(StepSource),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StepSource {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub pre_condition: Option<String>,
    pub required_data: Option<String>,
    pub expected_result: Option<String>,
    pub comment: Option<String>,
}
