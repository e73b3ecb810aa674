/*
 * settings.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Layered stage settings.
//!
//! Settings are a stack of small string maps, each with a single purpose
//! (environment, command-line options, per-stage parameters). A lookup
//! tries the most recently added layer first. Adding a layer returns a new
//! value; an existing `Settings` never changes.

use indexmap::IndexMap;

/// Working directory of the run.
pub const WORK_DIR: &str = "workDir";

/// The file the run was started from.
pub const INPUT_FILE: &str = "inputFile";

/// One named map of settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsLayer {
    name: String,
    values: IndexMap<String, String>,
}

impl SettingsLayer {
    pub fn new<K, V>(name: impl Into<String>, values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// A resolved setting and the layer it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingValue<'a> {
    pub value: &'a str,
    pub layer: &'a str,
}

/// An immutable stack of settings layers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// First = lowest priority, last = highest.
    layers: Vec<SettingsLayer>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of these settings with `layer` on top.
    pub fn with_layer(&self, layer: SettingsLayer) -> Settings {
        let mut layers = self.layers.clone();
        layers.push(layer);
        Settings { layers }
    }

    /// Like [`Settings::with_layer`], building the layer from pairs.
    pub fn with_values<K, V>(
        &self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Settings
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.with_layer(SettingsLayer::new(name, values))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.resolve(key).map(|setting| setting.value)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Find `key` and report which layer supplied it.
    pub fn resolve(&self, key: &str) -> Option<SettingValue<'_>> {
        self.layers.iter().rev().find_map(|layer| {
            layer.get(key).map(|value| SettingValue {
                value,
                layer: layer.name(),
            })
        })
    }

    /// Layer names, lowest priority first.
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(SettingsLayer::name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn layered() -> Settings {
        Settings::new()
            .with_values("environment", [("HOME", "/home/ada"), (WORK_DIR, "/env")])
            .with_values("options", [(WORK_DIR, "/cli")])
    }

    #[test]
    fn test_last_layer_wins() {
        let settings = layered();
        assert_eq!(settings.get(WORK_DIR), Some("/cli"));
        assert_eq!(settings.get("HOME"), Some("/home/ada"));
        assert_eq!(settings.get("missing"), None);
        assert_eq!(settings.get_or("missing", "fallback"), "fallback");
    }

    #[test]
    fn test_resolve_reports_layer() {
        let settings = layered();
        assert_eq!(
            settings.resolve(WORK_DIR),
            Some(SettingValue {
                value: "/cli",
                layer: "options"
            })
        );
        assert_eq!(settings.resolve("HOME").map(|s| s.layer), Some("environment"));
    }

    #[test]
    fn test_with_layer_leaves_original_untouched() {
        let base = layered();
        let stage = base.with_values("params", [(WORK_DIR, "/stage")]);
        assert_eq!(stage.get(WORK_DIR), Some("/stage"));
        assert_eq!(base.get(WORK_DIR), Some("/cli"));
        assert_eq!(stage.layer_names(), vec!["environment", "options", "params"]);
    }
}
