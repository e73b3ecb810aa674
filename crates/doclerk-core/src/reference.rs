/*
 * reference.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Step cross-references.
//!
//! A step list entry starting with [`REFERENCE_MARKER`] points at another
//! part of the same document: `§section§scenario` or
//! `§section§scenario§step`. The target is only looked up when the
//! reference is displayed, so it may point forward. A missing section is
//! shown as placeholder text instead of failing.

use std::fmt;
use std::str::FromStr;

use crate::error::BuildError;

/// Leads and separates the fields of a cross-reference token.
pub const REFERENCE_MARKER: char = '§';

/// Where a step reference points.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StepTarget {
    pub section: String,
    pub scenario: String,
    pub step: Option<String>,
}

impl StepTarget {
    pub fn new(
        section: impl Into<String>,
        scenario: impl Into<String>,
        step: Option<String>,
    ) -> Self {
        Self {
            section: section.into(),
            scenario: scenario.into(),
            step,
        }
    }

    /// Whether `entry` is written as a cross-reference.
    pub fn is_reference(entry: &str) -> bool {
        entry.starts_with(REFERENCE_MARKER)
    }

    /// Displayed title, given the target section's title.
    pub fn title(&self, section_title: &str) -> String {
        format!("{section_title} / {}", self.scenario)
    }

    /// Displayed description, given the target section's title.
    pub fn description(&self, section_title: &str) -> String {
        let mut description = format!(
            "See section \"{section_title}\", scenario \"{}\"",
            self.scenario
        );
        if let Some(step) = &self.step {
            description.push_str(&format!(", step \"{step}\""));
        }
        description.push('.');
        description
    }
}

/// Placeholder shown for a section id that matches no part.
pub fn undefined_section(id: &str) -> String {
    format!("Undefined section: `{id}`")
}

impl FromStr for StepTarget {
    type Err = BuildError;

    /// Parse a `§section§scenario[§step]` token. Everything after the third
    /// marker belongs to the step id.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let invalid = || BuildError::InvalidReference {
            token: token.to_string(),
        };
        let rest = token.strip_prefix(REFERENCE_MARKER).ok_or_else(invalid)?;
        let mut fields = rest.splitn(3, REFERENCE_MARKER);
        let section = fields.next().ok_or_else(invalid)?;
        let scenario = fields.next().ok_or_else(invalid)?;
        Ok(Self::new(section, scenario, fields.next().map(str::to_string)))
    }
}

impl fmt::Display for StepTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{REFERENCE_MARKER}{}{REFERENCE_MARKER}{}", self.section, self.scenario)?;
        if let Some(step) = &self.step {
            write!(f, "{REFERENCE_MARKER}{step}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse() {
        assert_eq!(
            "§login§ok".parse::<StepTarget>().unwrap(),
            StepTarget::new("login", "ok", None)
        );
        assert_eq!(
            "§login§ok§3".parse::<StepTarget>().unwrap(),
            StepTarget::new("login", "ok", Some("3".to_string()))
        );
        assert_eq!(
            "§a§b§c§d".parse::<StepTarget>().unwrap(),
            StepTarget::new("a", "b", Some("c§d".to_string()))
        );
    }

    #[test]
    fn test_parse_errors() {
        for token in ["§login", "§", "login§ok"] {
            assert_eq!(
                token.parse::<StepTarget>(),
                Err(BuildError::InvalidReference {
                    token: token.to_string()
                }),
                "token {token:?}"
            );
        }
    }

    #[test]
    fn test_display_round_trip() {
        let target = StepTarget::new("s", "c", Some("2".to_string()));
        assert_eq!(target.to_string(), "§s§c§2");
        assert_eq!(target.to_string().parse::<StepTarget>().unwrap(), target);
    }

    #[test]
    fn test_display_text() {
        let target = StepTarget::new("login", "ok", None);
        assert_eq!(target.title("Login"), "Login / ok");
        assert_eq!(
            target.description("Login"),
            "See section \"Login\", scenario \"ok\"."
        );
        let target = StepTarget::new("login", "ok", Some("2".to_string()));
        assert_eq!(
            target.description("Login"),
            "See section \"Login\", scenario \"ok\", step \"2\"."
        );
        assert_eq!(undefined_section("nope"), "Undefined section: `nope`");
    }
}
