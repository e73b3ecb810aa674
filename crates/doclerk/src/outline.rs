/*
 * outline.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The `Outline` output stage.
//!
//! Renders its input as a Markdown outline: the document title, one
//! heading per section, scenarios with their goal and context, and
//! numbered steps with every non-empty field.

use std::fmt::Write as _;
use std::fs;
use std::io::Write as _;
use std::path::Path;

use doclerk_core::settings::WORK_DIR;
use doclerk_core::{
    DocRoot, Document, NodeRef, Settings, Stage, StageError, StageInfo, StageResult, StepField,
    Titled,
};
use doclerk_expr::ExprResult;
use tracing::{debug, info};

/// Output path, relative to the working directory. `-` writes to stdout.
pub const OUTPUT_KEY: &str = "outline.output";

const STDOUT: &str = "-";
const NAME: &str = "Outline";

#[derive(Debug, Default, Clone, Copy)]
pub struct OutlineStage;

impl OutlineStage {
    pub fn factory() -> Box<dyn Stage> {
        Box::new(OutlineStage)
    }
}

impl Stage for OutlineStage {
    fn info(&self) -> StageInfo {
        StageInfo {
            name: NAME,
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    fn run(&self, input: &dyn DocRoot, settings: &Settings) -> StageResult<Document> {
        let outline = render_outline(input).map_err(|e| StageError::evaluate(NAME, e))?;

        match settings.get_or(OUTPUT_KEY, STDOUT) {
            STDOUT => {
                debug!("Writing outline to stdout");
                std::io::stdout()
                    .write_all(outline.as_bytes())
                    .map_err(|e| StageError::failed(NAME, e))?;
            }
            output => {
                let path = Path::new(settings.get_or(WORK_DIR, ".")).join(output);
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).map_err(|e| StageError::failed(NAME, e))?;
                }
                fs::write(&path, outline).map_err(|e| StageError::failed(NAME, e))?;
                info!(path = %path.display(), "Wrote outline");
            }
        }
        Ok(Document::blank())
    }
}

/// Render `document` as Markdown.
pub fn render_outline(document: &dyn DocRoot) -> ExprResult<String> {
    let mut out = String::new();
    let heading = match (document.title()?, document.id()) {
        (Some(title), _) if !title.is_empty() => title,
        (_, Some(id)) => id,
        _ => "Untitled".to_string(),
    };
    writeln!(out, "# {heading}").ok();

    for section in document.parts().iter() {
        writeln!(out, "\n## {}", label(*section)?).ok();
        for scenario in section.children() {
            writeln!(out, "\n### {}", label(scenario)?).ok();
            write_field(&mut out, "Goal", &scenario.goal()?);
            write_field(&mut out, "Context", &scenario.scenario_context()?);
            if scenario.children().next().is_some() {
                out.push('\n');
            }
            for (index, step) in scenario.children().enumerate() {
                write_step(&mut out, index + 1, step)?;
            }
        }
    }
    Ok(out)
}

/// Title, falling back to the id.
fn label(node: NodeRef<'_>) -> ExprResult<String> {
    Ok(match node.title()? {
        Some(title) if !title.is_empty() => title,
        _ => node.id().unwrap_or_default().to_string(),
    })
}

fn write_field(out: &mut String, name: &str, value: &str) {
    if !value.is_empty() {
        writeln!(out, "\n**{name}:** {value}").ok();
    }
}

fn write_step(out: &mut String, number: usize, step: NodeRef<'_>) -> ExprResult<()> {
    writeln!(out, "{number}. {}", step.step_field(StepField::Title)?).ok();
    for (field, name) in [
        (StepField::Description, "Description"),
        (StepField::PreCondition, "Pre-condition"),
        (StepField::RequiredData, "Required data"),
        (StepField::ExpectedResult, "Expected result"),
        (StepField::Comment, "Comment"),
    ] {
        let value = step.step_field(field)?;
        if !value.is_empty() {
            writeln!(out, "   - {name}: {value}").ok();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use doclerk_core::{BuildOptions, MergePolicy, RootSource, build, compose, join_with, union};
    use pretty_assertions::assert_eq;

    fn document(yaml: &str) -> Document {
        let source: RootSource = serde_yaml::from_str(yaml).unwrap();
        build(&source, &BuildOptions::default()).unwrap()
    }

    const PLAN: &str = r#"
id: shop
title: "&name plan"
properties:
  name: Shop
sections:
  login:
    title: Login
    scenarios:
      ok:
        title: Valid login
        goal: "Reach $lower(\"HOME\")"
        steps:
          - title: Open login
            expectedResult: Form shown
          - "§cart§add"
      bare: {}
  cart:
    title: Cart
"#;

    #[test]
    fn test_render_outline() {
        let doc = document(PLAN);
        assert_eq!(
            render_outline(&doc).unwrap(),
            "# Shop plan

## Login

### Valid login

**Goal:** Reach home

1. Open login
   - Expected result: Form shown
2. Cart / add
   - Description: See section \"Cart\", scenario \"add\".

### bare

## Cart
"
        );
    }

    #[test]
    fn test_render_composite() {
        let a = document("id: a\nsections:\n  one:\n    title: One\n");
        let b = document("id: b\nsections:\n  two:\n    title: Two\n");
        let policy = MergePolicy::new(join_with(","), join_with(" - "), union);
        let ab = compose(policy, [&a as &dyn DocRoot, &b]).unwrap();
        assert_eq!(render_outline(&ab).unwrap(), "# a,b\n\n## One\n\n## Two\n");
    }

    #[test]
    fn test_stage_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::new()
            .with_values("options", [(WORK_DIR, dir.path().to_str().unwrap())])
            .with_values("params", [(OUTPUT_KEY, "out/plan.md")]);
        let output = OutlineStage.run(&document(PLAN), &settings).unwrap();
        assert!(output.parts().is_empty());
        let written = fs::read_to_string(dir.path().join("out/plan.md")).unwrap();
        assert!(written.starts_with("# Shop plan\n"));
    }
}
