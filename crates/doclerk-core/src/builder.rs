/*
 * builder.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Building document trees from source data.
//!
//! The root comes first: its properties and macros are compiled into the
//! document context. Sections, scenarios and steps follow in source order.
//! Every text field is compiled once, here, and stored unevaluated.

use doclerk_expr::{Context, Expression, Macro, builtins, parse_template};
use tracing::{debug, trace};

use crate::document::{Document, NodeData, NodeId, StepField};
use crate::error::{BuildError, BuildResult};
use crate::reference::StepTarget;
use crate::source::{MacroSource, RootSource, ScenarioSource, SectionSource, StepEntry, StepSource};

/// Options that apply to a whole build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Fail macro calls nested deeper than this. `None` leaves recursion
    /// unbounded.
    pub max_macro_depth: Option<usize>,
    /// Make the builtin function library visible to the document.
    pub builtins: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_macro_depth: None,
            builtins: true,
        }
    }
}

/// Build a document from source data.
pub fn build(source: &RootSource, options: &BuildOptions) -> BuildResult<Document> {
    let context = root_context(source, options)?;
    let title = compile(source.title.as_deref(), || "document title".to_string())?;
    let mut document = Document::new(source.id.clone(), title, context);

    for (id, section) in &source.sections {
        build_section(&mut document, id, section)?;
    }

    debug!(
        id = source.id.as_deref(),
        sections = source.sections.len(),
        nodes = document.node_count(),
        "Built document"
    );
    Ok(document)
}

fn compile(raw: Option<&str>, location: impl FnOnce() -> String) -> BuildResult<Expression> {
    parse_template(raw).map_err(|e| BuildError::expression(location(), e))
}

fn root_context(source: &RootSource, options: &BuildOptions) -> BuildResult<Context> {
    let mut builder = Context::builder();

    for (name, raw) in &source.properties {
        let expr = compile(Some(raw), || format!("property `{name}`"))?;
        builder = builder.var(name.clone(), expr);
    }

    for (name, definition) in &source.macros {
        trace!(name = name.as_str(), args = ?definition.args, "Registering macro");
        builder = builder.function(name.clone(), compile_macro(name, definition, options)?);
    }

    if options.builtins {
        builder = builder.parent(builtins::library());
    }
    Ok(builder.build())
}

fn compile_macro(name: &str, definition: &MacroSource, options: &BuildOptions) -> BuildResult<Macro> {
    Macro::compile(definition.args.clone(), definition.body.as_deref())
        .map(|m| m.with_max_depth(options.max_macro_depth))
        .map_err(|e| BuildError::expression(format!("macro `{name}`"), e))
}

fn build_section(document: &mut Document, id: &str, section: &SectionSource) -> BuildResult<()> {
    let title = compile(section.title.as_deref(), || format!("section `{id}` title"))?;
    let node = document.push(NodeId::ROOT, Some(id.to_string()), NodeData::Section { title });

    for (scenario_id, scenario) in &section.scenarios {
        build_scenario(document, node, &format!("{id}/{scenario_id}"), scenario_id, scenario)?;
    }
    Ok(())
}

fn build_scenario(
    document: &mut Document,
    parent: NodeId,
    location: &str,
    id: &str,
    scenario: &ScenarioSource,
) -> BuildResult<()> {
    let data = NodeData::Scenario {
        title: compile(scenario.title.as_deref(), || format!("scenario `{location}` title"))?,
        goal: compile(scenario.goal.as_deref(), || format!("scenario `{location}` goal"))?,
        context: compile(scenario.context.as_deref(), || {
            format!("scenario `{location}` context")
        })?,
    };
    let node = document.push(parent, Some(id.to_string()), data);

    for (index, entry) in scenario.steps.iter().enumerate() {
        let step_location = format!("{location} step {}", index + 1);
        match entry {
            StepEntry::Reference(token) => {
                if !StepTarget::is_reference(token) {
                    return Err(BuildError::InvalidStep {
                        location: step_location,
                        entry: token.clone(),
                    });
                }
                let target = token.parse::<StepTarget>()?;
                document.push(node, None, NodeData::StepReference { target });
            }
            StepEntry::Inline(step) => {
                let fields = compile_step(&step_location, step)?;
                document.push(node, step.id.clone(), NodeData::Step { fields });
            }
        }
    }
    Ok(())
}

fn compile_step(location: &str, step: &StepSource) -> BuildResult<[Expression; 6]> {
    let raw = |field: StepField| match field {
        StepField::Title => step.title.as_deref(),
        StepField::Description => step.description.as_deref(),
        StepField::PreCondition => step.pre_condition.as_deref(),
        StepField::RequiredData => step.required_data.as_deref(),
        StepField::ExpectedResult => step.expected_result.as_deref(),
        StepField::Comment => step.comment.as_deref(),
    };

    let mut fields: [Expression; 6] = Default::default();
    for field in StepField::ALL {
        fields[field as usize] = compile(raw(field), || format!("{location} {field}"))?;
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NodeKind;
    use crate::root::{DocRoot, Titled};
    use doclerk_expr::ExprError;
    use pretty_assertions::assert_eq;

    fn source(yaml: &str) -> RootSource {
        serde_yaml::from_str(yaml).unwrap()
    }

    const PLAN: &str = r#"
id: plan
title: "&product test plan"
properties:
  product: Widget
  version: "2"
  label: "&product v&version"
macros:
  open:
    args: [page]
    return: "Open the &page page of &product"
sections:
  login:
    title: "Login to &label"
    scenarios:
      ok:
        title: Valid credentials
        goal: "$upper(&product) accepts the user"
        steps:
          - id: "1"
            title: "$open(\"login\")"
            expectedResult: Form shown
          - "§logout§bye"
  logout:
    title: Logout
"#;

    #[test]
    fn test_build_tree() {
        let doc = build(&source(PLAN), &BuildOptions::default()).unwrap();
        assert_eq!(doc.id(), Some("plan".to_string()));
        assert_eq!(doc.title().unwrap(), Some("Widget test plan".to_string()));

        let login = doc.root().child("login").unwrap();
        assert_eq!(login.title().unwrap(), Some("Login to Widget v2".to_string()));

        let scenario = login.child("ok").unwrap();
        assert_eq!(scenario.goal().unwrap(), "WIDGET accepts the user");

        let steps: Vec<_> = scenario.children().collect();
        assert_eq!(steps[0].kind(), NodeKind::Step);
        assert_eq!(steps[0].id(), Some("1"));
        assert_eq!(
            steps[0].step_field(StepField::Title).unwrap(),
            "Open the login page of Widget"
        );
        assert_eq!(steps[0].step_field(StepField::ExpectedResult).unwrap(), "Form shown");
        assert_eq!(steps[0].step_field(StepField::PreCondition).unwrap(), "");
        assert_eq!(steps[1].kind(), NodeKind::StepReference);
        assert_eq!(steps[1].step_field(StepField::Title).unwrap(), "Logout / bye");
    }

    #[test]
    fn test_without_builtins() {
        let options = BuildOptions {
            builtins: false,
            ..BuildOptions::default()
        };
        let doc = build(&source(PLAN), &options).unwrap();
        let scenario = doc.root().child("login").and_then(|s| s.child("ok")).unwrap();
        assert_eq!(
            scenario.goal().unwrap(),
            "Undefined function: upper accepts the user"
        );
    }

    #[test]
    fn test_macro_depth_option() {
        let doc = build(
            &source(
                r#"
title: "$loop()"
macros:
  loop:
    return: "$loop()"
"#,
            ),
            &BuildOptions {
                max_macro_depth: Some(4),
                ..BuildOptions::default()
            },
        )
        .unwrap();
        assert_eq!(
            doc.title(),
            Err(ExprError::RecursionLimit {
                name: "loop".to_string(),
                max_depth: 4
            })
        );
    }

    #[test]
    fn test_macro_depth_through_property() {
        let doc = build(
            &source(
                r#"
title: "$loop()"
properties:
  p: "$loop()"
macros:
  loop:
    return: "&p"
"#,
            ),
            &BuildOptions {
                max_macro_depth: Some(4),
                ..BuildOptions::default()
            },
        )
        .unwrap();
        assert_eq!(
            doc.title(),
            Err(ExprError::RecursionLimit {
                name: "loop".to_string(),
                max_depth: 4
            })
        );
    }

    #[test]
    fn test_compile_error_location() {
        let err = build(
            &source(
                r#"
sections:
  s:
    scenarios:
      c:
        steps:
          - comment: "$f(\"open"
"#,
            ),
            &BuildOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(
            &err,
            BuildError::Expression { location, source: ExprError::Syntax { .. } }
                if location == "s/c step 1 comment"
        ));
    }

    #[test]
    fn test_invalid_step_entries() {
        let err = build(
            &source("sections: {s: {scenarios: {c: {steps: [\"plain text\"]}}}}"),
            &BuildOptions::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            BuildError::InvalidStep {
                location: "s/c step 1".to_string(),
                entry: "plain text".to_string(),
            }
        );

        let err = build(
            &source("sections: {s: {scenarios: {c: {steps: [\"§s\"]}}}}"),
            &BuildOptions::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            BuildError::InvalidReference {
                token: "§s".to_string()
            }
        );
    }
}
