/*
 * composition_tests.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Composition and stage chain tests for doclerk-core.
 */

use doclerk_core::{
    BuildOptions, DocRoot, Document, MergePolicy, RootSource, Settings, Stage, StageError,
    StageInfo, StageRegistry, StageResult, StageRun, StepField, Titled, build, compose,
    join_with, prefer_last, run_chain, union,
};
use doclerk_expr::{ExprError, Expression, Scope, parse_template};
use pretty_assertions::assert_eq;

fn document(yaml: &str) -> Document {
    let source: RootSource = serde_yaml::from_str(yaml).expect("valid source");
    build(&source, &BuildOptions::default()).expect("document builds")
}

fn first() -> Document {
    document(
        r#"
id: a
title: First
properties:
  shared: from first
  only_first: one
macros:
  tag:
    args: [x]
    return: "<first &x>"
sections:
  intro:
    title: Intro
"#,
    )
}

fn second() -> Document {
    document(
        r#"
id: b
title: Second
properties:
  shared: from second
macros:
  tag:
    args: [x]
    return: "<second &x>"
sections:
  intro:
    title: Intro again
  usage:
    title: Usage
"#,
    )
}

fn dash_policy() -> MergePolicy {
    MergePolicy::new(join_with("-"), prefer_last, union)
}

fn eval(scope: &dyn Scope, source: &str) -> String {
    parse_template(Some(source))
        .expect("template compiles")
        .evaluate_string(scope)
        .expect("template evaluates")
}

#[test]
fn test_later_component_wins_lookups() {
    let (a, b) = (first(), second());

    let ab = compose(dash_policy(), [&a as &dyn DocRoot, &b]).unwrap();
    assert_eq!(eval(&ab, "&shared"), "from second");
    assert_eq!(eval(&ab, "$tag(\"t\")"), "<second t>");

    let ba = compose(dash_policy(), [&b as &dyn DocRoot, &a]).unwrap();
    assert_eq!(eval(&ba, "&shared"), "from first");
    assert_eq!(eval(&ba, "$tag(\"t\")"), "<first t>");
}

#[test]
fn test_lookup_falls_back_to_earlier_components() {
    let (a, b) = (first(), second());
    let ab = compose(dash_policy(), [&a as &dyn DocRoot, &b]).unwrap();
    assert_eq!(eval(&ab, "&only_first"), "one");
    // Builtins are reachable through every component.
    assert_eq!(eval(&ab, "$upper(&only_first)"), "ONE");
}

#[test]
fn test_lookup_fails_when_no_component_defines_name() {
    let (a, b) = (first(), second());
    let ab = compose(dash_policy(), [&a as &dyn DocRoot, &b]).unwrap();
    assert_eq!(
        Expression::var("nowhere").evaluate(&ab),
        Err(ExprError::undefined_variable("nowhere"))
    );
    assert_eq!(
        Expression::call("nothing", vec![]).evaluate(&ab),
        Err(ExprError::undefined_function("nothing"))
    );
}

#[test]
fn test_folded_id_title_and_parts() {
    let (a, b) = (first(), second());
    let ab = compose(dash_policy(), [&a as &dyn DocRoot, &b]).unwrap();
    assert_eq!(ab.id(), Some("a-b".to_string()));
    assert_eq!(ab.title().unwrap(), Some("Second".to_string()));

    let titles: Vec<_> = ab
        .parts()
        .iter()
        .map(|part| part.title().unwrap().unwrap_or_default())
        .collect();
    assert_eq!(titles, vec!["Intro", "Intro again", "Usage"]);
}

#[test]
fn test_parts_keep_their_own_context() {
    let a = first();
    let b = document(
        r#"
properties:
  shared: from b
sections:
  s:
    title: "&shared"
"#,
    );
    let ab = compose(dash_policy(), [&a as &dyn DocRoot, &b]).unwrap();
    let section = ab.parts().find("s").unwrap();
    assert_eq!(section.title().unwrap(), Some("from b".to_string()));
    assert_eq!(eval(&ab, "&shared"), "from b");
}

#[test]
fn test_composites_nest() {
    let (a, b) = (first(), second());
    let c = document("id: c\ntitle: Third\n");
    let ab = compose(dash_policy(), [&a as &dyn DocRoot, &b]).unwrap();
    let abc = compose(dash_policy(), [&ab as &dyn DocRoot, &c]).unwrap();
    assert_eq!(abc.id(), Some("a-b-c".to_string()));
    assert_eq!(abc.title().unwrap(), Some("Third".to_string()));
    assert_eq!(eval(&abc, "&shared"), "from second");
    assert_eq!(abc.parts().len(), 3);
}

#[test]
fn test_cross_reference_through_composite_part() {
    let doc = document(
        r#"
sections:
  first:
    scenarios:
      c:
        steps:
          - "§second§d"
  second:
    title: Second section
"#,
    );
    let other = Document::blank();
    let composite = compose(dash_policy(), [&other as &dyn DocRoot, &doc]).unwrap();
    let step = composite
        .parts()
        .find("first")
        .and_then(|s| s.child("c"))
        .and_then(|c| c.children().next())
        .unwrap();
    assert_eq!(
        step.step_field(StepField::Description).unwrap(),
        "See section \"Second section\", scenario \"d\"."
    );
}

/// Builds a one-section document named after the `section` setting and
/// records what it saw of its input.
struct SectionStage;

impl Stage for SectionStage {
    fn info(&self) -> StageInfo {
        StageInfo {
            name: "Section",
            version: "test",
        }
    }

    fn run(&self, input: &dyn DocRoot, settings: &Settings) -> StageResult<Document> {
        let section = settings
            .get("section")
            .ok_or_else(|| StageError::missing_setting("Section", "section"))?;
        let seen: Vec<String> = input
            .parts()
            .iter()
            .filter_map(|part| part.id().map(str::to_string))
            .collect();
        let yaml = format!(
            "id: {section}\ntitle: \"saw [{}]\"\nsections:\n  {section}: {{}}\n",
            seen.join(" ")
        );
        let source: RootSource =
            serde_yaml::from_str(&yaml).map_err(|e| StageError::failed("Section", e))?;
        build(&source, &BuildOptions::default()).map_err(|e| StageError::build("Section", e))
    }
}

fn section_stage() -> Box<dyn Stage> {
    Box::new(SectionStage)
}

#[test]
fn test_registry() {
    let registry = StageRegistry::new()
        .with("Section", section_stage)
        .with("Another", section_stage);
    assert_eq!(registry.names(), vec!["Another", "Section"]);
    assert!(registry.contains("Section"));
    assert_eq!(registry.create("Section").unwrap().info().name, "Section");
    assert!(matches!(
        registry.create("Missing"),
        Err(StageError::UnknownStage { name }) if name == "Missing"
    ));
}

#[test]
fn test_chain_feeds_earlier_outputs_forward() {
    let registry = StageRegistry::new().with("Section", section_stage);
    let runs: Vec<StageRun> = ["one", "two", "three"]
        .into_iter()
        .map(|section| StageRun {
            stage: registry.create("Section").unwrap(),
            settings: Settings::new().with_values("params", [("section", section)]),
        })
        .collect();

    let seed = Document::blank();
    let outputs = run_chain(&seed, &runs, &dash_policy()).unwrap();
    let titles: Vec<_> = outputs
        .iter()
        .map(|doc| doc.title().unwrap().unwrap_or_default())
        .collect();
    assert_eq!(titles, vec!["saw []", "saw [one]", "saw [one two]"]);
}

#[test]
fn test_chain_stops_at_first_failure() {
    let runs = vec![StageRun {
        stage: section_stage(),
        settings: Settings::new(),
    }];
    let err = run_chain(&Document::blank(), &runs, &dash_policy()).unwrap_err();
    assert_eq!(err.to_string(), "Stage 'Section' requires setting 'section'");
}
