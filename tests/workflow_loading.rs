use std::io::Write;

use cycleflow::config::loader::{load_and_validate, load_workflow};
use cycleflow::config::{WorkflowFile, compile};
use cycleflow::errors::CycleflowError;
use cycleflow_test_utils::builders::{TaskSectionBuilder, WorkflowFileBuilder};
use tempfile::NamedTempFile;

fn write_workflow(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp workflow file");
    file.write_all(contents.as_bytes()).expect("write workflow");
    file
}

#[test]
fn loads_a_complete_workflow_from_toml() {
    let file = write_workflow(
        r#"
[workflow]
cycling = "datetime"
initial_point = "2024-01-01T00:00:00Z"
final_point = "2024-12-31T00:00:00Z"

[task.obs]
recurrence = ["PT6H"]

[task.forecast]
recurrence = ["PT6H"]
triggers = ["obs:succeeded", "forecast[-PT6H]:succeeded"]
clock_trigger = "PT1H"
retry_delays = ["PT30S", "PT5M"]
outputs = ["products uploaded"]
"#,
    );

    let defs = load_workflow(file.path()).unwrap();
    assert_eq!(defs.tasks.len(), 2);
    assert_eq!(defs.initial_point.to_string(), "2024-01-01T00:00:00Z");
    assert!(defs.final_point.is_some());

    let forecast = defs.tasks.get("forecast").unwrap();
    assert_eq!(forecast.prerequisites.len(), 2);
    assert_eq!(forecast.execution_retry_delays.len(), 2);
    assert!(forecast.clocktrigger_offset.is_some());
    assert_eq!(forecast.custom_outputs, vec!["products uploaded".to_string()]);

    // obs spawns forecast at the same point; forecast also spawns its own
    // next occurrence.
    let obs = defs.tasks.get("obs").unwrap();
    assert_eq!(obs.graph_children.get("succeeded").unwrap().len(), 1);
    assert_eq!(forecast.graph_children.get("succeeded").unwrap().len(), 1);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_workflow("/nonexistent/Workflow.toml").unwrap_err();
    assert!(matches!(err, CycleflowError::Io(_)));
}

#[test]
fn invalid_toml_is_a_parse_error() {
    let file = write_workflow("[workflow\ninitial_point = ");
    let err = load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, CycleflowError::Toml(_)));
}

#[test]
fn workflow_without_tasks_is_rejected() {
    let file = write_workflow(
        r#"
[workflow]
initial_point = "2024-01-01T00:00:00Z"
"#,
    );
    let err = load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, CycleflowError::Config(_)));
}

#[test]
fn missing_initial_point_is_rejected() {
    let file = write_workflow(
        r#"
[task.solo]
recurrence = ["P1D"]
"#,
    );
    let err = load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, CycleflowError::Config(_)));
}

#[test]
fn task_without_recurrence_is_rejected() {
    let mut raw = WorkflowFileBuilder::new("2024-01-01T00:00:00Z")
        .with_task("solo", TaskSectionBuilder::new("P1D").build())
        .build_raw();
    raw.task.get_mut("solo").unwrap().recurrence.clear();

    let err = WorkflowFile::try_from(raw).unwrap_err();
    assert!(matches!(err, CycleflowError::Config(_)));
}

#[test]
fn trigger_on_unknown_task_is_rejected() {
    let raw = WorkflowFileBuilder::new("2024-01-01T00:00:00Z")
        .with_task(
            "solo",
            TaskSectionBuilder::new("P1D").trigger("ghost:succeeded").build(),
        )
        .build_raw();
    let err = WorkflowFile::try_from(raw).unwrap_err();
    assert!(matches!(err, CycleflowError::Config(_)));
}

#[test]
fn unparsable_trigger_reference_is_a_graph_error() {
    let raw = WorkflowFileBuilder::new("2024-01-01T00:00:00Z")
        .with_task(
            "solo",
            TaskSectionBuilder::new("P1D").trigger(":::").build(),
        )
        .build_raw();
    let err = WorkflowFile::try_from(raw).unwrap_err();
    assert!(matches!(err, CycleflowError::GraphDefinition(_)));
}

#[test]
fn same_point_self_dependency_is_rejected() {
    let raw = WorkflowFileBuilder::new("2024-01-01T00:00:00Z")
        .with_task(
            "solo",
            TaskSectionBuilder::new("P1D").trigger("solo:succeeded").build(),
        )
        .build_raw();
    let err = WorkflowFile::try_from(raw).unwrap_err();
    assert!(matches!(err, CycleflowError::Config(_)));
}

#[test]
fn previous_cycle_self_dependency_is_allowed() {
    let defs = WorkflowFileBuilder::new("2024-01-01T00:00:00Z")
        .with_task(
            "solo",
            TaskSectionBuilder::new("P1D").trigger("solo[-P1D]:succeeded").build(),
        )
        .compile();
    assert_eq!(defs.tasks.len(), 1);
}

#[test]
fn same_point_dependency_cycle_is_rejected() {
    let raw = WorkflowFileBuilder::new("2024-01-01T00:00:00Z")
        .with_task(
            "a",
            TaskSectionBuilder::new("P1D").trigger("b:succeeded").build(),
        )
        .with_task(
            "b",
            TaskSectionBuilder::new("P1D").trigger("a:succeeded").build(),
        )
        .build_raw();
    let err = WorkflowFile::try_from(raw).unwrap_err();
    assert!(matches!(err, CycleflowError::GraphDefinition(_)));
}

#[test]
fn cross_cycle_edges_do_not_count_as_cycles() {
    let defs = WorkflowFileBuilder::new("2024-01-01T00:00:00Z")
        .with_task(
            "a",
            TaskSectionBuilder::new("P1D").trigger("b[-P1D]:succeeded").build(),
        )
        .with_task(
            "b",
            TaskSectionBuilder::new("P1D").trigger("a:succeeded").build(),
        )
        .compile();
    assert_eq!(defs.tasks.len(), 2);
}

#[test]
fn malformed_retry_delay_is_rejected_at_compile() {
    let file = WorkflowFileBuilder::new("2024-01-01T00:00:00Z")
        .with_task(
            "model",
            TaskSectionBuilder::new("P1D").retry_delay("30 seconds").build(),
        )
        .build();
    let err = compile(&file).unwrap_err();
    assert!(matches!(err, CycleflowError::MalformedDuration(_)));
}

#[test]
fn non_positive_recurrence_is_rejected_at_compile() {
    let file = WorkflowFileBuilder::new("2024-01-01T00:00:00Z")
        .with_task("model", TaskSectionBuilder::new("-P1D").build())
        .build();
    let err = compile(&file).unwrap_err();
    assert!(matches!(err, CycleflowError::Config(_)));
}

#[test]
fn cycling_mode_and_point_family_must_agree() {
    let file = WorkflowFileBuilder::integer("2024-01-01T00:00:00Z")
        .with_task("model", TaskSectionBuilder::new("P1").build())
        .build();
    assert!(matches!(compile(&file), Err(CycleflowError::Config(_))));

    let file = WorkflowFileBuilder::new("1")
        .with_task("model", TaskSectionBuilder::new("P1D").build())
        .build();
    assert!(matches!(compile(&file), Err(CycleflowError::Config(_))));
}

#[test]
fn unknown_family_member_is_rejected() {
    let raw = WorkflowFileBuilder::new("2024-01-01T00:00:00Z")
        .with_task(
            "FAM",
            TaskSectionBuilder::new("P1D").member("ghost").build(),
        )
        .build_raw();
    let err = WorkflowFile::try_from(raw).unwrap_err();
    assert!(matches!(err, CycleflowError::Config(_)));
}

#[test]
fn family_and_member_lists_must_agree() {
    let raw = WorkflowFileBuilder::new("2024-01-01T00:00:00Z")
        .with_task("m1", TaskSectionBuilder::new("P1D").family("FAM").build())
        .with_task("FAM", TaskSectionBuilder::new("P1D").build())
        .build_raw();
    let err = WorkflowFile::try_from(raw).unwrap_err();
    assert!(matches!(err, CycleflowError::Config(_)));
}

#[test]
fn nested_families_are_rejected() {
    let raw = WorkflowFileBuilder::new("2024-01-01T00:00:00Z")
        .with_task("leaf", TaskSectionBuilder::new("P1D").family("INNER").build())
        .with_task(
            "INNER",
            TaskSectionBuilder::new("P1D").family("OUTER").member("leaf").build(),
        )
        .with_task(
            "OUTER",
            TaskSectionBuilder::new("P1D").member("INNER").build(),
        )
        .build_raw();
    let err = WorkflowFile::try_from(raw).unwrap_err();
    assert!(matches!(err, CycleflowError::Config(_)));
}

#[test]
fn member_namespace_hierarchy_names_its_family() {
    let defs = WorkflowFileBuilder::new("2024-01-01T00:00:00Z")
        .with_task("m1", TaskSectionBuilder::new("P1D").family("FAM").build())
        .with_task("FAM", TaskSectionBuilder::new("P1D").member("m1").build())
        .compile();

    let m1 = defs.tasks.get("m1").unwrap();
    assert_eq!(m1.namespace_hierarchy, vec!["FAM".to_string()]);
    assert!(defs.tasks.get("FAM").unwrap().is_family());
}
