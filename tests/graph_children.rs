use cycleflow::cycling::CyclePoint;
use cycleflow::graph::generate_graph_children;
use cycleflow_test_utils::builders::{TaskSectionBuilder, WorkflowFileBuilder, get_tdef, make_proxy};

fn point(s: &str) -> CyclePoint {
    CyclePoint::parse(s).unwrap()
}

#[test]
fn same_point_trigger_spawns_child_at_same_point() {
    let defs = WorkflowFileBuilder::new("2024-01-01T00:00:00Z")
        .with_task("obs", TaskSectionBuilder::new("P1D").build())
        .with_task(
            "forecast",
            TaskSectionBuilder::new("P1D").trigger("obs:succeeded").build(),
        )
        .compile();

    let obs = get_tdef(&defs, "obs");
    let children = generate_graph_children(&obs, &point("2024-01-01T00:00:00Z"));
    assert_eq!(
        children.get("succeeded").unwrap(),
        &vec![("forecast".to_string(), point("2024-01-01T00:00:00Z"))]
    );
}

#[test]
fn offset_triggers_invert_into_forward_spawn_offsets() {
    // post depends on model[-P1D], so model at p spawns post at p + P1D.
    let defs = WorkflowFileBuilder::new("2024-01-01T00:00:00Z")
        .with_task("model", TaskSectionBuilder::new("P1D").build())
        .with_task(
            "post",
            TaskSectionBuilder::new("P1D")
                .trigger("model[-P1D]:succeeded")
                .build(),
        )
        .compile();

    let model = get_tdef(&defs, "model");
    let children = generate_graph_children(&model, &point("2024-01-01T00:00:00Z"));
    assert_eq!(
        children.get("succeeded").unwrap(),
        &vec![("post".to_string(), point("2024-01-02T00:00:00Z"))]
    );
}

#[test]
fn children_are_grouped_by_output_message() {
    let defs = WorkflowFileBuilder::new("2024-01-01T00:00:00Z")
        .with_task(
            "fetch",
            TaskSectionBuilder::new("P1D").output("data ready").build(),
        )
        .with_task(
            "process",
            TaskSectionBuilder::new("P1D").trigger("fetch:data ready").build(),
        )
        .with_task(
            "cleanup",
            TaskSectionBuilder::new("P1D").trigger("fetch:failed").build(),
        )
        .compile();

    let fetch = get_tdef(&defs, "fetch");
    let children = generate_graph_children(&fetch, &point("2024-01-01T00:00:00Z"));
    assert_eq!(
        children.get("data ready").unwrap(),
        &vec![("process".to_string(), point("2024-01-01T00:00:00Z"))]
    );
    assert_eq!(
        children.get("failed").unwrap(),
        &vec![("cleanup".to_string(), point("2024-01-01T00:00:00Z"))]
    );
    assert!(children.get("succeeded").is_none());
}

#[test]
fn family_members_spawn_their_family_on_finished() {
    let defs = WorkflowFileBuilder::new("2024-01-01T00:00:00Z")
        .with_task("m1", TaskSectionBuilder::new("P1D").family("FAM").build())
        .with_task("m2", TaskSectionBuilder::new("P1D").family("FAM").build())
        .with_task(
            "FAM",
            TaskSectionBuilder::new("P1D").member("m1").member("m2").build(),
        )
        .compile();

    let m1 = get_tdef(&defs, "m1");
    let children = generate_graph_children(&m1, &point("2024-01-01T00:00:00Z"));
    assert_eq!(
        children.get("finished").unwrap(),
        &vec![("FAM".to_string(), point("2024-01-01T00:00:00Z"))]
    );
}

#[test]
fn proxies_carry_their_resolved_children() {
    let defs = WorkflowFileBuilder::new("2024-01-01T00:00:00Z")
        .with_task("model", TaskSectionBuilder::new("P1D").build())
        .with_task(
            "post",
            TaskSectionBuilder::new("P1D")
                .trigger("model[-P1D]:succeeded")
                .build(),
        )
        .compile();

    let model = make_proxy(&defs, "model", "2024-01-05T00:00:00Z");
    assert_eq!(
        model.graph_children.get("succeeded").unwrap(),
        &vec![("post".to_string(), point("2024-01-06T00:00:00Z"))]
    );
}

#[test]
fn integer_cycling_children_offset_by_units() {
    let defs = WorkflowFileBuilder::integer("1")
        .with_task("gen", TaskSectionBuilder::new("P1").build())
        .with_task(
            "use",
            TaskSectionBuilder::new("P1").trigger("gen[-P2]:succeeded").build(),
        )
        .compile();

    let generator = get_tdef(&defs, "gen");
    let children = generate_graph_children(&generator, &point("3"));
    assert_eq!(
        children.get("succeeded").unwrap(),
        &vec![("use".to_string(), point("5"))]
    );
}

#[test]
fn next_point_is_the_minimum_across_sequences() {
    let defs = WorkflowFileBuilder::new("2024-01-01T00:00:00Z")
        .with_task(
            "mixed",
            TaskSectionBuilder::new("PT1H").recurrence("PT30M").build(),
        )
        .compile();

    let mixed = make_proxy(&defs, "mixed", "2024-01-01T00:00:00Z");
    assert_eq!(
        mixed.next_point().unwrap(),
        point("2024-01-01T00:30:00Z")
    );
}

#[test]
fn next_point_is_none_when_every_sequence_is_exhausted() {
    let defs = WorkflowFileBuilder::new("2024-01-01T00:00:00Z")
        .with_final_point("2024-01-03T00:00:00Z")
        .with_task("daily", TaskSectionBuilder::new("P1D").build())
        .compile();

    let last = make_proxy(&defs, "daily", "2024-01-03T00:00:00Z");
    assert_eq!(last.next_point(), None);

    let second = make_proxy(&defs, "daily", "2024-01-02T00:00:00Z");
    assert_eq!(second.next_point().unwrap(), point("2024-01-03T00:00:00Z"));
}
