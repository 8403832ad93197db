use cycleflow::task::proxy::NEVER_LATE;
use cycleflow_test_utils::builders::{TaskSectionBuilder, WorkflowFileBuilder, make_proxy};

const EPOCH_2024: i64 = 1_704_067_200; // 2024-01-01T00:00:00Z

#[test]
fn point_as_seconds_is_memoized_and_stable() {
    let defs = WorkflowFileBuilder::new("2024-01-01T00:00:00Z")
        .with_task("daily", TaskSectionBuilder::new("P1D").build())
        .compile();
    let mut daily = make_proxy(&defs, "daily", "2024-01-01T00:00:00Z");

    assert_eq!(daily.get_point_as_seconds(), EPOCH_2024);
    assert_eq!(daily.get_point_as_seconds(), EPOCH_2024);
}

#[test]
fn late_time_is_point_plus_offset() {
    let defs = WorkflowFileBuilder::new("2024-01-01T00:00:00Z")
        .with_task(
            "daily",
            TaskSectionBuilder::new("P1D").late_offset("PT6H").build(),
        )
        .compile();
    let mut daily = make_proxy(&defs, "daily", "2024-01-01T00:00:00Z");

    assert_eq!(daily.get_late_time(), EPOCH_2024 + 6 * 3600);
    assert_eq!(daily.get_late_time(), EPOCH_2024 + 6 * 3600);
}

#[test]
fn no_late_offset_means_never_late() {
    let defs = WorkflowFileBuilder::new("2024-01-01T00:00:00Z")
        .with_task("daily", TaskSectionBuilder::new("P1D").build())
        .compile();
    let mut daily = make_proxy(&defs, "daily", "2024-01-01T00:00:00Z");

    assert_eq!(daily.get_late_time(), NEVER_LATE);
    assert!(!daily.is_late);
}

#[test]
fn expire_time_is_present_only_when_configured() {
    let defs = WorkflowFileBuilder::new("2024-01-01T00:00:00Z")
        .with_task(
            "limited",
            TaskSectionBuilder::new("P1D").expire_offset("P1D").build(),
        )
        .with_task("unlimited", TaskSectionBuilder::new("P1D").build())
        .compile();

    let mut limited = make_proxy(&defs, "limited", "2024-01-01T00:00:00Z");
    assert_eq!(limited.get_expire_time(), Some(EPOCH_2024 + 86_400));
    assert_eq!(limited.get_expire_time(), Some(EPOCH_2024 + 86_400));

    let mut unlimited = make_proxy(&defs, "unlimited", "2024-01-01T00:00:00Z");
    assert_eq!(unlimited.get_expire_time(), None);
}

#[test]
fn gates_advance_with_the_cycle_point() {
    let defs = WorkflowFileBuilder::new("2024-01-01T00:00:00Z")
        .with_task(
            "daily",
            TaskSectionBuilder::new("P1D").late_offset("PT6H").build(),
        )
        .compile();

    let mut tomorrow = make_proxy(&defs, "daily", "2024-01-02T00:00:00Z");
    assert_eq!(tomorrow.get_late_time(), EPOCH_2024 + 86_400 + 6 * 3600);
}
