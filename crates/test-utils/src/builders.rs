#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use cycleflow::config::{
    CyclingMode, RawWorkflowFile, TaskSection, WorkflowDefs, WorkflowFile, WorkflowSection, compile,
};
use cycleflow::cycling::{CyclePoint, TimeZoneOffset};
use cycleflow::task::proxy::TaskProxy;
use cycleflow::task::taskdef::TaskDef;
use cycleflow::types::Platform;

/// Builder for `WorkflowFile` to simplify test setup.
pub struct WorkflowFileBuilder {
    file: RawWorkflowFile,
}

impl WorkflowFileBuilder {
    /// Datetime cycling starting at the given initial point.
    pub fn new(initial_point: &str) -> Self {
        Self {
            file: RawWorkflowFile {
                workflow: WorkflowSection {
                    cycling: CyclingMode::Datetime,
                    initial_point: Some(initial_point.to_string()),
                    final_point: None,
                },
                task: BTreeMap::new(),
            },
        }
    }

    /// Integer cycling starting at the given initial point.
    pub fn integer(initial_point: &str) -> Self {
        let mut builder = Self::new(initial_point);
        builder.file.workflow.cycling = CyclingMode::Integer;
        builder
    }

    pub fn with_final_point(mut self, point: &str) -> Self {
        self.file.workflow.final_point = Some(point.to_string());
        self
    }

    pub fn with_task(mut self, name: &str, task: TaskSection) -> Self {
        self.file.task.insert(name.to_string(), task);
        self
    }

    /// The raw, pre-validation model, for tests exercising validation
    /// failures directly.
    pub fn build_raw(self) -> RawWorkflowFile {
        self.file
    }

    pub fn build(self) -> WorkflowFile {
        WorkflowFile::try_from(self.file).expect("Failed to build valid workflow from builder")
    }

    /// Validate and compile in one step.
    pub fn compile(self) -> WorkflowDefs {
        compile(&self.build()).expect("Failed to compile workflow from builder")
    }
}

/// Builder for `TaskSection`.
pub struct TaskSectionBuilder {
    section: TaskSection,
}

impl TaskSectionBuilder {
    pub fn new(recurrence: &str) -> Self {
        Self {
            section: TaskSection {
                recurrence: vec![recurrence.to_string()],
                clock_trigger: None,
                late_offset: None,
                expire_offset: None,
                retry_delays: vec![],
                submission_retry_delays: vec![],
                triggers: vec![],
                outputs: vec![],
                ext_triggers: vec![],
                xtriggers: vec![],
                family: None,
                members: vec![],
            },
        }
    }

    pub fn recurrence(mut self, spec: &str) -> Self {
        self.section.recurrence.push(spec.to_string());
        self
    }

    pub fn trigger(mut self, reference: &str) -> Self {
        self.section.triggers.push(reference.to_string());
        self
    }

    pub fn clock_trigger(mut self, offset: &str) -> Self {
        self.section.clock_trigger = Some(offset.to_string());
        self
    }

    pub fn late_offset(mut self, offset: &str) -> Self {
        self.section.late_offset = Some(offset.to_string());
        self
    }

    pub fn expire_offset(mut self, offset: &str) -> Self {
        self.section.expire_offset = Some(offset.to_string());
        self
    }

    pub fn retry_delay(mut self, delay: &str) -> Self {
        self.section.retry_delays.push(delay.to_string());
        self
    }

    pub fn submission_retry_delay(mut self, delay: &str) -> Self {
        self.section.submission_retry_delays.push(delay.to_string());
        self
    }

    pub fn output(mut self, message: &str) -> Self {
        self.section.outputs.push(message.to_string());
        self
    }

    pub fn ext_trigger(mut self, name: &str) -> Self {
        self.section.ext_triggers.push(name.to_string());
        self
    }

    pub fn xtrigger(mut self, name: &str) -> Self {
        self.section.xtriggers.push(name.to_string());
        self
    }

    pub fn family(mut self, name: &str) -> Self {
        self.section.family = Some(name.to_string());
        self
    }

    pub fn member(mut self, name: &str) -> Self {
        self.section.members.push(name.to_string());
        self
    }

    pub fn build(self) -> TaskSection {
        self.section
    }
}

/// Look up a compiled task definition by name.
pub fn get_tdef(defs: &WorkflowDefs, name: &str) -> Arc<TaskDef> {
    defs.tasks
        .get(name)
        .unwrap_or_else(|| panic!("no task definition named '{name}'"))
        .clone()
}

/// Spawn an instance of a compiled task at a concrete cycle point, on
/// localhost, with a UTC-pinned timezone so wallclock tests are
/// deterministic.
pub fn make_proxy(defs: &WorkflowDefs, name: &str, point: &str) -> TaskProxy {
    let tdef = get_tdef(defs, name);
    let point = CyclePoint::parse(point).expect("test point must parse");
    TaskProxy::new(
        tdef,
        point,
        Some("1".to_string()),
        Platform::localhost(),
        TimeZoneOffset::utc(),
    )
}
