// src/config/model.rs

//! TOML workflow-definition model.
//!
//! This is the "already-parsed definition" surface the runtime consumes:
//!
//! ```toml
//! [workflow]
//! cycling = "datetime"
//! initial_point = "2024-01-01T00:00:00Z"
//!
//! [task.forecast]
//! recurrence = ["P1D"]
//! triggers = ["obs:succeeded", "forecast[-P1D]:succeeded"]
//! retry_delays = ["PT30S", "PT5M"]
//! ```
//!
//! Deserialization produces a [`RawWorkflowFile`]; semantic validation
//! (`TryFrom<RawWorkflowFile>`) produces a [`WorkflowFile`], which
//! `config::compile` turns into immutable task definitions.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Cycling family of the workflow's points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclingMode {
    Datetime,
    Integer,
}

impl Default for CyclingMode {
    fn default() -> Self {
        CyclingMode::Datetime
    }
}

/// Top-level workflow file as deserialized from TOML, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWorkflowFile {
    #[serde(default)]
    pub workflow: WorkflowSection,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskSection>,
}

/// `[workflow]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowSection {
    #[serde(default)]
    pub cycling: CyclingMode,

    /// First point of every recurrence sequence. Required.
    #[serde(default)]
    pub initial_point: Option<String>,

    /// Optional inclusive end bound for every sequence.
    #[serde(default)]
    pub final_point: Option<String>,
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskSection {
    /// One recurrence sequence per interval entry (e.g. `["P1D"]`).
    #[serde(default)]
    pub recurrence: Vec<String>,

    /// Wallclock offset from the cycle point gating readiness.
    #[serde(default)]
    pub clock_trigger: Option<String>,

    /// Offset beyond which the task is reported late if never active.
    #[serde(default)]
    pub late_offset: Option<String>,

    /// Offset beyond which a still-waiting task is considered expired.
    #[serde(default)]
    pub expire_offset: Option<String>,

    /// Execution retry delay schedule (ISO8601 durations).
    #[serde(default)]
    pub retry_delays: Vec<String>,

    /// Submission retry delay schedule.
    #[serde(default)]
    pub submission_retry_delays: Vec<String>,

    /// Upstream dependencies as `task[offset]:message` references; the
    /// message defaults to `succeeded`.
    #[serde(default)]
    pub triggers: Vec<String>,

    /// Custom output messages this task can complete.
    #[serde(default)]
    pub outputs: Vec<String>,

    /// Old-style external trigger names.
    #[serde(default)]
    pub ext_triggers: Vec<String>,

    /// Externally-evaluated condition names.
    #[serde(default)]
    pub xtriggers: Vec<String>,

    /// Name of the family this task belongs to, if any.
    #[serde(default)]
    pub family: Option<String>,

    /// Member names when this task is a family aggregate.
    #[serde(default)]
    pub members: Vec<String>,
}

/// A validated workflow file.
///
/// Constructed only through `TryFrom<RawWorkflowFile>` (see
/// `config::validate`), so holders can rely on reference integrity and
/// acyclicity of the same-point dependency graph.
#[derive(Debug, Clone)]
pub struct WorkflowFile {
    workflow: WorkflowSection,
    task: BTreeMap<String, TaskSection>,
}

impl WorkflowFile {
    /// Only `config::validate` should call this.
    pub(crate) fn new_unchecked(
        workflow: WorkflowSection,
        task: BTreeMap<String, TaskSection>,
    ) -> Self {
        Self { workflow, task }
    }

    pub fn workflow(&self) -> &WorkflowSection {
        &self.workflow
    }

    pub fn tasks(&self) -> &BTreeMap<String, TaskSection> {
        &self.task
    }
}
