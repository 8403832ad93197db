// src/task/state.rs

//! Task status and the mutable condition state attached to an instance.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::cycling::CyclePoint;
use crate::task::outputs::{OUTPUT_FINISHED, Outputs};
use crate::task::prereq::{Condition, Prerequisite};
use crate::task::taskdef::TaskDef;
use crate::task::timer::TimerKind;

/// States of the task-instance state machine.
///
/// `Waiting -> [Queued] -> Submitted -> Running -> {Succeeded, Failed}`,
/// with `Expired` reachable from `Waiting` and `SubmitFailed` from
/// `Submitted`. Held/runahead are orthogonal flags on [`TaskState`], not
/// states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskStatus {
    Waiting,
    Queued,
    Submitted,
    Running,
    Succeeded,
    Failed,
    SubmitFailed,
    Expired,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Waiting => "waiting",
            TaskStatus::Queued => "queued",
            TaskStatus::Submitted => "submitted",
            TaskStatus::Running => "running",
            TaskStatus::Succeeded => "succeeded",
            TaskStatus::Failed => "failed",
            TaskStatus::SubmitFailed => "submit-failed",
            TaskStatus::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Succeeded
                | TaskStatus::Failed
                | TaskStatus::SubmitFailed
                | TaskStatus::Expired
        )
    }

    /// The retry schedule that gates re-eligibility from this status, if
    /// any. Absence means "feature absent", not an error.
    pub fn retry_kind(&self) -> Option<TimerKind> {
        match self {
            TaskStatus::Failed => Some(TimerKind::ExecutionRetry),
            TaskStatus::SubmitFailed => Some(TimerKind::SubmissionRetry),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable condition state of one task instance: status, orthogonal
/// flags, prerequisite records, trigger flags and own-output records.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskState {
    pub status: TaskStatus,
    pub is_held: bool,
    pub is_runahead: bool,
    pub is_updated: bool,
    pub prerequisites: Vec<Prerequisite>,
    /// Old-style external trigger name -> satisfied flag.
    pub external_triggers: BTreeMap<String, bool>,
    /// Externally-evaluated condition name -> cached result. Not
    /// re-evaluated once satisfied.
    pub xtriggers: BTreeMap<String, bool>,
    pub outputs: Outputs,
}

impl TaskState {
    /// Resolve the definition's condition templates against a concrete
    /// cycle point. Family definitions get the implicit aggregate
    /// prerequisite over every member's `finished` output.
    pub fn new(tdef: &Arc<TaskDef>, point: &CyclePoint, status: TaskStatus, is_held: bool) -> Self {
        let mut prerequisites = Vec::with_capacity(tdef.prerequisites.len() + 1);
        for template in &tdef.prerequisites {
            let upstream_point = match &template.offset {
                Some(offset) => point.add(offset),
                None => point.clone(),
            };
            prerequisites.push(Prerequisite::single(
                template.task.clone(),
                upstream_point,
                template.message.clone(),
            ));
        }

        if tdef.is_family() {
            let conditions = tdef
                .family_members
                .iter()
                .map(|member| {
                    Condition::new(member.clone(), point.clone(), OUTPUT_FINISHED.to_string())
                })
                .collect();
            prerequisites.push(Prerequisite::new(conditions));
        }

        let external_triggers = tdef
            .external_triggers
            .iter()
            .map(|name| (name.clone(), false))
            .collect();
        let xtriggers = tdef
            .xtriggers
            .iter()
            .map(|name| (name.clone(), false))
            .collect();

        Self {
            status,
            is_held,
            is_runahead: false,
            is_updated: false,
            prerequisites,
            external_triggers,
            xtriggers,
            outputs: Outputs::new(&tdef.custom_outputs),
        }
    }

    /// Are ALL task prerequisites satisfied (ignoring triggers)?
    pub fn all_task_prereqs_satisfied(&self) -> bool {
        self.prerequisites.iter().all(Prerequisite::is_satisfied)
    }

    pub fn external_triggers_all_satisfied(&self) -> bool {
        self.external_triggers.values().all(|&v| v)
    }

    pub fn xtriggers_all_satisfied(&self) -> bool {
        self.xtriggers.values().all(|&v| v)
    }
}
