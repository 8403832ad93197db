// src/task/prereq.rs

//! Prerequisites: monotonic condition sets over upstream outputs.

use crate::cycling::CyclePoint;
use crate::types::TaskName;

/// One `(task, point, message)` condition and its satisfaction flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub task: TaskName,
    pub point: CyclePoint,
    pub message: String,
    satisfied: bool,
}

impl Condition {
    pub fn new(task: TaskName, point: CyclePoint, message: String) -> Self {
        Self {
            task,
            point,
            message,
            satisfied: false,
        }
    }

    pub fn is_satisfied(&self) -> bool {
        self.satisfied
    }

    fn matches(&self, task: &str, point: &CyclePoint, message: &str) -> bool {
        self.task == task && self.point == *point && self.message == message
    }
}

/// A named condition set on a task instance, satisfied once every listed
/// upstream message has been observed complete.
///
/// Satisfaction is monotonic set-membership: a satisfied condition never
/// reverts within the lifetime of one instance. Clearing happens only by
/// replacing the whole instance (e.g. at reload).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prerequisite {
    conditions: Vec<Condition>,
}

impl Prerequisite {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    /// Convenience for the common single-condition prerequisite.
    pub fn single(task: TaskName, point: CyclePoint, message: String) -> Self {
        Self {
            conditions: vec![Condition::new(task, point, message)],
        }
    }

    /// Mark the matching condition satisfied. Returns `true` if any flag
    /// changed. Only ever sets flags; never clears them.
    pub fn satisfy(&mut self, task: &str, point: &CyclePoint, message: &str) -> bool {
        let mut changed = false;
        for cond in &mut self.conditions {
            if !cond.satisfied && cond.matches(task, point, message) {
                cond.satisfied = true;
                changed = true;
            }
        }
        changed
    }

    /// True once all named conditions have been observed complete.
    pub fn is_satisfied(&self) -> bool {
        self.conditions.iter().all(Condition::is_satisfied)
    }

    /// The conditions still blocking this prerequisite, for diagnostics.
    pub fn unsatisfied(&self) -> impl Iterator<Item = &Condition> {
        self.conditions.iter().filter(|c| !c.satisfied)
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }
}
