// src/task/mod.rs

//! The task data model: immutable definitions, instance state, timers
//! and the proxy objects the scheduler evaluates.

pub mod outputs;
pub mod prereq;
pub mod proxy;
pub mod state;
pub mod taskdef;
pub mod timer;

pub use outputs::Outputs;
pub use prereq::{Condition, Prerequisite};
pub use proxy::{Readiness, TaskProxy, TaskSummary};
pub use state::{TaskState, TaskStatus};
pub use taskdef::{ChildTemplate, TaskDef, TriggerTemplate};
pub use timer::{TaskActionTimer, TimerKind};
