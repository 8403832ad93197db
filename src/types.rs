// src/types.rs

use serde::Deserialize;

/// Task names are plain strings; `(name, point)` identifies an instance.
pub type TaskName = String;

/// Seconds since the Unix epoch, as used by all wallclock gates.
pub type UnixSeconds = i64;

/// Job-lifecycle events reported by the external job-management layer.
///
/// This core only consumes them; the full lifecycle transition table is
/// owned by the collaborator that emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobEvent {
    Submitted,
    Started,
    Succeeded,
    Failed,
    SubmitFailed,
}

/// Platform descriptor attached to a task instance at construction time.
///
/// Resolved by the external platform/host layer; read-only thereafter and
/// copied verbatim to a reload successor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Platform {
    pub name: String,
    #[serde(default)]
    pub job_runner: String,
    #[serde(default)]
    pub hosts: Vec<String>,
}

impl Platform {
    pub fn localhost() -> Self {
        Self {
            name: "localhost".to_string(),
            job_runner: "background".to_string(),
            hosts: vec!["localhost".to_string()],
        }
    }
}
