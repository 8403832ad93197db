// src/task/outputs.rs

//! Outputs: the messages a task instance itself completes.

/// Standard job-lifecycle output messages.
pub const OUTPUT_SUBMITTED: &str = "submitted";
pub const OUTPUT_SUBMIT_FAILED: &str = "submit-failed";
pub const OUTPUT_STARTED: &str = "started";
pub const OUTPUT_SUCCEEDED: &str = "succeeded";
pub const OUTPUT_FAILED: &str = "failed";
/// Completed on either terminal job event; family aggregation depends on
/// members' `finished` outputs.
pub const OUTPUT_FINISHED: &str = "finished";

#[derive(Debug, Clone, PartialEq, Eq)]
struct OutputRecord {
    message: String,
    completed: bool,
}

/// Ordered record of which of an instance's own output messages have
/// completed. Completion is monotonic, like prerequisite satisfaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outputs {
    records: Vec<OutputRecord>,
}

impl Outputs {
    /// The standard lifecycle messages plus any custom outputs from the
    /// definition, in definition order.
    pub fn new(custom: &[String]) -> Self {
        let mut records: Vec<OutputRecord> = [
            OUTPUT_SUBMITTED,
            OUTPUT_SUBMIT_FAILED,
            OUTPUT_STARTED,
            OUTPUT_SUCCEEDED,
            OUTPUT_FAILED,
            OUTPUT_FINISHED,
        ]
        .iter()
        .map(|m| OutputRecord {
            message: m.to_string(),
            completed: false,
        })
        .collect();

        for message in custom {
            if !records.iter().any(|r| r.message == *message) {
                records.push(OutputRecord {
                    message: message.clone(),
                    completed: false,
                });
            }
        }

        Self { records }
    }

    /// Mark a message complete. Returns `true` if the record changed,
    /// `false` when already complete or unknown.
    pub fn complete(&mut self, message: &str) -> bool {
        for record in &mut self.records {
            if record.message == message {
                if record.completed {
                    return false;
                }
                record.completed = true;
                return true;
            }
        }
        false
    }

    pub fn is_completed(&self, message: &str) -> bool {
        self.records
            .iter()
            .any(|r| r.message == message && r.completed)
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.message.as_str())
    }

    /// Completed messages, in definition order.
    pub fn completed(&self) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .filter(|r| r.completed)
            .map(|r| r.message.as_str())
    }
}
