// src/config/mod.rs

//! Workflow-definition loading: TOML model, validation and compilation
//! into immutable task definitions.

pub mod compile;
pub mod loader;
pub mod model;
pub mod validate;

pub use compile::{WorkflowDefs, compile};
pub use loader::{load_and_validate, load_from_path, load_workflow};
pub use model::{CyclingMode, RawWorkflowFile, TaskSection, WorkflowFile, WorkflowSection};
