// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::compile::{WorkflowDefs, compile};
use crate::config::model::{RawWorkflowFile, WorkflowFile};
use crate::errors::Result;

/// Load a workflow file from a given path and return the raw model.
///
/// This only performs TOML deserialization; it does **not** perform
/// semantic validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawWorkflowFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let raw: RawWorkflowFile = toml::from_str(&contents)?;

    Ok(raw)
}

/// Load a workflow file from path and run validation.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for unknown trigger/member references, missing recurrences
///   and same-point dependency cycles.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<WorkflowFile> {
    let raw = load_from_path(&path)?;
    let file = WorkflowFile::try_from(raw)?;
    Ok(file)
}

/// Load, validate and compile a workflow definition in one step: the
/// recommended entry point for anything that needs live task
/// definitions.
pub fn load_workflow(path: impl AsRef<Path>) -> Result<WorkflowDefs> {
    let file = load_and_validate(path)?;
    compile(&file)
}

/// Helper to resolve a default workflow definition path.
pub fn default_workflow_path() -> PathBuf {
    PathBuf::from("Workflow.toml")
}
