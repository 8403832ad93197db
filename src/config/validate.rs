// src/config/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::compile::parse_trigger_reference;
use crate::config::model::{RawWorkflowFile, WorkflowFile};
use crate::cycling::Interval;
use crate::errors::{CycleflowError, Result};

impl TryFrom<RawWorkflowFile> for WorkflowFile {
    type Error = CycleflowError;

    fn try_from(raw: RawWorkflowFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_workflow(&raw)?;
        Ok(WorkflowFile::new_unchecked(raw.workflow, raw.task))
    }
}

fn validate_raw_workflow(raw: &RawWorkflowFile) -> Result<()> {
    ensure_has_tasks(raw)?;
    validate_workflow_section(raw)?;
    validate_task_sections(raw)?;
    validate_families(raw)?;
    validate_same_point_graph(raw)?;
    Ok(())
}

fn ensure_has_tasks(raw: &RawWorkflowFile) -> Result<()> {
    if raw.task.is_empty() {
        return Err(CycleflowError::Config(
            "workflow must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_workflow_section(raw: &RawWorkflowFile) -> Result<()> {
    match raw.workflow.initial_point.as_deref() {
        None | Some("") => Err(CycleflowError::Config(
            "[workflow].initial_point is required".to_string(),
        )),
        Some(_) => Ok(()),
    }
}

fn validate_task_sections(raw: &RawWorkflowFile) -> Result<()> {
    for (name, section) in raw.task.iter() {
        if section.recurrence.is_empty() {
            return Err(CycleflowError::Config(format!(
                "task '{name}' has no recurrence entries"
            )));
        }
        for expr in &section.triggers {
            let reference = parse_trigger_reference(expr)?;
            if !raw.task.contains_key(&reference.task) {
                return Err(CycleflowError::Config(format!(
                    "task '{name}' has trigger on unknown task '{}'",
                    reference.task
                )));
            }
            if reference.task == *name && zero_offset(reference.offset.as_deref())? {
                return Err(CycleflowError::Config(format!(
                    "task '{name}' cannot depend on itself at the same cycle point"
                )));
            }
        }
    }
    Ok(())
}

fn validate_families(raw: &RawWorkflowFile) -> Result<()> {
    for (name, section) in raw.task.iter() {
        for member in &section.members {
            let member_section = raw.task.get(member).ok_or_else(|| {
                CycleflowError::Config(format!(
                    "family '{name}' lists unknown member '{member}'"
                ))
            })?;
            if !member_section.members.is_empty() {
                return Err(CycleflowError::Config(format!(
                    "nested task families are not allowed: '{member}' is both a member of '{name}' and a family"
                )));
            }
        }
        if let Some(family) = &section.family {
            let family_section = raw.task.get(family).ok_or_else(|| {
                CycleflowError::Config(format!(
                    "task '{name}' names unknown family '{family}'"
                ))
            })?;
            if !family_section.members.contains(name) {
                return Err(CycleflowError::Config(format!(
                    "task '{name}' names family '{family}', but is not in its member list"
                )));
            }
        }
    }
    Ok(())
}

/// Dependencies at a non-zero cycle offset are inter-cycle and cannot
/// deadlock a single point, so only zero-offset edges participate in the
/// cycle check.
fn validate_same_point_graph(raw: &RawWorkflowFile) -> Result<()> {
    // Edge direction: upstream -> dependent.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in raw.task.keys() {
        graph.add_node(name.as_str());
    }

    for (name, section) in raw.task.iter() {
        for expr in &section.triggers {
            let reference = parse_trigger_reference(expr)?;
            if zero_offset(reference.offset.as_deref())? {
                if let Some((upstream, _)) = raw.task.get_key_value(&reference.task) {
                    graph.add_edge(upstream.as_str(), name.as_str(), ());
                }
            }
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(CycleflowError::GraphDefinition(format!(
            "same-point dependency cycle involving task '{}'",
            cycle.node_id()
        ))),
    }
}

fn zero_offset(spec: Option<&str>) -> Result<bool> {
    match spec {
        None => Ok(true),
        Some(spec) => Ok(Interval::parse(spec)?.as_seconds() == 0),
    }
}
