// src/config/compile.rs

//! Turn a validated workflow file into immutable task definitions.
//!
//! This is where trigger references and durations are parsed, recurrence
//! sequences are bound to the workflow's points, and every task's graph
//! children are derived by inverting the trigger templates: if `b`
//! depends on `a[-P1D]:succeeded`, then `a` at point `p` spawns `b` at
//! `p + P1D` when `succeeded` completes.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::debug;

use crate::config::model::{CyclingMode, WorkflowFile};
use crate::cycling::{CyclePoint, Interval, RecurrenceSequence};
use crate::errors::{CycleflowError, Result};
use crate::task::outputs::OUTPUT_FINISHED;
use crate::task::taskdef::{ChildTemplate, TaskDef, TriggerTemplate};
use crate::types::TaskName;

/// Message a trigger reference implies when none is written.
pub const DEFAULT_TRIGGER_MESSAGE: &str = "succeeded";

/// The compiled workflow: everything the scheduler needs to spawn and
/// evaluate task instances.
#[derive(Debug, Clone)]
pub struct WorkflowDefs {
    pub cycling: CyclingMode,
    pub initial_point: CyclePoint,
    pub final_point: Option<CyclePoint>,
    pub tasks: BTreeMap<TaskName, Arc<TaskDef>>,
}

/// A parsed `task[offset]:message` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TriggerRef {
    pub task: TaskName,
    pub offset: Option<String>,
    pub message: String,
}

/// Parse one trigger reference. A reference that does not fit the
/// `task[offset]:message` shape is a graph-template error, fatal at
/// definition-load time.
pub(crate) fn parse_trigger_reference(expr: &str) -> Result<TriggerRef> {
    let caps = trigger_re()
        .captures(expr.trim())
        .ok_or_else(|| {
            CycleflowError::GraphDefinition(format!("unparsable trigger reference: {expr:?}"))
        })?;
    Ok(TriggerRef {
        task: caps["task"].to_string(),
        offset: caps.name("offset").map(|m| m.as_str().to_string()),
        message: caps
            .name("message")
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| DEFAULT_TRIGGER_MESSAGE.to_string()),
    })
}

/// Compile a validated workflow file into shared task definitions.
pub fn compile(file: &WorkflowFile) -> Result<WorkflowDefs> {
    let cycling = file.workflow().cycling;

    let initial_point = parse_point_for_mode(
        file.workflow().initial_point.as_deref().unwrap_or(""),
        cycling,
    )?;
    let final_point = file
        .workflow()
        .final_point
        .as_deref()
        .map(|s| parse_point_for_mode(s, cycling))
        .transpose()?;

    // First pass: per-task templates and policies.
    let mut triggers: BTreeMap<TaskName, Vec<TriggerTemplate>> = BTreeMap::new();
    for (name, section) in file.tasks() {
        let mut templates = Vec::with_capacity(section.triggers.len());
        for expr in &section.triggers {
            let reference = parse_trigger_reference(expr)?;
            let offset = reference
                .offset
                .as_deref()
                .map(Interval::parse)
                .transpose()?;
            templates.push(TriggerTemplate {
                task: reference.task,
                offset,
                message: reference.message,
            });
        }
        triggers.insert(name.clone(), templates);
    }

    // Second pass: derive graph children by inverting the triggers, and
    // wire family aggregation through members' `finished` outputs.
    let mut children: BTreeMap<TaskName, BTreeMap<String, Vec<ChildTemplate>>> = BTreeMap::new();
    for name in file.tasks().keys() {
        children.insert(name.clone(), BTreeMap::new());
    }
    for (name, templates) in &triggers {
        for template in templates {
            let upstream = children
                .get_mut(&template.task)
                .ok_or_else(|| {
                    CycleflowError::GraphDefinition(format!(
                        "trigger of task '{name}' references unknown task '{}'",
                        template.task
                    ))
                })?;
            upstream
                .entry(template.message.clone())
                .or_default()
                .push(ChildTemplate {
                    name: name.clone(),
                    offset: template.offset.map(|o| o.negated()),
                });
        }
    }
    for (name, section) in file.tasks() {
        for member in &section.members {
            if let Some(member_children) = children.get_mut(member) {
                member_children
                    .entry(OUTPUT_FINISHED.to_string())
                    .or_default()
                    .push(ChildTemplate {
                        name: name.clone(),
                        offset: None,
                    });
            }
        }
    }

    // Third pass: assemble the definitions.
    let mut tasks = BTreeMap::new();
    for (name, section) in file.tasks() {
        let mut sequences = Vec::with_capacity(section.recurrence.len());
        for spec in &section.recurrence {
            let interval = Interval::parse(spec)?;
            if !interval.is_positive() {
                return Err(CycleflowError::Config(format!(
                    "task '{name}': recurrence interval must be positive, got {spec:?}"
                )));
            }
            sequences.push(RecurrenceSequence::new(
                initial_point.clone(),
                interval,
                final_point.clone(),
            ));
        }

        let tdef = TaskDef {
            name: name.clone(),
            sequences,
            namespace_hierarchy: namespace_hierarchy(file, name),
            clocktrigger_offset: parse_offset(&section.clock_trigger)?,
            late_offset: parse_offset(&section.late_offset)?,
            expire_offset: parse_offset(&section.expire_offset)?,
            execution_retry_delays: parse_delays(&section.retry_delays)?,
            submission_retry_delays: parse_delays(&section.submission_retry_delays)?,
            prerequisites: triggers.remove(name).unwrap_or_default(),
            custom_outputs: section.outputs.clone(),
            external_triggers: section.ext_triggers.clone(),
            xtriggers: section.xtriggers.clone(),
            graph_children: children.remove(name).unwrap_or_default(),
            family_members: section.members.clone(),
        };

        debug!(
            task = %name,
            sequences = tdef.sequences.len(),
            prerequisites = tdef.prerequisites.len(),
            "compiled task definition"
        );
        tasks.insert(name.clone(), Arc::new(tdef));
    }

    Ok(WorkflowDefs {
        cycling,
        initial_point,
        final_point,
        tasks,
    })
}

/// Ancestor names for family matching, nearest first. The membership
/// chain was validated, so a cycle here cannot occur; the visited guard
/// is load-bearing only for direct self-membership.
fn namespace_hierarchy(file: &WorkflowFile, name: &str) -> Vec<TaskName> {
    let mut hierarchy = Vec::new();
    let mut current = name.to_string();
    while let Some(section) = file.tasks().get(&current) {
        match &section.family {
            Some(family) if !hierarchy.contains(family) && family.as_str() != name => {
                hierarchy.push(family.clone());
                current = family.clone();
            }
            _ => break,
        }
    }
    hierarchy
}

fn parse_offset(spec: &Option<String>) -> Result<Option<Interval>> {
    spec.as_deref().map(Interval::parse).transpose()
}

fn parse_delays(specs: &[String]) -> Result<Vec<Interval>> {
    specs.iter().map(|s| Interval::parse(s)).collect()
}

fn parse_point_for_mode(spec: &str, cycling: CyclingMode) -> Result<CyclePoint> {
    let point = CyclePoint::parse(spec)?;
    match cycling {
        CyclingMode::Integer if !point.is_integer() => Err(CycleflowError::Config(format!(
            "integer cycling workflow has non-integer point {spec:?}"
        ))),
        CyclingMode::Datetime if point.is_integer() => Err(CycleflowError::Config(format!(
            "datetime cycling workflow has integer point {spec:?}"
        ))),
        _ => Ok(point),
    }
}

fn trigger_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<task>[A-Za-z0-9_][A-Za-z0-9_.\-]*)(?:\[(?P<offset>[^\]]+)\])?(?::(?P<message>[A-Za-z0-9_][A-Za-z0-9_ \-]*))?$",
        )
        .expect("trigger pattern is valid")
    })
}
