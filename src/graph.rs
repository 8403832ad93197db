// src/graph.rs

//! Graph-children derivation: which downstream `(name, point)` pairs an
//! occurrence's output completions can spawn.
//!
//! The templates were parsed and checked when the workflow definition
//! loaded, so derivation here is pure arithmetic and infallible; a
//! malformed graph template is a `GraphDefinition` error at load time,
//! never a runtime error on an instance.

use std::collections::BTreeMap;

use crate::cycling::CyclePoint;
use crate::task::taskdef::TaskDef;
use crate::types::TaskName;

/// Output message -> downstream instances to spawn when it completes.
pub type GraphChildren = BTreeMap<String, Vec<(TaskName, CyclePoint)>>;

/// Resolve a definition's child templates against a concrete cycle point.
///
/// Computed once per instance at construction and read-only thereafter.
pub fn generate_graph_children(tdef: &TaskDef, point: &CyclePoint) -> GraphChildren {
    let mut children = GraphChildren::new();
    for (message, templates) in &tdef.graph_children {
        let entry: &mut Vec<(TaskName, CyclePoint)> = children.entry(message.clone()).or_default();
        for template in templates {
            let child_point = match &template.offset {
                Some(offset) => point.add(offset),
                None => point.clone(),
            };
            entry.push((template.name.clone(), child_point));
        }
    }
    children
}
