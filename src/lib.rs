// src/lib.rs

pub mod cli;
pub mod config;
pub mod cycling;
pub mod errors;
pub mod graph;
pub mod logging;
pub mod task;
pub mod types;

use tracing::info;

use crate::cli::CliArgs;
use crate::config::WorkflowDefs;
use crate::config::loader::load_workflow;
use crate::cycling::CyclePoint;
use crate::errors::Result;
use crate::graph::generate_graph_children;

/// High-level entry point used by `main.rs`.
///
/// Loads, validates and compiles the workflow definition, then prints an
/// inspection of every task resolved at the requested cycle point (the
/// initial point by default): recurrences, prerequisites, and the graph
/// children each output completion would spawn.
pub fn run(args: CliArgs) -> Result<()> {
    let defs = load_workflow(&args.workflow)?;

    let point = match &args.point {
        Some(s) => CyclePoint::parse(s)?,
        None => defs.initial_point.clone(),
    };

    info!(workflow = %args.workflow, point = %point, "workflow compiled");
    print_inspection(&defs, &point);
    Ok(())
}

/// Inspection output: tasks, their recurrences and templates, and the
/// derived graph children at the given point.
fn print_inspection(defs: &WorkflowDefs, point: &CyclePoint) {
    println!("cycleflow workflow inspection");
    println!("  cycling = {:?}", defs.cycling);
    println!("  initial_point = {}", defs.initial_point);
    if let Some(fp) = &defs.final_point {
        println!("  final_point = {fp}");
    }
    println!();

    println!("tasks ({}) at point {point}:", defs.tasks.len());
    for (name, tdef) in defs.tasks.iter() {
        println!("  - {name}.{point}");
        for seq in &tdef.sequences {
            match seq.end() {
                Some(end) => println!("      recurs every {} until {end}", seq.interval()),
                None => println!("      recurs every {}", seq.interval()),
            }
        }
        if let Some(offset) = tdef.clocktrigger_offset {
            println!("      clock trigger: point + {offset}");
        }
        for template in &tdef.prerequisites {
            let upstream_point = match &template.offset {
                Some(offset) => point.add(offset),
                None => point.clone(),
            };
            println!(
                "      waits on: {}.{} {}",
                template.task, upstream_point, template.message
            );
        }
        if !tdef.family_members.is_empty() {
            println!("      family of: {:?}", tdef.family_members);
        }
        let children = generate_graph_children(tdef, point);
        for (message, spawns) in children.iter() {
            if spawns.is_empty() {
                continue;
            }
            let rendered: Vec<String> = spawns
                .iter()
                .map(|(child, child_point)| format!("{child}.{child_point}"))
                .collect();
            println!("      on {message}: spawns {}", rendered.join(", "));
        }
    }
}
