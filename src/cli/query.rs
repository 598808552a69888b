//! Query commands (order, check, show, affected)
//!
//! These commands parse the declarations and inspect the dependency graph
//! without talking to any compiler.

use anyhow::{Context, Result};

use super::output::Output;
use crate::domain::{Declarations, DependencyGraph, TargetId, TargetKind};
use crate::storage::DeclarationFile;

fn load(output: &Output, ctx: &str, file: &DeclarationFile) -> Result<(Declarations, DependencyGraph)> {
    let declarations = file.read()?;
    let graph = DependencyGraph::from_declarations(&declarations)
        .context("Failed to build dependency graph")?;

    output.verbose_ctx(
        ctx,
        &format!(
            "Loaded {} targets and {} edges",
            graph.len(),
            graph.edge_count()
        ),
    );

    Ok((declarations, graph))
}

fn names(declarations: &Declarations, ids: &[TargetId]) -> Vec<String> {
    ids.iter()
        .filter_map(|id| declarations.targets().get(*id))
        .map(|t| t.name().to_string())
        .collect()
}

/// Print a valid build order
pub fn order(output: &Output, file: &DeclarationFile) -> Result<()> {
    let (declarations, graph) = load(output, "order", file)?;

    let order = graph
        .topological_order()
        .with_context(|| format!("No build order for {}", file.path().display()))?;

    if output.is_json() {
        let items: Vec<_> = order
            .iter()
            .filter_map(|id| declarations.targets().get(*id))
            .map(|t| {
                serde_json::json!({
                    "name": t.name(),
                    "kind": t.kind(),
                })
            })
            .collect();
        output.data(&items);
    } else if order.is_empty() {
        println!("No targets declared.");
    } else {
        println!("{:<6} {:<6} NAME", "STEP", "KIND");
        println!("{}", "-".repeat(40));
        for (step, id) in order.iter().enumerate() {
            if let Some(target) = declarations.targets().get(*id) {
                println!("{:<6} {:<6} {}", step + 1, target.kind(), target.name());
            }
        }
    }

    Ok(())
}

/// Check the declarations for cycles
pub fn check(output: &Output, file: &DeclarationFile) -> Result<()> {
    let (declarations, graph) = load(output, "check", file)?;

    let has_cycle = graph.has_cycle();
    let files = declarations
        .targets()
        .iter()
        .filter(|(_, t)| t.kind() == TargetKind::File)
        .count();
    let tasks = declarations.len() - files;
    let sources = names(&declarations, &graph.sources());
    let leaves = names(&declarations, &graph.leaves());

    if output.is_json() {
        output.data(&serde_json::json!({
            "targets": declarations.len(),
            "files": files,
            "tasks": tasks,
            "edges": graph.edge_count(),
            "cycle": has_cycle,
            "sources": sources,
            "leaves": leaves,
        }));
    } else {
        println!("Targets: {} ({} files, {} tasks)", declarations.len(), files, tasks);
        println!("Edges:   {}", graph.edge_count());
        println!("Cycle:   {}", if has_cycle { "detected" } else { "none" });
        println!("Sources: {}", sources.join(", "));
        println!("Leaves:  {}", leaves.join(", "));
    }

    if has_cycle {
        anyhow::bail!("Dependency cycle in {}", file.path().display());
    }

    Ok(())
}

/// Show a target and its direct dependencies and dependents
pub fn show(output: &Output, file: &DeclarationFile, name: &str) -> Result<()> {
    let (declarations, graph) = load(output, "show", file)?;

    let id = declarations.targets().id_of(name)?;
    let target = declarations.target(name)?;
    let dependencies = names(&declarations, graph.dependencies(id)?);
    let dependents = names(&declarations, graph.dependents(id)?);

    if output.is_json() {
        output.data(&serde_json::json!({
            "name": target.name(),
            "kind": target.kind(),
            "dependencies": dependencies,
            "dependents": dependents,
        }));
    } else {
        println!("{} ({})", target.name(), target.kind());
        println!("Depends on:  {}", display_list(&dependencies));
        println!("Needed by:   {}", display_list(&dependents));
    }

    Ok(())
}

/// List everything reachable from a target
pub fn affected(output: &Output, file: &DeclarationFile, name: &str) -> Result<()> {
    let (declarations, graph) = load(output, "affected", file)?;

    let id = declarations.targets().id_of(name)?;
    let reached = names(&declarations, &graph.reachable_from(id)?);
    output.verbose_ctx("affected", &format!("{} reaches {} targets", name, reached.len()));

    if output.is_json() {
        output.data(&reached);
    } else {
        println!("Changing '{}' rebuilds {} target(s):", name, reached.len());
        for target in &reached {
            println!("  {}", target);
        }
    }

    Ok(())
}

fn display_list(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}
