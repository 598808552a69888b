//! Incremental build orchestration
//!
//! A run moves through
//! `Parsing -> ModificationScan -> Ordering -> {CycleFailure | Rebuilding} -> Done`.
//! Targets are visited in topological order, so a target's modified flag is
//! final by the time it is examined: every dependency has already been
//! visited and has pushed its staleness to everything reachable from it.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use super::compiler::{CompilerError, ExternalCompiler};
use crate::domain::{Declarations, DependencyGraph, GraphError, TargetId, TargetRegistry};
use crate::storage::{DeclarationFile, ParseError};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Internal graph error: {0}")]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Compiler(#[from] CompilerError),
}

/// Phases of a build run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildPhase {
    Parsing,
    ModificationScan,
    Ordering,
    CycleFailure,
    Rebuilding,
    Done,
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Terminal phase: `Done` or `CycleFailure`
    pub phase: BuildPhase,

    /// Number of targets in the declarations
    pub targets: usize,

    /// File targets the compiler reported as modified
    pub modified: Vec<String>,

    /// Targets passed to `compile`, in call order
    pub compiled: Vec<String>,
}

impl BuildReport {
    fn new(targets: usize) -> Self {
        Self {
            phase: BuildPhase::Parsing,
            targets,
            modified: Vec::new(),
            compiled: Vec::new(),
        }
    }

    pub fn is_cycle_failure(&self) -> bool {
        self.phase == BuildPhase::CycleFailure
    }
}

/// Marks every target reachable from `start` as modified
///
/// Returns how many targets were reached, `start` included.
pub fn propagate_modified(
    targets: &mut TargetRegistry,
    graph: &DependencyGraph,
    start: TargetId,
) -> Result<usize, GraphError> {
    let reached = graph.reachable_from(start)?;
    for id in &reached {
        let target = targets.get_mut(*id).ok_or(GraphError::UnknownVertex(*id))?;
        target.set_modified(true);
    }
    Ok(reached.len())
}

/// Drives incremental builds against an external compiler
pub struct Makefile<C> {
    compiler: C,
}

impl<C: ExternalCompiler> Makefile<C> {
    pub fn new(compiler: C) -> Self {
        Self { compiler }
    }

    pub fn into_compiler(self) -> C {
        self.compiler
    }

    /// Parses the declaration file at `path` and builds it
    ///
    /// An unreadable file fails before the compiler is consulted.
    pub fn process_file(&mut self, path: impl AsRef<Path>) -> Result<BuildReport, BuildError> {
        let declarations = DeclarationFile::new(path.as_ref()).read()?;
        self.process(declarations)
    }

    /// Builds already-parsed declarations
    ///
    /// A dependency cycle is not an error: the compiler's `fail` is called
    /// once and the report ends in [`BuildPhase::CycleFailure`].
    pub fn process(&mut self, mut declarations: Declarations) -> Result<BuildReport, BuildError> {
        let mut report = BuildReport::new(declarations.len());

        report.phase = BuildPhase::ModificationScan;
        for target in declarations.targets_mut().iter_mut() {
            let modified = target.is_file() && self.compiler.was_modified(target.name())?;
            target.set_modified(modified);
            if modified {
                report.modified.push(target.name().to_string());
            }
        }

        report.phase = BuildPhase::Ordering;
        let graph = DependencyGraph::from_declarations(&declarations)?;
        if graph.has_cycle() {
            self.compiler.fail();
            report.phase = BuildPhase::CycleFailure;
            return Ok(report);
        }
        let order = graph.topological_order()?;

        report.phase = BuildPhase::Rebuilding;
        let targets = declarations.targets_mut();
        for id in order {
            let target = targets.get(id).ok_or(GraphError::UnknownVertex(id))?;
            if !target.is_modified() {
                continue;
            }

            let name = target.name().to_string();
            self.compiler.compile(&name)?;
            report.compiled.push(name);

            propagate_modified(targets, &graph, id)?;
        }

        report.phase = BuildPhase::Done;
        Ok(report)
    }
}
