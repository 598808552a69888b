//! Domain models for incmake
//!
//! Targets, parsed declarations and the dependency graph. No I/O here.

mod target;
mod declarations;
mod graph;

pub use target::{Target, TargetError, TargetId, TargetKind, TargetRegistry};
pub use declarations::Declarations;
pub use graph::{DependencyGraph, GraphError};
