//! incmake - a minimal make-like incremental build tool
//!
//! Parses a declaration file into file and task targets, orders them by
//! their dependencies and recompiles exactly the targets that are stale,
//! together with everything that transitively depends on them.

pub mod domain;
pub mod storage;
pub mod build;
pub mod cli;

pub use build::{BuildReport, ExternalCompiler, Makefile};
pub use domain::{Declarations, DependencyGraph, Target, TargetId, TargetKind};
