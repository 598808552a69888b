//! # Build Orchestration
//!
//! Turns parsed declarations into compiler calls.
//!
//! ## Flow
//!
//! 1. Parse the declaration file ([`Makefile::process_file`])
//! 2. Ask the compiler which file targets changed
//! 3. Build the dependency graph; a cycle ends the run with one `fail()` call
//! 4. Walk the topological order, compiling stale targets and marking
//!    everything reachable from them as stale
//!
//! ## Compilers
//!
//! | Type | Behavior |
//! |------|----------|
//! | [`CommandCompiler`] | Runs a shell command template per target |
//! | [`DryRunCompiler`] | Records calls without running anything |
//!
//! Both decide modification through a [`ModificationPolicy`].

mod command;
mod compiler;
mod makefile;

pub use command::{CommandCompiler, NAME_PLACEHOLDER};
pub use compiler::{CompilerError, DryRunCompiler, ExternalCompiler, ModificationPolicy};
pub use makefile::{propagate_modified, BuildError, BuildPhase, BuildReport, Makefile};
