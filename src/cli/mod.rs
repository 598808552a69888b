//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `init` | Write a default `incmake.toml` |
//! | `build` | Compile stale targets in dependency order |
//! | `order` | Print a valid build order |
//! | `check` | Report cycles, sources and leaves |
//! | `show` | Show one target and its direct neighbours |
//! | `affected` | List everything rebuilt when a target changes |
//!
//! ## Output Formats
//!
//! All commands support the `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output on stderr:
//! ```bash
//! incmake --verbose build
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod build_cmd;
mod output;
mod query;

pub use app::{run, Cli, Commands};
pub use build_cmd::BuildArgs;
pub use output::{Output, OutputFormat};
