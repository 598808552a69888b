//! Shell command compiler
//!
//! Runs a configured command template for every stale target, e.g.
//! `cc -c {name}`. Commands run through `sh -c` in the project root.
//!
//! The target name never becomes part of the shell script: `{name}` is
//! rewritten to a quoted `"$1"` and the name is passed as the first
//! positional parameter, so names with shell metacharacters are compiled
//! literally.

use std::path::PathBuf;
use std::process::Command;

use super::compiler::{CompilerError, ExternalCompiler, ModificationPolicy};

/// Placeholder replaced by the target name
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Value of `$0` inside the spawned shell
const SHELL_NAME: &str = "incmake";

/// Compiles targets by running a shell command
#[derive(Debug)]
pub struct CommandCompiler {
    root: PathBuf,
    template: String,
    policy: ModificationPolicy,
}

impl CommandCompiler {
    pub fn new(
        root: impl Into<PathBuf>,
        template: impl Into<String>,
        policy: ModificationPolicy,
    ) -> Self {
        Self {
            root: root.into(),
            template: template.into(),
            policy,
        }
    }

    /// The command for `name`, as shown in error messages
    pub fn command_for(&self, name: &str) -> String {
        self.template.replace(NAME_PLACEHOLDER, name)
    }

    /// The script handed to `sh -c`; the name arrives as `$1`
    pub fn script(&self) -> String {
        self.template.replace(NAME_PLACEHOLDER, "\"$1\"")
    }
}

impl ExternalCompiler for CommandCompiler {
    fn was_modified(&mut self, name: &str) -> Result<bool, CompilerError> {
        self.policy.was_modified(&self.root, name)
    }

    fn compile(&mut self, name: &str) -> Result<(), CompilerError> {
        let status = Command::new("sh")
            .arg("-c")
            .arg(self.script())
            .arg(SHELL_NAME)
            .arg(name)
            .current_dir(&self.root)
            .status()
            .map_err(|source| CompilerError::Io {
                name: name.to_string(),
                source,
            })?;

        if !status.success() {
            return Err(CompilerError::CommandFailed {
                name: name.to_string(),
                command: self.command_for(name),
                status: status.to_string(),
            });
        }

        Ok(())
    }

    // Nothing to clean up; the orchestrator reports the cycle.
    fn fail(&mut self) {}
}
