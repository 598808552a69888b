//! External compiler boundary
//!
//! The orchestrator never compiles anything itself. It asks an
//! [`ExternalCompiler`] whether files changed, tells it what to compile,
//! and reports a cyclic build through [`ExternalCompiler::fail`].

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("Compile command for '{name}' failed with {status}: {command}")]
    CommandFailed {
        name: String,
        command: String,
        status: String,
    },

    #[error("I/O error for '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// The collaborator that performs the actual compilation
pub trait ExternalCompiler {
    /// Whether the file target `name` changed since the last build
    fn was_modified(&mut self, name: &str) -> Result<bool, CompilerError>;

    /// Compiles the stale target `name`
    fn compile(&mut self, name: &str) -> Result<(), CompilerError>;

    /// Reports that the build cannot proceed because of a dependency cycle
    fn fail(&mut self);
}

impl<C: ExternalCompiler + ?Sized> ExternalCompiler for &mut C {
    fn was_modified(&mut self, name: &str) -> Result<bool, CompilerError> {
        (**self).was_modified(name)
    }

    fn compile(&mut self, name: &str) -> Result<(), CompilerError> {
        (**self).compile(name)
    }

    fn fail(&mut self) {
        (**self).fail()
    }
}

/// Decides which file targets count as modified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModificationPolicy {
    /// Every file target is stale
    All,
    /// No file target is stale
    None,
    /// Only the listed names are stale
    Named(HashSet<String>),
    /// Files whose mtime is newer than the timestamp are stale
    Since(DateTime<Utc>),
}

impl ModificationPolicy {
    /// Builds a `Named` policy from a list of names
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ModificationPolicy::Named(names.into_iter().map(Into::into).collect())
    }

    /// Evaluates the policy for `name`, resolved against `root`
    ///
    /// Under `Since`, a file that does not exist counts as unmodified.
    pub fn was_modified(&self, root: &Path, name: &str) -> Result<bool, CompilerError> {
        match self {
            ModificationPolicy::All => Ok(true),
            ModificationPolicy::None => Ok(false),
            ModificationPolicy::Named(names) => Ok(names.contains(name)),
            ModificationPolicy::Since(since) => {
                let metadata = match fs::metadata(root.join(name)) {
                    Ok(metadata) => metadata,
                    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
                    Err(source) => {
                        return Err(CompilerError::Io {
                            name: name.to_string(),
                            source,
                        })
                    }
                };

                let mtime = metadata.modified().map_err(|source| CompilerError::Io {
                    name: name.to_string(),
                    source,
                })?;

                Ok(DateTime::<Utc>::from(mtime) > *since)
            }
        }
    }
}

/// A compiler that only records what it was asked to do
#[derive(Debug)]
pub struct DryRunCompiler {
    root: PathBuf,
    policy: ModificationPolicy,
    compiled: Vec<String>,
    failed: bool,
}

impl DryRunCompiler {
    pub fn new(root: impl Into<PathBuf>, policy: ModificationPolicy) -> Self {
        Self {
            root: root.into(),
            policy,
            compiled: Vec::new(),
            failed: false,
        }
    }

    /// Names passed to `compile`, in call order
    pub fn compiled(&self) -> &[String] {
        &self.compiled
    }

    pub fn failed(&self) -> bool {
        self.failed
    }
}

impl ExternalCompiler for DryRunCompiler {
    fn was_modified(&mut self, name: &str) -> Result<bool, CompilerError> {
        self.policy.was_modified(&self.root, name)
    }

    fn compile(&mut self, name: &str) -> Result<(), CompilerError> {
        self.compiled.push(name.to_string());
        Ok(())
    }

    fn fail(&mut self) {
        self.failed = true;
    }
}
