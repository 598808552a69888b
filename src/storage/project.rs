//! Project management
//!
//! Locates the project root, loads its configuration and resolves the
//! declaration file a command should read.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::PROJECT_CONFIG_FILE;
use super::{Config, DeclarationFile};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in an incmake project. Run 'incmake init' first.")]
    NotInProject,
}

/// An incmake project: a root directory plus its configuration
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(PROJECT_CONFIG_FILE).is_file() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    ///
    /// Outside of a project the current directory is used as the root with
    /// default configuration.
    pub fn open_current() -> Result<Self> {
        match Config::find_project_root() {
            Some(root) => Self::open(root),
            None => {
                let root = std::env::current_dir().context("Failed to read current directory")?;
                let config = Config::load()?;
                Ok(Self { root, config })
            }
        }
    }

    /// Initializes a new project at the given path
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create project directory: {}", root.display()))?;

        let config_path = root.join(PROJECT_CONFIG_FILE);
        if !config_path.exists() {
            let default_config = r#"# incmake configuration

# Declaration file, relative to this directory
build_file = "build.txt"

# Command run for every stale target; {name} is replaced by the target name
# compile_command = "echo building {name}"

# Which files count as modified when no flag is given: "all" or "none"
modified = "all"
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the declaration file to read
    ///
    /// An explicit path wins over the configured `build_file`.
    pub fn declaration_file(&self, explicit: Option<&Path>) -> DeclarationFile {
        match explicit {
            Some(path) => DeclarationFile::new(path),
            None => DeclarationFile::for_project(&self.root, &self.config.project.build_file),
        }
    }
}
