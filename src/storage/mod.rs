//! # Storage Layer
//!
//! Everything that touches the file system: reading declaration files,
//! loading configuration and locating the project root.
//!
//! ## File Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Declarations | `name [:|=] dep, dep ...` per line | `build.txt` (configurable) |
//! | Project config | TOML | `incmake.toml` |
//! | Global config | TOML | `~/.config/incmake/config.toml` |
//!
//! No build state is persisted; every run re-reads the declaration file.
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for resolving root, config and build file
//! - [`DeclarationFile`] - Reads and parses a declaration file
//! - [`Config`] - Project and global configuration

mod config;
mod declaration;
mod project;

pub use config::{
    Config, ConfigError, DefaultModified, GlobalConfig, OutputFormat, ProjectConfig,
    PROJECT_CONFIG_FILE,
};
pub use declaration::{
    parse_file, parse_line, parse_str, tokenize, DeclarationFile, DeclarationLine, ParseError,
};
pub use project::{Project, ProjectError};
