//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{build_cmd, query};
use crate::storage::Project;

#[derive(Parser)]
#[command(name = "incmake")]
#[command(author, version, about = "Minimal incremental make")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Declaration file (defaults to `build_file` from incmake.toml)
    #[arg(long, global = true, env = "INCMAKE_FILE")]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new project (writes incmake.toml)
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Compile stale targets in dependency order
    Build(build_cmd::BuildArgs),

    /// Print a valid build order
    Order,

    /// Check the declarations for dependency cycles
    Check,

    /// Show a target and its direct dependencies
    Show {
        /// Target name
        name: String,
    },

    /// List every target that is rebuilt when the given one changes
    Affected {
        /// Target name
        name: String,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let command = match cli.command {
        Commands::Init { path } => {
            let output = Output::new(cli.format.unwrap_or_default(), cli.verbose);
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));
            let project = Project::init(&path)?;
            output.success(&format!(
                "Initialized incmake project at {}",
                project.root().display()
            ));
            return Ok(());
        }
        command => command,
    };

    let project = Project::open_current()?;
    let format = cli
        .format
        .unwrap_or_else(|| project.config().global.default_format.into());
    let output = Output::new(format, cli.verbose);

    output.verbose(&format!("Project root: {}", project.root().display()));

    let file = project.declaration_file(cli.file.as_deref());
    output.verbose(&format!("Declaration file: {}", file.path().display()));

    match command {
        Commands::Build(args) => build_cmd::run(&output, &project, &file, args)?,
        Commands::Order => query::order(&output, &file)?,
        Commands::Check => query::check(&output, &file)?,
        Commands::Show { name } => query::show(&output, &file, &name)?,
        Commands::Affected { name } => query::affected(&output, &file, &name)?,
        Commands::Init { .. } => {}
    }

    output.verbose("Command completed successfully");
    Ok(())
}
