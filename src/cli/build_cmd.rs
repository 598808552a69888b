//! Build command

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;

use super::output::Output;
use crate::build::{
    BuildReport, CommandCompiler, DryRunCompiler, ExternalCompiler, Makefile, ModificationPolicy,
};
use crate::storage::{DeclarationFile, DefaultModified, Project};

#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Treat only these files as modified (repeatable)
    #[arg(long, short = 'm', value_name = "NAME", conflicts_with_all = ["all", "none", "since"])]
    pub modified: Vec<String>,

    /// Treat every file as modified
    #[arg(long, conflicts_with_all = ["none", "since"])]
    pub all: bool,

    /// Treat no file as modified
    #[arg(long, conflicts_with = "since")]
    pub none: bool,

    /// Treat files changed after this RFC 3339 timestamp as modified
    #[arg(long, value_name = "TIMESTAMP")]
    pub since: Option<String>,

    /// Command to run per stale target; `{name}` is replaced
    #[arg(long, value_name = "CMD")]
    pub exec: Option<String>,

    /// List stale targets without running any command
    #[arg(long)]
    pub dry_run: bool,
}

impl BuildArgs {
    /// Resolves the modification policy from flags, then configuration
    pub fn policy(&self, default: DefaultModified) -> Result<ModificationPolicy> {
        if let Some(since) = &self.since {
            let since = DateTime::parse_from_rfc3339(since)
                .with_context(|| format!("Invalid --since timestamp: {}", since))?;
            return Ok(ModificationPolicy::Since(since.with_timezone(&Utc)));
        }

        if !self.modified.is_empty() {
            return Ok(ModificationPolicy::named(self.modified.iter().cloned()));
        }

        if self.all {
            return Ok(ModificationPolicy::All);
        }

        if self.none {
            return Ok(ModificationPolicy::None);
        }

        Ok(match default {
            DefaultModified::All => ModificationPolicy::All,
            DefaultModified::None => ModificationPolicy::None,
        })
    }
}

/// Runs an incremental build
pub fn run(output: &Output, project: &Project, file: &DeclarationFile, args: BuildArgs) -> Result<()> {
    let policy = args.policy(project.config().project.modified)?;
    output.verbose_ctx("build", &format!("Modification policy: {:?}", policy));

    let command = args
        .exec
        .clone()
        .or_else(|| project.config().project.compile_command.clone());

    let report = match command {
        Some(template) if !args.dry_run => {
            output.verbose_ctx("build", &format!("Compile command: {}", template));
            execute(output, CommandCompiler::new(project.root(), template, policy), file)?
        }
        _ => {
            output.verbose_ctx("build", "Dry run: stale targets are listed, nothing is executed");
            execute(output, DryRunCompiler::new(project.root(), policy), file)?
        }
    };

    if output.is_json() {
        output.data(&report);
    } else if report.is_cycle_failure() {
        println!("Dependency cycle detected; nothing was compiled.");
    } else if report.compiled.is_empty() {
        println!("Nothing to compile.");
    } else {
        println!("Compiled {} target(s):", report.compiled.len());
        for name in &report.compiled {
            println!("  {}", name);
        }
    }

    if report.is_cycle_failure() {
        anyhow::bail!("Build failed: dependency cycle in {}", file.path().display());
    }

    Ok(())
}

fn execute<C: ExternalCompiler>(
    output: &Output,
    compiler: C,
    file: &DeclarationFile,
) -> Result<BuildReport> {
    let mut make = Makefile::new(compiler);

    output.verbose_ctx("build", &format!("Parsing {}", file.path().display()));
    let declarations = file.read()?;
    output.verbose_ctx("build", &format!("Parsed {} targets", declarations.len()));

    let report = make
        .process(declarations)
        .with_context(|| format!("Build of {} aborted", file.path().display()))?;

    output.verbose_ctx(
        "build",
        &format!(
            "Modified files: {} of {} targets",
            report.modified.len(),
            report.targets
        ),
    );
    output.verbose_ctx("build", &format!("Finished in phase {:?}", report.phase));

    Ok(report)
}
