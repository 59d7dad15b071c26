//! Kiln CLI — the command-line interface for the Kiln build orchestrator.
//!
//! Provides `kiln build` for incremental native builds, `kiln run` for
//! building and launching the produced binary, `kiln package` for
//! producing an installable bundle, and `kiln clean` for removing build
//! state.

#![warn(missing_docs)]

mod build;
mod clean;
mod package;
mod pipeline;
mod run;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Kiln — an incremental native build orchestrator.
#[derive(Parser, Debug)]
#[command(name = "kiln", version, about = "Kiln build orchestrator")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `kiln.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the project for the configured target.
    Build(BuildArgs),
    /// Build the project and launch the produced binary.
    Run(RunArgs),
    /// Build the project and package it into an installable bundle.
    Package(PackageArgs),
    /// Remove all build state for the project.
    Clean,
}

/// Arguments for the `kiln build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Target name to select from `kiln.toml` (`[targets.*]`).
    #[arg(short, long)]
    pub target: Option<String>,

    /// Build the release variant instead of the configured one.
    #[arg(long)]
    pub release: bool,

    /// Treat only these output-artifact paths as changed, instead of a
    /// full rebuild.
    #[arg(long, num_args = 1..)]
    pub changed: Vec<PathBuf>,

    /// Output format for diagnostics.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `kiln run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Target name to select from `kiln.toml`.
    #[arg(short, long)]
    pub target: Option<String>,

    /// Build the release variant instead of the configured one.
    #[arg(long)]
    pub release: bool,

    /// Extra arguments passed to the launched binary, after the configured
    /// ones.
    #[arg(last = true)]
    pub extra_args: Vec<String>,
}

/// Arguments for the `kiln package` subcommand.
#[derive(Parser, Debug)]
pub struct PackageArgs {
    /// Target name to select from `kiln.toml`.
    #[arg(short, long)]
    pub target: Option<String>,

    /// Build the release variant instead of the configured one.
    #[arg(long)]
    pub release: bool,

    /// Directory the bundle is installed into, overriding the configured
    /// one.
    #[arg(long)]
    pub install_dir: Option<PathBuf>,
}

/// Diagnostic output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Build(ref args) => build::run(args, &global),
        Command::Run(ref args) => run::run(args, &global),
        Command::Package(ref args) => package::run(args, &global),
        Command::Clean => clean::run(&global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_build_default() {
        let cli = Cli::parse_from(["kiln", "build"]);
        match cli.command {
            Command::Build(args) => {
                assert!(args.target.is_none());
                assert!(!args.release);
                assert!(args.changed.is_empty());
                assert_eq!(args.format, ReportFormat::Text);
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_build_with_changed_paths() {
        let cli = Cli::parse_from([
            "kiln",
            "build",
            "--release",
            "--changed",
            "out/com/acme/Foo.class",
            "out/com/acme/Bar.class",
        ]);
        match cli.command {
            Command::Build(args) => {
                assert!(args.release);
                assert_eq!(args.changed.len(), 2);
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_run_with_extra_args() {
        let cli = Cli::parse_from(["kiln", "run", "--target", "device", "--", "--port", "8080"]);
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.target.as_deref(), Some("device"));
                assert_eq!(args.extra_args, vec!["--port", "8080"]);
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["kiln", "--quiet", "--config", "custom/kiln.toml", "clean"]);
        assert!(cli.quiet);
        assert_eq!(cli.config.as_deref(), Some("custom/kiln.toml"));
        assert!(matches!(cli.command, Command::Clean));
    }
}
