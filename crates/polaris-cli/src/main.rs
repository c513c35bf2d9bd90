//! # polaris CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Uses clap derive macros; verbosity flags map onto a tracing
//! `EnvFilter`.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use polaris_cli::audit::{run_audit_cmd, AuditArgs};
use polaris_cli::targeting::{run_targeting, TargetingArgs};

/// Polaris — device policy-targeting and compliance audit tool.
///
/// Answers "why is this policy (not) applying to this device?" from a
/// captured backend snapshot: resolves assignment targeting with group
/// provenance, then cross-checks the device's compliance state across
/// every backend API shape and reconciles the disagreements.
#[derive(Parser, Debug)]
#[command(name = "polaris", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a full audit: targeting, compliance fetches, reconciliation.
    Audit(AuditArgs),

    /// Resolve targeting only, without compliance fetches.
    Targeting(TargetingArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Audit(args) => run_audit_cmd(&args),
        Commands::Targeting(args) => run_targeting(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
