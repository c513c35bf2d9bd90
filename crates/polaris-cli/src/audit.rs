//! # Audit Subcommand
//!
//! Runs the full pipeline over one snapshot file: targeting resolution
//! for every policy, concurrent compliance fetches replayed from the
//! snapshot, reconciliation, and report output.
//!
//! Ctrl-C mid-run cancels cleanly: the partial report is still produced
//! with the unfinished fetches recorded as gaps.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tokio_util::sync::CancellationToken;

use polaris_engine::{run_audit, AuditOptions, AuditReport, PolicyAudit};
use polaris_sources::{standard_sources, SnapshotTransport};

use crate::input::load_snapshot;

/// Arguments for the `polaris audit` subcommand.
#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Snapshot file to audit (see `polaris audit --help` for the format).
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Write the full JSON report to this file.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print the full JSON report to stdout instead of the text summary.
    #[arg(long)]
    pub json: bool,

    /// Maximum concurrent source fetches.
    #[arg(long, default_value_t = 8)]
    pub concurrency: usize,

    /// Per-source fetch timeout in seconds.
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,
}

/// Execute the audit subcommand.
///
/// Exit code: 0 when every targeted policy reconciled to a non-problem
/// state with complete evidence, 1 when problems, disagreements, or
/// missing evidence were found.
pub fn run_audit_cmd(args: &AuditArgs) -> Result<u8> {
    let snapshot = load_snapshot(&args.snapshot)?;
    let catalog = snapshot.policy_catalog();
    let memberships = snapshot.memberships();
    let filters = snapshot.filter_catalog();
    let transport = Arc::new(SnapshotTransport::new(snapshot.sources.clone()));
    let sources = standard_sources(transport);

    let options = AuditOptions {
        concurrency: args.concurrency,
        adapter_timeout: Duration::from_secs(args.timeout_secs),
    };

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let report = runtime.block_on(async {
        let cancel = CancellationToken::new();
        let signal_cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received; finishing with a partial report");
                signal_cancel.cancel();
            }
        });
        run_audit(
            snapshot.device_id.clone(),
            &catalog,
            &memberships,
            &filters,
            &sources,
            &options,
            cancel,
        )
        .await
    });

    if let Some(ref path) = args.output {
        write_report(&report, path)?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text_report(&report);
    }

    let summary = report.summary();
    let clean = summary.problems == 0 && summary.contested == 0 && summary.incomplete == 0;
    Ok(if clean { 0 } else { 1 })
}

fn write_report(report: &AuditReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).with_context(|| format!("failed to write report {}", path.display()))?;
    tracing::info!(path = %path.display(), "report written");
    Ok(())
}

fn print_text_report(report: &AuditReport) {
    println!(
        "Audit {} — device {} — {}",
        report.run_id, report.device_id, report.generated_at
    );
    if report.cancelled {
        println!("  (run cancelled; report is partial)");
    }
    println!();

    for entry in &report.entries {
        println!("{}", format_entry(entry));
    }

    if !report.warnings.is_empty() {
        println!("\nData-integrity warnings:");
        for warning in &report.warnings {
            println!(
                "  {} [{}] {}: {}",
                warning.policy_id, warning.kind, warning.reference, warning.detail
            );
        }
    }

    println!("\n{}", report.summary());
}

fn format_entry(entry: &PolicyAudit) -> String {
    let mut line = format!(
        "{}  {}  [{}]  {}",
        entry.policy.id, entry.policy.display_name, entry.policy.kind, entry.targeting.status
    );
    if let Some(verdict) = &entry.verdict {
        line.push_str(&format!("  => {} ({})", verdict.state, verdict.confidence));
        if verdict.is_contested() {
            let dissent: Vec<String> = verdict
                .disagreeing_sources
                .iter()
                .map(|(source, state)| format!("{source}={state}"))
                .collect();
            line.push_str(&format!("  CONTESTED [{}]", dissent.join(", ")));
        }
    }
    for gap in &entry.gaps {
        line.push_str(&format!("\n    gap: {} {}", gap.source, gap.reason));
    }
    if entry.inconsistent {
        line.push_str("\n    INCONSISTENT: targeted policy has no verdict");
    }
    line
}
