//! # Targeting Subcommand
//!
//! Targeting resolution only, no compliance fetches: the fast answer to
//! "is this policy even aimed at this device, and through which groups?".

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use polaris_core::RunContext;
use polaris_targeting::{evaluate, Policy, TargetingResult};

use crate::input::load_snapshot;

/// Arguments for the `polaris targeting` subcommand.
#[derive(Args, Debug)]
pub struct TargetingArgs {
    /// Snapshot file to resolve against.
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Resolve only this policy id instead of the whole catalog.
    #[arg(long, value_name = "POLICY_ID")]
    pub policy_id: Option<String>,

    /// Print results as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ResolvedTargeting<'a> {
    policy_id: &'a str,
    display_name: &'a str,
    #[serde(flatten)]
    result: TargetingResult,
}

/// Execute the targeting subcommand.
///
/// Exit code: 0 on success, 1 when `--policy-id` names a policy absent
/// from the snapshot.
pub fn run_targeting(args: &TargetingArgs) -> Result<u8> {
    let snapshot = load_snapshot(&args.snapshot)?;
    let memberships = snapshot.memberships();
    let filters = snapshot.filter_catalog();
    let ctx = RunContext::new(snapshot.device_id.clone());

    let selected: Vec<&Policy> = match &args.policy_id {
        Some(wanted) => {
            let matches: Vec<&Policy> = snapshot
                .policies
                .iter()
                .filter(|p| p.id.as_str() == wanted)
                .collect();
            if matches.is_empty() {
                eprintln!("policy {wanted} not found in snapshot");
                return Ok(1);
            }
            matches
        }
        None => snapshot.policies.iter().collect(),
    };

    let resolved: Vec<ResolvedTargeting<'_>> = selected
        .into_iter()
        .map(|policy| ResolvedTargeting {
            policy_id: policy.id.as_str(),
            display_name: &policy.display_name,
            result: evaluate(policy, &memberships, &filters, &ctx),
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
    } else {
        for entry in &resolved {
            println!(
                "{}  {}  {}",
                entry.policy_id, entry.display_name, entry.result.status
            );
            if let Some(filter) = &entry.result.applied_filter {
                println!("    filter: {} ({})", filter.display_name, filter.id);
            }
        }
        for warning in ctx.warnings() {
            println!(
                "WARN {} [{}] {}: {}",
                warning.policy_id, warning.kind, warning.reference, warning.detail
            );
        }
    }

    Ok(0)
}
