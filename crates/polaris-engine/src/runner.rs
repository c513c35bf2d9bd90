//! # Audit Runner
//!
//! Fan-out/fan-in over the source registry. One fetch task per
//! (targeted policy, applicable source) pair, bounded by a semaphore,
//! each under a per-adapter timeout and the run's cancellation token.
//!
//! The run always terminates with a report: cancellation and timeouts
//! turn pending fetches into gaps, they never abort assembly.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use polaris_core::{CoreError, DeviceId, RunContext};
use polaris_reconcile::{reconcile, ReconciledVerdict};
use polaris_sources::{ComplianceRecord, ComplianceSource};
use polaris_targeting::{
    evaluate, AssignmentFilterCatalog, GroupMembershipSet, Policy, PolicyCatalog, TargetingResult,
};

use crate::report::{AuditReport, GapReason, PolicyAudit, SourceGap};

/// Tunables for one audit run.
#[derive(Debug, Clone)]
pub struct AuditOptions {
    /// Maximum backend fetches in flight at once.
    pub concurrency: usize,
    /// Per-fetch deadline. A fetch that exceeds it becomes a timeout gap.
    pub adapter_timeout: Duration,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            concurrency: 8,
            adapter_timeout: Duration::from_secs(10),
        }
    }
}

type FetchKey = (usize, polaris_sources::SourceId);

/// Run one full audit of `device_id` against every policy in the catalog.
///
/// Targeting is evaluated for all policies; compliance fetches run only
/// for the targeted subset, and only against sources whose strategy
/// exists for the policy's kind. Cancelling `cancel` mid-run yields a
/// partial report with the unfinished fetches recorded as gaps and
/// `cancelled` set.
pub async fn run_audit(
    device_id: DeviceId,
    catalog: &PolicyCatalog,
    memberships: &GroupMembershipSet,
    filters: &AssignmentFilterCatalog,
    sources: &[Arc<dyn ComplianceSource>],
    options: &AuditOptions,
    cancel: CancellationToken,
) -> AuditReport {
    let ctx = RunContext::new(device_id.clone());
    tracing::info!(
        run_id = %ctx.run_id(),
        device_id = %device_id,
        policies = catalog.len(),
        sources = sources.len(),
        "audit run starting"
    );

    let evaluations: Vec<(Policy, TargetingResult)> = catalog
        .iter()
        .map(|policy| {
            let result = evaluate(policy, memberships, filters, &ctx);
            (policy.clone(), result)
        })
        .collect();

    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
    let mut handles: Vec<(FetchKey, JoinHandle<Result<ComplianceRecord, SourceGap>>)> = Vec::new();

    for (idx, (policy, targeting)) in evaluations.iter().enumerate() {
        if !targeting.is_targeted() {
            continue;
        }
        for source in sources {
            if !source.supports(policy.kind) {
                continue;
            }
            let key = (idx, source.source_id());
            let task = fetch_one(
                semaphore.clone(),
                source.clone(),
                device_id.clone(),
                policy.clone(),
                options.adapter_timeout,
                cancel.clone(),
            );
            handles.push((key, tokio::spawn(task)));
        }
    }

    let mut records: HashMap<usize, Vec<ComplianceRecord>> = HashMap::new();
    let mut gaps: HashMap<usize, Vec<SourceGap>> = HashMap::new();
    for ((idx, source_id), handle) in handles {
        match handle.await {
            Ok(Ok(record)) => records.entry(idx).or_default().push(record),
            Ok(Err(gap)) => gaps.entry(idx).or_default().push(gap),
            Err(join_err) => {
                tracing::error!(source = %source_id, error = %join_err, "fetch task aborted");
                gaps.entry(idx).or_default().push(SourceGap {
                    source: source_id,
                    reason: GapReason::Failure {
                        detail: join_err.to_string(),
                    },
                });
            }
        }
    }

    let mut verdicts: HashMap<usize, ReconciledVerdict> = HashMap::new();
    for (idx, (policy, targeting)) in evaluations.iter().enumerate() {
        if targeting.is_targeted() {
            let policy_records = records.remove(&idx).unwrap_or_default();
            verdicts.insert(idx, reconcile(&policy.id, &policy_records));
        }
    }

    let mut entries = Vec::with_capacity(evaluations.len());
    for (idx, (policy, targeting)) in evaluations.into_iter().enumerate() {
        let targeted = targeting.is_targeted();
        let verdict = verdicts.remove(&idx);
        // Contract: every targeted policy has a verdict by now. If one is
        // missing the entry is kept and marked, never dropped.
        let inconsistent = targeted && verdict.is_none();
        if inconsistent {
            let err = CoreError::PipelineInconsistency {
                policy_id: policy.id.to_string(),
            };
            debug_assert!(false, "{err}");
            tracing::error!(policy_id = %policy.id, "{err}");
        }
        entries.push(PolicyAudit {
            policy,
            targeting,
            verdict,
            gaps: gaps.remove(&idx).unwrap_or_default(),
            inconsistent,
        });
    }

    let report = AuditReport {
        run_id: ctx.run_id(),
        device_id,
        generated_at: Utc::now(),
        entries,
        warnings: ctx.warnings(),
        cancelled: cancel.is_cancelled(),
    };
    tracing::info!(run_id = %report.run_id, summary = %report.summary(), "audit run finished");
    report
}

async fn fetch_one(
    semaphore: Arc<Semaphore>,
    source: Arc<dyn ComplianceSource>,
    device_id: DeviceId,
    policy: Policy,
    adapter_timeout: Duration,
    cancel: CancellationToken,
) -> Result<ComplianceRecord, SourceGap> {
    let source_id = source.source_id();
    let cancelled = || SourceGap {
        source: source_id,
        reason: GapReason::Cancelled,
    };

    let permit = tokio::select! {
        permit = semaphore.acquire_owned() => permit,
        _ = cancel.cancelled() => return Err(cancelled()),
    };
    // The semaphore lives for the whole run; acquisition only fails if it
    // were closed, which counts as cancellation.
    let _permit = permit.map_err(|_| cancelled())?;

    let fetch = tokio::time::timeout(adapter_timeout, source.fetch(&device_id, &policy));
    let outcome = tokio::select! {
        outcome = fetch => outcome,
        _ = cancel.cancelled() => return Err(cancelled()),
    };

    match outcome {
        Ok(Ok(record)) => Ok(record),
        Ok(Err(err)) => {
            tracing::warn!(
                policy_id = %policy.id,
                source = %source_id,
                error = %err,
                "compliance fetch failed"
            );
            Err(SourceGap {
                source: source_id,
                reason: GapReason::Failure {
                    detail: err.to_string(),
                },
            })
        }
        Err(_) => {
            tracing::warn!(
                policy_id = %policy.id,
                source = %source_id,
                timeout_ms = adapter_timeout.as_millis() as u64,
                "compliance fetch timed out"
            );
            Err(SourceGap {
                source: source_id,
                reason: GapReason::Timeout,
            })
        }
    }
}
