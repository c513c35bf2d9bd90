//! # Run Context
//!
//! One [`RunContext`] is created per audit run and passed into every
//! component that can surface diagnostics. It replaces any process-global
//! log or session object: nothing persists across runs, and concurrent
//! runs never observe each other's warnings.
//!
//! The warning sink is the only mutable state shared across a run's
//! concurrent evaluations, guarded by a `parking_lot::Mutex`. Everything
//! else in the context is immutable after construction.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::identity::DeviceId;
use crate::warning::DataIntegrityWarning;

/// Per-run context: identity of the run, the device under audit, and the
/// sink for data-integrity warnings.
#[derive(Debug)]
pub struct RunContext {
    run_id: Uuid,
    device_id: DeviceId,
    started_at: DateTime<Utc>,
    warnings: Mutex<Vec<DataIntegrityWarning>>,
}

impl RunContext {
    /// Create a fresh context for a new audit run.
    pub fn new(device_id: DeviceId) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            device_id,
            started_at: Utc::now(),
            warnings: Mutex::new(Vec::new()),
        }
    }

    /// The unique identifier of this run.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// The device under audit.
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// When the run started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Record a data-integrity warning and emit the matching log event.
    pub fn warn_integrity(&self, warning: DataIntegrityWarning) {
        tracing::warn!(
            policy_id = %warning.policy_id,
            kind = %warning.kind,
            reference = %warning.reference,
            "data-integrity warning: {}",
            warning.detail
        );
        self.warnings.lock().push(warning);
    }

    /// Snapshot of all warnings recorded so far, in recording order.
    pub fn warnings(&self) -> Vec<DataIntegrityWarning> {
        self.warnings.lock().clone()
    }

    /// Number of warnings recorded so far.
    pub fn warning_count(&self) -> usize {
        self.warnings.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::PolicyId;
    use crate::warning::IntegrityWarningKind;

    fn ctx() -> RunContext {
        RunContext::new(DeviceId::new("dev-1").unwrap())
    }

    #[test]
    fn fresh_context_has_no_warnings() {
        let ctx = ctx();
        assert!(ctx.warnings().is_empty());
        assert_eq!(ctx.warning_count(), 0);
    }

    #[test]
    fn warnings_are_recorded_in_order() {
        let ctx = ctx();
        for i in 0..3 {
            ctx.warn_integrity(DataIntegrityWarning {
                policy_id: PolicyId::new(format!("pol-{i}")).unwrap(),
                kind: IntegrityWarningKind::DanglingGroup,
                reference: format!("grp-{i}"),
                detail: "unknown group".to_string(),
            });
        }
        let warnings = ctx.warnings();
        assert_eq!(warnings.len(), 3);
        assert_eq!(warnings[0].policy_id.as_str(), "pol-0");
        assert_eq!(warnings[2].policy_id.as_str(), "pol-2");
    }

    #[test]
    fn distinct_runs_have_distinct_ids() {
        let a = ctx();
        let b = ctx();
        assert_ne!(a.run_id(), b.run_id());
    }

    #[test]
    fn context_is_shareable_across_threads() {
        let ctx = std::sync::Arc::new(ctx());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let ctx = ctx.clone();
                std::thread::spawn(move || {
                    ctx.warn_integrity(DataIntegrityWarning {
                        policy_id: PolicyId::new(format!("pol-{i}")).unwrap(),
                        kind: IntegrityWarningKind::DanglingFilter,
                        reference: format!("flt-{i}"),
                        detail: "unknown filter".to_string(),
                    });
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(ctx.warning_count(), 4);
    }
}
