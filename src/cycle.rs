use std::sync::atomic::Ordering;

use crate::error::CleanerError;
use crate::liveness::{CheckpointOracle, FilesystemSummary, LivenessProbe, SegmentUsage};
use crate::logging::{EventLog, LogEvent, LogLevel};
use crate::metrics::Metrics;
use crate::policy::{SelectContext, SelectionStats};
use crate::registry::PolicyRegistry;
use crate::SegNum;

/// Result of one cleaning cycle: the chosen policy's selection,
/// plus the bookkeeping a caller's scheduler needs to decide whether the
/// cycle was worth acting on.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub policy_name: String,
    pub segnums: Vec<SegNum>,
    pub oldest: Option<i64>,
    pub stats: SelectionStats,
}

/// Run one cleaning cycle end to end: look up the requested policy, run
/// its selection, and fold the results into the caller's metrics and
/// event log. The protection checkpoint is not resolved here: each
/// policy resolves it itself once per segment, so a lookup failure
/// excludes only that segment rather than aborting the cycle.
#[allow(clippy::too_many_arguments)]
pub fn run_cycle(
    registry: &PolicyRegistry,
    policy_name: &str,
    sustat: &FilesystemSummary,
    suinfo: &[SegmentUsage],
    now: i64,
    prottime: i64,
    checkpoint_oracle: &dyn CheckpointOracle,
    probe: &dyn LivenessProbe,
    capacity: usize,
    metrics: &Metrics,
    event_log: &mut EventLog,
) -> Result<CycleOutcome, CleanerError> {
    let policy = registry.get(policy_name)?;

    let ctx = SelectContext {
        sustat,
        suinfo,
        now,
        prottime,
        checkpoint_oracle,
        probe,
        capacity,
    };

    let result = policy.select(&ctx)?;

    metrics.record_cycle();
    metrics
        .segments_evaluated
        .fetch_add(result.stats.evaluated as u64, Ordering::Relaxed);
    metrics.record_selected(result.stats.selected as u64);
    metrics
        .segments_skipped_clean
        .fetch_add(result.stats.skipped_clean as u64, Ordering::Relaxed);
    metrics
        .segments_skipped_protected
        .fetch_add(result.stats.skipped_protected as u64, Ordering::Relaxed);
    metrics.segments_skipped_not_reclaimable.fetch_add(
        result.stats.skipped_not_reclaimable as u64,
        Ordering::Relaxed,
    );
    metrics
        .segments_skipped_error
        .fetch_add(result.stats.skipped_error as u64, Ordering::Relaxed);
    metrics.segments_skipped_utilization_cap.fetch_add(
        result.stats.skipped_utilization_cap as u64,
        Ordering::Relaxed,
    );

    event_log.log(
        LogEvent::new(
            "cycle",
            LogLevel::Info,
            format!(
                "policy={} evaluated={} selected={}",
                policy_name, result.stats.evaluated, result.stats.selected
            ),
        )
        .with_context(serde_json::json!({
            "policy": policy_name,
            "evaluated": result.stats.evaluated,
            "selected": result.stats.selected,
            "skipped_clean": result.stats.skipped_clean,
            "skipped_protected": result.stats.skipped_protected,
            "skipped_not_reclaimable": result.stats.skipped_not_reclaimable,
            "skipped_error": result.stats.skipped_error,
            "skipped_utilization_cap": result.stats.skipped_utilization_cap,
        })),
    );

    if result.stats.skipped_error > 0 {
        event_log.log(LogEvent::new(
            "cycle",
            LogLevel::Warn,
            format!(
                "{} segment(s) skipped due to probe errors this cycle",
                result.stats.skipped_error
            ),
        ));
    }

    Ok(CycleOutcome {
        policy_name: policy_name.to_string(),
        segnums: result.segnums,
        oldest: result.oldest,
        stats: result.stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::liveness::{
        FailingCheckpointOracle, FixedCheckpointOracle, ProtectionCheckpoint,
        SimulatedLivenessProbe,
    };

    fn usage(lastmod: i64, nblocks: u32, reclaimable: bool) -> SegmentUsage {
        SegmentUsage {
            lastmod,
            nblocks,
            reclaimable,
        }
    }

    #[test]
    fn test_run_cycle_with_timestamp_policy() {
        let registry = PolicyRegistry::with_builtins();
        let sustat = FilesystemSummary {
            blocks_per_segment: 100,
            nongc_ctime: 2_000_000,
        };
        let suinfo = vec![usage(100_000, 10, true), usage(900_000, 10, true)];
        let oracle = FixedCheckpointOracle(ProtectionCheckpoint(0));
        let probe = SimulatedLivenessProbe;
        let metrics = Metrics::new();
        let mut log = EventLog::new(16);

        let outcome = run_cycle(
            &registry,
            "timestamp",
            &sustat,
            &suinfo,
            1_000_000,
            999_000,
            &oracle,
            &probe,
            10,
            &metrics,
            &mut log,
        )
        .unwrap();

        assert_eq!(outcome.segnums, vec![0, 1]);
        assert_eq!(metrics.snapshot().cycles_run, 1);
        assert!(!log.get_events().is_empty());
    }

    #[test]
    fn test_run_cycle_absorbs_checkpoint_lookup_failure() {
        let registry = PolicyRegistry::with_builtins();
        let sustat = FilesystemSummary {
            blocks_per_segment: 100,
            nongc_ctime: 2_000_000,
        };
        let suinfo = vec![usage(500_000, 10, true), usage(500_000, 20, true)];
        let oracle = FailingCheckpointOracle;
        let probe = SimulatedLivenessProbe;
        let metrics = Metrics::new();
        let mut log = EventLog::new(16);

        let outcome = run_cycle(
            &registry,
            "greedy",
            &sustat,
            &suinfo,
            1_000_000,
            999_000,
            &oracle,
            &probe,
            10,
            &metrics,
            &mut log,
        )
        .unwrap();

        assert!(outcome.segnums.is_empty());
        assert_eq!(outcome.stats.skipped_error, 2);
        assert_eq!(metrics.snapshot().cycles_run, 1);
    }

    #[test]
    fn test_run_cycle_unknown_policy_errors() {
        let registry = PolicyRegistry::with_builtins();
        let sustat = FilesystemSummary {
            blocks_per_segment: 100,
            nongc_ctime: 2_000_000,
        };
        let suinfo: Vec<SegmentUsage> = Vec::new();
        let oracle = FixedCheckpointOracle(ProtectionCheckpoint(0));
        let probe = SimulatedLivenessProbe;
        let metrics = Metrics::new();
        let mut log = EventLog::new(16);

        let err = run_cycle(
            &registry,
            "nonexistent",
            &sustat,
            &suinfo,
            1_000_000,
            999_000,
            &oracle,
            &probe,
            10,
            &metrics,
            &mut log,
        )
        .unwrap_err();
        assert!(matches!(err, CleanerError::UnknownPolicy(_)));
    }
}
