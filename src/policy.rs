use std::cmp::Ordering;

use crate::candidate::{Candidate, Eligibility};
use crate::config::EngineConfig;
use crate::error::CleanerError;
use crate::liveness::{CheckpointOracle, FilesystemSummary, LivenessProbe, SegmentUsage};
use crate::SegNum;

/// Everything a single-segment `evaluate` call needs, bundled so the
/// trait signature doesn't grow a parameter every time a policy needs
/// one more ambient value.
pub struct EvalContext<'a> {
    pub sustat: &'a FilesystemSummary,
    pub now: i64,
    pub prottime: i64,
    /// Resolved once per segment, inside each policy's own `evaluate`,
    /// not once per cycle: a lookup failure must exclude only the
    /// segment being evaluated, not abort the whole cycle.
    pub checkpoint_oracle: &'a dyn CheckpointOracle,
    pub probe: &'a dyn LivenessProbe,
}

/// Everything a whole-cycle `select` call needs.
pub struct SelectContext<'a> {
    pub sustat: &'a FilesystemSummary,
    /// Usage records indexed by segment number, `0..suinfo.len()`.
    pub suinfo: &'a [SegmentUsage],
    pub now: i64,
    pub prottime: i64,
    pub checkpoint_oracle: &'a dyn CheckpointOracle,
    pub probe: &'a dyn LivenessProbe,
    pub capacity: usize,
}

impl<'a> SelectContext<'a> {
    pub fn eval_context(&self) -> EvalContext<'a> {
        EvalContext {
            sustat: self.sustat,
            now: self.now,
            prottime: self.prottime,
            checkpoint_oracle: self.checkpoint_oracle,
            probe: self.probe,
        }
    }
}

/// Output of a cycle's selection for one policy.
#[derive(Debug, Clone, Default)]
pub struct SelectionResult {
    /// Best-first per the policy's ordering.
    pub segnums: Vec<SegNum>,
    /// Minimum `lastmod` among the selected segments, for telemetry.
    pub oldest: Option<i64>,
    pub stats: SelectionStats,
}

/// Per-cycle tally of why segments were included or excluded, broken
/// down the way the error table does, so a caller can feed it straight
/// into [`crate::metrics::Metrics`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionStats {
    pub evaluated: usize,
    pub selected: usize,
    pub skipped_clean: usize,
    pub skipped_protected: usize,
    pub skipped_not_reclaimable: usize,
    pub skipped_error: usize,
    pub skipped_utilization_cap: usize,
}

impl SelectionStats {
    pub fn record(&mut self, reason: crate::candidate::IneligibleReason) {
        use crate::candidate::IneligibleReason::*;
        match reason {
            Clean => self.skipped_clean += 1,
            TimeProtected => self.skipped_protected += 1,
            NotReclaimable => self.skipped_not_reclaimable += 1,
            ProbeError => self.skipped_error += 1,
            UtilizationCap => self.skipped_utilization_cap += 1,
            WrittenAfterNongcCtime => self.skipped_protected += 1,
        }
    }
}

/// Uniform contract every cleaning policy implements: `init`/`destroy`
/// are optional lifecycle hooks (default to no-ops here, since Rust
/// ownership already handles a policy's internal state), `evaluate`
/// scores one segment, `compare` gives the total order used to rank
/// candidates, and `select` may be overridden to replace the default
/// scan-evaluate-sort-truncate selector entirely (only `HotColdPolicy`
/// does).
pub trait Policy {
    fn name(&self) -> &str;

    /// Called once at policy selection. Failure aborts daemon startup.
    fn init(&mut self, _cfg: &EngineConfig) -> Result<(), CleanerError> {
        Ok(())
    }

    /// Called once at daemon shutdown or policy swap. Idempotent.
    fn destroy(&mut self) {}

    /// Score and classify one segment. Must not mutate any input.
    fn evaluate(&self, ctx: &EvalContext<'_>, usage: &SegmentUsage, segnum: SegNum) -> Eligibility;

    /// Total order over candidates, best-first. Implementations must
    /// tie-break on `segnum` ascending so output is deterministic.
    fn compare(&self, a: &Candidate, b: &Candidate) -> Ordering;

    /// Custom selection logic. Defaults to the scan-evaluate-sort-truncate
    /// pipeline; override only when a policy can't be expressed that way
    /// (hot-cold segregation).
    fn select(&self, ctx: &SelectContext<'_>) -> Result<SelectionResult, CleanerError> {
        crate::selector::default_select(self, ctx)
    }
}

/// Shared tie-break helper: ascending by `segnum`. Every built-in
/// policy's `compare` ends with this.
pub fn segnum_tiebreak(a: &Candidate, b: &Candidate) -> Ordering {
    a.segnum.cmp(&b.segnum)
}

/// Eligibility rules common to all evaluators: time protection and the
/// filesystem's non-reclaimable flag. Liveness and internal errors are the probe's
/// job and are checked by each policy around its own probe call, since
/// the probe's error handling (log level, metrics counter) differs by
/// whether it was a read failure or a checkpoint lookup failure.
pub fn time_protected(usage: &SegmentUsage, now: i64, prottime: i64) -> bool {
    usage.lastmod >= prottime && usage.lastmod <= now
}
