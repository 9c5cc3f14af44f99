use crate::SegNum;

/// Per-segment usage record, read-only input for one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentUsage {
    /// Last-modification timestamp, seconds.
    pub lastmod: i64,
    /// Number of currently-allocated blocks.
    pub nblocks: u32,
    /// True when the filesystem layer considers the segment dirty and
    /// not currently active.
    pub reclaimable: bool,
}

/// Filesystem-wide summary, constant for the duration of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilesystemSummary {
    pub blocks_per_segment: u32,
    /// Most recent write timestamp from a non-cleaner source.
    pub nongc_ctime: i64,
}

/// Checkpoint number below which the cleaner may safely overwrite data,
/// computed by walking the checkpoint history back from the current tip
/// by a configured protection interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProtectionCheckpoint(pub u64);

/// External collaborator that produces the protection checkpoint. A
/// real daemon walks its checkpoint history backward; this crate only
/// defines the seam.
pub trait CheckpointOracle {
    fn protection_checkpoint(&self) -> anyhow::Result<ProtectionCheckpoint>;
}

/// A fixed checkpoint, for tests and the CLI demo.
pub struct FixedCheckpointOracle(pub ProtectionCheckpoint);

impl CheckpointOracle for FixedCheckpointOracle {
    fn protection_checkpoint(&self) -> anyhow::Result<ProtectionCheckpoint> {
        Ok(self.0)
    }
}

/// An oracle that always fails to resolve a checkpoint, for exercising
/// the per-segment "skip and continue" path on checkpoint lookup
/// failure.
pub struct FailingCheckpointOracle;

impl CheckpointOracle for FailingCheckpointOracle {
    fn protection_checkpoint(&self) -> anyhow::Result<ProtectionCheckpoint> {
        Err(anyhow::anyhow!("checkpoint history unreadable"))
    }
}

/// Outcome of probing one segment for liveness.
pub enum LivenessOutcome {
    /// No reclamation needed; caller excludes the segment.
    Clean,
    /// Dirty, with the number of blocks still live at or before the
    /// protection checkpoint.
    Dirty { live_blocks: u32 },
    /// Transient failure reading the segment or resolving the
    /// checkpoint; caller logs and excludes the segment, cycle
    /// continues.
    Error(anyhow::Error),
}

/// Contract for assessing whether a segment is dirty and how many
/// blocks remain live, counted only against data visible at or before
/// the protection checkpoint. Implementations may perform
/// filesystem reads; the trait itself makes no I/O guarantee.
pub trait LivenessProbe {
    fn probe(
        &self,
        usage: &SegmentUsage,
        segnum: SegNum,
        checkpoint: ProtectionCheckpoint,
    ) -> LivenessOutcome;
}

/// Deterministic probe driven purely by the usage record's
/// `reclaimable` flag: a segment is dirty with `nblocks` live blocks
/// when reclaimable, clean otherwise. Used by tests and the CLI demo in
/// place of a real filesystem-backed probe.
pub struct SimulatedLivenessProbe;

impl LivenessProbe for SimulatedLivenessProbe {
    fn probe(
        &self,
        usage: &SegmentUsage,
        _segnum: SegNum,
        _checkpoint: ProtectionCheckpoint,
    ) -> LivenessOutcome {
        if usage.reclaimable {
            LivenessOutcome::Dirty {
                live_blocks: usage.nblocks,
            }
        } else {
            LivenessOutcome::Clean
        }
    }
}

/// Reports every segment dirty regardless of its `reclaimable` flag, for
/// exercising eligibility rules that `SimulatedLivenessProbe` normally
/// masks by reporting `Clean` whenever `!usage.reclaimable`.
pub struct AlwaysDirtyLivenessProbe;

impl LivenessProbe for AlwaysDirtyLivenessProbe {
    fn probe(
        &self,
        usage: &SegmentUsage,
        _segnum: SegNum,
        _checkpoint: ProtectionCheckpoint,
    ) -> LivenessOutcome {
        LivenessOutcome::Dirty {
            live_blocks: usage.nblocks,
        }
    }
}

/// Wraps another probe and reports a transient error for a fixed set of
/// segment numbers, for exercising the "skip and continue" behavior.
pub struct FlakyLivenessProbe<P> {
    inner: P,
    fail_segnums: Vec<SegNum>,
}

impl<P: LivenessProbe> FlakyLivenessProbe<P> {
    pub fn new(inner: P, fail_segnums: Vec<SegNum>) -> Self {
        FlakyLivenessProbe {
            inner,
            fail_segnums,
        }
    }
}

impl<P: LivenessProbe> LivenessProbe for FlakyLivenessProbe<P> {
    fn probe(
        &self,
        usage: &SegmentUsage,
        segnum: SegNum,
        checkpoint: ProtectionCheckpoint,
    ) -> LivenessOutcome {
        if self.fail_segnums.contains(&segnum) {
            LivenessOutcome::Error(anyhow::anyhow!("simulated I/O failure"))
        } else {
            self.inner.probe(usage, segnum, checkpoint)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(lastmod: i64, nblocks: u32, reclaimable: bool) -> SegmentUsage {
        SegmentUsage {
            lastmod,
            nblocks,
            reclaimable,
        }
    }

    #[test]
    fn test_simulated_probe_clean_when_not_reclaimable() {
        let probe = SimulatedLivenessProbe;
        let outcome = probe.probe(&usage(100, 50, false), 0, ProtectionCheckpoint(0));
        assert!(matches!(outcome, LivenessOutcome::Clean));
    }

    #[test]
    fn test_simulated_probe_dirty_when_reclaimable() {
        let probe = SimulatedLivenessProbe;
        let outcome = probe.probe(&usage(100, 50, true), 0, ProtectionCheckpoint(0));
        assert!(matches!(outcome, LivenessOutcome::Dirty { live_blocks: 50 }));
    }

    #[test]
    fn test_always_dirty_probe_ignores_reclaimable_flag() {
        let probe = AlwaysDirtyLivenessProbe;
        let outcome = probe.probe(&usage(100, 50, false), 0, ProtectionCheckpoint(0));
        assert!(matches!(outcome, LivenessOutcome::Dirty { live_blocks: 50 }));
    }

    #[test]
    fn test_flaky_probe_errors_only_for_listed_segments() {
        let probe = FlakyLivenessProbe::new(SimulatedLivenessProbe, vec![3]);
        assert!(matches!(
            probe.probe(&usage(100, 10, true), 3, ProtectionCheckpoint(0)),
            LivenessOutcome::Error(_)
        ));
        assert!(matches!(
            probe.probe(&usage(100, 10, true), 4, ProtectionCheckpoint(0)),
            LivenessOutcome::Dirty { .. }
        ));
    }
}
