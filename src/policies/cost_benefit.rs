use std::cmp::Ordering;

use crate::candidate::{Candidate, Eligibility, IneligibleReason};
use crate::error::CleanerError;
use crate::liveness::{LivenessOutcome, SegmentUsage};
use crate::policy::{segnum_tiebreak, time_protected, EvalContext, Policy};
use crate::SegNum;

/// Classic LFS cost-benefit: weigh the age of the data a segment holds
/// against how full it still is, so an old mostly-empty segment beats a
/// young mostly-empty one and a full segment of any age loses out.
#[derive(Debug, Default)]
pub struct CostBenefitPolicy;

impl CostBenefitPolicy {
    pub fn new() -> Self {
        CostBenefitPolicy
    }
}

impl Policy for CostBenefitPolicy {
    fn name(&self) -> &str {
        "cost-benefit"
    }

    fn evaluate(&self, ctx: &EvalContext<'_>, usage: &SegmentUsage, segnum: SegNum) -> Eligibility {
        let checkpoint = match ctx.checkpoint_oracle.protection_checkpoint() {
            Ok(cp) => cp,
            Err(source) => {
                log::error!("cost-benefit: {}", CleanerError::CheckpointLookup { segnum, source });
                return Eligibility::Ineligible(IneligibleReason::ProbeError);
            }
        };

        let live_blocks = match ctx.probe.probe(usage, segnum, checkpoint) {
            LivenessOutcome::Clean => return Eligibility::Ineligible(IneligibleReason::Clean),
            LivenessOutcome::Error(e) => {
                log::warn!(
                    "cost-benefit: transient read failure on segment {}: {}",
                    segnum,
                    e
                );
                return Eligibility::Ineligible(IneligibleReason::ProbeError);
            }
            LivenessOutcome::Dirty { live_blocks } => live_blocks,
        };

        if !usage.reclaimable {
            return Eligibility::Ineligible(IneligibleReason::NotReclaimable);
        }

        if time_protected(usage, ctx.now, ctx.prottime) {
            return Eligibility::Ineligible(IneligibleReason::TimeProtected);
        }

        let blocks_per_segment = ctx.sustat.blocks_per_segment;
        let u = live_blocks as f64 / blocks_per_segment as f64;
        let age = (ctx.now - usage.lastmod).max(0) as f64;
        let score = (1.0 - u) * age / (1.0 + u);

        Eligibility::Eligible(Candidate::new(segnum, score).with_util(u))
    }

    fn compare(&self, a: &Candidate, b: &Candidate) -> Ordering {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| segnum_tiebreak(a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::liveness::{
        AlwaysDirtyLivenessProbe, CheckpointOracle, FilesystemSummary, FixedCheckpointOracle,
        LivenessProbe, ProtectionCheckpoint, SimulatedLivenessProbe,
    };

    fn ctx<'a>(
        sustat: &'a FilesystemSummary,
        probe: &'a dyn LivenessProbe,
        oracle: &'a dyn CheckpointOracle,
    ) -> EvalContext<'a> {
        EvalContext {
            sustat,
            now: 1_000_000,
            prottime: 999_000,
            checkpoint_oracle: oracle,
            probe,
        }
    }

    fn usage(lastmod: i64, nblocks: u32) -> SegmentUsage {
        SegmentUsage {
            lastmod,
            nblocks,
            reclaimable: true,
        }
    }

    /// An ordering test: an old, mostly-empty segment should
    /// outscore a young, mostly-empty one, and both should outscore a
    /// nearly-full segment regardless of age.
    #[test]
    fn test_old_empty_beats_young_empty_beats_full() {
        let sustat = FilesystemSummary {
            blocks_per_segment: 100,
            nongc_ctime: 2_000_000,
        };
        let probe = SimulatedLivenessProbe;
        let oracle = FixedCheckpointOracle(ProtectionCheckpoint(0));
        let policy = CostBenefitPolicy::new();

        let old_empty = match policy.evaluate(&ctx(&sustat, &probe, &oracle), &usage(0, 5), 0) {
            Eligibility::Eligible(c) => c,
            _ => panic!("expected eligible"),
        };
        let young_empty = match policy.evaluate(&ctx(&sustat, &probe, &oracle), &usage(900_000, 5), 1) {
            Eligibility::Eligible(c) => c,
            _ => panic!("expected eligible"),
        };
        let old_full = match policy.evaluate(&ctx(&sustat, &probe, &oracle), &usage(0, 95), 2) {
            Eligibility::Eligible(c) => c,
            _ => panic!("expected eligible"),
        };

        assert_eq!(policy.compare(&old_empty, &young_empty), Ordering::Less);
        assert_eq!(policy.compare(&young_empty, &old_full), Ordering::Less);
    }

    #[test]
    fn test_util_is_recorded_on_candidate() {
        let sustat = FilesystemSummary {
            blocks_per_segment: 100,
            nongc_ctime: 2_000_000,
        };
        let probe = SimulatedLivenessProbe;
        let oracle = FixedCheckpointOracle(ProtectionCheckpoint(0));
        let policy = CostBenefitPolicy::new();
        let c = match policy.evaluate(&ctx(&sustat, &probe, &oracle), &usage(0, 25), 0) {
            Eligibility::Eligible(c) => c,
            _ => panic!("expected eligible"),
        };
        assert_eq!(c.util, Some(0.25));
    }

    #[test]
    fn test_not_reclaimable_excludes_segment_even_when_probe_reports_dirty() {
        let sustat = FilesystemSummary {
            blocks_per_segment: 100,
            nongc_ctime: 2_000_000,
        };
        let probe = AlwaysDirtyLivenessProbe;
        let oracle = FixedCheckpointOracle(ProtectionCheckpoint(0));
        let policy = CostBenefitPolicy::new();
        let mut u = usage(0, 25);
        u.reclaimable = false;
        let eligibility = policy.evaluate(&ctx(&sustat, &probe, &oracle), &u, 0);
        assert!(matches!(
            eligibility,
            Eligibility::Ineligible(IneligibleReason::NotReclaimable)
        ));
    }
}
