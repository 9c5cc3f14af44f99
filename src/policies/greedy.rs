use std::cmp::Ordering;

use crate::candidate::{Candidate, Eligibility, IneligibleReason};
use crate::error::CleanerError;
use crate::liveness::{LivenessOutcome, SegmentUsage};
use crate::policy::{segnum_tiebreak, time_protected, EvalContext, Policy};
use crate::SegNum;

/// Utilization above which a segment is too full to be worth cleaning:
/// the move cost of relocating live blocks outweighs the space
/// reclaimed.
pub const UTILIZATION_CAP: f64 = 0.60;

/// Pick segments with the most reclaimable blocks first, subject to the
/// utilization cap. Resolves three divergent source variants by taking
/// their union: uses the liveness probe AND enforces the cap.
#[derive(Debug, Default)]
pub struct GreedyPolicy;

impl GreedyPolicy {
    pub fn new() -> Self {
        GreedyPolicy
    }
}

impl Policy for GreedyPolicy {
    fn name(&self) -> &str {
        "greedy"
    }

    fn evaluate(&self, ctx: &EvalContext<'_>, usage: &SegmentUsage, segnum: SegNum) -> Eligibility {
        let checkpoint = match ctx.checkpoint_oracle.protection_checkpoint() {
            Ok(cp) => cp,
            Err(source) => {
                log::error!("greedy: {}", CleanerError::CheckpointLookup { segnum, source });
                return Eligibility::Ineligible(IneligibleReason::ProbeError);
            }
        };

        let live_blocks = match ctx.probe.probe(usage, segnum, checkpoint) {
            LivenessOutcome::Clean => return Eligibility::Ineligible(IneligibleReason::Clean),
            LivenessOutcome::Error(e) => {
                log::warn!("greedy: transient read failure on segment {}: {}", segnum, e);
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
        let util = live_blocks as f64 / blocks_per_segment as f64;
        if util > UTILIZATION_CAP {
            return Eligibility::Ineligible(IneligibleReason::UtilizationCap);
        }

        let score = (blocks_per_segment - live_blocks) as f64;
        Eligibility::Eligible(Candidate::new(segnum, score).with_util(util))
    }

    fn compare(&self, a: &Candidate, b: &Candidate) -> Ordering {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| segnum_tiebreak(a, b))
    }
}
