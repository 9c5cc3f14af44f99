use std::cmp::Ordering;

use crate::candidate::{Candidate, Eligibility, IneligibleReason};
use crate::liveness::SegmentUsage;
use crate::policy::{segnum_tiebreak, time_protected, EvalContext, Policy};
use crate::SegNum;

/// Pick the oldest-modified segments first, using a cutoff derived from
/// the last non-cleaner write time. Does not consult the
/// liveness probe: eligibility here is purely a function of `lastmod`
/// versus `nongc_ctime` and the protection window.
#[derive(Debug, Default)]
pub struct TimestampPolicy;

impl TimestampPolicy {
    pub fn new() -> Self {
        TimestampPolicy
    }
}

impl Policy for TimestampPolicy {
    fn name(&self) -> &str {
        "timestamp"
    }

    fn evaluate(&self, ctx: &EvalContext<'_>, usage: &SegmentUsage, segnum: SegNum) -> Eligibility {
        let thr = ctx.sustat.nongc_ctime;
        let imp = if usage.lastmod <= ctx.now {
            usage.lastmod
        } else {
            thr - 1
        };

        if imp >= thr {
            return Eligibility::Ineligible(IneligibleReason::WrittenAfterNongcCtime);
        }

        if time_protected(usage, ctx.now, ctx.prottime) {
            return Eligibility::Ineligible(IneligibleReason::TimeProtected);
        }

        Eligibility::Eligible(Candidate::new(segnum, -(imp as f64)))
    }

    fn compare(&self, a: &Candidate, b: &Candidate) -> Ordering {
        // score = -imp; the oldest segment (smallest imp, least negative
        // score) must win, so rank descending by score. Consistent with
        // the other three built-in policies (see DESIGN.md for the
        // reasoning behind picking this direction).
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| segnum_tiebreak(a, b))
    }
}
