use crate::SegNum;

/// Hot-cold segregation's per-candidate bookkeeping. Modeled as a
/// closed enum variant rather than an opaque owned pointer, so
/// ownership and drop are handled by `Candidate` itself rather than by
/// a separately-managed allocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HotColdMeta {
    pub is_hot: bool,
    pub live_blocks: u32,
    pub lastmod: i64,
}

/// Per-candidate auxiliary data. Only the hot-cold segregation policy
/// populates this today; other policies leave it `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CandidateMetadata {
    HotCold(HotColdMeta),
}

/// One evaluated segment. `score` is policy-specific: higher is better
/// by the convention of that policy's `compare`, which may negate the
/// natural quantity to encode "smaller wins" (timestamp policy).
///
/// Invariant: `score` is never NaN. A NaN score is a programming bug in
/// a policy's `evaluate`, not a runtime error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub segnum: SegNum,
    pub score: f64,
    /// Observed live-fraction, informational (greedy, cost-benefit).
    pub util: Option<f64>,
    pub metadata: Option<CandidateMetadata>,
}

impl Candidate {
    pub fn new(segnum: SegNum, score: f64) -> Self {
        debug_assert!(!score.is_nan(), "candidate score must not be NaN");
        Candidate {
            segnum,
            score,
            util: None,
            metadata: None,
        }
    }

    pub fn with_util(mut self, util: f64) -> Self {
        self.util = Some(util);
        self
    }

    pub fn with_metadata(mut self, metadata: CandidateMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Why a segment was excluded from a cycle. Drives both logging level
/// and metrics counters, which the liveness-probe outcome alone
/// can't distinguish from the common eligibility rules (time protection,
/// non-reclaimable flag, per-policy caps).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IneligibleReason {
    /// Liveness probe reported the segment clean.
    Clean,
    /// `lastmod` fell inside `[prottime, now]`.
    TimeProtected,
    /// Filesystem's `reclaimable` flag was false.
    NotReclaimable,
    /// Liveness probe failed (transient read or checkpoint lookup).
    ProbeError,
    /// Greedy policy's utilization cap rejected the segment.
    UtilizationCap,
    /// Timestamp policy's `imp >= nongc_ctime` rule rejected the segment.
    WrittenAfterNongcCtime,
}

/// Result of evaluating one segment against a policy.
pub enum Eligibility {
    Ineligible(IneligibleReason),
    Eligible(Candidate),
}
