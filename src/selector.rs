use crate::candidate::Eligibility;
use crate::error::CleanerError;
use crate::policy::{Policy, SelectContext, SelectionResult, SelectionStats};

/// Generic scan-evaluate-sort-truncate pipeline used by policies that
/// don't supply their own `select`. Implements the 8-step
/// algorithm exactly:
///
/// 1. Iterate every segment number `0..nsegments`.
/// 2. (Usage records are already resident in `ctx.suinfo`; nothing to
///    fetch or fail here — a real daemon's fetch step would skip on
///    error before reaching this point.)
/// 3. Invoke `evaluate`; discard ineligible results.
/// 4. Accumulate eligible candidates into a dynamic buffer.
/// 5. Sort in place using the policy's `compare`; best-first order.
/// 6. Truncate to `capacity`.
/// 7. (Per-candidate metadata is owned by `Candidate` and dropped with
///    the buffer; no manual release step is needed in Rust.)
/// 8. Return the count written, plus the oldest `lastmod` among
///    selected segments.
pub fn default_select<P: Policy + ?Sized>(
    policy: &P,
    ctx: &SelectContext<'_>,
) -> Result<SelectionResult, CleanerError> {
    let eval_ctx = ctx.eval_context();
    let mut candidates = Vec::new();
    let mut stats = SelectionStats::default();

    for (segnum, usage) in ctx.suinfo.iter().enumerate() {
        let segnum = segnum as u64;
        stats.evaluated += 1;
        match policy.evaluate(&eval_ctx, usage, segnum) {
            Eligibility::Eligible(candidate) => candidates.push(candidate),
            Eligibility::Ineligible(reason) => stats.record(reason),
        }
    }

    candidates.sort_by(|a, b| policy.compare(a, b));
    candidates.truncate(ctx.capacity);

    stats.selected = candidates.len();
    let oldest = candidates
        .iter()
        .filter_map(|c| ctx.suinfo.get(c.segnum as usize).map(|u| u.lastmod))
        .min();

    Ok(SelectionResult {
        segnums: candidates.into_iter().map(|c| c.segnum).collect(),
        oldest,
        stats,
    })
}
