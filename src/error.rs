use thiserror::Error;

/// Errors raised by the policy engine, matching the per-segment/fatal
/// split in the error handling design: transient per-segment failures
/// are absorbed by callers (logged and skipped), the rest abort a cycle
/// or daemon startup.
#[derive(Debug, Error)]
pub enum CleanerError {
    /// Liveness probe could not read a segment. Caller skips the
    /// segment and continues the cycle.
    #[error("transient read failure on segment {segnum}: {source}")]
    TransientRead {
        segnum: u64,
        #[source]
        source: anyhow::Error,
    },

    /// Liveness probe could not resolve the protection checkpoint.
    /// Caller skips the segment and continues the cycle.
    #[error("checkpoint lookup failure for segment {segnum}: {source}")]
    CheckpointLookup {
        segnum: u64,
        #[source]
        source: anyhow::Error,
    },

    /// Candidate accumulation ran out of memory. Aborts the cycle;
    /// already-accumulated candidate metadata must be dropped by the
    /// caller before propagating this.
    #[error("out of memory building candidate list")]
    OutOfMemory,

    /// A policy name was requested that isn't in the registry. Fatal at
    /// daemon start.
    #[error("unknown policy: {0}")]
    UnknownPolicy(String),

    /// A policy's `init` rejected its configuration. Fatal at daemon
    /// start.
    #[error("invalid policy init for {policy}: {reason}")]
    InvalidPolicyInit { policy: String, reason: String },
}
