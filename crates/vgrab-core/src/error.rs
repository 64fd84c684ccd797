//! Job failure taxonomy.
//!
//! Every job ends in exactly one of these (or success). They are caught at
//! the coordinator boundary and turned into a single user-facing status;
//! none of them may crash the process or affect another job.

use std::time::Duration;
use thiserror::Error;

/// Terminal failure of one download job.
#[derive(Debug, Error)]
pub enum JobError {
    /// Submitted text is not a recognized URL. No job is created.
    #[error("not a recognized link")]
    InvalidInput,

    /// A second submission arrived while the user's previous job was still in
    /// flight. Rejected with a "still processing" notice, never queued or
    /// silently dropped.
    #[error("a job is already in flight for this user")]
    AlreadyBusy,

    /// Media duration pre-check exceeded the configured ceiling, before any
    /// extraction work started. Distinct from `Timeout`.
    #[error("media is {actual_secs}s long, ceiling is {limit_secs}s")]
    DurationExceeded { actual_secs: u64, limit_secs: u64 },

    /// The external tool exited nonzero, or exited zero without producing the
    /// expected artifact. `detail` goes to the log, never to the user.
    #[error("extraction tool failed: {detail}")]
    ToolFailure { exit_code: Option<i32>, detail: String },

    /// The external tool was force-killed at the wall-clock deadline.
    #[error("extraction timed out after {0:?}")]
    Timeout(Duration),

    /// The artifact exceeded the configured size ceiling; it was deleted and
    /// never handed to the transport.
    #[error("artifact is {actual} bytes, ceiling is {limit}")]
    ArtifactTooLarge { actual: u64, limit: u64 },

    /// The external tool could not be launched at all.
    #[error("failed to launch extraction tool: {0}")]
    Launch(#[source] std::io::Error),

    /// Delivering the finished artifact to the chat transport failed. Only the
    /// must-succeed send is reported this way; best-effort chat actions are
    /// logged and swallowed.
    #[error("transport delivery failed: {0}")]
    Transport(String),
}
