//! Chat transport boundary.
//!
//! The transport (Telegram or otherwise) is an external collaborator; the
//! core only issues these outbound actions. `send_video` is the one
//! must-succeed action: its failure becomes the job's outcome. Everything
//! else is best-effort and downgraded to a log line via [`best_effort`].

use std::fmt;
use std::future::Future;
use std::path::Path;

use crate::session::UserId;

/// Identifier of a previously sent chat message, for edit/delete.
pub type MessageId = i64;

/// Failure of a single outbound chat action.
#[derive(Debug)]
pub struct TransportError(pub String);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for TransportError {}

/// Outbound chat actions the orchestrator issues.
///
/// Methods return explicitly `Send` futures so job tasks driving a generic
/// transport can be spawned onto the runtime.
pub trait Transport: Send + Sync {
    /// Send a plain text message; returns its id for later edit/delete.
    fn send_text(
        &self,
        user: UserId,
        text: &str,
    ) -> impl Future<Output = Result<MessageId, TransportError>> + Send;

    /// Replace the text of an earlier status message.
    fn edit_text(
        &self,
        user: UserId,
        message: MessageId,
        text: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Delete an earlier message.
    fn delete_message(
        &self,
        user: UserId,
        message: MessageId,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Deliver the finished artifact. Must-succeed: a failure here is the
    /// job's user-visible outcome.
    fn send_video(
        &self,
        user: UserId,
        path: &Path,
        caption: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// Downgrade a best-effort chat action: log the failure, never propagate.
pub fn best_effort(what: &str, result: Result<(), TransportError>) {
    if let Err(e) = result {
        tracing::warn!("best-effort chat action '{}' failed: {}", what, e);
    }
}
