//! Console stand-in for the chat transport.
//!
//! Status messages become stdout lines; "delivering the video" means copying
//! the artifact into the requested output directory before the coordinator
//! deletes it from the store.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

use vgrab_core::session::UserId;
use vgrab_core::transport::{MessageId, Transport, TransportError};

pub struct ConsoleTransport {
    output_dir: PathBuf,
    next_id: AtomicI64,
}

impl ConsoleTransport {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Transport for ConsoleTransport {
    async fn send_text(&self, _user: UserId, text: &str) -> Result<MessageId, TransportError> {
        println!("{}", text);
        Ok(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    async fn edit_text(
        &self,
        _user: UserId,
        _message: MessageId,
        text: &str,
    ) -> Result<(), TransportError> {
        println!("{}", text);
        Ok(())
    }

    async fn delete_message(
        &self,
        _user: UserId,
        _message: MessageId,
    ) -> Result<(), TransportError> {
        // Printed lines cannot be unsent; nothing to do.
        Ok(())
    }

    async fn send_video(
        &self,
        _user: UserId,
        path: &Path,
        _caption: &str,
    ) -> Result<(), TransportError> {
        let name = path
            .file_name()
            .ok_or_else(|| TransportError(format!("artifact has no filename: {}", path.display())))?;
        let dest = self.output_dir.join(name);
        std::fs::copy(path, &dest)
            .map_err(|e| TransportError(format!("copy to {}: {}", dest.display(), e)))?;
        println!("saved {}", dest.display());
        Ok(())
    }
}
