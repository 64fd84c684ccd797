//! Shared test support: stub external tools and a recording chat transport.
//!
//! The extraction tool is stood in for by small shell scripts written into a
//! tempdir, so the orchestrator is exercised against real child processes
//! (spawn, exit codes, kill-on-timeout) without any network.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use vgrab_core::config::VgrabConfig;
use vgrab_core::session::UserId;
use vgrab_core::transport::{MessageId, Transport, TransportError};

/// Write an executable stub tool into `dir` and return its path.
pub fn write_stub(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Stub body that resolves the `-o` output template and creates an artifact
/// of `size` bytes, like a well-behaved extractor.
pub fn producing_stub_body(size: u64) -> String {
    format!(
        r#"out=""; prev=""
for a in "$@"; do
  [ "$prev" = "-o" ] && out="$a"
  prev="$a"
done
f=$(printf '%s' "$out" | sed 's/%(ext)s/mp4/')
head -c {size} /dev/zero > "$f""#
    )
}

/// Config pointing the orchestrator at a tempdir store and a stub tool.
pub fn test_config(downloads: &Path, extractor: &Path) -> VgrabConfig {
    VgrabConfig {
        download_dir: Some(downloads.to_path_buf()),
        extractor_bin: extractor.to_string_lossy().into_owned(),
        job_timeout_secs: 20,
        max_artifact_bytes: 1024,
        ..VgrabConfig::default()
    }
}

/// One outbound chat action as the transport saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Text(String),
    Edit(String),
    Delete,
    /// Artifact delivery; size captured at send time (the file is deleted
    /// right after handoff).
    Video { size: u64 },
}

/// Transport double that records every action. `fail_video` simulates a
/// broken must-succeed delivery.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub actions: Mutex<Vec<Action>>,
    pub fail_video: bool,
}

impl RecordingTransport {
    pub fn failing_video() -> Self {
        Self {
            fail_video: true,
            ..Self::default()
        }
    }

    pub fn actions(&self) -> Vec<Action> {
        self.actions.lock().unwrap().clone()
    }

    pub fn videos_sent(&self) -> usize {
        self.actions()
            .iter()
            .filter(|a| matches!(a, Action::Video { .. }))
            .count()
    }

    pub fn texts(&self) -> Vec<String> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                Action::Text(t) | Action::Edit(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    fn record(&self, action: Action) -> MessageId {
        let mut actions = self.actions.lock().unwrap();
        actions.push(action);
        actions.len() as MessageId
    }
}

impl Transport for RecordingTransport {
    async fn send_text(&self, _user: UserId, text: &str) -> Result<MessageId, TransportError> {
        Ok(self.record(Action::Text(text.to_string())))
    }

    async fn edit_text(
        &self,
        _user: UserId,
        _message: MessageId,
        text: &str,
    ) -> Result<(), TransportError> {
        self.record(Action::Edit(text.to_string()));
        Ok(())
    }

    async fn delete_message(
        &self,
        _user: UserId,
        _message: MessageId,
    ) -> Result<(), TransportError> {
        self.record(Action::Delete);
        Ok(())
    }

    async fn send_video(
        &self,
        _user: UserId,
        path: &Path,
        _caption: &str,
    ) -> Result<(), TransportError> {
        if self.fail_video {
            return Err(TransportError("simulated delivery failure".into()));
        }
        let size = std::fs::metadata(path)
            .map_err(|e| TransportError(format!("artifact vanished before send: {}", e)))?
            .len();
        self.record(Action::Video { size });
        Ok(())
    }
}
