//! Cleanup sweeper: recurring deletion of stale artifacts.
//!
//! The backstop against files orphaned by crashed jobs, size-rejected jobs,
//! or any path that exited without its own cleanup. Runs independently of
//! the job pipeline for the lifetime of the process.

use std::fs;
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::store::ArtifactStore;

/// Delete every file in `dir` whose mtime is older than `retention`.
/// Returns the number removed. One file's error never stops the sweep, and
/// sweeping a directory with nothing stale is a no-op (idempotent).
pub fn sweep_once(dir: &Path, retention: Duration) -> u32 {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!("sweep: cannot read {}: {}", dir.display(), e);
            return 0;
        }
    };

    let mut removed = 0u32;
    for entry in entries.flatten() {
        let path = entry.path();
        let age = entry
            .metadata()
            .and_then(|m| m.modified())
            .and_then(|t| {
                t.elapsed()
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
            });
        let age = match age {
            Ok(a) => a,
            Err(e) => {
                tracing::warn!("sweep: no mtime for {}: {}", path.display(), e);
                continue;
            }
        };
        if age <= retention {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!("sweep: removed stale artifact {}", path.display());
                removed += 1;
            }
            Err(e) => tracing::warn!("sweep: could not remove {}: {}", path.display(), e),
        }
    }
    removed
}

/// Spawn the sweeper task: one sweep every `interval`, forever. Started once
/// at process startup; never blocks and is never blocked by running jobs.
pub fn spawn(store: ArtifactStore, interval: Duration, retention: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The immediate first tick also catches leftovers from a prior run.
        loop {
            ticker.tick().await;
            let removed = sweep_once(store.dir(), retention);
            if removed > 0 {
                tracing::debug!("sweep removed {} file(s)", removed);
            }
        }
    })
}
