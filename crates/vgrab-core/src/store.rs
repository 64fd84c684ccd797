//! Artifact store: filesystem area for in-flight and completed output files.
//!
//! Files are keyed by job id prefix so concurrent jobs never collide.
//! Deletion is best-effort: a file that cannot be removed is logged and left
//! for the cleanup sweeper, never escalated into a job failure.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Placeholder the extraction tool substitutes with the real container
/// extension (yt-dlp output template syntax).
pub const EXT_TEMPLATE: &str = "%(ext)s";

/// Suffix the extraction tool gives in-progress downloads.
const PARTIAL_SUFFIX: &str = ".part";

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the store directory if missing. Call once at startup.
    pub fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Output path template scoped to one job, e.g. `<dir>/<id>.%(ext)s`.
    /// `tag` distinguishes the steps of a split download (`<id>.video.%(ext)s`).
    pub fn output_template(&self, job_id: &str, tag: Option<&str>) -> PathBuf {
        let name = match tag {
            Some(t) => format!("{}.{}.{}", job_id, t, EXT_TEMPLATE),
            None => format!("{}.{}", job_id, EXT_TEMPLATE),
        };
        self.dir.join(name)
    }

    /// Find the finished artifact for a job: filename prefix plus the
    /// expected container extension (case-insensitive). A tool that exits 0
    /// leaving only `<id>.mp4.part` did not produce an artifact. First match
    /// wins; job ids are unique so ties only occur with leftovers from a
    /// crashed prior run, in which case the result is non-deterministic and
    /// acceptable.
    pub fn locate(&self, prefix: &str, ext: &str) -> Option<PathBuf> {
        let suffix = format!(".{}", ext.to_ascii_lowercase());
        self.scan(prefix, |name| name.to_ascii_lowercase().ends_with(&suffix))
    }

    /// Find a downloaded stream leg by prefix. The container of a lone
    /// video/audio stream varies by source, so only in-progress partials are
    /// excluded here.
    pub fn locate_stream(&self, prefix: &str) -> Option<PathBuf> {
        self.scan(prefix, |name| !name.to_ascii_lowercase().ends_with(PARTIAL_SUFFIX))
    }

    fn scan(&self, prefix: &str, accept: impl Fn(&str) -> bool) -> Option<PathBuf> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("artifact scan failed in {}: {}", self.dir.display(), e);
                return None;
            }
        };
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(prefix) && accept(&name) {
                return Some(entry.path());
            }
        }
        None
    }

    pub fn size_bytes(&self, path: &Path) -> io::Result<u64> {
        Ok(fs::metadata(path)?.len())
    }

    /// Best-effort delete. Failure is logged and swallowed so it can never
    /// fail the user-visible outcome of a job that already succeeded; the
    /// sweeper reclaims anything left behind.
    pub fn delete(&self, path: &Path) {
        if let Err(e) = fs::remove_file(path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!("could not delete artifact {}: {}", path.display(), e);
            }
        }
    }

    /// Delete every file with the given job-id prefix, whatever the
    /// extension. Used by the coordinator's unconditional cleanup to also
    /// catch partial files left by a killed or failed extraction.
    pub fn delete_prefix(&self, prefix: &str) {
        while let Some(path) = self.scan(prefix, |_| true) {
            if fs::remove_file(&path).is_err() {
                // Avoid spinning on an undeletable file; the sweeper gets it.
                tracing::warn!("could not delete artifact {}", path.display());
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn output_template_is_scoped_to_job() {
        let store = ArtifactStore::new("/data");
        let t = store.output_template("abc123", None);
        assert_eq!(t, Path::new("/data/abc123.%(ext)s"));
        let v = store.output_template("abc123", Some("video"));
        assert_eq!(v, Path::new("/data/abc123.video.%(ext)s"));
    }

    #[test]
    fn locate_finds_by_prefix_and_extension() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        std::fs::write(dir.path().join("job-1.mp4"), b"x").unwrap();
        std::fs::write(dir.path().join("other.mp4"), b"x").unwrap();

        let found = store.locate("job-1", "mp4").unwrap();
        assert_eq!(found.file_name().unwrap(), "job-1.mp4");
        assert!(store.locate("job-2", "mp4").is_none());
    }

    #[test]
    fn locate_skips_partials_and_wrong_containers() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        std::fs::write(dir.path().join("j1.mp4.part"), b"x").unwrap();
        std::fs::write(dir.path().join("j1.webm"), b"x").unwrap();

        // Neither a partial nor another container counts as the artifact.
        assert!(store.locate("j1", "mp4").is_none());

        std::fs::write(dir.path().join("j1.MP4"), b"x").unwrap();
        let found = store.locate("j1", "mp4").unwrap();
        assert_eq!(found.file_name().unwrap(), "j1.MP4");
    }

    #[test]
    fn locate_stream_accepts_any_container_but_not_partials() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        std::fs::write(dir.path().join("j1.audio.m4a.part"), b"x").unwrap();
        assert!(store.locate_stream("j1.audio").is_none());

        std::fs::write(dir.path().join("j1.audio.m4a"), b"x").unwrap();
        let found = store.locate_stream("j1.audio").unwrap();
        assert_eq!(found.file_name().unwrap(), "j1.audio.m4a");
    }

    #[test]
    fn size_and_delete() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let p = dir.path().join("job-9.mp4");
        std::fs::write(&p, vec![0u8; 1234]).unwrap();

        assert_eq!(store.size_bytes(&p).unwrap(), 1234);
        store.delete(&p);
        assert!(!p.exists());
        // Deleting again is a no-op, not an error.
        store.delete(&p);
    }

    #[test]
    fn delete_prefix_removes_partials() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        std::fs::write(dir.path().join("j1.mp4"), b"x").unwrap();
        std::fs::write(dir.path().join("j1.mp4.part"), b"x").unwrap();
        std::fs::write(dir.path().join("j2.mp4"), b"x").unwrap();

        store.delete_prefix("j1");
        let left: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name())
            .collect();
        assert_eq!(left, vec!["j2.mp4"]);
    }
}
