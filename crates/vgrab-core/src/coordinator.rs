//! Job coordinator: one end-to-end attempt to turn a URL into a delivered file.
//!
//! Drives admission, extraction, validation and handoff, and maps every
//! failure to a single user-facing status. The core invariant lives here:
//! no exit path skips slot release, session release, or artifact deletion.

use anyhow::Result;
use std::time::SystemTime;
use uuid::Uuid;

use crate::config::VgrabConfig;
use crate::error::JobError;
use crate::gate::AdmissionGate;
use crate::messages;
use crate::platform::Platform;
use crate::runner::{ExtractionRunner, RunOutcome};
use crate::session::{SessionMap, UserId};
use crate::store::ArtifactStore;
use crate::transport::{best_effort, MessageId, Transport};

/// Opaque unique job token; also the artifact filename prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobId(Uuid);

impl JobId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One accepted download attempt. Never outlives the handling of one message.
#[derive(Debug)]
pub struct Job {
    pub id: JobId,
    pub owner: UserId,
    pub url: String,
    pub submitted_at: SystemTime,
}

impl Job {
    fn new(owner: UserId, url: &str) -> Self {
        Self {
            id: JobId::generate(),
            owner,
            url: url.to_string(),
            submitted_at: SystemTime::now(),
        }
    }
}

/// Ties the store, gate, sessions and runner together.
pub struct Coordinator {
    store: ArtifactStore,
    gate: AdmissionGate,
    sessions: SessionMap,
    runner: ExtractionRunner,
    max_artifact_bytes: u64,
    max_duration_secs: Option<u64>,
}

impl Coordinator {
    /// Build the coordinator from config; creates the artifact directory.
    pub fn new(cfg: &VgrabConfig) -> Result<Self> {
        let store = ArtifactStore::new(cfg.download_dir()?);
        store.ensure_dir()?;
        Ok(Self {
            store,
            gate: AdmissionGate::new(cfg.max_concurrent_jobs),
            sessions: SessionMap::new(),
            runner: ExtractionRunner::new(
                cfg.extractor_bin.clone(),
                cfg.merge_bin.clone(),
                cfg.job_timeout(),
                cfg.split_merge,
            ),
            max_artifact_bytes: cfg.max_artifact_bytes,
            max_duration_secs: cfg.max_duration_secs,
        })
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn sessions(&self) -> &SessionMap {
        &self.sessions
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    /// Handle one submitted link for one user, end to end. All reporting to
    /// the user happens through `transport` before this returns; the returned
    /// result restates the terminal outcome for callers that want it.
    pub async fn handle_link<T: Transport>(
        &self,
        user: UserId,
        text: &str,
        transport: &T,
    ) -> Result<(), JobError> {
        let url = text.trim();
        if !is_recognized_url(url) {
            best_effort(
                "reject invalid input",
                transport.send_text(user, messages::NOT_A_LINK).await.map(|_| ()),
            );
            return Err(JobError::InvalidInput);
        }

        // Session admission first: cheap, per-user, fails fast.
        if !self.sessions.try_admit(user) {
            best_effort(
                "still-processing notice",
                transport
                    .send_text(user, messages::STILL_PROCESSING)
                    .await
                    .map(|_| ()),
            );
            return Err(JobError::AlreadyBusy);
        }

        // From here the session is Busy; every path below must reach the
        // unconditional cleanup at the end of this function.
        let job = Job::new(user, url);
        tracing::info!("job {} accepted for user {}: {}", job.id, user, job.url);

        let status = match transport.send_text(user, messages::CHECKING).await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!("could not post status message: {}", e);
                None
            }
        };

        let result = self.run_admitted(&job, status, transport).await;

        // Unconditional cleanup: artifact (including partials), slot (dropped
        // inside run_admitted's scope), session.
        self.store.delete_prefix(&job.id.to_string());
        self.sessions.release(user);

        self.report(&job, status, &result, transport).await;
        result
    }

    /// Everything between admission and the terminal state. The admission
    /// slot is held exactly for the scope of this function.
    async fn run_admitted<T: Transport>(
        &self,
        job: &Job,
        status: Option<MessageId>,
        transport: &T,
    ) -> Result<(), JobError> {
        let profile = Platform::classify(&job.url).profile();

        // Optional duration pre-check, before a slot is consumed or any
        // download work starts. A failed probe is downgraded: the full
        // extraction will surface a real error if the URL is broken.
        if let Some(limit) = self.max_duration_secs {
            match self.runner.probe_duration(&job.url, &profile).await {
                Ok(Some(duration)) if duration > limit => {
                    return Err(JobError::DurationExceeded {
                        actual_secs: duration,
                        limit_secs: limit,
                    });
                }
                Ok(_) => {}
                Err(outcome) => {
                    tracing::warn!("job {}: duration probe inconclusive: {:?}", job.id, outcome);
                }
            }
        }

        let _slot = self.gate.acquire().await;
        self.edit_status(job.owner, status, messages::DOWNLOADING, transport)
            .await;
        tracing::debug!("job {} admitted, extraction starting", job.id);

        let outcome = self
            .runner
            .run(&self.store, &job.id.to_string(), &job.url, &profile)
            .await;

        let path = match outcome {
            RunOutcome::Success(path) => path,
            RunOutcome::ToolFailure { exit_code, detail } => {
                tracing::warn!("job {}: tool failure (exit {:?}): {}", job.id, exit_code, detail);
                return Err(JobError::ToolFailure { exit_code, detail });
            }
            RunOutcome::Timeout => {
                tracing::warn!("job {}: killed at {:?} deadline", job.id, self.runner.timeout());
                return Err(JobError::Timeout(self.runner.timeout()));
            }
            RunOutcome::LaunchError(e) => {
                tracing::error!("job {}: cannot launch extraction tool: {}", job.id, e);
                return Err(JobError::Launch(e));
            }
        };

        let size = self
            .store
            .size_bytes(&path)
            .map_err(|e| JobError::ToolFailure {
                exit_code: None,
                detail: format!("artifact unreadable: {}", e),
            })?;
        if size > self.max_artifact_bytes {
            // Deleted by the caller's unconditional cleanup; never handed off.
            return Err(JobError::ArtifactTooLarge {
                actual: size,
                limit: self.max_artifact_bytes,
            });
        }

        self.edit_status(job.owner, status, messages::SENDING, transport)
            .await;
        transport
            .send_video(job.owner, &path, messages::CAPTION)
            .await
            .map_err(|e| JobError::Transport(e.to_string()))?;

        tracing::info!("job {} delivered ({} bytes)", job.id, size);
        Ok(())
        // _slot drops here: admission released on every path above.
    }

    /// Exactly one human-readable status per terminal state. The status
    /// message is deleted on success (a fresh "done" follows) or rewritten
    /// with the failure text; both chat actions are best-effort.
    async fn report<T: Transport>(
        &self,
        job: &Job,
        status: Option<MessageId>,
        result: &Result<(), JobError>,
        transport: &T,
    ) {
        match result {
            Ok(()) => {
                if let Some(id) = status {
                    best_effort(
                        "delete status message",
                        transport.delete_message(job.owner, id).await,
                    );
                }
                best_effort(
                    "send done message",
                    transport
                        .send_text(job.owner, messages::DONE)
                        .await
                        .map(|_| ()),
                );
            }
            Err(e) => {
                let text = user_text(e);
                match status {
                    Some(id) => {
                        if transport.edit_text(job.owner, id, text).await.is_err() {
                            best_effort(
                                "send failure message",
                                transport.send_text(job.owner, text).await.map(|_| ()),
                            );
                        }
                    }
                    None => best_effort(
                        "send failure message",
                        transport.send_text(job.owner, text).await.map(|_| ()),
                    ),
                }
            }
        }
    }

    async fn edit_status<T: Transport>(
        &self,
        user: UserId,
        status: Option<MessageId>,
        text: &str,
        transport: &T,
    ) {
        if let Some(id) = status {
            best_effort("edit status message", transport.edit_text(user, id, text).await);
        }
    }
}

/// Syntactic URL check: recognized scheme and parseable. No network.
fn is_recognized_url(text: &str) -> bool {
    (text.starts_with("http://") || text.starts_with("https://"))
        && url::Url::parse(text).is_ok()
}

/// The one status line a terminal failure shows the user.
fn user_text(e: &JobError) -> &'static str {
    match e {
        JobError::InvalidInput => messages::NOT_A_LINK,
        JobError::AlreadyBusy => messages::STILL_PROCESSING,
        JobError::DurationExceeded { .. } => messages::TOO_LONG,
        JobError::ToolFailure { .. } | JobError::Launch(_) => messages::DOWNLOAD_FAILED,
        JobError::Timeout(_) => messages::TOOK_TOO_LONG,
        JobError::ArtifactTooLarge { .. } => messages::TOO_LARGE,
        JobError::Transport(_) => messages::SEND_FAILED,
    }
}
