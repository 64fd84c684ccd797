//! Per-user conversation state.
//!
//! Tracks whether a user is idle, has asked to submit a link, or has a job in
//! flight. `try_admit`/`release` are atomic per user via the map lock; this is
//! the only inter-job ordering guarantee in the system (one Busy session per
//! user, jobs of different users unordered).

use std::collections::HashMap;
use std::sync::RwLock;

/// Chat user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user's position in the submit/await/process flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// User signaled intent to submit a link (e.g. pressed "download").
    /// May stay here indefinitely; no timeout.
    AwaitingLink,
    /// A job is in flight for this user.
    Busy,
}

/// Shared registry of user -> phase.
#[derive(Debug, Default)]
pub struct SessionMap {
    users: RwLock<HashMap<UserId, Phase>>,
}

impl SessionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase; users we have never seen are Idle.
    pub fn phase(&self, user: UserId) -> Phase {
        self.users
            .read()
            .unwrap()
            .get(&user)
            .copied()
            .unwrap_or_default()
    }

    /// Idle -> AwaitingLink. Idempotent when already awaiting; a Busy user is
    /// left Busy (the in-flight job still owns the session).
    pub fn begin_intent(&self, user: UserId) {
        let mut users = self.users.write().unwrap();
        let phase = users.entry(user).or_default();
        if *phase != Phase::Busy {
            *phase = Phase::AwaitingLink;
        }
    }

    /// Move to Busy and return true unless the user is already Busy.
    /// The caller must reject the submission with a "still processing"
    /// message on false, not silently drop it.
    pub fn try_admit(&self, user: UserId) -> bool {
        let mut users = self.users.write().unwrap();
        let phase = users.entry(user).or_default();
        if *phase == Phase::Busy {
            return false;
        }
        *phase = Phase::Busy;
        true
    }

    /// Busy -> Idle, unconditionally. Called on every job exit path.
    pub fn release(&self, user: UserId) {
        self.users.write().unwrap().insert(user, Phase::Idle);
    }
}
