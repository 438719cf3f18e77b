//! Explicit claim handles.

use crate::error::Result;
use crate::identity::Identity;
use crate::status::validate_pair;

/// Proof of a successful claim, passed back to [`update_status`].
///
/// Each in-flight claim has its own session, so one process can work on many
/// pairs at once, from any number of threads.
///
/// [`update_status`]: super::Coordinator::update_status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSession {
    item: String,
    task: String,
    identity: Identity,
}

impl ClaimSession {
    pub(super) fn new(item: &str, task: &str, identity: Identity) -> Self {
        Self {
            item: item.to_string(),
            task: task.to_string(),
            identity,
        }
    }

    /// Session for a pair claimed earlier, possibly by another process.
    ///
    /// Used when the claim and its updates run in different processes. Updates
    /// made through it carry the current process's host and pid.
    pub fn resume(item: &str, task: &str) -> Result<Self> {
        validate_pair(item, task)?;
        Ok(Self::new(item, task, Identity::current()))
    }

    /// Claimed item identifier.
    pub fn item(&self) -> &str {
        &self.item
    }

    /// Claimed task identifier.
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Host recorded in this session's status records.
    pub fn host(&self) -> &str {
        &self.identity.host
    }

    /// Process id recorded in this session's status records.
    pub fn pid(&self) -> u32 {
        self.identity.pid
    }
}

/// Result of a claim attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// This caller created the status file and owns the pair.
    Claimed(ClaimSession),
    /// The status file already existed; someone else claimed the pair.
    AlreadyClaimed,
}

impl ClaimOutcome {
    /// Whether this caller won the claim.
    pub fn is_claimed(&self) -> bool {
        matches!(self, ClaimOutcome::Claimed(_))
    }

    /// The session, if the claim was won.
    pub fn session(&self) -> Option<&ClaimSession> {
        match self {
            ClaimOutcome::Claimed(session) => Some(session),
            ClaimOutcome::AlreadyClaimed => None,
        }
    }

    /// Take the session, if the claim was won.
    pub fn into_session(self) -> Option<ClaimSession> {
        match self {
            ClaimOutcome::Claimed(session) => Some(session),
            ClaimOutcome::AlreadyClaimed => None,
        }
    }
}
