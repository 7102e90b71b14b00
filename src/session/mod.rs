//! Client-side state machines for requests to the analysis backend.
//!
//! A [`SessionSlot`] holds at most one session. Starting a new session
//! supersedes the old one outright; a reply is applied only if it carries the
//! id of the session that is current when it arrives. Nothing is ever sent to
//! the backend to cancel a superseded request.

pub mod analysis;
pub mod annotations;
pub mod lookup;

use serde::Serialize;
use tracing::debug;

pub use analysis::{
    AnalysisBinding, AnalysisKind, AnalysisOutcome, AnalysisReply, AnalysisRequest,
    AnalysisSession, AnalysisSlot,
};
pub use annotations::{annotations, issue_for_line};
pub use lookup::{LookupBinding, LookupReply, LookupRequest, LookupSession, LookupSlot};

/// Generation number of a session within its slot. Strictly increasing.
pub type SessionId = u64;

/// Externally visible status of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Pending,
    Completed,
    Failed,
}

/// State of a session that has been started
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SessionState<T> {
    Pending,
    Completed { result: T },
    /// The request never produced a reply at all
    Failed { reason: String },
}

/// One request, bound to the data it was started with
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session<B, T> {
    pub id: SessionId,
    pub binding: B,
    #[serde(flatten)]
    pub state: SessionState<T>,
}

impl<B, T> Session<B, T> {
    pub fn status(&self) -> SessionStatus {
        match self.state {
            SessionState::Pending => SessionStatus::Pending,
            SessionState::Completed { .. } => SessionStatus::Completed,
            SessionState::Failed { .. } => SessionStatus::Failed,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, SessionState::Pending)
    }

    /// Result, present only once completed
    pub fn result(&self) -> Option<&T> {
        match &self.state {
            SessionState::Completed { result } => Some(result),
            _ => None,
        }
    }
}

/// Holder of the single current session of one kind
#[derive(Debug, Clone)]
pub struct SessionSlot<B, T> {
    generation: SessionId,
    current: Option<Session<B, T>>,
}

impl<B, T> SessionSlot<B, T> {
    pub fn new() -> Self {
        Self {
            generation: 0,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&Session<B, T>> {
        self.current.as_ref()
    }

    pub fn status(&self) -> SessionStatus {
        self.current
            .as_ref()
            .map_or(SessionStatus::Idle, Session::status)
    }

    pub fn is_current(&self, id: SessionId) -> bool {
        self.current.as_ref().is_some_and(|s| s.id == id)
    }

    /// Start a new pending session, superseding whatever was there
    pub fn begin(&mut self, binding: B) -> SessionId {
        self.generation += 1;
        let id = self.generation;
        if let Some(previous) = &self.current {
            if previous.is_pending() {
                debug!("Session {} superseded by {} while pending", previous.id, id);
            }
        }
        self.current = Some(Session {
            id,
            binding,
            state: SessionState::Pending,
        });
        id
    }

    /// Complete the session `id` if it is still current and pending.
    /// Returns whether the result was applied.
    pub fn complete(&mut self, id: SessionId, result: T) -> bool {
        self.settle(id, SessionState::Completed { result })
    }

    /// Mark the session `id` failed if it is still current and pending
    pub fn fail(&mut self, id: SessionId, reason: impl Into<String>) -> bool {
        self.settle(
            id,
            SessionState::Failed {
                reason: reason.into(),
            },
        )
    }

    /// Drop the current session. Any reply still in flight becomes stale.
    /// Returns whether there was anything to drop.
    pub fn invalidate(&mut self) -> bool {
        self.current.take().is_some()
    }

    fn settle(&mut self, id: SessionId, state: SessionState<T>) -> bool {
        match &mut self.current {
            Some(session) if session.id == id && session.is_pending() => {
                session.state = state;
                true
            }
            _ => {
                debug!("Discarding stale reply for session {}", id);
                false
            }
        }
    }
}

impl<B, T> Default for SessionSlot<B, T> {
    fn default() -> Self {
        Self::new()
    }
}
