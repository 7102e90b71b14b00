use super::{Session, SessionId, SessionSlot};
use crate::gateway::{
    AnalysisGateway, EXPLANATION_FAILURE, GatewayOperation, ValidationResult,
};
use crate::locale::Locale;
use crate::workspace::{Artifact, ArtifactId};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Validation,
    Explanation,
}

impl AnalysisKind {
    pub fn operation(&self) -> GatewayOperation {
        match self {
            AnalysisKind::Validation => GatewayOperation::Validate,
            AnalysisKind::Explanation => GatewayOperation::Explain,
        }
    }
}

/// What an analysis session was started against. Captured at request time,
/// so later edits to the artifact do not leak into the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisBinding {
    pub kind: AnalysisKind,
    pub artifact_id: ArtifactId,
    pub artifact_name: String,
    pub content: String,
    pub locale: Locale,
}

/// Result slot of a completed analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum AnalysisOutcome {
    Validation(ValidationResult),
    Explanation(String),
}

impl AnalysisOutcome {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisOutcome::Validation(_) => AnalysisKind::Validation,
            AnalysisOutcome::Explanation(_) => AnalysisKind::Explanation,
        }
    }

    pub fn as_validation(&self) -> Option<&ValidationResult> {
        match self {
            AnalysisOutcome::Validation(result) => Some(result),
            AnalysisOutcome::Explanation(_) => None,
        }
    }

    pub fn as_explanation(&self) -> Option<&str> {
        match self {
            AnalysisOutcome::Explanation(text) => Some(text),
            AnalysisOutcome::Validation(_) => None,
        }
    }
}

pub type AnalysisSession = Session<AnalysisBinding, AnalysisOutcome>;
pub type AnalysisSlot = SessionSlot<AnalysisBinding, AnalysisOutcome>;

/// A dispatched analysis, detached from the studio so it can be awaited
/// without holding the studio borrowed
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub session: SessionId,
    pub binding: AnalysisBinding,
}

/// What came back for an [`AnalysisRequest`]
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReply {
    pub session: SessionId,
    pub outcome: AnalysisOutcome,
    /// The outcome was synthesized because the gateway call failed
    pub degraded: bool,
}

impl AnalysisBinding {
    pub fn new(kind: AnalysisKind, artifact: &Artifact, locale: Locale) -> Self {
        Self {
            kind,
            artifact_id: artifact.id.clone(),
            artifact_name: artifact.name.clone(),
            content: artifact.content.clone(),
            locale,
        }
    }
}

impl AnalysisRequest {
    /// Call the gateway. Failures are folded into a degraded outcome, so this
    /// always yields something the console can render.
    pub async fn dispatch(self, gateway: &dyn AnalysisGateway) -> AnalysisReply {
        let binding = &self.binding;
        let (outcome, degraded) = match binding.kind {
            AnalysisKind::Validation => match gateway
                .validate(&binding.content, &binding.artifact_name, binding.locale)
                .await
            {
                Ok(result) => (AnalysisOutcome::Validation(result), false),
                Err(e) => {
                    warn!(
                        "Validation of {} failed, returning degraded result: {}",
                        binding.artifact_name, e
                    );
                    (
                        AnalysisOutcome::Validation(ValidationResult::connection_failure()),
                        true,
                    )
                }
            },
            AnalysisKind::Explanation => match gateway
                .explain(&binding.content, &binding.artifact_name, binding.locale)
                .await
            {
                Ok(text) => (AnalysisOutcome::Explanation(text), false),
                Err(e) => {
                    warn!(
                        "Explanation of {} failed, returning fallback text: {}",
                        binding.artifact_name, e
                    );
                    (
                        AnalysisOutcome::Explanation(EXPLANATION_FAILURE.to_string()),
                        true,
                    )
                }
            },
        };

        AnalysisReply {
            session: self.session,
            outcome,
            degraded,
        }
    }
}

impl AnalysisSlot {
    /// Start a session for `kind` against the current state of `artifact`
    pub fn start(
        &mut self,
        kind: AnalysisKind,
        artifact: &Artifact,
        locale: Locale,
    ) -> AnalysisRequest {
        let binding = AnalysisBinding::new(kind, artifact, locale);
        let session = self.begin(binding.clone());
        AnalysisRequest { session, binding }
    }

    /// Apply a reply. Stale replies and replies whose outcome does not match
    /// the session kind are dropped.
    pub fn apply(&mut self, reply: AnalysisReply) -> bool {
        let kind_matches = self
            .current()
            .is_some_and(|s| s.id == reply.session && s.binding.kind == reply.outcome.kind());
        if self.is_current(reply.session) && !kind_matches {
            warn!(
                "Dropping {:?} outcome for session {} of a different kind",
                reply.outcome.kind(),
                reply.session
            );
            return false;
        }
        self.complete(reply.session, reply.outcome)
    }
}
