use crate::error::{SessionError, WorkspaceError};
use crate::gateway::{AnalysisGateway, ValidationIssue};
use crate::locale::Locale;
use crate::session::{
    AnalysisKind, AnalysisReply, AnalysisRequest, AnalysisSession, AnalysisSlot, LookupReply,
    LookupRequest, LookupSession, LookupSlot, SessionId, annotations,
};
use crate::workspace::{Artifact, ArtifactId, ArtifactKind, WorkspaceStore};
use serde::Serialize;
use tracing::{debug, info};

/// Single owner of the workspace, both session slots and the locale.
///
/// Workspace mutations that change which file is in focus (select, create,
/// delete) discard the analysis session, since its result is bound to the
/// previous file. Content edits and renames leave sessions alone. The lookup
/// session is never touched by workspace mutations.
#[derive(Debug, Clone)]
pub struct Studio {
    store: WorkspaceStore,
    analysis: AnalysisSlot,
    lookup: LookupSlot,
    locale: Locale,
}

/// Serializable snapshot of everything a UI needs to render
#[derive(Debug, Clone, Serialize)]
pub struct StudioView {
    pub artifacts: Vec<Artifact>,
    pub active: Option<ArtifactId>,
    pub locale: Locale,
    pub analysis: Option<AnalysisSession>,
    pub lookup: Option<LookupSession>,
}

impl Studio {
    pub fn new(store: WorkspaceStore, locale: Locale) -> Self {
        Self {
            store,
            analysis: AnalysisSlot::new(),
            lookup: LookupSlot::new(),
            locale,
        }
    }

    pub fn store(&self) -> &WorkspaceStore {
        &self.store
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Change the response language. Sessions already started keep the
    /// locale they were dispatched with.
    pub fn set_locale(&mut self, locale: Locale) {
        if self.locale != locale {
            info!("Locale changed from {} to {}", self.locale, locale);
            self.locale = locale;
        }
    }

    pub fn list_artifacts(&self) -> &[Artifact] {
        self.store.list_artifacts()
    }

    pub fn active_artifact(&self) -> Option<&Artifact> {
        self.store.get_active()
    }

    /// Select a file. Unknown ids are ignored. Returns whether the selection
    /// changed.
    ///
    /// Re-selecting the file that is already active is deliberately a no-op
    /// and keeps its analysis session, so a finished validation survives a
    /// redundant click.
    pub fn select_artifact(&mut self, id: &ArtifactId) -> bool {
        let changed = self.store.set_active(id);
        if changed {
            self.invalidate_analysis();
        }
        changed
    }

    pub fn create_artifact(
        &mut self,
        name: &str,
        kind: ArtifactKind,
    ) -> Result<ArtifactId, WorkspaceError> {
        let id = self.store.create_artifact(name, kind)?;
        self.invalidate_analysis();
        Ok(id)
    }

    pub fn delete_artifact(&mut self, id: &ArtifactId) -> Result<(), WorkspaceError> {
        self.store.delete_artifact(id)?;
        self.invalidate_analysis();
        Ok(())
    }

    /// Edit a file's body. A pending analysis keeps its bound snapshot.
    pub fn update_content(
        &mut self,
        id: &ArtifactId,
        content: impl Into<String>,
    ) -> Result<(), WorkspaceError> {
        self.store.update_content(id, content)
    }

    pub fn rename_artifact(&mut self, id: &ArtifactId, name: &str) -> Result<(), WorkspaceError> {
        self.store.rename_artifact(id, name)
    }

    /// Start validating the active file
    pub fn start_validation(&mut self) -> Result<AnalysisRequest, SessionError> {
        self.start_analysis(AnalysisKind::Validation)
    }

    /// Start explaining the active file
    pub fn start_explanation(&mut self) -> Result<AnalysisRequest, SessionError> {
        self.start_analysis(AnalysisKind::Explanation)
    }

    pub fn start_analysis(&mut self, kind: AnalysisKind) -> Result<AnalysisRequest, SessionError> {
        let artifact = self
            .store
            .get_active()
            .ok_or(SessionError::NoActiveArtifact)?;
        let request = self.analysis.start(kind, artifact, self.locale);
        debug!(
            "Started {:?} session {} for {}",
            kind, request.session, request.binding.artifact_id
        );
        Ok(request)
    }

    /// Apply an analysis reply if it still belongs to the current session
    pub fn apply_analysis(&mut self, reply: AnalysisReply) -> bool {
        self.analysis.apply(reply)
    }

    /// Mark an analysis session failed if it is still current
    pub fn fail_analysis(&mut self, session: SessionId, reason: &str) -> bool {
        self.analysis.fail(session, reason)
    }

    /// Whether `session` is still the analysis session replies may settle.
    /// A reply for a current session can still be rejected, for example when
    /// its outcome kind does not match.
    pub fn is_current_analysis(&self, session: SessionId) -> bool {
        self.analysis.is_current(session)
    }

    pub fn analysis_session(&self) -> Option<&AnalysisSession> {
        self.analysis.current()
    }

    /// Start a simulated lookup against every file in the workspace
    pub fn start_lookup(&mut self, args: &str) -> Result<LookupRequest, SessionError> {
        let request = self
            .lookup
            .start(args, self.store.snapshot(), self.locale)?;
        debug!(
            "Started lookup session {} for `{}` over {} files",
            request.session,
            request.query,
            request.artifacts.len()
        );
        Ok(request)
    }

    pub fn apply_lookup(&mut self, reply: LookupReply) -> bool {
        self.lookup.apply(reply)
    }

    pub fn fail_lookup(&mut self, session: SessionId, reason: &str) -> bool {
        self.lookup.fail(session, reason)
    }

    pub fn is_current_lookup(&self, session: SessionId) -> bool {
        self.lookup.is_current(session)
    }

    pub fn lookup_session(&self) -> Option<&LookupSession> {
        self.lookup.current()
    }

    /// Line markers for the active file
    pub fn annotations(&self) -> &[ValidationIssue] {
        annotations(self.store.active_id(), self.analysis.current())
    }

    /// Run an analysis of the active file to completion.
    ///
    /// Holds the studio for the whole round-trip; callers that must keep
    /// mutating while a request is in flight split this into
    /// [`Studio::start_analysis`], [`AnalysisRequest::dispatch`] and
    /// [`Studio::apply_analysis`] instead, as the engine does.
    pub async fn analyze(
        &mut self,
        kind: AnalysisKind,
        gateway: &dyn AnalysisGateway,
    ) -> Result<SessionId, SessionError> {
        let request = self.start_analysis(kind)?;
        let session = request.session;
        let reply = request.dispatch(gateway).await;
        self.apply_analysis(reply);
        Ok(session)
    }

    /// Run a lookup to completion; see [`Studio::analyze`]
    pub async fn lookup(
        &mut self,
        args: &str,
        gateway: &dyn AnalysisGateway,
    ) -> Result<SessionId, SessionError> {
        let request = self.start_lookup(args)?;
        let session = request.session;
        let reply = request.dispatch(gateway).await;
        self.apply_lookup(reply);
        Ok(session)
    }

    pub fn view(&self) -> StudioView {
        StudioView {
            artifacts: self.store.list_artifacts().to_vec(),
            active: self.store.active_id().cloned(),
            locale: self.locale,
            analysis: self.analysis.current().cloned(),
            lookup: self.lookup.current().cloned(),
        }
    }

    fn invalidate_analysis(&mut self) {
        if self.analysis.invalidate() {
            debug!("Analysis session discarded after workspace change");
        }
    }
}

impl Default for Studio {
    fn default() -> Self {
        Self::new(WorkspaceStore::seeded(), Locale::default())
    }
}
