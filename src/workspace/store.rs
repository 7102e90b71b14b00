use super::constants::CREATED_ID_PREFIX;
use super::templates::initial_artifacts;
use super::{Artifact, ArtifactId, ArtifactKind, ArtifactSnapshot};
use crate::error::WorkspaceError;
use tracing::{debug, info};

type Result<T> = std::result::Result<T, WorkspaceError>;

/// Ordered set of configuration files plus the active selection.
///
/// The store never removes its last artifact and keeps exactly one artifact
/// active whenever it is non-empty. An empty store only exists when it was
/// constructed empty; see [`WorkspaceStore::empty`].
///
/// Session invalidation on selection changes is the owner's job
/// ([`crate::studio::Studio`]); the store itself knows nothing about sessions.
#[derive(Debug, Clone)]
pub struct WorkspaceStore {
    /// Artifacts in insertion order
    artifacts: Vec<Artifact>,
    active: Option<ArtifactId>,
    /// Counter for created ids; never rewinds, so deleted ids are not reused
    next_id: u64,
}

impl WorkspaceStore {
    /// Store pre-populated with the default main config and zone files
    pub fn seeded() -> Self {
        Self::with_artifacts(initial_artifacts())
    }

    /// Store in the explicit empty state
    pub fn empty() -> Self {
        Self::with_artifacts(Vec::new())
    }

    /// Store over the given artifacts; the first one becomes active
    pub fn with_artifacts(artifacts: Vec<Artifact>) -> Self {
        let active = artifacts.first().map(|a| a.id.clone());
        Self {
            artifacts,
            active,
            next_id: 1,
        }
    }

    /// All artifacts in insertion order
    pub fn list_artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn get(&self, id: &ArtifactId) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| &a.id == id)
    }

    pub fn contains(&self, id: &ArtifactId) -> bool {
        self.get(id).is_some()
    }

    pub fn get_active(&self) -> Option<&Artifact> {
        self.active.as_ref().and_then(|id| self.get(id))
    }

    pub fn active_id(&self) -> Option<&ArtifactId> {
        self.active.as_ref()
    }

    /// Switch the active selection.
    ///
    /// Returns `true` only when the selection actually changed. Unknown ids
    /// and re-selecting the active artifact are no-ops.
    pub fn set_active(&mut self, id: &ArtifactId) -> bool {
        if !self.contains(id) {
            debug!("Ignoring selection of unknown file {}", id);
            return false;
        }
        if self.active.as_ref() == Some(id) {
            return false;
        }

        debug!("Active file changed to {}", id);
        self.active = Some(id.clone());
        true
    }

    /// Append a new artifact seeded from its kind's template and make it active
    pub fn create_artifact(&mut self, name: &str, kind: ArtifactKind) -> Result<ArtifactId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WorkspaceError::EmptyName);
        }

        let id = self.allocate_id();
        info!("Creating {} file {} ({})", kind, name, id);

        self.artifacts
            .push(Artifact::from_template(id.clone(), kind, name));
        self.active = Some(id.clone());
        Ok(id)
    }

    /// Remove an artifact, refusing to remove the last one.
    ///
    /// When the removed artifact was active, the first survivor by insertion
    /// order becomes active.
    pub fn delete_artifact(&mut self, id: &ArtifactId) -> Result<Artifact> {
        let index = self
            .artifacts
            .iter()
            .position(|a| &a.id == id)
            .ok_or_else(|| WorkspaceError::ArtifactNotFound(id.clone()))?;

        if self.artifacts.len() <= 1 {
            return Err(WorkspaceError::LastArtifact);
        }

        let removed = self.artifacts.remove(index);
        info!("Deleted file {} ({})", removed.name, removed.id);

        if self.active.as_ref() == Some(id) {
            self.active = self.artifacts.first().map(|a| a.id.clone());
            debug!("Active file reassigned to {:?}", self.active);
        }

        Ok(removed)
    }

    /// Replace an artifact's body in place
    pub fn update_content(&mut self, id: &ArtifactId, content: impl Into<String>) -> Result<()> {
        let artifact = self.get_mut(id)?;
        artifact.content = content.into();
        Ok(())
    }

    /// Change an artifact's display name; the id stays the same
    pub fn rename_artifact(&mut self, id: &ArtifactId, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WorkspaceError::EmptyName);
        }

        let artifact = self.get_mut(id)?;
        debug!("Renaming {} from {} to {}", id, artifact.name, name);
        artifact.name = name.to_string();
        Ok(())
    }

    /// Name, kind and content of every artifact, in insertion order
    pub fn snapshot(&self) -> Vec<ArtifactSnapshot> {
        self.artifacts.iter().map(Artifact::snapshot).collect()
    }

    fn get_mut(&mut self, id: &ArtifactId) -> Result<&mut Artifact> {
        self.artifacts
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| WorkspaceError::ArtifactNotFound(id.clone()))
    }

    fn allocate_id(&mut self) -> ArtifactId {
        loop {
            let id = ArtifactId::new(format!("{}{}", CREATED_ID_PREFIX, self.next_id));
            self.next_id += 1;
            // Seeded stores may already hold ids shaped like ours
            if !self.contains(&id) {
                return id;
            }
        }
    }
}

impl Default for WorkspaceStore {
    fn default() -> Self {
        Self::seeded()
    }
}
