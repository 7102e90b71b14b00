pub mod artifact;
pub mod store;
pub mod templates;

pub use artifact::{Artifact, ArtifactId, ArtifactKind, ArtifactSnapshot};
pub use store::WorkspaceStore;

/// Workspace constants
pub mod constants {
    /// Prefix for identifiers of user-created files
    pub const CREATED_ID_PREFIX: &str = "file-";

    /// Description given to new main configuration files
    pub const MAIN_CONFIG_DESCRIPTION: &str = "Configuration file";

    /// Description given to new zone files of either direction
    pub const ZONE_DESCRIPTION: &str = "Zone file";
}
