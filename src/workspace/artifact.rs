use super::constants::{MAIN_CONFIG_DESCRIPTION, ZONE_DESCRIPTION};
use super::templates;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of an artifact, immutable once assigned
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(String);

impl ArtifactId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArtifactId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Kind of configuration file, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    /// Server directives file (`named.conf` and its includes)
    #[serde(rename = "named.conf")]
    MainConfig,
    /// Forward lookup zone data
    #[serde(rename = "forward.zone")]
    ForwardZone,
    /// Reverse lookup zone data
    #[serde(rename = "reverse.zone")]
    ReverseZone,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::MainConfig,
        ArtifactKind::ForwardZone,
        ArtifactKind::ReverseZone,
    ];

    pub fn wire_name(&self) -> &'static str {
        match self {
            ArtifactKind::MainConfig => "named.conf",
            ArtifactKind::ForwardZone => "forward.zone",
            ArtifactKind::ReverseZone => "reverse.zone",
        }
    }

    /// Human label used in prompts
    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::MainConfig => "main configuration",
            ArtifactKind::ForwardZone => "forward lookup zone",
            ArtifactKind::ReverseZone => "reverse lookup zone",
        }
    }

    /// Body a freshly created file of this kind starts with
    pub fn template(&self) -> &'static str {
        match self {
            ArtifactKind::MainConfig => templates::MAIN_CONFIG_TEMPLATE,
            ArtifactKind::ForwardZone => templates::FORWARD_ZONE_TEMPLATE,
            ArtifactKind::ReverseZone => templates::REVERSE_ZONE_TEMPLATE,
        }
    }

    pub fn default_description(&self) -> &'static str {
        match self {
            ArtifactKind::MainConfig => MAIN_CONFIG_DESCRIPTION,
            ArtifactKind::ForwardZone | ArtifactKind::ReverseZone => ZONE_DESCRIPTION,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// One editable configuration file tracked by the workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: ArtifactId,
    pub kind: ArtifactKind,
    pub name: String,
    pub content: String,
    pub description: String,
}

impl Artifact {
    pub fn new(
        id: ArtifactId,
        kind: ArtifactKind,
        name: impl Into<String>,
        content: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            content: content.into(),
            description: description.into(),
        }
    }

    /// Build an artifact seeded from its kind's template and default description
    pub fn from_template(id: ArtifactId, kind: ArtifactKind, name: impl Into<String>) -> Self {
        Self::new(
            id,
            kind,
            name,
            kind.template(),
            kind.default_description(),
        )
    }

    pub fn snapshot(&self) -> ArtifactSnapshot {
        ArtifactSnapshot {
            name: self.name.clone(),
            kind: self.kind,
            content: self.content.clone(),
        }
    }
}

/// The part of an artifact sent to the backend for whole-workspace lookups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSnapshot {
    pub name: String,
    pub kind: ArtifactKind,
    pub content: String,
}
