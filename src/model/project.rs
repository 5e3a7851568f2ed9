//! Project-level metadata

use super::Extensions;

/// BCF version written into new containers
pub const CURRENT_VERSION: &str = "2.1";

/// Contents of `bcf.version`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    /// The `VersionId` attribute, e.g. `"2.1"`
    pub version_id: String,
    /// Optional free-form `DetailedVersion`
    pub detailed_version: Option<String>,
    /// Unknown attributes and elements
    pub extensions: Extensions,
}

impl Version {
    /// The version written by this engine
    pub fn current() -> Self {
        Self {
            version_id: CURRENT_VERSION.to_string(),
            detailed_version: None,
            extensions: Extensions::new(),
        }
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::current()
    }
}

/// Contents of `project.bcfp`
///
/// At most one project exists per container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    /// External project identifier (`ProjectId`); not necessarily a GUID
    pub project_id: Option<String>,
    /// Human readable name
    pub name: Option<String>,
    /// Path of the extension schema inside the container
    pub extension_schema: Option<String>,
    /// Unknown content of `ProjectExtension`
    pub extensions: Extensions,
    /// Unknown content of the nested `Project` element
    pub project_extensions: Extensions,
}

impl Project {
    /// Create a project with a name and identifier
    pub fn new(project_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            project_id: Some(project_id.into()),
            name: Some(name.into()),
            ..Self::default()
        }
    }
}
