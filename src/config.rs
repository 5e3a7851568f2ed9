//! Configuration shared by loading and saving

use crate::schema::SchemaSet;
use chrono::{FixedOffset, Offset, Utc};
use std::sync::Arc;
use zip::CompressionMethod;

/// BCF versions understood out of the box
pub const DEFAULT_SUPPORTED_VERSIONS: &[&str] = &["2.0", "2.1"];

/// Configuration for reading and writing BCF containers
///
/// # Example
///
/// ```
/// use libbcf::BcfConfig;
///
/// let config = BcfConfig::new()
///     .with_validation(false)
///     .with_supported_version("3.0");
/// assert!(config.is_supported_version("3.0"));
/// ```
#[derive(Debug, Clone)]
pub struct BcfConfig {
    /// Schemas used to validate parts during load
    schemas: Arc<SchemaSet>,
    /// Values of `VersionId` that load without a diagnostic
    supported_versions: Vec<String>,
    /// Whether parts are validated before they are parsed
    validate: bool,
    /// Compression used for parts that did not exist in the source container
    compression: CompressionMethod,
    /// Offset assumed for timestamps written without one
    naive_offset: FixedOffset,
}

impl BcfConfig {
    /// Create the default configuration
    ///
    /// Built-in BCF 2.1 schemas, versions 2.0 and 2.1, validation enabled,
    /// deflate compression and UTC for timestamps without an offset.
    pub fn new() -> Self {
        Self {
            schemas: Arc::new(SchemaSet::bcf_2_1()),
            supported_versions: DEFAULT_SUPPORTED_VERSIONS
                .iter()
                .map(|v| v.to_string())
                .collect(),
            validate: true,
            compression: CompressionMethod::Deflated,
            naive_offset: Utc.fix(),
        }
    }

    /// Replace the schema set used for validation
    pub fn with_schema_set(mut self, schemas: SchemaSet) -> Self {
        self.schemas = Arc::new(schemas);
        self
    }

    /// Accept an additional `VersionId`
    pub fn with_supported_version(mut self, version: &str) -> Self {
        if !self.is_supported_version(version) {
            self.supported_versions.push(version.to_string());
        }
        self
    }

    /// Enable or disable schema validation during load
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Compression method for newly created parts
    ///
    /// Parts that already exist in the source container keep their own
    /// method, even when regenerated.
    pub fn with_compression(mut self, compression: CompressionMethod) -> Self {
        self.compression = compression;
        self
    }

    /// Offset applied to timestamps that carry no timezone
    pub fn with_naive_offset(mut self, offset: FixedOffset) -> Self {
        self.naive_offset = offset;
        self
    }

    /// The schema set used for validation
    pub fn schemas(&self) -> &SchemaSet {
        &self.schemas
    }

    /// Check whether a `VersionId` is supported
    pub fn is_supported_version(&self, version: &str) -> bool {
        self.supported_versions.iter().any(|v| v == version)
    }

    /// Supported version identifiers
    pub fn supported_versions(&self) -> &[String] {
        &self.supported_versions
    }

    /// Whether validation is enabled
    pub fn validation_enabled(&self) -> bool {
        self.validate
    }

    /// Compression method for new parts
    pub fn compression(&self) -> CompressionMethod {
        self.compression
    }

    /// Offset for timestamps without timezone
    pub fn naive_offset(&self) -> FixedOffset {
        self.naive_offset
    }
}

impl Default for BcfConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BcfConfig::new();
        assert!(config.is_supported_version("2.1"));
        assert!(config.is_supported_version("2.0"));
        assert!(!config.is_supported_version("3.0"));
        assert!(config.validation_enabled());
        assert_eq!(config.compression(), CompressionMethod::Deflated);
        assert_eq!(config.naive_offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_builder() {
        let offset = FixedOffset::east_opt(3600).unwrap();
        let config = BcfConfig::new()
            .with_supported_version("3.0")
            .with_supported_version("3.0")
            .with_validation(false)
            .with_compression(CompressionMethod::Stored)
            .with_naive_offset(offset);
        assert_eq!(config.supported_versions().len(), 3);
        assert!(!config.validation_enabled());
        assert_eq!(config.compression(), CompressionMethod::Stored);
        assert_eq!(config.naive_offset(), offset);
    }
}
