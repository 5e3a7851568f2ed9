//! Viewpoints and the summary of their definitions

use super::Extensions;
use crate::container::Blob;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Opaque key-value data, keys are dotted element paths
///
/// A perspective camera becomes entries such as `CameraViewPoint.X` or
/// `FieldOfView`. Values are kept as written.
pub type AttributeBag = BTreeMap<String, String>;

/// A viewpoint of a topic
///
/// The definition (`.bcfv`) and snapshot are opaque blobs. They are only
/// written again when the viewpoint is replaced through the graph API.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewpoint {
    /// Identifier, immutable once assigned
    pub guid: Uuid,
    /// Definition file name relative to the topic folder
    pub viewpoint_file: Option<String>,
    /// Snapshot file name relative to the topic folder
    pub snapshot_file: Option<String>,
    /// Sort index
    pub index: Option<i64>,
    /// Definition bytes
    pub definition: Option<Blob>,
    /// Snapshot image bytes
    pub snapshot: Option<Blob>,
    /// Read-only summary extracted from the definition
    pub visualization: Option<VisualizationInfo>,
    /// Unknown attributes and elements of the markup reference
    pub extensions: Extensions,
    pub(crate) dirty: bool,
}

impl Viewpoint {
    /// Create a viewpoint without files
    pub fn new(guid: Uuid) -> Self {
        Self {
            guid,
            viewpoint_file: None,
            snapshot_file: None,
            index: None,
            definition: None,
            snapshot: None,
            visualization: None,
            extensions: Extensions::new(),
            dirty: false,
        }
    }
}

/// A reference to an element of the linked model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentRef {
    /// IFC GUID of the element
    pub ifc_guid: Option<String>,
    /// Application that created the element
    pub originating_system: Option<String>,
    /// Identifier of the element in that application
    pub authoring_tool_id: Option<String>,
}

/// Visibility state of a viewpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visibility {
    /// Whether components are visible unless listed as exceptions
    pub default_visibility: bool,
    /// Components with the opposite visibility
    pub exceptions: Vec<ComponentRef>,
    /// Attributes of `ViewSetupHints`
    pub view_setup_hints: AttributeBag,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            default_visibility: true,
            exceptions: Vec::new(),
            view_setup_hints: AttributeBag::new(),
        }
    }
}

/// Components painted in one color
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorGroup {
    /// ARGB or RGB hex value as written
    pub color: String,
    /// The colored components
    pub components: Vec<ComponentRef>,
}

/// What a viewpoint definition shows
///
/// Cameras, lines and clipping planes are not interpreted; they are exposed
/// as [`AttributeBag`]s for lookup only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisualizationInfo {
    /// `Guid` attribute of the definition
    pub guid: Option<Uuid>,
    /// Selected components
    pub selection: Vec<ComponentRef>,
    /// Visibility state
    pub visibility: Visibility,
    /// Colored component groups
    pub coloring: Vec<ColorGroup>,
    /// Orthogonal camera parameters
    pub orthogonal_camera: Option<AttributeBag>,
    /// Perspective camera parameters
    pub perspective_camera: Option<AttributeBag>,
    /// One bag per `Line`
    pub lines: Vec<AttributeBag>,
    /// One bag per `ClippingPlane`
    pub clipping_planes: Vec<AttributeBag>,
    /// One bag per `Bitmap`
    pub bitmaps: Vec<AttributeBag>,
}
