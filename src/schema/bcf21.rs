//! Built-in BCF 2.1 schema declarations

use super::{ElementDecl, Schema, SchemaKind, ValueType};

pub(super) fn version() -> Schema {
    Schema {
        kind: SchemaKind::Version,
        root: ElementDecl::sequence(
            "Version",
            vec![ElementDecl::text("DetailedVersion", ValueType::String).optional()],
        )
        .with_required("VersionId", ValueType::String),
    }
}

pub(super) fn project() -> Schema {
    let project = ElementDecl::sequence(
        "Project",
        vec![ElementDecl::text("Name", ValueType::String).optional()],
    )
    .with_required("ProjectId", ValueType::String);

    Schema {
        kind: SchemaKind::Project,
        root: ElementDecl::sequence(
            "ProjectExtension",
            vec![
                project.optional(),
                ElementDecl::text("ExtensionSchema", ValueType::String).once(),
            ],
        ),
    }
}

pub(super) fn markup() -> Schema {
    let file = ElementDecl::sequence(
        "File",
        vec![
            ElementDecl::text("Filename", ValueType::String).optional(),
            ElementDecl::text("Date", ValueType::DateTime).optional(),
            ElementDecl::text("Reference", ValueType::String).optional(),
        ],
    )
    .with_optional("IfcProject", ValueType::String)
    .with_optional("IfcSpatialStructureElement", ValueType::String)
    .with_optional("isExternal", ValueType::Boolean);

    let header = ElementDecl::sequence("Header", vec![file.at_least_once()]);

    let bim_snippet = ElementDecl::sequence(
        "BimSnippet",
        vec![
            ElementDecl::text("Reference", ValueType::String).once(),
            ElementDecl::text("ReferenceSchema", ValueType::String).once(),
        ],
    )
    .with_required("SnippetType", ValueType::String)
    .with_optional("isExternal", ValueType::Boolean);

    let document_reference = ElementDecl::sequence(
        "DocumentReference",
        vec![
            ElementDecl::text("ReferencedDocument", ValueType::String).optional(),
            ElementDecl::text("Description", ValueType::String).optional(),
        ],
    )
    .with_optional("Guid", ValueType::Guid)
    .with_optional("isExternal", ValueType::Boolean);

    let topic = ElementDecl::sequence(
        "Topic",
        vec![
            ElementDecl::text("ReferenceLink", ValueType::String).many(),
            ElementDecl::text("Title", ValueType::String).once(),
            ElementDecl::text("Priority", ValueType::String).optional(),
            ElementDecl::text("Index", ValueType::Integer).optional(),
            ElementDecl::text("Labels", ValueType::String).many(),
            ElementDecl::text("CreationDate", ValueType::DateTime).once(),
            ElementDecl::text("CreationAuthor", ValueType::String).once(),
            ElementDecl::text("ModifiedDate", ValueType::DateTime).optional(),
            ElementDecl::text("ModifiedAuthor", ValueType::String).optional(),
            ElementDecl::text("DueDate", ValueType::DateTime).optional(),
            ElementDecl::text("AssignedTo", ValueType::String).optional(),
            ElementDecl::text("Stage", ValueType::String).optional(),
            ElementDecl::text("Description", ValueType::String).optional(),
            bim_snippet.optional(),
            document_reference.many(),
            ElementDecl::empty("RelatedTopic")
                .with_required("Guid", ValueType::Guid)
                .many(),
        ],
    )
    .with_required("Guid", ValueType::Guid)
    .with_optional("TopicType", ValueType::String)
    .with_optional("TopicStatus", ValueType::String);

    // ReplyToComment is BCF 2.0; accepted on read, written only to 2.0 containers
    let comment = ElementDecl::sequence(
        "Comment",
        vec![
            ElementDecl::text("Date", ValueType::DateTime).once(),
            ElementDecl::text("Author", ValueType::String).once(),
            ElementDecl::text("Comment", ValueType::String).once(),
            ElementDecl::empty("Viewpoint")
                .with_required("Guid", ValueType::Guid)
                .optional(),
            ElementDecl::empty("ReplyToComment")
                .with_required("Guid", ValueType::Guid)
                .optional(),
            ElementDecl::text("ModifiedDate", ValueType::DateTime).optional(),
            ElementDecl::text("ModifiedAuthor", ValueType::String).optional(),
        ],
    )
    .with_required("Guid", ValueType::Guid);

    let viewpoint = ElementDecl::sequence(
        "Viewpoints",
        vec![
            ElementDecl::text("Viewpoint", ValueType::String).optional(),
            ElementDecl::text("Snapshot", ValueType::String).optional(),
            ElementDecl::text("Index", ValueType::Integer).optional(),
        ],
    )
    .with_required("Guid", ValueType::Guid);

    Schema {
        kind: SchemaKind::Markup,
        root: ElementDecl::sequence(
            "Markup",
            vec![
                header.optional(),
                topic.once(),
                comment.many(),
                viewpoint.many(),
            ],
        ),
    }
}

fn component() -> ElementDecl {
    ElementDecl::sequence(
        "Component",
        vec![
            ElementDecl::text("OriginatingSystem", ValueType::String).optional(),
            ElementDecl::text("AuthoringToolId", ValueType::String).optional(),
        ],
    )
    .with_optional("IfcGuid", ValueType::String)
}

pub(super) fn visualization_info() -> Schema {
    let view_setup_hints = ElementDecl::empty("ViewSetupHints")
        .with_optional("SpacesVisible", ValueType::Boolean)
        .with_optional("SpaceBoundariesVisible", ValueType::Boolean)
        .with_optional("OpeningsVisible", ValueType::Boolean);

    let visibility = ElementDecl::sequence(
        "Visibility",
        vec![ElementDecl::sequence("Exceptions", vec![component().many()]).optional()],
    )
    .with_optional("DefaultVisibility", ValueType::Boolean);

    let color = ElementDecl::sequence("Color", vec![component().at_least_once()])
        .with_required("Color", ValueType::String);

    let components = ElementDecl::sequence(
        "Components",
        vec![
            view_setup_hints.optional(),
            ElementDecl::sequence("Selection", vec![component().many()]).optional(),
            visibility.once(),
            ElementDecl::sequence("Coloring", vec![color.at_least_once()]).optional(),
        ],
    );

    // Camera and geometry content is opaque to the engine
    Schema {
        kind: SchemaKind::VisualizationInfo,
        root: ElementDecl::sequence(
            "VisualizationInfo",
            vec![
                components.optional(),
                ElementDecl::any("OrthogonalCamera").optional(),
                ElementDecl::any("PerspectiveCamera").optional(),
                ElementDecl::any("Lines").optional(),
                ElementDecl::any("ClippingPlanes").optional(),
                ElementDecl::any("Bitmap").many(),
            ],
        )
        .with_required("Guid", ValueType::Guid),
    }
}

pub(super) fn extensions() -> Schema {
    Schema {
        kind: SchemaKind::Extensions,
        root: ElementDecl::any("schema"),
    }
}
