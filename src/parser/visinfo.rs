//! Summary extraction from viewpoint definitions (`.bcfv`)
//!
//! The definition itself stays an opaque blob; this only builds the
//! read-only [`VisualizationInfo`] used for lookups.

use super::{ParseContext, PartParse};
use crate::config::BcfConfig;
use crate::model::{AttributeBag, ColorGroup, ComponentRef, Visibility, VisualizationInfo};
use crate::schema::Violation;
use crate::xml::XmlElement;

/// Parse the summary of a viewpoint definition
pub fn parse_visualization_info(
    part_name: &str,
    source: &[u8],
    violations: &[Violation],
    config: &BcfConfig,
) -> PartParse<VisualizationInfo> {
    let mut ctx = ParseContext::new(part_name, source, violations, config);
    let info = read_visualization_info(&mut ctx);
    ctx.finish(info)
}

fn read_visualization_info(ctx: &mut ParseContext<'_>) -> Option<VisualizationInfo> {
    let root = ctx.document("VisualizationInfo")?;
    let path = "/VisualizationInfo";

    let guid = ctx.guid_attr(&root, "Guid", path);
    let mut info = VisualizationInfo {
        guid: ctx.accept(guid).flatten(),
        ..VisualizationInfo::default()
    };

    if let Some(components) = root.child("Components") {
        read_components(ctx, components, &mut info);
    }

    info.orthogonal_camera = root.child("OrthogonalCamera").map(bag);
    info.perspective_camera = root.child("PerspectiveCamera").map(bag);
    if let Some(lines) = root.child("Lines") {
        info.lines = lines.children_named("Line").map(bag).collect();
    }
    if let Some(planes) = root.child("ClippingPlanes") {
        info.clipping_planes = planes.children_named("ClippingPlane").map(bag).collect();
    }
    // BCF 2.0 wraps bitmaps in a single <Bitmaps> element
    info.bitmaps = root
        .children
        .iter()
        .filter(|c| matches!(c.local_name(), "Bitmap" | "Bitmaps"))
        .map(bag)
        .collect();

    Some(info)
}

fn read_components(ctx: &mut ParseContext<'_>, components: &XmlElement, info: &mut VisualizationInfo) {
    let path = "/VisualizationInfo/Components";

    if let Some(selection) = components.child("Selection") {
        info.selection = selection.children_named("Component").map(component).collect();
    }

    match components.child("Visibility") {
        Some(visibility) => {
            let default = ctx.boolean_attr(
                visibility,
                "DefaultVisibility",
                true,
                &format!("{}/Visibility", path),
            );
            info.visibility = Visibility {
                default_visibility: ctx.accept(default).unwrap_or(true),
                exceptions: visibility
                    .child("Exceptions")
                    .map(|e| e.children_named("Component").map(component).collect())
                    .unwrap_or_default(),
                view_setup_hints: AttributeBag::new(),
            };
        }
        None => read_legacy_components(components, info),
    }

    if let Some(hints) = components.child("ViewSetupHints") {
        info.visibility.view_setup_hints = bag(hints);
    }

    if let Some(coloring) = components.child("Coloring") {
        info.coloring = coloring
            .children_named("Color")
            .map(|color| ColorGroup {
                color: color.attr("Color").unwrap_or_default().to_string(),
                components: color.children_named("Component").map(component).collect(),
            })
            .collect();
    }
}

/// BCF 2.0 lists components directly with `Selected`/`Visible` flags
fn read_legacy_components(components: &XmlElement, info: &mut VisualizationInfo) {
    for el in components.children_named("Component") {
        if el.attr("Selected") == Some("true") {
            info.selection.push(component(el));
        }
        if el.attr("Visible") == Some("false") {
            info.visibility.exceptions.push(component(el));
        }
    }
}

fn component(el: &XmlElement) -> ComponentRef {
    ComponentRef {
        ifc_guid: el.attr("IfcGuid").map(str::to_string),
        originating_system: el.child_text("OriginatingSystem").map(|t| t.trim().to_string()),
        authoring_tool_id: el.child_text("AuthoringToolId").map(|t| t.trim().to_string()),
    }
}

/// Flatten an element into dotted keys
fn bag(el: &XmlElement) -> AttributeBag {
    let mut values = AttributeBag::new();
    flatten(el, "", &mut values);
    values
}

fn flatten(el: &XmlElement, prefix: &str, values: &mut AttributeBag) {
    for (key, value) in &el.attributes {
        if !key.starts_with("xmlns") {
            values.insert(format!("{}{}", prefix, key), value.clone());
        }
    }
    for child in &el.children {
        let key = format!("{}{}", prefix, child.local_name());
        if child.children.is_empty() && child.attributes.is_empty() {
            values.insert(key, child.text.trim().to_string());
        } else {
            flatten(child, &format!("{}.", key), values);
        }
    }
}
