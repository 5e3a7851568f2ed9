//! Writers for `project.bcfp` and `bcf.version`

use super::{
    empty, end, new_writer, optional_text, push_extension_attributes, start, text_element,
    write_declaration, write_raw_elements,
};
use crate::error::Result;
use crate::model::{Project, Version};
use quick_xml::events::BytesStart;

/// Serialize the project part
pub(crate) fn write_project(project: &Project) -> Result<Vec<u8>> {
    let mut writer = new_writer();
    write_declaration(&mut writer)?;

    let mut root = BytesStart::new("ProjectExtension");
    push_extension_attributes(&mut root, &project.extensions);
    start(&mut writer, root)?;

    if project.project_id.is_some()
        || project.name.is_some()
        || !project.project_extensions.is_empty()
    {
        let mut elem = BytesStart::new("Project");
        if let Some(id) = &project.project_id {
            elem.push_attribute(("ProjectId", id.as_str()));
        }
        push_extension_attributes(&mut elem, &project.project_extensions);
        if project.name.is_none() && project.project_extensions.elements.is_empty() {
            empty(&mut writer, elem)?;
        } else {
            start(&mut writer, elem)?;
            optional_text(&mut writer, "Name", project.name.as_deref())?;
            write_raw_elements(&mut writer, &project.project_extensions)?;
            end(&mut writer, "Project")?;
        }
    }

    // ExtensionSchema is mandatory even when there is none
    match &project.extension_schema {
        Some(schema) => text_element(&mut writer, "ExtensionSchema", schema)?,
        None => empty(&mut writer, BytesStart::new("ExtensionSchema"))?,
    }

    write_raw_elements(&mut writer, &project.extensions)?;
    end(&mut writer, "ProjectExtension")?;
    Ok(writer.into_inner())
}

/// Serialize the version part
pub(crate) fn write_version(version: &Version) -> Result<Vec<u8>> {
    let mut writer = new_writer();
    write_declaration(&mut writer)?;

    let mut root = BytesStart::new("Version");
    root.push_attribute(("VersionId", version.version_id.as_str()));
    push_extension_attributes(&mut root, &version.extensions);

    if version.detailed_version.is_none() && version.extensions.elements.is_empty() {
        empty(&mut writer, root)?;
    } else {
        start(&mut writer, root)?;
        optional_text(&mut writer, "DetailedVersion", version.detailed_version.as_deref())?;
        write_raw_elements(&mut writer, &version.extensions)?;
        end(&mut writer, "Version")?;
    }
    Ok(writer.into_inner())
}
