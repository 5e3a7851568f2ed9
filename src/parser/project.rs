//! Parsers for `project.bcfp` and `bcf.version`

use super::{ParseContext, PartParse};
use crate::config::BcfConfig;
use crate::model::{Project, Version};
use crate::schema::Violation;

/// Parse the project part
pub fn parse_project(
    part_name: &str,
    source: &[u8],
    violations: &[Violation],
    config: &BcfConfig,
) -> PartParse<Project> {
    let mut ctx = ParseContext::new(part_name, source, violations, config);
    let project = ctx.document("ProjectExtension").map(|root| {
        let mut project = Project {
            extension_schema: ctx.text(&root, "ExtensionSchema").filter(|s| !s.is_empty()),
            extensions: ctx.extensions(&root, &[], &["Project", "ExtensionSchema"]),
            ..Project::default()
        };
        if let Some(inner) = root.child("Project") {
            project.project_id = inner.attr("ProjectId").map(str::to_string);
            project.name = ctx.text(inner, "Name");
            project.project_extensions = ctx.extensions(inner, &["ProjectId"], &["Name"]);
        }
        project
    });
    ctx.finish(project)
}

/// Parse the version part
pub fn parse_version(
    part_name: &str,
    source: &[u8],
    violations: &[Violation],
    config: &BcfConfig,
) -> PartParse<Version> {
    let mut ctx = ParseContext::new(part_name, source, violations, config);
    let version = ctx.document("Version").and_then(|root| {
        let Some(version_id) = root.attr("VersionId") else {
            let diagnostic = ctx.skip(&root, "/Version/@VersionId", "Version has no VersionId");
            ctx.note(diagnostic);
            return None;
        };
        Some(Version {
            version_id: version_id.trim().to_string(),
            detailed_version: ctx.text(&root, "DetailedVersion"),
            extensions: ctx.extensions(&root, &["VersionId"], &["DetailedVersion"]),
        })
    });
    ctx.finish(version)
}
