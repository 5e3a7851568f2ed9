//! Part name handling

use crate::error::{Error, Result};
use urlencoding::decode;

/// Strip a leading slash from a part name
pub fn normalize_path(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

/// Top-level folder of a part, if it is inside one
///
/// - `"abc/markup.bcf"` returns `Some("abc")`
/// - `"project.bcfp"` returns `None`
pub fn folder_of(name: &str) -> Option<&str> {
    let name = normalize_path(name);
    name.split_once('/')
        .map(|(folder, _)| folder)
        .filter(|folder| !folder.is_empty())
}

/// Last path segment of a part name
pub fn file_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Resolve a reference written inside `folder` to a part name
///
/// The reference is percent-decoded, `.` and `..` segments are collapsed and
/// a leading `/` anchors it at the archive root. Returns `None` when the
/// reference climbs above the root.
///
/// ```
/// use libbcf::container::resolve_relative;
///
/// assert_eq!(resolve_relative("t1", "doc.pdf").as_deref(), Some("t1/doc.pdf"));
/// assert_eq!(
///     resolve_relative("t1", "../Documents/My%20Spec.pdf").as_deref(),
///     Some("Documents/My Spec.pdf")
/// );
/// ```
pub fn resolve_relative(folder: &str, reference: &str) -> Option<String> {
    let decoded = decode(reference)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| reference.to_string());
    let decoded = decoded.replace('\\', "/");

    let mut segments: Vec<&str> = Vec::new();
    if !decoded.starts_with('/') {
        segments.extend(normalize_path(folder).split('/').filter(|s| !s.is_empty()));
    }
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

/// Check that a name can be stored as a part
pub fn validate_part_name(part_name: &str) -> Result<()> {
    if part_name.is_empty() {
        return Err(Error::InvalidReference(
            "Part name cannot be empty".to_string(),
        ));
    }

    // Control characters (newlines, tabs, etc.) do not survive ZIP tooling
    if part_name.chars().any(|c| c.is_control()) {
        return Err(Error::InvalidReference(format!(
            "Part name cannot contain control characters: {}",
            part_name.escape_debug()
        )));
    }

    if part_name.contains('\\') {
        return Err(Error::InvalidReference(format!(
            "Part name must use '/' as separator: {}",
            part_name
        )));
    }

    for (idx, segment) in part_name.split('/').enumerate() {
        if segment.is_empty() {
            // Allow leading slash (which creates empty first segment)
            if idx == 0 && part_name.starts_with('/') {
                continue;
            }
            return Err(Error::InvalidReference(format!(
                "Part name cannot contain empty path segments: {}",
                part_name
            )));
        }

        if segment == "." || segment == ".." {
            return Err(Error::InvalidReference(format!(
                "Part name cannot contain '.' or '..' segments: {}",
                part_name
            )));
        }
    }

    Ok(())
}
