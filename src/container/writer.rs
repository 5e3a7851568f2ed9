//! Writing containers to ZIP archives

use super::Part;
use crate::error::{Error, Result};
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Write parts, in order, into a ZIP archive
///
/// # Arguments
///
/// * `writer` - The writer to write the archive to
/// * `parts` - Parts in the order they should appear in the archive
///
/// # Returns
///
/// Returns the writer after finishing the ZIP archive
pub(super) fn write_parts<W: Write + Seek>(writer: W, parts: &[Part]) -> Result<W> {
    let mut zip = ZipWriter::new(writer);

    for part in parts {
        let options = part_options(part);
        if part.is_dir {
            zip.add_directory(part.name.as_str(), options)
                .map_err(|e| Error::container_write_failed(&part.name, e))?;
            continue;
        }

        zip.start_file(part.name.as_str(), options)
            .map_err(|e| Error::container_write_failed(&part.name, e))?;
        zip.write_all(&part.data)
            .map_err(|e| Error::container_write_failed(&part.name, e))?;
    }

    let writer = zip
        .finish()
        .map_err(|e| Error::container_write_failed("ZIP archive", e))?;

    Ok(writer)
}

fn part_options(part: &Part) -> SimpleFileOptions {
    let method = match part.compression {
        CompressionMethod::Stored => CompressionMethod::Stored,
        CompressionMethod::Deflated => CompressionMethod::Deflated,
        other => {
            log::warn!(
                "Part '{}' used {:?}, writing it deflated instead",
                part.name,
                other
            );
            CompressionMethod::Deflated
        }
    };

    let mut options = SimpleFileOptions::default()
        .compression_method(method)
        .large_file(part.data.len() as u64 >= u32::MAX as u64);
    if let Some(modified) = part.last_modified {
        options = options.last_modified_time(modified);
    }
    options
}

/// Write parts to `path` without ever leaving a partial file behind
///
/// The archive is written to a temporary file in the target directory and
/// renamed over the target once complete. On failure the previous file, if
/// any, is untouched.
pub fn write_atomic(path: &Path, parts: &[Part]) -> Result<()> {
    let target = path.display().to_string();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp =
        NamedTempFile::new_in(dir).map_err(|e| Error::container_write_failed(&target, e))?;

    let buffered = write_parts(BufWriter::new(temp.as_file_mut()), parts)?;
    buffered
        .into_inner()
        .map_err(|e| Error::container_write_failed(&target, e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| Error::container_write_failed(&target, e))?;

    temp.persist(path)
        .map_err(|e| Error::container_write_failed(&target, e))?;
    log::debug!("Wrote {} parts to '{}'", parts.len(), target);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Container;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_replaces_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("project.bcf");
        std::fs::write(&path, b"old").unwrap();

        write_atomic(&path, &[Part::new("bcf.version", b"<Version/>".to_vec())]).unwrap();

        let container = Container::open(&path).unwrap();
        assert_eq!(container.get("bcf.version").unwrap().data.as_ref(), b"<Version/>");
        // Only the target remains, no stray temporary files
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("project.bcf");
        let err = write_atomic(&path, &[]).unwrap_err();
        assert!(matches!(err, Error::ContainerWriteFailed(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_timestamps_survive() {
        let stamp = zip::DateTime::from_date_and_time(2020, 5, 17, 12, 30, 0).unwrap();
        let mut part = Part::new("a.txt", b"x".to_vec());
        part.last_modified = Some(stamp);

        let cursor = write_parts(std::io::Cursor::new(Vec::new()), &[part]).unwrap();
        let container = Container::from_reader(std::io::Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(container.parts()[0].last_modified, Some(stamp));
    }
}
