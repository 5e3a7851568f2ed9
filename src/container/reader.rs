//! Reading containers from ZIP archives

use super::{Container, Part};
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Open a container file from disk
pub(super) fn open(path: &Path) -> Result<Container> {
    let file = File::open(path)
        .map_err(|e| Error::container_unreadable(&path.display().to_string(), e))?;
    read(BufReader::new(file))
}

/// Read every part of an archive into memory, keeping archive order
pub(super) fn read<R: Read + Seek>(reader: R) -> Result<Container> {
    let mut archive = ZipArchive::new(reader)
        .map_err(|e| Error::container_unreadable("ZIP archive", e))?;

    let mut parts = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut file = archive
            .by_index(index)
            .map_err(|e| Error::container_unreadable(&format!("entry #{}", index), e))?;
        let name = file.name().to_string();

        let mut data = Vec::with_capacity(file.size().min(u32::MAX as u64) as usize);
        file.read_to_end(&mut data)
            .map_err(|e| Error::container_unreadable(&name, e))?;

        log::debug!(
            "Read part '{}' ({} bytes, {:?})",
            name,
            data.len(),
            file.compression()
        );
        parts.push(Part {
            is_dir: file.is_dir(),
            compression: file.compression(),
            last_modified: file.last_modified(),
            data: data.into(),
            name,
        });
    }

    Ok(Container::from_parts(parts))
}
