//! Container I/O for BCF files
//!
//! A BCF file is a ZIP archive. This module reads it into an ordered list of
//! named parts and writes such a list back, without interpreting part names
//! beyond treating them as `folder/file` paths. Each part remembers the
//! compression method and timestamp it was stored with so that a part copied
//! verbatim comes out exactly as it went in.

mod paths;
mod reader;
mod writer;

pub use paths::{file_name, folder_of, normalize_path, resolve_relative, validate_part_name};
pub use writer::write_atomic;

use crate::error::Result;
use std::io::{Read, Seek, Write};
use std::path::Path;
use std::sync::Arc;
use zip::{CompressionMethod, DateTime};

/// Version part path within the archive
pub const VERSION_PATH: &str = "bcf.version";

/// Project part path within the archive
pub const PROJECT_PATH: &str = "project.bcfp";

/// File name of the markup part inside a topic folder
pub const MARKUP_FILE: &str = "markup.bcf";

/// Immutable, shared part content
///
/// Cloning a blob never copies the bytes.
pub type Blob = Arc<[u8]>;

/// One named byte stream of the container
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    /// Full path inside the archive, as stored
    pub name: String,
    /// Decompressed content
    pub data: Blob,
    /// How the part was (or will be) compressed
    pub compression: CompressionMethod,
    /// Last modification time stored in the archive
    pub last_modified: Option<DateTime>,
    /// Directory entry rather than a file
    pub is_dir: bool,
}

impl Part {
    /// Create a file part with default metadata
    pub fn new(name: impl Into<String>, data: impl Into<Blob>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            compression: CompressionMethod::Deflated,
            last_modified: None,
            is_dir: false,
        }
    }

    /// Set the compression method
    pub fn with_compression(mut self, compression: CompressionMethod) -> Self {
        self.compression = compression;
        self
    }

    /// Same name and metadata, different content
    pub fn with_data(&self, data: impl Into<Blob>) -> Self {
        Self {
            name: self.name.clone(),
            data: data.into(),
            compression: self.compression,
            last_modified: self.last_modified,
            is_dir: self.is_dir,
        }
    }
}

/// An ordered set of parts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Container {
    parts: Vec<Part>,
}

impl Container {
    /// Create an empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a container from parts in the given order
    pub fn from_parts(parts: Vec<Part>) -> Self {
        Self { parts }
    }

    /// Read a container from a file
    ///
    /// Fails with [`Error::ContainerUnreadable`](crate::Error::ContainerUnreadable)
    /// if the file is missing, not a ZIP archive, or a part cannot be inflated.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        reader::open(path.as_ref())
    }

    /// Read a container from any seekable reader
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        reader::read(reader)
    }

    /// Write the container to a file, replacing it atomically
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_atomic(path.as_ref(), &self.parts)
    }

    /// Write the container to any seekable writer
    pub fn to_writer<W: Write + Seek>(&self, writer: W) -> Result<W> {
        writer::write_parts(writer, &self.parts)
    }

    /// All parts in archive order
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Consume the container, returning its parts
    pub fn into_parts(self) -> Vec<Part> {
        self.parts
    }

    /// Look up a part by name
    ///
    /// A leading `/` on either side is ignored.
    pub fn get(&self, name: &str) -> Option<&Part> {
        let wanted = normalize_path(name);
        self.parts
            .iter()
            .find(|p| !p.is_dir && normalize_path(&p.name) == wanted)
    }

    /// Check if a part exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Append a part, replacing any part of the same name in place
    pub fn insert(&mut self, part: Part) {
        let wanted = normalize_path(&part.name).to_string();
        match self
            .parts
            .iter_mut()
            .find(|p| normalize_path(&p.name) == wanted)
        {
            Some(existing) => *existing = part,
            None => self.parts.push(part),
        }
    }

    /// Remove a part by name, returning it
    pub fn remove(&mut self, name: &str) -> Option<Part> {
        let wanted = normalize_path(name);
        let index = self
            .parts
            .iter()
            .position(|p| normalize_path(&p.name) == wanted)?;
        Some(self.parts.remove(index))
    }

    /// Names of all file parts in archive order
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts
            .iter()
            .filter(|p| !p.is_dir)
            .map(|p| p.name.as_str())
    }

    /// Top-level folders in order of first appearance
    pub fn folders(&self) -> Vec<String> {
        let mut folders: Vec<String> = Vec::new();
        for part in &self.parts {
            if let Some(folder) = folder_of(normalize_path(&part.name))
                && !folders.iter().any(|f| f == folder)
            {
                folders.push(folder.to_string());
            }
        }
        folders
    }

    /// Number of parts, directory entries included
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Check if the container has no parts
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
