//! Open, edit, save and close a BCF container
//!
//! [`BcfFile`] is the handle the rest of an application works with. It keeps
//! the container it was loaded from next to the graph, so that saving can
//! copy every untouched part verbatim and regenerate only the parts of
//! entities changed since the last save.
//!
//! ```text
//! Unopened --open--> Clean <--save-- Dirty
//!                      \--mutation-->/
//! any state --close--> Closed
//! ```

use crate::config::BcfConfig;
use crate::container::{self, Container, Part};
use crate::diagnostic::Diagnostic;
use crate::error::{Error, Result};
use crate::graph::ProjectGraph;
use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use std::fmt;
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};

/// Lifecycle state of a [`BcfFile`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing loaded yet
    Unopened,
    /// Loaded or saved, no pending changes
    Clean,
    /// Changed since loading or the last save
    Dirty,
    /// Closed; every further operation fails
    Closed,
}

impl SessionState {
    /// Lower-case name used in error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Unopened => "unopened",
            SessionState::Clean => "clean",
            SessionState::Dirty => "dirty",
            SessionState::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
struct OpenProject {
    graph: ProjectGraph,
    /// Parts as last read or written
    source: Container,
    diagnostics: Vec<Diagnostic>,
}

#[derive(Debug)]
enum Session {
    Unopened,
    Open(Box<OpenProject>),
    Closed,
}

/// A BCF container opened for editing
///
/// # Example
///
/// ```no_run
/// use libbcf::BcfFile;
/// use libbcf::model::TopicFields;
///
/// # fn main() -> libbcf::Result<()> {
/// let mut file = BcfFile::open("issues.bcfzip")?;
/// for diagnostic in file.diagnostics()? {
///     println!("{}", diagnostic);
/// }
/// file.graph_mut()?.add_topic(TopicFields::titled("Clash on Level 2"))?;
/// file.save()?;
/// file.close();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BcfFile {
    config: BcfConfig,
    path: Option<PathBuf>,
    session: Session,
}

impl Default for BcfFile {
    fn default() -> Self {
        Self::new()
    }
}

impl BcfFile {
    /// Create an unopened handle with the default configuration
    pub fn new() -> Self {
        Self::with_config(BcfConfig::new())
    }

    /// Create an unopened handle
    pub fn with_config(config: BcfConfig) -> Self {
        Self {
            config,
            path: None,
            session: Session::Unopened,
        }
    }

    /// Open a container file with the default configuration
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, BcfConfig::new())
    }

    /// Open a container file
    ///
    /// Fails only if the archive itself cannot be read. Problems inside
    /// parts are reported by [`diagnostics`](Self::diagnostics).
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: BcfConfig) -> Result<Self> {
        let mut file = Self::with_config(config);
        file.load(path)?;
        Ok(file)
    }

    /// Read a container from any seekable reader
    ///
    /// The handle is not bound to a path; use [`save_as`](Self::save_as) or
    /// [`to_writer`](Self::to_writer) to persist it.
    pub fn from_reader<R: Read + Seek>(reader: R, config: BcfConfig) -> Result<Self> {
        let container = Container::from_reader(reader)?;
        let mut file = Self::with_config(config);
        file.attach(container);
        Ok(file)
    }

    /// Start a new project with a fresh project identifier
    ///
    /// The handle starts dirty and unbound.
    pub fn create(name: impl Into<String>) -> Self {
        let mut file = Self::new();
        file.session = Session::Open(Box::new(OpenProject {
            graph: ProjectGraph::new_project(name),
            source: Container::new(),
            diagnostics: Vec::new(),
        }));
        log::info!("Created new project");
        file
    }

    /// Load a container into an unopened handle and bind it to `path`
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<&[Diagnostic]> {
        self.require_unopened("open")?;
        let path = path.as_ref();
        let container = Container::open(path)?;
        self.path = Some(path.to_path_buf());
        log::info!("Opened '{}'", path.display());
        self.attach(container);
        self.diagnostics()
    }

    fn attach(&mut self, container: Container) {
        let outcome = ProjectGraph::load(&container, &self.config);
        self.session = Session::Open(Box::new(OpenProject {
            graph: outcome.graph,
            source: container,
            diagnostics: outcome.diagnostics,
        }));
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        match &self.session {
            Session::Unopened => SessionState::Unopened,
            Session::Open(open) if open.graph.is_dirty() => SessionState::Dirty,
            Session::Open(_) => SessionState::Clean,
            Session::Closed => SessionState::Closed,
        }
    }

    /// Path the handle saves to, if bound
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Configuration used for loading and saving
    pub fn config(&self) -> &BcfConfig {
        &self.config
    }

    /// The loaded project
    pub fn graph(&self) -> Result<&ProjectGraph> {
        Ok(&self.require_open("read the project")?.graph)
    }

    /// The loaded project, for editing
    pub fn graph_mut(&mut self) -> Result<&mut ProjectGraph> {
        Ok(&mut self.require_open_mut("edit the project")?.graph)
    }

    /// Diagnostics raised while loading
    pub fn diagnostics(&self) -> Result<&[Diagnostic]> {
        Ok(&self.require_open("read diagnostics")?.diagnostics)
    }

    /// Write pending changes back to the bound path
    ///
    /// Fails with [`Error::InvalidState`] if the handle is not open or was
    /// never bound to a path. On failure the file on disk is unchanged and
    /// the changes stay pending.
    pub fn save(&mut self) -> Result<()> {
        let state = self.state();
        let Some(path) = self.path.clone() else {
            return Err(Error::InvalidState {
                operation: "save",
                state: match state {
                    SessionState::Clean | SessionState::Dirty => "not bound to a path",
                    other => other.as_str(),
                },
            });
        };
        self.save_to(&path)
    }

    /// Write the project to `path` and bind the handle to it
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.save_to(path)?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Write the project as a ZIP archive to any seekable writer
    ///
    /// Counts as a save: pending changes are cleared on success.
    pub fn to_writer<W: Write + Seek>(&mut self, writer: W) -> Result<W> {
        let compression = self.config.compression();
        let open = self.require_open_mut("save")?;
        open.graph.fill_required();
        let parts = plan_parts(&open.graph, &open.source, compression)?;
        let container = Container::from_parts(parts);
        let writer = container.to_writer(writer)?;
        open.commit(container);
        Ok(writer)
    }

    fn save_to(&mut self, path: &Path) -> Result<()> {
        let compression = self.config.compression();
        let open = self.require_open_mut("save")?;
        open.graph.fill_required();
        let parts = plan_parts(&open.graph, &open.source, compression)?;
        container::write_atomic(path, &parts)?;
        log::info!("Saved {} parts to '{}'", parts.len(), path.display());
        open.commit(Container::from_parts(parts));
        Ok(())
    }

    /// Drop the project and the retained container
    ///
    /// Allowed in any state; pending changes are discarded.
    pub fn close(&mut self) {
        if let Session::Open(open) = &self.session
            && open.graph.is_dirty()
        {
            log::warn!("Closing with unsaved changes");
        }
        self.session = Session::Closed;
        log::info!("Closed container");
    }

    fn require_unopened(&self, operation: &'static str) -> Result<()> {
        match self.session {
            Session::Unopened => Ok(()),
            _ => Err(Error::InvalidState {
                operation,
                state: self.state().as_str(),
            }),
        }
    }

    fn require_open(&self, operation: &'static str) -> Result<&OpenProject> {
        match &self.session {
            Session::Open(open) => Ok(&**open),
            _ => Err(Error::InvalidState {
                operation,
                state: self.state().as_str(),
            }),
        }
    }

    fn require_open_mut(&mut self, operation: &'static str) -> Result<&mut OpenProject> {
        let state = self.state().as_str();
        match &mut self.session {
            Session::Open(open) => Ok(&mut **open),
            _ => Err(Error::InvalidState { operation, state }),
        }
    }
}

impl OpenProject {
    /// Adopt what was just written as the new baseline
    fn commit(&mut self, written: Container) {
        self.graph.mark_clean();
        self.source = written;
    }
}

/// Parts of the container to write, in archive order
///
/// Parts of the source keep their position and metadata. A part whose owner
/// is dirty gets regenerated bytes; a part removed by an edit is left out;
/// anything else is copied as is. New parts follow in graph order.
fn plan_parts(
    graph: &ProjectGraph,
    source: &Container,
    compression: zip::CompressionMethod,
) -> Result<Vec<Part>> {
    let mut parts = Vec::with_capacity(source.len());
    let mut regenerated = 0;

    for part in source.parts() {
        if let Some(owner) = graph.part_owner(&part.name)
            && !part.is_dir
        {
            match graph.render_part(owner)? {
                Some(data) => {
                    regenerated += 1;
                    parts.push(part.with_data(data));
                }
                None => parts.push(part.clone()),
            }
        } else if graph.is_part_removed(&part.name) {
            log::debug!("Dropping part '{}'", part.name);
        } else {
            parts.push(part.clone());
        }
    }

    let copied = parts.len() - regenerated;
    let mut added = 0;
    let stamp = archive_time(Local::now().naive_local());
    for (name, owner) in graph.owned_parts() {
        if source.contains(&name) {
            continue;
        }
        if let Some(data) = graph.render_part(owner)? {
            added += 1;
            let mut part = Part::new(name, data).with_compression(compression);
            part.last_modified = stamp;
            parts.push(part);
        }
    }

    log::debug!(
        "Save plan: {} copied, {} regenerated, {} added",
        copied,
        regenerated,
        added
    );
    Ok(parts)
}

/// ZIP timestamp for new parts, `None` outside the representable range
fn archive_time(now: NaiveDateTime) -> Option<zip::DateTime> {
    let year = u16::try_from(now.year()).ok()?;
    zip::DateTime::from_date_and_time(
        year,
        now.month() as u8,
        now.day() as u8,
        now.hour() as u8,
        now.minute() as u8,
        now.second() as u8,
    )
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CommentFields, TopicFields};
    use std::io::Cursor;

    fn saved_bytes(file: &mut BcfFile) -> Vec<u8> {
        file.to_writer(Cursor::new(Vec::new())).unwrap().into_inner()
    }

    #[test]
    fn test_unopened_handle_rejects_everything() {
        let mut file = BcfFile::new();
        assert_eq!(file.state(), SessionState::Unopened);
        assert!(matches!(
            file.graph(),
            Err(Error::InvalidState {
                state: "unopened",
                ..
            })
        ));
        assert!(matches!(file.save(), Err(Error::InvalidState { .. })));
    }

    #[test]
    fn test_created_project_is_dirty_until_written() {
        let mut file = BcfFile::create("Hospital");
        assert_eq!(file.state(), SessionState::Dirty);
        assert!(file.path().is_none());
        assert!(matches!(
            file.save(),
            Err(Error::InvalidState {
                operation: "save",
                state: "not bound to a path"
            })
        ));

        let bytes = saved_bytes(&mut file);
        assert_eq!(file.state(), SessionState::Clean);

        let container = Container::from_reader(Cursor::new(bytes)).unwrap();
        let names: Vec<&str> = container.part_names().collect();
        assert_eq!(names, vec!["bcf.version", "project.bcfp"]);
    }

    #[test]
    fn test_resave_is_identical() {
        let mut file = BcfFile::create("Hospital");
        let topic = file
            .graph_mut()
            .unwrap()
            .add_topic(TopicFields::titled("Clash"))
            .unwrap();
        file.graph_mut()
            .unwrap()
            .add_comment(
                topic,
                CommentFields {
                    author: "jane@example.com".to_string(),
                    text: "Duct hits beam".to_string(),
                    ..CommentFields::default()
                },
            )
            .unwrap();

        let first = saved_bytes(&mut file);
        let second = saved_bytes(&mut file);
        assert_eq!(first, second);

        let reloaded = BcfFile::from_reader(Cursor::new(first), BcfConfig::new()).unwrap();
        assert_eq!(reloaded.state(), SessionState::Clean);
        assert!(reloaded.diagnostics().unwrap().is_empty());
        let graph = reloaded.graph().unwrap();
        assert_eq!(graph.comments(topic).unwrap()[0].text, "Duct hits beam");
    }

    #[test]
    fn test_archive_time() {
        let now = NaiveDateTime::parse_from_str("2024-03-05 14:07:09", "%Y-%m-%d %H:%M:%S").unwrap();
        let stamp = archive_time(now).unwrap();
        assert_eq!((stamp.year(), stamp.month(), stamp.day()), (2024, 3, 5));
        assert_eq!((stamp.hour(), stamp.minute(), stamp.second()), (14, 7, 9));

        let ancient = NaiveDateTime::parse_from_str("1970-01-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert!(archive_time(ancient).is_none());
    }

    #[test]
    fn test_close_is_final() {
        let mut file = BcfFile::create("p");
        file.close();
        assert_eq!(file.state(), SessionState::Closed);
        assert!(matches!(
            file.graph_mut(),
            Err(Error::InvalidState {
                state: "closed",
                ..
            })
        ));
        assert!(matches!(
            file.to_writer(Cursor::new(Vec::new())),
            Err(Error::InvalidState { .. })
        ));
        // Closing twice is fine
        file.close();
    }

    #[test]
    fn test_open_twice_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.bcf");
        let mut created = BcfFile::create("p");
        created.save_as(&path).unwrap();
        assert_eq!(created.path(), Some(path.as_path()));

        let mut file = BcfFile::new();
        file.load(&path).unwrap();
        assert_eq!(file.state(), SessionState::Clean);
        assert!(matches!(file.load(&path), Err(Error::InvalidState { .. })));
    }
}
