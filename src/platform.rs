//! The filesystem surface the enumerator runs against.
//!
//! Everything the enumerator needs from the host is collected behind the
//! [`FileSystem`] trait: directory searches, attribute queries, full-path
//! resolution, home-directory lookup and the cancellation predicate.
//! [`OsFileSystem`] is the `std::fs` implementation; tests substitute a
//! scripted one.

use std::{
    fs::{self, Metadata},
    io,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::SystemTime,
};

use bitflags::bitflags;

use crate::{paths, wildcard};

bitflags! {
    /// Attribute bits carried by every enumerated entry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FileAttributes: u32 {
        /// The entry is a directory.
        const DIRECTORY = 1 << 0;
        /// The entry redirects elsewhere (symlink, mount point, ...).
        const REPARSE_POINT = 1 << 1;
        /// The entry is not writable.
        const READONLY = 1 << 2;
    }
}

/// What kind of redirection a reparse point performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReparseKind {
    /// A directory grafted from another volume location.
    MountPoint,
    /// A symbolic link.
    Symlink,
    /// Some other tag the enumerator does not interpret.
    Other,
}

/// One enumerated directory entry.
///
/// The absolute path of the entry travels separately (as a callback
/// argument); the record itself only knows the leaf name.
#[derive(Debug, Clone, Default)]
pub struct FindRecord {
    /// Leaf name within the parent directory. Empty for a synthesized
    /// volume-root record.
    pub name: String,
    pub attributes: FileAttributes,
    /// Size in bytes; zero for directories.
    pub size: u64,
    pub created: Option<SystemTime>,
    pub accessed: Option<SystemTime>,
    pub modified: Option<SystemTime>,
    /// Set when `attributes` contains `REPARSE_POINT`.
    pub reparse: Option<ReparseKind>,
}

impl FindRecord {
    pub fn is_directory(&self) -> bool {
        self.attributes.contains(FileAttributes::DIRECTORY)
    }

    /// A reparse point the enumerator must not descend through.
    pub fn is_traversal_link(&self) -> bool {
        self.attributes.contains(FileAttributes::REPARSE_POINT)
            && matches!(
                self.reparse,
                Some(ReparseKind::MountPoint) | Some(ReparseKind::Symlink)
            )
    }
}

/// An open directory search. Dropping it closes the search.
pub type FindScan<'a> = Box<dyn Iterator<Item = io::Result<FindRecord>> + 'a>;

/// Host filesystem primitives consumed by the enumerator.
pub trait FileSystem {
    /// Open a search for entries of `dir` whose names match `wildcard`.
    ///
    /// The stream performs the per-directory `*`/`?` filtering itself and
    /// includes `.` and `..` entries when they match, mirroring the
    /// native find primitives the enumerator was designed around.
    fn open_find(&self, dir: &str, wildcard: &str) -> io::Result<FindScan<'_>>;

    /// Attributes of `path`, or `None` when it does not exist.
    fn attributes(&self, path: &str) -> Option<FileAttributes>;

    /// Build a [`FindRecord`] by querying `path` directly. Used for
    /// volume-root synthesis and for entries (named streams) that never
    /// pass through a directory search.
    fn record_for_path(&self, path: &str, copy_name: bool) -> io::Result<FindRecord>;

    /// Resolve `spec` into an absolute path.
    fn full_path(&self, spec: &str) -> io::Result<String>;

    /// Home directory for `user`; the empty string means the current
    /// user. `None` when the user is unknown.
    fn home_for(&self, user: &str) -> Option<String>;

    /// Polled after every reported match; true unwinds the enumeration.
    fn cancelled(&self) -> bool {
        false
    }
}

/// The real filesystem.
///
/// Optionally carries a shared cancellation flag so an interrupt handler
/// can stop an in-flight enumeration.
#[derive(Debug, Default, Clone)]
pub struct OsFileSystem {
    cancel: Option<Arc<AtomicBool>>,
}

impl OsFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a cancellation flag; set it to true to unwind enumeration.
    pub fn with_cancel_flag(flag: Arc<AtomicBool>) -> Self {
        Self { cancel: Some(flag) }
    }
}

impl FileSystem for OsFileSystem {
    fn open_find(&self, dir: &str, wildcard: &str) -> io::Result<FindScan<'_>> {
        let entries = fs::read_dir(dir)?;
        let wildcard = wildcard.to_owned();

        // read_dir never reports the dot entries, but the find interface
        // this models does, and INCLUDE_DOTFILES relies on seeing them.
        let mut dots = Vec::new();
        if wildcard::matches(".", &wildcard) {
            if let Ok(mut record) = update_find_record_from_file(dir, false) {
                record.name = String::from(".");
                dots.push(record);
            }
        }
        if wildcard::matches("..", &wildcard) {
            let parent = Path::new(dir)
                .parent()
                .map_or_else(|| dir.to_owned(), |p| p.to_string_lossy().into_owned());
            if let Ok(mut record) = update_find_record_from_file(&parent, false) {
                record.name = String::from("..");
                dots.push(record);
            }
        }

        let scan = dots.into_iter().map(Ok).chain(entries.filter_map(
            move |entry| match entry {
                Err(err) => Some(Err(err)),
                Ok(entry) => {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    if !wildcard::matches(&name, &wildcard) {
                        return None;
                    }
                    Some(entry.metadata().map(|metadata| {
                        record_from_metadata(name, &metadata, &entry.path())
                    }))
                }
            },
        ));

        Ok(Box::new(scan))
    }

    fn attributes(&self, path: &str) -> Option<FileAttributes> {
        update_find_record_from_file(path, false)
            .ok()
            .map(|record| record.attributes)
    }

    fn record_for_path(&self, path: &str, copy_name: bool) -> io::Result<FindRecord> {
        update_find_record_from_file(path, copy_name)
    }

    fn full_path(&self, spec: &str) -> io::Result<String> {
        let cwd = std::env::current_dir()?;
        Ok(paths::resolve_full_path(spec, &cwd))
    }

    fn home_for(&self, user: &str) -> Option<String> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .ok()?;

        if user.is_empty() {
            return Some(home);
        }

        // Another user's home: look for a sibling of our own.
        let sibling = Path::new(&home).parent()?.join(user);
        if sibling.is_dir() {
            Some(sibling.to_string_lossy().into_owned())
        } else {
            None
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Build a [`FindRecord`] for a path that never went through a directory
/// search, by querying the file itself (without following a final
/// symlink).
///
/// With `copy_name`, the path's final component becomes the record name;
/// otherwise the name is left empty for the caller to fill in.
pub fn update_find_record_from_file(path: &str, copy_name: bool) -> io::Result<FindRecord> {
    let metadata = fs::symlink_metadata(path)?;

    let name = if copy_name {
        path.rsplit(paths::is_sep)
            .next()
            .unwrap_or(path)
            .to_owned()
    } else {
        String::new()
    };

    Ok(record_from_metadata(name, &metadata, Path::new(path)))
}

fn record_from_metadata(name: String, metadata: &Metadata, path: &Path) -> FindRecord {
    let mut attributes = FileAttributes::empty();
    if metadata.is_dir() {
        attributes |= FileAttributes::DIRECTORY;
    }
    if metadata.permissions().readonly() {
        attributes |= FileAttributes::READONLY;
    }

    let mut reparse = None;
    if metadata.file_type().is_symlink() {
        attributes |= FileAttributes::REPARSE_POINT;
        reparse = Some(ReparseKind::Symlink);
        // A link to a directory enumerates as a directory, the way the
        // native find primitive reports it.
        if fs::metadata(path).is_ok_and(|target| target.is_dir()) {
            attributes |= FileAttributes::DIRECTORY;
        }
    }

    FindRecord {
        name,
        attributes,
        size: if attributes.contains(FileAttributes::DIRECTORY) {
            0
        } else {
            metadata.len()
        },
        created: metadata.created().ok(),
        accessed: metadata.accessed().ok(),
        modified: metadata.modified().ok(),
        reparse,
    }
}
