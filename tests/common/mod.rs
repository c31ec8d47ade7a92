//! A scripted filesystem for exercising expansion and enumeration
//! deterministically, recording every directory search it is asked to
//! open.

#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    io,
    path::Path,
    rc::Rc,
};

use filespec::{
    FileAttributes, FileSystem, FindRecord, FindScan, MatchFlags, ReparseKind, for_each_file_with,
    matches, paths,
};

#[derive(Clone)]
struct FakeEntry {
    name: String,
    attributes: FileAttributes,
    reparse: Option<ReparseKind>,
}

impl FakeEntry {
    fn to_record(&self) -> FindRecord {
        FindRecord {
            name: self.name.clone(),
            attributes: self.attributes,
            size: if self.attributes.contains(FileAttributes::DIRECTORY) {
                0
            } else {
                42
            },
            reparse: self.reparse,
            ..FindRecord::default()
        }
    }
}

pub struct FakeFileSystem {
    cwd: String,
    dirs: BTreeMap<String, Vec<FakeEntry>>,
    failing: Vec<String>,
    home: Option<String>,
    searches: RefCell<Vec<(String, String)>>,
    pub cancel: Rc<Cell<bool>>,
}

impl FakeFileSystem {
    pub fn new(cwd: &str) -> Self {
        let mut fs = Self {
            cwd: cwd.to_owned(),
            dirs: BTreeMap::new(),
            failing: Vec::new(),
            home: None,
            searches: RefCell::new(Vec::new()),
            cancel: Rc::new(Cell::new(false)),
        };
        fs.ensure_dir(cwd);
        fs
    }

    /// Register a directory (and its ancestors).
    pub fn dir(mut self, path: &str) -> Self {
        self.add(path, FileAttributes::DIRECTORY, None);
        self
    }

    /// Register a regular file (and its ancestors).
    pub fn file(mut self, path: &str) -> Self {
        self.add(path, FileAttributes::empty(), None);
        self
    }

    /// Register a directory that is reached through a symlink.
    pub fn link_dir(mut self, path: &str) -> Self {
        self.add(
            path,
            FileAttributes::DIRECTORY | FileAttributes::REPARSE_POINT,
            Some(ReparseKind::Symlink),
        );
        self
    }

    /// Register a directory whose enumeration fails with EACCES.
    pub fn failing_dir(mut self, path: &str) -> Self {
        self.add(path, FileAttributes::DIRECTORY, None);
        self.failing.push(normalize(path).to_owned());
        self
    }

    /// Register a bare volume root such as `C:`.
    pub fn drive_root(mut self, root: &str) -> Self {
        self.dirs.entry(normalize(root).to_owned()).or_default();
        self
    }

    /// Set the current user's home directory.
    pub fn home(mut self, path: &str) -> Self {
        self.home = Some(path.to_owned());
        self
    }

    /// Every `(directory, wildcard)` search opened so far.
    pub fn searches(&self) -> Vec<(String, String)> {
        self.searches.borrow().clone()
    }

    fn add(&mut self, path: &str, attributes: FileAttributes, reparse: Option<ReparseKind>) {
        let path = normalize(path);
        let (parent, name) = match path.rfind(paths::is_sep) {
            Some(index) => (&path[..index], &path[index + 1..]),
            None => ("", path),
        };

        self.ensure_dir(parent);
        let entries = self.dirs.get_mut(parent).expect("parent just ensured");
        if !entries.iter().any(|entry| entry.name == name) {
            entries.push(FakeEntry {
                name: name.to_owned(),
                attributes,
                reparse,
            });
        }

        if attributes.contains(FileAttributes::DIRECTORY) {
            self.dirs.entry(path.to_owned()).or_default();
        }
    }

    fn ensure_dir(&mut self, path: &str) {
        let path = normalize(path);
        if self.dirs.contains_key(path) {
            return;
        }
        if let Some(index) = path.rfind(paths::is_sep) {
            let (parent, name) = (&path[..index], &path[index + 1..]);
            if !name.is_empty() {
                self.ensure_dir(parent);
                let entries = self.dirs.get_mut(parent).expect("parent just ensured");
                if !entries.iter().any(|entry| entry.name == name) {
                    entries.push(FakeEntry {
                        name: name.to_owned(),
                        attributes: FileAttributes::DIRECTORY,
                        reparse: None,
                    });
                }
            } else if !parent.is_empty() {
                self.ensure_dir(parent);
            }
        }
        self.dirs.entry(path.to_owned()).or_default();
    }

    fn lookup(&self, full: &str) -> Option<FakeEntry> {
        let full = normalize(full);
        if self.dirs.contains_key(full) {
            return Some(FakeEntry {
                name: leaf_of(full).to_owned(),
                attributes: FileAttributes::DIRECTORY,
                reparse: None,
            });
        }
        let (parent, name) = match full.rfind(paths::is_sep) {
            Some(index) => (&full[..index], &full[index + 1..]),
            None => ("", full),
        };
        self.dirs
            .get(parent)?
            .iter()
            .find(|entry| entry.name == name)
            .cloned()
    }
}

fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches(paths::is_sep);
    if trimmed.is_empty() && path.starts_with(paths::is_sep) {
        // The filesystem root keys as the empty string.
        ""
    } else {
        trimmed
    }
}

fn leaf_of(path: &str) -> &str {
    match path.rfind(paths::is_sep) {
        Some(index) => &path[index + 1..],
        None => path,
    }
}

impl FileSystem for FakeFileSystem {
    fn open_find(&self, dir: &str, wildcard: &str) -> io::Result<FindScan<'_>> {
        self.searches
            .borrow_mut()
            .push((dir.to_owned(), wildcard.to_owned()));

        let key = normalize(dir);
        if self.failing.iter().any(|failing| failing == key) {
            return Err(io::Error::from_raw_os_error(13));
        }
        let Some(entries) = self.dirs.get(key) else {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such directory"));
        };

        let mut records = Vec::new();
        for dot in [".", ".."] {
            if matches(dot, wildcard) {
                records.push(FindRecord {
                    name: dot.to_owned(),
                    attributes: FileAttributes::DIRECTORY,
                    ..FindRecord::default()
                });
            }
        }
        for entry in entries {
            if matches(&entry.name, wildcard) {
                records.push(entry.to_record());
            }
        }

        Ok(Box::new(records.into_iter().map(Ok)))
    }

    fn attributes(&self, path: &str) -> Option<FileAttributes> {
        let full = self.full_path(path).ok()?;
        self.lookup(&full).map(|entry| entry.attributes)
    }

    fn record_for_path(&self, path: &str, copy_name: bool) -> io::Result<FindRecord> {
        let entry = self
            .lookup(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such path"))?;
        let mut record = entry.to_record();
        if !copy_name {
            record.name.clear();
        }
        Ok(record)
    }

    fn full_path(&self, spec: &str) -> io::Result<String> {
        Ok(paths::resolve_full_path(spec, Path::new(&self.cwd)))
    }

    fn home_for(&self, user: &str) -> Option<String> {
        if user.is_empty() { self.home.clone() } else { None }
    }

    fn cancelled(&self) -> bool {
        self.cancel.get()
    }
}

/// Run an enumeration, collecting `(path, depth)` per reported match.
pub fn run(
    fs: &FakeFileSystem,
    pattern: &str,
    flags: MatchFlags,
) -> (bool, Vec<(String, u32)>) {
    let mut reported = Vec::new();
    let completed = for_each_file_with(
        fs,
        pattern,
        flags,
        0,
        &mut |path, _record, depth| {
            reported.push((path.display().to_string(), depth));
            true
        },
        None,
    );
    (completed, reported)
}

/// The reported paths alone.
pub fn run_paths(fs: &FakeFileSystem, pattern: &str, flags: MatchFlags) -> Vec<String> {
    run(fs, pattern, flags).1.into_iter().map(|(path, _)| path).collect()
}
