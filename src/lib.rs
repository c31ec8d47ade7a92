//! Filespec expands user-written path patterns (`*`/`?` wildcards,
//! `{a,b,c}` alternation, `[abc]` character alternation, `~` home
//! prefixes and `file:///` URLs) into the filesystem entries they
//! match, visiting each match through a callback.
//!
//! # Examples
//!
//! ```rust
//! use filespec::{MatchFlags, for_each_file};
//!
//! for_each_file("src/*.rs", MatchFlags::RETURN_FILES, |path, _record, _depth| {
//!     println!("{}", path.display());
//!     true
//! });
//! ```
//!
//! Enumeration behavior (what kinds of entries are reported, whether and
//! in which order directories are recursed, how symlinks are treated) is
//! controlled by [`MatchFlags`]. The filesystem itself is reached through
//! the [`FileSystem`] trait, so callers can substitute their own
//! implementation; [`for_each_file_with`] is the fully injected entry
//! point.
//!
//! Alongside enumeration the crate exposes the building blocks: the
//! [`matches`] wildcard comparison, the [`decompose`] path splitter and
//! the separator/drive/UNC predicates in [`paths`].

#![forbid(unsafe_code)]
#![forbid(unused_must_use)]

mod components;
mod enumerate;
mod expand;
mod format;
mod home;
mod platform;
mod wildcard;

pub mod paths;

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

pub use self::{
    components::{PathComponents, decompose},
    enumerate::{ErrorCallback, MatchCallback, MatchFlags},
    expand::for_each_file as for_each_file_with,
    format::{FormatPiece, expand_format, parse_format},
    home::expand_home,
    platform::{
        FileAttributes, FileSystem, FindRecord, FindScan, OsFileSystem, ReparseKind,
        update_find_record_from_file,
    },
    wildcard::matches,
};

/// Enumerate `pattern` on the host filesystem, visiting each match.
///
/// Enumeration errors are swallowed; use [`for_each_file_with`] to hear
/// about unenumerable directories or to inject a filesystem.
pub fn for_each_file(
    pattern: &str,
    flags: MatchFlags,
    mut on_match: impl FnMut(&Path, &FindRecord, u32) -> bool,
) -> bool {
    let fs = OsFileSystem::new();
    expand::for_each_file(&fs, pattern, flags, 0, &mut on_match, None)
}

/// Collect every match of `pattern` on the host filesystem.
pub fn collect_files(pattern: &str, flags: MatchFlags) -> Result<Vec<(PathBuf, FindRecord)>> {
    let fs = OsFileSystem::new();
    let mut found = Vec::new();

    let completed = expand::for_each_file(
        &fs,
        pattern,
        flags,
        0,
        &mut |path, record, _depth| {
            found.push((path.to_path_buf(), record.clone()));
            true
        },
        None,
    );

    if completed {
        Ok(found)
    } else {
        Err(anyhow!("enumeration of '{pattern}' was interrupted"))
    }
}
