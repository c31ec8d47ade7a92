//! Enumeration of a single concrete pattern.
//!
//! A concrete pattern has had every `{}`/`[]`/`~`/`file:///` construct
//! rewritten away by [`crate::expand`]; only `*` and `?` remain, and the
//! per-directory matching of those is delegated to the injected
//! [`FileSystem`]. This module owns everything else: phase planning,
//! recursion, dot-file and kind filtering, link policy, volume-root
//! synthesis and cancellation.

use std::{
    io,
    path::{MAIN_SEPARATOR, Path},
};

use bitflags::bitflags;

use crate::{
    expand,
    paths,
    platform::{FileAttributes, FileSystem, FindRecord, FindScan},
};

bitflags! {
    /// Behavior of a [`crate::for_each_file`] enumeration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MatchFlags: u32 {
        /// Report entries that are not directories.
        const RETURN_FILES = 1 << 0;
        /// Report directory entries.
        const RETURN_DIRECTORIES = 1 << 1;
        /// If the pattern names an existing directory, enumerate its
        /// contents rather than the directory itself.
        const DIRECTORY_CONTENTS = 1 << 2;
        /// Descend into subdirectories before reporting a directory's
        /// own matches (post-order).
        const RECURSE_BEFORE_RETURN = 1 << 3;
        /// Report a directory's own matches before descending
        /// (pre-order).
        const RECURSE_AFTER_RETURN = 1 << 4;
        /// Re-apply the pattern's leaf wildcard in every subdirectory
        /// when recursing; without this, recursion enumerates `*` and
        /// the caller filters.
        const RECURSE_PRESERVE_WILD = 1 << 5;
        /// Report the `.` and `..` entries.
        const INCLUDE_DOTFILES = 1 << 6;
        /// Never descend through symlinks or mount points.
        const NO_LINK_TRAVERSE = 1 << 7;
        /// Skip `{}`/`[]`/`~` expansion and enumerate the pattern as
        /// written.
        const BASIC_EXPANSION = 1 << 8;
    }
}

impl MatchFlags {
    fn recurses(self) -> bool {
        self.intersects(Self::RECURSE_BEFORE_RETURN | Self::RECURSE_AFTER_RETURN)
    }
}

/// Invoked once per reported entry with the absolute path, the entry's
/// record and the recursion depth. Returning false aborts the
/// enumeration.
pub type MatchCallback<'a> = dyn FnMut(&Path, &FindRecord, u32) -> bool + 'a;

/// Invoked when a directory cannot be enumerated, with the failing
/// search path, the error and the recursion depth. Returning false
/// aborts; returning true continues with the next phase.
pub type ErrorCallback<'a> = dyn FnMut(&Path, &io::Error, u32) -> bool + 'a;

/// Per-call working set.
///
/// Boxed so recursive enumeration keeps its stack frames small; the
/// buffers involved are path-sized.
struct EnumState {
    /// The pattern after `file:///` stripping and any depth-0 rewrite.
    effective: String,
    /// Byte offset just past the final separator of `effective`. A colon
    /// after a lone drive letter counts as a separator here.
    chars_to_final_slash: usize,
    final_slash_found: bool,
    /// Absolute path of the directory portion, without a trailing
    /// separator.
    parent_full_path: String,
}

/// Enumerate one concrete pattern, invoking `on_match` per match.
///
/// Returns false when the callback or error callback asked to stop, or
/// when cancellation was signaled.
pub(crate) fn enumerate(
    fs: &dyn FileSystem,
    spec: &str,
    flags: MatchFlags,
    depth: u32,
    on_match: &mut MatchCallback<'_>,
    mut on_error: Option<&mut ErrorCallback<'_>>,
) -> bool {
    let mut state = Box::new(EnumState {
        effective: spec.to_owned(),
        chars_to_final_slash: 0,
        final_slash_found: false,
        parent_full_path: String::new(),
    });

    if state
        .effective
        .get(..8)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("file:///"))
    {
        state.effective = state.effective[8..].to_owned();
    }

    // First-level rewrites: a directory pattern either turns into a
    // search of its contents, or (when recursing) into a full path so
    // the recursion criteria compose from an absolute prefix.
    if depth == 0 {
        if flags.contains(MatchFlags::DIRECTORY_CONTENTS) {
            if directory_exists(fs, &state.effective) {
                state.effective.push(MAIN_SEPARATOR);
                state.effective.push('*');
            }
        } else if flags.recurses() && directory_exists(fs, &state.effective) {
            match fs.full_path(&state.effective) {
                Ok(full) => state.effective = full,
                Err(_) => return false,
            }
        }
    }

    // Locate the boundary between the directory portion and the leaf
    // search criteria.
    let mut final_slash_found = false;
    let mut index = state.effective.len();
    {
        let bytes = state.effective.as_bytes();
        while index > 0 {
            index -= 1;
            if bytes[index] == b'\\' || bytes[index] == b'/' {
                index += 1;
                final_slash_found = true;
                break;
            }
            // x:name searches for "name" relative to drive x; the colon
            // plays the separator's role.
            if index == 1 && paths::is_drive_letter_with_colon(&state.effective) {
                index += 1;
                final_slash_found = true;
                break;
            }
        }
    }
    state.final_slash_found = final_slash_found;
    state.chars_to_final_slash = if final_slash_found { index } else { 0 };

    let phases = if flags.recurses() { 2 } else { 1 };

    state.parent_full_path = {
        let dir_part = if state.final_slash_found {
            let mut part = &state.effective[..state.chars_to_final_slash];
            // Trim the trailing separator, except where it is the whole
            // meaning of the string (a bare root).
            if (part.len() > 3 || !paths::is_drive_letter_with_colon_and_slash(part))
                && part.len() > 1
                && part.ends_with(paths::is_sep)
            {
                part = &part[..part.len() - 1];
            }
            part
        } else {
            "."
        };
        match fs.full_path(dir_part) {
            Ok(full) => full,
            Err(_) => return false,
        }
    };

    // Children are composed as parent + separator + name, so the parent
    // never keeps a trailing separator of its own.
    while state.parent_full_path.ends_with(paths::is_sep) {
        state.parent_full_path.pop();
    }

    let leaf: &str = if state.final_slash_found {
        &state.effective[state.chars_to_final_slash..]
    } else {
        &state.effective
    };

    let search_dir = format!("{}{}", state.parent_full_path, MAIN_SEPARATOR);

    let mut result = true;

    'phases: for phase in 0..phases {
        let recurse_phase = if flags.contains(MatchFlags::RECURSE_AFTER_RETURN)
            && !flags.contains(MatchFlags::RECURSE_BEFORE_RETURN)
        {
            phase == 1
        } else if flags.recurses() {
            // BEFORE, and BEFORE+AFTER, both recurse first.
            phase == 0
        } else {
            false
        };

        let preserve_wild =
            recurse_phase && flags.contains(MatchFlags::RECURSE_PRESERVE_WILD);

        let (search_wild, opened): (&str, io::Result<FindScan>) = if preserve_wild {
            // Visit every subdirectory so the leaf pattern can be
            // re-applied inside each one.
            ("*", fs.open_find(&search_dir, "*"))
        } else if leaf.is_empty() && paths::is_volume_root(&search_dir) {
            // Find primitives refuse bare volume roots; cook up the one
            // record the caller expects from the root's own attributes.
            let synthesized = fs.record_for_path(&search_dir, false).map(|mut record| {
                record.name.clear();
                Box::new(std::iter::once(Ok(record))) as FindScan
            });
            ("", synthesized)
        } else if leaf.is_empty() {
            // A pattern ending in a separator means everything within.
            ("*", fs.open_find(&search_dir, "*"))
        } else {
            (leaf, fs.open_find(&search_dir, leaf))
        };

        let scan = match opened {
            Ok(scan) => scan,
            Err(err) => {
                let search_path = format!("{search_dir}{search_wild}");
                if let Some(ec) = on_error.as_deref_mut() {
                    if !ec(Path::new(&search_path), &err, depth) {
                        result = false;
                        break 'phases;
                    }
                }
                continue 'phases;
            }
        };

        for item in scan {
            let record = match item {
                Ok(record) => record,
                Err(err) => {
                    let search_path = format!("{search_dir}{search_wild}");
                    if let Some(ec) = on_error.as_deref_mut() {
                        if !ec(Path::new(&search_path), &err, depth) {
                            result = false;
                            break;
                        }
                    }
                    continue;
                }
            };

            let dot_file = record.name == "." || record.name == "..";

            let mut report_object = true;
            if dot_file && !flags.contains(MatchFlags::INCLUDE_DOTFILES) {
                report_object = false;
            }
            if record.is_directory() {
                if !flags.contains(MatchFlags::RETURN_DIRECTORIES) {
                    report_object = false;
                }
            } else if !flags.contains(MatchFlags::RETURN_FILES) {
                report_object = false;
            }

            let is_link =
                flags.contains(MatchFlags::NO_LINK_TRAVERSE) && record.is_traversal_link();

            // Dot entries are never descended into, even when reported:
            // recursing through `.` or `..` cannot terminate.
            if !dot_file && record.is_directory() && recurse_phase && !is_link {
                let mut criteria = String::with_capacity(
                    state.chars_to_final_slash + record.name.len() + leaf.len() + 2,
                );
                criteria.push_str(&state.effective[..state.chars_to_final_slash]);
                criteria.push_str(&record.name);
                criteria.push(MAIN_SEPARATOR);
                if flags.contains(MatchFlags::RECURSE_PRESERVE_WILD) {
                    criteria.push_str(leaf);
                } else {
                    criteria.push('*');
                }

                // Back through the expander so operator rewrites keep
                // applying at every level.
                if !expand::for_each_file(
                    fs,
                    &criteria,
                    flags,
                    depth + 1,
                    on_match,
                    on_error.as_deref_mut(),
                ) {
                    result = false;
                    break;
                }
            }

            if report_object && !recurse_phase {
                let full_path = format!(
                    "{}{}{}",
                    state.parent_full_path, MAIN_SEPARATOR, record.name
                );
                if !on_match(Path::new(&full_path), &record, depth) {
                    result = false;
                    break;
                }
                if fs.cancelled() {
                    result = false;
                    break;
                }
            }
        }

        if !result {
            break 'phases;
        }
    }

    result
}

fn directory_exists(fs: &dyn FileSystem, path: &str) -> bool {
    fs.attributes(path)
        .is_some_and(|attributes| attributes.contains(FileAttributes::DIRECTORY))
}
