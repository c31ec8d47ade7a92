//! Decomposition of an absolute path into its named parts.

use crate::paths::{
    is_drive_letter_with_colon_and_slash, is_full_path_unc,
    is_prefixed_drive_letter_with_colon_and_slash,
};

/// The named parts of an absolute path, borrowed from the input string.
///
/// `None` means a part is not applicable to the path's shape; `Some("")`
/// means it is present but empty (a trailing-period extension, the file
/// name of a bare root). `drive_letter` and `share_name` never appear
/// together.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PathComponents<'a> {
    /// The natural path: trailing separators trimmed down to the volume
    /// root boundary.
    pub entire: &'a str,
    /// The path with every trailing separator removed.
    pub entire_without_trailing_slash: &'a str,
    /// Extension without its dot.
    pub extension: Option<&'a str>,
    /// File name without path or extension.
    pub base_name: Option<&'a str>,
    /// File name including extension.
    pub full_file_name: Option<&'a str>,
    /// Path from the volume root, excluding the volume name and the file
    /// name.
    pub path_from_root: Option<&'a str>,
    /// Drive letter hosting the path.
    pub drive_letter: Option<&'a str>,
    /// UNC share hosting the path, including the server.
    pub share_name: Option<&'a str>,
    /// Path to the parent of the object.
    pub parent: Option<&'a str>,
}

/// Split an absolute path into [`PathComponents`].
///
/// `long_form` declares that the input uses the `\\?\` escaped shape, so
/// the drive or UNC prefix is looked for behind that prefix.
pub fn decompose(path: &str, long_form: bool) -> PathComponents<'_> {
    let mut components = PathComponents::default();

    if path.is_empty() {
        return components;
    }

    // The natural path keeps the root's slash: C: and C:\ are different
    // objects, so trailing separators survive down to that boundary.
    let keep_trailing_before = if long_form {
        if is_prefixed_drive_letter_with_colon_and_slash(path) {
            "\\\\?\\C:\\".len()
        } else {
            0
        }
    } else if is_drive_letter_with_colon_and_slash(path) {
        "C:\\".len()
    } else {
        0
    };

    let bytes = path.as_bytes();
    let mut entire_len = path.len();
    while entire_len > keep_trailing_before.max(1) && sep_byte(bytes[entire_len - 1]) {
        entire_len -= 1;
    }
    let entire = &path[..entire_len];
    components.entire = entire;

    let mut no_slash_len = entire_len;
    while no_slash_len > 1 && sep_byte(bytes[no_slash_len - 1]) {
        no_slash_len -= 1;
    }
    components.entire_without_trailing_slash = &path[..no_slash_len];

    // Walk backwards for the file name and extension.
    let mut extension_found = false;
    let mut index = entire_len;
    while index > 0 {
        index -= 1;
        if bytes[index] == b'.' && !extension_found {
            extension_found = true;
            components.extension = Some(&entire[index + 1..]);
        }
        if sep_byte(bytes[index]) {
            let file_start = index + 1;
            let full_file_name = &entire[file_start..];
            components.full_file_name = Some(full_file_name);

            let base_len = match components.extension {
                Some(extension) => full_file_name.len() - extension.len() - 1,
                None => full_file_name.len(),
            };
            components.base_name = Some(&entire[file_start..file_start + base_len]);
            components.parent = Some(&entire[..index]);
            break;
        }
    }

    // Walk forwards for the drive letter or share.
    if long_form {
        if entire_len < 4 {
            return components;
        }

        if is_full_path_unc(entire) {
            apply_share(&mut components, entire, "\\\\?\\UNC\\".len());
        } else if is_drive_letter_with_colon_and_slash(&entire[4..]) {
            components.drive_letter = Some(&entire[4..5]);
            apply_path_from_root(&mut components, entire, 6);
        }
    } else if is_drive_letter_with_colon_and_slash(entire) {
        components.drive_letter = Some(&entire[..1]);
        apply_path_from_root(&mut components, entire, 2);
    } else if sep_byte(bytes[0]) && entire_len > 1 && sep_byte(bytes[1]) {
        apply_share(&mut components, entire, 2);
    } else if sep_byte(bytes[0]) {
        // A rooted path with no volume name.
        apply_path_from_root(&mut components, entire, 0);
    }

    components
}

fn sep_byte(b: u8) -> bool {
    b == b'\\' || b == b'/'
}

/// Record the path-from-root slice, which runs from the volume prefix to
/// the separator in front of the file name.
fn apply_path_from_root<'a>(
    components: &mut PathComponents<'a>,
    entire: &'a str,
    start: usize,
) {
    let end = match components.full_file_name {
        Some(full_file_name) => entire.len() - full_file_name.len() - 1,
        None => entire.len(),
    };
    components.path_from_root = Some(&entire[start..end]);
}

/// Locate a `server\share` prefix starting at `start` and apply the
/// share-aware component rules.
fn apply_share<'a>(components: &mut PathComponents<'a>, entire: &'a str, start: usize) {
    let bytes = entire.as_bytes();
    let mut end_of_server_found = false;
    let mut index = start;
    while index < entire.len() {
        if sep_byte(bytes[index]) {
            if end_of_server_found {
                break;
            }
            end_of_server_found = true;
        }
        index += 1;
    }

    if index == entire.len() && !end_of_server_found {
        // Just a server name; there is no share to speak of.
        return;
    }

    components.share_name = Some(&entire[..index]);

    let share_len = index;
    let file_len = components.full_file_name.map_or(0, str::len);

    if share_len + file_len < entire.len() {
        components.path_from_root = Some(&entire[share_len..entire.len() - file_len - 1]);
    } else if share_len + file_len > entire.len() {
        // The supposed file name was really the share's own trailing
        // component.
        components.full_file_name = None;
        components.base_name = None;
        components.extension = None;
    }
}
