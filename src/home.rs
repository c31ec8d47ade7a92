//! `~` prefix expansion.

use crate::{paths::is_sep, platform::FileSystem};

/// Expand a leading `~` or `~user` into the matching home directory.
///
/// Returns `None` when the pattern (ignoring leading whitespace) does not
/// start with `~`, or when the named user has no known home; in both
/// cases the caller keeps the pattern as written.
pub fn expand_home(fs: &dyn FileSystem, spec: &str) -> Option<String> {
    let spec = spec.trim_start();
    let rest = spec.strip_prefix('~')?;

    // Everything up to the first separator names the user.
    let user_len = rest.find(is_sep).unwrap_or(rest.len());
    let (user, remainder) = rest.split_at(user_len);

    let home = fs.home_for(user)?;
    Some(format!("{home}{remainder}"))
}
