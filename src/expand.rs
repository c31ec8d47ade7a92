//! Pattern expansion: the public enumeration entry point.
//!
//! Patterns may carry brace alternation (`{a,b,c}`), single-character
//! alternation (`[abc]`) and a `~` home prefix on top of the `*`/`?`
//! wildcards. This module rewrites the alternation operators into
//! concrete sub-patterns, feeding each one to [`crate::enumerate`]; all
//! pattern rewriting lives here, so the enumerator re-enters through
//! this entry point when it recurses.

use crate::{
    enumerate::{ErrorCallback, MatchCallback, MatchFlags, enumerate},
    home,
    platform::FileSystem,
};

/// Invoke `on_match` for every filesystem entry matching `spec`.
///
/// `depth` is the recursion depth; outside callers pass 0. `on_error`,
/// when present, hears about directories that could not be enumerated
/// and chooses whether to continue. Returns false when a callback asked
/// to stop or cancellation was signaled.
///
/// Unmatched `{` or `[` operators are not an error: the pattern is
/// forwarded as written and matched literally.
pub fn for_each_file(
    fs: &dyn FileSystem,
    spec: &str,
    flags: MatchFlags,
    depth: u32,
    on_match: &mut MatchCallback<'_>,
    mut on_error: Option<&mut ErrorCallback<'_>>,
) -> bool {
    if flags.contains(MatchFlags::BASIC_EXPANSION) {
        return enumerate(fs, spec, flags, depth, on_match, on_error);
    }

    let Some(operator_index) = spec.find(['{', '[']) else {
        // No operators left: expand any home prefix and enumerate.
        if let Some(expanded) = home::expand_home(fs, spec) {
            return enumerate(fs, &expanded, flags, depth, on_match, on_error);
        }
        return enumerate(fs, spec, flags, depth, on_match, on_error);
    };

    let single_char_mode = spec.as_bytes()[operator_index] == b'[';
    let body_start = operator_index + 1;

    let close_index = if single_char_mode {
        spec[body_start..].find(']').map(|i| body_start + i)
    } else {
        find_matching_brace(spec, operator_index)
    };

    let Some(close_index) = close_index else {
        return enumerate(fs, spec, flags, depth, on_match, on_error);
    };

    let before = &spec[..operator_index];
    let inside = &spec[body_start..close_index];
    let after = &spec[close_index + 1..];

    if single_char_mode {
        // [abc] substitutes one character at a time.
        for c in inside.chars() {
            let rewritten = format!("{before}{c}{after}");
            if !for_each_file(
                fs,
                &rewritten,
                flags,
                depth,
                on_match,
                on_error.as_deref_mut(),
            ) {
                return false;
            }
        }
    } else {
        for alternative in split_alternatives(inside) {
            let rewritten = format!("{before}{alternative}{after}");
            if !for_each_file(
                fs,
                &rewritten,
                flags,
                depth,
                on_match,
                on_error.as_deref_mut(),
            ) {
                return false;
            }
        }
    }

    true
}

/// Index of the `}` matching the `{` at `open_index`, honoring nesting.
fn find_matching_brace(spec: &str, open_index: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in spec[open_index..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(open_index + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split a brace body on its top-level commas. Commas inside nested
/// `{}` groups or `[]` classes belong to their alternative.
fn split_alternatives(inside: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut brace_depth = 0usize;
    let mut in_bracket = false;

    for (i, c) in inside.char_indices() {
        match c {
            '[' => in_bracket = true,
            ']' => in_bracket = false,
            '{' if !in_bracket => brace_depth += 1,
            '}' if !in_bracket => brace_depth = brace_depth.saturating_sub(1),
            ',' if !in_bracket && brace_depth == 0 => {
                parts.push(&inside[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    parts.push(&inside[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::{find_matching_brace, split_alternatives};

    #[test]
    fn brace_matching_honors_nesting() {
        assert_eq!(find_matching_brace("{a,b}", 0), Some(4));
        assert_eq!(find_matching_brace("{a,{b,c}}", 0), Some(8));
        assert_eq!(find_matching_brace("x{a", 1), None);
    }

    #[test]
    fn alternatives_split_at_top_level_only() {
        assert_eq!(split_alternatives("a,b,c"), ["a", "b", "c"]);
        assert_eq!(split_alternatives("a,{b,c}"), ["a", "{b,c}"]);
        assert_eq!(split_alternatives("a,[b,c]"), ["a", "[b,c]"]);
        assert_eq!(split_alternatives(""), [""]);
    }
}
