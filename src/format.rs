//! `$VARIABLE$` format strings for presenting decomposed paths.

use std::sync::LazyLock;

use parsy::{Parser, ParsingError, char, choice, filter};

use crate::components::PathComponents;

/// One piece of a parsed format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatPiece {
    /// Text copied through untouched.
    Literal(String),
    /// A `$NAME$` variable reference.
    Variable(String),
}

/// Parse a format string into its pieces.
///
/// A variable is a `$`-delimited alphanumeric name; anything else,
/// including a `$` that opens no variable, is literal text.
static FORMAT_PARSER: LazyLock<Box<dyn Parser<Vec<FormatPiece>> + Send + Sync>> =
    LazyLock::new(|| {
        let variable = char('$')
            .ignore_then(
                filter(|c| c.is_ascii_alphanumeric())
                    .repeated_into_container::<String>()
                    .at_least(1),
            )
            .then_ignore(char('$'))
            .map(FormatPiece::Variable);

        let literal = filter(|c| c != '$')
            .repeated_into_container::<String>()
            .at_least(1)
            .map(FormatPiece::Literal);

        let lone_dollar = char('$').map(|_| FormatPiece::Literal(String::from("$")));

        Box::new(
            choice::<FormatPiece, _>((variable, literal, lone_dollar))
                .repeated_into_vec()
                .full(),
        )
    });

/// Parse a format string into [`FormatPiece`]s.
pub fn parse_format(format: &str) -> Result<Vec<FormatPiece>, ParsingError> {
    FORMAT_PARSER.parse_str(format).map(|parsed| parsed.data)
}

/// Expand parsed format pieces against a decomposed path.
///
/// Unknown variable names are reproduced literally so typos remain
/// visible in the output.
pub fn expand_format(pieces: &[FormatPiece], components: &PathComponents<'_>) -> String {
    let mut out = String::new();

    for piece in pieces {
        match piece {
            FormatPiece::Literal(text) => out.push_str(text),
            FormatPiece::Variable(name) => match name.as_str() {
                "PATH" => out.push_str(components.entire),
                "PATHNOSLASH" => out.push_str(components.entire_without_trailing_slash),
                "DRIVE" => out.push_str(components.drive_letter.unwrap_or("")),
                "SHARE" => out.push_str(components.share_name.unwrap_or("")),
                "DIR" => out.push_str(components.path_from_root.unwrap_or("")),
                "PARENT" => out.push_str(components.parent.unwrap_or("")),
                "FILE" => out.push_str(components.full_file_name.unwrap_or("")),
                "BASE" => out.push_str(components.base_name.unwrap_or("")),
                "EXT" => out.push_str(components.extension.unwrap_or("")),
                _ => {
                    out.push('$');
                    out.push_str(name);
                    out.push('$');
                }
            },
        }
    }

    out
}
