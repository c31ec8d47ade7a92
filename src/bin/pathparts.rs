//! Resolve a path and print its decomposed components.

use std::process;

use anyhow::{Result, anyhow, bail};
use lexopt::{Arg, Parser};

use filespec::{FileSystem, OsFileSystem, decompose, expand_format, parse_format, paths};

const HELP: &str = "\
Converts relative paths into decomposable full paths.

Usage: pathparts [-e] [-f <fmtstring>] <path>

  -e             Use an escaped long path
  -f <fmtstring> Output format (default: $PATH$)

Format specifiers:
  $BASE$         The file name without any path or extension
  $DIR$          The directory hosting the file
  $DRIVE$        The drive letter hosting the file
  $EXT$          The file extension
  $FILE$         The file name including extension
  $PARENT$       The path to the parent of the file
  $PATH$         The complete natural path to the file
  $PATHNOSLASH$  The complete path without trailing slashes
  $SHARE$        The UNC share hosting the file
";

fn main() {
    if let Err(err) = run() {
        eprintln!("pathparts: {err:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut long_form = false;
    let mut format = String::from("$PATH$");
    let mut target: Option<String> = None;

    let mut parser = Parser::from_env();
    while let Some(arg) = parser.next()? {
        match arg {
            Arg::Short('h') | Arg::Long("help") => {
                print!("{HELP}");
                return Ok(());
            }
            Arg::Short('e') | Arg::Long("escaped") => long_form = true,
            Arg::Short('f') | Arg::Long("format") => {
                format = parser
                    .value()?
                    .into_string()
                    .map_err(|_| anyhow!("format string is not valid unicode"))?;
            }
            Arg::Value(value) => {
                target = Some(
                    value
                        .into_string()
                        .map_err(|_| anyhow!("path is not valid unicode"))?,
                );
            }
            arg => return Err(arg.unexpected().into()),
        }
    }

    let Some(target) = target else {
        bail!("missing argument");
    };

    let pieces =
        parse_format(&format).map_err(|err| anyhow!("invalid format string: {err:?}"))?;

    let mut full_path = OsFileSystem::new().full_path(&target)?;
    if long_form {
        full_path = paths::to_long_form(&full_path);
    }

    let components = decompose(&full_path, long_form);
    println!("{}", expand_format(&pieces, &components));

    Ok(())
}
