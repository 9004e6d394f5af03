//! Path Collector (§4.1).
//!
//! Normalises argument parsing: `-` means "also read paths from stdin",
//! `--verbose` turns on narration, any other `--something` is a fatal
//! usage error, and everything else is a positional path kept in argument
//! order. No paths and no `-` defaults to a single path: `.`.
//!
//! This is hand-rolled rather than built on a declarative arg-parsing
//! crate: the `-` token needs sentinel meaning ("read more paths from
//! stdin") that doesn't map onto a flag or a positional value in the
//! usual derive model, and the unknown-option message is part of the
//! external contract verbatim (§6), which a generic parser would not
//! reproduce. The shape follows the argument loop in the original
//! `vidir.c` prototype (`examples/original_source/vidir.c`), ported to
//! return a `Result` instead of trapping.

use std::io::BufRead;

use crate::error::VidirError;

pub struct Config {
    pub verbose: bool,
    pub paths: Vec<String>,
}

/// Parse `args` (excluding argv[0]) and read stdin through `stdin` when `-`
/// is present among them.
pub fn collect(args: &[String], stdin: impl BufRead) -> Result<Config, VidirError> {
    let mut verbose = false;
    let mut read_stdin = false;
    let mut paths = Vec::new();

    for arg in args {
        if arg == "-" {
            read_stdin = true;
        } else if let Some(name) = arg.strip_prefix("--") {
            if name == "verbose" {
                verbose = true;
            } else {
                return Err(VidirError::UnknownOption(name.to_string()));
            }
        } else {
            paths.push(arg.clone());
        }
    }

    if read_stdin {
        for line in stdin.lines() {
            let line = line.map_err(VidirError::StdinRead)?;
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                paths.push(trimmed.to_string());
            }
        }
    }

    if paths.is_empty() {
        paths.push(".".to_string());
    }

    Ok(Config { verbose, paths })
}
