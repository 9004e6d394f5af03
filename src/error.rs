//! Domain error types for the edit-to-plan pipeline.
//!
//! `VidirError` classifies the failure kinds from the error-handling table:
//! usage errors, listing-parse errors, editor failures and executor
//! aborts. Delete failures are deliberately not represented here: per
//! policy they never abort the run, they only flip a "had errors" flag
//! that the caller folds into the final exit code.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VidirError {
    #[error("vidir: unknown option: --{0}")]
    UnknownOption(String),

    #[error("vidir: {0}")]
    ListingParse(#[from] ListingParseError),

    #[error("vidir: editor exited with a failure status")]
    EditorFailed,

    #[error("vidir: could not launch or use the editor: {0}")]
    TempFileIo(#[source] std::io::Error),

    #[error("vidir: could not read stdin: {0}")]
    StdinRead(#[source] std::io::Error),

    #[error("vidir: could not rename {src} -> {dst}: {source}")]
    RenameFailed {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("vidir: could not create directory {path}: {source}")]
    MkdirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ListingParseError {
    #[error("line {line} has no TAB separator")]
    MissingTab { line: usize },
    #[error("line {line} has a malformed index")]
    BadIndex { line: usize },
    #[error("line {line} has an index that overflows")]
    IndexOverflow { line: usize },
    #[error("index {index} appears more than once")]
    DuplicateIndex { index: usize },
    #[error("index {index} is out of range (expected 1..={max})")]
    IndexOutOfRange { index: usize, max: usize },
}
