//! Temp-File & Editor Lifecycle (§4.7).
//!
//! The temp file is created, written, and closed before the editor opens
//! it (the editor needs the file closed while it runs, per the
//! platform-abstraction design note), then reopened read-only after the
//! editor exits. Editor choice is `VISUAL` > `EDITOR` > a platform
//! default. A non-zero exit status or a signal kill aborts before the
//! temp file is ever reparsed.
//!
//! The interaction with the actual subprocess is injected as a closure
//! (`edit`), the same shape the teacher crate and `rnr::editor` use to
//! keep this testable without spawning a real editor.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::process::Command;

use tempfile::NamedTempFile;

use crate::error::VidirError;

#[cfg(windows)]
const PLATFORM_DEFAULT_EDITOR: &str = "notepad";

#[cfg(not(windows))]
const PLATFORM_DEFAULT_EDITOR: &str = "vi";

/// `VISUAL` > `EDITOR` > platform default.
pub fn resolve_editor() -> String {
    std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .unwrap_or_else(|_| PLATFORM_DEFAULT_EDITOR.to_string())
}

/// Write `content` to a fresh temp file, close it, run `editor` on its
/// path, wait for it, and return the file's content afterward.
pub fn edit_in_temp_file(content: &str, editor: &str) -> Result<String, VidirError> {
    let path = write_temp_file(content)?;
    run_editor(editor, &path)?;
    read_temp_file(&path)
}

fn write_temp_file(content: &str) -> Result<std::path::PathBuf, VidirError> {
    let mut file = NamedTempFile::new().map_err(VidirError::TempFileIo)?;
    file.write_all(content.as_bytes())
        .map_err(VidirError::TempFileIo)?;
    // `keep()` detaches the file from its drop-time deletion so it survives
    // while the editor subprocess, which needs the file closed, runs.
    let (_, path) = file.keep().map_err(|e| VidirError::TempFileIo(e.error))?;
    Ok(path)
}

fn run_editor(editor: &str, path: &Path) -> Result<(), VidirError> {
    let status = Command::new(editor)
        .arg(path)
        .status()
        .map_err(VidirError::TempFileIo)?;
    if !status.success() {
        let _ = std::fs::remove_file(path);
        return Err(VidirError::EditorFailed);
    }
    Ok(())
}

fn read_temp_file(path: &Path) -> Result<String, VidirError> {
    let mut content = String::new();
    let result = File::open(path).and_then(|mut f| f.read_to_string(&mut content));
    let _ = std::fs::remove_file(path);
    result.map_err(VidirError::TempFileIo)?;
    Ok(content)
}
