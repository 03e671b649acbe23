//! File tool backends: read, write, edit, glob, grep, media.

mod glob_tool;
mod grep;
mod media;
mod read;
mod replace;
mod write;

pub use self::glob_tool::GlobFiles;
pub use self::grep::Grep;
pub use self::media::ReadMediaFile;
pub use self::read::ReadFile;
pub use self::replace::StrReplaceFile;
pub use self::write::WriteFile;

use crate::context::ToolContext;
use crate::tools::output::ToolFailure;
use crate::types::{Error, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Map an I/O error on `path` (as the agent wrote it) to a failure.
pub(crate) fn io_failure(path: &str, err: std::io::Error) -> ToolFailure {
    match err.kind() {
        ErrorKind::NotFound => Error::not_found(format!("`{}` does not exist", path)),
        ErrorKind::PermissionDenied => {
            Error::permission_denied(format!("cannot access `{}`", path))
        }
        _ => Error::Io(err),
    }
    .into()
}

/// Where a write or edit lands once symlinks are followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WriteTarget {
    pub path: PathBuf,
    pub outside_work_dir: bool,
}

/// Resolve a path that is about to be modified.
///
/// A target outside work_dir must have been named by an absolute path. A
/// relative path that escapes (through `..` or a symlink) is rejected.
pub(crate) fn write_target(ctx: &ToolContext, raw: &str) -> Result<WriteTarget> {
    if raw.is_empty() {
        return Err(Error::validation("File path cannot be empty."));
    }
    let path = ctx.real_path(raw)?;
    let outside_work_dir = !path.starts_with(ctx.work_dir());
    if outside_work_dir && !Path::new(raw).is_absolute() {
        return Err(Error::validation(format!(
            "`{}` is not an absolute path. You must provide an absolute path \
             to modify a file outside the working directory.",
            raw
        )));
    }
    Ok(WriteTarget {
        path,
        outside_work_dir,
    })
}

/// Leading bytes of common binary and media formats.
const BINARY_SIGNATURES: &[&[u8]] = &[
    b"\x89PNG",
    b"\xff\xd8\xff",
    b"GIF87a",
    b"GIF89a",
    b"RIFF",
    b"PK\x03\x04",
    b"PK\x05\x06",
    b"%PDF",
    b"\x7fELF",
    b"MZ",
    b"\x00\x00\x00\x1cftyp",
    b"\x00\x00\x00\x20ftyp",
];

/// True when `header`, the first bytes of a file, looks like binary data.
pub(crate) fn looks_binary(header: &[u8]) -> bool {
    BINARY_SIGNATURES.iter().any(|sig| header.starts_with(sig)) || header.contains(&0)
}

/// Display `path` relative to `base` when possible.
pub(crate) fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

pub(crate) async fn run_blocking<T, F>(f: F) -> std::result::Result<T, ToolFailure>
where
    F: FnOnce() -> std::result::Result<T, ToolFailure> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ToolFailure::from(Error::internal(format!("blocking task failed: {}", e))))?
}
