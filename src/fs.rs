//! File system queries: mtimes, directory expansion, and the engine's clock.

use crate::error::{BuildError, Result};
use filetime::FileTime;
use std::path::{Path, PathBuf};

/// MTime info gathered for a file.  This also models "file is absent".
/// It's not using an Option<> just because it makes the code using it easier
/// to follow.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MTime {
    Missing,
    Stamp(FileTime),
}

/// stat() an on-disk path, producing its MTime.  Directories count as
/// missing, as the engine only tracks files.
pub fn stat(path: &Path) -> Result<MTime> {
    Ok(match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => MTime::Missing,
        Ok(meta) => MTime::Stamp(FileTime::from_last_modification_time(&meta)),
        Err(err) => {
            if err.kind() == std::io::ErrorKind::NotFound {
                MTime::Missing
            } else {
                return Err(BuildError::io(path, err));
            }
        }
    })
}

/// Set both the access and modification time of `path` to `time`.
pub fn pin(path: &Path, time: FileTime) -> Result<()> {
    filetime::set_file_times(path, time, time).map_err(|err| BuildError::io(path, err))
}

/// Read "now" off the file system rather than the wall clock, by creating a
/// throwaway file in `dir` and asking for its mtime.  This keeps the
/// reference time in the same resolution and clock domain as the files we
/// compare it against.
pub fn fs_now(dir: Option<&Path>) -> Result<FileTime> {
    let probe = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir).map_err(|err| BuildError::io(dir, err))?,
        None => tempfile::NamedTempFile::new()
            .map_err(|err| BuildError::io(&std::env::temp_dir(), err))?,
    };
    let meta = probe
        .as_file()
        .metadata()
        .map_err(|err| BuildError::io(probe.path(), err))?;
    Ok(FileTime::from_last_modification_time(&meta))
}

/// Expand a dependency root: a directory stands for every file beneath it,
/// recursively, in a stable order.  Anything else, including a path that
/// doesn't exist, stands for itself.
pub fn expand(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            let at = err.path().unwrap_or(path).to_path_buf();
            BuildError::io(&at, err.into())
        })?;
        // Symlinks to directories are listed but, as with the walk itself,
        // not followed.
        if entry.file_type().is_dir() || entry.path().is_dir() {
            continue;
        }
        files.push(entry.into_path());
    }
    Ok(files)
}
