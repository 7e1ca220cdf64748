//! Errors surfaced by a build request.

use std::path::{Path, PathBuf};

/// Why a build request was aborted.
///
/// Every kind is fatal to the request that raised it; the engine never
/// retries.  Registry bookkeeping done before the failure is kept.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The request itself is malformed, e.g. a name is used both as a target
    /// and as a source.  Detected before touching the disk.
    #[error("configuration error: {0}")]
    Config(String),

    /// A source or dependency did not exist when its mtime was needed.
    #[error("missing input {}", .0.display())]
    MissingFile(PathBuf),

    /// A target path was already registered with the engine as an input.
    #[error("target {} is already used as a source or dependency", .0.display())]
    Conflict(PathBuf),

    /// The action failed, or it returned normally without leaving a fresh
    /// target behind.
    #[error("build failed: {0:#}")]
    Failed(anyhow::Error),

    /// An input's mtime is later than the engine's reference time.
    /// Only raised with `Options::reject_future_mtimes`.
    #[error("input {} is newer than the build start", .0.display())]
    FutureTimestamp(PathBuf),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        BuildError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;
