//! The node registry: every file path an engine has seen, and in which role.
//!
//! A path that has been consumed (as a source or dependency) can never be
//! produced later by the same engine.  That rule is what keeps a sequence of
//! requests from forming a cycle, e.g. building `b` from `a` and then `a`
//! from `b`.  A target may only be declared again by an identical
//! declaration, so a repeated request can find it fresh but a different
//! request can't claim it.

use crate::canon::canon_path;
use crate::error::{BuildError, Result};
use crate::fs::{stat, MTime};
use filetime::FileTime;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// How a target was declared: the name it was bound to, and the canonical
/// sources and dependency roots of the request that declared it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Producer {
    pub name: String,
    pub inputs: BTreeSet<PathBuf>,
}

#[derive(Debug, Default)]
pub struct Registry {
    /// Every canonical path registered, in any role.
    known: FxHashSet<PathBuf>,
    /// Paths registered as sources or dependencies.
    inputs: FxHashSet<PathBuf>,
    /// Paths registered as targets, with the declaration that claimed them.
    targets: FxHashMap<PathBuf, Producer>,
}

pub(crate) fn canon(path: &Path) -> Result<PathBuf> {
    canon_path(path).map_err(|err| BuildError::io(path, err))
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register already expanded input paths (sources or dependency files),
    /// returning their canonical forms.
    pub fn add_inputs(&mut self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        paths.iter().map(|path| self.add_input(path)).collect()
    }

    pub fn add_input(&mut self, path: &Path) -> Result<PathBuf> {
        let path = canon(path)?;
        if path.is_dir() {
            return Err(BuildError::Config(format!(
                "source {} is a directory",
                path.display()
            )));
        }
        self.inputs.insert(path.clone());
        self.known.insert(path.clone());
        Ok(path)
    }

    /// Register a target path.  Fails if the path was ever registered as an
    /// input, or was claimed as a target by a different declaration.
    /// Creates the target's parent directory so the action can write it.
    pub fn add_target(&mut self, path: &Path, producer: &Producer) -> Result<PathBuf> {
        let path = canon(path)?;
        if self.inputs.contains(&path) {
            return Err(BuildError::Conflict(path));
        }
        if let Some(prior) = self.targets.get(&path) {
            if prior != producer {
                tracing::debug!(path = %path.display(), ?prior, "target declared differently before");
                return Err(BuildError::Conflict(path));
            }
        }
        if path.is_dir() {
            return Err(BuildError::Config(format!(
                "target {} is a directory",
                path.display()
            )));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| BuildError::io(parent, err))?;
        }
        self.targets.insert(path.clone(), producer.clone());
        self.known.insert(path.clone());
        Ok(path)
    }

    pub fn is_known(&self, path: &Path) -> bool {
        canon_path(path).map_or(false, |p| self.known.contains(&p))
    }

    pub fn is_target(&self, path: &Path) -> bool {
        canon_path(path).map_or(false, |p| self.targets.contains_key(&p))
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

/// The newest mtime among `paths`, or None for an empty list.
/// Every path must exist.
pub fn latest_mtime(paths: &[PathBuf]) -> Result<Option<FileTime>> {
    let mut latest = None;
    for path in paths {
        let mtime = match stat(path)? {
            MTime::Stamp(t) => t,
            MTime::Missing => return Err(BuildError::MissingFile(path.clone())),
        };
        tracing::trace!(path = %path.display(), ?mtime, "stat");
        latest = latest.max(Some(mtime));
    }
    Ok(latest)
}

/// Whether `target` exists and is at least as new as `baseline`.
pub fn is_fresh(target: &Path, baseline: Option<FileTime>) -> Result<bool> {
    Ok(match stat(target)? {
        MTime::Missing => false,
        MTime::Stamp(mtime) => baseline.map_or(true, |b| mtime >= b),
    })
}
