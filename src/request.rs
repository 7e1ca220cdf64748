//! A single build request: what to produce, from what, with which extras.

use crate::error::{BuildError, Result};
use std::path::{Path, PathBuf};

/// One named entry of a request: either a single path or a list of them.
/// The action receives the entry back in the same shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSpec {
    One(PathBuf),
    Many(Vec<PathBuf>),
}

impl PathSpec {
    pub fn paths(&self) -> &[PathBuf] {
        match self {
            PathSpec::One(path) => std::slice::from_ref(path),
            PathSpec::Many(paths) => paths,
        }
    }

    /// Apply `f` to every path, keeping the shape.
    pub(crate) fn try_map<E>(
        &self,
        mut f: impl FnMut(&Path) -> std::result::Result<PathBuf, E>,
    ) -> std::result::Result<PathSpec, E> {
        Ok(match self {
            PathSpec::One(path) => PathSpec::One(f(path)?),
            PathSpec::Many(paths) => {
                PathSpec::Many(paths.iter().map(|p| f(p)).collect::<std::result::Result<_, _>>()?)
            }
        })
    }
}

impl From<&str> for PathSpec {
    fn from(path: &str) -> Self {
        PathSpec::One(path.into())
    }
}
impl From<String> for PathSpec {
    fn from(path: String) -> Self {
        PathSpec::One(path.into())
    }
}
impl From<&Path> for PathSpec {
    fn from(path: &Path) -> Self {
        PathSpec::One(path.to_path_buf())
    }
}
impl From<PathBuf> for PathSpec {
    fn from(path: PathBuf) -> Self {
        PathSpec::One(path)
    }
}
impl<T: Into<PathBuf>> From<Vec<T>> for PathSpec {
    fn from(paths: Vec<T>) -> Self {
        PathSpec::Many(paths.into_iter().map(Into::into).collect())
    }
}

/// Insert or replace `name` in a small list of named entries.
fn upsert<V>(entries: &mut Vec<(String, V)>, name: String, value: V) {
    match entries.iter_mut().find(|(n, _)| *n == name) {
        Some((_, v)) => *v = value,
        None => entries.push((name, value)),
    }
}

/// The inputs and outputs of one build step.
///
/// Built up with the chained setters:
///
/// ```
/// let req = freshen::Request::new()
///     .target("dst", "out/copy.txt")
///     .source("src", "in.txt")
///     .dependency("config/")
///     .param("mode", "fast");
/// assert!(req.check_names().is_ok());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Request {
    pub(crate) targets: Vec<(String, PathSpec)>,
    pub(crate) sources: Vec<(String, PathSpec)>,
    pub(crate) dependencies: Vec<PathBuf>,
    pub(crate) params: Vec<(String, String)>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a file (or files) the action must produce.
    pub fn target(mut self, name: impl Into<String>, path: impl Into<PathSpec>) -> Self {
        upsert(&mut self.targets, name.into(), path.into());
        self
    }

    /// Declare a file (or files) the action reads; passed to it by name.
    pub fn source(mut self, name: impl Into<String>, path: impl Into<PathSpec>) -> Self {
        upsert(&mut self.sources, name.into(), path.into());
        self
    }

    /// Declare an input that isn't passed to the action.  Directories
    /// stand for every file beneath them.
    pub fn dependency(mut self, path: impl Into<PathBuf>) -> Self {
        self.dependencies.push(path.into());
        self
    }

    /// Pass a literal value through to the action.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        upsert(&mut self.params, name.into(), value.into());
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.targets
            .iter()
            .map(|(n, _)| n.as_str())
            .chain(self.sources.iter().map(|(n, _)| n.as_str()))
            .chain(self.params.iter().map(|(n, _)| n.as_str()))
    }

    /// Target, source and parameter names share one namespace when the
    /// action is invoked, so they must not overlap.
    pub fn check_names(&self) -> Result<()> {
        let mut seen = rustc_hash::FxHashSet::default();
        for name in self.names() {
            if !seen.insert(name) {
                return Err(BuildError::Config(format!(
                    "name {:?} is declared more than once across targets, sources and parameters",
                    name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_replace_within_a_map() {
        let req = Request::new().source("a", "x").source("a", "y");
        assert_eq!(req.sources, vec![("a".to_string(), PathSpec::from("y"))]);
    }

    #[test]
    fn overlapping_names_rejected() {
        let req = Request::new().target("out", "t").source("out", "s");
        assert!(matches!(req.check_names(), Err(BuildError::Config(_))));

        let req = Request::new().target("out", "t").param("out", "1");
        assert!(matches!(req.check_names(), Err(BuildError::Config(_))));

        let req = Request::new().target("out", "t").source("in", "s").param("x", "1");
        assert!(req.check_names().is_ok());
    }

    #[test]
    fn list_entries_keep_their_shape() {
        let spec = PathSpec::from(vec!["a", "b"]);
        assert_eq!(spec.paths().len(), 2);
        let mapped = spec
            .try_map(|p| Ok::<_, ()>(Path::new("/root").join(p)))
            .unwrap();
        assert_eq!(
            mapped,
            PathSpec::Many(vec![PathBuf::from("/root/a"), PathBuf::from("/root/b")])
        );
    }
}
