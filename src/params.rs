//! The named parameters an action is invoked with.

use std::path::{Path, PathBuf};

/// The value bound to one parameter name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// A target or source declared as a single path.
    Path(PathBuf),
    /// A target or source declared as a list of paths.
    Paths(Vec<PathBuf>),
    /// An extra parameter, passed through untouched.
    Literal(String),
}

impl Value {
    /// Render as text for substitution into a command line: lists are
    /// space separated.
    pub fn render(&self) -> String {
        match self {
            Value::Path(path) => path.display().to_string(),
            Value::Paths(paths) => paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" "),
            Value::Literal(s) => s.clone(),
        }
    }

    /// Render as separate command line arguments: one per list entry.
    pub fn render_args(&self) -> Vec<String> {
        match self {
            Value::Paths(paths) => paths.iter().map(|p| p.display().to_string()).collect(),
            _ => vec![self.render()],
        }
    }
}

/// Target, source and extra parameters merged into one set, keyed by name.
/// Names are unique; the request was checked before this is built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, Value)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, replacing any earlier binding.
    pub fn insert(&mut self, name: &str, value: Value) {
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value,
            None => self.0.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// The single path bound to `name`, if it was declared as one.
    pub fn path(&self, name: &str) -> Option<&Path> {
        match self.get(name)? {
            Value::Path(path) => Some(path),
            _ => None,
        }
    }

    /// All paths bound to `name`, whichever shape it was declared in.
    pub fn paths(&self, name: &str) -> &[PathBuf] {
        match self.get(name) {
            Some(Value::Path(path)) => std::slice::from_ref(path),
            Some(Value::Paths(paths)) => paths,
            _ => &[],
        }
    }

    /// The literal bound to `name`, for extra parameters.
    pub fn literal(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            Value::Literal(s) => Some(s),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
