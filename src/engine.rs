//! The build orchestrator: decides whether a request is stale and, if so,
//! runs its action and checks the result.

use crate::action::Action;
use crate::error::{BuildError, Result};
use crate::fs;
use crate::params::{Params, Value};
use crate::registry::{canon, is_fresh, latest_mtime, Producer, Registry};
use crate::request::{PathSpec, Request};
use filetime::FileTime;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Engine configuration.
#[derive(Clone, Debug, Default)]
pub struct Options {
    /// Where to create the file used to read the file system's clock.
    /// Defaults to the system temp dir; point it at the build tree when that
    /// lives on a different file system.
    pub scratch_dir: Option<PathBuf>,
    /// Fail with `BuildError::FutureTimestamp` when an input is newer than
    /// the engine's reference time.
    pub reject_future_mtimes: bool,
    /// When the action itself fails, delete whatever targets it left behind.
    /// Off by default: a failed action's outputs are left untouched.
    pub remove_failed_targets: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Status {
    /// Every target was already up to date; the action didn't run.
    Fresh,
    /// The action ran and produced fresh targets.
    Built,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: Status,
    /// Canonical paths of every target of the request.
    pub targets: BTreeSet<PathBuf>,
}

/// An incremental build engine.
///
/// The engine remembers every path passed to it for as long as it lives, and
/// refuses to produce a file it has previously consumed.  Separate engines
/// share nothing.
#[derive(Debug)]
pub struct Engine {
    registry: Registry,
    /// "Now" as of engine creation, read off the file system.  Every
    /// successfully built target gets this as its mtime.
    now: FileTime,
    options: Options,
}

fn to_value(spec: PathSpec) -> Value {
    match spec {
        PathSpec::One(path) => Value::Path(path),
        PathSpec::Many(paths) => Value::Paths(paths),
    }
}

impl Engine {
    pub fn new() -> Result<Self> {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Result<Self> {
        let now = fs::fs_now(options.scratch_dir.as_deref())?;
        tracing::debug!(?now, "reference time");
        Ok(Engine {
            registry: Registry::new(),
            now,
            options,
        })
    }

    pub fn reference_time(&self) -> FileTime {
        self.now
    }

    pub fn is_known(&self, path: &Path) -> bool {
        self.registry.is_known(path)
    }

    pub fn is_target(&self, path: &Path) -> bool {
        self.registry.is_target(path)
    }

    /// Build the targets of `req` with `action` if any of them is missing
    /// or older than the newest source or dependency.
    ///
    /// Inputs are registered and stat()ed before targets are registered, so
    /// a missing source is reported ahead of a target conflict.  A target
    /// can be declared again only with the same name, sources and
    /// dependencies; any other request claiming it is a conflict.  A failed
    /// action's partial outputs are kept unless
    /// `Options::remove_failed_targets` is set.
    ///
    /// Built targets are stamped with the engine's reference time, so an
    /// input modified after the engine was created keeps the targets built
    /// from it stale for the rest of the engine's life: every later request
    /// reruns the action.  Create a new engine to pick up such edits.
    pub fn build(&mut self, action: &mut Action, req: &Request) -> Result<Outcome> {
        req.check_names()?;
        if let Action::Command(template) = action {
            template.check(req.names())?;
        }

        let mut inputs = Vec::new();
        let mut declared = BTreeSet::new();
        for dep in &req.dependencies {
            declared.insert(canon(dep)?);
            let files = fs::expand(dep)?;
            inputs.extend(self.registry.add_inputs(&files)?);
        }
        let mut sources = Vec::with_capacity(req.sources.len());
        for (name, spec) in &req.sources {
            let spec = spec.try_map(|p| self.registry.add_input(p))?;
            inputs.extend(spec.paths().iter().cloned());
            declared.extend(spec.paths().iter().cloned());
            sources.push((name, spec));
        }

        let baseline = latest_mtime(&inputs)?;
        if self.options.reject_future_mtimes {
            self.check_not_future(&inputs, baseline)?;
        }

        let mut targets = Vec::with_capacity(req.targets.len());
        let mut target_files = BTreeSet::new();
        for (name, spec) in &req.targets {
            let producer = Producer {
                name: name.clone(),
                inputs: declared.clone(),
            };
            let spec = spec.try_map(|p| self.registry.add_target(p, &producer))?;
            target_files.extend(spec.paths().iter().cloned());
            targets.push((name, spec));
        }

        let mut fresh = true;
        for target in &target_files {
            if !is_fresh(target, baseline)? {
                fresh = false;
                break;
            }
        }
        if fresh {
            tracing::debug!(targets = ?target_files, "skipping, up to date");
            return Ok(Outcome {
                status: Status::Fresh,
                targets: target_files,
            });
        }

        let mut params = Params::new();
        for (name, spec) in targets.into_iter().chain(sources) {
            params.insert(name, to_value(spec));
        }
        for (name, value) in &req.params {
            params.insert(name, Value::Literal(value.clone()));
        }

        tracing::info!(targets = ?target_files, "building");
        if let Err(err) = action.run(&params) {
            tracing::error!(targets = ?target_files, "build action failed: {:#}", err);
            if self.options.remove_failed_targets {
                if let Err(remove_err) = remove_targets(&target_files) {
                    tracing::error!("removing partial output: {}", remove_err);
                }
            }
            return Err(BuildError::Failed(err));
        }

        for target in &target_files {
            if !is_fresh(target, baseline)? {
                return Err(BuildError::Failed(anyhow::anyhow!(
                    "build did not produce a fresh target {}",
                    target.display()
                )));
            }
        }
        for target in &target_files {
            fs::pin(target, self.now)?;
        }

        Ok(Outcome {
            status: Status::Built,
            targets: target_files,
        })
    }

    fn check_not_future(&self, inputs: &[PathBuf], baseline: Option<FileTime>) -> Result<()> {
        if baseline.map_or(true, |b| b <= self.now) {
            return Ok(());
        }
        for input in inputs {
            if let fs::MTime::Stamp(mtime) = fs::stat(input)? {
                if mtime > self.now {
                    return Err(BuildError::FutureTimestamp(input.clone()));
                }
            }
        }
        Ok(())
    }
}

fn remove_targets(targets: &BTreeSet<PathBuf>) -> Result<()> {
    for target in targets {
        match std::fs::remove_file(target) {
            Ok(()) => tracing::debug!(path = %target.display(), "removed partial output"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(BuildError::io(target, err)),
        }
    }
    Ok(())
}
