//! Command line front end: turns flags into one build request and runs it.

use crate::{Action, Engine, Options, PathSpec, Request, Status};
use anyhow::{anyhow, bail};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Run one build step if its targets are out of date.
///
/// Command templates refer to targets, sources and parameters by name, e.g.
///   freshen -t dst=out/t -s src=s --shell "cp %(src)s %(dst)s"
///   freshen -t dst=out/t -s src=s -- cp %(src)s %(dst)s
#[derive(argh::FromArgs)]
struct Args {
    /// chdir before running
    #[argh(option, short = 'C')]
    chdir: Option<String>,

    /// target as NAME=PATH; repeat a name to declare a list
    #[argh(option, short = 't')]
    target: Vec<String>,

    /// source as NAME=PATH; repeat a name to declare a list
    #[argh(option, short = 's')]
    source: Vec<String>,

    /// extra input file or directory, not passed to the command
    #[argh(option, short = 'd')]
    dep: Vec<String>,

    /// extra parameter as NAME=VALUE
    #[argh(option, short = 'p')]
    param: Vec<String>,

    /// command line to run through the shell
    #[argh(option)]
    shell: Option<String>,

    /// fail if an input is newer than the start of the build
    #[argh(switch)]
    strict_mtime: bool,

    /// delete targets left behind by a failed command
    #[argh(switch)]
    remove_failed: bool,

    /// print debug logging
    #[argh(switch, short = 'v')]
    verbose: bool,

    /// command to run directly, as arguments after "--"
    #[argh(positional)]
    command: Vec<String>,
}

fn split_assignment(flag: &str, entry: &str) -> anyhow::Result<(String, String)> {
    match entry.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => bail!("invalid {} {:?}, expected NAME=VALUE", flag, entry),
    }
}

/// Group NAME=PATH flags by name, in first-seen order.  A name given once is
/// a single path; a name given repeatedly is a list.
fn collect_paths(flag: &str, entries: &[String]) -> anyhow::Result<Vec<(String, PathSpec)>> {
    let mut grouped: Vec<(String, Vec<PathBuf>)> = Vec::new();
    for entry in entries {
        let (name, path) = split_assignment(flag, entry)?;
        match grouped.iter_mut().find(|(n, _)| *n == name) {
            Some((_, paths)) => paths.push(path.into()),
            None => grouped.push((name, vec![path.into()])),
        }
    }
    Ok(grouped
        .into_iter()
        .map(|(name, mut paths)| {
            let spec = if paths.len() == 1 {
                PathSpec::One(paths.remove(0))
            } else {
                PathSpec::Many(paths)
            };
            (name, spec)
        })
        .collect())
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("FRESHEN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("init logging: {}", err))
}

fn run_impl(args: Args) -> anyhow::Result<i32> {
    init_logging(args.verbose)?;

    if let Some(dir) = &args.chdir {
        let dir = Path::new(dir);
        std::env::set_current_dir(dir).map_err(|err| anyhow!("chdir {:?}: {}", dir, err))?;
    }

    let mut action = match (&args.shell, args.command.is_empty()) {
        (Some(shell), true) => Action::shell(shell)?,
        (None, false) => Action::argv(&args.command)?,
        (Some(_), false) => bail!("give either --shell or a command after --, not both"),
        (None, true) => bail!("no command given; use --shell or a command after --"),
    };

    let mut req = Request::new();
    for (name, spec) in collect_paths("target", &args.target)? {
        req = req.target(name, spec);
    }
    for (name, spec) in collect_paths("source", &args.source)? {
        req = req.source(name, spec);
    }
    for dep in &args.dep {
        req = req.dependency(dep);
    }
    for entry in &args.param {
        let (name, value) = split_assignment("param", entry)?;
        req = req.param(name, value);
    }
    if args.target.is_empty() {
        bail!("no targets given; use -t NAME=PATH");
    }

    let mut engine = Engine::with_options(Options {
        scratch_dir: Some(std::env::current_dir()?),
        reject_future_mtimes: args.strict_mtime,
        remove_failed_targets: args.remove_failed,
    })?;
    let outcome = engine.build(&mut action, &req)?;
    match outcome.status {
        Status::Fresh => println!("freshen: up to date"),
        Status::Built => {
            let n = outcome.targets.len();
            println!("freshen: built {} target{}", n, if n == 1 { "" } else { "s" });
        }
    }
    Ok(0)
}

pub fn run() -> anyhow::Result<i32> {
    let args: Args = argh::from_env();
    run_impl(args)
}
