//! What a build runs when its targets are stale.

use crate::params::Params;
use crate::process::{run_command, Termination};
use crate::template::CommandTemplate;
use anyhow::bail;

type DirectFn<'a> = dyn FnMut(&Params) -> anyhow::Result<()> + 'a;

/// The action of a build: either an in-process closure or an external
/// command.  Both receive the same merged parameters; a closure looks them
/// up by name, a command has them substituted into its template.
pub enum Action<'a> {
    Direct(Box<DirectFn<'a>>),
    Command(CommandTemplate),
}

impl<'a> Action<'a> {
    pub fn direct(f: impl FnMut(&Params) -> anyhow::Result<()> + 'a) -> Self {
        Action::Direct(Box::new(f))
    }

    /// A command run by the shell, e.g. `cp %(src)s %(dst)s`.
    pub fn shell(template: &str) -> crate::error::Result<Self> {
        Ok(Action::Command(CommandTemplate::shell(template)?))
    }

    /// A command run directly from its argument list.
    pub fn argv<I, S>(args: I) -> crate::error::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Action::Command(CommandTemplate::argv(args)?))
    }

    pub(crate) fn run(&mut self, params: &Params) -> anyhow::Result<()> {
        match self {
            Action::Direct(f) => f(params),
            Action::Command(template) => {
                let cmdline = template.expand(params)?;
                tracing::debug!(%cmdline, "running command");
                let (termination, output) = run_command(&cmdline)?;
                let output = String::from_utf8_lossy(&output);
                match termination {
                    Termination::Success => Ok(()),
                    Termination::Interrupted => bail!("interrupted: {}\n{}", cmdline, output),
                    Termination::Failure => bail!("command failed: {}\n{}", cmdline, output),
                }
            }
        }
    }
}

impl std::fmt::Debug for Action<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Direct(_) => f.write_str("Action::Direct(..)"),
            Action::Command(template) => f.debug_tuple("Action::Command").field(template).finish(),
        }
    }
}
