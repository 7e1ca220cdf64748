//! Running external commands for command-template actions.

#[cfg(unix)]
pub use crate::process_posix::run_command;
#[cfg(not(unix))]
pub use portable::run_command;

/// A fully expanded command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmdline {
    /// Interpreted by the platform shell.
    Shell(String),
    /// Executed directly; the first entry is the program, looked up in PATH.
    Argv(Vec<String>),
}

impl std::fmt::Display for Cmdline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cmdline::Shell(cmd) => f.write_str(cmd),
            Cmdline::Argv(args) => f.write_str(&args.join(" ")),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Termination {
    Success,
    Interrupted,
    Failure,
}

#[cfg(not(unix))]
mod portable {
    use super::{Cmdline, Termination};

    pub fn run_command(cmdline: &Cmdline) -> anyhow::Result<(Termination, Vec<u8>)> {
        let mut cmd = match cmdline {
            Cmdline::Shell(line) => {
                let mut cmd = std::process::Command::new("cmd");
                cmd.arg("/C").arg(line);
                cmd
            }
            Cmdline::Argv(args) => {
                let (prog, rest) = args
                    .split_first()
                    .ok_or_else(|| anyhow::anyhow!("empty command"))?;
                let mut cmd = std::process::Command::new(prog);
                cmd.args(rest);
                cmd
            }
        };
        let out = cmd.output()?;
        let mut output = out.stdout;
        output.extend_from_slice(&out.stderr);
        let termination = if out.status.success() {
            Termination::Success
        } else {
            Termination::Failure
        };
        Ok((termination, output))
    }
}
