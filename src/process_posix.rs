//! Implements run_command on posix using posix_spawn.
//! The child's stdout and stderr are fed into one pipe, which cannot be done
//! with the std::process API, so a failing command's output reads in the
//! order it was printed.

use crate::process::{Cmdline, Termination};
use std::ffi::CString;
use std::io::{Read, Write};
use std::os::fd::FromRawFd;
use std::os::unix::process::ExitStatusExt;

extern "C" {
    static environ: *const *mut libc::c_char;
}

/// Check a call that returns an error number directly (the posix_spawn family).
fn check_errno(func: &str, ret: libc::c_int) -> anyhow::Result<()> {
    if ret != 0 {
        anyhow::bail!("{}: {}", func, std::io::Error::from_raw_os_error(ret));
    }
    Ok(())
}

/// Check a call that returns -1 and sets errno.
fn check_ret(func: &str, ret: libc::c_int) -> anyhow::Result<()> {
    if ret < 0 {
        anyhow::bail!("{}: {}", func, std::io::Error::last_os_error());
    }
    Ok(())
}

/// Wraps libc::posix_spawn_file_actions_t, in particular to implement Drop.
struct PosixSpawnFileActions(libc::posix_spawn_file_actions_t);

impl PosixSpawnFileActions {
    fn new() -> anyhow::Result<Self> {
        unsafe {
            let mut actions: libc::posix_spawn_file_actions_t = std::mem::zeroed();
            check_errno(
                "posix_spawn_file_actions_init",
                libc::posix_spawn_file_actions_init(&mut actions),
            )?;
            Ok(Self(actions))
        }
    }

    fn as_ptr(&self) -> *const libc::posix_spawn_file_actions_t {
        &self.0
    }

    fn adddup2(&mut self, fd: i32, newfd: i32) -> anyhow::Result<()> {
        unsafe {
            check_errno(
                "posix_spawn_file_actions_adddup2",
                libc::posix_spawn_file_actions_adddup2(&mut self.0, fd, newfd),
            )
        }
    }

    fn addclose(&mut self, fd: i32) -> anyhow::Result<()> {
        unsafe {
            check_errno(
                "posix_spawn_file_actions_addclose",
                libc::posix_spawn_file_actions_addclose(&mut self.0, fd),
            )
        }
    }
}

impl Drop for PosixSpawnFileActions {
    fn drop(&mut self) {
        unsafe { libc::posix_spawn_file_actions_destroy(&mut self.0) };
    }
}

/// Spawn `args` with stdout/stderr redirected into the write end of `pipe`.
fn spawn(args: &[CString], pipe: [libc::c_int; 2]) -> anyhow::Result<libc::pid_t> {
    let mut actions = PosixSpawnFileActions::new()?;
    // stdout/stderr => pipe
    actions.adddup2(pipe[1], 1)?;
    actions.adddup2(pipe[1], 2)?;
    // close pipe in child
    actions.addclose(pipe[0])?;
    actions.addclose(pipe[1])?;

    let mut argv: Vec<*mut libc::c_char> =
        args.iter().map(|arg| arg.as_ptr() as *mut libc::c_char).collect();
    argv.push(std::ptr::null_mut());

    let mut pid: libc::pid_t = 0;
    // Safety: argv is null terminated and its strings outlive the call.
    unsafe {
        check_errno(
            "posix_spawnp",
            libc::posix_spawnp(
                &mut pid,
                args[0].as_ptr(),
                actions.as_ptr(),
                std::ptr::null(),
                argv.as_ptr(),
                environ,
            ),
        )?;
    }
    Ok(pid)
}

pub fn run_command(cmdline: &Cmdline) -> anyhow::Result<(Termination, Vec<u8>)> {
    let args: Vec<CString> = match cmdline {
        Cmdline::Shell(cmd) => vec![
            CString::new("/bin/sh")?,
            CString::new("-c")?,
            CString::new(cmd.as_str())?,
        ],
        Cmdline::Argv(args) => args
            .iter()
            .map(|arg| CString::new(arg.as_str()))
            .collect::<Result<_, _>>()?,
    };
    if args.is_empty() {
        anyhow::bail!("empty command");
    }

    let mut pipe: [libc::c_int; 2] = [0; 2];
    check_ret("pipe", unsafe { libc::pipe(pipe.as_mut_ptr()) })?;
    // Safety: pipe() just handed us ownership of the read end.
    let mut reader = unsafe { std::fs::File::from_raw_fd(pipe[0]) };
    let spawned = spawn(&args, pipe);
    check_ret("close", unsafe { libc::close(pipe[1]) })?;
    let pid = spawned?;

    let mut output = Vec::new();
    reader.read_to_end(&mut output)?;

    let status = unsafe {
        let mut status: i32 = 0;
        check_ret("waitpid", libc::waitpid(pid, &mut status, 0))?;
        std::process::ExitStatus::from_raw(status)
    };

    let mut termination = Termination::Success;
    if !status.success() {
        termination = Termination::Failure;
        if let Some(sig) = status.signal() {
            match sig {
                libc::SIGINT => {
                    write!(output, "interrupted")?;
                    termination = Termination::Interrupted;
                }
                _ => write!(output, "signal {}", sig)?,
            }
        }
    }

    Ok((termination, output))
}
