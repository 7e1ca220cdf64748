//! Tests for how errors reach the command line.

use crate::e2e::*;

#[test]
fn missing_input() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    let out = space.run(&mut freshen_command(vec![
        "-t", "dst=out", "-s", "src=in", "--", "cp", "%(src)s", "%(dst)s",
    ]))?;
    assert!(!out.status.success());
    assert_output_contains(&out, "freshen: error: missing input");
    assert!(!space.exists("out"));
    Ok(())
}

#[test]
fn no_command() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    let out = space.run(&mut freshen_command(vec!["-t", "dst=out"]))?;
    assert!(!out.status.success());
    assert_output_contains(&out, "no command given");
    Ok(())
}

#[test]
fn overlapping_names() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("in", "")?;
    let out = space.run(&mut freshen_command(vec![
        "-t", "x=out", "-s", "x=in", "--", "cp", "%(x)s", "%(x)s",
    ]))?;
    assert!(!out.status.success());
    assert_output_contains(&out, "configuration error");
    Ok(())
}

#[test]
fn unknown_placeholder() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    let out = space.run(&mut freshen_command(vec![
        "-t",
        "dst=out",
        "--shell",
        "touch %(target)s",
    ]))?;
    assert!(!out.status.success());
    assert_output_contains(&out, "unknown parameter \"target\"");
    Ok(())
}

#[cfg(unix)]
#[test]
fn failing_command() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    let out = space.run(&mut freshen_command(vec![
        "-t",
        "out=out",
        "--shell",
        "echo partial > %(out)s; echo no luck; exit 1",
    ]))?;
    assert!(!out.status.success());
    assert_output_contains(&out, "command failed");
    assert_output_contains(&out, "no luck");
    // Partial output stays unless asked otherwise.
    assert_eq!(space.read("out")?, b"partial\n");
    Ok(())
}

#[cfg(unix)]
#[test]
fn remove_failed() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    let out = space.run(&mut freshen_command(vec![
        "--remove-failed",
        "-t",
        "out=out",
        "--shell",
        "echo partial > %(out)s; exit 1",
    ]))?;
    assert!(!out.status.success());
    assert!(!space.exists("out"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn command_without_output() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    let out = space.run(&mut freshen_command(vec!["-t", "out=out", "--", "true"]))?;
    assert!(!out.status.success());
    assert_output_contains(&out, "did not produce a fresh target");
    Ok(())
}

#[test]
fn strict_mtime() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("in", "")?;
    space.set_mtime("in", 4_000_000_000)?;
    let out = space.run(&mut freshen_command(vec![
        "--strict-mtime",
        "-t",
        "dst=out",
        "-s",
        "src=in",
        "--",
        "cp",
        "%(src)s",
        "%(dst)s",
    ]))?;
    assert!(!out.status.success());
    assert_output_contains(&out, "newer than the build start");
    Ok(())
}
