use crate::e2e::*;

/// An mtime comfortably in the past.
const OLD: i64 = 1_000_000_000;

#[cfg(unix)]
#[test]
fn basic_build() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("in", "contents")?;
    space.set_mtime("in", OLD)?;
    let args = vec!["-t", "dst=out", "-s", "src=in", "--shell", "cp %(src)s %(dst)s"];

    let out = space.run_expect(&mut freshen_command(args.clone()))?;
    assert_output_contains(&out, "freshen: built 1 target");
    assert_eq!(space.read("out")?, b"contents");

    let out = space.run_expect(&mut freshen_command(args))?;
    assert_output_contains(&out, "freshen: up to date");
    Ok(())
}

#[cfg(unix)]
#[test]
fn create_subdir() -> anyhow::Result<()> {
    // Run a build that needs a subdir to be automatically created.
    let space = TestSpace::new()?;
    space.run_expect(&mut freshen_command(vec![
        "-t",
        "out=subdir/out",
        "--",
        "touch",
        "%(out)s",
    ]))?;
    assert!(space.exists("subdir/out"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn stale_target_rebuilds() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("in", "one")?;
    space.set_mtime("in", OLD)?;
    let args = vec!["-t", "dst=out", "-s", "src=in", "--", "cp", "%(src)s", "%(dst)s"];
    space.run_expect(&mut freshen_command(args.clone()))?;

    space.write("in", "two")?;
    space.set_mtime("in", OLD)?;
    space.set_mtime("out", OLD - 1)?;
    let out = space.run_expect(&mut freshen_command(args))?;
    assert_output_contains(&out, "built 1 target");
    assert_eq!(space.read("out")?, b"two");
    Ok(())
}

#[cfg(unix)]
#[test]
fn params_and_lists() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("a", "A")?;
    space.write("b", "B")?;
    space.set_mtime("a", OLD)?;
    space.set_mtime("b", OLD)?;
    space.run_expect(&mut freshen_command(vec![
        "-t",
        "out=joined",
        "-s",
        "ins=a",
        "-s",
        "ins=b",
        "-p",
        "tail=!",
        "--shell",
        "cat %(ins)s > %(out)s && printf %(tail)s >> %(out)s",
    ]))?;
    assert_eq!(space.read("joined")?, b"AB!");
    Ok(())
}

#[cfg(unix)]
#[test]
fn directory_dependency() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    std::fs::create_dir_all(space.dir_path().join("conf/nested"))?;
    space.write("conf/nested/x", "")?;
    space.set_mtime("conf/nested/x", OLD)?;
    let args = vec!["-t", "out=out", "-d", "conf", "--", "touch", "%(out)s"];
    space.run_expect(&mut freshen_command(args.clone()))?;

    space.set_mtime("out", OLD - 1)?;
    let out = space.run_expect(&mut freshen_command(args))?;
    assert_output_contains(&out, "built 1 target");
    Ok(())
}
