//! Path canonicalization.
//!
//! Every path the engine sees is made absolute and has its symlinks
//! resolved, so that "out/../out/a", "./out/a" and a link pointing at
//! "out/a" all collapse to one node.  Unlike `std::fs::canonicalize` this
//! also works for paths that don't exist yet (targets before their first
//! build): the longest existing prefix is resolved on disk and the rest is
//! simplified lexically.

use std::path::{Component, Path, PathBuf};

/// Canonicalize `path`, relative to the current directory if it isn't
/// absolute.
pub fn canon_path(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(canon_absolute(path))
    } else {
        Ok(canon_absolute(&std::env::current_dir()?.join(path)))
    }
}

fn canon_absolute(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    // Whether `out` is known to exist on disk.  Once a component is
    // missing, everything below it is handled lexically.
    let mut on_disk = true;
    for comp in path.components() {
        match comp {
            Component::Prefix(_) | Component::RootDir => out.push(comp.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
                if !on_disk {
                    on_disk = out.exists();
                }
            }
            Component::Normal(name) => {
                out.push(name);
                if on_disk {
                    match std::fs::canonicalize(&out) {
                        Ok(real) => out = real,
                        Err(_) => on_disk = false,
                    }
                }
            }
        }
    }
    out
}
