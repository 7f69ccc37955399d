use std::collections::{BTreeSet, HashSet};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};
use walkdir::WalkDir;

use bzlpip_fs::Simplified;

use crate::Error;

/// The file suffixes that make a directory an importable package.
const MODULE_SUFFIXES: &[&str] = &["py", "pyc", "so", "pyd"];

const PKGUTIL_INIT: &str = "\
# __path__ manipulation added by bzlpip to support namespace pkgs.
__path__ = __import__('pkgutil').extend_path(__path__, __name__)
";

/// Find the implicit (native, PEP 420) namespace packages beneath `root`.
///
/// A directory qualifies when it has no `__init__.py`, and either contains a Python module
/// itself or contains a directory that is a package (regular or namespace). `root` itself
/// never qualifies, and neither does anything at or beneath one of the `ignored` directories.
pub fn implicit_namespace_packages(
    root: &Path,
    ignored: &[PathBuf],
) -> Result<BTreeSet<PathBuf>, Error> {
    let mut namespace_packages = BTreeSet::new();
    let mut standard_packages = HashSet::new();

    // Children are visited before their parents, so a directory can inspect the verdicts
    // of its subdirectories. `filter_entry` can't prune in this order.
    for entry in WalkDir::new(root).contents_first(true) {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let dir = entry.path();
        if ignored.iter().any(|ignored| dir.starts_with(ignored)) {
            continue;
        }

        if dir.join("__init__.py").is_file() {
            standard_packages.insert(dir.to_path_buf());
            continue;
        }
        if dir == root {
            continue;
        }

        let mut is_namespace = false;
        for child in fs_err::read_dir(dir)? {
            let child = child?;
            let path = child.path();
            let qualifies = if child.file_type()?.is_dir() {
                standard_packages.contains(&path) || namespace_packages.contains(&path)
            } else {
                is_python_module(&path)
            };
            if qualifies {
                is_namespace = true;
                break;
            }
        }

        if is_namespace {
            namespace_packages.insert(dir.to_path_buf());
        }
    }

    Ok(namespace_packages)
}

fn is_python_module(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MODULE_SUFFIXES.contains(&ext))
}

/// Turn `dir` into a regular package whose `__path__` is extended with `pkgutil`.
///
/// Returns `false`, leaving the file untouched, if `dir` already has an `__init__.py`.
pub fn add_pkgutil_style_namespace_pkg_init(dir: &Path) -> Result<bool, Error> {
    let init = dir.join("__init__.py");
    let mut file = match fs_err::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&init)
    {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            debug!("Keeping existing: `{}`", init.simplified_display());
            return Ok(false);
        }
        Err(err) => return Err(err.into()),
    };
    file.write_all(PKGUTIL_INIT.as_bytes())?;
    Ok(true)
}

/// Convert every implicit namespace package beneath `root` into a pkgutil-style one.
///
/// The `bin` directory at the top of `root` is left alone. Running this again on the same
/// tree writes nothing.
#[instrument(skip_all, fields(root = %root.simplified_display()))]
pub fn setup_namespace_pkg_compatibility(root: &Path) -> Result<(), Error> {
    let ignored = [root.join("bin")];
    let mut written = 0usize;
    for dir in implicit_namespace_packages(root, &ignored)? {
        if add_pkgutil_style_namespace_pkg_init(&dir)? {
            debug!(
                "Added namespace package `__init__.py` to: `{}`",
                dir.simplified_display()
            );
            written += 1;
        }
    }
    debug!("Converted {written} namespace package(s)");
    Ok(())
}
