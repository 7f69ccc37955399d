use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

pub trait Simplified {
    /// Render a [`Path`] for user-facing display.
    ///
    /// On Windows, this will strip the `\\?\` prefix from paths. On other platforms, it's
    /// equivalent to [`std::path::Display`].
    fn simplified_display(&self) -> std::path::Display<'_>;
}

impl<T: AsRef<Path>> Simplified for T {
    fn simplified_display(&self) -> std::path::Display<'_> {
        dunce::simplified(self.as_ref()).display()
    }
}

/// A directory that is owned by an in-progress operation.
///
/// Unless [`OwnedDirectory::persist`] is called, the directory and everything written into it
/// is removed when the guard is dropped, so that a failed operation never leaves behind a
/// partially populated directory that a later run could mistake for a complete one.
#[derive(Debug)]
pub struct OwnedDirectory {
    path: PathBuf,
    persist: bool,
}

impl OwnedDirectory {
    /// Create the directory at `path`.
    ///
    /// Fails with [`io::ErrorKind::AlreadyExists`] if the directory exists: an existing
    /// directory belongs to someone else and must not be removed on failure.
    pub fn create(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        fs_err::create_dir(&path)?;
        debug!("Created directory: `{}`", path.simplified_display());
        Ok(Self {
            path,
            persist: false,
        })
    }

    /// Return the path to the directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the directory on disk and return its path.
    pub fn persist(mut self) -> PathBuf {
        self.persist = true;
        std::mem::take(&mut self.path)
    }
}

impl Drop for OwnedDirectory {
    fn drop(&mut self) {
        if self.persist {
            return;
        }
        match fs_err::remove_dir_all(&self.path) {
            Ok(()) => debug!(
                "Removed partially populated directory: `{}`",
                self.path.simplified_display()
            ),
            Err(err) => warn!("Failed to clean up directory: {err}"),
        }
    }
}
