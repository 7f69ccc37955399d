use std::path::Path;

use tracing::{debug, instrument};

use bzlpip_fs::Simplified;
use bzlpip_wheel::{find_data_dir, find_dist_info, read_root_is_purelib};

use crate::Error;

/// Move the contents of a platform-specific wheel's `purelib` directory into the package root.
///
/// Wheels with `Root-Is-Purelib: true` already have their pure-Python files at the root, as
/// do wheels without a `.data` directory; both are left untouched.
#[instrument(skip_all, fields(root = %root.simplified_display()))]
pub fn spread_purelib_into_root(root: &Path) -> Result<(), Error> {
    let dist_info = find_dist_info(root)?;
    if read_root_is_purelib(&dist_info)? {
        debug!("Wheel is purelib; nothing to relocate");
        return Ok(());
    }

    let Some(data_dir) = find_data_dir(root)? else {
        debug!("Wheel has no `.data` directory; nothing to relocate");
        return Ok(());
    };

    for entry in fs_err::read_dir(&data_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() || !entry.file_name().to_string_lossy().ends_with("purelib")
        {
            continue;
        }
        let purelib = entry.path();
        debug!("Relocating: `{}`", purelib.simplified_display());
        move_children(&purelib, root)?;
        fs_err::remove_dir_all(&purelib)?;
    }

    Ok(())
}

/// Move every entry of `source` into `target`, merging directories that exist in both.
fn move_children(source: &Path, target: &Path) -> Result<(), Error> {
    for entry in fs_err::read_dir(source)? {
        let entry = entry?;
        let from = entry.path();
        let to = target.join(entry.file_name());

        if entry.file_type()?.is_dir() && to.is_dir() {
            move_children(&from, &to)?;
            fs_err::remove_dir(&from)?;
            continue;
        }
        if fs_err::symlink_metadata(&to).is_ok() {
            return Err(Error::Collision(to));
        }
        fs_err::rename(&from, &to)?;
    }
    Ok(())
}
