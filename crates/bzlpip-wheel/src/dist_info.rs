use std::path::{Path, PathBuf};

use mailparse::MailHeaderMap;

use crate::Error;

/// Find the top-level `.dist-info` directory of an unpacked wheel.
pub fn find_dist_info(root: impl AsRef<Path>) -> Result<PathBuf, Error> {
    find_top_level_dir(root.as_ref(), "dist-info")?
        .ok_or_else(|| Error::InvalidWheel("Missing .dist-info directory".to_string()))
}

/// Find the top-level `.data` directory of an unpacked wheel, if it has one.
pub fn find_data_dir(root: impl AsRef<Path>) -> Result<Option<PathBuf>, Error> {
    find_top_level_dir(root.as_ref(), "data")
}

fn find_top_level_dir(root: &Path, extension: &str) -> Result<Option<PathBuf>, Error> {
    for entry in fs_err::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == extension) {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

/// Read the `Root-Is-Purelib` value from the `WHEEL` file in a `.dist-info` directory.
///
/// Only the literal `true` (in any case) marks a pure wheel; any other value is treated as
/// `false`. A `WHEEL` file without the key is rejected.
pub fn read_root_is_purelib(dist_info: impl AsRef<Path>) -> Result<bool, Error> {
    let wheel_file = dist_info.as_ref().join("WHEEL");
    let content = fs_err::read(&wheel_file)?;
    let (headers, _) =
        mailparse::parse_headers(&content).map_err(|err| Error::MailParse("WHEEL", err))?;
    let root_is_purelib = headers
        .get_first_value("Root-Is-Purelib")
        .ok_or(Error::MissingRootIsPurelib(wheel_file))?;
    Ok(root_is_purelib.trim().eq_ignore_ascii_case("true"))
}
