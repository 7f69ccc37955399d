use std::collections::BTreeSet;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use pep440_rs::Version;
use pep508_rs::{MarkerEnvironment, Requirement};
use tracing::{debug, trace, warn};
use zip::ZipArchive;

use bzlpip_fs::Simplified;
use bzlpip_normalize::DistributionName;

use crate::{Error, Metadata, WheelFilename};

/// A wheel archive on disk, with its core metadata already read.
#[derive(Debug, Clone)]
pub struct Wheel {
    path: PathBuf,
    filename: WheelFilename,
    metadata: Metadata,
}

impl Wheel {
    /// Open the wheel at `path` and read its `METADATA` file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|filename| filename.to_string_lossy().to_string())
            .ok_or_else(|| {
                Error::InvalidFilename(
                    path.simplified_display().to_string(),
                    "Not a file".to_string(),
                )
            })?;
        let filename = WheelFilename::from_str(&filename)?;

        let reader = BufReader::new(fs_err::File::open(&path)?);
        let mut archive = ZipArchive::new(reader)?;
        let metadata = read_archive_metadata(&mut archive)?;
        debug!(
            "Read metadata for {}=={} from: `{}`",
            metadata.name,
            metadata.version,
            path.simplified_display()
        );

        Ok(Self {
            path,
            filename,
            metadata,
        })
    }

    /// The distribution name, as declared in the wheel's metadata.
    pub fn name(&self) -> DistributionName {
        DistributionName::new(self.metadata.name.clone())
    }

    pub fn version(&self) -> &Version {
        &self.metadata.version
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn filename(&self) -> &WheelFilename {
        &self.filename
    }

    /// Return the names of the distributions this wheel depends on at runtime, spelled as
    /// in their `Requires-Dist` entries.
    ///
    /// A `Requires-Dist` entry is included when its marker (if any) holds in `markers` with
    /// the given `extras` activated. Requesting an extra the wheel doesn't declare simply
    /// activates nothing.
    pub fn dependencies(
        &self,
        extras: &[String],
        markers: &MarkerEnvironment,
    ) -> Result<BTreeSet<DistributionName>, Error> {
        let extras: Vec<_> = extras
            .iter()
            .filter_map(|extra| extra.parse().ok())
            .collect();

        let mut dependencies = BTreeSet::new();
        for requires_dist in &self.metadata.requires_dist {
            let requirement: Requirement = requires_dist.parse().map_err(|err| {
                Error::InvalidRequirement(requires_dist.clone(), format!("{err}"))
            })?;
            if requirement.evaluate_markers(markers, &extras) {
                dependencies.insert(DistributionName::from(requirement_name(requires_dist)));
            } else {
                trace!("Skipping inactive requirement: `{requires_dist}`");
            }
        }
        Ok(dependencies)
    }

    /// Unpack the archive into `target`, creating it if necessary.
    pub fn unzip(&self, target: impl AsRef<Path>) -> Result<(), Error> {
        let target = target.as_ref();
        debug!(
            "Unpacking `{}` into: `{}`",
            self.filename,
            target.simplified_display()
        );
        let reader = BufReader::new(fs_err::File::open(&self.path)?);
        unzip_archive(reader, target)
    }
}

/// The distribution name at the start of a PEP 508 requirement, without normalization.
fn requirement_name(requirement: &str) -> &str {
    let requirement = requirement.trim_start();
    let end = requirement
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        .unwrap_or(requirement.len());
    &requirement[..end]
}

/// Find and parse the `METADATA` file in the top-level `.dist-info` directory of an archive.
fn read_archive_metadata<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Metadata, Error> {
    let Some(metadata_path) = archive
        .file_names()
        .find(|name| {
            name.strip_suffix("/METADATA")
                .is_some_and(|dir| !dir.contains('/') && dir.ends_with(".dist-info"))
        })
        .map(ToString::to_string)
    else {
        return Err(Error::InvalidWheel(
            "Missing .dist-info/METADATA file".to_string(),
        ));
    };

    let mut content = Vec::new();
    archive.by_name(&metadata_path)?.read_to_end(&mut content)?;
    Metadata::parse(&content)
}

/// Unzip a `.zip` archive into the target directory.
fn unzip_archive<R: Read + Seek>(reader: R, target: &Path) -> Result<(), Error> {
    let mut archive = ZipArchive::new(reader)?;
    for file_number in 0..archive.len() {
        let mut file = archive.by_index(file_number)?;

        // Determine the path of the file within the wheel.
        let Some(file_path) = file.enclosed_name() else {
            warn!("Skipping unsafe path in archive: `{}`", file.name());
            continue;
        };

        // Create necessary parent directories.
        let path = target.join(file_path);
        if file.is_dir() {
            fs_err::create_dir_all(path)?;
            continue;
        }
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        // Write the file.
        let mut outfile = fs_err::File::create(&path)?;
        std::io::copy(&mut file, &mut outfile)?;

        // Set permissions.
        #[cfg(unix)]
        {
            use std::fs::Permissions;
            use std::os::unix::fs::PermissionsExt;

            if let Some(mode) = file.unix_mode() {
                fs_err::set_permissions(&path, Permissions::from_mode(mode))?;
            }
        }
    }
    Ok(())
}
