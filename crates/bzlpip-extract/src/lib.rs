//! Turn a Python wheel into a Bazel package.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, instrument};

use bzlpip_build_file::generate_build_file_contents;
use bzlpip_fs::{OwnedDirectory, Simplified};
use bzlpip_layout::{setup_namespace_pkg_compatibility, spread_purelib_into_root};
use bzlpip_normalize::{
    CanonicalLabel, DEFAULT_PREFIX, DistributionName, FlatLabels, LabelStyle, PackageAddress,
    RepositoryLabels,
};
use bzlpip_wheel::{MarkerEnvironment, Wheel};

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Wheel(#[from] bzlpip_wheel::Error),
    #[error(transparent)]
    Layout(#[from] bzlpip_layout::Error),
    #[error("The package directory already exists: `{}`", _0.simplified_display())]
    AlreadyExtracted(PathBuf),
}

/// Where an extracted wheel lives, and how it refers to its dependencies.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// Each wheel gets its own directory in a shared repository and refers to its
    /// dependencies as sibling packages (`//pypi__six`).
    #[default]
    Standalone,
    /// The wheel is unpacked into the root of a repository of its own and refers to its
    /// dependencies as other repositories (`@pypi__six//:pkg`).
    Incremental,
}

impl ExtractMode {
    pub fn from_incremental(incremental: bool) -> Self {
        if incremental {
            Self::Incremental
        } else {
            Self::Standalone
        }
    }

    /// The labelling scheme that matches this layout.
    pub fn label_style(self, prefix: &str) -> Box<dyn LabelStyle> {
        let prefix = prefix.to_string();
        match self {
            Self::Standalone => Box::new(FlatLabels { prefix }),
            Self::Incremental => Box::new(RepositoryLabels { prefix }),
        }
    }
}

/// The settings for a single [`extract_wheel`] call.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// The repository root into which the wheel is extracted.
    pub root: PathBuf,
    /// The extras to activate, keyed by the exact distribution name of the wheel.
    pub extras: BTreeMap<DistributionName, Vec<String>>,
    /// Glob patterns to leave out of the library's `data`, on top of the built-in ones.
    pub data_exclude: Vec<String>,
    /// Rewrite implicit namespace packages into pkgutil-style ones.
    pub namespace_pkg_compatibility: bool,
    pub prefix: String,
    pub mode: ExtractMode,
    /// The environment that `Requires-Dist` markers are evaluated against.
    pub markers: MarkerEnvironment,
}

impl ExtractOptions {
    pub fn new(root: impl Into<PathBuf>, markers: MarkerEnvironment) -> Self {
        Self {
            root: root.into(),
            extras: BTreeMap::new(),
            data_exclude: Vec::new(),
            namespace_pkg_compatibility: true,
            prefix: DEFAULT_PREFIX.to_string(),
            mode: ExtractMode::default(),
            markers,
        }
    }
}

/// Unpack a wheel, normalize its layout and write a `BUILD.bazel` file for it.
///
/// Returns the address of the new package, relative to the repository root. In
/// [`ExtractMode::Standalone`], a copy of the wheel is kept in the package (for its `whl`
/// target), the original file is removed, and a failed extraction removes the package
/// directory again.
#[instrument(skip_all, fields(wheel = %wheel_path.simplified_display()))]
pub fn extract_wheel(wheel_path: &Path, options: &ExtractOptions) -> Result<PackageAddress, Error> {
    let wheel = Wheel::open(wheel_path)?;
    debug!("Extracting: {}", wheel.filename());
    let name = wheel.name();
    let style = options.mode.label_style(&options.prefix);
    let canonical = style.canonical(&name);

    let (directory, owned) = match options.mode {
        ExtractMode::Incremental => (".".to_string(), None),
        ExtractMode::Standalone => {
            let target = options.root.join(canonical.as_str());
            let owned = OwnedDirectory::create(&target).map_err(|err| {
                if err.kind() == io::ErrorKind::AlreadyExists {
                    Error::AlreadyExtracted(target.clone())
                } else {
                    Error::Io(err)
                }
            })?;
            copy_wheel(&wheel, owned.path())?;
            (canonical.to_string(), Some(owned))
        }
    };
    let target = owned
        .as_ref()
        .map_or(options.root.as_path(), OwnedDirectory::path);

    wheel.unzip(target)?;

    // The namespace package scan needs to see the relocated purelib files.
    spread_purelib_into_root(target)?;
    if options.namespace_pkg_compatibility {
        setup_namespace_pkg_compatibility(target)?;
    }

    let extras = options
        .extras
        .get(&name)
        .map(Vec::as_slice)
        .unwrap_or_default();
    if !extras.is_empty() {
        debug!("Requested extras for {name}: {}", extras.join(", "));
    }
    let dependencies = dependency_labels(&wheel, extras, options, style.as_ref())?;

    let library_deps = dependencies
        .iter()
        .map(|label| style.library(label))
        .collect::<Vec<_>>();
    let whl_file_deps = dependencies
        .iter()
        .map(|label| style.wheel_file(label))
        .collect::<Vec<_>>();
    let contents = generate_build_file_contents(
        &style.target_name(&canonical),
        &library_deps,
        &whl_file_deps,
        &options.data_exclude,
    );
    fs_err::write(target.join("BUILD.bazel"), contents)?;

    if let Some(owned) = owned {
        fs_err::remove_file(wheel.path())?;
        owned.persist();
    }

    let address = PackageAddress::from_directory(&directory);
    info!(
        "Extracted {name}=={} with {} dependencies as `{address}`",
        wheel.version(),
        dependencies.len()
    );
    Ok(address)
}

/// Copy the wheel into the package directory, where the `whl` target's glob picks it up.
fn copy_wheel(wheel: &Wheel, directory: &Path) -> Result<(), Error> {
    if let Some(file_name) = wheel.path().file_name() {
        fs_err::copy(wheel.path(), directory.join(file_name))?;
    }
    Ok(())
}

/// The canonical labels of the wheel's dependencies, sorted and without duplicates.
fn dependency_labels(
    wheel: &Wheel,
    extras: &[String],
    options: &ExtractOptions,
    style: &dyn LabelStyle,
) -> Result<Vec<CanonicalLabel>, Error> {
    let mut labels = wheel
        .dependencies(extras, &options.markers)?
        .iter()
        .map(|dependency| style.canonical(dependency))
        .collect::<Vec<_>>();
    labels.sort();
    labels.dedup();
    Ok(labels)
}
