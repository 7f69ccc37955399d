use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use bzlpip_fs::Simplified;
use bzlpip_normalize::{DEFAULT_PREFIX, DistributionName};
use bzlpip_wheel::{MarkerEnvironment, PythonVersion};

use crate::cli::{ExtractArgs, GlobalArgs, flag};

const CONFIG_FILE_NAME: &str = "bzlpip.toml";

#[derive(thiserror::Error, Debug)]
pub(crate) enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Failed to parse: `{}`", _0.simplified_display())]
    BzlpipToml(PathBuf, #[source] Box<toml::de::Error>),
    #[error("`python` and `python-version` are mutually exclusive in: `{}`", _0.simplified_display())]
    ConflictingPython(PathBuf),
    #[error(transparent)]
    Wheel(#[from] bzlpip_wheel::Error),
}

/// The contents of a `bzlpip.toml` file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub(crate) struct Options {
    pub(crate) prefix: Option<String>,
    pub(crate) pip_data_exclude: Option<Vec<String>>,
    pub(crate) enable_implicit_namespace_pkgs: Option<bool>,
    pub(crate) python: Option<PathBuf>,
    pub(crate) python_version: Option<String>,
}

impl Options {
    /// Resolve paths in the options relative to the directory of the file they came from.
    ///
    /// Bare executable names (e.g., `python3.11`) are left as-is for lookup on the `PATH`.
    fn relative_to(mut self, dir: &Path) -> Self {
        if let Some(python) = self.python.as_mut() {
            if python.is_relative() && python.components().count() > 1 {
                *python = dir.join(&*python);
            }
        }
        self
    }
}

/// The [`Options`] as loaded from a configuration file on disk.
#[derive(Debug, Clone)]
pub(crate) struct FilesystemOptions {
    path: PathBuf,
    options: Options,
}

impl FilesystemOptions {
    /// Load the configuration selected by the global arguments, if any.
    pub(crate) fn load(args: &GlobalArgs, root: &Path) -> Result<Option<Self>, Error> {
        if let Some(config_file) = &args.config_file {
            return Self::from_file(config_file).map(Some);
        }
        if args.no_config {
            debug!("Skipping configuration discovery");
            return Ok(None);
        }
        Self::find(root)
    }

    /// Find the nearest `bzlpip.toml`, starting at `path` and walking up the directory tree.
    pub(crate) fn find(path: &Path) -> Result<Option<Self>, Error> {
        let path = std::path::absolute(path)?;
        for ancestor in path.ancestors() {
            let file = ancestor.join(CONFIG_FILE_NAME);
            match Self::from_file(&file) {
                Ok(options) => return Ok(Some(options)),
                Err(Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err),
            }
        }
        Ok(None)
    }

    /// Load a `bzlpip.toml` file.
    pub(crate) fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = fs_err::read_to_string(path)?;
        let options = toml::from_str::<Options>(&content)
            .map_err(|err| Error::BzlpipToml(path.to_path_buf(), Box::new(err)))?;
        if options.python.is_some() && options.python_version.is_some() {
            return Err(Error::ConflictingPython(path.to_path_buf()));
        }
        let options = match std::path::absolute(path)?.parent() {
            Some(parent) => options.relative_to(parent),
            None => options,
        };
        debug!("Found configuration at: `{}`", path.simplified_display());
        Ok(Self {
            path: path.to_path_buf(),
            options,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

/// Where the marker environment for dependency selection comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MarkerSource {
    /// Query an interpreter.
    Interpreter(PathBuf),
    /// Synthesize an environment for a CPython version on the current platform.
    PythonVersion(PythonVersion),
}

impl MarkerSource {
    pub(crate) fn markers(&self) -> Result<MarkerEnvironment, bzlpip_wheel::Error> {
        match self {
            Self::Interpreter(python) => bzlpip_wheel::query_interpreter_markers(python),
            Self::PythonVersion(version) => bzlpip_wheel::synthetic_markers(*version),
        }
    }
}

/// The resolved settings for the `extract` command.
#[derive(Debug, Clone)]
pub(crate) struct ExtractSettings {
    pub(crate) wheel: PathBuf,
    pub(crate) directory: PathBuf,
    pub(crate) prefix: String,
    pub(crate) incremental: bool,
    pub(crate) extras: BTreeMap<DistributionName, Vec<String>>,
    pub(crate) pip_data_exclude: Vec<String>,
    pub(crate) enable_implicit_namespace_pkgs: bool,
    pub(crate) marker_source: MarkerSource,
}

impl ExtractSettings {
    /// Resolve the settings from the command line, the environment and a configuration file,
    /// in that order of precedence.
    pub(crate) fn resolve(
        args: ExtractArgs,
        filesystem: Option<FilesystemOptions>,
    ) -> Result<Self, Error> {
        let options = match filesystem {
            Some(filesystem) => {
                debug!(
                    "Applying configuration from: `{}`",
                    filesystem.path().simplified_display()
                );
                filesystem.options
            }
            None => Options::default(),
        };

        let mut extras: BTreeMap<DistributionName, Vec<String>> = BTreeMap::new();
        for request in args.extras {
            extras.entry(request.name).or_default().extend(request.extras);
        }

        let pip_data_exclude = if args.pip_data_exclude.is_empty() {
            options.pip_data_exclude.unwrap_or_default()
        } else {
            args.pip_data_exclude
        };

        let marker_source = if let Some(python) = args.python {
            MarkerSource::Interpreter(python)
        } else if let Some(version) = args.python_version {
            MarkerSource::PythonVersion(version)
        } else if let Some(python) = env_var("BZLPIP_PYTHON") {
            MarkerSource::Interpreter(PathBuf::from(python))
        } else if let Some(version) = env_var("BZLPIP_PYTHON_VERSION") {
            MarkerSource::PythonVersion(PythonVersion::from_str(&version)?)
        } else if let Some(python) = options.python {
            MarkerSource::Interpreter(python)
        } else if let Some(version) = options.python_version {
            MarkerSource::PythonVersion(PythonVersion::from_str(&version)?)
        } else {
            MarkerSource::Interpreter(PathBuf::from("python3"))
        };

        Ok(Self {
            wheel: args.wheel,
            directory: args.directory,
            prefix: args
                .prefix
                .or(options.prefix)
                .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            incremental: args.incremental,
            extras,
            pip_data_exclude,
            enable_implicit_namespace_pkgs: flag(
                args.enable_implicit_namespace_pkgs,
                args.no_enable_implicit_namespace_pkgs,
            )
            .or(options.enable_implicit_namespace_pkgs)
            .unwrap_or(false),
            marker_source,
        })
    }
}

/// Read a non-empty environment variable.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}
