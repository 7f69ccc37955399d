//! Read the name, version and dependencies of a Python wheel, and unpack it.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use bzlpip_fs::Simplified;

#[cfg(any(test, feature = "testing"))]
pub use builder::WheelBuilder;
pub use dist_info::{find_data_dir, find_dist_info, read_root_is_purelib};
pub use filename::WheelFilename;
pub use markers::{PythonVersion, query_interpreter_markers, synthetic_markers};
pub use metadata::Metadata;
pub use pep440_rs::Version;
pub use pep508_rs::MarkerEnvironment;
pub use wheel::Wheel;

#[cfg(any(test, feature = "testing"))]
mod builder;
mod dist_info;
mod filename;
mod markers;
mod metadata;
mod wheel;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Failed to read wheel archive")]
    Zip(#[from] zip::result::ZipError),
    #[error("The wheel filename `{0}` is invalid: {1}")]
    InvalidFilename(String, String),
    /// The wheel is broken
    #[error("The wheel is invalid: {0}")]
    InvalidWheel(String),
    #[error("Failed to parse `{0}` file")]
    MailParse(&'static str, #[source] mailparse::MailParseError),
    #[error("Metadata field {0} not found")]
    FieldNotFound(&'static str),
    #[error("Invalid version `{0}`: {1}")]
    InvalidVersion(String, String),
    #[error("Invalid `Requires-Dist` entry `{0}`: {1}")]
    InvalidRequirement(String, String),
    #[error("`WHEEL` file is missing the `Root-Is-Purelib` key: {}", _0.simplified_display())]
    MissingRootIsPurelib(PathBuf),
    #[error("Invalid Python version `{0}` (expected `<major>.<minor>`)")]
    InvalidPythonVersion(String),
    #[error("Failed to run Python interpreter at: `{}`", _0.simplified_display())]
    PythonLaunch(PathBuf, #[source] io::Error),
    #[error("Python interpreter at `{}` failed to report its markers:\n{}", _0.simplified_display(), _1)]
    PythonFailed(PathBuf, String),
    #[error("Invalid marker values reported by the Python interpreter")]
    MarkerJson(#[from] serde_json::Error),
    #[error("`{1}` is not a valid PEP 440 version for `{0}`: {2}")]
    InvalidMarkerVersion(&'static str, String, String),
}
