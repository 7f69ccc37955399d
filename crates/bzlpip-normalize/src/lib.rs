pub use label::{CanonicalLabel, Label, PackageAddress};
pub use name::DistributionName;
pub use style::{FlatLabels, LabelStyle, RepositoryLabels};

mod label;
mod name;
mod style;

/// The name of the `filegroup` target that exposes the raw wheel archive.
pub const WHEEL_FILE_LABEL: &str = "whl";

/// The name of the `py_library` target in a repository-qualified package.
pub const PY_LIBRARY_LABEL: &str = "pkg";

/// The label prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "pypi__";
