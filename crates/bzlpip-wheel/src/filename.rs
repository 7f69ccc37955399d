use std::fmt::{Display, Formatter};
use std::str::FromStr;

use pep440_rs::Version;

use crate::Error;

/// The parsed components of a wheel filename.
///
/// See: <https://packaging.python.org/en/latest/specifications/binary-distribution-format/#file-name-convention>
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct WheelFilename {
    pub distribution: String,
    pub version: Version,
    build_tag: Option<String>,
    python_tag: Vec<String>,
    abi_tag: Vec<String>,
    platform_tag: Vec<String>,
}

impl FromStr for WheelFilename {
    type Err = Error;

    fn from_str(filename: &str) -> Result<Self, Self::Err> {
        let basename = filename.strip_suffix(".whl").ok_or_else(|| {
            Error::InvalidFilename(filename.to_string(), "Must end with .whl".to_string())
        })?;
        let (distribution, version, build_tag, python_tag, abi_tag, platform_tag) =
            match basename.split('-').collect::<Vec<_>>().as_slice() {
                &[distribution, version, build_tag, python_tag, abi_tag, platform_tag] => (
                    distribution,
                    version,
                    Some(build_tag),
                    python_tag,
                    abi_tag,
                    platform_tag,
                ),
                &[distribution, version, python_tag, abi_tag, platform_tag] => (
                    distribution,
                    version,
                    None,
                    python_tag,
                    abi_tag,
                    platform_tag,
                ),
                _ => {
                    return Err(Error::InvalidFilename(
                        filename.to_string(),
                        "Expected four or five \"-\" in the filename".to_string(),
                    ));
                }
            };
        let version = Version::from_str(version)
            .map_err(|err| Error::InvalidFilename(filename.to_string(), err.to_string()))?;
        Ok(Self {
            distribution: distribution.to_string(),
            version,
            build_tag: build_tag.map(ToString::to_string),
            python_tag: python_tag.split('.').map(String::from).collect(),
            abi_tag: abi_tag.split('.').map(String::from).collect(),
            platform_tag: platform_tag.split('.').map(String::from).collect(),
        })
    }
}

impl Display for WheelFilename {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.distribution, self.version)?;
        if let Some(build_tag) = &self.build_tag {
            write!(f, "-{build_tag}")?;
        }
        write!(
            f,
            "-{}-{}-{}.whl",
            self.python_tag.join("."),
            self.abi_tag.join("."),
            self.platform_tag.join(".")
        )
    }
}
