use std::fmt::{Display, Formatter};
use std::path::Path;
use std::process::Command;
use std::str::FromStr;

use pep508_rs::{MarkerEnvironment, StringVersion};
use serde::Deserialize;
use tracing::debug;

use bzlpip_fs::Simplified;

use crate::Error;

/// A `<major>.<minor>` CPython version, e.g., `3.11`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PythonVersion {
    pub major: u8,
    pub minor: u8,
}

impl FromStr for PythonVersion {
    type Err = Error;

    fn from_str(version: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidPythonVersion(version.to_string());
        let (major, minor) = version.trim().split_once('.').ok_or_else(invalid)?;
        Ok(Self {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
        })
    }
}

impl Display for PythonVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// The marker values as reported by an interpreter, before version validation.
#[derive(Debug, Deserialize)]
struct MarkerValues {
    implementation_name: String,
    implementation_version: String,
    os_name: String,
    platform_machine: String,
    platform_python_implementation: String,
    platform_release: String,
    platform_system: String,
    platform_version: String,
    python_full_version: String,
    python_version: String,
    sys_platform: String,
}

impl MarkerValues {
    fn into_environment(self) -> Result<MarkerEnvironment, Error> {
        Ok(MarkerEnvironment {
            implementation_name: self.implementation_name,
            implementation_version: string_version(
                "implementation_version",
                &self.implementation_version,
            )?,
            os_name: self.os_name,
            platform_machine: self.platform_machine,
            platform_python_implementation: self.platform_python_implementation,
            platform_release: self.platform_release,
            platform_system: self.platform_system,
            platform_version: self.platform_version,
            python_full_version: string_version("python_full_version", &self.python_full_version)?,
            python_version: string_version("python_version", &self.python_version)?,
            sys_platform: self.sys_platform,
        })
    }
}

fn string_version(field: &'static str, value: &str) -> Result<StringVersion, Error> {
    StringVersion::from_str(value)
        .map_err(|err| Error::InvalidMarkerVersion(field, value.to_string(), err.to_string()))
}

/// Build a [`MarkerEnvironment`] for CPython `version` on the host operating system and
/// architecture, without running an interpreter.
///
/// Values that can't be known without an interpreter (`platform_release`,
/// `platform_version`) are left empty.
pub fn synthetic_markers(version: PythonVersion) -> Result<MarkerEnvironment, Error> {
    let (sys_platform, os_name, platform_system) = match std::env::consts::OS {
        "macos" => ("darwin", "posix", "Darwin"),
        "windows" => ("win32", "nt", "Windows"),
        "freebsd" => ("freebsd", "posix", "FreeBSD"),
        _ => ("linux", "posix", "Linux"),
    };
    let platform_machine = match (std::env::consts::OS, std::env::consts::ARCH) {
        ("macos", "aarch64") => "arm64",
        ("windows", "x86_64") => "AMD64",
        ("windows", "aarch64") => "ARM64",
        (_, arch) => arch,
    };
    let full_version = format!("{version}.0");

    let values = MarkerValues {
        implementation_name: "cpython".to_string(),
        implementation_version: full_version.clone(),
        os_name: os_name.to_string(),
        platform_machine: platform_machine.to_string(),
        platform_python_implementation: "CPython".to_string(),
        platform_release: String::new(),
        platform_system: platform_system.to_string(),
        platform_version: String::new(),
        python_full_version: full_version,
        python_version: version.to_string(),
        sys_platform: sys_platform.to_string(),
    };
    debug!("Using synthetic markers for CPython {version} on {sys_platform}");
    values.into_environment()
}

/// Return the [`MarkerEnvironment`] of the given Python executable.
pub fn query_interpreter_markers(python: impl AsRef<Path>) -> Result<MarkerEnvironment, Error> {
    let python = python.as_ref();
    debug!("Detecting markers for: `{}`", python.simplified_display());
    let output = Command::new(python)
        .args(["-c", CAPTURE_MARKERS_SCRIPT])
        .output()
        .map_err(|err| Error::PythonLaunch(python.to_path_buf(), err))?;
    if !output.status.success() {
        return Err(Error::PythonFailed(
            python.to_path_buf(),
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }
    serde_json::from_slice::<MarkerValues>(&output.stdout)?.into_environment()
}

const CAPTURE_MARKERS_SCRIPT: &str = "
import os
import sys
import platform
import json
def format_full_version(info):
    version = '{0.major}.{0.minor}.{0.micro}'.format(info)
    kind = info.releaselevel
    if kind != 'final':
        version += kind[0] + str(info.serial)
    return version

if hasattr(sys, 'implementation'):
    implementation_version = format_full_version(sys.implementation.version)
    implementation_name = sys.implementation.name
else:
    implementation_version = '0'
    implementation_name = ''
bindings = {
    'implementation_name': implementation_name,
    'implementation_version': implementation_version,
    'os_name': os.name,
    'platform_machine': platform.machine(),
    'platform_python_implementation': platform.python_implementation(),
    'platform_release': platform.release(),
    'platform_system': platform.system(),
    'platform_version': platform.version(),
    'python_full_version': platform.python_version(),
    'python_version': '.'.join(platform.python_version_tuple()[:2]),
    'sys_platform': sys.platform,
}
json.dump(bindings, sys.stdout)
sys.stdout.flush()
";
