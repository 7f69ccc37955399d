use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};

use bzlpip_normalize::DistributionName;
use bzlpip_wheel::PythonVersion;

#[derive(Parser)]
#[command(name = "bzlpip", author, version, about)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,

    #[command(flatten)]
    pub(crate) global_args: GlobalArgs,
}

#[derive(Args)]
pub(crate) struct GlobalArgs {
    /// Do not print any output.
    #[arg(global = true, long, short, conflicts_with = "verbose")]
    pub(crate) quiet: bool,

    /// Use verbose output.
    ///
    /// You can configure fine-grained logging using the `RUST_LOG` environment variable.
    /// (<https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html#directives>)
    #[arg(global = true, action = clap::ArgAction::Count, long, short, conflicts_with = "quiet")]
    pub(crate) verbose: u8,

    /// The path to a `bzlpip.toml` file to use for configuration.
    ///
    /// By default, `bzlpip.toml` is discovered in the repository root and its ancestors.
    #[arg(global = true, long, env = "BZLPIP_CONFIG_FILE")]
    pub(crate) config_file: Option<PathBuf>,

    /// Avoid discovering a `bzlpip.toml` file.
    #[arg(
        global = true,
        long,
        env = "BZLPIP_NO_CONFIG",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub(crate) no_config: bool,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Unpack a wheel into a Bazel package and print the package's address.
    Extract(ExtractArgs),
    /// Render the `requirements.bzl` file of a pip repository.
    Requirements(RequirementsArgs),
}

#[derive(Args)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct ExtractArgs {
    /// The wheel to extract.
    pub(crate) wheel: PathBuf,

    /// The repository root to extract into.
    #[arg(long, default_value = ".")]
    pub(crate) directory: PathBuf,

    /// The prefix of every generated label.
    ///
    /// Defaults to `pypi__`.
    #[arg(long, env = "BZLPIP_PREFIX")]
    pub(crate) prefix: Option<String>,

    /// Extract the wheel into the repository root itself and address dependencies as external
    /// repositories.
    #[arg(long)]
    pub(crate) incremental: bool,

    /// Extras to activate for a distribution, as `NAME[EXTRA,...]`.
    ///
    /// The name must match the wheel's distribution name exactly. May be provided multiple times.
    #[arg(long = "extra", value_name = "NAME[EXTRA,...]")]
    pub(crate) extras: Vec<ExtraRequest>,

    /// Additional glob patterns to exclude from the library's `data`.
    #[arg(long)]
    pub(crate) pip_data_exclude: Vec<String>,

    /// Keep implicit namespace packages as-is instead of adding pkgutil-style `__init__.py` files.
    #[arg(long, overrides_with("no_enable_implicit_namespace_pkgs"))]
    pub(crate) enable_implicit_namespace_pkgs: bool,

    #[arg(long, overrides_with("enable_implicit_namespace_pkgs"), hide = true)]
    pub(crate) no_enable_implicit_namespace_pkgs: bool,

    /// The Python interpreter whose environment markers are used to select dependencies.
    ///
    /// Defaults to `python3` on the `PATH`.
    #[arg(long, conflicts_with = "python_version")]
    pub(crate) python: Option<PathBuf>,

    /// Select dependencies for the given CPython version on the current platform, without
    /// running an interpreter.
    #[arg(long)]
    pub(crate) python_version: Option<PythonVersion>,
}

#[derive(Args)]
pub(crate) struct RequirementsArgs {
    /// The name of the pip repository (e.g., `@pip`).
    #[arg(long)]
    pub(crate) repo: String,

    /// Write to the given file instead of stdout.
    #[arg(long, short)]
    pub(crate) output: Option<PathBuf>,

    /// The addresses of the extracted packages (e.g., `//pypi__six`).
    #[arg(required = true)]
    pub(crate) targets: Vec<String>,
}

/// Resolve a `--<name>` / `--no-<name>` pair into an override, if either was given.
pub(crate) fn flag(yes: bool, no: bool) -> Option<bool> {
    match (yes, no) {
        (true, false) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
        (..) => unreachable!("Clap should make this impossible"),
    }
}

/// The extras requested for one distribution, e.g., `requests[socks,security]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExtraRequest {
    pub(crate) name: DistributionName,
    pub(crate) extras: Vec<String>,
}

impl FromStr for ExtraRequest {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (name, extras) = value
            .trim()
            .strip_suffix(']')
            .and_then(|value| value.split_once('['))
            .ok_or_else(|| format!("Expected `NAME[EXTRA,...]`, found: `{value}`"))?;
        if name.is_empty() {
            return Err(format!("Missing distribution name in: `{value}`"));
        }
        let extras = extras
            .split(',')
            .map(str::trim)
            .filter(|extra| !extra.is_empty())
            .map(ToString::to_string)
            .collect();
        Ok(Self {
            name: DistributionName::from(name),
            extras,
        })
    }
}
