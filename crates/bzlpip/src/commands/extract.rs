use std::fmt::Write;

use anyhow::{Context, Result};
use tracing::debug;

use bzlpip_extract::{ExtractMode, ExtractOptions, extract_wheel};
use bzlpip_fs::Simplified;

use crate::printer::Printer;
use crate::settings::ExtractSettings;

/// Extract a single wheel and print the address of the resulting package.
pub(crate) fn extract(settings: ExtractSettings, printer: Printer) -> Result<()> {
    debug!("Using marker source: {:?}", settings.marker_source);
    let markers = settings
        .marker_source
        .markers()
        .context("Failed to determine the target marker environment")?;

    let options = ExtractOptions {
        root: settings.directory,
        extras: settings.extras,
        data_exclude: settings.pip_data_exclude,
        namespace_pkg_compatibility: !settings.enable_implicit_namespace_pkgs,
        prefix: settings.prefix,
        mode: ExtractMode::from_incremental(settings.incremental),
        markers,
    };

    let address = extract_wheel(&settings.wheel, &options).with_context(|| {
        format!(
            "Failed to extract wheel: `{}`",
            settings.wheel.simplified_display()
        )
    })?;

    writeln!(printer.stdout(), "{address}")?;
    Ok(())
}
