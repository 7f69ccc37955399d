use std::fmt::Write;

use anyhow::Result;
use tracing::debug;

use bzlpip_build_file::generate_requirements_file_contents;
use bzlpip_fs::Simplified;
use bzlpip_normalize::Label;

use crate::cli::RequirementsArgs;
use crate::printer::Printer;

/// Render `requirements.bzl` for the given package addresses.
pub(crate) fn requirements(args: RequirementsArgs, printer: Printer) -> Result<()> {
    let targets = args
        .targets
        .iter()
        .map(|target| Label::quoted(&format!("{}{}", args.repo, target.trim_matches('"'))))
        .collect::<Vec<_>>();
    let contents = generate_requirements_file_contents(&args.repo, &targets);

    if let Some(output) = &args.output {
        fs_err::write(output, contents)?;
        debug!(
            "Wrote {} requirements to: `{}`",
            targets.len(),
            output.simplified_display()
        );
    } else {
        write!(printer.stdout(), "{contents}")?;
    }
    Ok(())
}
