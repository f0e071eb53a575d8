//! Install command implementation.
//!
//! Stages a single file, directory or archive, or every labextension a
//! package declares with `--py`, then prints the command that enables it.

use std::path::Path;

use colored::Colorize;
use labext_core::{InstallOptions, develop_entries, install_with_report, validate_metadata_entry};

use super::{Context, scope_flags};
use crate::cli::LocationArgs;
use crate::error::Result;

/// Options of one `labextension install` invocation.
#[derive(Debug, Clone, Default)]
pub struct InstallRequest {
    pub location: LocationArgs,
    pub overwrite: bool,
    pub symlink: bool,
    pub destination: Option<String>,
    pub py: bool,
}

impl InstallRequest {
    fn options(&self) -> InstallOptions {
        InstallOptions {
            overwrite: self.overwrite,
            symlink: self.symlink,
            destination: self.destination.clone(),
        }
    }
}

/// Handle `labextension install <path> [--py] [...]`
pub fn run_install(ctx: &Context, name: &str, request: &InstallRequest) -> Result<()> {
    let flags = scope_flags(&request.location);

    if request.py {
        if request.destination.is_some() {
            tracing::warn!("--destination is ignored with --py");
        }
        let options = InstallOptions {
            destination: None,
            ..request.options()
        };
        let staged = develop_entries(name, &flags, &options, &ctx.paths, &ctx.registry)?;

        for (entry, dest) in &staged {
            println!("{} Installed {}", "=>".blue().bold(), dest.display());
            for warning in validate_metadata_entry(entry, dest) {
                println!("   {} {}", "warning:".yellow(), warning);
            }
        }
        if !staged.is_empty() {
            print_enable_hint(name, request);
        }
        return Ok(());
    }

    let report = install_with_report(Path::new(name), &flags, &request.options(), &ctx.paths)?;
    if report.linked {
        println!("{} Linked {}", "=>".blue().bold(), report.destination.display());
    } else if !report.extracted.is_empty() {
        for member in &report.extracted {
            println!(
                "{} Extracted {}",
                "=>".blue().bold(),
                report.destination.join(member).display()
            );
        }
    } else {
        println!(
            "{} Installed {} ({} copied, {} up to date)",
            "=>".blue().bold(),
            report.destination.display(),
            report.copied,
            report.skipped
        );
    }
    print_enable_hint("<the entry point>", request);

    Ok(())
}

fn enable_hint(target: &str, request: &InstallRequest) -> String {
    format!(
        "labextension enable {}{}{}{}",
        target,
        if request.location.user { " --user" } else { "" },
        if request.py { " --py" } else { "" },
        if request.location.sys_prefix {
            " --sys-prefix"
        } else {
            ""
        }
    )
}

fn print_enable_hint(target: &str, request: &InstallRequest) {
    println!();
    println!(
        "To initialize this labextension in the browser every time the notebook (or other app) loads:"
    );
    println!();
    println!("      {}", enable_hint(target, request).bold());
    println!();
}
