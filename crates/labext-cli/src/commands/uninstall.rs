//! Uninstall command implementation.

use colored::Colorize;
use labext_core::{find_and_disable_all, find_and_uninstall, uninstall, uninstall_package};

use super::{Context, scope_flags};
use crate::cli::LocationArgs;
use crate::error::Result;

/// Handle `labextension uninstall <name> [--require R] [--py] [...]`
///
/// With a location flag only that location is touched. Without one, the
/// first directory on the search path holding the extension is used and
/// requires are disabled wherever they are enabled.
pub fn run_uninstall(
    ctx: &Context,
    name: &str,
    location: &LocationArgs,
    require: Option<&str>,
    py: bool,
) -> Result<()> {
    let flags = scope_flags(location);
    let require = require.filter(|r| !r.is_empty());

    if flags.is_explicit() {
        if py {
            uninstall_package(name, &flags, &ctx.paths, &ctx.registry)?;
        } else {
            uninstall(name, &flags, require, &ctx.paths)?;
        }
        println!("{} Uninstalled {}", "=>".blue().bold(), name.cyan());
        return Ok(());
    }

    let changed = if py {
        let (_, entries) = ctx.registry.resolve_metadata(name)?;
        let mut changed = false;
        for entry in &entries {
            if find_and_uninstall(&entry.dest, &ctx.paths)? {
                changed = true;
            }
            if let Some(entry_require) = entry.require.as_deref() {
                find_and_disable_all(entry_require, &ctx.paths)?;
            }
        }
        changed
    } else {
        find_and_uninstall(name, &ctx.paths)?
    };

    if changed {
        println!("{} Uninstalled {}", "=>".blue().bold(), name.cyan());
    } else {
        println!("No installed extension '{name}' found.");
    }

    if let Some(require) = require {
        find_and_disable_all(require, &ctx.paths)?;
    }

    Ok(())
}
