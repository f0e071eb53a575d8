//! Enable and disable command implementations.

use colored::Colorize;
use labext_core::{ConfigScope, set_package_state, set_state};

use super::Context;
use crate::cli::ConfigArgs;
use crate::error::Result;

/// Handle `labextension enable|disable <require> [--section S] [--py] [...]`
pub fn run_toggle(
    ctx: &Context,
    name: &str,
    section: &str,
    scope: &ConfigArgs,
    py: bool,
    enabled: bool,
) -> Result<()> {
    let config_scope = ConfigScope::from_flags(scope.user, scope.sys_prefix, scope.system)?;
    let verb = if enabled { "enable" } else { "disable" };

    let ok = if py {
        set_package_state(enabled, name, config_scope, &ctx.paths, &ctx.registry)?
            .into_iter()
            .all(|ok| ok)
    } else {
        set_state(section, name, enabled, config_scope, &ctx.paths)?
    };

    if !ok {
        eprintln!(
            "{} could not {verb} '{name}': another config document overrides it",
            "warning:".yellow().bold()
        );
        return Ok(());
    }

    let status = if enabled {
        "enabled".green()
    } else {
        "disabled".red()
    };
    println!("{} {} {}", "=>".blue().bold(), name.cyan(), status);
    Ok(())
}
