//! Command implementations for labext-cli

pub mod install;
pub mod list;
pub mod toggle;
pub mod uninstall;

pub use install::{InstallRequest, run_install};
pub use list::run_list;
pub use toggle::run_toggle;
pub use uninstall::run_uninstall;

use std::path::PathBuf;

use labext_core::{JupyterPaths, ProviderRegistry, ScopeFlags};

use crate::cli::LocationArgs;
use crate::error::{CliError, Result};

/// Everything a command needs to resolve directories and packages.
#[derive(Debug, Clone)]
pub struct Context {
    pub paths: JupyterPaths,
    pub registry: ProviderRegistry,
}

impl Context {
    pub fn new(paths: JupyterPaths, package_path: Vec<PathBuf>) -> Self {
        Self {
            paths,
            registry: ProviderRegistry::with_search_path(package_path),
        }
    }

    /// Build from the process environment and the `--package-path` value.
    ///
    /// Without a package path, packages are looked up in the working directory.
    pub fn from_env(package_path: Option<&str>) -> Self {
        let search_path = match package_path.filter(|p| !p.is_empty()) {
            Some(value) => std::env::split_paths(value)
                .filter(|p| !p.as_os_str().is_empty())
                .collect(),
            None => std::env::current_dir().into_iter().collect(),
        };
        Self::new(JupyterPaths::from_env(), search_path)
    }
}

/// The single positional argument a command accepts.
pub fn single_name<'a>(names: &'a [String], action: &str) -> Result<&'a str> {
    match names {
        [name] => Ok(name.as_str()),
        [] => Err(CliError::user(format!(
            "Please specify a labextension to {action}"
        ))),
        _ => Err(CliError::user(format!(
            "Only one labextension allowed at a time. \
             Call multiple times to {action} multiple extensions."
        ))),
    }
}

/// Convert location flags into scope selectors.
pub fn scope_flags(location: &LocationArgs) -> ScopeFlags {
    ScopeFlags {
        user: location.user,
        sys_prefix: location.sys_prefix,
        system: location.system,
        prefix: location.prefix.clone(),
        labextensions_dir: location.labextensions_dir.clone(),
    }
}
