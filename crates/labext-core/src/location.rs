//! Resolution of scope selectors to concrete directories.
//!
//! Scope selectors are mutually exclusive: supplying more than one is an
//! [`Error::Conflict`], never a priority decision.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::paths::{JupyterPaths, LABEXTENSIONS_DIR, NBCONFIG_DIR};

const LOCATION_SELECTORS: &str = "user, sys_prefix, system, prefix, or labextensions_dir";
const CONFIG_SELECTORS: &str = "user, sys_prefix, or system";

/// Where staged extension assets live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationScope {
    /// `<user data dir>/labextensions`
    User,
    /// `<env prefix>/share/jupyter/labextensions`
    SysPrefix,
    /// `<first system data dir>/labextensions`
    System,
    /// `<prefix>/share/jupyter/labextensions`
    Prefix(PathBuf),
    /// The directory itself.
    Directory(PathBuf),
}

impl LocationScope {
    /// The absolute directory this scope stages into.
    pub fn directory(&self, paths: &JupyterPaths) -> PathBuf {
        match self {
            Self::User => paths.user_data_dir.join(LABEXTENSIONS_DIR),
            Self::SysPrefix => paths.env_data_dir().join(LABEXTENSIONS_DIR),
            Self::System => paths.system_data_dir().join(LABEXTENSIONS_DIR),
            Self::Prefix(prefix) => prefix
                .join("share")
                .join("jupyter")
                .join(LABEXTENSIONS_DIR),
            Self::Directory(dir) => dir.clone(),
        }
    }
}

/// Scope selectors as given on the command line or by a library caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeFlags {
    pub user: bool,
    pub sys_prefix: bool,
    pub system: bool,
    pub prefix: Option<PathBuf>,
    pub labextensions_dir: Option<PathBuf>,
}

fn non_empty(path: &Option<PathBuf>) -> Option<&Path> {
    path.as_deref().filter(|p| !p.as_os_str().is_empty())
}

impl ScopeFlags {
    pub fn user() -> Self {
        Self {
            user: true,
            ..Self::default()
        }
    }

    pub fn sys_prefix() -> Self {
        Self {
            sys_prefix: true,
            ..Self::default()
        }
    }

    pub fn system() -> Self {
        Self {
            system: true,
            ..Self::default()
        }
    }

    pub fn prefix(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::default()
        }
    }

    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        Self {
            labextensions_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    /// The selectors that are set, rendered as `name=value`.
    fn selected(&self) -> Vec<String> {
        let mut set = Vec::new();
        if self.user {
            set.push("user=true".to_string());
        }
        if let Some(prefix) = non_empty(&self.prefix) {
            set.push(format!("prefix={}", prefix.display()));
        }
        if let Some(dir) = non_empty(&self.labextensions_dir) {
            set.push(format!("labextensions_dir={}", dir.display()));
        }
        if self.sys_prefix {
            set.push("sys_prefix=true".to_string());
        }
        if self.system {
            set.push("system=true".to_string());
        }
        set
    }

    /// Whether any selector is set at all.
    pub fn is_explicit(&self) -> bool {
        !self.selected().is_empty()
    }

    /// Validate exclusivity and name the selected scope.
    ///
    /// No selector means the system-wide location.
    pub fn scope(&self) -> Result<LocationScope> {
        let selected = self.selected();
        if selected.len() > 1 {
            return Err(Error::Conflict {
                allowed: LOCATION_SELECTORS,
                flags: selected,
            });
        }

        let scope = if self.user {
            LocationScope::User
        } else if self.sys_prefix {
            LocationScope::SysPrefix
        } else if let Some(prefix) = non_empty(&self.prefix) {
            LocationScope::Prefix(prefix.to_path_buf())
        } else if let Some(dir) = non_empty(&self.labextensions_dir) {
            LocationScope::Directory(dir.to_path_buf())
        } else {
            LocationScope::System
        };
        Ok(scope)
    }

    /// Resolve to the single directory staged assets live in.
    pub fn resolve(&self, paths: &JupyterPaths) -> Result<PathBuf> {
        Ok(self.scope()?.directory(paths))
    }

    /// The configuration scope paired with this location.
    ///
    /// `sys_prefix` wins over `user`; anything else maps to the system tier.
    pub fn config_scope(&self) -> ConfigScope {
        if self.sys_prefix {
            ConfigScope::SysPrefix
        } else if self.user {
            ConfigScope::User
        } else {
            ConfigScope::System
        }
    }
}

/// Which configuration tier enable/disable writes to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigScope {
    #[default]
    User,
    SysPrefix,
    System,
}

impl ConfigScope {
    /// Build from toggle flags. No flag selects the user tier.
    pub fn from_flags(user: bool, sys_prefix: bool, system: bool) -> Result<Self> {
        let selected: Vec<String> = [("user", user), ("sys_prefix", sys_prefix), ("system", system)]
            .into_iter()
            .filter(|(_, set)| *set)
            .map(|(name, _)| format!("{name}=true"))
            .collect();
        if selected.len() > 1 {
            return Err(Error::Conflict {
                allowed: CONFIG_SELECTORS,
                flags: selected,
            });
        }

        Ok(if sys_prefix {
            Self::SysPrefix
        } else if system {
            Self::System
        } else {
            Self::User
        })
    }

    /// The config tier root (without the `nbconfig` component).
    pub fn base_dir(&self, paths: &JupyterPaths) -> PathBuf {
        match self {
            Self::User => paths.user_config_dir.clone(),
            Self::SysPrefix => paths.env_config_dir(),
            Self::System => paths.system_config_dir(),
        }
    }

    /// The `nbconfig` directory section documents live in.
    pub fn config_dir(&self, paths: &JupyterPaths) -> PathBuf {
        self.base_dir(paths).join(NBCONFIG_DIR)
    }
}
