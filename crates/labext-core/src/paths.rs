//! Jupyter search-path configuration
//!
//! [`JupyterPaths`] holds every directory tier the labextension workflow reads
//! from or writes to. It is built once from the environment (or explicitly in
//! tests) and passed by reference into every operation, so no operation
//! consults ambient state on its own.
//!
//! Tiers, in search order:
//! 1. User (`JUPYTER_DATA_DIR` / `JUPYTER_CONFIG_DIR`, else platform defaults)
//! 2. Extra paths (`JUPYTER_PATH` / `JUPYTER_CONFIG_PATH`)
//! 3. Environment prefix (`<prefix>/share/jupyter`, `<prefix>/etc/jupyter`)
//! 4. System (`/usr/local/share/jupyter`, `/usr/share/jupyter`, ...)

use std::env;
use std::path::{Path, PathBuf};

/// Subdirectory holding staged extension assets under every data tier.
pub const LABEXTENSIONS_DIR: &str = "labextensions";

/// Subdirectory holding per-section documents under every config tier.
pub const NBCONFIG_DIR: &str = "nbconfig";

/// Search-path configuration for data and config directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JupyterPaths {
    /// Per-user data directory (e.g. `~/.local/share/jupyter`).
    pub user_data_dir: PathBuf,
    /// Per-user config directory (e.g. `~/.jupyter`).
    pub user_config_dir: PathBuf,
    /// Environment prefix, the root of the active virtualenv or conda env.
    pub env_prefix: PathBuf,
    /// Extra data directories searched after the user tier.
    pub extra_data_dirs: Vec<PathBuf>,
    /// Extra config directories searched after the user tier.
    pub extra_config_dirs: Vec<PathBuf>,
    /// System-wide data directories; the first one is the install target.
    pub system_data_dirs: Vec<PathBuf>,
    /// System-wide config directories; the first one is the write target.
    pub system_config_dirs: Vec<PathBuf>,
    /// Restrict configuration lookups to the user tier.
    pub no_config: bool,
}

impl JupyterPaths {
    /// Build the search paths from environment variables and platform defaults.
    pub fn from_env() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

        let user_data_dir = env_path("JUPYTER_DATA_DIR").unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| home.join(".local").join("share"))
                .join("jupyter")
        });
        let user_config_dir =
            env_path("JUPYTER_CONFIG_DIR").unwrap_or_else(|| home.join(".jupyter"));

        let env_prefix = env_path("JUPYTER_PREFIX")
            .or_else(|| env_path("VIRTUAL_ENV"))
            .or_else(|| env_path("CONDA_PREFIX"))
            .unwrap_or_else(default_prefix);

        let system_data_dirs =
            env_path_list("JUPYTER_SYSTEM_DATA_PATH").unwrap_or_else(default_system_data_dirs);
        let system_config_dirs = env_path_list("JUPYTER_SYSTEM_CONFIG_PATH")
            .unwrap_or_else(default_system_config_dirs);

        let paths = Self {
            user_data_dir,
            user_config_dir,
            env_prefix,
            extra_data_dirs: env_path_list("JUPYTER_PATH").unwrap_or_default(),
            extra_config_dirs: env_path_list("JUPYTER_CONFIG_PATH").unwrap_or_default(),
            system_data_dirs,
            system_config_dirs,
            no_config: env_flag("JUPYTER_NO_CONFIG"),
        };
        tracing::debug!(?paths, "Resolved jupyter paths");
        paths
    }

    /// Build search paths rooted entirely under `root`.
    ///
    /// Produces `root/{user-data,user-config,env,system}` tiers, which keeps
    /// tests and sandboxed runs away from the real machine directories.
    pub fn sandboxed(root: &Path) -> Self {
        Self {
            user_data_dir: root.join("user").join("data"),
            user_config_dir: root.join("user").join("config"),
            env_prefix: root.join("env"),
            extra_data_dirs: Vec::new(),
            extra_config_dirs: Vec::new(),
            system_data_dirs: vec![root.join("system").join("share").join("jupyter")],
            system_config_dirs: vec![root.join("system").join("etc").join("jupyter")],
            no_config: false,
        }
    }

    /// Set the explicit no-config startup flag.
    pub fn with_no_config(mut self, no_config: bool) -> Self {
        self.no_config = no_config;
        self
    }

    /// `<prefix>/share/jupyter` for the environment tier.
    pub fn env_data_dir(&self) -> PathBuf {
        self.env_prefix.join("share").join("jupyter")
    }

    /// `<prefix>/etc/jupyter` for the environment tier.
    pub fn env_config_dir(&self) -> PathBuf {
        self.env_prefix.join("etc").join("jupyter")
    }

    /// First system data directory, the default install tier.
    pub fn system_data_dir(&self) -> PathBuf {
        self.system_data_dirs
            .first()
            .cloned()
            .unwrap_or_else(|| default_system_data_dirs().remove(0))
    }

    /// First system config directory.
    pub fn system_config_dir(&self) -> PathBuf {
        self.system_config_dirs
            .first()
            .cloned()
            .unwrap_or_else(|| default_system_config_dirs().remove(0))
    }

    /// All data directories in search order, each joined with `subdir`.
    pub fn data_path(&self, subdir: &str) -> Vec<PathBuf> {
        let tiers = std::iter::once(self.user_data_dir.clone())
            .chain(self.extra_data_dirs.iter().cloned())
            .chain(std::iter::once(self.env_data_dir()))
            .chain(self.system_data_dirs.iter().cloned());

        dedup(tiers.map(|dir| {
            if subdir.is_empty() {
                dir
            } else {
                dir.join(subdir)
            }
        }))
    }

    /// All config directories in search order.
    ///
    /// With `no_config` set only the user config directory is returned.
    pub fn config_path(&self) -> Vec<PathBuf> {
        if self.no_config {
            return vec![self.user_config_dir.clone()];
        }

        let tiers = std::iter::once(self.user_config_dir.clone())
            .chain(self.extra_config_dirs.iter().cloned())
            .chain(std::iter::once(self.env_config_dir()))
            .chain(self.system_config_dirs.iter().cloned());
        dedup(tiers)
    }

    /// Every `labextensions` directory in search order.
    pub fn labextensions_path(&self) -> Vec<PathBuf> {
        self.data_path(LABEXTENSIONS_DIR)
    }

    /// Every `nbconfig` directory in search order.
    pub fn nbconfig_path(&self) -> Vec<PathBuf> {
        self.config_path()
            .into_iter()
            .map(|dir| dir.join(NBCONFIG_DIR))
            .collect()
    }

    /// The asset search path a host serves labextensions from: application
    /// specific directories first, then every known `labextensions` directory.
    pub fn labextensions_search_path(&self, extra: &[PathBuf]) -> Vec<PathBuf> {
        dedup(extra.iter().cloned().chain(self.labextensions_path()))
    }
}

impl Default for JupyterPaths {
    fn default() -> Self {
        Self::from_env()
    }
}

fn dedup(paths: impl IntoIterator<Item = PathBuf>) -> Vec<PathBuf> {
    let mut seen = Vec::new();
    for path in paths {
        if !seen.contains(&path) {
            seen.push(path);
        }
    }
    seen
}

fn env_path(name: &str) -> Option<PathBuf> {
    env::var_os(name)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn env_path_list(name: &str) -> Option<Vec<PathBuf>> {
    let value = env::var_os(name).filter(|value| !value.is_empty())?;
    Some(
        env::split_paths(&value)
            .filter(|p| !p.as_os_str().is_empty())
            .collect(),
    )
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false"))
        .unwrap_or(false)
}

#[cfg(windows)]
fn default_prefix() -> PathBuf {
    env_path("PROGRAMDATA").unwrap_or_else(|| PathBuf::from(r"C:\ProgramData"))
}

#[cfg(not(windows))]
fn default_prefix() -> PathBuf {
    PathBuf::from("/usr")
}

#[cfg(windows)]
fn default_system_data_dirs() -> Vec<PathBuf> {
    vec![default_prefix().join("jupyter")]
}

#[cfg(not(windows))]
fn default_system_data_dirs() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/usr/local/share/jupyter"),
        PathBuf::from("/usr/share/jupyter"),
    ]
}

#[cfg(windows)]
fn default_system_config_dirs() -> Vec<PathBuf> {
    vec![default_prefix().join("jupyter")]
}

#[cfg(not(windows))]
fn default_system_config_dirs() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/usr/local/etc/jupyter"),
        PathBuf::from("/etc/jupyter"),
    ]
}
