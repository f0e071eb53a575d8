//! Labextension management: staging, toggling and package discovery.
//!
//! This crate stages labextension assets into Jupyter data directories,
//! toggles them in per-section configuration, and discovers the extensions
//! a package bundles.
//!
//! Every operation takes a [`JupyterPaths`] describing the directory tiers
//! to use; nothing reads ambient state on its own.

pub mod error;
pub mod location;
pub mod metadata;
pub mod nbconfig;
pub mod paths;
pub mod stager;
pub mod toggler;
pub mod validator;

/// The filename a package declares its bundled labextensions in.
///
/// Packages place this file at their root; [`ManifestProvider`] reads the
/// `[[labextension]]` tables from it.
pub const MANIFEST_FILENAME: &str = "labextension.toml";

pub use error::{Error, Result};
pub use location::{ConfigScope, LocationScope, ScopeFlags};
pub use metadata::{
    ExtensionMetadataEntry, ExtensionProvider, ManifestProvider, ProviderRegistry, StaticProvider,
};
pub use nbconfig::{LOAD_EXTENSIONS, NBCONFIG_SECTIONS, SectionConfigManager, recursive_update};
pub use paths::JupyterPaths;
pub use stager::{
    InstallOptions, InstallReport, check, develop, develop_entries, find_and_uninstall,
    find_and_uninstall_in, install, install_with_report, uninstall, uninstall_package,
};
pub use toggler::{
    ConfigDirReport, DEFAULT_SECTION, ExtensionStatus, ListReport, SectionReport, disable, enable,
    find_and_disable, find_and_disable_all, list, set_package_state, set_state,
};
pub use validator::{Warning, validate_metadata_entry, validate_require};
