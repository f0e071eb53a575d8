//! Advisory health checks for staged and enabled labextensions.
//!
//! Validation never fails: problems come back as [`Warning`] values and are
//! logged, leaving the calling command to carry on.

use std::fmt;
use std::path::{Path, PathBuf};

use labext_fs::module_path_to_relative;

use crate::metadata::ExtensionMetadataEntry;
use crate::nbconfig::is_known_section;
use crate::paths::JupyterPaths;

/// A non-fatal validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// No `<require>.js` exists in any labextensions directory.
    MissingRequire { require: String },
    /// A metadata entry names a section that no UI surface loads.
    UnknownSection { section: Option<String> },
    /// The asset a metadata entry requires is absent from its install location.
    MissingAsset { require: String, path: PathBuf },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequire { require } => {
                write!(f, "require? {require}: no {require}.js in any labextensions directory")
            }
            Self::UnknownSection { section } => write!(
                f,
                "section: {} is not a known section",
                section.as_deref().unwrap_or("<none>")
            ),
            Self::MissingAsset { path, .. } => {
                write!(f, "require: {} does not exist", path.display())
            }
        }
    }
}

/// The asset file a require path maps to under `base`.
pub fn require_asset_path(base: &Path, require: &str) -> PathBuf {
    let mut path = base.join(module_path_to_relative(require));
    let file_name = path
        .file_name()
        .map(|name| format!("{}.js", name.to_string_lossy()))
        .unwrap_or_else(|| "index.js".to_string());
    path.set_file_name(file_name);
    path
}

fn report(context: &str, warnings: &[Warning]) {
    if warnings.is_empty() {
        tracing::info!("Validating {context}: OK");
        return;
    }
    tracing::warn!("Validating {context}: problems found");
    for warning in warnings {
        tracing::warn!("  {warning}");
    }
}

/// Check that `<require>.js` exists in at least one labextensions directory.
///
/// Looks across every directory on the search path regardless of which
/// scope the extension was enabled in.
pub fn validate_require(require: &str, paths: &JupyterPaths) -> Vec<Warning> {
    let found = paths
        .labextensions_path()
        .iter()
        .map(|dir| require_asset_path(dir, require))
        .find(|js| js.exists());

    let warnings = match found {
        Some(js) => {
            tracing::debug!("require {} found at {}", require, js.display());
            Vec::new()
        }
        None => vec![Warning::MissingRequire {
            require: require.to_string(),
        }],
    };
    report(require, &warnings);
    warnings
}

/// Assess an installed metadata entry.
///
/// `installed_path` is where the entry was staged, ending in `entry.dest`;
/// the require asset is looked up relative to its labextensions directory.
pub fn validate_metadata_entry(entry: &ExtensionMetadataEntry, installed_path: &Path) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if !entry.section.as_deref().is_some_and(is_known_section) {
        warnings.push(Warning::UnknownSection {
            section: entry.section.clone(),
        });
    }

    if let Some(require) = &entry.require {
        let dest_depth = module_path_to_relative(&entry.dest).components().count();
        let base = installed_path
            .ancestors()
            .nth(dest_depth)
            .unwrap_or(installed_path);
        let asset = require_asset_path(base, require);
        if !asset.exists() {
            warnings.push(Warning::MissingAsset {
                require: require.clone(),
                path: asset,
            });
        }
    }

    report(&entry.dest, &warnings);
    if !warnings.is_empty() {
        tracing::warn!("Full entry: {entry}");
    }
    warnings
}
