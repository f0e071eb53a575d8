//! Enabling, disabling and listing labextensions in section config.
//!
//! Enabling stores `true` under `load_extensions[require]`. Disabling stores
//! `null`, which removes the key, so a disabled extension leaves no trace in
//! the written document.

use std::path::PathBuf;

use serde_json::Value;

use crate::error::Result;
use crate::location::ConfigScope;
use crate::metadata::ProviderRegistry;
use crate::nbconfig::{LOAD_EXTENSIONS, NBCONFIG_SECTIONS, SectionConfigManager, load_extensions_patch};
use crate::paths::JupyterPaths;
use crate::validator::{Warning, validate_require};

/// Section used when a caller or metadata entry names none.
pub const DEFAULT_SECTION: &str = "notebook";

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Whether the merged state of `require` matches `enabled`.
fn state_matches(stored: Option<&Value>, enabled: bool) -> bool {
    if enabled {
        stored == Some(&Value::Bool(true))
    } else {
        !stored.is_some_and(is_truthy)
    }
}

/// Write the enabled state of `require` in `section` of the given scope.
///
/// Returns whether the merged view of the section now agrees with
/// `enabled`. A drop-in document can keep an extension enabled after a
/// disable, in which case this returns `false`.
pub fn set_state(
    section: &str,
    require: &str,
    enabled: bool,
    scope: ConfigScope,
    paths: &JupyterPaths,
) -> Result<bool> {
    let manager = SectionConfigManager::new(scope.config_dir(paths));
    tracing::info!(
        "{} {} extension {}...",
        if enabled { "Enabling" } else { "Disabling" },
        section,
        require
    );

    let value = if enabled { Value::Bool(true) } else { Value::Null };
    manager.update(section, &load_extensions_patch(require, value))?;

    if enabled {
        validate_require(require, paths);
    }

    let stored = manager.load_extension_state(section, require)?;
    Ok(state_matches(stored.as_ref(), enabled))
}

/// Enable `require` in `section`.
pub fn enable(section: &str, require: &str, scope: ConfigScope, paths: &JupyterPaths) -> Result<bool> {
    set_state(section, require, true, scope, paths)
}

/// Disable `require` in `section`.
pub fn disable(section: &str, require: &str, scope: ConfigScope, paths: &JupyterPaths) -> Result<bool> {
    set_state(section, require, false, scope, paths)
}

/// Apply `enabled` to every labextension a package declares.
///
/// Entries without a section use [`DEFAULT_SECTION`]; entries without a
/// require are skipped. Returns one result per toggled entry.
pub fn set_package_state(
    enabled: bool,
    package: &str,
    scope: ConfigScope,
    paths: &JupyterPaths,
    registry: &ProviderRegistry,
) -> Result<Vec<bool>> {
    let (_, entries) = registry.resolve_metadata(package)?;

    let mut results = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(require) = entry.require.as_deref().filter(|r| !r.is_empty()) else {
            tracing::warn!("Skipping {}: no require given", entry.dest);
            continue;
        };
        let section = entry.section.as_deref().unwrap_or(DEFAULT_SECTION);
        results.push(set_state(section, require, enabled, scope, paths)?);
    }
    Ok(results)
}

/// Disable `require` in `section` of the first config directory on the
/// search path where it is enabled. Returns whether anything was disabled.
pub fn find_and_disable(section: &str, require: &str, paths: &JupyterPaths) -> Result<bool> {
    for dir in paths.nbconfig_path() {
        let manager = SectionConfigManager::new(&dir);
        let enabled = manager
            .load_extension_state(section, require)?
            .as_ref()
            .is_some_and(is_truthy);
        if enabled {
            tracing::info!("Disabling {} extension {} in {}", section, require, dir.display());
            manager.update(section, &load_extensions_patch(require, Value::Null))?;
            return Ok(true);
        }
    }
    Ok(false)
}

/// Run [`find_and_disable`] for every known section.
pub fn find_and_disable_all(require: &str, paths: &JupyterPaths) -> Result<bool> {
    let mut disabled = false;
    for section in NBCONFIG_SECTIONS {
        disabled |= find_and_disable(section, require, paths)?;
    }
    Ok(disabled)
}

/// State of one extension as listed in a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionStatus {
    pub require: String,
    pub enabled: bool,
    pub warnings: Vec<Warning>,
}

/// Extensions listed in one section of one config directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionReport {
    pub section: String,
    pub extensions: Vec<ExtensionStatus>,
}

/// Sections with extensions in one config directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDirReport {
    pub config_dir: PathBuf,
    pub sections: Vec<SectionReport>,
}

/// Everything [`list`] found, in config search order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListReport {
    pub config_dirs: Vec<ConfigDirReport>,
}

impl ListReport {
    pub fn is_empty(&self) -> bool {
        self.config_dirs.is_empty()
    }

    /// Every listed extension with the directory and section it was found in.
    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &str, &ExtensionStatus)> {
        self.config_dirs.iter().flat_map(|dir| {
            dir.sections.iter().flat_map(move |section| {
                section
                    .extensions
                    .iter()
                    .map(move |ext| (&dir.config_dir, section.section.as_str(), ext))
            })
        })
    }
}

/// Collect every extension mentioned in every config directory.
///
/// Directories that do not exist are skipped. Enabled extensions are
/// validated; their warnings are attached to the status.
pub fn list(paths: &JupyterPaths) -> Result<ListReport> {
    let mut report = ListReport::default();

    for dir in paths.nbconfig_path() {
        if !dir.is_dir() {
            continue;
        }
        let manager = SectionConfigManager::new(&dir);

        let mut sections = Vec::new();
        for section in NBCONFIG_SECTIONS {
            let data = manager.get(section)?;
            let Some(extensions) = data.get(LOAD_EXTENSIONS).and_then(Value::as_object) else {
                continue;
            };
            if extensions.is_empty() {
                continue;
            }

            let extensions = extensions
                .iter()
                .map(|(require, state)| {
                    let enabled = is_truthy(state);
                    let warnings = if enabled {
                        validate_require(require, paths)
                    } else {
                        Vec::new()
                    };
                    ExtensionStatus {
                        require: require.clone(),
                        enabled,
                        warnings,
                    }
                })
                .collect();
            sections.push(SectionReport {
                section: section.to_string(),
                extensions,
            });
        }

        if !sections.is_empty() {
            report.config_dirs.push(ConfigDirReport {
                config_dir: dir,
                sections,
            });
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness_follows_json_values() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!("")));
    }

    #[test]
    fn disabled_state_accepts_absent_null_and_false() {
        assert!(state_matches(None, false));
        assert!(state_matches(Some(&Value::Null), false));
        assert!(state_matches(Some(&json!(false)), false));
        assert!(!state_matches(Some(&json!(true)), false));
    }

    #[test]
    fn enabled_state_requires_literal_true() {
        assert!(state_matches(Some(&json!(true)), true));
        assert!(!state_matches(None, true));
        assert!(!state_matches(Some(&json!(1)), true));
    }
}
