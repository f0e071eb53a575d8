//! Per-section JSON configuration documents.
//!
//! Each section (a UI surface such as `notebook` or `tree`) is stored as
//! `<nbconfig>/<section>.json`. Packages may drop extra documents into
//! `<nbconfig>/<section>.d/*.json`; those are merged in file-name order on
//! read but never written.

use std::fs;
use std::path::{Path, PathBuf};

use labext_fs::{JsonStore, io};
use serde_json::{Map, Value};

use crate::error::Result;

/// Key holding the `{require: bool}` map inside a section document.
pub const LOAD_EXTENSIONS: &str = "load_extensions";

/// Sections extensions can be loaded into. `common` applies to every page.
pub const NBCONFIG_SECTIONS: [&str; 5] = ["common", "notebook", "tree", "edit", "terminal"];

/// Whether `section` is one of [`NBCONFIG_SECTIONS`].
pub fn is_known_section(section: &str) -> bool {
    NBCONFIG_SECTIONS.contains(&section)
}

/// `{"load_extensions": {require: value}}`, the patch enable and disable apply.
pub fn load_extensions_patch(require: &str, value: Value) -> Map<String, Value> {
    let mut inner = Map::new();
    inner.insert(require.to_string(), value);
    let mut patch = Map::new();
    patch.insert(LOAD_EXTENSIONS.to_string(), Value::Object(inner));
    patch
}

/// Merge `patch` into `target`.
///
/// Nested objects are merged key by key, `null` deletes the key, and objects
/// left empty by the merge are pruned.
pub fn recursive_update(target: &mut Map<String, Value>, patch: &Map<String, Value>) {
    for (key, value) in patch {
        match value {
            Value::Object(nested) => {
                let entry = target
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !entry.is_object() {
                    *entry = Value::Object(Map::new());
                }
                let now_empty = match entry {
                    Value::Object(inner) => {
                        recursive_update(inner, nested);
                        inner.is_empty()
                    }
                    _ => false,
                };
                if now_empty {
                    target.remove(key);
                }
            }
            Value::Null => {
                target.remove(key);
            }
            other => {
                target.insert(key.clone(), other.clone());
            }
        }
    }
}

/// Reads and writes the section documents of one `nbconfig` directory.
#[derive(Debug, Clone)]
pub struct SectionConfigManager {
    config_dir: PathBuf,
    store: JsonStore,
}

impl SectionConfigManager {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            store: JsonStore::new(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path of the main document for `section`.
    pub fn file_name(&self, section: &str) -> PathBuf {
        self.config_dir.join(format!("{section}.json"))
    }

    fn lock_file(&self, section: &str) -> PathBuf {
        self.config_dir.join(format!(".{section}.json.lock"))
    }

    fn drop_in_files(&self, section: &str) -> Result<Vec<PathBuf>> {
        let drop_in_dir = self.config_dir.join(format!("{section}.d"));
        if !drop_in_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&drop_in_dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn load_into(&self, data: &mut Map<String, Value>, path: &Path) -> Result<()> {
        match self.store.load_optional::<Value>(path)? {
            Some(Value::Object(doc)) => recursive_update(data, &doc),
            Some(other) => {
                tracing::warn!(
                    "Ignoring {}: expected a JSON object, found {}",
                    path.display(),
                    other
                );
            }
            None => {}
        }
        Ok(())
    }

    /// The merged view of a section: main document plus drop-ins.
    pub fn get(&self, section: &str) -> Result<Map<String, Value>> {
        let mut data = self.get_own(section)?;
        for path in self.drop_in_files(section)? {
            self.load_into(&mut data, &path)?;
        }
        Ok(data)
    }

    /// The main document of a section only.
    pub fn get_own(&self, section: &str) -> Result<Map<String, Value>> {
        let mut data = Map::new();
        self.load_into(&mut data, &self.file_name(section))?;
        Ok(data)
    }

    /// Replace a section's main document.
    pub fn set(&self, section: &str, data: &Map<String, Value>) -> Result<()> {
        self.store.save(&self.file_name(section), data)?;
        Ok(())
    }

    /// Merge `patch` into a section's main document and return the result.
    ///
    /// The read-modify-write runs under an exclusive lock so concurrent
    /// writers do not lose each other's changes. A patch that changes nothing
    /// touches neither the document nor the lock file, and does not create
    /// the config directory.
    pub fn update(&self, section: &str, patch: &Map<String, Value>) -> Result<Map<String, Value>> {
        let current = self.get_own(section)?;
        let mut patched = current.clone();
        recursive_update(&mut patched, patch);
        if patched == current {
            return Ok(current);
        }

        let _guard = io::lock_exclusive(&self.lock_file(section))?;

        let mut data = self.get_own(section)?;
        let before = data.clone();
        recursive_update(&mut data, patch);
        if data != before {
            self.set(section, &data)?;
        }
        Ok(data)
    }

    /// The value recorded for `require` in the merged `load_extensions` map.
    pub fn load_extension_state(&self, section: &str, require: &str) -> Result<Option<Value>> {
        let data = self.get(section)?;
        Ok(data
            .get(LOAD_EXTENSIONS)
            .and_then(Value::as_object)
            .and_then(|map| map.get(require))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn null_removes_and_prunes_empty_parent() {
        let mut target = object(json!({"load_extensions": {"a/index": true}}));
        recursive_update(&mut target, &object(json!({"load_extensions": {"a/index": null}})));
        assert_eq!(Value::Object(target), json!({}));
    }

    #[test]
    fn nested_merge_keeps_siblings() {
        let mut target = object(json!({"load_extensions": {"a": true}, "other": 1}));
        recursive_update(&mut target, &object(json!({"load_extensions": {"b": true}})));
        assert_eq!(
            Value::Object(target),
            json!({"load_extensions": {"a": true, "b": true}, "other": 1})
        );
    }

    #[test]
    fn scalar_replaced_by_object() {
        let mut target = object(json!({"load_extensions": 3}));
        recursive_update(&mut target, &object(json!({"load_extensions": {"a": true}})));
        assert_eq!(Value::Object(target), json!({"load_extensions": {"a": true}}));
    }

    #[test]
    fn patch_nests_require_under_load_extensions() {
        let patch = load_extensions_patch("ext/index", Value::Bool(true));
        assert_eq!(Value::Object(patch), json!({"load_extensions": {"ext/index": true}}));
    }

    #[test]
    fn known_sections() {
        assert!(is_known_section("notebook"));
        assert!(!is_known_section("lab"));
    }
}
