//! Package metadata discovery.
//!
//! A package that bundles labextensions exposes them through the
//! [`ExtensionProvider`] capability. The stock implementation,
//! [`ManifestProvider`], reads a [`MANIFEST_FILENAME`](crate::MANIFEST_FILENAME)
//! file at the package root:
//!
//! ```toml
//! [[labextension]]
//! section = "notebook"
//! src = "static"
//! dest = "my_ext"
//! require = "my_ext/index"
//! ```
//!
//! [`ProviderRegistry`] maps package names to providers, either from explicit
//! registrations or by looking the name up on a package search path.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use labext_fs::module_path_to_relative;
use serde::{Deserialize, Serialize};

use crate::MANIFEST_FILENAME;
use crate::error::{Error, Result};

/// One labextension bundled in a package.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExtensionMetadataEntry {
    /// Config section the extension is loaded into.
    #[serde(default)]
    pub section: Option<String>,
    /// Source path relative to the package root.
    pub src: String,
    /// Name the extension is staged under.
    pub dest: String,
    /// Module path used as the `load_extensions` key.
    #[serde(default)]
    pub require: Option<String>,
}

impl ExtensionMetadataEntry {
    pub fn new(
        section: impl Into<String>,
        src: impl Into<String>,
        dest: impl Into<String>,
        require: impl Into<String>,
    ) -> Self {
        Self {
            section: Some(section.into()),
            src: src.into(),
            dest: dest.into(),
            require: Some(require.into()),
        }
    }
}

impl fmt::Display for ExtensionMetadataEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{section: {}, src: {}, dest: {}, require: {}}}",
            self.section.as_deref().unwrap_or("<none>"),
            self.src,
            self.dest,
            self.require.as_deref().unwrap_or("<none>")
        )
    }
}

/// Capability implemented by anything that can declare bundled labextensions.
pub trait ExtensionProvider: fmt::Debug + Send + Sync {
    /// Package name.
    fn name(&self) -> &str;

    /// Directory `src` entries are resolved against.
    fn root(&self) -> &Path;

    /// The declared entries, returned verbatim.
    fn discover_extension_entries(&self) -> Result<Vec<ExtensionMetadataEntry>>;
}

#[derive(Debug, Deserialize)]
struct PackageManifest {
    #[serde(default)]
    labextension: Option<Vec<ExtensionMetadataEntry>>,
}

/// Provider backed by a manifest file in a package directory.
#[derive(Debug, Clone)]
pub struct ManifestProvider {
    name: String,
    root: PathBuf,
}

impl ManifestProvider {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILENAME)
    }
}

impl ExtensionProvider for ManifestProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn discover_extension_entries(&self) -> Result<Vec<ExtensionMetadataEntry>> {
        let manifest_path = self.manifest_path();
        let missing = || Error::MissingEntryPoint {
            package: self.name.clone(),
            manifest: manifest_path.clone(),
        };

        if !manifest_path.is_file() {
            return Err(missing());
        }

        let content = labext_fs::io::read_text(&manifest_path)?;
        let manifest: PackageManifest =
            toml::from_str(&content).map_err(|source| Error::ManifestParse {
                path: manifest_path.clone(),
                source,
            })?;

        manifest.labextension.ok_or_else(missing)
    }
}

/// Provider with entries declared in code.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    name: String,
    root: PathBuf,
    entries: Vec<ExtensionMetadataEntry>,
}

impl StaticProvider {
    pub fn new(
        name: impl Into<String>,
        root: impl Into<PathBuf>,
        entries: Vec<ExtensionMetadataEntry>,
    ) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            entries,
        }
    }
}

impl ExtensionProvider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn discover_extension_entries(&self) -> Result<Vec<ExtensionMetadataEntry>> {
        Ok(self.entries.clone())
    }
}

/// Registry resolving package names to providers.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn ExtensionProvider>>,
    search_path: Vec<PathBuf>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry that looks packages up under `search_path`.
    pub fn with_search_path(search_path: Vec<PathBuf>) -> Self {
        Self {
            providers: HashMap::new(),
            search_path,
        }
    }

    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    /// Register a provider under its own name, replacing any previous one.
    pub fn register(&mut self, provider: impl ExtensionProvider + 'static) {
        self.providers
            .insert(provider.name().to_string(), Arc::new(provider));
    }

    /// Look up an explicitly registered provider.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ExtensionProvider>> {
        self.providers.get(name).cloned()
    }

    /// Names of explicitly registered providers (sorted).
    pub fn registered(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Find the provider for `name`.
    ///
    /// Registered providers come first, then `name` as an explicit
    /// directory path, then `<dir>/<name>` for each search-path directory
    /// (dots in `name` separate nested package directories).
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn ExtensionProvider>> {
        if let Some(provider) = self.get(name) {
            return Ok(provider);
        }

        let explicit = Path::new(name);
        let looks_like_path = explicit.is_absolute()
            || name.starts_with('.')
            || name.contains('/')
            || name.contains(std::path::MAIN_SEPARATOR);
        if looks_like_path && explicit.is_dir() {
            let package = labext_fs::base_name(explicit).unwrap_or_else(|| name.to_string());
            return Ok(Arc::new(ManifestProvider::new(package, explicit)));
        }

        let relative = module_path_to_relative(&name.replace('.', "/"));
        for dir in &self.search_path {
            let candidate = dir.join(&relative);
            if candidate.is_dir() {
                tracing::debug!("Resolved package {} at {}", name, candidate.display());
                return Ok(Arc::new(ManifestProvider::new(name, candidate)));
            }
        }

        Err(Error::PackageNotFound {
            name: name.to_string(),
            searched: self.search_path.clone(),
        })
    }

    /// Resolve `name` and return its provider together with its entries.
    pub fn resolve_metadata(
        &self,
        name: &str,
    ) -> Result<(Arc<dyn ExtensionProvider>, Vec<ExtensionMetadataEntry>)> {
        let provider = self.resolve(name)?;
        let entries = provider.discover_extension_entries()?;
        Ok((provider, entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_is_empty() {
        let registry = ProviderRegistry::new();
        assert!(registry.registered().is_empty());
        assert!(registry.search_path().is_empty());
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut registry = ProviderRegistry::new();
        registry.register(StaticProvider::new("pkg", "/first", vec![]));
        registry.register(StaticProvider::new("pkg", "/second", vec![]));

        assert_eq!(registry.registered(), vec!["pkg"]);
        assert_eq!(registry.get("pkg").unwrap().root(), Path::new("/second"));
    }

    #[test]
    fn test_unknown_package_lists_search_path() {
        let registry = ProviderRegistry::with_search_path(vec![PathBuf::from("/nowhere")]);
        let err = registry.resolve("missing_pkg").unwrap_err();
        assert!(matches!(err, Error::PackageNotFound { .. }));
        assert!(err.to_string().contains("/nowhere"));
    }

    #[test]
    fn test_manifest_entries_parse_with_optional_fields() {
        let manifest: PackageManifest = toml::from_str(
            r#"
[[labextension]]
src = "static"
dest = "my_ext"
"#,
        )
        .unwrap();
        let entries = manifest.labextension.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].section.is_none());
        assert!(entries[0].require.is_none());
    }

    #[test]
    fn test_manifest_without_key_has_no_entries() {
        let manifest: PackageManifest = toml::from_str("name = \"pkg\"\n").unwrap();
        assert!(manifest.labextension.is_none());
    }
}
