//! [`TestPackage`] builder for packages that bundle labextensions.

use std::fs;
use std::path::{Path, PathBuf};

/// One `[[labextension]]` table.
#[derive(Debug, Clone)]
struct Entry {
    section: Option<String>,
    src: String,
    dest: String,
    require: Option<String>,
}

/// Builds a package directory with a `labextension.toml` manifest and
/// asset files.
///
/// # Example
///
/// ```rust,no_run
/// use labext_test_utils::{TestPackage, TestSandbox};
///
/// let sandbox = TestSandbox::new();
/// let pkg = TestPackage::new("my_pkg")
///     .file("static/index.js", "define([], {});")
///     .entry("notebook", "static", "my_ext", "my_ext/index")
///     .write_to(&sandbox.package_dir());
/// assert!(pkg.join("labextension.toml").exists());
/// ```
#[derive(Debug, Clone)]
pub struct TestPackage {
    name: String,
    files: Vec<(String, String)>,
    entries: Vec<Entry>,
    manifest: bool,
}

impl TestPackage {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            files: Vec::new(),
            entries: Vec::new(),
            manifest: true,
        }
    }

    /// Add a file relative to the package root.
    pub fn file(mut self, path: &str, content: &str) -> Self {
        self.files.push((path.to_string(), content.to_string()));
        self
    }

    /// Declare a labextension with every field set.
    pub fn entry(mut self, section: &str, src: &str, dest: &str, require: &str) -> Self {
        self.entries.push(Entry {
            section: Some(section.to_string()),
            src: src.to_string(),
            dest: dest.to_string(),
            require: Some(require.to_string()),
        });
        self
    }

    /// Declare a labextension with only `src` and `dest`.
    pub fn bare_entry(mut self, src: &str, dest: &str) -> Self {
        self.entries.push(Entry {
            section: None,
            src: src.to_string(),
            dest: dest.to_string(),
            require: None,
        });
        self
    }

    /// Do not write a manifest at all.
    pub fn without_manifest(mut self) -> Self {
        self.manifest = false;
        self
    }

    /// The manifest text this package would write.
    pub fn manifest_text(&self) -> String {
        let mut text = format!("# {}\n", self.name);
        for entry in &self.entries {
            text.push_str("\n[[labextension]]\n");
            if let Some(section) = &entry.section {
                text.push_str(&format!("section = \"{section}\"\n"));
            }
            text.push_str(&format!("src = \"{}\"\n", entry.src));
            text.push_str(&format!("dest = \"{}\"\n", entry.dest));
            if let Some(require) = &entry.require {
                text.push_str(&format!("require = \"{require}\"\n"));
            }
        }
        text
    }

    /// Write the package under `parent/<name>` (dots become directories) and
    /// return its root.
    pub fn write_to(&self, parent: &Path) -> PathBuf {
        let root = self
            .name
            .split('.')
            .fold(parent.to_path_buf(), |dir, part| dir.join(part));
        fs::create_dir_all(&root).unwrap();

        for (path, content) in &self.files {
            let full_path = root.join(path);
            if let Some(dir) = full_path.parent() {
                fs::create_dir_all(dir).unwrap();
            }
            fs::write(&full_path, content).unwrap();
        }

        if self.manifest {
            fs::write(root.join("labextension.toml"), self.manifest_text()).unwrap();
        }
        root
    }
}
