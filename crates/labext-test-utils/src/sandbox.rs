//! [`TestSandbox`]: a temporary directory laid out like the Jupyter tiers.
//!
//! The layout matches `JupyterPaths::sandboxed(root)`:
//!
//! ```text
//! <root>/user/data            user data tier
//! <root>/user/config          user config tier
//! <root>/env                  environment prefix
//! <root>/system/share/jupyter system data tier
//! <root>/system/etc/jupyter   system config tier
//! <root>/packages             package search path
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

/// A temporary sandbox with helper methods for setup and assertion.
///
/// # Example
///
/// ```rust,no_run
/// use labext_test_utils::TestSandbox;
///
/// let sandbox = TestSandbox::new();
/// sandbox.write_file("src/ext/index.js", "define([], {});");
/// sandbox.assert_exists("src/ext/index.js");
/// ```
pub struct TestSandbox {
    temp_dir: TempDir,
}

impl Default for TestSandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSandbox {
    /// Create an empty sandbox.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Root of the sandbox.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn user_data_dir(&self) -> PathBuf {
        self.root().join("user").join("data")
    }

    pub fn user_config_dir(&self) -> PathBuf {
        self.root().join("user").join("config")
    }

    pub fn env_prefix(&self) -> PathBuf {
        self.root().join("env")
    }

    pub fn system_data_dir(&self) -> PathBuf {
        self.root().join("system").join("share").join("jupyter")
    }

    pub fn system_config_dir(&self) -> PathBuf {
        self.root().join("system").join("etc").join("jupyter")
    }

    /// Directory packages are looked up in.
    pub fn package_dir(&self) -> PathBuf {
        self.root().join("packages")
    }

    pub fn user_labextensions(&self) -> PathBuf {
        self.user_data_dir().join("labextensions")
    }

    pub fn env_labextensions(&self) -> PathBuf {
        self.env_prefix()
            .join("share")
            .join("jupyter")
            .join("labextensions")
    }

    pub fn system_labextensions(&self) -> PathBuf {
        self.system_data_dir().join("labextensions")
    }

    pub fn user_nbconfig(&self) -> PathBuf {
        self.user_config_dir().join("nbconfig")
    }

    pub fn env_nbconfig(&self) -> PathBuf {
        self.env_prefix().join("etc").join("jupyter").join("nbconfig")
    }

    pub fn system_nbconfig(&self) -> PathBuf {
        self.system_config_dir().join("nbconfig")
    }

    /// Environment variables pointing a spawned binary at this sandbox.
    pub fn env_vars(&self) -> Vec<(&'static str, PathBuf)> {
        vec![
            ("JUPYTER_DATA_DIR", self.user_data_dir()),
            ("JUPYTER_CONFIG_DIR", self.user_config_dir()),
            ("JUPYTER_PREFIX", self.env_prefix()),
            ("JUPYTER_SYSTEM_DATA_PATH", self.system_data_dir()),
            ("JUPYTER_SYSTEM_CONFIG_PATH", self.system_config_dir()),
            ("LABEXT_PACKAGE_PATH", self.package_dir()),
        ]
    }

    /// Write `content` to `path` (relative to root), creating parents.
    pub fn write_file(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.root().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content).unwrap();
        full_path
    }

    /// Write a JSON document to an absolute path, creating parents.
    pub fn write_json(&self, path: &Path, value: &Value) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    /// Read a JSON document from an absolute path.
    ///
    /// # Panics
    /// Panics if the file is missing or not valid JSON.
    pub fn read_json(&self, path: &Path) -> Value {
        let content = fs::read_to_string(path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()));
        serde_json::from_str(&content)
            .unwrap_or_else(|e| panic!("Invalid JSON in {}: {e}", path.display()))
    }

    /// The `load_extensions` entry for `require` in a section document, if any.
    pub fn load_extension_value(&self, nbconfig: &Path, section: &str, require: &str) -> Option<Value> {
        let path = nbconfig.join(format!("{section}.json"));
        if !path.exists() {
            return None;
        }
        self.read_json(&path)
            .get("load_extensions")
            .and_then(|map| map.get(require))
            .cloned()
    }

    /// Assert that `path` (relative to root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected path to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to root) does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_not_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            !full_path.exists(),
            "Expected path NOT to exist: {}",
            full_path.display()
        );
    }
}
