//! JSON document loading and saving

use crate::{Error, Result, io};
use serde::{Serialize, de::DeserializeOwned};
use std::path::Path;

/// JSON document store.
///
/// Documents are written pretty-printed with a two-space indent and a
/// trailing newline, always through [`io::write_atomic`].
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonStore;

impl JsonStore {
    /// Create a new JsonStore.
    pub fn new() -> Self {
        Self
    }

    /// Load a document from a file.
    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = io::read_text(path)?;
        serde_json::from_str(&content).map_err(|e| Error::JsonParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load a document, returning `None` when the file does not exist.
    pub fn load_optional<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        if !path.is_file() {
            return Ok(None);
        }
        self.load(path).map(Some)
    }

    /// Save a document to a file.
    pub fn save<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let mut content =
            serde_json::to_string_pretty(value).map_err(|e| Error::JsonSerialize {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        content.push('\n');

        io::write_atomic(path, content.as_bytes())
    }
}
