//! Filesystem primitives for the labextension manager
//!
//! Provides locked atomic JSON I/O, mtime-aware staging copies, tree
//! mirroring, removal and archive extraction.

pub mod archive;
pub mod copy;
pub mod error;
pub mod io;
pub mod json;
pub mod path;

pub use archive::{ArchiveKind, archive_members, extract_archive};
pub use copy::{CopyOutcome, MirrorStats, lexists, maybe_copy, mirror_tree, remove_path, should_copy, symlink};
pub use error::{Error, Result};
pub use io::{ExclusiveLock, lock_exclusive};
pub use json::JsonStore;
pub use path::{base_name, is_url, module_path_to_relative, normalize};
