//! Staging copies with modification-time comparison
//!
//! Files are only copied when the destination is missing or older than the
//! source. Copies carry the source modification time over, so a second
//! staging pass over an unchanged tree copies nothing.

use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};

use walkdir::WalkDir;

use crate::{Error, Result};

/// Tolerance absorbing timestamp precision differences between filesystems.
const MTIME_EPSILON: Duration = Duration::from_micros(1);

/// What [`maybe_copy`] did with a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The destination was missing or out of date and has been written.
    Copied,
    /// The destination was already up to date.
    UpToDate,
}

/// Counters collected by [`mirror_tree`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorStats {
    pub copied: usize,
    pub skipped: usize,
    pub directories_created: usize,
}

impl MirrorStats {
    fn record(&mut self, outcome: CopyOutcome) {
        match outcome {
            CopyOutcome::Copied => self.copied += 1,
            CopyOutcome::UpToDate => self.skipped += 1,
        }
    }
}

/// Whether something exists at `path`, without following a final symlink.
pub fn lexists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn modified(path: &Path) -> Result<SystemTime> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| Error::io(path, e))
}

/// Should `src` be copied onto `dest`?
///
/// True if `dest` does not exist or `src` is newer than `dest` by more than
/// a microsecond.
pub fn should_copy(src: &Path, dest: &Path) -> Result<bool> {
    if !dest.exists() {
        return Ok(true);
    }

    let src_mtime = modified(src)?;
    let dest_mtime = modified(dest)?;
    let newer = src_mtime
        .duration_since(dest_mtime)
        .map(|delta| delta > MTIME_EPSILON)
        .unwrap_or(false);

    if newer {
        tracing::warn!("Out of date: {}", dest.display());
        return Ok(true);
    }
    tracing::debug!("Up to date: {}", dest.display());
    Ok(false)
}

/// Stamp `path` with `mtime`. `fs::copy` carries the source permissions
/// over, so a read-only source yields a read-only copy; on unix the owner
/// may set times through a read-only handle.
fn set_file_mtime(path: &Path, mtime: SystemTime) -> io::Result<()> {
    #[cfg(unix)]
    let file = fs::File::open(path)?;
    #[cfg(not(unix))]
    let file = fs::OpenOptions::new().write(true).open(path)?;
    file.set_modified(mtime)
}

/// Copy `src` to `dest` if it needs updating, preserving the modification time.
pub fn maybe_copy(src: &Path, dest: &Path) -> Result<CopyOutcome> {
    if !should_copy(src, dest)? {
        return Ok(CopyOutcome::UpToDate);
    }

    tracing::info!("Copying: {} -> {}", src.display(), dest.display());
    // a read-only copy from an earlier pass cannot be truncated in place
    if fs::symlink_metadata(dest).is_ok_and(|meta| meta.is_file() && meta.permissions().readonly()) {
        fs::remove_file(dest).map_err(|e| Error::io(dest, e))?;
    }
    fs::copy(src, dest).map_err(|e| Error::io(dest, e))?;

    let mtime = modified(src)?;
    set_file_mtime(dest, mtime).map_err(|e| Error::io(dest, e))?;

    Ok(CopyOutcome::Copied)
}

/// Recursively mirror the tree at `src` into `dest`.
///
/// Directories are created as needed and every regular file goes through
/// [`maybe_copy`]. Symlinked directories inside the tree are not descended.
pub fn mirror_tree(src: &Path, dest: &Path) -> Result<MirrorStats> {
    let mut stats = MirrorStats::default();

    for entry in WalkDir::new(src).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            Error::io(path, e.into())
        })?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .unwrap_or_else(|_| Path::new(""));
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            if !target.exists() {
                tracing::info!("Making directory: {}", target.display());
                fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
                stats.directories_created += 1;
            }
        } else if entry.path().is_file() {
            stats.record(maybe_copy(entry.path(), &target)?);
        } else {
            tracing::debug!("Skipping non-file entry: {}", entry.path().display());
        }
    }

    Ok(stats)
}

/// Remove whatever exists at `path`.
///
/// Real directories are removed recursively; files and symlinks (including
/// symlinks to directories) are unlinked. Returns whether anything was there.
pub fn remove_path(path: &Path) -> Result<bool> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(Error::io(path, e)),
    };

    tracing::info!("Removing: {}", path.display());
    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else if meta.file_type().is_symlink() && path.is_dir() && cfg!(windows) {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| Error::io(path, e))?;

    Ok(true)
}

/// Create a symbolic link at `link` pointing to `target`.
pub fn symlink(target: &Path, link: &Path) -> Result<()> {
    tracing::info!("Symlinking: {} -> {}", link.display(), target.display());

    #[cfg(unix)]
    let result = std::os::unix::fs::symlink(target, link);

    #[cfg(windows)]
    let result = if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    };

    result.map_err(|e| Error::io(link, e))
}
