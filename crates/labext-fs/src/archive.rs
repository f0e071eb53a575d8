//! Archive extraction for zip and tar (optionally gzipped) bundles

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;
use zip::ZipArchive;

use crate::{Error, Result};

/// Supported archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Tar,
    TarGz,
}

impl ArchiveKind {
    /// Detect the archive kind from the file name.
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();
        if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else {
            None
        }
    }
}

/// Reject absolute entries and entries climbing out of the destination.
fn sanitize_entry_path(path: &Path) -> Result<PathBuf> {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::ParentDir => {
                return Err(Error::UnsafeArchiveEntry {
                    entry: path.to_path_buf(),
                });
            }
            Component::CurDir => {}
            Component::Normal(part) => cleaned.push(part),
        }
    }
    Ok(cleaned)
}

fn top_level(relative: &Path) -> Option<PathBuf> {
    relative
        .components()
        .next()
        .map(|first| PathBuf::from(first.as_os_str()))
}

fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))
}

/// List the top-level names an archive would create, without extracting.
pub fn archive_members(archive_path: &Path) -> Result<BTreeSet<PathBuf>> {
    let mut members = BTreeSet::new();
    match ArchiveKind::detect(archive_path) {
        Some(ArchiveKind::Zip) => {
            let mut archive = open_zip(archive_path)?;
            for i in 0..archive.len() {
                let entry = archive.by_index(i).map_err(|e| archive_error(archive_path, e))?;
                let raw = entry.name().replace('\\', "/");
                let rel = sanitize_entry_path(Path::new(&raw))?;
                members.extend(top_level(&rel));
            }
        }
        Some(kind) => {
            let mut archive = open_tar(archive_path, kind)?;
            let entries = archive
                .entries()
                .map_err(|e| archive_error(archive_path, e))?;
            for entry in entries {
                let entry = entry.map_err(|e| archive_error(archive_path, e))?;
                let raw = entry
                    .path()
                    .map_err(|e| archive_error(archive_path, e))?
                    .to_path_buf();
                let rel = sanitize_entry_path(&raw)?;
                members.extend(top_level(&rel));
            }
        }
        None => {
            return Err(Error::UnsupportedArchive {
                path: archive_path.to_path_buf(),
            });
        }
    }
    Ok(members)
}

/// Extract `archive_path` into `dest_dir`, returning the top-level names created.
pub fn extract_archive(archive_path: &Path, dest_dir: &Path) -> Result<BTreeSet<PathBuf>> {
    tracing::info!(
        "Extracting: {} -> {}",
        archive_path.display(),
        dest_dir.display()
    );
    match ArchiveKind::detect(archive_path) {
        Some(ArchiveKind::Zip) => extract_zip(archive_path, dest_dir),
        Some(kind) => extract_tar(archive_path, kind, dest_dir),
        None => Err(Error::UnsupportedArchive {
            path: archive_path.to_path_buf(),
        }),
    }
}

fn archive_error(path: &Path, err: impl std::fmt::Display) -> Error {
    Error::Archive {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn open_zip(archive_path: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(archive_path).map_err(|e| Error::io(archive_path, e))?;
    ZipArchive::new(file).map_err(|e| archive_error(archive_path, e))
}

fn open_tar(archive_path: &Path, kind: ArchiveKind) -> Result<Archive<Box<dyn io::Read>>> {
    let file = File::open(archive_path).map_err(|e| Error::io(archive_path, e))?;
    let reader: Box<dyn io::Read> = if kind == ArchiveKind::TarGz {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(Archive::new(reader))
}

/// Whether a link stored at `link` (relative to the destination) resolves
/// outside the destination. Symlink targets are relative to the link's
/// directory, hard link targets to the archive root.
fn link_escapes(link: &Path, target: &Path, symbolic: bool) -> bool {
    let mut depth = if symbolic {
        link.parent().map_or(0, |parent| parent.components().count())
    } else {
        0
    };
    for component in target.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => return true,
            Component::ParentDir => {
                if depth == 0 {
                    return true;
                }
                depth -= 1;
            }
            Component::CurDir => {}
            Component::Normal(_) => depth += 1,
        }
    }
    false
}

fn extract_tar(
    archive_path: &Path,
    kind: ArchiveKind,
    dest_dir: &Path,
) -> Result<BTreeSet<PathBuf>> {
    let mut archive = open_tar(archive_path, kind)?;
    archive.set_preserve_permissions(false);
    archive.set_unpack_xattrs(false);
    ensure_dir(dest_dir)?;

    let mut members = BTreeSet::new();
    let entries = archive
        .entries()
        .map_err(|e| archive_error(archive_path, e))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| archive_error(archive_path, e))?;
        let raw = entry
            .path()
            .map_err(|e| archive_error(archive_path, e))?
            .to_path_buf();
        let rel = sanitize_entry_path(&raw)?;
        if rel.as_os_str().is_empty() {
            continue;
        }

        let entry_type = entry.header().entry_type();
        if entry_type.is_symlink() || entry_type.is_hard_link() {
            let target = entry
                .link_name()
                .map_err(|e| archive_error(archive_path, e))?
                .map(|name| name.into_owned())
                .unwrap_or_default();
            if target.as_os_str().is_empty()
                || link_escapes(&rel, &target, entry_type.is_symlink())
            {
                return Err(Error::UnsafeArchiveEntry { entry: raw });
            }
        }
        members.extend(top_level(&rel));

        // unpack_in refuses to write through links leading out of dest_dir
        let unpacked = entry
            .unpack_in(dest_dir)
            .map_err(|e| Error::io(dest_dir.join(&rel), e))?;
        if !unpacked {
            return Err(Error::UnsafeArchiveEntry { entry: raw });
        }
    }
    Ok(members)
}

fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<BTreeSet<PathBuf>> {
    let mut archive = open_zip(archive_path)?;

    let mut members = BTreeSet::new();
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| archive_error(archive_path, e))?;
        let raw = entry.name().replace('\\', "/");
        let rel = sanitize_entry_path(Path::new(&raw))?;
        if rel.as_os_str().is_empty() {
            continue;
        }
        members.extend(top_level(&rel));

        let out = dest_dir.join(&rel);
        if entry.is_dir() {
            ensure_dir(&out)?;
            continue;
        }
        if let Some(parent) = out.parent() {
            ensure_dir(parent)?;
        }
        let mut out_file = File::create(&out).map_err(|e| Error::io(&out, e))?;
        io::copy(&mut entry, &mut out_file).map_err(|e| Error::io(&out, e))?;
    }
    Ok(members)
}
