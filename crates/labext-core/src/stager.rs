//! Staging labextension assets into a labextensions directory.
//!
//! By default only files that are missing or older than their source are
//! copied, so repeated installs of an unchanged extension are cheap. With
//! `overwrite` the existing destination is purged first.

use std::fs;
use std::path::{Path, PathBuf};

use labext_fs::{
    ArchiveKind, CopyOutcome, archive_members, base_name, extract_archive, is_url, lexists,
    maybe_copy, mirror_tree, normalize, remove_path,
};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::location::ScopeFlags;
use crate::metadata::{ExtensionMetadataEntry, ProviderRegistry};
use crate::nbconfig::{NBCONFIG_SECTIONS, SectionConfigManager, load_extensions_patch};
use crate::paths::JupyterPaths;

/// Options controlling a single install.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallOptions {
    /// Purge whatever exists at the destination first.
    pub overwrite: bool,
    /// Link to the source instead of copying it.
    pub symlink: bool,
    /// Name to stage under instead of the source's base name.
    pub destination: Option<String>,
}

/// What an install actually did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// The path the extension now lives at.
    pub destination: PathBuf,
    /// Files written.
    pub copied: usize,
    /// Files already up to date.
    pub skipped: usize,
    /// Whether a symlink was created.
    pub linked: bool,
    /// Top-level names extracted from an archive source.
    pub extracted: Vec<PathBuf>,
}

/// Whether every name in `names` exists under the resolved location.
///
/// Returns `false` when the location directory does not exist.
pub fn check<I, S>(names: I, scope: &ScopeFlags, paths: &JupyterPaths) -> Result<bool>
where
    I: IntoIterator<Item = S>,
    S: AsRef<Path>,
{
    let labext = scope.resolve(paths)?;
    if !labext.exists() {
        return Ok(false);
    }
    Ok(names
        .into_iter()
        .all(|name| labext.join(name.as_ref()).exists()))
}

/// Install a single file, directory or archive. Returns the destination path.
pub fn install(
    source: &Path,
    scope: &ScopeFlags,
    options: &InstallOptions,
    paths: &JupyterPaths,
) -> Result<PathBuf> {
    install_with_report(source, scope, options, paths).map(|report| report.destination)
}

/// Install a single source and report what was done.
pub fn install_with_report(
    source: &Path,
    scope: &ScopeFlags,
    options: &InstallOptions,
    paths: &JupyterPaths,
) -> Result<InstallReport> {
    let source_str = source.to_string_lossy();
    if is_url(&source_str) {
        return Err(Error::UnsupportedSource {
            source_name: source_str.into_owned(),
            reason: "downloading from URLs is not supported; fetch it and install the local copy"
                .to_string(),
        });
    }

    let labext = scope.resolve(paths)?;
    fs::create_dir_all(&labext).map_err(|e| labext_fs::Error::io(&labext, e))?;

    if !options.symlink && source.is_file() && ArchiveKind::detect(source).is_some() {
        return install_archive(source, &labext, options);
    }

    let destination = match options.destination.as_deref().filter(|d| !d.is_empty()) {
        Some(dest) => dest.to_string(),
        None => base_name(source).ok_or_else(|| Error::NoDestinationName {
            source_path: source.to_path_buf(),
        })?,
    };
    let full_dest = normalize(labext.join(&destination));
    let mut report = InstallReport {
        destination: full_dest.clone(),
        ..InstallReport::default()
    };

    if options.overwrite {
        remove_path(&full_dest)?;
    }

    if options.symlink {
        let target = normalize(std::path::absolute(source)?);
        if !lexists(&full_dest) {
            ensure_parent(&full_dest)?;
            labext_fs::symlink(&target, &full_dest)?;
            report.linked = true;
        } else {
            tracing::info!("Already present, not linking: {}", full_dest.display());
        }
    } else if source.is_dir() {
        let stats = mirror_tree(source, &full_dest)?;
        report.copied = stats.copied;
        report.skipped = stats.skipped;
    } else {
        ensure_parent(&full_dest)?;
        match maybe_copy(source, &full_dest)? {
            CopyOutcome::Copied => report.copied = 1,
            CopyOutcome::UpToDate => report.skipped = 1,
        }
    }

    Ok(report)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| labext_fs::Error::io(parent, e))?;
    }
    Ok(())
}

fn install_archive(archive: &Path, labext: &Path, options: &InstallOptions) -> Result<InstallReport> {
    if options.destination.as_deref().is_some_and(|d| !d.is_empty()) {
        return Err(Error::DestinationForArchive {
            archive: archive.to_path_buf(),
        });
    }

    if options.overwrite {
        for member in archive_members(archive)? {
            remove_path(&labext.join(member))?;
        }
    }

    let extracted: Vec<PathBuf> = extract_archive(archive, labext)?.into_iter().collect();
    Ok(InstallReport {
        destination: labext.to_path_buf(),
        extracted,
        ..InstallReport::default()
    })
}

/// Install every labextension a package declares.
///
/// Returns each metadata entry with the path it was staged at.
pub fn develop_entries(
    package: &str,
    scope: &ScopeFlags,
    options: &InstallOptions,
    paths: &JupyterPaths,
    registry: &ProviderRegistry,
) -> Result<Vec<(ExtensionMetadataEntry, PathBuf)>> {
    let (provider, entries) = registry.resolve_metadata(package)?;

    let mut staged = Vec::with_capacity(entries.len());
    for entry in entries {
        let src = provider.root().join(&entry.src);
        tracing::info!("Installing {} -> {}", src.display(), entry.dest);

        let entry_options = InstallOptions {
            destination: Some(entry.dest.clone()),
            ..options.clone()
        };
        let full_dest = install(&src, scope, &entry_options, paths)?;
        staged.push((entry, full_dest));
    }
    Ok(staged)
}

/// Install every labextension a package declares, returning the staged paths.
pub fn develop(
    package: &str,
    scope: &ScopeFlags,
    options: &InstallOptions,
    paths: &JupyterPaths,
    registry: &ProviderRegistry,
) -> Result<Vec<PathBuf>> {
    Ok(develop_entries(package, scope, options, paths, registry)?
        .into_iter()
        .map(|(_, dest)| dest)
        .collect())
}

/// Remove a staged extension from the resolved location.
///
/// Missing destinations are not an error. With `require`, the extension is
/// also unset in every section of the matching config scope.
pub fn uninstall(
    dest: &str,
    scope: &ScopeFlags,
    require: Option<&str>,
    paths: &JupyterPaths,
) -> Result<()> {
    let labext = scope.resolve(paths)?;
    let full_dest = labext.join(dest);
    if !remove_path(&full_dest)? {
        tracing::debug!("Nothing staged at {}", full_dest.display());
    }

    if let Some(require) = require.filter(|r| !r.is_empty()) {
        let manager = SectionConfigManager::new(scope.config_scope().config_dir(paths));
        let patch = load_extensions_patch(require, Value::Null);
        for section in NBCONFIG_SECTIONS {
            manager.update(section, &patch)?;
        }
    }
    Ok(())
}

/// Uninstall every labextension a package declares from the resolved location.
pub fn uninstall_package(
    package: &str,
    scope: &ScopeFlags,
    paths: &JupyterPaths,
    registry: &ProviderRegistry,
) -> Result<()> {
    let (_, entries) = registry.resolve_metadata(package)?;
    for entry in entries {
        tracing::info!(
            "Uninstalling {} {}",
            entry.dest,
            entry.require.as_deref().unwrap_or("")
        );
        uninstall(&entry.dest, scope, entry.require.as_deref(), paths)?;
    }
    Ok(())
}

/// Remove `name` from the first labextensions directory on the search path
/// that has it. Returns whether anything was removed.
pub fn find_and_uninstall(name: &str, paths: &JupyterPaths) -> Result<bool> {
    find_and_uninstall_in(name, &paths.labextensions_path())
}

/// Like [`find_and_uninstall`] over an explicit list of directories.
pub fn find_and_uninstall_in(name: &str, dirs: &[PathBuf]) -> Result<bool> {
    for dir in dirs {
        if remove_path(&dir.join(name))? {
            return Ok(true);
        }
    }
    Ok(false)
}
