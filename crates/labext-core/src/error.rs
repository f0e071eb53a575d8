use std::path::PathBuf;

/// Errors that can occur while staging or configuring labextensions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// More than one mutually exclusive scope selector was supplied.
    #[error("cannot specify more than one of {allowed}, but got: {}", .flags.join(", "))]
    Conflict {
        allowed: &'static str,
        flags: Vec<String>,
    },

    /// A package was found but does not declare any labextension entries.
    #[error(
        "the package '{package}' is not a valid labextension, it is missing the \
         [[labextension]] entries in {manifest}"
    )]
    MissingEntryPoint { package: String, manifest: PathBuf },

    /// No package with the given name could be located.
    #[error("package '{name}' not found (searched: {})", display_paths(.searched))]
    PackageNotFound { name: String, searched: Vec<PathBuf> },

    /// Failed to parse a package manifest.
    #[error("failed to parse {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The source cannot be installed from this machine.
    #[error("unsupported source '{source_name}': {reason}")]
    UnsupportedSource { source_name: String, reason: String },

    /// A destination name was given together with an archive source.
    #[error("cannot give destination for archives: {archive}")]
    DestinationForArchive { archive: PathBuf },

    /// The source path has no usable base name.
    #[error("cannot derive a destination name from '{}'", .source_path.display())]
    NoDestinationName { source_path: PathBuf },

    /// Filesystem error from labext-fs.
    #[error(transparent)]
    Fs(#[from] labext_fs::Error),

    /// I/O error reading or writing extension files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "<no package path>".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, Error>;
