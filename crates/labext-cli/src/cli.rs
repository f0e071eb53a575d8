//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// labextension - Install, enable and list notebook labextensions
#[derive(Parser, Debug)]
#[command(name = "labextension")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directories searched for packages named with --py (OS path-list syntax)
    #[arg(long, global = true, env = "LABEXT_PACKAGE_PATH")]
    pub package_path: Option<String>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Where staged assets go, for install and uninstall
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationArgs {
    /// Use the per-user labextensions directory
    #[arg(long)]
    pub user: bool,

    /// Use the active environment's labextensions directory
    #[arg(long)]
    pub sys_prefix: bool,

    /// Use the system-wide labextensions directory
    #[arg(long)]
    pub system: bool,

    /// Installation prefix
    #[arg(long)]
    pub prefix: Option<PathBuf>,

    /// Full path to the labextensions directory
    #[arg(long = "labextensions-dir", alias = "labextensions")]
    pub labextensions_dir: Option<PathBuf>,
}

/// Which configuration tier enable and disable write to
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigArgs {
    /// Apply to the per-user configuration (default)
    #[arg(long)]
    pub user: bool,

    /// Apply to the active environment's configuration
    #[arg(long)]
    pub sys_prefix: bool,

    /// Apply to the system-wide configuration
    #[arg(long)]
    pub system: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Install a labextension from a file, directory or archive
    ///
    /// Files already up to date are left alone unless --overwrite is given.
    ///
    /// Examples:
    ///   labextension install ./my_ext --user
    ///   labextension install ./dist/my_ext.tar.gz --sys-prefix
    ///   labextension install my_pkg --py --symlink
    Install {
        /// Path to install, or package name with --py
        #[arg(required = true, value_name = "PATH")]
        names: Vec<String>,

        #[command(flatten)]
        location: LocationArgs,

        /// Force overwrite of existing files
        #[arg(long)]
        overwrite: bool,

        /// Create a symlink instead of copying files
        #[arg(short, long)]
        symlink: bool,

        /// Name to stage the extension under
        #[arg(long)]
        destination: Option<String>,

        /// Install every labextension a package declares
        #[arg(long, alias = "python")]
        py: bool,
    },

    /// Uninstall a labextension
    ///
    /// Without a location flag the first directory on the search path that
    /// has the extension is used.
    ///
    /// Examples:
    ///   labextension uninstall my_ext --require my_ext/index
    ///   labextension uninstall my_pkg --py --user
    Uninstall {
        /// Installed name, or package name with --py
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,

        #[command(flatten)]
        location: LocationArgs,

        /// Module path to disable as well
        #[arg(long)]
        require: Option<String>,

        /// Uninstall every labextension a package declares
        #[arg(long, alias = "python")]
        py: bool,
    },

    /// Enable a labextension in a config section
    Enable {
        /// Module path, or package name with --py
        #[arg(required = true, value_name = "REQUIRE")]
        names: Vec<String>,

        /// Config section to apply to
        #[arg(long, default_value = "notebook")]
        section: String,

        #[command(flatten)]
        scope: ConfigArgs,

        /// Enable every labextension a package declares
        #[arg(long, alias = "python")]
        py: bool,
    },

    /// Disable a labextension in a config section
    Disable {
        /// Module path, or package name with --py
        #[arg(required = true, value_name = "REQUIRE")]
        names: Vec<String>,

        /// Config section to apply to
        #[arg(long, default_value = "notebook")]
        section: String,

        #[command(flatten)]
        scope: ConfigArgs,

        /// Disable every labextension a package declares
        #[arg(long, alias = "python")]
        py: bool,
    },

    /// List labextensions known to every config directory
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_no_args() {
        let cli = Cli::parse_from(["labextension"]);
        assert!(!cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn parse_short_verbose_flag() {
        let cli = Cli::parse_from(["labextension", "-v", "list"]);
        assert!(cli.verbose);
        assert_eq!(cli.command, Some(Commands::List { json: false }));
    }

    #[test]
    fn parse_install_with_flags() {
        let cli = Cli::parse_from([
            "labextension",
            "install",
            "./my_ext",
            "--user",
            "--overwrite",
            "-s",
            "--destination",
            "renamed",
        ]);
        match cli.command {
            Some(Commands::Install {
                names,
                location,
                overwrite,
                symlink,
                destination,
                py,
            }) => {
                assert_eq!(names, vec!["./my_ext"]);
                assert!(location.user);
                assert!(overwrite);
                assert!(symlink);
                assert_eq!(destination.as_deref(), Some("renamed"));
                assert!(!py);
            }
            other => panic!("Expected Install command, got {other:?}"),
        }
    }

    #[test]
    fn parse_install_accepts_conflicting_flags() {
        let cli = Cli::parse_from(["labextension", "install", "x", "--user", "--sys-prefix"]);
        match cli.command {
            Some(Commands::Install { location, .. }) => {
                assert!(location.user && location.sys_prefix);
            }
            other => panic!("Expected Install command, got {other:?}"),
        }
    }

    #[test]
    fn parse_install_requires_a_name() {
        let result = Cli::try_parse_from(["labextension", "install"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_uninstall_with_require_and_prefix() {
        let cli = Cli::parse_from([
            "labextension",
            "uninstall",
            "my_ext",
            "--require",
            "my_ext/index",
            "--prefix",
            "/opt/env",
        ]);
        match cli.command {
            Some(Commands::Uninstall {
                names,
                location,
                require,
                py,
            }) => {
                assert_eq!(names, vec!["my_ext"]);
                assert_eq!(location.prefix, Some(PathBuf::from("/opt/env")));
                assert_eq!(require.as_deref(), Some("my_ext/index"));
                assert!(!py);
            }
            other => panic!("Expected Uninstall command, got {other:?}"),
        }
    }

    #[test]
    fn parse_enable_defaults_to_notebook_section() {
        let cli = Cli::parse_from(["labextension", "enable", "my_ext/index"]);
        match cli.command {
            Some(Commands::Enable { section, scope, .. }) => {
                assert_eq!(section, "notebook");
                assert_eq!(scope, ConfigArgs::default());
            }
            other => panic!("Expected Enable command, got {other:?}"),
        }
    }

    #[test]
    fn parse_disable_with_section_and_py() {
        let cli = Cli::parse_from([
            "labextension",
            "disable",
            "my_pkg",
            "--section",
            "tree",
            "--sys-prefix",
            "--py",
        ]);
        match cli.command {
            Some(Commands::Disable {
                names,
                section,
                scope,
                py,
            }) => {
                assert_eq!(names, vec!["my_pkg"]);
                assert_eq!(section, "tree");
                assert!(scope.sys_prefix);
                assert!(py);
            }
            other => panic!("Expected Disable command, got {other:?}"),
        }
    }

    #[test]
    fn parse_package_path_flag() {
        let cli = Cli::parse_from(["labextension", "--package-path", "/pkgs", "list"]);
        assert_eq!(cli.package_path.as_deref(), Some("/pkgs"));
    }
}
