//! labextension CLI
//!
//! Stages labextension assets and toggles them in notebook configuration.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use commands::Context;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(verbose)
        .with_writer(std::io::stderr);

    let result = match std::env::var("RUST_LOG") {
        Ok(filter) if !filter.is_empty() => tracing::subscriber::set_global_default(
            builder.with_env_filter(EnvFilter::new(filter)).finish(),
        ),
        _ => tracing::subscriber::set_global_default(builder.finish()),
    };
    if result.is_err() {
        eprintln!("{}: tracing subscriber already set", "warning".yellow().bold());
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!("Verbose mode enabled");

    let Some(command) = cli.command else {
        println!("{} labextension manager", "labextension".green().bold());
        println!();
        println!("Run {} for available commands.", "labextension --help".cyan());
        return Ok(());
    };

    let ctx = Context::from_env(cli.package_path.as_deref());
    execute_command(&ctx, command)
}

fn execute_command(ctx: &Context, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Install {
            names,
            location,
            overwrite,
            symlink,
            destination,
            py,
        } => {
            let name = commands::single_name(&names, "install")?;
            let request = commands::InstallRequest {
                location,
                overwrite,
                symlink,
                destination,
                py,
            };
            commands::run_install(ctx, name, &request)
        }
        Commands::Uninstall {
            names,
            location,
            require,
            py,
        } => {
            let name = commands::single_name(&names, "uninstall")?;
            commands::run_uninstall(ctx, name, &location, require.as_deref(), py)
        }
        Commands::Enable {
            names,
            section,
            scope,
            py,
        } => {
            let name = commands::single_name(&names, "enable")?;
            commands::run_toggle(ctx, name, &section, &scope, py, true)
        }
        Commands::Disable {
            names,
            section,
            scope,
            py,
        } => {
            let name = commands::single_name(&names, "disable")?;
            commands::run_toggle(ctx, name, &section, &scope, py, false)
        }
        Commands::List { json } => commands::run_list(ctx, json),
    }
}
