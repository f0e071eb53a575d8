//! List command implementation

use colored::Colorize;
use std::path::PathBuf;

use labext_core::{ListReport, list};
use serde_json::json;

use super::Context;
use crate::error::Result;

fn report_json(report: &ListReport, search_path: &[PathBuf]) -> serde_json::Value {
    let dirs: Vec<serde_json::Value> = report
        .config_dirs
        .iter()
        .map(|dir| {
            let sections: Vec<serde_json::Value> = dir
                .sections
                .iter()
                .map(|section| {
                    let extensions: Vec<serde_json::Value> = section
                        .extensions
                        .iter()
                        .map(|ext| {
                            json!({
                                "require": ext.require,
                                "enabled": ext.enabled,
                                "warnings": ext.warnings.iter().map(ToString::to_string).collect::<Vec<_>>(),
                            })
                        })
                        .collect();
                    json!({"section": section.section, "extensions": extensions})
                })
                .collect();
            json!({"config_dir": dir.config_dir.display().to_string(), "sections": sections})
        })
        .collect();
    let search_path: Vec<String> = search_path
        .iter()
        .map(|dir| dir.display().to_string())
        .collect();
    json!({ "config_dirs": dirs, "labextensions_search_path": search_path })
}

/// Handle `labextension list [--json]`
pub fn run_list(ctx: &Context, json: bool) -> Result<()> {
    let report = list(&ctx.paths)?;
    let search_path = ctx.paths.labextensions_search_path(&[]);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report_json(&report, &search_path))?
        );
        return Ok(());
    }

    println!("{}", "Known labextensions:".bold());
    for dir in &report.config_dirs {
        println!("{} {}", "config dir:".dimmed(), dir.config_dir.display());
        for section in &dir.sections {
            println!("    {} section", section.section.cyan().bold());
            for ext in &section.extensions {
                let status = if ext.enabled {
                    "enabled".green()
                } else {
                    "disabled".red()
                };
                println!("      {} {}", ext.require, status);
                for warning in &ext.warnings {
                    println!("      - {} {}", "warning:".yellow(), warning);
                }
            }
        }
    }

    println!("{}", "Labextensions search path:".bold());
    for dir in &search_path {
        println!("    {}", dir.display());
    }

    Ok(())
}
