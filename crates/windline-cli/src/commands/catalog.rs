//! Catalog command - list entries and check coverage.

use std::path::PathBuf;

use colored::Colorize;
use windline::daily::collect_data_files;
use windline::{Catalog, Settings};

pub fn run(
    settings: &Settings,
    file: Option<PathBuf>,
    against: Option<PathBuf>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = match file {
        Some(path) => path,
        None => settings.resolve()?.catalog_file,
    };
    if !path.exists() {
        return Err(format!("Catalog file not found: {}", path.display()).into());
    }
    let catalog = Catalog::load(&path)?;

    let coverage = against.map(|dir| {
        let files = collect_data_files(&dir);
        catalog.coverage(&files)
    });

    if json_output {
        let report = serde_json::json!({
            "catalog": path,
            "entries": catalog.entries(),
            "coverage": coverage,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {} ({} entries)",
        "Catalog".cyan().bold(),
        path.display().to_string().white(),
        catalog.len()
    );
    for entry in catalog.entries() {
        println!("  {:<30} {}", entry.name, entry.tr_id.dimmed());
    }

    if let Some(report) = coverage {
        println!();
        println!("{}", "Coverage:".yellow().bold());
        println!(
            "  Entries with files: {}/{}",
            report.catalog_with_files.len().to_string().green(),
            report.total_catalog_entries
        );
        println!(
            "  Files with entries: {}/{}",
            report.files_with_match.len().to_string().green(),
            report.total_files
        );
        for entry in &report.catalog_without_files {
            println!("  {} no file for {} ({})", "!".yellow(), entry.name, entry.tr_id);
        }
        for name in &report.files_without_match {
            println!("  {} no entry for {}", "!".yellow(), name);
        }
        if report.is_complete() {
            println!("  {}", "Catalog and files match completely".green());
        }
    }

    Ok(())
}
