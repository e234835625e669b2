//! Daily command - process the day's ZIP export end to end.

use colored::Colorize;
use windline::output::EGRESS_DELIMITER;
use windline::quality::{ProcessingSummary, VerificationRun};
use windline::{Catalog, DailyRun, DailySummary, Settings};

pub fn run(
    settings: &Settings,
    date: Option<String>,
    allow_fallback: bool,
    local_only: bool,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = settings.clone();
    if allow_fallback {
        settings.daily.allow_fallback = true;
    }
    if local_only {
        settings.daily.save_to_onedrive = false;
    }

    let paths = settings.resolve()?;
    tracing::info!(
        data = %paths.data_dir.display(),
        output = %paths.output_dir.display(),
        "configuration loaded"
    );

    let catalog = Catalog::load(&paths.catalog_file)?;
    let date = date.unwrap_or_else(DailySummary::today);
    let config = settings.daily_config(&date)?;

    let summary = DailyRun::new(config, &catalog).run()?;
    let totals = ProcessingSummary::from_files(&summary.processed_paths, EGRESS_DELIMITER);

    if json_output {
        let report = serde_json::json!({
            "date": date,
            "run": summary,
            "totals": totals,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} {}", "Daily run for".cyan().bold(), date.white());
    println!();
    println!(
        "Processed {}/{} files",
        summary.successful.to_string().white().bold(),
        summary.total_files
    );

    for outcome in &summary.files {
        if outcome.success {
            let output = outcome
                .output
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            println!(
                "  {} {} -> {} ({} rows)",
                "✓".green(),
                outcome.source,
                output.cyan(),
                outcome.rows
            );
        } else {
            println!(
                "  {} {}: {}",
                "✗".red(),
                outcome.source,
                outcome.error.as_deref().unwrap_or("unknown error").red()
            );
        }
    }
    println!();

    let checks = VerificationRun::check(&summary.processed_paths, EGRESS_DELIMITER);
    for check in &checks.verified {
        let ts_ok = check.report.timestamp.as_ref().is_some_and(|t| t.iso_utc);
        if !ts_ok {
            println!(
                "  {} {} has timestamps that are not UTC",
                "!".yellow(),
                check.file
            );
        }
    }
    for failure in &checks.failed {
        println!(
            "  {} {} could not be read back: {}",
            "!".yellow(),
            failure.path.display(),
            failure.error
        );
    }

    println!("{}", "Totals:".yellow().bold());
    println!("  Files: {}", totals.total_files);
    println!("  Rows:  {}", totals.total_rows);
    println!("  Size:  {:.2} MB", totals.total_size_mb);

    if summary.failed > 0 {
        println!();
        println!(
            "{} {} file(s) failed",
            "Warning:".yellow().bold(),
            summary.failed
        );
    }

    Ok(())
}
