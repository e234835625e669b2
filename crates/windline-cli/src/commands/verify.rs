//! Verify command - quality checks on written CSV files.

use std::path::PathBuf;

use colored::Colorize;
use windline::quality::{ProcessingSummary, VerificationRun};

pub fn run(files: Vec<PathBuf>, delimiter: char, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !delimiter.is_ascii() {
        return Err(format!("Delimiter must be a single ASCII character, got '{}'", delimiter).into());
    }
    let delimiter = delimiter as u8;

    let run = VerificationRun::check(&files, delimiter);
    let summary = ProcessingSummary::from_files(&files, delimiter);

    if json_output {
        let report = serde_json::json!({
            "files": run.verified,
            "failed": run.failed,
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return finish(&run);
    }

    for failure in &run.failed {
        println!(
            "{} {}: {}",
            "Failed".red().bold(),
            failure.path.display().to_string().white(),
            failure.error.red()
        );
    }

    for check in &run.verified {
        let report = &check.report;
        println!("{} {}", "Verified".cyan().bold(), check.file.white());
        println!("  Rows:         {}", report.total_rows);
        println!("  Columns:      {}", report.columns.join(", "));

        let completeness = format!("{:.2}%", report.completeness_pct);
        let completeness = if report.completeness_pct >= 99.0 {
            completeness.green()
        } else if report.completeness_pct >= 90.0 {
            completeness.yellow()
        } else {
            completeness.red()
        };
        println!("  Completeness: {}", completeness);

        if report.duplicate_rows > 0 {
            println!("  Duplicates:   {}", report.duplicate_rows.to_string().yellow());
        }
        if let Some(ts) = &report.timestamp {
            let iso = if ts.iso_utc { "yes".green() } else { "no".red() };
            println!("  UTC times:    {} ({} unique)", iso, ts.unique);
        }
        if let Some(value) = &report.value {
            if let (Some(min), Some(max), Some(mean)) = (value.min, value.max, value.mean) {
                println!("  Value range:  {:.2} .. {:.2} (mean {:.2})", min, max, mean);
            }
        }
        if let Some(status) = &report.status_distribution {
            let parts: Vec<String> = status.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            println!("  Status:       {}", parts.join(" "));
        }
        println!();
    }

    println!("{}", "Summary:".yellow().bold());
    println!("  Files: {}", summary.total_files);
    println!("  Rows:  {}", summary.total_rows);
    println!("  Size:  {:.2} KB", summary.total_size_kb);

    finish(&run)
}

fn finish(run: &VerificationRun) -> Result<(), Box<dyn std::error::Error>> {
    if run.is_clean() {
        Ok(())
    } else {
        Err(format!("{} file(s) could not be verified", run.failed.len()).into())
    }
}
