//! Normalize command - run the pipeline on one file.

use std::path::PathBuf;

use colored::Colorize;
use windline::output::{self, EGRESS_DELIMITER, NotificationSink, forward_messages};
use windline::{ParserConfig, Pipeline, Settings, Status, Value};

/// Settings the command line can override.
pub struct Overrides {
    pub messages: bool,
    pub source: Option<String>,
    pub timezone: Option<String>,
    pub print_messages: bool,
}

/// Prints each message on its own line.
struct StdoutSink;

impl NotificationSink for StdoutSink {
    fn send(&mut self, message: &str) -> windline::Result<()> {
        println!("{}", message);
        Ok(())
    }
}

pub fn run(
    settings: &Settings,
    file: PathBuf,
    output: Option<PathBuf>,
    overrides: Overrides,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let mut settings = settings.clone();
    if overrides.messages {
        settings.pipeline.messages = true;
    }
    if let Some(source) = overrides.source.clone() {
        settings.pipeline.source = source;
    }
    if let Some(tz) = overrides.timezone.clone() {
        settings.pipeline.timezone = tz;
    }

    check_print_messages(&overrides, &settings)?;

    let pipeline = Pipeline::with_config(settings.pipeline_config()?);
    let result = pipeline.process_file(&file, &ParserConfig::default())?;
    let table = &result.table;

    let output_path = output.unwrap_or_else(|| {
        let mut p = file.clone();
        let stem = p.file_stem().unwrap_or_default().to_string_lossy();
        p.set_file_name(format!("{}.normalized.csv", stem));
        p
    });
    output::write_delimited(table, &output_path, EGRESS_DELIMITER)?;

    if overrides.print_messages {
        forward_messages(table, &mut StdoutSink)?;
    }

    let missing = table
        .column("status")
        .map(|values| {
            values
                .filter(|v| **v == Value::from(Status::Missing))
                .count()
        })
        .unwrap_or(0);

    eprintln!("{} {}", "Normalized".green().bold(), result.source.file.white());
    eprintln!("  Rows:    {}", table.row_count().to_string().white().bold());
    if missing > 0 {
        eprintln!("  Missing: {}", missing.to_string().yellow());
    } else {
        eprintln!("  Missing: {}", "0".green());
    }
    eprintln!("  Source:  {}", result.source.hash.dimmed());
    eprintln!("  Output:  {}", output_path.display().to_string().cyan());

    Ok(())
}

/// Printing needs the message column, from `--messages` or the settings file.
fn check_print_messages(overrides: &Overrides, settings: &Settings) -> Result<(), String> {
    if overrides.print_messages && !settings.pipeline.messages {
        return Err(
            "--print-messages needs messages enabled (--messages or [pipeline] messages = true)"
                .to_string(),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn print_only() -> Overrides {
        Overrides {
            messages: false,
            source: None,
            timezone: None,
            print_messages: true,
        }
    }

    #[test]
    fn test_print_messages_accepts_settings_file() {
        let mut settings = Settings::default();
        settings.pipeline.messages = true;
        assert!(check_print_messages(&print_only(), &settings).is_ok());
    }

    #[test]
    fn test_print_messages_without_messages_fails() {
        let err = check_print_messages(&print_only(), &Settings::default()).unwrap_err();
        assert!(err.contains("--print-messages"));
    }
}
