//! Windline CLI - normalization pipeline for wind sensor exports.

mod cli;
mod commands;
mod logging;

use std::fmt::Display;
use std::process::ExitCode;

use clap::Parser;
use cli::{Cli, Commands};
use windline::Settings;

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let _guard = match logging::init(cli.verbose, cli.log_dir.as_deref()) {
        Ok((guard, log_file)) => {
            if let Some(path) = log_file {
                tracing::info!(log_file = %path.display(), "logging to file");
            }
            guard
        }
        Err(e) => {
            eprintln!("Error: cannot set up logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = load_settings(&cli).and_then(|settings| match cli.command {
        Commands::Normalize {
            file,
            output,
            messages,
            source,
            timezone,
            print_messages,
        } => commands::normalize::run(
            &settings,
            file,
            output,
            commands::normalize::Overrides {
                messages,
                source,
                timezone,
                print_messages,
            },
        ),

        Commands::Daily {
            date,
            allow_fallback,
            local_only,
            json,
        } => commands::daily::run(&settings, date, allow_fallback, local_only, json),

        Commands::Verify {
            files,
            delimiter,
            json,
        } => commands::verify::run(files, delimiter, json),

        Commands::Catalog {
            file,
            against,
            json,
        } => commands::catalog::run(&settings, file, against, json),
    });

    // Returning lets the log guard flush before the process ends.
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_failure(&e);
            ExitCode::FAILURE
        }
    }
}

fn report_failure(error: &dyn Display) {
    tracing::error!(error = %error, "processing failed");
    eprintln!("Error: {}", error);
}

fn load_settings(cli: &Cli) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    settings.apply_env();
    Ok(settings)
}
