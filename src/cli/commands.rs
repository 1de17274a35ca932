use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, Level};

use crate::cli::args::{Cli, Commands};
use crate::config::Settings;
use crate::converter::Converter;
use crate::error::Result;
use crate::models::Format;
use crate::processors::BatchProcessor;
use crate::utils::constants::HELP;
use crate::utils::progress::ProgressReporter;

/// Install the global tracing subscriber. Logs go to stderr unless a log
/// file is given.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    let installed = match log_file {
        Some(path) => builder
            .with_ansi(false)
            .with_writer(Mutex::new(File::create(path)?))
            .try_init(),
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    // A subscriber may already be installed, e.g. by a test harness.
    if let Err(e) = installed {
        debug!("logging already initialised: {}", e);
    }
    Ok(())
}

/// Settings from file and environment with command line overrides applied.
pub fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;

    if let Some(length) = cli.pluscode_length {
        settings = settings.with_pluscode_length(length);
    }
    if let Some(precision) = cli.mgrs_precision {
        settings = settings.with_mgrs_precision(precision);
    }
    if cli.strict_hemisphere {
        settings = settings.with_strict_hemisphere(true);
    }

    settings.check()?;
    Ok(settings)
}

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let settings = resolve_settings(&cli)?;
    debug!(?settings, "settings resolved");
    let converter = Converter::from_settings(&settings)?;

    match cli.command {
        Commands::Convert {
            coordinates,
            from,
            to,
        } => {
            let converted = converter.convert_tags(&coordinates, &from, &to)?;
            println!("{}", converted);
        }

        Commands::Request { json } => {
            let body = match json {
                Some(body) => body,
                None => {
                    let mut body = String::new();
                    std::io::stdin().read_to_string(&mut body)?;
                    body
                }
            };

            println!("{}", converter.handle_request(&body)?);
        }

        Commands::Batch {
            input,
            output,
            max_workers,
        } => {
            info!(input = %input.display(), workers = max_workers, "batch conversion");

            let total = std::fs::read_to_string(&input)?
                .lines()
                .filter(|line| !line.trim().is_empty())
                .count();
            let progress = ProgressReporter::new(total as u64, "Converting coordinates...", false);

            let processor = BatchProcessor::new(max_workers);
            let summary =
                processor.process_file(&converter, &input, output.as_deref(), Some(&progress))?;

            progress.finish_with_message(&summary.summary());
            if let Some(path) = output {
                eprintln!("Results written to {}", path.display());
            }
        }

        Commands::Formats => {
            println!("{}", HELP.trim());
            println!();
            for format in Format::ALL {
                println!("{:<10} {}", format.name(), format.aliases().join(", "));
            }
        }
    }

    Ok(())
}
