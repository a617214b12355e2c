mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::CliError;

const LOG_ENV: &str = "KRXBOARD_LOG";

fn main() {
    init_tracing();

    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(error.exit_code());
    }
}

// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    let envelope = commands::run(&cli)?;
    output::render(&envelope, cli.format, cli.pretty)?;

    let warning_count = envelope.meta.warnings.len();
    let error_count = envelope.errors.len();

    if cli.strict && (warning_count > 0 || error_count > 0) {
        return Err(CliError::StrictModeViolation {
            warning_count,
            error_count,
        });
    }

    if error_count > 0 {
        return Err(CliError::ProviderFailure { error_count });
    }

    Ok(())
}
