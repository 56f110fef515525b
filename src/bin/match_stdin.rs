//! Batch entry point: reads a JSON array of survey records on stdin and
//! prints the mentor → mentees mapping on stdout.
//!
//! On failure prints `{"error": "<message>"}` on stderr and exits with 1.

use mentor_match::config::Settings;
use mentor_match::core::{rng_from_seed, MatchMaker};
use mentor_match::error::MatchError;
use mentor_match::logging::init_logging;
use mentor_match::models::Assignments;
use serde_json::{Map, Value};
use std::io::{self, Read, Write};
use std::process::ExitCode;
use thiserror::Error;
use validator::Validate;

#[derive(Debug, Error)]
enum CliError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    #[error("Failed to read input: {0}")]
    Io(#[from] io::Error),

    #[error("Input is not a JSON array of records: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Matching(#[from] MatchError),
}

fn run() -> Result<Assignments, CliError> {
    let settings = Settings::load()?;
    settings.validate()?;
    init_logging(&settings.logging);

    let matchmaker = MatchMaker::from_settings(&settings)?;

    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    let records: Vec<Map<String, Value>> = serde_json::from_str(&input)?;

    let mut rng = rng_from_seed(settings.matching.seed);
    let outcome = matchmaker.run(&records, &mut rng)?;
    Ok(outcome.assignments)
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();

    match run() {
        Ok(assignments) => {
            let mut stdout = io::stdout().lock();
            let written = serde_json::to_writer(&mut stdout, &assignments)
                .map_err(io::Error::from)
                .and_then(|_| writeln!(stdout));
            match written {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => report(&CliError::Io(e)),
            }
        }
        Err(e) => report(&e),
    }
}

fn report(error: &CliError) -> ExitCode {
    tracing::error!("{}", error);
    eprintln!("{}", serde_json::json!({ "error": error.to_string() }));
    ExitCode::FAILURE
}
