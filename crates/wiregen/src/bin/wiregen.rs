//! Reads a generation request as JSON on stdin and prints every generated
//! unit to stdout.
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`
//! (default `info`).

use std::io::{self, Read};
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use wiregen::{GenerateRequest, WiregenError, write_units};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "generation failed");
            ExitCode::FAILURE
        }
    }
}

fn try_main() -> Result<(), WiregenError> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;

    let request = GenerateRequest::from_json(&input)?;
    let code = request.run()?;

    let stdout = io::stdout();
    write_units(&code, &mut stdout.lock())?;
    tracing::info!(units = code.len(), "wrote generated units");
    Ok(())
}
