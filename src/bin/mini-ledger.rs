use std::fs::File;

use anyhow::{Context, Result};
use mini_ledger::bin_utils::{ScenarioError, Service};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let filename = std::env::args()
        .nth(1)
        .context("Expected a scenario file name as the first argument")?;
    let file = File::open(&filename).with_context(|| format!("Failed to open `{filename}`"))?;

    let service = Service {
        input: file,
        output: &mut std::io::stdout(),
        error_printer: Box::new(|line, err| match err {
            ScenarioError::Csv(err) => eprintln!("Malformed row at line {line}: {err}"),
            err => eprintln!("Call at line {line} failed: {err}"),
        }),
    };
    service.run()
}
