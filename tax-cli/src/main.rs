use clap::Parser;
use tracing_subscriber::EnvFilter;

use tax_cli::cli::Cli;
use tax_cli::config::CliConfig;

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// * Honours `RUST_LOG` when set.
/// * Falls back to the configured filter so normal runs are quiet.
/// * Writes to stderr so reports on stdout stay machine-readable.
fn init_tracing(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::discover(cli.config.as_deref())?;
    init_tracing(&config.log_filter);

    let output = tax_cli::run(&cli, &config)?;
    print!("{output}");

    Ok(())
}
