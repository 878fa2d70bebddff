use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dyad_models::config::DyadConfig;
use dyad_results::ResultWriter;

#[derive(Parser, Debug)]
#[command(name = "dyad", about = "Paired-agent negotiation experiment runner")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/dyad.toml")]
    config: String,

    /// Pretty-print the result record JSON
    #[arg(long)]
    pretty: bool,

    /// Run without appending to the results file
    #[arg(long)]
    no_record: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Tracing goes to stderr (respects RUST_LOG); the record to stdout.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_str = std::fs::read_to_string(&cli.config)
        .with_context(|| format!("Failed to read config: {}", cli.config))?;
    let config: DyadConfig =
        toml::from_str(&config_str).with_context(|| "Failed to parse config")?;

    let oracle = dyad::build_oracle(&config);
    let record = dyad::run_negotiation(&config, oracle)
        .await
        .map_err(|e| anyhow::anyhow!("Run failed: {e}"))?;

    // Only completed runs reach this point; failures above leave the
    // results file untouched.
    if !cli.no_record {
        let mut writer = ResultWriter::open(&config.results.path)
            .with_context(|| format!("Failed to open results file: {}", config.results.path))?;
        writer.append(&record)?;
    }

    let output = if cli.pretty {
        serde_json::to_string_pretty(&record)?
    } else {
        serde_json::to_string(&record)?
    };
    println!("{output}");

    Ok(())
}
