use hermes_runner::{PaperSession, RunnerConfig};
use log::info;

fn print_help() {
    eprintln!(
        r#"Hermes - paper-trading session for the order ledger and execution core

USAGE:
    hermes-runner [OPTIONS]

OPTIONS:
    --config <PATH>     Load configuration from JSON file
    --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG            Log level filter (default: info)

EXAMPLES:
    # Run with defaults (BTC-USD, 30 seconds)
    hermes-runner

    # Run with config file
    hermes-runner --config hermes.json
"#
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
                config_path = Some(args[i].clone());
            }
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let config = match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            RunnerConfig::from_file(&path)?
        }
        None => {
            info!("Using default configuration");
            RunnerConfig::default()
        }
    };
    config.validate()?;

    let session = PaperSession::new(config)?;
    let operator = session.scripted_operator();
    let report = session.run(Some(operator)).await?;

    info!(
        "Applied {} feed messages ({} malformed, {} skipped), {} activity ticks, {} operator requests",
        report.ledger.applied,
        report.ledger.malformed,
        report.ledger.skipped,
        report.activity_ticks,
        report.operator_requests
    );
    Ok(())
}
