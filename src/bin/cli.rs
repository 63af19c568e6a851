use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use devpi_smoke::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "devpi-smoke")]
#[command(about = "Test devpi server functionality (login, upload, download)", long_about = None)]
#[command(version)]
#[command(after_help = "Examples:
  devpi-smoke --server https://devpi.example.com --username testuser --password testpass --index testuser/dev
  devpi-smoke -s https://devpi.example.com -u testuser -p testpass -i testuser/dev")]
struct Cli {
    /// devpi server URL (e.g., https://devpi.example.com)
    #[arg(short, long)]
    server: String,

    /// devpi username
    #[arg(short, long)]
    username: String,

    /// devpi password
    #[arg(short, long)]
    password: String,

    /// devpi index (e.g., username/indexname)
    #[arg(short, long)]
    index: String,

    /// YAML file overriding tool locations and the fixture package
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Package source directory (default: test-package next to the executable)
    #[arg(long, value_name = "DIR")]
    package_dir: Option<PathBuf>,

    /// Stream tool output to the terminal instead of capturing it
    #[arg(long)]
    stream_output: bool,

    /// Print the result table as JSON after the summary
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "devpi_smoke=debug"
    } else {
        "devpi_smoke=warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "devpi-smoke failed");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    let config = match &cli.config {
        Some(path) => SmokeConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SmokeConfig::default(),
    };

    let output_mode = if cli.stream_output {
        OutputMode::Inherit
    } else {
        OutputMode::Capture
    };

    let ctx = ExecutionContext::new(
        cli.server,
        cli.username,
        cli.password,
        cli.index,
        config.fixture(cli.package_dir),
    )
    .with_tools(config.tools.clone())
    .with_output_mode(output_mode);

    let runner = SystemRunner::new();
    let reporter = ConsoleReporter::new();

    match Pipeline::new(&runner, &reporter).run(&ctx).await {
        Ok(table) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            }
            Ok(table.exit_code())
        }
        Err(PipelineError::PreconditionMissing(_)) => Ok(1),
        Err(e) => Err(e.into()),
    }
}
