use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vox_gateway::api::{ApiServer, ApiState};
use vox_gateway::{Config, SystemRunner, VoicePipeline};

/// Vox - voice chat gateway (speech in, spoken reply out)
#[derive(Parser)]
#[command(name = "vox", version, about)]
struct Cli {
    /// Port to listen on
    #[arg(long, env = "VOX_PORT")]
    port: Option<u16>,

    /// Path to a TOML config file (default: ~/.config/omni/vox/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Verify the configured engine and model paths resolve
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,vox_gateway=info",
        1 => "info,vox_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load_from(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if let Some(Command::Check) = cli.command {
        return check(&config);
    }

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        "starting vox gateway"
    );

    // Surface broken engine paths at startup rather than on the first
    // request; the gateway still serves so /capabilities stays useful
    if let Err(e) = config.validate() {
        tracing::warn!("{e}");
    }

    let pipeline = VoicePipeline::from_config(&config, Arc::new(SystemRunner))?;
    let state = Arc::new(ApiState {
        pipeline,
        config: config.clone(),
    });

    let server = ApiServer::new(state, config.server.host, config.server.port);
    server.run().await?;

    Ok(())
}

/// Print per-asset resolution results, fail if any is missing
fn check(config: &Config) -> anyhow::Result<()> {
    let mut missing = 0usize;
    for (name, path) in config.required_assets() {
        if path.exists() {
            println!("ok      {name}: {}", path.display());
        } else {
            println!("missing {name}: {}", path.display());
            missing += 1;
        }
    }

    if config.llm.api_key.is_some() {
        println!("ok      llm.api_key: set");
    } else {
        println!("missing llm.api_key: set GEMINI_API_KEY");
        missing += 1;
    }

    if missing > 0 {
        anyhow::bail!("{missing} required asset(s) missing");
    }
    println!("all assets resolved");
    Ok(())
}
