use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use arcade_kiosk::config::DEFAULT_CONFIG_PATH;
use arcade_kiosk::{Kiosk, KioskConfig, KioskError, catalog};

/// Terminal arcade kiosk. Reads operator commands from stdin and draws the
/// screen on stdout; logs go to stderr.
#[derive(Debug, Parser)]
#[command(name = "arcade-kiosk", version, about)]
struct Cli {
    /// Config file; a missing file means defaults.
    #[arg(long, env = "ARCADE_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Seed for reproducible sessions.
    #[arg(long)]
    seed: Option<u64>,

    /// Frames per second.
    #[arg(long)]
    frame_rate: Option<u32>,

    /// Disable audio cues.
    #[arg(long)]
    mute: bool,
}

fn load_config(cli: &Cli) -> Result<KioskConfig, KioskError> {
    let mut config = KioskConfig::load(&cli.config)?;
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(rate) = cli.frame_rate {
        config.frame_rate = rate;
    }
    if cli.mute {
        config.audio.enabled = false;
    }
    Ok(config)
}

async fn serve(cli: Cli) -> Result<(), KioskError> {
    let config = load_config(&cli)?;
    let registry = catalog::default_registry()?;
    let kiosk = Kiosk::new(&config, registry)?;
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    arcade_kiosk::run(kiosk, stdin, std::io::stdout()).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!("arcade kiosk starting");

    match serve(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "kiosk stopped");
            ExitCode::FAILURE
        },
    }
}
