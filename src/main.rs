use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use booking_core::{
    ApiConfig, Commands, Container, ContainerConfig, Router, DEFAULT_SLOT_STEP_MINUTES,
    MAX_SLOT_STEP_MINUTES,
};

#[derive(Parser)]
#[command(name = "booking")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Booking API base URL (overrides BOOKING_API_URL)
    #[arg(long, global = true, env = "BOOKING_API_URL")]
    api_url: Option<String>,

    /// Serve from a JSON catalog with in-memory bookings instead of the API
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Slot grid granularity in minutes
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_SLOT_STEP_MINUTES,
        value_parser = clap::value_parser!(u32).range(1..=MAX_SLOT_STEP_MINUTES as i64)
    )]
    step: u32,

    /// Deadline for each backend call, in seconds
    #[arg(long, global = true)]
    deadline_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut api = ApiConfig::from_env();
    if let Some(url) = cli.api_url {
        api.base_url = url;
    }

    let config = ContainerConfig {
        api,
        catalog: cli.catalog,
        step_minutes: cli.step,
        deadline: cli.deadline_secs.map(Duration::from_secs),
    };
    let container = Container::new(config).await?;
    debug!("Container ready (offline: {})", container.is_offline());

    let router = Router::new(&container);
    let output = router.route(cli.command).await?;
    println!("{}", output);

    Ok(())
}
