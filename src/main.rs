use anyhow::Result;
use clap::Parser;

use pairchat::{
    cli::{Cli, Command},
    config::{ConnectConfig, HostConfig},
    connect, host,
};

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Host(args) => host::run(HostConfig::new(args)?).await,
        Command::Connect(args) => connect::run(ConnectConfig::new(args)?).await,
    }
}
