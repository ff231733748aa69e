mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use roxy::config::Config;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    roxy::observability::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Server(args) => {
            info!("Loading configuration");
            let mut config = Config::load()?;
            if let Some(address) = args.address {
                config.server.bind_addr = address;
            }
            roxy::api::run(config).await?
        }
    }

    Ok(())
}
