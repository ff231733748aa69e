use clap::{Parser, Subcommand};
use std::net::SocketAddr;

#[derive(Parser, Debug)]
#[command(name = "roxy")]
#[command(about = "Discord interaction bot posting Pixiv gallery previews", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the interaction endpoint, image proxy and delivery worker
    Server(ServerArgs),
}

#[derive(clap::Args, Debug)]
pub struct ServerArgs {
    /// Address to bind the HTTP server to, overriding `server.bind_addr`
    #[arg(long)]
    pub address: Option<SocketAddr>,
}
