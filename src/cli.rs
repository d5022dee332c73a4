use clap::{Args, Parser, Subcommand};

use crate::config::{DEFAULT_HOST_NAME, DEFAULT_PORT};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Wait for a peer to connect and chat with it.
    Host(HostArgs),
    /// Connect to a hosting peer and chat with it.
    Connect(ConnectArgs),
}

#[derive(Args, Debug, Clone)]
pub struct HostArgs {
    /// Display name announced to the connecting peer.
    #[arg(long, default_value = DEFAULT_HOST_NAME)]
    pub name: String,

    /// Port to listen on.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

#[derive(Args, Debug, Clone)]
pub struct ConnectArgs {
    /// Display name announced to the hosting peer.
    #[arg(long)]
    pub name: String,

    /// Address of the hosting peer.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port the hosting peer listens on.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}
