use std::net::IpAddr;

use clap::{Parser, Subcommand};
use rentbuy::api::{ServerConfig, run_http_server};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rentbuy", about = "Interactive rent vs. buy net worth calculator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the calculator page and projection API
    Serve {
        #[arg(env = "RENTBUY_PORT", default_value_t = 8080)]
        port: u16,
        #[arg(long, default_value = "0.0.0.0")]
        host: IpAddr,
        #[arg(short, long, help = "Log request and projection details")]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let Command::Serve {
        port,
        host,
        verbose,
    } = cli.command;

    let default_filter = if verbose {
        "debug,tower_http=debug"
    } else {
        "info,tower_http=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    if let Err(e) = run_http_server(ServerConfig { host, port }).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}
