//! Statwar server binary.
//!
//! # Usage
//!
//! ```bash
//! # Local play with a self-signed certificate
//! statwar-server --bind 127.0.0.1:4433
//!
//! # With a real certificate
//! statwar-server --bind 0.0.0.0:4433 --cert cert.pem --key key.pem
//! ```

use clap::Parser;
use statwar_server::{DriverConfig, Server, ServerRuntimeConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Statwar card game server
#[derive(Parser, Debug)]
#[command(name = "statwar-server")]
#[command(about = "Multiplayer stat-comparison card game server")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:4433")]
    bind: String,

    /// Path to TLS certificate (PEM format)
    #[arg(short, long, requires = "key")]
    cert: Option<String>,

    /// Path to TLS private key (PEM format)
    #[arg(short, long, requires = "cert")]
    key: Option<String>,

    /// Maximum concurrent connections
    #[arg(long, default_value_t = 10_000)]
    max_connections: usize,

    /// Log filter used when `RUST_LOG` is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let config = ServerRuntimeConfig {
        bind_address: args.bind,
        cert_path: args.cert,
        key_path: args.key,
        driver: DriverConfig { max_connections: args.max_connections },
    };

    let server = Server::bind(config)?;
    tracing::info!(addr = %server.local_addr()?, "statwar server listening");

    server.run().await?;
    Ok(())
}
