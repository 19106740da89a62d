//! Room chat client.
//!
//! Connects to a Hiroba server, joins a room and sends messages typed on
//! stdin. Transcript entries and room counts are printed as the server pushes
//! them. The transport reconnects automatically (max 5 attempts with 5
//! second interval) and rejoins the current room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-client -- --room general
//! HIROBA_BACKEND_URL=ws://10.0.0.2:8080/ws cargo run --bin hiroba-client -- -r lobby
//! ```

use clap::Parser;

use hiroba_client::{ClientConfig, cli::run_client};
use hiroba_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hiroba-client")]
#[command(about = "Room-scoped WebSocket chat client", long_about = None)]
struct Args {
    /// Room to join on startup
    #[arg(short = 'r', long)]
    room: Option<String>,

    /// WebSocket server URL (overrides HIROBA_BACKEND_URL)
    #[arg(short = 'u', long)]
    url: Option<String>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let mut config = ClientConfig::from_env();
    if let Some(url) = args.url {
        config.backend_url = url;
    }

    if let Err(e) = run_client(config, args.room).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
