//! Terminal chat client for the Parlor server.
//!
//! Joins a room, sends each input line as a chat message and prints what the
//! other members send. Automatically reconnects on disconnection (max 5
//! attempts with 5 second interval) and rejoins the current room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin parlor-client -- --user alice --room general
//! cargo run --bin parlor-client -- -n bob -r general -u ws://127.0.0.1:3000/ws
//! ```

use clap::Parser;

use parlor_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "parlor-client")]
#[command(about = "Terminal client for the Parlor room chat server", long_about = None)]
struct Args {
    /// Display name shown to the other members
    #[arg(short = 'n', long)]
    user: String,

    /// Room to join after connecting
    #[arg(short = 'r', long)]
    room: Option<String>,

    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Run the client
    if let Err(e) = parlor_client::run_client(args.url, args.user, args.room).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
