use std::time::Duration;

use clap::Parser;
use relay::{
    Relay, RelaySettings,
    chunk::MAX_MESSAGE_CHARS,
    client::{DEFAULT_ENDPOINT, RelayClient},
    transport::ConsoleTransport,
};
use utils::log::init_tracing_stderr;

#[derive(Debug, Parser)]
#[command(name = "relay", about = "Relay chat messages to the Second Brain assistant")]
struct Args {
    /// Assistant chat endpoint
    #[arg(long, env = "RELAY_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Longest reply sent as one message, in characters
    #[arg(long, env = "RELAY_MAX_CHUNK", default_value_t = MAX_MESSAGE_CHARS)]
    max_chunk: usize,

    /// Pause between the parts of a split reply
    #[arg(long, env = "RELAY_CHUNK_DELAY_MS", default_value_t = 1000)]
    chunk_delay_ms: u64,

    /// Recent chat messages forwarded as context
    #[arg(long, env = "RELAY_HISTORY", default_value_t = 10)]
    history: usize,

    #[arg(long, env = "RELAY_TIMEOUT_SECS", default_value_t = 120)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing_stderr("info");
    let args = Args::parse();

    let client = RelayClient::new(args.endpoint, Duration::from_secs(args.timeout_secs))?;
    let settings = RelaySettings {
        max_chunk: args.max_chunk,
        chunk_delay: Duration::from_millis(args.chunk_delay_ms),
        history: args.history,
    };

    Relay::new(ConsoleTransport::new(), client, settings).run().await?;
    Ok(())
}
