use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use card_room::server::{run_server, ServerConfig};

const DEFAULT_BIND: &str = "127.0.0.1:8080";

#[derive(Debug, Parser)]
#[command(name = "card_room_server")]
#[command(about = "Launch the card room HTTP API server", long_about = None)]
struct Args {
    /// Address to bind the HTTP server to (host:port)
    #[arg(long, env = "CARD_ROOM_BIND", default_value = DEFAULT_BIND)]
    bind: SocketAddr,

    /// Base URL embedded into card-image links (e.g. https://cards.example.com)
    #[arg(long, env = "CARD_ROOM_BASE_URL")]
    base_url: Option<String>,

    /// Optional RNG seed for deterministic shuffles and deck names
    #[arg(long, env = "CARD_ROOM_RNG_SEED")]
    rng_seed: Option<u64>,

    /// Seconds between idle-session sweeps
    #[arg(long, env = "CARD_ROOM_SWEEP_INTERVAL", default_value_t = 3600)]
    sweep_interval_secs: u64,

    /// Seconds a session may sit untouched before the sweeper drops it
    #[arg(long, env = "CARD_ROOM_MAX_SESSION_AGE", default_value_t = 3600)]
    max_session_age_secs: u64,

    /// Toggle structured (JSON) logs
    #[arg(long, env = "CARD_ROOM_LOG_JSON", default_value_t = false)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.json);

    let config = ServerConfig {
        bind: args.bind,
        base_url: args.base_url,
        rng_seed: args.rng_seed,
        sweep_interval: Duration::from_secs(args.sweep_interval_secs.max(1)),
        max_session_age: Duration::from_secs(args.max_session_age_secs.max(1)),
    };
    run_server(config).await.context("server failed")
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt::fmt().with_env_filter(filter).with_target(false);

    if json {
        builder.json().flatten_event(true).init();
    } else {
        builder.compact().init();
    }
}
