use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

use super::routes::{CardRoomServer, ServerContext};

const LOG_TARGET: &str = "card_room::server::bootstrap";

pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Base URL embedded into card-image links; no images without it.
    pub base_url: Option<String>,
    /// Deterministic RNG seed; entropy-seeded when absent.
    pub rng_seed: Option<u64>,
    pub sweep_interval: Duration,
    pub max_session_age: Duration,
}

/// Build the shared context: explicit registry instances and one
/// process-wide RNG, seeded once.
pub fn build_context(rng_seed: Option<u64>, base_url: Option<String>) -> Arc<ServerContext> {
    let rng = rng_seed
        .map(StdRng::seed_from_u64)
        .unwrap_or_else(StdRng::from_entropy);
    Arc::new(ServerContext::new(rng, base_url))
}

pub async fn run_server(config: ServerConfig) -> Result<()> {
    let context = build_context(config.rng_seed, config.base_url.clone());

    let sweeper = start_sweeper(
        Arc::clone(&context),
        config.sweep_interval,
        config.max_session_age,
    );

    let server = CardRoomServer::new(Arc::clone(&context));
    let make_service = server.into_router().into_make_service();

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    let local_addr = listener.local_addr()?;
    info!(
        target: LOG_TARGET,
        %local_addr,
        sweep_interval_secs = config.sweep_interval.as_secs(),
        max_session_age_secs = config.max_session_age.as_secs(),
        "card room server listening"
    );

    let result = axum::serve(listener, make_service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited with error");

    sweeper.abort();
    result
}

/// Periodically drop games and custom decks that nobody has touched for
/// longer than `max_age`.
fn start_sweeper(
    context: Arc<ServerContext>,
    interval: Duration,
    max_age: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let max_age = chrono::Duration::from_std(max_age).unwrap_or_else(|_| chrono::Duration::hours(1));
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it so a fresh server does
        // not sweep an empty map.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let now = Utc::now();
            let games = context.games.sweep_older_than(max_age, now);
            let decks = context.decks.sweep_older_than(max_age, now);
            if games + decks > 0 {
                info!(
                    target: LOG_TARGET,
                    games,
                    custom_decks = decks,
                    "sweep removed idle sessions"
                );
            }
        }
    })
}

async fn shutdown_signal() {
    use tracing::warn;

    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(
            target: LOG_TARGET,
            error = %err,
            "failed to install ctrl-c handler"
        );
    }
    info!(target: LOG_TARGET, "shutdown signal received");
}
