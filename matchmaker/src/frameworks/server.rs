// Framework bootstrap for the matchmaker runtime.

use std::io::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::{watch, RwLock};

use crate::domain::ports::TimeSource;
use crate::frameworks::config;
use crate::interface_adapters::clients::game_server::GameServerClient;
use crate::interface_adapters::routes;
use crate::interface_adapters::state::AppState;
use crate::use_cases::matchmaker::Matchmaker;
use crate::use_cases::pairing;

struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_epoch_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state()?;

    // Pairing loop runs until the shutdown flag flips.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(pairing::run_pairing_loop(Arc::clone(&state), shutdown_rx));

    let app = routes::app(state);
    tracing::info!(%address, "matchmaker listening");

    // Serve app and report errors rather than panicking.
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|error| {
            tracing::error!(%error, "server error");
        });

    // Stop the pairing loop before returning so no tick runs mid-teardown.
    let _ = shutdown_tx.send(true);
    served
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([0, 0, 0, 0], config::http_port()));

    // Bind TCP listener with error handling.
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|error| {
            tracing::error!(%address, %error, "failed to bind");
        })?;

    run(listener).await
}

fn build_state() -> Result<Arc<AppState>> {
    let assignments = GameServerClient::new(config::dispatch_timeout())
        .map_err(|error| std::io::Error::other(format!("failed to build dispatch client: {error}")))?;

    let time: Arc<dyn TimeSource> = Arc::new(SystemTimeSource);
    let matchmaker = Matchmaker::new(config::SELF_NODE_ID, time);

    Ok(Arc::new(AppState {
        matchmaker: Arc::new(RwLock::new(matchmaker)),
        assignments: Arc::new(assignments),
        match_tick: config::match_tick(),
        heartbeat_timeout: config::heartbeat_timeout(),
    }))
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received, draining in-flight requests");
}
