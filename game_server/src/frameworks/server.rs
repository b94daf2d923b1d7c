// Framework bootstrap for the game server runtime.

use std::io::Result;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::Mutex;

use shared::protocol::ServerStatusUpdate;
use shared::NodeClock;

use crate::domain::{MatchSession, ServerPhase};
use crate::frameworks::config;
use crate::interface_adapters::clients::matchmaker::MatchmakerClient;
use crate::interface_adapters::routes;
use crate::interface_adapters::state::AppState;

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

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let server_id = config::server_id();
    let port = config::http_port();
    let address = SocketAddr::from(([0, 0, 0, 0], port));

    // Bind TCP listener with error handling.
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|error| {
            tracing::error!(%address, %error, "failed to bind");
        })?;

    let public_address = config::public_address(port);
    let clock = Arc::new(NodeClock::new(server_id.clone()));
    let matchmaker = Arc::new(
        MatchmakerClient::new(
            config::matchmaker_base_url(),
            server_id.clone(),
            public_address.clone(),
            config::REPORT_TIMEOUT,
            Arc::clone(&clock),
        )
        .map_err(|error| {
            std::io::Error::other(format!("failed to build matchmaker client: {error}"))
        })?,
    );

    // First registration; a matchmaker we cannot reach is fatal.
    if let Err(error) = matchmaker.report(ServerStatusUpdate::Available, "").await {
        tracing::error!(%error, "failed to register with the matchmaker");
        return Err(std::io::Error::other("matchmaker unreachable"));
    }

    let state = Arc::new(AppState {
        clock,
        session: Arc::new(Mutex::new(MatchSession::new())),
        matchmaker: Arc::clone(&matchmaker),
        crash_probability: config::crash_probability(),
        match_duration_secs: config::MATCH_DURATION_SECS,
    });

    // Periodic heartbeat keeps liveness fresh between transitions.
    tokio::spawn(heartbeat_loop(Arc::clone(&state)));

    let app = routes::app(Arc::clone(&state));
    tracing::info!(
        %address,
        server_id = %state.matchmaker.server_id(),
        public_address = %public_address,
        crash_probability = state.crash_probability,
        "game server listening"
    );

    // Serve app and report errors rather than panicking.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(matchmaker))
        .await
        .inspect_err(|error| {
            tracing::error!(%error, "server error");
        })
}

// Re-send the current status on a fixed period.
async fn heartbeat_loop(state: Arc<AppState>) {
    let mut ticker = tokio::time::interval(config::HEARTBEAT_PERIOD);
    // The immediate first tick would duplicate the registration report.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let (status, match_id) = {
            let session = state.session.lock().await;
            match session.phase() {
                ServerPhase::Available => (ServerStatusUpdate::Available, String::new()),
                ServerPhase::Busy => (
                    ServerStatusUpdate::Busy,
                    session.current_match().unwrap_or_default().to_string(),
                ),
            }
        };
        if let Err(error) = state.matchmaker.report(status, &match_id).await {
            tracing::warn!(%error, "heartbeat failed");
        }
    }
}

// Best-effort Down report before a clean exit.
async fn shutdown_signal(matchmaker: Arc<MatchmakerClient>) {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("termination signal received, reporting down");
    if let Err(error) = matchmaker.report(ServerStatusUpdate::Down, "").await {
        tracing::warn!(%error, "could not report down during shutdown");
    }
}
