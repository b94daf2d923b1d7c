// Interactive player console: join the matchmaking queue and poll status.

mod client;

use std::process::ExitCode;
use std::{env, time::Duration};

use rand::Rng;
use tokio::io::{AsyncBufReadExt, BufReader};

use client::PlayerClient;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn player_id() -> String {
    env::var("PLAYER_ID")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| format!("Player{}", rand::thread_rng().gen_range(0..10_000)))
}

fn matchmaker_addr() -> String {
    env::var("MATCHMAKER_ADDR").unwrap_or_else(|_| "localhost:50051".to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing();

    let player_id = player_id();
    let addr = matchmaker_addr();
    tracing::info!(%player_id, matchmaker = %addr, "player console starting");

    // Fail fast when the coordinator cannot be dialed at all.
    if let Err(error) = tokio::net::TcpStream::connect(&addr).await {
        tracing::error!(%addr, %error, "cannot reach the matchmaker");
        return ExitCode::FAILURE;
    }

    let client = match PlayerClient::new(
        format!("http://{addr}"),
        player_id,
        Duration::from_secs(5),
    ) {
        Ok(client) => client,
        Err(error) => {
            tracing::error!(%error, "failed to build http client");
            return ExitCode::FAILURE;
        }
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_menu();
        let Ok(Some(line)) = lines.next_line().await else {
            break;
        };
        match line.trim() {
            "1" => client.join_queue().await,
            "2" => client.query_status().await,
            "3" => break,
            "" => {}
            other => println!("unrecognised option: {other}"),
        }
    }

    tracing::info!("player console exiting");
    ExitCode::SUCCESS
}

fn print_menu() {
    println!();
    println!("========= Player menu =========");
    println!("1) Join the matchmaking queue");
    println!("2) Check my status");
    println!("3) Quit");
    println!("===============================");
}
