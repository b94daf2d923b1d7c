// Interactive operator console: inspect the system and force server states.

mod client;

use std::process::ExitCode;
use std::{env, time::Duration};

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use shared::protocol::ForcedStatus;

use client::AdminClient;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn matchmaker_addr() -> String {
    env::var("MATCHMAKER_ADDR").unwrap_or_else(|_| "localhost:50051".to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing();

    let addr = matchmaker_addr();
    tracing::info!(matchmaker = %addr, "admin console starting");

    // Fail fast when the coordinator cannot be dialed at all.
    if let Err(error) = tokio::net::TcpStream::connect(&addr).await {
        tracing::error!(%addr, %error, "cannot reach the matchmaker");
        return ExitCode::FAILURE;
    }

    let client = match AdminClient::new(format!("http://{addr}"), Duration::from_secs(5)) {
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
            "1" => client.show_system_status().await,
            "2" => force_server_state(&client, &mut lines).await,
            "3" => break,
            "" => {}
            other => println!("unrecognised option: {other}"),
        }
    }

    tracing::info!("admin console exiting");
    ExitCode::SUCCESS
}

async fn force_server_state(client: &AdminClient, lines: &mut Lines<BufReader<Stdin>>) {
    println!("server id:");
    let Ok(Some(server_id)) = lines.next_line().await else {
        return;
    };
    let server_id = server_id.trim().to_string();
    if server_id.is_empty() {
        println!("server id must not be empty");
        return;
    }

    println!("new state (available/down):");
    let Ok(Some(raw_state)) = lines.next_line().await else {
        return;
    };
    let forced_status = match raw_state.trim().to_ascii_lowercase().as_str() {
        "available" => ForcedStatus::ForceAvailable,
        "down" => ForcedStatus::ForceDown,
        other => {
            println!("unrecognised state: {other}");
            return;
        }
    };

    client.force_server_state(&server_id, forced_status).await;
}

fn print_menu() {
    println!();
    println!("========= Admin menu =========");
    println!("1) Show system status");
    println!("2) Force a server state");
    println!("3) Quit");
    println!("==============================");
}
