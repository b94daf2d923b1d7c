mod support;

use std::time::Duration;

use axum::{routing::post, Json, Router};
use reqwest::StatusCode;

use shared::protocol::{
    AdminServerUpdateRequest, AdminUpdateResponse, AdminUpdateStatus, AssignMatchRequest,
    AssignMatchResponse, AssignStatus, ForcedStatus, PlayerInfoRequest, PlayerStatusRequest,
    PlayerStatusResponse, QueuePlayerResponse, QueueStatus, ServerHealth, ServerStatusUpdate,
    ServerStatusUpdateRequest, SystemStatusResponse,
};
use shared::VectorClock;

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

async fn queue_player(
    client: &reqwest::Client,
    base_url: &str,
    player_id: &str,
    clock: VectorClock,
) -> QueuePlayerResponse {
    client
        .post(format!("{base_url}/matchmaking/queue"))
        .json(&PlayerInfoRequest {
            player_id: player_id.to_string(),
            game_mode: "1v1".to_string(),
            clock,
        })
        .send()
        .await
        .expect("queue request should succeed")
        .json()
        .await
        .expect("queue response should decode")
}

async fn player_status(
    client: &reqwest::Client,
    base_url: &str,
    player_id: &str,
    clock: VectorClock,
) -> PlayerStatusResponse {
    client
        .post(format!("{base_url}/matchmaking/status"))
        .json(&PlayerStatusRequest {
            player_id: player_id.to_string(),
            clock,
        })
        .send()
        .await
        .expect("status request should succeed")
        .json()
        .await
        .expect("status response should decode")
}

async fn report_server(
    client: &reqwest::Client,
    base_url: &str,
    server_id: &str,
    new_status: ServerStatusUpdate,
    address: &str,
    match_id: &str,
) {
    let response = client
        .post(format!("{base_url}/servers/status"))
        .json(&ServerStatusUpdateRequest {
            server_id: server_id.to_string(),
            new_status,
            address: address.to_string(),
            match_id: match_id.to_string(),
            clock: VectorClock::new(),
        })
        .send()
        .await
        .expect("server update should succeed");
    assert_eq!(response.status(), StatusCode::OK);
}

async fn system_status(client: &reqwest::Client, base_url: &str) -> SystemStatusResponse {
    client
        .get(format!("{base_url}/admin/system-status"))
        .send()
        .await
        .expect("admin request should succeed")
        .json()
        .await
        .expect("admin response should decode")
}

// Spin up a stub game server that accepts every assignment.
async fn start_stub_game_server() -> String {
    async fn assign_ok(Json(request): Json<AssignMatchRequest>) -> Json<AssignMatchResponse> {
        Json(AssignMatchResponse {
            status: AssignStatus::Ok,
            message: "match accepted".to_string(),
            clock: request.clock,
        })
    }

    let router = Router::new().route("/matches/assign", post(assign_ok));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub game server");
    let addr = listener.local_addr().expect("stub local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stub serve");
    });
    addr.to_string()
}

// Queue → failed dispatch → retry on a healthy server → completion, all
// against the real server with real ticks.
#[tokio::test]
async fn full_matchmaking_flow() {
    let base_url = support::ensure_server();
    let client = reqwest::Client::new();

    let player_a = unique("PlayerA");
    let player_b = unique("PlayerB");
    let dead_server = unique("G-dead");
    let live_server = unique("G-live");

    // Unknown player: well-formed response, not an error.
    let status = player_status(&client, base_url, &player_a, VectorClock::new()).await;
    assert_eq!(status.state, "Unknown");

    // First enqueue succeeds, the duplicate is rejected without stacking.
    let queued = queue_player(&client, base_url, &player_a, VectorClock::new()).await;
    assert_eq!(queued.status, QueueStatus::Ok);
    let c1 = queued.clock.clone();
    assert!(!c1.is_empty());

    let duplicate = queue_player(&client, base_url, &player_a, VectorClock::new()).await;
    assert_eq!(duplicate.status, QueueStatus::AlreadyInQueue);

    // Read-your-writes: a status read sent with C1 reflects at least C1.
    let status = player_status(&client, base_url, &player_a, c1.clone()).await;
    assert_eq!(status.state, "InQueue");
    assert!(status.clock.dominates(&c1));

    let snapshot = system_status(&client, base_url).await;
    assert!(snapshot
        .queue
        .iter()
        .any(|entry| entry.player_id == player_a));

    // An Available server nobody listens on: the pairing tick will form a
    // match, the dispatch will fail, and the pair must return in order.
    report_server(
        &client,
        base_url,
        &dead_server,
        ServerStatusUpdate::Available,
        "127.0.0.1:1",
        "",
    )
    .await;
    let queued = queue_player(&client, base_url, &player_b, VectorClock::new()).await;
    assert_eq!(queued.status, QueueStatus::Ok);

    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        let snapshot = system_status(&client, base_url).await;
        let dead_is_down = snapshot
            .servers
            .iter()
            .any(|server| server.server_id == dead_server && server.status == ServerHealth::Down);
        let pair_waiting: Vec<&str> = snapshot
            .queue
            .iter()
            .map(|entry| entry.player_id.as_str())
            .collect();
        if dead_is_down && pair_waiting == [player_a.as_str(), player_b.as_str()] {
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "dead server was never detected; snapshot: {snapshot:?}"
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    // A healthy server shows up; the retry must land on it.
    let stub_addr = start_stub_game_server().await;
    report_server(
        &client,
        base_url,
        &live_server,
        ServerStatusUpdate::Available,
        &stub_addr,
        "",
    )
    .await;

    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    let match_id = loop {
        let status = player_status(&client, base_url, &player_a, VectorClock::new()).await;
        if status.state == "InMatch" {
            assert!(!status.match_id.is_empty());
            assert_eq!(status.server_addr, stub_addr);
            break status.match_id;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "pair was never matched; last status: {status:?}"
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
    };

    // The stub accepted the assignment, so the match must stick.
    tokio::time::sleep(Duration::from_millis(400)).await;
    let status = player_status(&client, base_url, &player_a, VectorClock::new()).await;
    assert_eq!(status.state, "InMatch");
    let status = player_status(&client, base_url, &player_b, VectorClock::new()).await;
    assert_eq!(status.state, "InMatch");
    assert_eq!(status.match_id, match_id);

    // Server reports Available with the match id: completion.
    report_server(
        &client,
        base_url,
        &live_server,
        ServerStatusUpdate::Available,
        &stub_addr,
        &match_id,
    )
    .await;

    for player_id in [&player_a, &player_b] {
        let status = player_status(&client, base_url, player_id, VectorClock::new()).await;
        assert_eq!(status.state, "Idle");
        assert!(status.match_id.is_empty());
    }
    let snapshot = system_status(&client, base_url).await;
    assert!(snapshot.queue.is_empty());
    assert!(snapshot
        .servers
        .iter()
        .any(|server| server.server_id == live_server
            && server.status == ServerHealth::Available
            && server.current_match_id.is_empty()));
}

#[tokio::test]
async fn admin_force_on_unknown_server_returns_not_found() {
    let base_url = support::ensure_server();
    let client = reqwest::Client::new();

    let response: AdminUpdateResponse = client
        .post(format!("{base_url}/admin/servers/state"))
        .json(&AdminServerUpdateRequest {
            server_id: unique("Ghost"),
            forced_status: ForcedStatus::ForceDown,
            clock: VectorClock::new(),
        })
        .send()
        .await
        .expect("admin update should succeed")
        .json()
        .await
        .expect("admin update should decode");

    assert_eq!(response.status, AdminUpdateStatus::NotFound);
}

#[tokio::test]
async fn queue_without_player_id_is_a_bad_request() {
    let base_url = support::ensure_server();
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base_url}/matchmaking/queue"))
        .json(&serde_json::json!({ "player_id": "", "game_mode": "1v1" }))
        .send()
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
