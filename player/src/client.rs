use std::time::{Duration, Instant};

use shared::protocol::{
    PlayerInfoRequest, PlayerStatusRequest, PlayerStatusResponse, QueuePlayerResponse,
    PLAYER_STATE_IN_MATCH,
};
use shared::NodeClock;

// Thin reqwest client for the player-facing matchmaker RPCs. The local
// clock ticks before every call and merges every reply, so later reads
// reflect this player's own writes causally.
pub struct PlayerClient {
    http: reqwest::Client,
    base_url: String,
    player_id: String,
    clock: NodeClock,
}

impl PlayerClient {
    pub fn new(
        base_url: impl Into<String>,
        player_id: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let clock = NodeClock::new(player_id.clone());
        Ok(Self {
            http,
            base_url: base_url.into(),
            player_id,
            clock,
        })
    }

    pub async fn join_queue(&self) {
        let request = PlayerInfoRequest {
            player_id: self.player_id.clone(),
            game_mode: "1v1".to_string(),
            clock: self.clock.tick_snapshot(),
        };

        let started = Instant::now();
        let url = format!("{}/matchmaking/queue", self.base_url);
        let response = match self.http.post(url).json(&request).send().await {
            Ok(response) => response,
            Err(error) => {
                tracing::error!(%error, "queue request failed");
                return;
            }
        };

        match response.json::<QueuePlayerResponse>().await {
            Ok(body) => {
                self.clock.observe(&body.clock);
                tracing::info!(
                    status = ?body.status,
                    message = %body.message,
                    elapsed = ?started.elapsed(),
                    "queue result"
                );
            }
            Err(error) => tracing::error!(%error, "queue response did not decode"),
        }
    }

    pub async fn query_status(&self) {
        let request = PlayerStatusRequest {
            player_id: self.player_id.clone(),
            clock: self.clock.tick_snapshot(),
        };

        let started = Instant::now();
        let url = format!("{}/matchmaking/status", self.base_url);
        let response = match self.http.post(url).json(&request).send().await {
            Ok(response) => response,
            Err(error) => {
                tracing::error!(%error, "status request failed");
                return;
            }
        };

        match response.json::<PlayerStatusResponse>().await {
            Ok(body) => {
                self.clock.observe(&body.clock);
                if body.state == PLAYER_STATE_IN_MATCH {
                    tracing::info!(
                        state = %body.state,
                        match_id = %body.match_id,
                        game_server = %body.server_addr,
                        elapsed = ?started.elapsed(),
                        "status result"
                    );
                } else {
                    tracing::info!(
                        state = %body.state,
                        elapsed = ?started.elapsed(),
                        "status result"
                    );
                }
            }
            Err(error) => tracing::error!(%error, "status response did not decode"),
        }
    }
}
