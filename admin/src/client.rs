use std::time::Duration;

use shared::protocol::{
    AdminServerUpdateRequest, AdminUpdateResponse, ForcedStatus, SystemStatusResponse,
};
use shared::NodeClock;

// Thin reqwest client for the admin RPCs, with its own causal clock.
pub struct AdminClient {
    http: reqwest::Client,
    base_url: String,
    clock: NodeClock,
}

impl AdminClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            clock: NodeClock::new("Admin"),
        })
    }

    pub async fn show_system_status(&self) {
        let url = format!("{}/admin/system-status", self.base_url);
        let response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(error) => {
                tracing::error!(%error, "system status request failed");
                return;
            }
        };

        let snapshot = match response.json::<SystemStatusResponse>().await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::error!(%error, "system status did not decode");
                return;
            }
        };
        self.clock.observe(&snapshot.clock);

        println!();
        println!("==================== system status ====================");
        println!();
        println!("game servers");
        if snapshot.servers.is_empty() {
            println!("  (none registered)");
        }
        for server in &snapshot.servers {
            println!(
                "  - id: {:<16} status: {:<10} addr: {:<22} match: {}",
                server.server_id,
                format!("{:?}", server.status),
                server.address,
                if server.current_match_id.is_empty() {
                    "-"
                } else {
                    &server.current_match_id
                },
            );
        }
        println!();
        println!("queued players");
        if snapshot.queue.is_empty() {
            println!("  (no players waiting)");
        }
        for entry in &snapshot.queue {
            println!(
                "  - id: {:<16} waiting: {}s",
                entry.player_id, entry.seconds_in_queue
            );
        }
        println!("=======================================================");
    }

    pub async fn force_server_state(&self, server_id: &str, forced_status: ForcedStatus) {
        let request = AdminServerUpdateRequest {
            server_id: server_id.to_string(),
            forced_status,
            clock: self.clock.tick_snapshot(),
        };

        let url = format!("{}/admin/servers/state", self.base_url);
        let response = match self.http.post(url).json(&request).send().await {
            Ok(response) => response,
            Err(error) => {
                tracing::error!(%error, "force state request failed");
                return;
            }
        };

        match response.json::<AdminUpdateResponse>().await {
            Ok(body) => {
                self.clock.observe(&body.clock);
                tracing::info!(
                    server_id,
                    status = ?body.status,
                    message = %body.message,
                    "force state result"
                );
            }
            Err(error) => tracing::error!(%error, "force state response did not decode"),
        }
    }
}
