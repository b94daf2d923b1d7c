use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use shared::protocol::{ServerStatusUpdate, ServerStatusUpdateRequest, ServerStatusUpdateResponse};
use shared::NodeClock;

#[derive(Debug)]
pub enum ReportError {
    Transport(String),
    Upstream(String),
    Decode(String),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Transport(detail) => write!(f, "matchmaker transport error: {detail}"),
            ReportError::Upstream(detail) => write!(f, "matchmaker rejected update: {detail}"),
            ReportError::Decode(detail) => write!(f, "matchmaker response decode error: {detail}"),
        }
    }
}

impl std::error::Error for ReportError {}

// Thin reqwest client for pushing status updates to the matchmaker. Every
// report ticks the local clock component and folds the reply clock back in.
pub struct MatchmakerClient {
    http: reqwest::Client,
    base_url: String,
    server_id: String,
    public_address: String,
    clock: Arc<NodeClock>,
}

impl MatchmakerClient {
    pub fn new(
        base_url: impl Into<String>,
        server_id: impl Into<String>,
        public_address: impl Into<String>,
        timeout: Duration,
        clock: Arc<NodeClock>,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            server_id: server_id.into(),
            public_address: public_address.into(),
            clock,
        })
    }

    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    pub async fn report(
        &self,
        new_status: ServerStatusUpdate,
        match_id: &str,
    ) -> Result<(), ReportError> {
        let request = ServerStatusUpdateRequest {
            server_id: self.server_id.clone(),
            new_status,
            address: self.public_address.clone(),
            match_id: match_id.to_string(),
            clock: self.clock.tick_snapshot(),
        };

        let url = format!("{}/servers/status", self.base_url);
        let response = self
            .http
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|error| ReportError::Transport(error.to_string()))?;

        if !response.status().is_success() {
            return Err(ReportError::Upstream(response.status().to_string()));
        }

        let body = response
            .json::<ServerStatusUpdateResponse>()
            .await
            .map_err(|error| ReportError::Decode(error.to_string()))?;
        self.clock.observe(&body.clock);
        Ok(())
    }
}
