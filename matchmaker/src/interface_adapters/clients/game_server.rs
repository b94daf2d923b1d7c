use std::time::Duration;

use async_trait::async_trait;

use shared::protocol::{AssignMatchRequest, AssignMatchResponse};

use crate::domain::ports::{AssignmentClient, AssignmentError};

// Thin reqwest client for the assignment RPC. Connections are short-lived
// per dispatch; addresses are re-read from the registry on every job, so a
// re-registered server is reached at its new endpoint.
#[derive(Clone)]
pub struct GameServerClient {
    http: reqwest::Client,
}

impl GameServerClient {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl AssignmentClient for GameServerClient {
    async fn assign_match(
        &self,
        address: &str,
        request: &AssignMatchRequest,
    ) -> Result<AssignMatchResponse, AssignmentError> {
        // Registered addresses are plain host:port.
        let url = format!("http://{address}/matches/assign");
        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|error| AssignmentError::Transport(error.to_string()))?;

        if !response.status().is_success() {
            return Err(AssignmentError::Transport(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        response
            .json::<AssignMatchResponse>()
            .await
            .map_err(|error| AssignmentError::Decode(error.to_string()))
    }
}
