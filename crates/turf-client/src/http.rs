//! REST endpoints: history pages and the room list.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use turf_core::{HistorySource, TransportError};
use turf_proto::{Message, RoomId, RoomSummary};

use crate::{ClientConfig, ClientError};

/// Authenticated client for the chat REST API.
#[derive(Debug, Clone)]
pub struct HttpApi {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl HttpApi {
    /// Create a client for `config`.
    pub fn new(config: Arc<ClientConfig>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, config })
    }

    /// `GET /chatrooms`: rooms the caller belongs to.
    #[instrument(skip(self))]
    pub async fn list_rooms(&self) -> Result<Vec<RoomSummary>, TransportError> {
        self.get_json(&self.config.api_url("chatrooms"), &[]).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, TransportError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(self.config.token())
            .query(query)
            .send()
            .await
            .map_err(|e| {
                warn!(%url, error = %e, "request failed");
                TransportError::Unreachable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "request rejected");
            return Err(TransportError::Status { status: status.as_u16() });
        }

        response.json::<T>().await.map_err(|e| {
            warn!(%url, error = %e, "undecodable response");
            TransportError::Decode(e.to_string())
        })
    }
}

impl HistorySource for HttpApi {
    /// `GET /messages?room_id=&offset=&limit=`.
    #[instrument(skip(self), fields(room = %room_id))]
    async fn load_page(
        &self,
        room_id: &RoomId,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Message>, TransportError> {
        let query = [
            ("room_id", room_id.as_str().to_owned()),
            ("offset", offset.to_string()),
            ("limit", limit.to_string()),
        ];
        let page: Vec<Message> = self.get_json(&self.config.api_url("messages"), &query).await?;
        debug!(len = page.len(), "history page loaded");
        Ok(page)
    }
}
