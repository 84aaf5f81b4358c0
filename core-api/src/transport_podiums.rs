//! Transport Podiums API
//!
//! CRUD surface for podiums, the stations transport items are assigned to.

use crate::client::{expect_json, expect_success, AuthClient};
use crate::error::{ApiError, Result};
use bridge_traits::http::{HttpMethod, HttpRequest};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A podium (station) items can be assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportPodium {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Payload for creating or updating a podium.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportPodiumRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// CRUD surface for transport podiums.
#[derive(Debug, Clone)]
pub struct TransportPodiumsApi {
    client: AuthClient,
    base_url: String,
}

impl TransportPodiumsApi {
    pub fn new(client: AuthClient) -> Result<Self> {
        let config = client.config();
        let base_url = config
            .endpoint_url(&config.endpoints.transport_podiums)
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn podium_url(&self, id: i64) -> String {
        format!("{}/{}", self.base_url, id)
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<TransportPodium>> {
        let request = HttpRequest::new(HttpMethod::Get, &self.base_url);
        let response = self.client.execute(request).await?;
        expect_json(&response)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<TransportPodium> {
        let request = HttpRequest::new(HttpMethod::Get, self.podium_url(id));
        let response = self.client.execute(request).await?;
        expect_json(&response)
    }

    #[instrument(skip(self, podium), fields(name = %podium.name))]
    pub async fn create(&self, podium: &TransportPodiumRequest) -> Result<TransportPodium> {
        let request = HttpRequest::new(HttpMethod::Post, &self.base_url)
            .json(podium)
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        let response = self.client.execute(request).await?;
        expect_json(&response)
    }

    #[instrument(skip(self, podium))]
    pub async fn update(&self, id: i64, podium: &TransportPodiumRequest) -> Result<TransportPodium> {
        let request = HttpRequest::new(HttpMethod::Put, self.podium_url(id))
            .json(podium)
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        let response = self.client.execute(request).await?;
        expect_json(&response)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        let request = HttpRequest::new(HttpMethod::Delete, self.podium_url(id));
        let response = self.client.execute(request).await?;
        expect_success(&response)
    }
}
