//! Transport Items API
//!
//! Typed CRUD over the authenticated client for the transport-item
//! resource. Non-success statuses become [`ApiError::Status`]; the 401
//! refresh dance happens below this layer.

use crate::client::{expect_json, expect_success, AuthClient};
use crate::error::{ApiError, Result};
use bridge_traits::http::{HttpMethod, HttpRequest};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A tracked piece of transport equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportItem {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Podium the item is currently assigned to, when any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub podium: Option<PodiumRef>,
}

/// Nested podium reference as the backend embeds it in item payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodiumRef {
    pub id: i64,
    pub name: String,
}

/// Payload for creating or updating a transport item.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportItemRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub podium_id: Option<i64>,
}

/// CRUD surface for transport items.
#[derive(Debug, Clone)]
pub struct TransportItemsApi {
    client: AuthClient,
    base_url: String,
}

impl TransportItemsApi {
    pub fn new(client: AuthClient) -> Result<Self> {
        let config = client.config();
        let base_url = config
            .endpoint_url(&config.endpoints.transport_items)
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/{}", self.base_url, id)
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<TransportItem>> {
        let request = HttpRequest::new(HttpMethod::Get, &self.base_url);
        let response = self.client.execute(request).await?;
        expect_json(&response)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<TransportItem> {
        let request = HttpRequest::new(HttpMethod::Get, self.item_url(id));
        let response = self.client.execute(request).await?;
        expect_json(&response)
    }

    #[instrument(skip(self, item), fields(name = %item.name))]
    pub async fn create(&self, item: &TransportItemRequest) -> Result<TransportItem> {
        let request = HttpRequest::new(HttpMethod::Post, &self.base_url)
            .json(item)
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        let response = self.client.execute(request).await?;
        expect_json(&response)
    }

    #[instrument(skip(self, item))]
    pub async fn update(&self, id: i64, item: &TransportItemRequest) -> Result<TransportItem> {
        let request = HttpRequest::new(HttpMethod::Put, self.item_url(id))
            .json(item)
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        let response = self.client.execute(request).await?;
        expect_json(&response)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        let request = HttpRequest::new(HttpMethod::Delete, self.item_url(id));
        let response = self.client.execute(request).await?;
        expect_success(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_deserializes_with_nested_podium() {
        let body = json!({
            "id": 7,
            "name": "Pallet lifter",
            "serialNumber": "PL-0099",
            "status": "in_service",
            "podium": {"id": 2, "name": "Station North"}
        });
        let item: TransportItem = serde_json::from_value(body).unwrap();
        assert_eq!(item.id, 7);
        assert_eq!(item.serial_number.as_deref(), Some("PL-0099"));
        assert_eq!(item.podium.as_ref().unwrap().name, "Station North");
    }

    #[test]
    fn test_item_tolerates_missing_optionals() {
        let body = json!({"id": 1, "name": "Cart"});
        let item: TransportItem = serde_json::from_value(body).unwrap();
        assert!(item.description.is_none());
        assert!(item.podium.is_none());
    }

    #[test]
    fn test_request_omits_unset_fields() {
        let request = TransportItemRequest {
            name: "Cart".to_string(),
            ..Default::default()
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body, json!({"name": "Cart"}));
    }

    #[test]
    fn test_request_serializes_podium_id_camel_case() {
        let request = TransportItemRequest {
            name: "Cart".to_string(),
            podium_id: Some(3),
            ..Default::default()
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["podiumId"], 3);
    }
}
