//! Network devices and device types.

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::client::MetasysClient;
use crate::error::{MetasysError, Result};
use crate::pagination::Page;
use crate::traits::List;

/// A network device (supervisory controller, field controller, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDevice {
    /// The device's object identifier.
    pub id: Uuid,

    /// Fully-qualified item reference.
    #[serde(default)]
    pub item_reference: Option<String>,

    /// Display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Device type, as reported by the server.
    #[serde(rename = "type", alias = "objectType", default)]
    pub device_type: Option<String>,

    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,

    /// Firmware version, when reported.
    #[serde(default)]
    pub firmware_version: Option<String>,
}

/// Query for listing network devices.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkDeviceQuery {
    /// Restrict the listing to one device type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
}

#[async_trait]
impl List for NetworkDevice {
    type Query = NetworkDeviceQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &MetasysClient,
        query: &Self::Query,
        page: u32,
    ) -> Result<Page<Self>> {
        #[derive(Serialize)]
        struct RequestParams<'a> {
            #[serde(flatten)]
            query: &'a NetworkDeviceQuery,
            page: u32,
        }

        let params = RequestParams { query, page };
        let response = client.get_with_query("networkDevices", &params).await?;
        let text = response.text().await.map_err(MetasysError::from_reqwest)?;
        let value: Value = serde_json::from_str(&text)?;

        Ok(Page::from_value(&value, page))
    }
}

/// Fetch every network device, optionally restricted to one type.
///
/// Walks all pages of `/networkDevices` in order.
#[tracing::instrument(skip(client))]
pub async fn get_network_devices(
    client: &MetasysClient,
    device_type: Option<&str>,
) -> Result<Vec<NetworkDevice>> {
    let query = NetworkDeviceQuery {
        device_type: device_type.map(str::to_string),
    };
    NetworkDevice::list_all(client, &query).await
}

/// A device type usable as a network-device listing filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceType {
    /// The type id used in listing queries.
    #[serde(default)]
    pub id: Option<i64>,

    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Fetch the available network-device types.
///
/// `GET /networkDevices/availableTypes` returns items carrying a `typeUrl`
/// each; every URL is dereferenced with its own request (concurrently) to
/// obtain the type description. Items without a `typeUrl`, and items whose
/// dereference fails, are logged and dropped rather than failing the whole
/// listing.
#[tracing::instrument(skip(client))]
pub async fn get_available_device_types(client: &MetasysClient) -> Result<Vec<DeviceType>> {
    let response = client.get("networkDevices/availableTypes").await?;
    let text = response.text().await.map_err(MetasysError::from_reqwest)?;
    let value: Value = serde_json::from_str(&text)?;

    let Some(items) = value.get("items").and_then(Value::as_array) else {
        tracing::warn!("availableTypes response has no well-formed 'items'");
        return Ok(Vec::new());
    };

    let mut urls = Vec::new();
    for item in items {
        match item.get("typeUrl").and_then(Value::as_str) {
            Some(url) => urls.push(url.to_string()),
            None => tracing::warn!("availableTypes item is missing 'typeUrl', skipping"),
        }
    }

    let fetches = urls.iter().map(|url| async move {
        (url.as_str(), dereference_type(client, url).await)
    });
    let mut types = Vec::new();
    for (url, outcome) in join_all(fetches).await {
        match outcome {
            Ok(device_type) => types.push(device_type),
            Err(err) => tracing::warn!(url, error = %err, "failed to dereference device type"),
        }
    }
    Ok(types)
}

async fn dereference_type(client: &MetasysClient, url: &str) -> Result<DeviceType> {
    let url = Url::parse(url)?;
    let response = client.get_absolute(url).await?;
    let text = response.text().await.map_err(MetasysError::from_reqwest)?;
    let value: Value = serde_json::from_str(&text)?;

    // Some versions wrap the payload in "item".
    let payload = value.get("item").unwrap_or(&value);
    Ok(serde_json::from_value(payload.clone())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_deserializes_with_sparse_fields() {
        let value = serde_json::json!({
            "id": "11111111-2222-3333-4444-555555555555",
            "name": "NAE-01",
            "type": "networkDeviceTypeEnumSet.naeClass",
        });
        let device: NetworkDevice = serde_json::from_value(value).unwrap();
        assert_eq!(device.name.as_deref(), Some("NAE-01"));
        assert_eq!(
            device.device_type.as_deref(),
            Some("networkDeviceTypeEnumSet.naeClass")
        );
        assert!(device.firmware_version.is_none());
    }

    #[test]
    fn test_query_serializes_type_filter_only_when_set() {
        let query = NetworkDeviceQuery::default();
        let encoded = serde_json::to_value(&query).unwrap();
        assert_eq!(encoded, serde_json::json!({}));

        let query = NetworkDeviceQuery {
            device_type: Some("5".to_string()),
        };
        let encoded = serde_json::to_value(&query).unwrap();
        assert_eq!(encoded, serde_json::json!({ "type": "5" }));
    }
}
