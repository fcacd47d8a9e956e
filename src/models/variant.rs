//! Attribute values and property read/write operations.

use std::collections::HashMap;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::client::MetasysClient;
use crate::error::{MetasysError, Result};

/// Culture tag applied when the caller does not configure one.
pub const DEFAULT_CULTURE: &str = "en-US";

/// A single attribute value read from a Metasys object.
///
/// Created only as the result of a successful read; never mutated after
/// creation. The raw server value is kept as-is, with typed accessors for
/// the common scalar shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    /// The object the attribute belongs to.
    pub id: Uuid,
    /// The attribute name.
    pub attribute: String,
    /// The raw value subtree from the response.
    pub value: Value,
    /// Culture used to render enumerated/status values as text.
    pub culture: String,
}

impl Variant {
    /// Create a variant with the default culture.
    #[must_use]
    pub fn new(id: Uuid, attribute: impl Into<String>, value: Value) -> Self {
        Self {
            id,
            attribute: attribute.into(),
            value,
            culture: DEFAULT_CULTURE.to_string(),
        }
    }

    /// Some attributes arrive wrapped as `{"value": ..., ...}`; unwrap to
    /// the scalar when that is the case.
    fn scalar(&self) -> &Value {
        self.value.get("value").unwrap_or(&self.value)
    }

    /// The value as a string, if it is one.
    pub fn string_value(&self) -> Option<&str> {
        self.scalar().as_str()
    }

    /// The value as a number, if it is one.
    pub fn numeric_value(&self) -> Option<f64> {
        self.scalar().as_f64()
    }

    /// The value as a boolean, if it is one.
    pub fn bool_value(&self) -> Option<bool> {
        self.scalar().as_bool()
    }
}

/// The attribute values read from one object by a multi-attribute read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantMultiple {
    /// The object all variants belong to.
    pub id: Uuid,
    /// One variant per successfully-read attribute, in request order.
    pub variants: Vec<Variant>,
}

/// Read a single attribute of a single object.
///
/// Sends `GET /objects/{id}/attributes/{attribute}` and extracts the value
/// at `.item.{attribute}`. HTTP 404 (unknown object or attribute) is not an
/// error; it yields `Ok(None)`.
///
/// # Errors
///
/// Returns [`MetasysError::PropertyAccess`] when a 2xx response is missing
/// the expected nested field, or the usual transport errors.
#[tracing::instrument(skip(client))]
pub async fn read_property(
    client: &MetasysClient,
    id: Uuid,
    attribute: &str,
) -> Result<Option<Variant>> {
    let path = format!("objects/{id}/attributes/{}", urlencoding::encode(attribute));
    let response = match client.get(&path).await {
        Ok(response) => response,
        Err(err) if err.is_not_found() => return Ok(None),
        Err(err) => return Err(err),
    };

    let text = response.text().await.map_err(MetasysError::from_reqwest)?;
    let body: Value = serde_json::from_str(&text)?;
    let value = body
        .get("item")
        .and_then(|item| item.get(attribute))
        .cloned()
        .ok_or_else(|| MetasysError::PropertyAccess {
            id,
            attribute: attribute.to_string(),
        })?;

    Ok(Some(Variant::new(id, attribute, value)))
}

/// Read several attributes from several objects.
///
/// Issues one independent request per (object, attribute) pair, all in
/// flight concurrently, and joins on the whole fan-out. Individual failures
/// are logged and simply produce no entry for that pair; siblings are never
/// cancelled.
///
/// An object contributes a group to the result if at least one of its
/// attribute reads succeeded, or if `attributes` is empty (the degenerate
/// "object exists" probe, which yields a group with zero variants).
/// Otherwise the object is omitted entirely.
#[tracing::instrument(skip(client))]
pub async fn read_property_multiple(
    client: &MetasysClient,
    ids: &[Uuid],
    attributes: &[&str],
) -> Result<Vec<VariantMultiple>> {
    let reads = ids.iter().flat_map(|id| {
        attributes
            .iter()
            .map(move |attribute| async move {
                (*id, *attribute, read_property(client, *id, attribute).await)
            })
    });
    let outcomes = join_all(reads).await;

    let mut grouped: HashMap<Uuid, Vec<Variant>> = HashMap::new();
    for (id, attribute, outcome) in outcomes {
        match outcome {
            Ok(Some(variant)) => grouped.entry(id).or_default().push(variant),
            Ok(None) => {
                tracing::debug!(%id, attribute, "attribute not found, omitted from result");
            }
            Err(err) => {
                tracing::warn!(%id, attribute, error = %err, "read failed, omitted from result");
            }
        }
    }

    let mut results = Vec::new();
    for id in ids {
        let variants = grouped.remove(id).unwrap_or_default();
        if !variants.is_empty() || attributes.is_empty() {
            results.push(VariantMultiple { id: *id, variants });
        }
    }
    Ok(results)
}

/// Write a single attribute of a single object.
///
/// Sends `PATCH /objects/{id}` with body
/// `{"item": {attribute: value, "priority"?: priority}}`. Unlike reads,
/// request failures propagate to the caller.
#[tracing::instrument(skip(client, value))]
pub async fn write_property(
    client: &MetasysClient,
    id: Uuid,
    attribute: &str,
    value: Value,
    priority: Option<&str>,
) -> Result<()> {
    let mut item = serde_json::Map::new();
    item.insert(attribute.to_string(), value);
    if let Some(priority) = priority {
        item.insert("priority".to_string(), Value::String(priority.to_string()));
    }
    let body = serde_json::json!({ "item": item });

    client.patch(&format!("objects/{id}"), &body).await?;
    Ok(())
}

/// Write one shared set of attribute values to several objects.
///
/// Issues one PATCH per object carrying all attribute/value pairs, all in
/// flight concurrently. Individual failures are logged and swallowed; the
/// remaining writes are still attempted to completion.
#[tracing::instrument(skip(client, attributes))]
pub async fn write_property_multiple(
    client: &MetasysClient,
    ids: &[Uuid],
    attributes: &[(&str, Value)],
    priority: Option<&str>,
) -> Result<()> {
    let mut item = serde_json::Map::new();
    for (attribute, value) in attributes {
        item.insert((*attribute).to_string(), value.clone());
    }
    if let Some(priority) = priority {
        item.insert("priority".to_string(), Value::String(priority.to_string()));
    }
    let body = serde_json::json!({ "item": item });

    let writes = ids.iter().map(|id| {
        let body = &body;
        async move { (*id, client.patch(&format!("objects/{id}"), body).await) }
    });
    for (id, outcome) in join_all(writes).await {
        if let Err(err) = outcome {
            tracing::warn!(%id, error = %err, "write failed for object");
        }
    }
    Ok(())
}
