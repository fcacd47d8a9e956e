//! Object commands: listing and dispatch.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::client::MetasysClient;
use crate::error::{MetasysError, Result};

/// A command an object can execute.
///
/// The vendor's command descriptors vary by object type; besides the id and
/// title, the raw descriptor fields are kept as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    /// The command name used in dispatch paths.
    #[serde(alias = "id", default)]
    pub command_id: Option<String>,

    /// Human-readable title.
    #[serde(default)]
    pub title: Option<String>,

    /// Remaining descriptor fields (parameter schemas and the like).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// List the commands available on an object, in server order.
///
/// A response that is not a well-formed JSON array yields an empty list
/// (logged, never an error), and malformed elements are skipped.
#[tracing::instrument(skip(client))]
pub async fn get_commands(client: &MetasysClient, id: Uuid) -> Result<Vec<Command>> {
    let response = client.get(&format!("objects/{id}/commands")).await?;
    let text = response.text().await.map_err(MetasysError::from_reqwest)?;

    let value: Value = match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(%id, error = %err, "commands response is not JSON, returning none");
            return Ok(Vec::new());
        }
    };
    let Some(raw_commands) = value.as_array() else {
        tracing::warn!(%id, "commands response is not an array, returning none");
        return Ok(Vec::new());
    };

    let mut commands = Vec::with_capacity(raw_commands.len());
    for raw in raw_commands {
        match serde_json::from_value(raw.clone()) {
            Ok(command) => commands.push(command),
            Err(err) => tracing::warn!(%id, error = %err, "skipping malformed command"),
        }
    }
    Ok(commands)
}

/// Execute a command on an object.
///
/// Sends `PUT /objects/{id}/commands/{command}` with the ordered argument
/// values as the body. Failures propagate.
#[tracing::instrument(skip(client, values))]
pub async fn send_command(
    client: &MetasysClient,
    id: Uuid,
    command: &str,
    values: &[Value],
) -> Result<()> {
    let path = format!("objects/{id}/commands/{}", urlencoding::encode(command));
    client.put(&path, values).await?;
    Ok(())
}
