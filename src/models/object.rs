//! Object summaries, identifier lookup and recursive tree traversal.

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::client::MetasysClient;
use crate::error::{MetasysError, Result};
use crate::pagination::Page;
use crate::traits::List;

/// A flattened projection of a remote Metasys object.
///
/// Returned by the child-object listing endpoints. `children` is only
/// populated by [`get_objects`] when the caller asked for more than one
/// level; `None` means the children were not fetched (or could not be).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetasysObject {
    /// The object identifier.
    pub id: Uuid,

    /// Fully-qualified item reference (e.g. `site:device/item`).
    #[serde(default)]
    pub item_reference: Option<String>,

    /// Display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Object type, as reported by the server.
    #[serde(rename = "type", alias = "objectType", default)]
    pub object_type: Option<String>,

    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,

    /// Child objects, fetched by [`get_objects`] when `levels > 1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<MetasysObject>>,
}

/// Query for listing the children of a parent object.
#[derive(Debug, Clone, Default)]
pub struct ObjectChildrenQuery {
    /// The parent object id. `None` is invalid for requests and only exists
    /// to satisfy `Default`; use [`ObjectChildrenQuery::of`].
    pub parent: Option<Uuid>,
}

impl ObjectChildrenQuery {
    /// Children of the given parent.
    #[must_use]
    pub fn of(parent: Uuid) -> Self {
        Self {
            parent: Some(parent),
        }
    }
}

#[async_trait]
impl List for MetasysObject {
    type Query = ObjectChildrenQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &MetasysClient,
        query: &Self::Query,
        page: u32,
    ) -> Result<Page<Self>> {
        let parent = query.parent.ok_or_else(|| {
            MetasysError::ConfigMissing("object listing requires a parent id".to_string())
        })?;

        let path = format!("objects/{parent}/objects");
        let response = client
            .get_with_query(&path, &[("page", page.to_string())])
            .await?;
        let text = response.text().await.map_err(MetasysError::from_reqwest)?;
        let value: Value = serde_json::from_str(&text)?;

        Ok(Page::from_value(&value, page))
    }
}

/// Look up the identifier of an object by its fully-qualified reference.
///
/// Sends `GET /objectIdentifiers?fqr={reference}`. A 404 means the
/// reference names nothing and yields `Ok(None)` rather than an error.
///
/// # Errors
///
/// Returns [`MetasysError::IdentifierFormat`] if the server's answer is not
/// a valid identifier, or the usual transport errors.
#[tracing::instrument(skip(client))]
pub async fn get_object_identifier(
    client: &MetasysClient,
    reference: &str,
) -> Result<Option<Uuid>> {
    let response = match client
        .get_with_query("objectIdentifiers", &[("fqr", reference)])
        .await
    {
        Ok(response) => response,
        Err(err) if err.is_not_found() => return Ok(None),
        Err(err) => return Err(err),
    };

    let text = response.text().await.map_err(MetasysError::from_reqwest)?;
    // The body is a bare JSON string; tolerate an unquoted plain string too.
    let raw = match serde_json::from_str::<Value>(&text) {
        Ok(Value::String(s)) => s,
        _ => text.trim().trim_matches('"').to_string(),
    };

    let id = Uuid::parse_str(&raw).map_err(|source| MetasysError::IdentifierFormat {
        value: raw,
        source,
    })?;
    Ok(Some(id))
}

/// Fetch the child objects of `parent`, recursively expanding `levels`
/// levels of the tree.
///
/// `levels == 1` fetches only the direct children; with `levels > 1` each
/// child's own children are fetched and attached, one fewer level at each
/// step. A failed child fetch degrades that item to childless (logged)
/// without aborting its siblings.
///
/// `levels < 1` is a degenerate probe and returns `Ok(None)`, distinct from
/// an empty listing.
#[tracing::instrument(skip(client))]
pub async fn get_objects(
    client: &MetasysClient,
    parent: Uuid,
    levels: u32,
) -> Result<Option<Vec<MetasysObject>>> {
    if levels < 1 {
        return Ok(None);
    }
    fetch_level(client, parent, levels).await.map(Some)
}

fn fetch_level(
    client: &MetasysClient,
    parent: Uuid,
    levels: u32,
) -> BoxFuture<'_, Result<Vec<MetasysObject>>> {
    Box::pin(async move {
        let mut items =
            MetasysObject::list_all(client, &ObjectChildrenQuery::of(parent)).await?;

        if levels > 1 {
            for item in &mut items {
                match fetch_level(client, item.id, levels - 1).await {
                    Ok(children) => item.children = Some(children),
                    Err(err) => {
                        tracing::warn!(
                            id = %item.id,
                            error = %err,
                            "failed to fetch children, leaving item childless"
                        );
                        item.children = None;
                    }
                }
            }
        }

        Ok(items)
    })
}
