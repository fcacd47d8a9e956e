//! List trait for fetching paginated collections of entities.

use async_trait::async_trait;

use crate::client::MetasysClient;
use crate::error::Result;
use crate::pagination::Page;

/// Maximum pages to fetch (safety limit).
const MAX_PAGES: u32 = 1000;

/// List entities from a paginated endpoint.
///
/// Implement this trait for entity types whose endpoint returns
/// `items`/`next` pages. The default [`list_all`](List::list_all) walks the
/// continuation pointer starting at page 1.
///
/// # Example
///
/// ```ignore
/// use metasys::{MetasysClient, NetworkDevice, List};
///
/// let client = MetasysClient::from_env()?;
///
/// // Fetch a single page
/// let page = NetworkDevice::list_page(&client, &Default::default(), 1).await?;
///
/// // Fetch all pages
/// let all_devices = NetworkDevice::list_all(&client, &Default::default()).await?;
/// ```
#[async_trait]
pub trait List: Sized + Send {
    /// Query parameters for filtering.
    type Query: Default + Send + Sync;

    /// List entities matching the query (single page).
    ///
    /// # Arguments
    ///
    /// * `client` - The Metasys API client
    /// * `query` - Query parameters for filtering
    /// * `page` - Page number (1-indexed)
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails. A structurally malformed page
    /// body is not an error; it decodes to an empty final page.
    async fn list_page(
        client: &MetasysClient,
        query: &Self::Query,
        page: u32,
    ) -> Result<Page<Self>>;

    /// List all entities matching the query (fetches all pages).
    ///
    /// Pages are requested strictly in order; page N+1 is only fetched
    /// after page N reported a non-null `next` pointer.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails at the transport level.
    async fn list_all(client: &MetasysClient, query: &Self::Query) -> Result<Vec<Self>> {
        let mut all_items = Vec::new();
        let mut page = 1;

        loop {
            let result = Self::list_page(client, query, page).await?;
            let has_more = result.has_more();
            all_items.extend(result.items);

            if !has_more {
                break;
            }
            page += 1;

            // Safety limit to prevent infinite loops
            if page > MAX_PAGES {
                tracing::warn!("reached pagination limit of {} pages, stopping", MAX_PAGES);
                break;
            }
        }

        Ok(all_items)
    }
}
