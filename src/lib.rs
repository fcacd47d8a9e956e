//! Metasys API client library.
//!
//! A Rust library for interacting with the Metasys building-automation
//! REST API: session login and proactive token refresh, object identifier
//! lookup, attribute reads and writes, command dispatch, and paginated
//! device/object enumeration with recursive tree traversal.
//!
//! # Quick Start
//!
//! ```no_run
//! use metasys::{read_property, get_network_devices, MetasysClient};
//!
//! #[tokio::main]
//! async fn main() -> metasys::Result<()> {
//!     // Create client from environment variables
//!     let client = MetasysClient::from_env()?;
//!
//!     // Log in; `true` keeps the token fresh in the background
//!     client.login("api-user", "secret", true).await?;
//!
//!     // Enumerate supervisory devices
//!     let devices = get_network_devices(&client, None).await?;
//!     println!("Found {} devices", devices.len());
//!
//!     // Read an attribute
//!     if let Some(id) = metasys::get_object_identifier(&client, "site:NAE-01/AHU-1").await? {
//!         if let Some(value) = read_property(&client, id, "presentValue").await? {
//!             println!("presentValue = {:?}", value.numeric_value());
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! [`MetasysClient`] is a thin HTTP layer that owns the base URL and the
//! session (bearer token plus refresh timer). Operations are free functions
//! taking a client reference; entity types behind paginated endpoints also
//! implement the [`List`] trait. The [`blocking`] module mirrors the whole
//! surface for synchronous callers.
//!
//! Multi-item operations fan out one request per item and aggregate
//! best-effort: individual failures are logged and omitted from the result
//! rather than failing the whole call.
//!
//! # Configuration
//!
//! [`MetasysClient::from_env`] reads:
//!
//! - `METASYS_HOST` (required) - Metasys server hostname
//! - `METASYS_API_VERSION` (optional) - API version segment (default `v4`)

pub mod blocking;
mod client;
mod error;
mod models;
mod pagination;
mod session;
mod traits;

// Re-export core types
pub use client::{MetasysClient, MetasysClientBuilder, DEFAULT_API_VERSION};
pub use error::{MetasysError, Result};
pub use pagination::Page;

// Re-export traits
pub use traits::List;

// Re-export models
pub use models::{
    AccessToken,
    Command,
    DeviceType,
    MetasysObject,
    NetworkDevice,
    NetworkDeviceQuery,
    ObjectChildrenQuery,
    Variant,
    VariantMultiple,
    DEFAULT_CULTURE,
    MAX_REFRESH_DELAY_DAYS,
    REFRESH_LEAD_SECS,
};

// Re-export operations
pub use models::{
    get_available_device_types, get_commands, get_network_devices, get_object_identifier,
    get_objects, read_property, read_property_multiple, send_command, write_property,
    write_property_multiple,
};
