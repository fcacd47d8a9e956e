//! Blocking wrappers over the async client.
//!
//! Every method blocks the calling thread until the underlying async
//! operation completes and surfaces the same typed errors. The wrapper owns
//! a single-threaded tokio runtime; background work such as the proactive
//! token refresh only makes progress while a blocking call is running.
//!
//! Must not be used from within an async context.
//!
//! # Example
//!
//! ```no_run
//! # fn example() -> metasys::Result<()> {
//! let client = metasys::blocking::MetasysClient::new("adx.example.com")?;
//! client.login("api-user", "secret", false)?;
//!
//! let devices = client.get_network_devices(None)?;
//! println!("{} devices", devices.len());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde_json::Value;
use tokio::runtime::Runtime;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    AccessToken, Command, DeviceType, MetasysObject, NetworkDevice, Variant, VariantMultiple,
};

/// Blocking counterpart of [`MetasysClient`](crate::MetasysClient).
///
/// Cheaply cloneable; clones share the runtime and the session.
#[derive(Debug, Clone)]
pub struct MetasysClient {
    inner: crate::MetasysClient,
    runtime: Arc<Runtime>,
}

impl MetasysClient {
    /// Create a blocking client for the given host with default settings.
    pub fn new(host: &str) -> Result<Self> {
        Self::from_async(crate::MetasysClient::new(host)?)
    }

    /// Wrap an already-configured async client.
    pub fn from_async(inner: crate::MetasysClient) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            inner,
            runtime: Arc::new(runtime),
        })
    }

    /// See [`MetasysClient::login`](crate::MetasysClient::login).
    pub fn login(&self, username: &str, password: &str, auto_refresh: bool) -> Result<AccessToken> {
        self.runtime
            .block_on(self.inner.login(username, password, auto_refresh))
    }

    /// See [`MetasysClient::refresh`](crate::MetasysClient::refresh).
    pub fn refresh(&self) -> Result<AccessToken> {
        self.runtime.block_on(self.inner.refresh())
    }

    /// See [`MetasysClient::current_token`](crate::MetasysClient::current_token).
    pub fn current_token(&self) -> Option<AccessToken> {
        self.inner.current_token()
    }

    /// See [`MetasysClient::close`](crate::MetasysClient::close).
    pub fn close(&self) {
        self.inner.close();
    }

    /// See [`get_object_identifier`](crate::get_object_identifier).
    pub fn get_object_identifier(&self, reference: &str) -> Result<Option<Uuid>> {
        self.runtime
            .block_on(crate::get_object_identifier(&self.inner, reference))
    }

    /// See [`read_property`](crate::read_property).
    pub fn read_property(&self, id: Uuid, attribute: &str) -> Result<Option<Variant>> {
        self.runtime
            .block_on(crate::read_property(&self.inner, id, attribute))
    }

    /// See [`read_property_multiple`](crate::read_property_multiple).
    pub fn read_property_multiple(
        &self,
        ids: &[Uuid],
        attributes: &[&str],
    ) -> Result<Vec<VariantMultiple>> {
        self.runtime
            .block_on(crate::read_property_multiple(&self.inner, ids, attributes))
    }

    /// See [`write_property`](crate::write_property).
    pub fn write_property(
        &self,
        id: Uuid,
        attribute: &str,
        value: Value,
        priority: Option<&str>,
    ) -> Result<()> {
        self.runtime.block_on(crate::write_property(
            &self.inner,
            id,
            attribute,
            value,
            priority,
        ))
    }

    /// See [`write_property_multiple`](crate::write_property_multiple).
    pub fn write_property_multiple(
        &self,
        ids: &[Uuid],
        attributes: &[(&str, Value)],
        priority: Option<&str>,
    ) -> Result<()> {
        self.runtime.block_on(crate::write_property_multiple(
            &self.inner,
            ids,
            attributes,
            priority,
        ))
    }

    /// See [`get_commands`](crate::get_commands).
    pub fn get_commands(&self, id: Uuid) -> Result<Vec<Command>> {
        self.runtime.block_on(crate::get_commands(&self.inner, id))
    }

    /// See [`send_command`](crate::send_command).
    pub fn send_command(&self, id: Uuid, command: &str, values: &[Value]) -> Result<()> {
        self.runtime
            .block_on(crate::send_command(&self.inner, id, command, values))
    }

    /// See [`get_network_devices`](crate::get_network_devices).
    pub fn get_network_devices(&self, device_type: Option<&str>) -> Result<Vec<NetworkDevice>> {
        self.runtime
            .block_on(crate::get_network_devices(&self.inner, device_type))
    }

    /// See [`get_available_device_types`](crate::get_available_device_types).
    pub fn get_available_device_types(&self) -> Result<Vec<DeviceType>> {
        self.runtime
            .block_on(crate::get_available_device_types(&self.inner))
    }

    /// See [`get_objects`](crate::get_objects).
    pub fn get_objects(&self, parent: Uuid, levels: u32) -> Result<Option<Vec<MetasysObject>>> {
        self.runtime
            .block_on(crate::get_objects(&self.inner, parent, levels))
    }
}
