//! Workflows behind each subcommand
//!
//! Every workflow receives a [`Session`] holding the resolved credentials and
//! an authenticated client. Tenant-scoped work derives its own client with
//! [`ApiClient::with_token`].

pub mod credentials;
pub mod object_group;
pub mod onboard;
pub mod tenant;
pub mod upgrade;

use anyhow::{bail, Result};
use std::time::Duration;

use crate::config::Credentials;
use crate::http::ApiClient;
use crate::models::Device;
use crate::prompt;
use crate::services::InventoryApiService;
use crate::transaction::PollSettings;

/// Query selecting online cdFMC-managed FTDs
pub const ONLINE_FTD_QUERY: &str = "deviceType:CDFMC_MANAGED_FTD AND connectivityState:ONLINE";
/// Query selecting online ASAs
pub const ONLINE_ASA_QUERY: &str = "deviceType:ASA AND connectivityState:ONLINE";

/// Everything a workflow needs to talk to the API
pub struct Session {
    pub credentials: Credentials,
    pub client: ApiClient,
    pub poll: PollSettings,
}

impl Session {
    pub fn new(credentials: Credentials, http_timeout: Duration, poll: PollSettings) -> Result<Self> {
        let client = ApiClient::new(&credentials.base_url, &credentials.api_token, http_timeout)?;
        Ok(Self {
            credentials,
            client,
            poll,
        })
    }

    pub fn inventory(&self) -> InventoryApiService<'_> {
        InventoryApiService::new(&self.client, self.poll.clone())
    }
}

/// Lets the operator pick one device among those matching `query`
pub async fn select_device(inventory: &InventoryApiService<'_>, query: &str) -> Result<Device> {
    let mut devices = inventory.get_devices(Some(query)).await?;
    if devices.is_empty() {
        bail!("No devices match {}", query);
    }

    let labels: Vec<String> = devices.iter().map(Device::display_label).collect();
    let index = prompt::select("Select a device", &labels)?;
    Ok(devices.swap_remove(index))
}
