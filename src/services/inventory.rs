//! Device inventory: listing devices and onboarding FTDs

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::http::ApiClient;
use crate::models::{
    CdoTransaction, Device, DevicePage, FtdCreateOrUpdateInput, FtdRegistrationInput,
    ZtpOnboardingInput,
};
use crate::progress::with_spinner;
use crate::transaction::{PollSettings, TransactionPoller};

/// Devices fetched per page when listing the inventory
pub const PAGE_SIZE: usize = 200;

pub struct InventoryApiService<'a> {
    client: &'a ApiClient,
    transactions: TransactionPoller<'a>,
}

impl<'a> InventoryApiService<'a> {
    pub fn new(client: &'a ApiClient, poll: PollSettings) -> Self {
        Self {
            client,
            transactions: TransactionPoller::new(client, poll),
        }
    }

    /// Lists every device matching the query, following pagination
    pub async fn get_devices(&self, q: Option<&str>) -> Result<Vec<Device>> {
        let mut devices = Vec::new();
        let mut offset = 0;

        loop {
            let mut query = vec![("limit", PAGE_SIZE.to_string()), ("offset", offset.to_string())];
            if let Some(q) = q {
                query.push(("q", q.to_string()));
            }

            let page: DevicePage = self
                .client
                .get_json("/v1/inventory/devices", &query)
                .await
                .context("listing devices")?;
            debug!(
                "Fetched {} devices at offset {} of {}",
                page.items.len(),
                offset,
                page.count
            );

            let fetched = page.items.len();
            devices.extend(page.items);
            offset += PAGE_SIZE;

            if fetched == 0 || devices.len() >= page.count {
                break;
            }
        }

        Ok(devices)
    }

    pub async fn get_device(&self, device_uid: &str) -> Result<Device> {
        self.client
            .get_json(&format!("/v1/inventory/devices/{}", device_uid), &[])
            .await
            .with_context(|| format!("fetching device {}", device_uid))
    }

    /// Looks a device up by exact name; exactly one match is required
    pub async fn get_device_by_name(&self, name: &str) -> Result<Device> {
        let mut devices = self.get_devices(Some(&format!("name:{}", name))).await?;
        if devices.len() != 1 {
            bail!("Could not find device with name {}", name);
        }
        Ok(devices.remove(0))
    }

    /// Creates the FTD record and returns it with its configure-manager CLI key
    pub async fn create_ftd_device(&self, input: &FtdCreateOrUpdateInput) -> Result<Device> {
        let message = format!(
            "Generating configure manager CLI commands for FTD {}...",
            input.name
        );
        with_spinner(message, async {
            let transaction: CdoTransaction = self
                .client
                .post_json("/v1/inventory/devices/ftds", input)
                .await
                .with_context(|| format!("creating FTD {}", input.name))?;
            self.device_after_transaction(&transaction).await
        })
        .await
    }

    /// Completes onboarding once the CLI key has been applied on the device
    pub async fn register_ftd_device(&self, device: &Device) -> Result<Device> {
        let message = format!(
            "Registering FTD {} with Security Cloud Control...",
            device.name
        );
        with_spinner(message, async {
            let transaction: CdoTransaction = self
                .client
                .post_json(
                    "/v1/inventory/devices/ftds/register",
                    &FtdRegistrationInput {
                        ftd_uid: device.uid.clone(),
                    },
                )
                .await
                .with_context(|| format!("registering FTD {}", device.name))?;
            self.device_after_transaction(&transaction).await
        })
        .await
    }

    /// Onboards an FTD by serial number and returns the created device
    pub async fn onboard_ftd_ztp_device(&self, input: &ZtpOnboardingInput) -> Result<Device> {
        with_spinner(format!("Onboarding FTD {}...", input.name), async {
            let transaction: CdoTransaction = self
                .client
                .post_json("/v1/inventory/devices/ftds/ztp", input)
                .await
                .with_context(|| format!("onboarding FTD {} with ZTP", input.name))?;
            self.transactions
                .wait_for_transaction_to_finish(&transaction.transaction_uid)
                .await?;
            // the ZTP transaction does not reference the new device
            self.get_device_by_name(&input.name).await
        })
        .await
    }

    async fn device_after_transaction(&self, transaction: &CdoTransaction) -> Result<Device> {
        let finished = self
            .transactions
            .wait_for_transaction_to_finish(&transaction.transaction_uid)
            .await?;
        let device = self.get_device(finished.require_entity_uid()?).await?;
        info!("Device {} ({}) is ready", device.name, device.uid);
        Ok(device)
    }
}
