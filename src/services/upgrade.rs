//! Device software upgrades for FTD and ASA

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::http::ApiClient;
use crate::models::{
    AsaCompatibleVersion, AsaCompatibleVersionsResponse, CdoTransaction, FtdVersion,
    FtdVersionsPage, UpgradeAsaDeviceInput, UpgradeFtdDeviceInput,
};
use crate::progress::with_spinner;
use crate::transaction::{PollSettings, TransactionPoller};

pub struct DeviceUpgradeApiService<'a> {
    client: &'a ApiClient,
    transactions: TransactionPoller<'a>,
}

impl<'a> DeviceUpgradeApiService<'a> {
    pub fn new(client: &'a ApiClient, poll: PollSettings) -> Self {
        Self {
            client,
            transactions: TransactionPoller::new(client, poll),
        }
    }

    pub async fn get_compatible_ftd_versions(&self, ftd_uid: &str) -> Result<Vec<FtdVersion>> {
        let page: FtdVersionsPage = self
            .client
            .get_json(
                &format!("/v1/inventory/devices/ftds/{}/upgrades/versions", ftd_uid),
                &[],
            )
            .await
            .with_context(|| format!("listing compatible versions for FTD {}", ftd_uid))?;
        Ok(page.items)
    }

    pub async fn upgrade_ftd(&self, ftd_uid: &str, upgrade_package_uid: &str, label: &str) -> Result<()> {
        with_spinner(format!("Upgrading FTD {} to {}...", ftd_uid, label), async {
            let transaction: CdoTransaction = self
                .client
                .post_json(
                    &format!("/v1/inventory/devices/ftds/{}/upgrades/trigger", ftd_uid),
                    &UpgradeFtdDeviceInput {
                        upgrade_package_uid: upgrade_package_uid.to_string(),
                    },
                )
                .await
                .with_context(|| format!("triggering upgrade of FTD {}", ftd_uid))?;
            self.transactions
                .wait_for_transaction_to_finish(&transaction.transaction_uid)
                .await?;
            info!("FTD {} upgraded to {}", ftd_uid, label);
            Ok(())
        })
        .await
    }

    pub async fn get_compatible_asa_versions(&self, asa_uid: &str) -> Result<Vec<AsaCompatibleVersion>> {
        let response: AsaCompatibleVersionsResponse = self
            .client
            .get_json(
                &format!("/v1/inventory/devices/asas/{}/upgrades/versions", asa_uid),
                &[],
            )
            .await
            .with_context(|| format!("listing compatible versions for ASA {}", asa_uid))?;
        Ok(response.items)
    }

    pub async fn upgrade_asa(&self, asa_uid: &str, input: &UpgradeAsaDeviceInput) -> Result<()> {
        if input.is_empty() {
            bail!("Select a software version, an ASDM version or both to upgrade ASA {}", asa_uid);
        }

        let message = format!("Upgrading ASA {} to {}...", asa_uid, input.describe());
        with_spinner(message, async {
            let transaction: CdoTransaction = self
                .client
                .post_json(
                    &format!("/v1/inventory/devices/asas/{}/upgrades/trigger", asa_uid),
                    input,
                )
                .await
                .with_context(|| format!("triggering upgrade of ASA {}", asa_uid))?;
            self.transactions
                .wait_for_transaction_to_finish(&transaction.transaction_uid)
                .await?;
            info!("ASA {} upgraded to {}", asa_uid, input.describe());
            Ok(())
        })
        .await
    }
}
