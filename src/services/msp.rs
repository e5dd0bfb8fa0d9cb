//! MSP portal: managed tenants, their users and cdFMC provisioning

use anyhow::{anyhow, bail, Context, Result};
use tracing::info;

use crate::http::ApiClient;
use crate::models::{
    ApiTokenInfo, CdoTransaction, MspAddUsersToTenantInput, MspCreateTenantInput,
    MspManagedTenant, UserInput, UserPage,
};
use crate::progress::with_spinner;
use crate::transaction::{PollSettings, TransactionPoller};

/// Detail key linking an MSP transaction to the transaction it spawned in the tenant
pub const TARGET_TENANT_TRANSACTION_KEY: &str = "TRANSACTION_UID_IN_TARGET_TENANT";

pub struct MspApiService<'a> {
    client: &'a ApiClient,
    poll: PollSettings,
    transactions: TransactionPoller<'a>,
}

impl<'a> MspApiService<'a> {
    pub fn new(client: &'a ApiClient, poll: PollSettings) -> Self {
        Self {
            client,
            transactions: TransactionPoller::new(client, poll.clone()),
            poll,
        }
    }

    pub async fn get_managed_tenant(&self, tenant_uid: &str) -> Result<MspManagedTenant> {
        self.client
            .get_json(&format!("/v1/msp/tenants/{}", tenant_uid), &[])
            .await
            .with_context(|| format!("fetching MSP-managed tenant {}", tenant_uid))
    }

    pub async fn create_tenant(&self, tenant_name: &str, display_name: &str) -> Result<MspManagedTenant> {
        with_spinner("Creating tenant...", async {
            let transaction: CdoTransaction = self
                .client
                .post_json(
                    "/v1/msp/tenants/create",
                    &MspCreateTenantInput {
                        tenant_name: tenant_name.to_string(),
                        display_name: display_name.to_string(),
                    },
                )
                .await
                .with_context(|| format!("creating tenant {}", tenant_name))?;
            let finished = self
                .transactions
                .wait_for_transaction_to_finish(&transaction.transaction_uid)
                .await?;
            self.get_managed_tenant(finished.require_entity_uid()?).await
        })
        .await
    }

    /// Provisions a cloud-delivered FMC on the tenant
    ///
    /// The MSP transaction finishes once provisioning has been handed to the
    /// tenant. With `wait_for_active`, the spawned transaction inside the
    /// tenant is awaited too, which requires a token valid in that tenant.
    pub async fn provision_cdfmc(
        &self,
        tenant: &MspManagedTenant,
        tenant_api_token: Option<&str>,
        wait_for_active: bool,
    ) -> Result<()> {
        with_spinner("Provisioning cdFMC...", async {
            let transaction: CdoTransaction = self
                .client
                .post_empty(&format!("/v1/msp/tenants/{}/cdfmc", tenant.uid))
                .await
                .with_context(|| format!("provisioning cdFMC on {}", tenant.label()))?;
            let finished = self
                .transactions
                .wait_for_transaction_to_finish(&transaction.transaction_uid)
                .await?;

            if !wait_for_active {
                return Ok(());
            }

            let token = tenant_api_token
                .ok_or_else(|| anyhow!("a tenant API token is required to wait for cdFMC"))?;
            let refreshed = self
                .transactions
                .get_transaction(&finished.transaction_uid)
                .await?;
            let target_uid = refreshed.detail(TARGET_TENANT_TRANSACTION_KEY).ok_or_else(|| {
                anyhow!(
                    "Transaction {} does not reference a transaction in the tenant",
                    finished.transaction_uid
                )
            })?;

            let tenant_client = self.client.with_token(token);
            TransactionPoller::new(&tenant_client, self.poll.clone())
                .wait_for_transaction_to_finish(target_uid)
                .await?;
            info!("cdFMC on {} is active", tenant.label());
            Ok(())
        })
        .await
    }

    /// Generates an API token for a named user of the tenant
    pub async fn generate_managed_tenant_api_token(
        &self,
        tenant: &MspManagedTenant,
        username: &str,
    ) -> Result<String> {
        let query = [
            ("limit", "1".to_string()),
            ("offset", "0".to_string()),
            ("q", format!("name:{}", username)),
        ];
        let users: UserPage = self
            .client
            .get_json(&format!("/v1/msp/tenants/{}/users", tenant.uid), &query)
            .await
            .with_context(|| format!("looking up user {}", username))?;

        if users.items.len() != 1 {
            bail!("User {} not found in tenant {}", username, tenant.label());
        }
        let user_uid = &users.items[0].uid;

        let token: ApiTokenInfo = self
            .client
            .post_empty(&format!(
                "/v1/msp/tenants/{}/users/{}/token",
                tenant.uid, user_uid
            ))
            .await
            .with_context(|| format!("generating API token for {}", username))?;
        Ok(token.api_token)
    }

    pub async fn create_users(&self, users: &[UserInput], tenant: &MspManagedTenant) -> Result<()> {
        let message = format!("Creating {} users in tenant {}...", users.len(), tenant.label());
        with_spinner(message, async {
            let transaction: CdoTransaction = self
                .client
                .post_json(
                    &format!("/v1/msp/tenants/{}/users", tenant.uid),
                    &MspAddUsersToTenantInput {
                        users: users.to_vec(),
                    },
                )
                .await
                .context("adding users to tenant")?;
            self.transactions
                .wait_for_transaction_to_finish(&transaction.transaction_uid)
                .await?;
            Ok(())
        })
        .await
    }
}
