//! CLI command execution on managed devices

use anyhow::{bail, Context, Result};

use crate::http::ApiClient;
use crate::models::{CdoTransaction, CliCommandInput, CliResult};
use crate::progress::with_spinner;
use crate::transaction::{PollSettings, TransactionPoller};

pub struct CliApiService<'a> {
    client: &'a ApiClient,
    transactions: TransactionPoller<'a>,
}

impl<'a> CliApiService<'a> {
    pub fn new(client: &'a ApiClient, poll: PollSettings) -> Self {
        Self {
            client,
            transactions: TransactionPoller::new(client, poll),
        }
    }

    /// Runs `command` on the devices and returns the device output
    ///
    /// An error message in the CLI result fails the call.
    pub async fn execute_command_and_get_result(
        &self,
        device_uids: &[String],
        command: &str,
    ) -> Result<String> {
        let message = format!(
            "Executing command {} on devices {}...",
            command.lines().next().unwrap_or_default(),
            device_uids.join(", ")
        );
        with_spinner(message, async {
            let transaction: CdoTransaction = self
                .client
                .post_json(
                    "/v1/inventory/devices/cli/execute",
                    &CliCommandInput {
                        device_uids: device_uids.to_vec(),
                        script: command.to_string(),
                    },
                )
                .await
                .context("submitting CLI command")?;
            let finished = self
                .transactions
                .wait_for_transaction_to_finish(&transaction.transaction_uid)
                .await?;

            let cli_result: CliResult = self
                .client
                .get_json(
                    &format!("/v1/inventory/devices/cli/{}", finished.require_entity_uid()?),
                    &[],
                )
                .await
                .context("fetching CLI result")?;

            if let Some(error) = cli_result.error_msg.filter(|msg| !msg.is_empty()) {
                bail!("{}", error);
            }
            Ok(cli_result.result.unwrap_or_default())
        })
        .await
    }
}
