//! `onboard-ftds`: onboard FTDs to an MSP-managed tenant
//!
//! Runs with an MSP super-admin token. A token for the tenant's API-only user
//! is generated on the way, and all onboarding happens inside the tenant with
//! that token. ZTP devices go first, then devices using the CLI key.

use anyhow::{anyhow, Result};
use tracing::info;

use crate::cli::OnboardFtdsArgs;
use crate::commands::Session;
use crate::models::{Device, FtdCreateOrUpdateInput};
use crate::parsers::{FtdParser, FtdZtpParser};
use crate::prompt;
use crate::services::{InventoryApiService, MspApiService};
use crate::validation::{validate_ftd_csv, validate_uuid, validate_ztp_csv};

const RULER: &str = "==========";

pub async fn run(session: &Session, args: &OnboardFtdsArgs) -> Result<()> {
    if let Some(path) = &args.ftd_csv_file {
        validate_ftd_csv(path)?;
    }
    if let Some(path) = &args.ftd_ztp_csv_file {
        validate_ztp_csv(path)?;
    }

    let tenant_uid = uid_or_prompt(
        args.tenant_uid.as_deref(),
        "Enter the UID of the MSP-managed tenant",
    )?;
    let fmc_access_policy_uid = uid_or_prompt(
        args.fmc_access_policy_uid.as_deref(),
        "Enter the access policy UID to apply to each onboarded device",
    )?;

    let ztp_inputs = FtdZtpParser::new(&fmc_access_policy_uid)
        .get_ztp_onboarding_inputs(args.ftd_ztp_csv_file.as_deref())?;
    let ftd_inputs = FtdParser::new(&fmc_access_policy_uid)
        .get_ftds_to_onboard(args.ftd_csv_file.as_deref())?;
    if ztp_inputs.is_empty() && ftd_inputs.is_empty() {
        println!("No FTDs to onboard");
        return Ok(());
    }

    let msp = MspApiService::new(&session.client, session.poll.clone());
    let tenant = msp.get_managed_tenant(&tenant_uid).await?;
    let username = args
        .username
        .clone()
        .unwrap_or_else(|| tenant.default_api_user_name());
    let tenant_token = msp
        .generate_managed_tenant_api_token(&tenant, &username)
        .await?;
    println!("Generated API token for {} (UID: {})", tenant.name, tenant.uid);

    let tenant_client = session.client.with_token(&tenant_token);
    let inventory = InventoryApiService::new(&tenant_client, session.poll.clone());

    for input in &ztp_inputs {
        let device = inventory.onboard_ftd_ztp_device(input).await?;
        println!("Onboarded FTD {} (UID: {})", device.name, device.uid);
    }
    for input in &ftd_inputs {
        let device = onboard_with_cli_key(&inventory, input).await?;
        println!("Onboarded FTD {} (UID: {})", device.name, device.uid);
    }

    info!(
        "Onboarded {} FTDs to {}",
        ztp_inputs.len() + ftd_inputs.len(),
        tenant.label()
    );
    Ok(())
}

fn uid_or_prompt(given: Option<&str>, message: &str) -> Result<String> {
    match given {
        Some(uid) => Ok(uid.to_string()),
        None => prompt::text_validated(message, None, validate_uuid),
    }
}

/// Creates the FTD, has the operator apply its CLI key, then registers it
async fn onboard_with_cli_key(
    inventory: &InventoryApiService<'_>,
    input: &FtdCreateOrUpdateInput,
) -> Result<Device> {
    let device = inventory.create_ftd_device(input).await?;
    let cli_key = device
        .cd_fmc_info
        .as_ref()
        .and_then(|info| info.cli_key.as_deref())
        .ok_or_else(|| anyhow!("FTD {} was created without a CLI key", device.name))?;

    println!(
        "Paste the following CLI key into the FTD terminal:\n{}\n{}\n{}",
        RULER, cli_key, RULER
    );
    while !prompt::confirm("Have you pasted the CLI key into the FTD terminal?", false)? {}

    inventory.register_ftd_device(&device).await
}
