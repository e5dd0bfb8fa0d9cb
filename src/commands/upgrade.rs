//! `upgrade-ftd` and `upgrade-asa`

use anyhow::{bail, Result};

use crate::cli::{UpgradeAsaCommand, UpgradeFtdCommand};
use crate::commands::{select_device, Session, ONLINE_ASA_QUERY, ONLINE_FTD_QUERY};
use crate::models::{AsaCompatibleVersion, FtdVersion, UpgradeAsaDeviceInput};
use crate::output;
use crate::prompt;
use crate::services::DeviceUpgradeApiService;

pub async fn run_ftd(session: &Session, command: &UpgradeFtdCommand) -> Result<()> {
    let upgrades = DeviceUpgradeApiService::new(&session.client, session.poll.clone());

    match command {
        UpgradeFtdCommand::ListVersions { ftd_uid } => {
            let ftd_uid = device_uid_or_select(session, ftd_uid.as_deref(), ONLINE_FTD_QUERY).await?;
            let versions = upgrades.get_compatible_ftd_versions(&ftd_uid).await?;
            output::print_ftd_versions(&versions);
        }
        UpgradeFtdCommand::Upgrade {
            ftd_uid,
            upgrade_package_uid,
        } => {
            let ftd_uid = device_uid_or_select(session, ftd_uid.as_deref(), ONLINE_FTD_QUERY).await?;
            let (package_uid, label) = match upgrade_package_uid {
                Some(uid) => (uid.clone(), format!("upgrade package {}", uid)),
                None => {
                    let versions = upgrades.get_compatible_ftd_versions(&ftd_uid).await?;
                    let version = select_ftd_version(versions)?;
                    (version.upgrade_package_uid, version.software_version)
                }
            };

            upgrades.upgrade_ftd(&ftd_uid, &package_uid, &label).await?;
            println!(
                "Upgraded FTD with UID: {} to {} using upgrade package UID: {}",
                ftd_uid, label, package_uid
            );
        }
    }
    Ok(())
}

pub async fn run_asa(session: &Session, command: &UpgradeAsaCommand) -> Result<()> {
    let upgrades = DeviceUpgradeApiService::new(&session.client, session.poll.clone());

    match command {
        UpgradeAsaCommand::ListVersions { asa_uid } => {
            let asa_uid = device_uid_or_select(session, asa_uid.as_deref(), ONLINE_ASA_QUERY).await?;
            let versions = upgrades.get_compatible_asa_versions(&asa_uid).await?;
            output::print_asa_versions(&versions);
        }
        UpgradeAsaCommand::Upgrade {
            asa_uid,
            software_version,
            asdm_version,
        } => {
            let asa_uid = device_uid_or_select(session, asa_uid.as_deref(), ONLINE_ASA_QUERY).await?;
            let input = if software_version.is_none() && asdm_version.is_none() {
                let versions = upgrades.get_compatible_asa_versions(&asa_uid).await?;
                select_asa_upgrade(versions)?
            } else {
                UpgradeAsaDeviceInput {
                    software_version: software_version.clone(),
                    asdm_version: asdm_version.clone(),
                }
            };

            upgrades.upgrade_asa(&asa_uid, &input).await?;
            println!("Upgraded ASA with UID: {} to {}", asa_uid, input.describe());
        }
    }
    Ok(())
}

async fn device_uid_or_select(session: &Session, given: Option<&str>, query: &str) -> Result<String> {
    match given {
        Some(uid) => Ok(uid.to_string()),
        None => Ok(select_device(&session.inventory(), query).await?.uid),
    }
}

fn select_ftd_version(mut versions: Vec<FtdVersion>) -> Result<FtdVersion> {
    if versions.is_empty() {
        bail!("No compatible versions found for the selected FTD");
    }
    let labels: Vec<String> = versions.iter().map(FtdVersion::display_label).collect();
    let index = prompt::select(
        "Select FTD version (suggested versions are marked with a *)",
        &labels,
    )?;
    Ok(versions.swap_remove(index))
}

/// Picks a compatible version, then which of its components to upgrade
fn select_asa_upgrade(versions: Vec<AsaCompatibleVersion>) -> Result<UpgradeAsaDeviceInput> {
    if versions.is_empty() {
        bail!("No compatible versions found for the selected ASA");
    }
    let labels: Vec<String> = versions.iter().map(AsaCompatibleVersion::display_label).collect();
    let selected = &versions[prompt::select("Select ASA version", &labels)?];

    let upgrade_software = prompt::confirm("Upgrade ASA Software Version?", true)?;
    let upgrade_asdm = prompt::confirm("Upgrade ASA ASDM Version?", true)?;

    let input = UpgradeAsaDeviceInput {
        software_version: selected.software_version.clone().filter(|_| upgrade_software),
        asdm_version: selected.asdm_version.clone().filter(|_| upgrade_asdm),
    };
    if input.is_empty() {
        bail!("Nothing selected to upgrade");
    }
    Ok(input)
}
