//! Conversion of CSV rows and interactive answers into request payloads
//!
//! CSV parsing assumes the file already passed the matching validator in
//! [`crate::validation`]; rows are still checked again so a parser never
//! produces a payload the validator would reject.

use anyhow::{anyhow, Result};
use std::path::Path;

use crate::models::{
    FtdCreateOrUpdateInput, License, PerformanceTier, UserInput, UserRole, ZtpOnboardingInput,
    CDFMC_MANAGED_FTD,
};
use crate::prompt;
use crate::validation::{
    self, parse_bool_cell, read_rows, CsvRow, FTD_COLUMNS, USER_COLUMNS, ZTP_COLUMNS,
};

fn cell<'a>(row: &'a CsvRow, column: &str) -> &'a str {
    row.get(column).map(String::as_str).unwrap_or("")
}

fn parse_each<T>(
    path: &Path,
    columns: &[&'static str],
    check: fn(&CsvRow) -> Result<(), String>,
    build: impl Fn(&CsvRow) -> Result<T, String>,
) -> Result<Vec<T>> {
    read_rows(path, columns)?
        .iter()
        .enumerate()
        .map(|(index, row)| {
            check(row)
                .and_then(|_| build(row))
                .map_err(|reason| anyhow!("{} row {}: {}", path.display(), index + 1, reason))
        })
        .collect()
}

/// FTDs onboarded with the configure-manager CLI key
pub struct FtdParser<'a> {
    fmc_access_policy_uid: &'a str,
}

impl<'a> FtdParser<'a> {
    pub fn new(fmc_access_policy_uid: &'a str) -> Self {
        Self {
            fmc_access_policy_uid,
        }
    }

    /// Reads the CSV file if given, otherwise asks the operator
    pub fn get_ftds_to_onboard(&self, csv_file: Option<&Path>) -> Result<Vec<FtdCreateOrUpdateInput>> {
        match csv_file {
            Some(path) => self.parse_csv(path),
            None => self.prompt_ftd_details(),
        }
    }

    pub fn parse_csv(&self, path: &Path) -> Result<Vec<FtdCreateOrUpdateInput>> {
        parse_each(path, &FTD_COLUMNS, validation::validate_ftd_row, |row| {
            let is_virtual = parse_bool_cell(cell(row, "virtual"))?;
            let performance_tier = if is_virtual {
                Some(cell(row, "performance_tier").parse::<PerformanceTier>()?)
            } else {
                None
            };
            Ok(self.input(
                cell(row, "name").to_string(),
                License::parse_list(cell(row, "licenses"))?,
                is_virtual,
                performance_tier,
            ))
        })
    }

    fn input(
        &self,
        name: String,
        licenses: Vec<License>,
        is_virtual: bool,
        performance_tier: Option<PerformanceTier>,
    ) -> FtdCreateOrUpdateInput {
        FtdCreateOrUpdateInput {
            name,
            device_type: CDFMC_MANAGED_FTD.to_string(),
            fmc_access_policy_uid: self.fmc_access_policy_uid.to_string(),
            performance_tier,
            is_virtual,
            licenses,
        }
    }

    fn prompt_ftd_details(&self) -> Result<Vec<FtdCreateOrUpdateInput>> {
        let mut inputs = Vec::new();
        if !prompt::confirm(
            "Do you want to onboard FTDs using the configure manager CLI to the tenant?",
            true,
        )? {
            return Ok(inputs);
        }

        loop {
            let name = prompt::text_validated("FTD Name", None, |text| {
                if text.is_empty() {
                    Err("name is required".to_string())
                } else {
                    Ok(())
                }
            })?;
            let licenses = prompt_licenses()?;
            let is_virtual = prompt::confirm("Is the FTD virtual?", false)?;
            let performance_tier = if is_virtual {
                let index = prompt::select("Select performance tier", &PerformanceTier::ALL)?;
                Some(PerformanceTier::ALL[index])
            } else {
                None
            };

            inputs.push(self.input(name, licenses, is_virtual, performance_tier));

            if !prompt::confirm("Add another FTD to onboard?", true)? {
                break;
            }
        }
        Ok(inputs)
    }
}

/// FTDs onboarded with Zero-Touch Provisioning
pub struct FtdZtpParser<'a> {
    fmc_access_policy_uid: &'a str,
}

impl<'a> FtdZtpParser<'a> {
    pub fn new(fmc_access_policy_uid: &'a str) -> Self {
        Self {
            fmc_access_policy_uid,
        }
    }

    pub fn get_ztp_onboarding_inputs(&self, csv_file: Option<&Path>) -> Result<Vec<ZtpOnboardingInput>> {
        match csv_file {
            Some(path) => self.parse_csv(path),
            None => self.prompt_ztp_details(),
        }
    }

    pub fn parse_csv(&self, path: &Path) -> Result<Vec<ZtpOnboardingInput>> {
        parse_each(path, &ZTP_COLUMNS, validation::validate_ztp_row, |row| {
            Ok(ZtpOnboardingInput {
                name: cell(row, "name").to_string(),
                serial_number: cell(row, "serial_number").to_string(),
                admin_password: Some(cell(row, "admin_password").to_string()),
                fmc_access_policy_uid: self.fmc_access_policy_uid.to_string(),
                device_group_uid: None,
                licenses: License::parse_list(cell(row, "licenses"))?,
            })
        })
    }

    fn prompt_ztp_details(&self) -> Result<Vec<ZtpOnboardingInput>> {
        let mut inputs = Vec::new();
        if !prompt::confirm(
            "Do you want to onboard FTDs using Zero-Touch Provisioning?",
            true,
        )? {
            return Ok(inputs);
        }

        loop {
            let name = prompt::text_validated(
                "Device Name (A-Za-z0-9-_*)",
                None,
                validation::validate_device_name,
            )?;
            let serial_number = prompt::text_validated("Serial Number", None, |text| {
                if text.is_empty() {
                    Err("serial number is required".to_string())
                } else {
                    Ok(())
                }
            })?;
            let admin_password = if prompt::confirm(
                "Enter admin password? You should not if the password is already set",
                false,
            )? {
                Some(prompt::password(
                    "Admin Password (no spaces)",
                    validation::validate_admin_password,
                )?)
            } else {
                None
            };
            let licenses = prompt_licenses()?;

            inputs.push(ZtpOnboardingInput {
                name,
                serial_number,
                admin_password,
                fmc_access_policy_uid: self.fmc_access_policy_uid.to_string(),
                device_group_uid: None,
                licenses,
            });

            if !prompt::confirm("Add another FTD to onboard?", true)? {
                break;
            }
        }
        Ok(inputs)
    }
}

/// Users to add to a managed tenant
pub struct UsersParser;

impl UsersParser {
    pub fn get_users(csv_file: Option<&Path>) -> Result<Vec<UserInput>> {
        match csv_file {
            Some(path) => Self::parse_csv(path),
            None => Self::prompt_users(),
        }
    }

    pub fn parse_csv(path: &Path) -> Result<Vec<UserInput>> {
        parse_each(path, &USER_COLUMNS, validation::validate_user_row, |row| {
            Ok(UserInput {
                username: cell(row, "username").to_string(),
                role: cell(row, "role").parse::<UserRole>()?,
                api_only_user: parse_bool_cell(cell(row, "api_only_user"))?,
            })
        })
    }

    fn prompt_users() -> Result<Vec<UserInput>> {
        let mut users = Vec::new();
        if !prompt::confirm("Do you want to create users?", true)? {
            return Ok(users);
        }

        loop {
            let api_only_user = prompt::confirm("API-only user?", true)?;
            let username = prompt::text_validated("Username", None, |text| {
                validation::validate_username(text, api_only_user)
            })?;
            let index = prompt::select("Role", &UserRole::ALL)?;

            users.push(UserInput {
                username,
                role: UserRole::ALL[index],
                api_only_user,
            });

            if !prompt::confirm("Create another?", true)? {
                break;
            }
        }
        Ok(users)
    }
}

fn prompt_licenses() -> Result<Vec<License>> {
    let chosen = prompt::multi_select(
        "Select licenses (use space to select multiple)",
        &License::ALL,
    )?;
    Ok(chosen.into_iter().map(|i| License::ALL[i]).collect())
}
