//! Input validation for CSV files and interactive answers
//!
//! The CSV validators check a whole file before any API call is made:
//! - the file must exist
//! - the header must contain every required column
//! - every row must satisfy the workflow's rules
//!
//! Validation stops at the first invalid row; there is no partial success.

use regex::Regex;
use std::collections::HashMap;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

use crate::models::{License, PerformanceTier, UserRole};

pub const FTD_COLUMNS: [&str; 4] = ["name", "licenses", "virtual", "performance_tier"];
pub const ZTP_COLUMNS: [&str; 4] = ["name", "serial_number", "admin_password", "licenses"];
pub const USER_COLUMNS: [&str; 3] = ["username", "role", "api_only_user"];

#[derive(Debug, Error)]
pub enum CsvValidationError {
    #[error("CSV file {} does not exist", .0.display())]
    NotFound(PathBuf),
    #[error("CSV file {} is missing required column `{column}`", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("CSV file {} is invalid at row {row}: {reason}", .path.display())]
    InvalidRow {
        path: PathBuf,
        row: usize,
        reason: String,
    },
    #[error("could not read CSV file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// One CSV data row keyed by header name
pub type CsvRow = HashMap<String, String>;

fn uuid_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^[a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{12}$",
        )
        .expect("UUID pattern is valid")
    })
}

fn device_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9\-_*]+$").expect("device name pattern is valid"))
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@]+@[^@]+\.[^@]+").expect("email pattern is valid"))
}

fn tenant_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9\-_]{1,50}$").expect("tenant name pattern is valid"))
}

/// Reads every data row of a CSV file after checking the header
///
/// Used by both the validators and the parsers so they agree on what a row is.
pub fn read_rows(path: &Path, required: &[&'static str]) -> Result<Vec<CsvRow>, CsvValidationError> {
    if !path.exists() {
        return Err(CsvValidationError::NotFound(path.to_path_buf()));
    }

    let read_err = |source: csv::Error| CsvValidationError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(read_err)?;

    let headers = reader.headers().map_err(read_err)?.clone();
    for &column in required {
        if !headers.iter().any(|h| h == column) {
            return Err(CsvValidationError::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(read_err)?;
        rows.push(
            headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect(),
        );
    }
    Ok(rows)
}

fn validate_rows(
    path: &Path,
    required: &[&'static str],
    check: impl Fn(&CsvRow) -> Result<(), String>,
) -> Result<(), CsvValidationError> {
    for (index, row) in read_rows(path, required)?.iter().enumerate() {
        check(row).map_err(|reason| CsvValidationError::InvalidRow {
            path: path.to_path_buf(),
            row: index + 1,
            reason,
        })?;
    }
    Ok(())
}

fn field<'a>(row: &'a CsvRow, column: &str) -> &'a str {
    row.get(column).map(String::as_str).unwrap_or("")
}

/// Parses a CSV boolean cell; empty means `false`
pub fn parse_bool_cell(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" | "" => Ok(false),
        other => Err(format!("`{}` is not true or false", other)),
    }
}

/// Checks a file of FTDs onboarded with the configure-manager CLI key
///
/// Columns: `name,licenses,virtual,performance_tier`.
pub fn validate_ftd_csv(path: &Path) -> Result<(), CsvValidationError> {
    validate_rows(path, &FTD_COLUMNS, validate_ftd_row)
}

pub fn validate_ftd_row(row: &CsvRow) -> Result<(), String> {
    if field(row, "name").is_empty() {
        return Err("name is required".into());
    }

    let is_virtual = parse_bool_cell(field(row, "virtual"))?;
    if is_virtual {
        field(row, "performance_tier").parse::<PerformanceTier>()?;
    }

    License::parse_list(field(row, "licenses"))?;
    Ok(())
}

/// Checks a file of FTDs onboarded with Zero-Touch Provisioning
///
/// Columns: `name,serial_number,admin_password,licenses`.
pub fn validate_ztp_csv(path: &Path) -> Result<(), CsvValidationError> {
    validate_rows(path, &ZTP_COLUMNS, validate_ztp_row)
}

pub fn validate_ztp_row(row: &CsvRow) -> Result<(), String> {
    validate_device_name(field(row, "name"))?;

    if field(row, "serial_number").is_empty() {
        return Err("serial_number is required".into());
    }

    License::parse_list(field(row, "licenses"))?;
    validate_admin_password(field(row, "admin_password"))
}

/// Checks a file of users to create in a tenant
///
/// Columns: `username,role,api_only_user`.
pub fn validate_users_csv(path: &Path) -> Result<(), CsvValidationError> {
    validate_rows(path, &USER_COLUMNS, validate_user_row)
}

pub fn validate_user_row(row: &CsvRow) -> Result<(), String> {
    let username = field(row, "username");
    let role = field(row, "role");
    if username.is_empty() || role.is_empty() {
        return Err("username and role are required".into());
    }

    let api_only_user = parse_bool_cell(field(row, "api_only_user"))?;
    validate_username(username, api_only_user)?;
    role.parse::<UserRole>()?;
    Ok(())
}

/// API-only users are plain names; interactive users log in with an e-mail
pub fn validate_username(username: &str, api_only_user: bool) -> Result<(), String> {
    let looks_like_email = email_regex().is_match(username);
    match (api_only_user, looks_like_email) {
        (true, true) => Err(format!(
            "API-only user `{}` should not have an email address",
            username
        )),
        (false, false) => Err(format!("`{}` is not a valid email address", username)),
        _ => Ok(()),
    }
}

pub fn validate_device_name(name: &str) -> Result<(), String> {
    if device_name_regex().is_match(name) {
        Ok(())
    } else {
        Err(format!("Invalid name `{}`, allowed characters are A-Za-z0-9-_*", name))
    }
}

pub fn validate_admin_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        Err("admin_password is required".into())
    } else if password.contains(' ') {
        Err("admin_password must not contain spaces".into())
    } else {
        Ok(())
    }
}

pub fn validate_uuid(value: &str) -> Result<(), String> {
    if uuid_regex().is_match(value) {
        Ok(())
    } else {
        Err(format!("`{}` is not a valid UUID", value))
    }
}

pub fn validate_tenant_name(value: &str) -> Result<(), String> {
    if tenant_name_regex().is_match(value) {
        Ok(())
    } else {
        Err(format!("`{}` must match [a-zA-Z0-9-_]{{1,50}}", value))
    }
}

pub fn validate_ip(value: &str) -> Result<IpAddr, String> {
    value
        .trim()
        .parse::<IpAddr>()
        .map_err(|_| format!("Invalid IP address: {}", value))
}

/// Parses a comma-separated list of IP addresses
pub fn validate_ips(comma_separated: &str) -> Result<Vec<IpAddr>, String> {
    comma_separated.split(',').map(validate_ip).collect()
}

/// clap value parser for UUID arguments
pub fn parse_uuid_arg(value: &str) -> Result<String, String> {
    validate_uuid(value).map(|_| value.to_string())
}

/// clap value parser for comma-separated IP lists
pub fn parse_ips_arg(value: &str) -> Result<Vec<IpAddr>, String> {
    validate_ips(value)
}
