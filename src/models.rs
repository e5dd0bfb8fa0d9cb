//! Request and response payloads exchanged with the Security Cloud Control API
//!
//! Field names follow the API's camelCase JSON. Optional response fields
//! default when absent so that additions on the server side do not break
//! decoding.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Treats an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Device type assigned to FTDs managed by the cloud-delivered FMC
pub const CDFMC_MANAGED_FTD: &str = "CDFMC_MANAGED_FTD";

/// Status of a server-side asynchronous operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    InProgress,
    Done,
    Error,
    #[serde(other)]
    Unknown,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Done | TransactionStatus::Error)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdoTransaction {
    pub transaction_uid: String,
    #[serde(default)]
    pub tenant_uid: Option<String>,
    #[serde(default)]
    pub entity_uid: Option<String>,
    #[serde(default)]
    pub entity_url: Option<String>,
    #[serde(default)]
    pub polling_url: Option<String>,
    #[serde(default)]
    pub submission_time: Option<String>,
    #[serde(default)]
    pub last_updated_time: Option<String>,
    #[serde(default)]
    pub transaction_type: Option<String>,
    pub cdo_transaction_status: TransactionStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub transaction_details: Map<String, Value>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub error_details: Map<String, Value>,
}

impl CdoTransaction {
    /// UID of the entity the transaction created or acted on
    pub fn require_entity_uid(&self) -> anyhow::Result<&str> {
        self.entity_uid.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "Transaction {} finished without an entity UID",
                self.transaction_uid
            )
        })
    }

    /// String-valued entry of `transactionDetails`
    pub fn detail(&self, key: &str) -> Option<&str> {
        self.transaction_details.get(key).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdFmcInfo {
    #[serde(default)]
    pub cli_key: Option<String>,
    #[serde(default)]
    pub fmc_domain_uid: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub uid: String,
    pub name: String,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub software_version: Option<String>,
    #[serde(default)]
    pub connectivity_state: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub cd_fmc_info: Option<CdFmcInfo>,
    #[serde(default)]
    pub fmc_domain_uid: Option<String>,
}

impl Device {
    /// Label used in interactive device pickers
    pub fn display_label(&self) -> String {
        format!(
            "{} ({})",
            self.name,
            self.software_version.as_deref().unwrap_or("unknown version")
        )
    }
}

/// Paged list response used across the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: usize,
    #[serde(default, deserialize_with = "null_as_default")]
    pub limit: usize,
    #[serde(default, deserialize_with = "null_as_default")]
    pub offset: usize,
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub items: Vec<T>,
}

pub type DevicePage = Page<Device>;

/// FTD license entitlements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum License {
    #[serde(rename = "BASE")]
    Base,
    #[serde(rename = "CARRIER")]
    Carrier,
    #[serde(rename = "MALWARE")]
    Malware,
    #[serde(rename = "THREAT")]
    Threat,
    #[serde(rename = "URLFilter")]
    UrlFilter,
}

impl License {
    pub const ALL: [License; 5] = [
        License::Base,
        License::Carrier,
        License::Malware,
        License::Threat,
        License::UrlFilter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            License::Base => "BASE",
            License::Carrier => "CARRIER",
            License::Malware => "MALWARE",
            License::Threat => "THREAT",
            License::UrlFilter => "URLFilter",
        }
    }

    /// Parses a `;`-separated license list as it appears in CSV cells
    pub fn parse_list(value: &str) -> Result<Vec<License>, String> {
        value.split(';').map(str::parse).collect()
    }
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for License {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        License::ALL
            .into_iter()
            .find(|l| l.as_str() == s.trim())
            .ok_or_else(|| format!("unknown license `{}`", s))
    }
}

/// Throughput tier of a virtual FTD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceTier {
    #[serde(rename = "FTDv5")]
    FtdV5,
    #[serde(rename = "FTDv10")]
    FtdV10,
    #[serde(rename = "FTDv20")]
    FtdV20,
    #[serde(rename = "FTDv30")]
    FtdV30,
    #[serde(rename = "FTDv50")]
    FtdV50,
}

impl PerformanceTier {
    pub const ALL: [PerformanceTier; 5] = [
        PerformanceTier::FtdV5,
        PerformanceTier::FtdV10,
        PerformanceTier::FtdV20,
        PerformanceTier::FtdV30,
        PerformanceTier::FtdV50,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceTier::FtdV5 => "FTDv5",
            PerformanceTier::FtdV10 => "FTDv10",
            PerformanceTier::FtdV20 => "FTDv20",
            PerformanceTier::FtdV30 => "FTDv30",
            PerformanceTier::FtdV50 => "FTDv50",
        }
    }
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PerformanceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PerformanceTier::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| format!("unknown performance tier `{}`", s))
    }
}

/// Roles a tenant user can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    RoleSuperAdmin,
    RoleAdmin,
    RoleReadOnly,
    RoleEditOnly,
    RoleDeployOnly,
    RoleVpnSessionManager,
}

impl UserRole {
    pub const ALL: [UserRole; 6] = [
        UserRole::RoleSuperAdmin,
        UserRole::RoleAdmin,
        UserRole::RoleReadOnly,
        UserRole::RoleEditOnly,
        UserRole::RoleDeployOnly,
        UserRole::RoleVpnSessionManager,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::RoleSuperAdmin => "ROLE_SUPER_ADMIN",
            UserRole::RoleAdmin => "ROLE_ADMIN",
            UserRole::RoleReadOnly => "ROLE_READ_ONLY",
            UserRole::RoleEditOnly => "ROLE_EDIT_ONLY",
            UserRole::RoleDeployOnly => "ROLE_DEPLOY_ONLY",
            UserRole::RoleVpnSessionManager => "ROLE_VPN_SESSION_MANAGER",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| format!("unknown role `{}`", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FtdCreateOrUpdateInput {
    pub name: String,
    pub device_type: String,
    pub fmc_access_policy_uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_tier: Option<PerformanceTier>,
    #[serde(rename = "virtual")]
    pub is_virtual: bool,
    pub licenses: Vec<License>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FtdRegistrationInput {
    pub ftd_uid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZtpOnboardingInput {
    pub name: String,
    pub serial_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,
    pub fmc_access_policy_uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_group_uid: Option<String>,
    pub licenses: Vec<License>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CliCommandInput {
    pub device_uids: Vec<String>,
    pub script: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CliResult {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error_msg: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FtdVersion {
    pub software_version: String,
    pub upgrade_package_uid: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_suggested_version: bool,
}

impl FtdVersion {
    /// Label used in the interactive version picker; suggested releases get a `*`
    pub fn display_label(&self) -> String {
        if self.is_suggested_version {
            format!("{}*", self.software_version)
        } else {
            self.software_version.clone()
        }
    }
}

pub type FtdVersionsPage = Page<FtdVersion>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsaCompatibleVersion {
    #[serde(default)]
    pub software_version: Option<String>,
    #[serde(default)]
    pub asdm_version: Option<String>,
}

impl AsaCompatibleVersion {
    pub fn display_label(&self) -> String {
        format!(
            "{} (ASDM: {})",
            self.software_version.as_deref().unwrap_or("-"),
            self.asdm_version.as_deref().unwrap_or("-")
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsaCompatibleVersionsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<AsaCompatibleVersion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeFtdDeviceInput {
    pub upgrade_package_uid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeAsaDeviceInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asdm_version: Option<String>,
}

impl UpgradeAsaDeviceInput {
    pub fn is_empty(&self) -> bool {
        self.software_version.is_none() && self.asdm_version.is_none()
    }

    /// Human readable summary of the components being upgraded
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(version) = &self.software_version {
            parts.push(format!("software version: {}", version));
        }
        if let Some(version) = &self.asdm_version {
            parts.push(format!("ASDM version: {}", version));
        }
        parts.join(" and ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MspManagedTenant {
    pub uid: String,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

impl MspManagedTenant {
    /// `<display name> (<region>)`, falling back to the tenant name
    pub fn label(&self) -> String {
        format!(
            "{} ({})",
            self.display_name.as_deref().unwrap_or(&self.name),
            self.region.as_deref().unwrap_or("unknown region")
        )
    }

    /// Default name of the tenant's API-only user
    ///
    /// Tenant names carry a `CDO_` prefix and an optional `__<suffix>`; the
    /// API-only user is named after the part in between.
    pub fn default_api_user_name(&self) -> String {
        let base = self.name.strip_prefix("CDO_").unwrap_or(&self.name);
        let base = base.split("__").next().unwrap_or(base);
        format!("{}-api-only-user", base)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MspCreateTenantInput {
    pub tenant_name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    pub username: String,
    pub role: UserRole,
    pub api_only_user: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MspAddUsersToTenantInput {
    pub users: Vec<UserInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub api_only_user: bool,
}

pub type UserPage = Page<User>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTokenInfo {
    pub api_token: String,
}
