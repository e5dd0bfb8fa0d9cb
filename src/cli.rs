//! Command-line interface for the scc toolkit
//!
//! One subcommand per workflow:
//!
//! - `onboard-ftds` onboards FTDs to an MSP-managed tenant
//! - `provision-tenant` creates a managed tenant with users and a cdFMC
//! - `upgrade-ftd` / `upgrade-asa` list compatible versions and upgrade devices
//! - `object-group add-ips` adds host IPs to a network object group on an ASA
//! - `credentials` shows the credentials the other commands would use
//!
//! Global options select the API (region and token, or a stored credentials
//! file) and the transaction polling schedule. Anything a workflow needs that
//! is not given on the command line is prompted for interactively.

use clap::{Args, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::Region;
use crate::validation::{parse_ips_arg, parse_uuid_arg};

/// Main command-line interface structure
///
/// # Examples
///
/// ```
/// use clap::Parser;
/// use scc_toolkit::cli::{Cli, Commands};
///
/// let cli = Cli::try_parse_from(["scc", "credentials"]).unwrap();
/// assert!(matches!(cli.command, Commands::Credentials { reveal: false }));
/// assert_eq!(cli.poll_interval, 5);
/// ```
#[derive(Parser, Debug)]
#[command(
    name = "scc",
    about = "Tenant and device lifecycle tooling for Security Cloud Control",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// The region for the API (requires --api-token)
    #[arg(long, value_enum, global = true, env = "SCC_REGION", requires = "api_token")]
    pub region: Option<Region>,

    /// The API token (requires --region)
    #[arg(
        long,
        global = true,
        env = "SCC_API_TOKEN",
        hide_env_values = true,
        requires = "region"
    )]
    pub api_token: Option<String>,

    /// Override the API base URL derived from the region
    #[arg(long, global = true, env = "SCC_BASE_URL", value_name = "URL")]
    pub base_url: Option<String>,

    /// Seconds between transaction status checks
    #[arg(
        long,
        global = true,
        default_value = "5",
        value_name = "SECONDS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_interval: u64,

    /// Seconds to wait for a transaction before giving up (0 waits forever)
    #[arg(long, global = true, default_value = "7200", value_name = "SECONDS")]
    pub transaction_timeout: u64,

    /// HTTP request timeout in seconds
    #[arg(long, global = true, default_value = "30", value_name = "SECONDS")]
    pub http_timeout: u64,
}

impl Cli {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    pub fn transaction_timeout(&self) -> Option<Duration> {
        match self.transaction_timeout {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Onboard FTDs to an MSP-managed tenant
    ///
    /// Needs a super-admin API token generated in the MSSP portal. ZTP devices
    /// are onboarded first, then devices using the configure manager CLI key.
    OnboardFtds(OnboardFtdsArgs),

    /// Create an MSP-managed tenant, its users and optionally a cdFMC
    ProvisionTenant(ProvisionTenantArgs),

    /// List compatible versions for, and upgrade, cdFMC-managed FTDs
    #[command(subcommand)]
    UpgradeFtd(UpgradeFtdCommand),

    /// List compatible versions for, and upgrade, ASAs
    #[command(subcommand)]
    UpgradeAsa(UpgradeAsaCommand),

    /// Manage object groups on ASAs
    #[command(subcommand)]
    ObjectGroup(ObjectGroupCommand),

    /// Resolve credentials (prompting and saving them if needed) and print them
    Credentials {
        /// Print the API token instead of a masked version
        #[arg(long)]
        reveal: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct OnboardFtdsArgs {
    /// The UID of the MSP-managed tenant to onboard the devices to
    #[arg(long, value_parser = parse_uuid_arg)]
    pub tenant_uid: Option<String>,

    /// The UID of the access policy to apply to each onboarded device
    #[arg(long, value_parser = parse_uuid_arg)]
    pub fmc_access_policy_uid: Option<String>,

    /// The API-only user on the tenant; defaults to <tenant-name>-api-only-user
    #[arg(long)]
    pub username: Option<String>,

    /// CSV file of FTDs to onboard with the CLI key
    /// (columns: name,licenses,virtual,performance_tier)
    #[arg(long, value_name = "FILE", conflicts_with = "ftd_ztp_csv_file")]
    pub ftd_csv_file: Option<PathBuf>,

    /// CSV file of FTDs to onboard with ZTP
    /// (columns: name,serial_number,admin_password,licenses)
    #[arg(long, value_name = "FILE")]
    pub ftd_ztp_csv_file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ProvisionTenantArgs {
    /// Name of the new tenant ([a-zA-Z0-9-_]{1,50})
    #[arg(long)]
    pub tenant_name: Option<String>,

    /// Display name of the new tenant; defaults to the tenant name
    #[arg(long)]
    pub display_name: Option<String>,

    /// CSV file of users to create (columns: username,role,api_only_user)
    #[arg(long, value_name = "FILE")]
    pub users_csv_file: Option<PathBuf>,

    /// Provision a cdFMC on the new tenant
    #[arg(long)]
    pub provision_cdfmc: bool,

    /// Wait until the cdFMC is active in the tenant
    #[arg(long, requires = "provision_cdfmc")]
    pub wait_for_cdfmc: bool,

    /// Create the default access policy with a Block Gambling rule
    #[arg(long, requires = "wait_for_cdfmc")]
    pub create_default_policy: bool,

    /// API-only user whose token is used inside the tenant;
    /// defaults to <tenant-name>-api-only-user
    #[arg(long)]
    pub api_user: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum UpgradeFtdCommand {
    /// Retrieve the list of compatible versions for an FTD
    ListVersions {
        /// The UID of the FTD; picked interactively when omitted
        #[arg(long)]
        ftd_uid: Option<String>,
    },
    /// Upgrade an FTD using an upgrade package
    Upgrade {
        /// The UID of the FTD to upgrade; picked interactively when omitted
        #[arg(long)]
        ftd_uid: Option<String>,

        /// The UID of the upgrade package; picked interactively when omitted
        #[arg(long)]
        upgrade_package_uid: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum UpgradeAsaCommand {
    /// Retrieve the list of compatible versions for an ASA
    ListVersions {
        /// The UID of the ASA; picked interactively when omitted
        #[arg(long)]
        asa_uid: Option<String>,
    },
    /// Upgrade the software and/or ASDM version of an ASA
    Upgrade {
        /// The UID of the ASA to upgrade; picked interactively when omitted
        #[arg(long)]
        asa_uid: Option<String>,

        /// The software version to upgrade to
        #[arg(long)]
        software_version: Option<String>,

        /// The ASDM version to upgrade to
        #[arg(long)]
        asdm_version: Option<String>,
    },
}

/// Comma-separated IP addresses given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpList(pub Vec<IpAddr>);

fn parse_ip_list(value: &str) -> Result<IpList, String> {
    parse_ips_arg(value).map(IpList)
}

#[derive(Subcommand, Debug, Clone)]
pub enum ObjectGroupCommand {
    /// Add IPs to a network object group
    AddIps {
        /// The name of the object group to add the IPs to
        #[arg(long)]
        obj_name: Option<String>,

        /// The UID of the ASA to create the object group in
        #[arg(long)]
        device_uid: Option<String>,

        /// Comma separated list of IPs to add to the object group
        #[arg(long, value_parser = parse_ip_list)]
        ips_to_add: Option<IpList>,
    },
}
