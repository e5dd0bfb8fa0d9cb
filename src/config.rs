//! Credential and session bootstrap
//!
//! Credentials are resolved in order:
//! 1. `--region` / `--api-token` (or `SCC_REGION` / `SCC_API_TOKEN`)
//! 2. the credentials file (`<config dir>/scc-toolkit/credentials.json`,
//!    or `SCC_CREDENTIALS_PATH`)
//! 3. interactive prompts; the token is validated against the API and saved
//!
//! The resolved [`Credentials`] value is passed explicitly to everything that
//! talks to the API.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::prompt;
use crate::services::token::TokenValidationService;

pub const CREDENTIALS_PATH_ENV: &str = "SCC_CREDENTIALS_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not locate a config directory for the current user; set SCC_CREDENTIALS_PATH")]
    MissingConfigDir,
    #[error("the API token was rejected by {0}")]
    InvalidToken(String),
}

/// Regions hosting a Security Cloud Control deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Us,
    Eu,
    Aus,
    Apj,
    In,
    Staging,
    Scale,
}

impl Region {
    /// Regions offered in the interactive picker
    pub const PUBLIC: [Region; 5] = [Region::Us, Region::Eu, Region::Aus, Region::Apj, Region::In];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Us => "us",
            Region::Eu => "eu",
            Region::Aus => "aus",
            Region::Apj => "apj",
            Region::In => "in",
            Region::Staging => "staging",
            Region::Scale => "scale",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Region::Us => "United States",
            Region::Eu => "Europe",
            Region::Aus => "Australia",
            Region::Apj => "Asia Pacific Japan",
            Region::In => "India",
            Region::Staging => "Staging",
            Region::Scale => "Scale",
        }
    }

    pub fn base_url(&self) -> String {
        format!("https://{}.manage.security.cisco.com/api/rest", self.as_str())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What is persisted between invocations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub region: Region,
    pub api_token: String,
}

/// Resolved credentials for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_token: String,
    pub base_url: String,
}

impl Credentials {
    pub fn new(region: Region, api_token: impl Into<String>, base_url_override: Option<&str>) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: base_url_override
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| region.base_url()),
        }
    }
}

pub fn credentials_path() -> Result<PathBuf> {
    if let Ok(custom) = std::env::var(CREDENTIALS_PATH_ENV) {
        return Ok(PathBuf::from(custom));
    }
    let base = dirs::config_dir().ok_or(ConfigError::MissingConfigDir)?;
    Ok(base.join("scc-toolkit").join("credentials.json"))
}

pub fn load_stored(path: &Path) -> Result<Option<StoredCredentials>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    let stored = serde_json::from_str(&contents).with_context(|| format!("parsing {:?}", path))?;
    Ok(Some(stored))
}

/// Writes credentials readable only by the current user
pub fn save_stored(path: &Path, stored: &StoredCredentials) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }

    let contents = serde_json::to_string_pretty(stored).context("serializing credentials")?;
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options
        .open(path)
        .with_context(|| format!("creating {:?}", path))?;

    // `mode` only applies to new files
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))
            .with_context(|| format!("restricting permissions of {:?}", path))?;
    }

    file.write_all(contents.as_bytes())
        .with_context(|| format!("writing {:?}", path))?;
    Ok(())
}

/// Loads credentials from flags, the credentials file or the operator
pub struct CredentialsService {
    region: Option<Region>,
    api_token: Option<String>,
    base_url_override: Option<String>,
    path: PathBuf,
}

impl CredentialsService {
    pub fn new(
        region: Option<Region>,
        api_token: Option<String>,
        base_url_override: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            region,
            api_token,
            base_url_override,
            path: credentials_path()?,
        })
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Resolves credentials without prompting; `None` if nothing is configured
    pub fn load(&self) -> Result<Option<Credentials>> {
        let base_url = self.base_url_override.as_deref();
        if let (Some(region), Some(token)) = (self.region, self.api_token.as_deref()) {
            debug!("Using credentials from command line for region {}", region);
            return Ok(Some(Credentials::new(region, token.trim(), base_url)));
        }

        Ok(load_stored(&self.path)?.map(|stored| {
            debug!("Using stored credentials from {:?}", self.path);
            Credentials::new(stored.region, stored.api_token, base_url)
        }))
    }

    pub async fn load_or_prompt_credentials(
        &self,
        validator: &TokenValidationService,
    ) -> Result<Credentials> {
        if let Some(credentials) = self.load()? {
            return Ok(credentials);
        }

        let labels: Vec<String> = Region::PUBLIC
            .iter()
            .map(|region| format!("{} ({})", region.title(), region))
            .collect();
        let region = Region::PUBLIC[prompt::select("Select the region of your tenant", &labels)?];
        let api_token = prompt::password("API token", |text| {
            if text.trim().is_empty() {
                Err("the API token cannot be empty".to_string())
            } else {
                Ok(())
            }
        })?;

        let credentials = Credentials::new(region, api_token.trim(), self.base_url_override.as_deref());
        if !validator
            .validate_token(&credentials.base_url, &credentials.api_token)
            .await?
        {
            return Err(ConfigError::InvalidToken(credentials.base_url).into());
        }

        save_stored(
            &self.path,
            &StoredCredentials {
                region,
                api_token: credentials.api_token.clone(),
            },
        )?;
        info!("Saved credentials to {:?}", self.path);

        Ok(credentials)
    }
}
