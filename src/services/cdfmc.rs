//! Access policy management on a tenant's cloud-delivered FMC
//!
//! The cdFMC exposes the FMC configuration API under the tenant's base URL.
//! Every call is scoped to the cdFMC domain, which is discovered once from
//! the tenant's device managers.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::http::ApiClient;
use crate::models::DevicePage;

pub const DEFAULT_ACCESS_POLICY_NAME: &str = "MSP Access Policy";
pub const GAMBLING_CATEGORY: &str = "Gambling";
pub const ANY_IPV4: &str = "any-ipv4";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultAction {
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdFmcAccessPolicy {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub default_action: DefaultAction,
}

impl CdFmcAccessPolicy {
    pub fn new(name: &str, default_action: &str) -> Self {
        Self {
            kind: "AccessPolicy".to_string(),
            name: name.to_string(),
            default_action: DefaultAction {
                action: default_action.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlCategory {
    pub name: String,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlCategoryWithReputation {
    pub reputation: String,
    pub category: UrlCategory,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Urls {
    pub url_categories_with_reputation: Vec<UrlCategoryWithReputation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkObject {
    #[serde(rename = "type")]
    pub kind: String,
    pub overridable: bool,
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceNetworks {
    pub objects: Vec<NetworkObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdFmcAccessRule {
    pub name: String,
    pub action: String,
    pub enabled: bool,
    pub urls: Urls,
    pub source_networks: SourceNetworks,
}

impl CdFmcAccessRule {
    /// Blocks a URL category, trusted and unknown reputations included, from `source`
    pub fn block_url_category(name: &str, category: UrlCategory, source: NetworkObject) -> Self {
        Self {
            name: name.to_string(),
            action: "BLOCK".to_string(),
            enabled: true,
            urls: Urls {
                url_categories_with_reputation: vec![UrlCategoryWithReputation {
                    reputation: "TRUSTED_AND_UNKNOWN".to_string(),
                    category,
                    kind: "UrlCategoryAndReputation".to_string(),
                }],
            },
            source_networks: SourceNetworks {
                objects: vec![source],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct Paging {
    #[serde(default)]
    count: usize,
}

#[derive(Debug, Deserialize)]
struct FmcListing {
    #[serde(default)]
    items: Vec<Value>,
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct Created {
    id: String,
}

pub struct CdFmcApiService<'a> {
    client: &'a ApiClient,
    domain_uid: String,
}

impl<'a> CdFmcApiService<'a> {
    /// Discovers the cdFMC domain of the tenant `client` is authenticated for
    pub async fn connect(client: &'a ApiClient) -> Result<CdFmcApiService<'a>> {
        let query = [
            ("limit", "1".to_string()),
            ("offset", "0".to_string()),
            ("q", "deviceType:CDFMC".to_string()),
        ];
        let managers: DevicePage = client
            .get_json("/v1/inventory/managers", &query)
            .await
            .context("looking up the cdFMC")?;
        if managers.items.len() != 1 {
            bail!("cdFMC not found");
        }

        let manager = &managers.items[0];
        let domain_uid = manager
            .fmc_domain_uid
            .clone()
            .or_else(|| manager.cd_fmc_info.as_ref().and_then(|i| i.fmc_domain_uid.clone()))
            .ok_or_else(|| anyhow!("cdFMC {} does not report a domain UID", manager.uid))?;

        Ok(Self { client, domain_uid })
    }

    pub fn domain_uid(&self) -> &str {
        &self.domain_uid
    }

    fn path(&self, suffix: &str) -> String {
        format!(
            "/v1/cdfmc/api/fmc_config/v1/domain/{}/{}",
            self.domain_uid, suffix
        )
    }

    /// Creates the default access policy and returns its id
    pub async fn create_default_access_policy(&self) -> Result<String> {
        let policy = CdFmcAccessPolicy::new(DEFAULT_ACCESS_POLICY_NAME, "BLOCK");
        let created: Created = self
            .client
            .post_json(&self.path("policy/accesspolicies"), &policy)
            .await
            .context("creating the default access policy")?;
        info!("Created access policy {} ({})", policy.name, created.id);
        Ok(created.id)
    }

    /// Adds a rule blocking gambling sites for any IPv4 source
    pub async fn block_gambling(&self, access_policy_uid: &str) -> Result<Value> {
        let category_id = self.get_gambling_category_id().await?;
        let any_ipv4_id = self.get_any_ipv4_network_object().await?;

        let rule = CdFmcAccessRule::block_url_category(
            "Block Gambling",
            UrlCategory {
                name: GAMBLING_CATEGORY.to_string(),
                id: category_id,
                kind: "URLCategory".to_string(),
            },
            NetworkObject {
                kind: "NetworkGroup".to_string(),
                overridable: false,
                id: any_ipv4_id,
                name: ANY_IPV4.to_string(),
            },
        );

        self.client
            .post_json(
                &self.path(&format!(
                    "policy/accesspolicies/{}/accessrules",
                    access_policy_uid
                )),
                &rule,
            )
            .await
            .context("creating the Block Gambling rule")
    }

    async fn get_any_ipv4_network_object(&self) -> Result<String> {
        let listing: FmcListing = self
            .client
            .get_json(
                &self.path("object/networks"),
                &[("filter", format!("nameOrValue:{}", ANY_IPV4))],
            )
            .await
            .context("looking up the any-ipv4 network object")?;

        let count = listing.paging.map(|p| p.count).unwrap_or(listing.items.len());
        match listing.items.first() {
            Some(item) if count == 1 => item_id(item),
            _ => bail!("Expected exactly one network object with name '{}'", ANY_IPV4),
        }
    }

    async fn get_gambling_category_id(&self) -> Result<String> {
        let listing: FmcListing = self
            .client
            .get_json(
                &self.path("object/urlcategories"),
                &[("limit", "200".to_string())],
            )
            .await
            .context("listing URL categories")?;

        let category = listing
            .items
            .iter()
            .find(|item| item.get("name").and_then(Value::as_str) == Some(GAMBLING_CATEGORY))
            .ok_or_else(|| anyhow!("URL category '{}' not found", GAMBLING_CATEGORY))?;
        item_id(category)
    }
}

fn item_id(item: &Value) -> Result<String> {
    item.get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("FMC object without an id: {}", item))
}
