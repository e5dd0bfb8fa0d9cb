//! `provision-tenant`: create an MSP-managed tenant and set it up

use anyhow::Result;
use tracing::info;

use crate::cli::ProvisionTenantArgs;
use crate::commands::Session;
use crate::parsers::UsersParser;
use crate::prompt;
use crate::services::{CdFmcApiService, MspApiService};
use crate::validation::{validate_tenant_name, validate_users_csv};

pub async fn run(session: &Session, args: &ProvisionTenantArgs) -> Result<()> {
    if let Some(path) = &args.users_csv_file {
        validate_users_csv(path)?;
    }
    if let Some(name) = &args.tenant_name {
        validate_tenant_name(name).map_err(anyhow::Error::msg)?;
    }

    let tenant_name = match &args.tenant_name {
        Some(name) => name.clone(),
        None => prompt::text_validated(
            "Tenant name (must match [a-zA-Z0-9-_]{1,50})",
            None,
            validate_tenant_name,
        )?,
    };
    let display_name = match &args.display_name {
        Some(name) => name.clone(),
        None => prompt::text("Tenant display name", Some(tenant_name.as_str()))?,
    };
    let users = UsersParser::get_users(args.users_csv_file.as_deref())?;

    let msp = MspApiService::new(&session.client, session.poll.clone());
    let tenant = msp.create_tenant(&tenant_name, &display_name).await?;
    println!("Created tenant {} (UID: {})", tenant.label(), tenant.uid);

    if !users.is_empty() {
        msp.create_users(&users, &tenant).await?;
        println!("Created {} users in {}", users.len(), tenant.label());
    }

    if !args.provision_cdfmc {
        return Ok(());
    }

    let tenant_token = if args.wait_for_cdfmc {
        let username = args
            .api_user
            .clone()
            .unwrap_or_else(|| tenant.default_api_user_name());
        Some(msp.generate_managed_tenant_api_token(&tenant, &username).await?)
    } else {
        None
    };

    msp.provision_cdfmc(&tenant, tenant_token.as_deref(), args.wait_for_cdfmc)
        .await?;
    if args.wait_for_cdfmc {
        println!("cdFMC is active in {}", tenant.label());
    } else {
        println!("cdFMC provisioning started in {}", tenant.label());
    }

    if let (true, Some(token)) = (args.create_default_policy, tenant_token.as_deref()) {
        let tenant_client = session.client.with_token(token);
        let cdfmc = CdFmcApiService::connect(&tenant_client).await?;
        let policy_id = cdfmc.create_default_access_policy().await?;
        cdfmc.block_gambling(&policy_id).await?;
        info!("Default access policy {} ready in domain {}", policy_id, cdfmc.domain_uid());
        println!("Created default access policy (UID: {}) blocking gambling", policy_id);
    }

    Ok(())
}
