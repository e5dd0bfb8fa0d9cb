use anyhow::{Context, Result};
use clap::Parser;
use tokio::runtime::Builder;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use scc_toolkit::cli::{Cli, Commands};
use scc_toolkit::commands::{self, Session};
use scc_toolkit::config::CredentialsService;
use scc_toolkit::services::TokenValidationService;
use scc_toolkit::transaction::PollSettings;

fn main() -> Result<()> {
    // Workflows are sequential; a couple of workers is plenty for one
    // request plus the signal handler
    let runtime = Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    // Logs go to stderr so they never interleave with tables on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let poll = PollSettings {
        interval: cli.poll_interval(),
        timeout: cli.transaction_timeout(),
        cancel,
    };
    debug!(
        "Polling every {:?}, transaction timeout {:?}",
        poll.interval, poll.timeout
    );

    let credentials = CredentialsService::new(cli.region, cli.api_token.clone(), cli.base_url.clone())?
        .load_or_prompt_credentials(&TokenValidationService::new(cli.http_timeout()))
        .await?;
    let session = Session::new(credentials, cli.http_timeout(), poll)?;

    match &cli.command {
        Commands::OnboardFtds(args) => commands::onboard::run(&session, args).await?,
        Commands::ProvisionTenant(args) => commands::tenant::run(&session, args).await?,
        Commands::UpgradeFtd(command) => commands::upgrade::run_ftd(&session, command).await?,
        Commands::UpgradeAsa(command) => commands::upgrade::run_asa(&session, command).await?,
        Commands::ObjectGroup(command) => commands::object_group::run(&session, command).await?,
        Commands::Credentials { reveal } => {
            commands::credentials::run(&session.credentials, *reveal)
        }
    }

    Ok(())
}

/// First Ctrl-C stops any transaction wait, a second one exits immediately
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("Interrupted, no longer waiting for transactions (press Ctrl-C again to quit)");
        cancel.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });
}
