//! Interactive session entry point
//!
//! 1. Verify the AWS CLI is installed and configured
//! 2. Load the stage configuration (a missing file starts a fresh store)
//! 3. Hand over to the command loop until the operator quits

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::Cli;
use crate::config::ConfigStore;
use crate::error::{ConfigError, LocusError, PreconditionError};
use crate::infrastructure::{aws, StdinPrompter, SystemRunner};
use crate::services::{DeployService, SessionService};
use crate::ui;

pub async fn execute(cli: Cli) -> Result<()> {
    println!("Locus config tool");

    let runner = SystemRunner::new(&cli.root).with_timeout(cli.step_timeout);

    if cli.skip_env_check {
        info!("Skipping AWS CLI check");
    } else if let Err(e) = aws::check_cloud_cli(&runner).await {
        let PreconditionError::CloudCliUnavailable { detail } = &e;
        debug!("AWS CLI check failed: {}", detail);
        return Err(LocusError::from(e).into());
    }

    let store = load_store(&cli)?;

    info!("Project root: {}", runner.root().display());
    let deploy = DeployService::new(runner, &cli.root);
    let mut session = SessionService::new(store, &cli.config, deploy, StdinPrompter::new());

    if !session.store().is_empty() {
        session.list_stages();
    }

    session
        .run()
        .await
        .map_err(LocusError::from)
        .context("Interactive session ended")?;
    Ok(())
}

fn load_store(cli: &Cli) -> Result<ConfigStore, LocusError> {
    match ConfigStore::load(&cli.config) {
        Ok(store) => {
            println!("Existing config found");
            Ok(store)
        }
        Err(ConfigError::NotFound { path }) => {
            println!("No existing config found");
            info!("Will create {} on write", path);
            Ok(ConfigStore::new())
        }
        Err(e) => {
            ui::print_error("Config file exists but could not be read; fix or remove it");
            Err(e.into())
        }
    }
}
