use std::path::Path;

use anyhow::Context;
use dockhand_core::DeployConfig;
use dockhand_machine::{CommandExecutor, ComposeClient, MachineClient, ProgressSink};

use crate::status::{StatusLine, TermProgress};

/// Execute the full pipeline: build → push → pull → up.
pub async fn deploy() -> anyhow::Result<()> {
    let mut status = StatusLine::new();
    match run(&mut status).await {
        Ok(()) => {
            status.succeed("Done");
            Ok(())
        }
        Err(e) => {
            // Concise verdict here; main's return dumps the full chain.
            status.fail(&e.to_string());
            Err(e)
        }
    }
}

async fn run(status: &mut StatusLine) -> anyhow::Result<()> {
    status.start("Parsing config file...");
    let config = DeployConfig::load(Path::new("."))?;
    status.succeed("Config file read successfully.");
    tracing::debug!(config = ?config, "configuration");

    let machine = MachineClient::new();
    let compose = ComposeClient::new(&config);
    let mut progress = TermProgress::new();

    run_pipeline(&machine, &compose, &config, status, &mut progress).await
}

/// The four stages, strictly in order, aborting on the first failure.
/// Only pull and up receive the machine environment; build and push run
/// against the local engine.
async fn run_pipeline(
    machine: &MachineClient<impl CommandExecutor>,
    compose: &ComposeClient<impl CommandExecutor>,
    config: &DeployConfig,
    status: &mut StatusLine,
    progress: &mut dyn ProgressSink,
) -> anyhow::Result<()> {
    status.start(&format!("Reading env variables for [{}]...", config.machine));
    let env = machine.env(&config.machine).await?;
    status.succeed(&format!(
        "Found machine env variables for [{}].",
        config.machine
    ));
    tracing::debug!(env = ?env, "machine environment");

    status.start("Building...");
    compose
        .build(progress)
        .await
        .context("build stage failed")?;
    status.succeed("Build complete.");

    status.start("Pushing images...");
    compose.push().await.context("push stage failed")?;
    status.succeed("Images successfully pushed.");

    status.start(&format!("Pulling images on [{}]...", config.machine));
    compose.pull(&env).await.context("pull stage failed")?;
    status.succeed("Images pulled on the machine.");

    status.start("Starting services...");
    compose.up(&env).await.context("deploy stage failed")?;
    status.succeed("Services are up.");

    Ok(())
}
