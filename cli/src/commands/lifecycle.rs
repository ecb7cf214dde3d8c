use anyhow::{bail, Result};
use frontend_common::{FrontendPlugin, HookOutcome};
use log::info;

use super::{load_plugin, Context};

const PACKAGE_HOOKS: &[&str] = &["before:package:finalize"];
const DEPLOY_HOOKS: &[&str] = &["before:package:finalize", "before:deploy:deploy"];
const REMOVE_HOOKS: &[&str] = &["before:remove:remove"];

async fn run_lifecycle(plugin: &FrontendPlugin, hooks: &[&str]) -> Result<()> {
    for hook in hooks {
        if let HookOutcome::DevServerStarted(server) = plugin.run_hook(hook).await? {
            server.stop().await?;
            bail!("Hook {} started a long running command", hook);
        }
    }
    Ok(())
}

pub async fn handle_package(context: &Context) -> Result<()> {
    let plugin = load_plugin(context).await?;
    run_lifecycle(&plugin, PACKAGE_HOOKS).await?;
    info!("Frontend packaged");
    Ok(())
}

pub async fn handle_deploy(context: &Context) -> Result<()> {
    let plugin = load_plugin(context).await?;
    run_lifecycle(&plugin, DEPLOY_HOOKS).await?;
    info!(
        "Frontend deployed to bucket {}",
        plugin.config().deploy.bucket.name
    );
    Ok(())
}

pub async fn handle_remove(context: &Context) -> Result<()> {
    let plugin = load_plugin(context).await?;
    run_lifecycle(&plugin, REMOVE_HOOKS).await?;
    info!("Frontend removed");
    Ok(())
}

/// Runs one hook; a dev server it starts is stopped again on Ctrl-C.
pub async fn handle_invoke(context: &Context, hook: &str) -> Result<()> {
    let plugin = load_plugin(context).await?;
    match plugin.run_hook(hook).await? {
        HookOutcome::Completed => Ok(()),
        HookOutcome::DevServerStarted(server) => super::offline::supervise(server).await,
    }
}
