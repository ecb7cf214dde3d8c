use anyhow::Result;
use frontend_common::{logic::DevServer, HookOutcome};
use log::info;

use super::{load_plugin, Context};

pub async fn handle_offline(context: &Context) -> Result<()> {
    let plugin = load_plugin(context).await?;
    match plugin.run_hook("before:offline:start:init").await? {
        HookOutcome::DevServerStarted(server) => supervise(server).await,
        HookOutcome::Completed => Ok(()),
    }
}

/// Waits for Ctrl-C or for the dev command to exit by itself.
pub(super) async fn supervise(mut server: DevServer) -> Result<()> {
    info!("{} is running, press Ctrl-C to stop", server.command());
    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Stopping {}", server.command());
            server.stop().await?;
            Ok(())
        }
        exit = server.wait() => {
            exit?;
            info!("{} exited", server.command());
            Ok(())
        }
    }
}
