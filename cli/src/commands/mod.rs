mod hooks;
mod lifecycle;
mod offline;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context as _, Result};
use frontend_aws::{load_sdk_config, CloudFormationBackend, S3Storage};
use frontend_common::{load_service_file, resolve_config, FrontendPlugin};
use log::debug;

pub use hooks::handle_hooks;
pub use lifecycle::{handle_deploy, handle_invoke, handle_package, handle_remove};
pub use offline::handle_offline;

/// Options shared by every subcommand.
pub struct Context {
    pub config_path: PathBuf,
    pub stage: Option<String>,
    pub region: Option<String>,
}

/// Resolves the configuration and creates the AWS clients once for the whole run.
///
/// Relative paths in the service file are taken from the directory holding it.
pub async fn load_plugin(context: &Context) -> Result<FrontendPlugin> {
    let definition = load_service_file(&context.config_path)
        .with_context(|| format!("Failed to load {}", context.config_path.display()))?;
    let config = resolve_config(
        &definition,
        context.stage.as_deref(),
        context.region.as_deref(),
    )?;

    if let Some(service_dir) = context
        .config_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
    {
        debug!("Working from {}", service_dir.display());
        std::env::set_current_dir(service_dir)
            .with_context(|| format!("Failed to enter {}", service_dir.display()))?;
    }

    let sdk_config = load_sdk_config(config.region.as_deref()).await;
    Ok(FrontendPlugin::new(
        config,
        Arc::new(CloudFormationBackend::new(&sdk_config)),
        Arc::new(S3Storage::new(&sdk_config)),
    ))
}
