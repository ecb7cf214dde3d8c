use std::sync::Arc;

use frontend_defs::{FrontendError, ObjectStorage, PluginConfiguration, StackBackend};
use log::{info, warn};

use crate::logic::{
    build_stack_descriptor, run_command, spawn_command, AssetSynchronizer, BucketPurge,
    DevServer, StackConvergence,
};

/// Plugin step a lifecycle hook maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Build,
    Deploy,
    Remove,
    Offline,
}

/// Lifecycle hook names of the host tool, in registration order.
pub const HOOKS: &[(&str, Hook)] = &[
    ("before:package:finalize", Hook::Build),
    ("before:deploy:deploy", Hook::Deploy),
    ("before:remove:remove", Hook::Remove),
    ("before:offline:start", Hook::Offline),
    ("before:offline:start:init", Hook::Offline),
];

pub fn hook_for(name: &str) -> Option<Hook> {
    HOOKS
        .iter()
        .find(|(hook_name, _)| *hook_name == name)
        .map(|(_, hook)| *hook)
}

pub enum HookOutcome {
    Completed,
    /// The dev command keeps running; the caller decides when to stop it.
    DevServerStarted(DevServer),
}

impl std::fmt::Debug for HookOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookOutcome::Completed => write!(f, "Completed"),
            HookOutcome::DevServerStarted(server) => {
                write!(f, "DevServerStarted({})", server.command())
            }
        }
    }
}

/// Wires the configuration and the backend clients into the lifecycle hooks.
///
/// Clients are created once by the caller and shared by every hook.
pub struct FrontendPlugin {
    config: PluginConfiguration,
    convergence: StackConvergence,
    assets: AssetSynchronizer,
    purge: BucketPurge,
}

impl FrontendPlugin {
    pub fn new(
        config: PluginConfiguration,
        stack_backend: Arc<dyn StackBackend>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        let convergence = StackConvergence::new(stack_backend)
            .with_poll_interval(config.deploy.poll_interval)
            .with_max_poll_attempts(config.deploy.max_poll_attempts);
        let assets = AssetSynchronizer::new(storage.clone(), config.deploy.mime_types.clone());
        let purge = BucketPurge::new(storage);

        FrontendPlugin {
            config,
            convergence,
            assets,
            purge,
        }
    }

    pub fn config(&self) -> &PluginConfiguration {
        &self.config
    }

    pub fn hooks(&self) -> &'static [(&'static str, Hook)] {
        HOOKS
    }

    pub async fn run_hook(&self, name: &str) -> Result<HookOutcome, FrontendError> {
        let hook = hook_for(name).ok_or_else(|| FrontendError::UnknownHook(name.to_string()))?;
        info!("Running {}", name);

        match hook {
            Hook::Build => self.build().await.map(|_| HookOutcome::Completed),
            Hook::Deploy => self.deploy().await.map(|_| HookOutcome::Completed),
            Hook::Remove => self.remove().await.map(|_| HookOutcome::Completed),
            Hook::Offline => self.offline().map(HookOutcome::DevServerStarted),
        }
    }

    /// Runs the build command, streaming its output into the log.
    pub async fn build(&self) -> Result<(), FrontendError> {
        let build = &self.config.build;
        info!("Building frontend using: {}", build.display());
        run_command(build, |line| info!("{}", line)).await?;
        info!("Frontend build finished");
        Ok(())
    }

    /// Converges the hosting stack, then uploads the build output.
    pub async fn deploy(&self) -> Result<usize, FrontendError> {
        let deploy = &self.config.deploy;

        if deploy.bucket.existing {
            info!(
                "Bucket {} is managed externally, skipping stack {}",
                deploy.bucket.name, self.config.stack_name
            );
        } else {
            let descriptor = build_stack_descriptor(&self.config);
            let record = self.convergence.converge(&descriptor).await?;
            for output in &record.outputs {
                info!("{}: {}", output.key, output.value);
            }
        }

        self.assets
            .sync(&deploy.bucket.name, &deploy.dist_dir)
            .await
    }

    /// Empties the bucket and deletes the hosting stack.
    pub async fn remove(&self) -> Result<(), FrontendError> {
        let bucket = &self.config.deploy.bucket;

        if bucket.existing {
            warn!(
                "Bucket {} is managed externally, leaving its objects in place",
                bucket.name
            );
        } else {
            self.purge.empty_bucket(&bucket.name).await?;
        }

        self.convergence.delete(&self.config.stack_name).await?;
        Ok(())
    }

    /// Starts the dev command without waiting for it to finish.
    pub fn offline(&self) -> Result<DevServer, FrontendError> {
        let offline = &self.config.offline;
        info!("Starting frontend using: {}", offline.display());
        spawn_command(offline)
    }
}
