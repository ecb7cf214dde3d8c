mod asset;
mod config;
mod errors;
mod provider;
mod stack;
mod storage;

pub use asset::{
    is_html_key, AssetRecord, ASSET_CACHE_MAX_AGE_SECONDS, HTML_CACHE_MAX_AGE_SECONDS,
};
pub use config::{
    BucketConfig, CommandSpec, DeployConfig, DistributionConfig, HeaderSetting,
    PluginConfiguration, RawBucketConfig, RawCommandConfig, RawDeployConfig,
    RawDistributionConfig, RawFrontendConfig, SecurityHeaders, TemplateMode,
};
pub use errors::{BackendError, FrontendError, NO_UPDATES_MESSAGE};
pub use provider::{ObjectStorage, StackBackend};
pub use stack::{
    is_failure_status, StackDescriptor, StackOutput, StackPhase, StackRecord, StackStatus,
};
pub use storage::{DeletionBatch, ObjectListing};
