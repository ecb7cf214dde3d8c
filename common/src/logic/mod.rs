mod api_assets;
mod api_bucket;
mod api_stack;
mod command;
mod stack_template;

#[cfg(test)]
pub(crate) mod test_utils;

pub use api_assets::{build_asset_records, resolve_content_type, AssetSynchronizer};

pub use api_bucket::{BucketPurge, PurgeSummary};

pub use api_stack::{StackConvergence, DEFAULT_POLL_INTERVAL};

pub use command::{run_command, spawn_command, DevServer};

pub use stack_template::{build_stack_descriptor, select_template};
