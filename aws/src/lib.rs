mod cloudformation;
mod s3;
mod utils;

pub use cloudformation::CloudFormationBackend;
pub use s3::S3Storage;
pub use utils::{load_sdk_config, DEFAULT_REGION};
