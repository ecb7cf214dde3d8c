mod file;
mod logging;
mod mime;
mod string_utils;

pub use file::{collect_files, storage_key};
pub use logging::{log_level_from_env, setup_logging};
pub use mime::{lookup_mime, normalize_extension};
pub use string_utils::to_parameter_key;
