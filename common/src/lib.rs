pub mod config;
pub mod interface;
pub mod logic;

pub use config::{load_service_file, parse_service_definition, resolve_config, ServiceDefinition};

pub use interface::{FrontendPlugin, Hook, HookOutcome, HOOKS};
