mod plugin;

pub use plugin::{hook_for, FrontendPlugin, Hook, HookOutcome, HOOKS};
