use std::env;

use chrono::Local;
use log::LevelFilter;

/// Resolves the level from `LOG_LEVEL`, falling back to `default` when unset or unrecognized.
pub fn log_level_from_env(default: LevelFilter) -> LevelFilter {
    parse_level(env::var("LOG_LEVEL").ok().as_deref()).unwrap_or(default)
}

fn parse_level(value: Option<&str>) -> Option<LevelFilter> {
    match value.map(|v| v.to_lowercase()).as_deref() {
        Some("error") => Some(LevelFilter::Error),
        Some("warn") => Some(LevelFilter::Warn),
        Some("info") => Some(LevelFilter::Info),
        Some("debug") => Some(LevelFilter::Debug),
        Some("trace") => Some(LevelFilter::Trace),
        _ => None,
    }
}

pub fn setup_logging(level: LevelFilter) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}] {}: {}",
                Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        // The AWS SDK is very chatty on debug
        .level_for("aws_config", LevelFilter::Warn)
        .level_for("aws_smithy_runtime", LevelFilter::Warn)
        .level_for("hyper", LevelFilter::Warn)
        .chain(std::io::stderr())
        .apply()?;

    Ok(())
}
