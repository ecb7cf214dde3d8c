use std::{collections::HashMap, path::Path, time::Duration};

use frontend_defs::{
    BucketConfig, CommandSpec, DeployConfig, DistributionConfig, FrontendError, HeaderSetting,
    PluginConfiguration, RawCommandConfig, RawFrontendConfig, SecurityHeaders, TemplateMode,
};
use frontend_utils::normalize_extension;
use indexmap::IndexMap;
use log::{debug, warn};
use serde::Deserialize;

/// Key of the plugin block below `custom` in the service file.
pub const PLUGIN_CONFIG_KEY: &str = "serverless-frontend-plugin";

pub const DEFAULT_STAGE: &str = "dev";
pub const DEFAULT_DIST_DIR: &str = "client/dist";
pub const DEFAULT_CLIENT_DIR: &str = "client";
pub const DEFAULT_INDEX_DOCUMENT: &str = "index.html";
pub const DEFAULT_ERROR_DOCUMENT: &str = "index.html";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;
const STACK_SUFFIX: &str = "frontend";

const DEFAULT_BUILD_COMMAND: &[&str] = &["npm", "run", "build"];
const DEFAULT_OFFLINE_COMMAND: &[&str] = &["npm", "run", "start"];

/// Header knobs in parameter order, with the value used when a knob is absent or `true`.
pub const SECURITY_HEADER_DEFAULTS: &[(&str, &str)] = &[
    ("contentSecurityPolicy", "default-src 'self'"),
    ("contentTypeOptions", "true"),
    ("frameOptions", "DENY"),
    ("referrerPolicy", "same-origin"),
    ("strictTransportSecurity", "true"),
    ("strictTransportSecurityMaxAge", "31536000"),
    ("strictTransportSecurityIncludeSubdomains", "true"),
    ("strictTransportSecurityPreload", "false"),
    ("xssProtection", "true"),
];

/// The parts of a service file the plugin reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceDefinition {
    pub service: String,
    pub stage: Option<String>,
    pub region: Option<String>,
    pub frontend: RawFrontendConfig,
}

#[derive(Deserialize)]
struct ServiceFile {
    service: ServiceName,
    provider: Option<ProviderSection>,
    custom: Option<HashMap<String, serde_yaml::Value>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ServiceName {
    Name(String),
    Object { name: String },
}

#[derive(Deserialize)]
struct ProviderSection {
    stage: Option<String>,
    region: Option<String>,
}

pub fn load_service_file(path: &Path) -> Result<ServiceDefinition, FrontendError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        FrontendError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
    })?;
    parse_service_definition(&content)
}

pub fn parse_service_definition(content: &str) -> Result<ServiceDefinition, FrontendError> {
    let file: ServiceFile = serde_yaml::from_str(content)
        .map_err(|e| FrontendError::InvalidConfig(format!("invalid service file: {}", e)))?;

    let service = match file.service {
        ServiceName::Name(name) => name,
        ServiceName::Object { name } => name,
    };

    let frontend = match file.custom.and_then(|mut c| c.remove(PLUGIN_CONFIG_KEY)) {
        Some(serde_yaml::Value::Null) | None => {
            debug!("No {} block found, using defaults", PLUGIN_CONFIG_KEY);
            RawFrontendConfig::default()
        }
        Some(value) => serde_yaml::from_value(value).map_err(|e| {
            FrontendError::InvalidConfig(format!("invalid {} block: {}", PLUGIN_CONFIG_KEY, e))
        })?,
    };

    let (stage, region) = match file.provider {
        Some(provider) => (provider.stage, provider.region),
        None => (None, None),
    };

    Ok(ServiceDefinition {
        service,
        stage,
        region,
        frontend,
    })
}

/// Merges the user settings with the documented defaults.
///
/// `stage` and `region` given on the command line win over the service file.
pub fn resolve_config(
    definition: &ServiceDefinition,
    stage: Option<&str>,
    region: Option<&str>,
) -> Result<PluginConfiguration, FrontendError> {
    if definition.service.trim().is_empty() {
        return Err(FrontendError::InvalidConfig(
            "service name must not be empty".to_string(),
        ));
    }

    let service = definition.service.clone();
    let stage = stage
        .map(str::to_string)
        .or_else(|| definition.stage.clone())
        .unwrap_or_else(|| DEFAULT_STAGE.to_string());
    let region = region
        .map(str::to_string)
        .or_else(|| definition.region.clone());

    let raw = &definition.frontend;
    let raw_deploy = raw.deploy.clone().unwrap_or_default();

    let mode = match raw_deploy.mode.as_deref() {
        Some(mode) => mode.parse::<TemplateMode>()?,
        None => TemplateMode::Cloudfront,
    };

    let default_name = default_resource_name(&service, &stage);
    let stack_name = raw.stack_name.clone().unwrap_or_else(|| default_name.clone());

    let raw_bucket = raw_deploy.bucket.clone().unwrap_or_default();
    let bucket = BucketConfig {
        name: raw_bucket
            .name
            .unwrap_or_else(|| default_name.to_lowercase()),
        existing: raw_bucket.existing.unwrap_or(false),
        index_document: raw_bucket
            .index_document
            .unwrap_or_else(|| DEFAULT_INDEX_DOCUMENT.to_string()),
        error_document: raw_bucket
            .error_document
            .unwrap_or_else(|| DEFAULT_ERROR_DOCUMENT.to_string()),
    };

    let raw_distribution = raw_deploy.distribution.clone().unwrap_or_default();
    let dns_name = raw_distribution.dns_name.unwrap_or_default();
    let distribution = DistributionConfig {
        hosted_zone_name: raw_distribution
            .hosted_zone_name
            .unwrap_or_else(|| dns_name.clone()),
        alt_dns_name: raw_distribution.alt_dns_name.unwrap_or_default(),
        acm_certificate_arn: raw_distribution.acm_certificate_arn.unwrap_or_default(),
        dns_name,
    };

    if mode == TemplateMode::Cloudfront
        && !distribution.dns_name.is_empty()
        && distribution.acm_certificate_arn.is_empty()
    {
        return Err(FrontendError::InvalidConfig(format!(
            "dnsName {} requires an acmCertificateArn",
            distribution.dns_name
        )));
    }

    let mime_types = raw_deploy
        .mime_types
        .clone()
        .unwrap_or_default()
        .into_iter()
        .map(|(ext, mime)| (normalize_extension(&ext), mime))
        .collect::<IndexMap<_, _>>();

    let security_headers = match raw_deploy.security_headers.as_ref() {
        Some(_) if mode == TemplateMode::Bucket => {
            warn!("securityHeaders are ignored in bucket mode, they need a distribution");
            None
        }
        Some(settings) => Some(resolve_security_headers(settings)?),
        None => None,
    };

    let dist_dir = raw_deploy
        .dist_dir
        .clone()
        .or_else(|| raw.dist_dir.clone())
        .unwrap_or_else(|| DEFAULT_DIST_DIR.to_string());

    let deploy = DeployConfig {
        dist_dir: dist_dir.into(),
        mode,
        bucket,
        distribution,
        mime_types,
        security_headers,
        poll_interval: Duration::from_millis(
            raw_deploy.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS),
        ),
        max_poll_attempts: raw_deploy.max_poll_attempts,
    };

    Ok(PluginConfiguration {
        build: resolve_command(raw.build.as_ref(), DEFAULT_BUILD_COMMAND, "build")?,
        offline: resolve_command(raw.offline.as_ref(), DEFAULT_OFFLINE_COMMAND, "offline")?,
        service,
        stage,
        region,
        stack_name,
        deploy,
    })
}

fn resolve_command(
    raw: Option<&RawCommandConfig>,
    default_command: &[&str],
    section: &str,
) -> Result<CommandSpec, FrontendError> {
    let raw = raw.cloned().unwrap_or_default();

    let command = raw
        .command
        .unwrap_or_else(|| default_command.iter().map(|s| s.to_string()).collect());
    let (program, args) = match command.split_first() {
        Some((program, args)) if !program.trim().is_empty() => (program.clone(), args.to_vec()),
        _ => {
            return Err(FrontendError::InvalidConfig(format!(
                "{}.command must name a program",
                section
            )))
        }
    };

    Ok(CommandSpec {
        program,
        args,
        cwd: raw
            .cwd_dir
            .unwrap_or_else(|| DEFAULT_CLIENT_DIR.to_string())
            .into(),
        env: raw.env.unwrap_or_default(),
    })
}

fn resolve_security_headers(
    settings: &IndexMap<String, HeaderSetting>,
) -> Result<SecurityHeaders, FrontendError> {
    if let Some(unknown) = settings
        .keys()
        .find(|k| !SECURITY_HEADER_DEFAULTS.iter().any(|(knob, _)| *knob == k.as_str()))
    {
        return Err(FrontendError::InvalidConfig(format!(
            "unknown security header setting '{}'",
            unknown
        )));
    }

    let knobs = SECURITY_HEADER_DEFAULTS
        .iter()
        .map(|(knob, default)| {
            let value = match settings.get(*knob) {
                None | Some(HeaderSetting::Toggle(true)) => default.to_string(),
                Some(HeaderSetting::Toggle(false)) => String::new(),
                Some(HeaderSetting::Number(n)) => n.to_string(),
                Some(HeaderSetting::Value(v)) => v.clone(),
            };
            (knob.to_string(), value)
        })
        .collect();

    Ok(SecurityHeaders { knobs })
}

/// `<service>-<stage>-frontend`, restricted to characters valid in a stack name.
pub fn default_resource_name(service: &str, stage: &str) -> String {
    format!("{}-{}-{}", service, stage, STACK_SUFFIX)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}
