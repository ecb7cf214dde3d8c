use aws_config::{meta::region::RegionProviderChain, Region, SdkConfig};
use log::info;

pub const DEFAULT_REGION: &str = "us-east-1";

/// Loads the shared SDK configuration. An explicit region wins over the
/// default provider chain (`AWS_REGION`, profile), which wins over `us-east-1`.
pub async fn load_sdk_config(region: Option<&str>) -> SdkConfig {
    let region_provider = match region {
        Some(region) => RegionProviderChain::first_try(Region::new(region.to_string()))
            .or_default_provider()
            .or_else(DEFAULT_REGION),
        None => RegionProviderChain::default_provider().or_else(DEFAULT_REGION),
    };

    let config = aws_config::from_env().region(region_provider).load().await;
    info!(
        "Using AWS region {}",
        config
            .region()
            .map(|r| r.as_ref().to_string())
            .unwrap_or_else(|| DEFAULT_REGION.to_string())
    );
    config
}
