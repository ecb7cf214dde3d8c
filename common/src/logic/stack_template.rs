use frontend_defs::{PluginConfiguration, StackDescriptor, TemplateMode};
use frontend_utils::to_parameter_key;
use indexmap::IndexMap;

const BUCKET_TEMPLATE: &str = include_str!("../../templates/bucket.yml");
const CLOUDFRONT_TEMPLATE: &str = include_str!("../../templates/cloudfront.yml");
const CLOUDFRONT_SECURITY_HEADERS_TEMPLATE: &str =
    include_str!("../../templates/cloudfront-security-headers.yml");

pub fn select_template(mode: TemplateMode, security_headers: bool) -> &'static str {
    match (mode, security_headers) {
        (TemplateMode::Bucket, _) => BUCKET_TEMPLATE,
        (TemplateMode::Cloudfront, false) => CLOUDFRONT_TEMPLATE,
        (TemplateMode::Cloudfront, true) => CLOUDFRONT_SECURITY_HEADERS_TEMPLATE,
    }
}

/// Builds the stack for the configured deploy target.
///
/// Parameters keep a fixed order; security header knobs follow the base
/// parameters, keyed by their PascalCased name.
pub fn build_stack_descriptor(config: &PluginConfiguration) -> StackDescriptor {
    let deploy = &config.deploy;

    let mut parameters = IndexMap::new();
    parameters.insert("Stage".to_string(), config.stage.clone());
    parameters.insert("ServiceName".to_string(), config.service.clone());
    parameters.insert("BucketName".to_string(), deploy.bucket.name.clone());
    parameters.insert(
        "IndexDocument".to_string(),
        deploy.bucket.index_document.clone(),
    );
    parameters.insert(
        "ErrorDocument".to_string(),
        deploy.bucket.error_document.clone(),
    );
    parameters.insert("DnsName".to_string(), deploy.distribution.dns_name.clone());
    parameters.insert(
        "AltDnsName".to_string(),
        deploy.distribution.alt_dns_name.clone(),
    );
    parameters.insert(
        "AcmCertificateArn".to_string(),
        deploy.distribution.acm_certificate_arn.clone(),
    );
    parameters.insert(
        "HostedZoneName".to_string(),
        deploy.distribution.hosted_zone_name.clone(),
    );

    if let Some(headers) = &deploy.security_headers {
        for (knob, value) in &headers.knobs {
            parameters.insert(to_parameter_key(knob), value.clone());
        }
    }

    StackDescriptor {
        name: config.stack_name.clone(),
        template_body: select_template(deploy.mode, deploy.security_headers.is_some())
            .to_string(),
        parameters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_service_definition, resolve_config};
    use pretty_assertions::assert_eq;

    fn config(yaml: &str) -> PluginConfiguration {
        resolve_config(&parse_service_definition(yaml).unwrap(), None, None).unwrap()
    }

    #[test]
    fn test_base_parameters_in_order() {
        let descriptor = build_stack_descriptor(&config(
            r#"
service: shop
provider:
  stage: prod
custom:
  serverless-frontend-plugin:
    deploy:
      distribution:
        dnsName: shop.example.com
        acmCertificateArn: arn:aws:acm:us-east-1:123456789012:certificate/abc
"#,
        ));

        assert_eq!(descriptor.name, "shop-prod-frontend");
        assert_eq!(
            descriptor.parameters.keys().collect::<Vec<_>>(),
            vec![
                "Stage",
                "ServiceName",
                "BucketName",
                "IndexDocument",
                "ErrorDocument",
                "DnsName",
                "AltDnsName",
                "AcmCertificateArn",
                "HostedZoneName",
            ]
        );
        assert_eq!(descriptor.parameters["Stage"], "prod");
        assert_eq!(descriptor.parameters["BucketName"], "shop-prod-frontend");
        assert_eq!(descriptor.parameters["HostedZoneName"], "shop.example.com");
        assert_eq!(descriptor.parameters["AltDnsName"], "");
        assert_eq!(descriptor.template_body, CLOUDFRONT_TEMPLATE);
    }

    #[test]
    fn test_security_header_parameters_are_appended() {
        let descriptor = build_stack_descriptor(&config(
            r#"
service: shop
custom:
  serverless-frontend-plugin:
    deploy:
      securityHeaders:
        frameOptions: SAMEORIGIN
        contentSecurityPolicy: false
"#,
        ));

        let keys = descriptor.parameters.keys().collect::<Vec<_>>();
        assert_eq!(keys.len(), 18);
        assert_eq!(keys[9], "ContentSecurityPolicy");
        assert_eq!(keys[17], "XssProtection");
        assert_eq!(descriptor.parameters["FrameOptions"], "SAMEORIGIN");
        assert_eq!(descriptor.parameters["ContentSecurityPolicy"], "");
        assert_eq!(
            descriptor.parameters["StrictTransportSecurityMaxAge"],
            "31536000"
        );
        assert_eq!(descriptor.template_body, CLOUDFRONT_SECURITY_HEADERS_TEMPLATE);
    }

    #[test]
    fn test_bucket_mode_template() {
        let descriptor = build_stack_descriptor(&config(
            "service: shop\ncustom:\n  serverless-frontend-plugin:\n    deploy:\n      mode: bucket\n",
        ));
        assert_eq!(descriptor.template_body, BUCKET_TEMPLATE);
        assert_eq!(descriptor.parameters.len(), 9);
    }

    #[test]
    fn test_templates_declare_every_parameter() {
        let deploy_blocks = [
            "mode: bucket",
            "mode: cloudfront",
            "securityHeaders: {}",
        ];
        for block in deploy_blocks {
            let descriptor = build_stack_descriptor(&config(&format!(
                "service: shop\ncustom:\n  serverless-frontend-plugin:\n    deploy:\n      {}\n",
                block
            )));
            for key in descriptor.parameters.keys() {
                assert!(
                    descriptor
                        .template_body
                        .contains(&format!("  {}:\n    Type: String", key)),
                    "template for '{}' does not declare {}",
                    block,
                    key
                );
            }
        }
    }
}
