use async_trait::async_trait;
use aws_sdk_cloudformation::{
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    types::{Capability, Parameter, Stack},
    Client,
};
use aws_config::SdkConfig;
use frontend_defs::{BackendError, StackBackend, StackDescriptor, StackOutput, StackRecord};
use log::debug;

/// Stack backend on top of AWS CloudFormation.
#[derive(Clone)]
pub struct CloudFormationBackend {
    client: Client,
}

impl CloudFormationBackend {
    pub fn new(config: &SdkConfig) -> Self {
        CloudFormationBackend {
            client: Client::new(config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        CloudFormationBackend { client }
    }
}

#[async_trait]
impl StackBackend for CloudFormationBackend {
    async fn describe_stack(&self, name: &str) -> Result<Vec<StackRecord>, BackendError> {
        let output = self
            .client
            .describe_stacks()
            .stack_name(name)
            .send()
            .await
            .map_err(|e| missing_stack(map_sdk_error(e), name))?;

        Ok(output.stacks().iter().map(to_stack_record).collect())
    }

    async fn create_stack(&self, descriptor: &StackDescriptor) -> Result<(), BackendError> {
        debug!("CreateStack {}", descriptor.name);
        self.client
            .create_stack()
            .stack_name(&descriptor.name)
            .template_body(&descriptor.template_body)
            .set_parameters(Some(to_parameters(descriptor)))
            .capabilities(Capability::CapabilityIam)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn update_stack(&self, descriptor: &StackDescriptor) -> Result<(), BackendError> {
        debug!("UpdateStack {}", descriptor.name);
        self.client
            .update_stack()
            .stack_name(&descriptor.name)
            .template_body(&descriptor.template_body)
            .set_parameters(Some(to_parameters(descriptor)))
            .capabilities(Capability::CapabilityIam)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn delete_stack(&self, name: &str) -> Result<(), BackendError> {
        debug!("DeleteStack {}", name);
        self.client
            .delete_stack()
            .stack_name(name)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }
}

fn to_parameters(descriptor: &StackDescriptor) -> Vec<Parameter> {
    descriptor
        .parameters
        .iter()
        .map(|(key, value)| {
            Parameter::builder()
                .parameter_key(key)
                .parameter_value(value)
                .build()
        })
        .collect()
}

fn to_stack_record(stack: &Stack) -> StackRecord {
    StackRecord {
        name: stack.stack_name().unwrap_or_default().to_string(),
        status: stack.stack_status().map(|s| s.as_str().to_string()),
        status_reason: stack.stack_status_reason().map(str::to_string),
        outputs: stack
            .outputs()
            .iter()
            .filter_map(|o| {
                Some(StackOutput {
                    key: o.output_key()?.to_string(),
                    value: o.output_value().unwrap_or_default().to_string(),
                })
            })
            .collect(),
    }
}

fn map_sdk_error<E>(err: SdkError<E>) -> BackendError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match err.as_service_error() {
        Some(service_err) => BackendError::service(
            service_err.code().unwrap_or("Unknown"),
            service_err.message().unwrap_or_default(),
        ),
        None => BackendError::service("Dispatch", DisplayErrorContext(&err).to_string()),
    }
}

// DescribeStacks reports a missing stack as "Stack with id <name> does not exist"
fn missing_stack(err: BackendError, stack_name: &str) -> BackendError {
    let names_missing_stack = matches!(
        &err,
        BackendError::Service { message, .. }
            if message.contains("does not exist") && message.contains(stack_name)
    );
    if names_missing_stack {
        BackendError::NotFound(format!("Stack {}", stack_name))
    } else {
        err
    }
}
