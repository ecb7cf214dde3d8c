use async_trait::async_trait;

use crate::{AssetRecord, BackendError, DeletionBatch, ObjectListing, StackDescriptor, StackRecord};

/// Declarative infrastructure backend that owns the stacks.
#[async_trait]
pub trait StackBackend: Send + Sync {
    /// Returns the stack history for `name`, oldest first.
    async fn describe_stack(&self, name: &str) -> Result<Vec<StackRecord>, BackendError>;
    async fn create_stack(&self, descriptor: &StackDescriptor) -> Result<(), BackendError>;
    async fn update_stack(&self, descriptor: &StackDescriptor) -> Result<(), BackendError>;
    async fn delete_stack(&self, name: &str) -> Result<(), BackendError>;
}

/// Object storage holding the built frontend assets.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn head_bucket(&self, bucket: &str) -> Result<(), BackendError>;
    async fn put_object(&self, bucket: &str, asset: &AssetRecord) -> Result<(), BackendError>;
    async fn list_objects(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> Result<ObjectListing, BackendError>;
    async fn delete_objects(&self, bucket: &str, batch: &DeletionBatch)
        -> Result<(), BackendError>;
}
