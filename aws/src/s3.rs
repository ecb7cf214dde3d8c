use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::{
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    operation::{
        delete_objects::DeleteObjectsOutput, head_bucket::HeadBucketError,
        list_objects_v2::{ListObjectsV2Error, ListObjectsV2Output},
    },
    primitives::ByteStream,
    types::{Delete, ObjectIdentifier},
    Client,
};
use frontend_defs::{AssetRecord, BackendError, DeletionBatch, ObjectListing, ObjectStorage};
use log::debug;

/// Object storage on top of Amazon S3.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
}

impl S3Storage {
    pub fn new(config: &SdkConfig) -> Self {
        S3Storage {
            client: Client::new(config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        S3Storage { client }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn head_bucket(&self, bucket: &str) -> Result<(), BackendError> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(()),
            Err(e) => Err(match e.as_service_error() {
                Some(service_err) => head_bucket_error(service_err, bucket),
                None => map_sdk_error(e),
            }),
        }
    }

    async fn put_object(&self, bucket: &str, asset: &AssetRecord) -> Result<(), BackendError> {
        let body = ByteStream::from_path(&asset.local_path)
            .await
            .map_err(|e| {
                BackendError::service(
                    "ReadError",
                    format!("{}: {}", asset.local_path.display(), e),
                )
            })?;

        debug!(
            "PutObject s3://{}/{} ({})",
            bucket,
            asset.storage_key,
            asset.content_type.as_deref().unwrap_or("no content type")
        );
        self.client
            .put_object()
            .bucket(bucket)
            .key(&asset.storage_key)
            .body(body)
            .set_content_type(asset.content_type.clone())
            .cache_control(asset.cache_control())
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> Result<ObjectListing, BackendError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .set_continuation_token(continuation_token.map(str::to_string))
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(service_err) => list_objects_error(service_err, bucket),
                None => map_sdk_error(e),
            })?;

        Ok(to_object_listing(&output))
    }

    async fn delete_objects(
        &self,
        bucket: &str,
        batch: &DeletionBatch,
    ) -> Result<(), BackendError> {
        let identifiers = batch
            .object_keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| BackendError::service("BuildError", e.to_string()))?;

        let delete = Delete::builder()
            .set_objects(Some(identifiers))
            .quiet(true)
            .build()
            .map_err(|e| BackendError::service("BuildError", e.to_string()))?;

        let output = self
            .client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(map_sdk_error)?;

        check_delete_errors(&output, batch.object_keys.len())
    }
}

fn to_object_listing(output: &ListObjectsV2Output) -> ObjectListing {
    ObjectListing {
        keys: output
            .contents()
            .iter()
            .filter_map(|o| o.key().map(str::to_string))
            .collect(),
        next_continuation_token: output.next_continuation_token().map(str::to_string),
        is_truncated: output.is_truncated().unwrap_or(false),
    }
}

// Quiet mode only reports the keys that could not be deleted
fn check_delete_errors(output: &DeleteObjectsOutput, requested: usize) -> Result<(), BackendError> {
    match output.errors().first() {
        Some(failed) => Err(BackendError::service(
            failed.code().unwrap_or("DeleteError"),
            format!(
                "{} of {} objects not deleted, first: {} ({})",
                output.errors().len(),
                requested,
                failed.key().unwrap_or_default(),
                failed.message().unwrap_or_default()
            ),
        )),
        None => Ok(()),
    }
}

fn head_bucket_error(err: &HeadBucketError, bucket: &str) -> BackendError {
    if err.is_not_found() {
        BackendError::NotFound(format!("Bucket {}", bucket))
    } else {
        service_error(err)
    }
}

fn list_objects_error(err: &ListObjectsV2Error, bucket: &str) -> BackendError {
    if err.is_no_such_bucket() {
        BackendError::NotFound(format!("Bucket {}", bucket))
    } else {
        service_error(err)
    }
}

fn service_error<E: ProvideErrorMetadata>(err: &E) -> BackendError {
    BackendError::service(
        err.code().unwrap_or("Unknown"),
        err.message().unwrap_or_default(),
    )
}

fn map_sdk_error<E>(err: SdkError<E>) -> BackendError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match err.as_service_error() {
        Some(service_err) => service_error(service_err),
        None => BackendError::service("Dispatch", DisplayErrorContext(&err).to_string()),
    }
}
