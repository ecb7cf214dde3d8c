use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    sync::Mutex,
};

use async_trait::async_trait;
use frontend_defs::{
    AssetRecord, BackendError, DeletionBatch, ObjectListing, ObjectStorage, StackBackend,
    StackDescriptor, StackRecord,
};
use mockall::mock;

mock! {
    pub StackBackend {}

    #[async_trait]
    impl StackBackend for StackBackend {
        async fn describe_stack(&self, name: &str) -> Result<Vec<StackRecord>, BackendError>;
        async fn create_stack(&self, descriptor: &StackDescriptor) -> Result<(), BackendError>;
        async fn update_stack(&self, descriptor: &StackDescriptor) -> Result<(), BackendError>;
        async fn delete_stack(&self, name: &str) -> Result<(), BackendError>;
    }
}

pub fn record(status: &str, reason: Option<&str>) -> StackRecord {
    StackRecord {
        name: "shop-dev-frontend".to_string(),
        status: Some(status.to_string()),
        status_reason: reason.map(str::to_string),
        outputs: vec![],
    }
}

/// Answers successive describe calls with the given responses, in order.
pub fn scripted(
    responses: Vec<Result<Vec<StackRecord>, BackendError>>,
) -> impl FnMut(&str) -> Result<Vec<StackRecord>, BackendError> + Send + 'static {
    let mut responses = VecDeque::from(responses);
    move |_| {
        responses
            .pop_front()
            .expect("describe_stack called more often than scripted")
    }
}

/// In-memory buckets with paged listings, recording every call.
pub struct MemoryStorage {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    buckets: BTreeMap<String, BTreeSet<String>>,
    page_size: usize,
    fail_upload_key: Option<String>,
    uploads: Vec<AssetRecord>,
    list_calls: Vec<Option<String>>,
    delete_calls: Vec<Vec<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage {
            state: Mutex::new(MemoryState {
                page_size: 1000,
                ..Default::default()
            }),
        }
    }

    pub fn with_bucket(self, bucket: &str, keys: &[&str]) -> Self {
        self.state.lock().unwrap().buckets.insert(
            bucket.to_string(),
            keys.iter().map(|k| k.to_string()).collect(),
        );
        self
    }

    pub fn with_page_size(self, page_size: usize) -> Self {
        self.state.lock().unwrap().page_size = page_size;
        self
    }

    pub fn failing_upload(self, key: &str) -> Self {
        self.state.lock().unwrap().fail_upload_key = Some(key.to_string());
        self
    }

    pub fn uploads(&self) -> Vec<AssetRecord> {
        self.state.lock().unwrap().uploads.clone()
    }

    pub fn list_calls(&self) -> Vec<Option<String>> {
        self.state.lock().unwrap().list_calls.clone()
    }

    pub fn delete_calls(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().delete_calls.clone()
    }

    pub fn objects(&self, bucket: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .buckets
            .get(bucket)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn head_bucket(&self, bucket: &str) -> Result<(), BackendError> {
        if self.state.lock().unwrap().buckets.contains_key(bucket) {
            Ok(())
        } else {
            Err(BackendError::NotFound(format!("Bucket {}", bucket)))
        }
    }

    async fn put_object(&self, bucket: &str, asset: &AssetRecord) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_upload_key.as_deref() == Some(asset.storage_key.as_str()) {
            return Err(BackendError::service("AccessDenied", "Access Denied"));
        }
        state
            .buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(asset.storage_key.clone());
        state.uploads.push(asset.clone());
        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> Result<ObjectListing, BackendError> {
        let mut state = self.state.lock().unwrap();
        state.list_calls.push(continuation_token.map(str::to_string));
        let page_size = state.page_size;
        let keys = state
            .buckets
            .get(bucket)
            .ok_or_else(|| BackendError::NotFound(format!("Bucket {}", bucket)))?;

        // The cursor is the last key handed out
        let remaining = keys
            .iter()
            .filter(|k| continuation_token.map_or(true, |token| k.as_str() > token))
            .cloned()
            .collect::<Vec<_>>();
        let page = remaining.iter().take(page_size).cloned().collect::<Vec<_>>();
        let is_truncated = remaining.len() > page.len();

        Ok(ObjectListing {
            next_continuation_token: if is_truncated { page.last().cloned() } else { None },
            keys: page,
            is_truncated,
        })
    }

    async fn delete_objects(
        &self,
        bucket: &str,
        batch: &DeletionBatch,
    ) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        state.delete_calls.push(batch.object_keys.clone());
        if let Some(keys) = state.buckets.get_mut(bucket) {
            for key in &batch.object_keys {
                keys.remove(key);
            }
        }
        Ok(())
    }
}
