use std::sync::Arc;

use frontend_defs::{DeletionBatch, FrontendError, ObjectStorage};
use log::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeSummary {
    pub pages: usize,
    pub deleted: usize,
}

/// Empties a bucket page by page so the stack owning it can be deleted.
#[derive(Clone)]
pub struct BucketPurge {
    storage: Arc<dyn ObjectStorage>,
}

impl BucketPurge {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        BucketPurge { storage }
    }

    /// Existence probe, any backend error counts as "does not exist".
    pub async fn bucket_exists(&self, bucket: &str) -> bool {
        match self.storage.head_bucket(bucket).await {
            Ok(()) => true,
            Err(e) => {
                debug!("Bucket {} treated as absent: {}", bucket, e);
                false
            }
        }
    }

    /// Deletes every object in `bucket`. A missing bucket is a no-op.
    ///
    /// Keeps listing while the previous page was truncated and returned a cursor.
    pub async fn empty_bucket(&self, bucket: &str) -> Result<PurgeSummary, FrontendError> {
        let mut summary = PurgeSummary::default();
        if !self.bucket_exists(bucket).await {
            info!("Bucket {} does not exist, nothing to empty", bucket);
            return Ok(summary);
        }

        let mut continuation_token: Option<String> = None;
        loop {
            let listing = self
                .storage
                .list_objects(bucket, continuation_token.as_deref())
                .await?;
            summary.pages += 1;

            let batch = DeletionBatch::from(listing);
            if !batch.object_keys.is_empty() {
                debug!(
                    "Deleting {} objects from bucket {} (page {})",
                    batch.object_keys.len(),
                    bucket,
                    summary.pages
                );
                self.storage
                    .delete_objects(bucket, &batch)
                    .await
                    .map_err(|source| FrontendError::Delete {
                        bucket: bucket.to_string(),
                        source,
                    })?;
                summary.deleted += batch.object_keys.len();
            }

            match batch.continuation_token {
                Some(token) => continuation_token = Some(token),
                None => break,
            }
        }

        info!(
            "Deleted {} objects from bucket {}",
            summary.deleted, bucket
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::test_utils::MemoryStorage;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_two_pages_are_listed_and_deleted_once() {
        let storage = Arc::new(
            MemoryStorage::new()
                .with_bucket("shop-bucket", &["a.js", "b.js", "c.css", "index.html"])
                .with_page_size(2),
        );
        let purge = BucketPurge::new(storage.clone());

        let summary = purge.empty_bucket("shop-bucket").await.unwrap();

        assert_eq!(summary, PurgeSummary { pages: 2, deleted: 4 });
        assert_eq!(
            storage.list_calls(),
            vec![None, Some("b.js".to_string())]
        );
        assert_eq!(
            storage.delete_calls(),
            vec![
                vec!["a.js".to_string(), "b.js".to_string()],
                vec!["c.css".to_string(), "index.html".to_string()],
            ]
        );
        assert!(storage.objects("shop-bucket").is_empty());
    }

    #[tokio::test]
    async fn test_missing_bucket_is_noop() {
        let storage = Arc::new(MemoryStorage::new());
        let purge = BucketPurge::new(storage.clone());

        let summary = purge.empty_bucket("missing-bucket").await.unwrap();

        assert_eq!(summary, PurgeSummary::default());
        assert!(storage.list_calls().is_empty());
        assert!(storage.delete_calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_bucket_lists_once_without_delete() {
        let storage = Arc::new(MemoryStorage::new().with_bucket("shop-bucket", &[]));
        let purge = BucketPurge::new(storage.clone());

        let summary = purge.empty_bucket("shop-bucket").await.unwrap();

        assert_eq!(summary, PurgeSummary { pages: 1, deleted: 0 });
        assert!(storage.delete_calls().is_empty());
    }

    #[tokio::test]
    async fn test_single_page_stops_after_one_listing() {
        let storage = Arc::new(
            MemoryStorage::new().with_bucket("shop-bucket", &["a.js", "b.js"]),
        );
        let purge = BucketPurge::new(storage.clone());

        let summary = purge.empty_bucket("shop-bucket").await.unwrap();

        assert_eq!(summary, PurgeSummary { pages: 1, deleted: 2 });
        assert_eq!(storage.list_calls(), vec![None]);
    }
}
