use std::{path::Path, sync::Arc};

use frontend_defs::{
    is_html_key, AssetRecord, FrontendError, ObjectStorage, ASSET_CACHE_MAX_AGE_SECONDS,
    HTML_CACHE_MAX_AGE_SECONDS,
};
use frontend_utils::{collect_files, lookup_mime, normalize_extension, storage_key};
use futures::future::try_join_all;
use indexmap::IndexMap;
use log::{debug, info};

const HTML_CONTENT_TYPE: &str = "text/html";

/// Uploads a build output directory to a bucket.
#[derive(Clone)]
pub struct AssetSynchronizer {
    storage: Arc<dyn ObjectStorage>,
    mime_overrides: IndexMap<String, String>,
}

impl AssetSynchronizer {
    /// `mime_overrides` maps lowercased extensions without dot to content types.
    pub fn new(storage: Arc<dyn ObjectStorage>, mime_overrides: IndexMap<String, String>) -> Self {
        AssetSynchronizer {
            storage,
            mime_overrides,
        }
    }

    /// Uploads every file below `root` concurrently. The first failed upload
    /// fails the whole sync, objects already written stay in the bucket.
    pub async fn sync(&self, bucket: &str, root: &Path) -> Result<usize, FrontendError> {
        let records = build_asset_records(root, &self.mime_overrides)?;
        info!(
            "Uploading {} files from {} to bucket {}",
            records.len(),
            root.display(),
            bucket
        );

        try_join_all(records.iter().map(|record| async move {
            debug!(
                "Uploading {} ({}, {})",
                record.storage_key,
                record.content_type.as_deref().unwrap_or("no content type"),
                record.cache_control()
            );
            self.storage
                .put_object(bucket, record)
                .await
                .map_err(|source| FrontendError::Upload {
                    key: record.storage_key.clone(),
                    source,
                })
        }))
        .await?;

        info!("Uploaded {} files to bucket {}", records.len(), bucket);
        Ok(records.len())
    }
}

/// Scans `root` into upload records with cache lifetime and content type.
pub fn build_asset_records(
    root: &Path,
    mime_overrides: &IndexMap<String, String>,
) -> Result<Vec<AssetRecord>, FrontendError> {
    let root = root.canonicalize().map_err(|e| {
        FrontendError::Other(anyhow::anyhow!(
            "Build output directory {} is not readable: {}",
            root.display(),
            e
        ))
    })?;

    collect_files(&root)?
        .into_iter()
        .map(|local_path| -> Result<AssetRecord, FrontendError> {
            let storage_key = storage_key(&root, &local_path)?;
            let cache_max_age_seconds = if is_html_key(&storage_key) {
                HTML_CACHE_MAX_AGE_SECONDS
            } else {
                ASSET_CACHE_MAX_AGE_SECONDS
            };
            Ok(AssetRecord {
                content_type: resolve_content_type(&storage_key, mime_overrides),
                local_path,
                storage_key,
                cache_max_age_seconds,
            })
        })
        .collect()
}

/// Configured override, then the built-in table, then `text/html` for HTML keys.
pub fn resolve_content_type(
    key: &str,
    mime_overrides: &IndexMap<String, String>,
) -> Option<String> {
    let extension = Path::new(key)
        .extension()
        .map(|ext| normalize_extension(&ext.to_string_lossy()));

    if let Some(extension) = extension.as_deref() {
        if let Some(mime) = mime_overrides.get(extension) {
            return Some(mime.clone());
        }
        if let Some(mime) = lookup_mime(extension) {
            return Some(mime.to_string());
        }
    }

    if is_html_key(key) {
        Some(HTML_CONTENT_TYPE.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::test_utils::MemoryStorage;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn dist_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("static")).unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        fs::write(dir.path().join("app.js"), "console.log('app')").unwrap();
        fs::write(dir.path().join("static/data.bin"), [0u8, 1, 2]).unwrap();
        dir
    }

    #[test]
    fn test_html_gets_short_ttl_and_text_html() {
        let dir = dist_dir();
        let records = build_asset_records(dir.path(), &IndexMap::new()).unwrap();

        let index = records.iter().find(|r| r.storage_key == "index.html").unwrap();
        assert_eq!(index.cache_max_age_seconds, 300);
        assert_eq!(index.content_type.as_deref(), Some("text/html"));

        let app = records.iter().find(|r| r.storage_key == "app.js").unwrap();
        assert_eq!(app.cache_max_age_seconds, 86400);
        assert_eq!(app.content_type.as_deref(), Some("application/javascript"));
    }

    #[test]
    fn test_unknown_extension_has_no_content_type() {
        let dir = dist_dir();
        let records = build_asset_records(dir.path(), &IndexMap::new()).unwrap();
        let data = records
            .iter()
            .find(|r| r.storage_key == "static/data.bin")
            .unwrap();
        assert_eq!(data.content_type, None);
        assert_eq!(data.cache_max_age_seconds, 86400);
    }

    #[test]
    fn test_override_wins_over_table() {
        let mut overrides = IndexMap::new();
        overrides.insert("js".to_string(), "text/javascript".to_string());
        overrides.insert("bin".to_string(), "application/octet-stream".to_string());

        assert_eq!(
            resolve_content_type("app.js", &overrides).as_deref(),
            Some("text/javascript")
        );
        assert_eq!(
            resolve_content_type("static/data.bin", &overrides).as_deref(),
            Some("application/octet-stream")
        );
        assert_eq!(
            resolve_content_type("style.css", &overrides).as_deref(),
            Some("text/css")
        );
    }

    #[test]
    fn test_missing_dist_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(build_asset_records(&dir.path().join("dist"), &IndexMap::new()).is_err());
    }

    #[tokio::test]
    async fn test_sync_uploads_every_file() {
        let dir = dist_dir();
        let storage = Arc::new(MemoryStorage::new());
        let sync = AssetSynchronizer::new(storage.clone(), IndexMap::new());

        let uploaded = sync.sync("shop-bucket", dir.path()).await.unwrap();

        assert_eq!(uploaded, 3);
        assert_eq!(
            storage.objects("shop-bucket"),
            vec!["app.js", "index.html", "static/data.bin"]
        );
        let index = storage
            .uploads()
            .into_iter()
            .find(|r| r.storage_key == "index.html")
            .unwrap();
        assert_eq!(index.cache_control(), "max-age=300");
    }

    #[tokio::test]
    async fn test_sync_fails_when_one_upload_fails() {
        let dir = dist_dir();
        let storage = Arc::new(MemoryStorage::new().failing_upload("app.js"));
        let sync = AssetSynchronizer::new(storage.clone(), IndexMap::new());

        let err = sync.sync("shop-bucket", dir.path()).await.unwrap_err();
        assert!(matches!(err, FrontendError::Upload { ref key, .. } if key == "app.js"));
    }
}
