use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Cache lifetime for HTML entry points, which change on every deploy.
pub const HTML_CACHE_MAX_AGE_SECONDS: u32 = 300;
/// Cache lifetime for every other asset.
pub const ASSET_CACHE_MAX_AGE_SECONDS: u32 = 86400;

/// One file of the build output, ready to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub local_path: PathBuf,
    pub storage_key: String,
    pub content_type: Option<String>,
    pub cache_max_age_seconds: u32,
}

impl AssetRecord {
    pub fn is_html_entry_point(&self) -> bool {
        is_html_key(&self.storage_key)
    }

    pub fn cache_control(&self) -> String {
        format!("max-age={}", self.cache_max_age_seconds)
    }
}

pub fn is_html_key(key: &str) -> bool {
    key.ends_with(".html")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cache_control_header() {
        let record = AssetRecord {
            local_path: PathBuf::from("dist/index.html"),
            storage_key: "index.html".to_string(),
            content_type: Some("text/html".to_string()),
            cache_max_age_seconds: HTML_CACHE_MAX_AGE_SECONDS,
        };
        assert!(record.is_html_entry_point());
        assert_eq!(record.cache_control(), "max-age=300");
    }

    #[test]
    fn test_html_key_is_case_sensitive_suffix() {
        assert!(is_html_key("docs/page.html"));
        assert!(!is_html_key("page.htm"));
        assert!(!is_html_key("html/app.js"));
    }
}
