use serde::{Deserialize, Serialize};

/// One page returned by a bucket listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectListing {
    pub keys: Vec<String>,
    pub next_continuation_token: Option<String>,
    pub is_truncated: bool,
}

impl ObjectListing {
    /// Another page exists only while the listing is truncated and hands out a cursor.
    pub fn next_page(&self) -> Option<&str> {
        match (&self.next_continuation_token, self.is_truncated) {
            (Some(token), true) if !token.is_empty() => Some(token.as_str()),
            _ => None,
        }
    }
}

/// Keys of one listing page, deleted with a single bulk request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionBatch {
    pub object_keys: Vec<String>,
    pub continuation_token: Option<String>,
}

impl From<ObjectListing> for DeletionBatch {
    fn from(listing: ObjectListing) -> Self {
        let continuation_token = listing.next_page().map(str::to_string);
        DeletionBatch {
            object_keys: listing.keys,
            continuation_token,
        }
    }
}
