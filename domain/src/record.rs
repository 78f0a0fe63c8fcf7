use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

use crate::object_key::ObjectKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub i64);

impl RecordId {
    #[must_use]
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A processed image as persisted in the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: RecordId,
    pub original_filename: String,
    pub processed_url: String,
    pub object_key: ObjectKey,
    pub position: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewImageRecord {
    pub original_filename: String,
    pub processed_url: String,
    pub object_key: ObjectKey,
}

impl NewImageRecord {
    #[must_use]
    pub fn new(original_filename: String, processed_url: String, object_key: ObjectKey) -> Self {
        Self {
            original_filename,
            processed_url,
            object_key,
        }
    }
}
