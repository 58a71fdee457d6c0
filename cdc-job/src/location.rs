//! Bucket and key addressing of stored objects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::JobError;

/// URI schemes accepted for object locations.
const SUPPORTED_SCHEMES: &[&str] = &["s3a://", "s3://"];

/// Scheme used when printing locations.
const DISPLAY_SCHEME: &str = "s3a://";

/// Address of an object: a bucket and a key inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageLocation {
    pub bucket: String,
    pub key: String,
}

impl StorageLocation {
    /// Creates a location, rejecting empty keys and buckets that are not a
    /// single directory name.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Result<Self, JobError> {
        let bucket = bucket.into();
        let key = key.into();

        let relative_dir = bucket == "." || bucket == "..";
        if bucket.is_empty() || relative_dir || bucket.contains(['/', '\\']) {
            return Err(JobError::InvalidLocation(format!(
                "bucket `{bucket}` must be a single non-empty path segment"
            )));
        }

        if key.is_empty() {
            return Err(JobError::InvalidLocation(format!(
                "key in bucket `{bucket}` must not be empty"
            )));
        }

        Ok(Self { bucket, key })
    }
}

impl FromStr for StorageLocation {
    type Err = JobError;

    /// Parses `s3a://bucket/key` or `s3://bucket/key`.
    fn from_str(uri: &str) -> Result<Self, Self::Err> {
        let rest = SUPPORTED_SCHEMES
            .iter()
            .find_map(|scheme| uri.strip_prefix(scheme))
            .ok_or_else(|| {
                JobError::InvalidLocation(format!(
                    "`{uri}` does not start with one of {}",
                    SUPPORTED_SCHEMES.join(", ")
                ))
            })?;

        let (bucket, key) = rest
            .split_once('/')
            .ok_or_else(|| JobError::InvalidLocation(format!("`{uri}` has no object key")))?;

        Self::new(bucket, key)
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{DISPLAY_SCHEME}{}/{}", self.bucket, self.key)
    }
}
