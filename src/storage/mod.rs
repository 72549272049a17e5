//! Object storage access
//!
//! Lists, downloads and uploads objects in an S3 bucket. The store handle is
//! an explicit value owned by the orchestrator, so tests can substitute
//! [`MockObjectStore`].

pub mod client;
pub mod mock;

pub use client::S3ObjectStore;
pub use mock::MockObjectStore;

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Keys directly under `prefix`, without descending into sub-folders.
    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<String>>;
    async fn download(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
    /// Store `data` at `key` and return the object's location.
    async fn upload(&self, bucket: &str, key: &str, data: &[u8], content_type: &str)
        -> Result<String>;
}

pub(crate) fn object_location(bucket: &str, key: &str) -> String {
    format!("s3://{}/{}", bucket, key)
}
