use super::{object_location, ObjectStore};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

/// In-memory store with S3 listing semantics for a `/` delimiter.
#[derive(Clone, Default)]
pub struct MockObjectStore {
    objects: Arc<Mutex<BTreeMap<(String, String), Vec<u8>>>>,
    failing_downloads: Arc<Mutex<HashSet<String>>>,
    failing_uploads: Arc<Mutex<HashSet<String>>>,
    listing_fails: Arc<Mutex<bool>>,
    download_count: Arc<Mutex<usize>>,
    upload_count: Arc<Mutex<usize>>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, bucket: &str, key: &str, content: Vec<u8>) -> Self {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), content);
        self
    }

    pub fn with_listing_failure(self, fails: bool) -> Self {
        *self.listing_fails.lock().unwrap() = fails;
        self
    }

    pub fn with_download_failure(self, key: &str) -> Self {
        self.failing_downloads.lock().unwrap().insert(key.to_string());
        self
    }

    pub fn with_upload_failure(self, key: &str) -> Self {
        self.failing_uploads.lock().unwrap().insert(key.to_string());
        self
    }

    pub fn get_object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn get_keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, key)| key.clone())
            .collect()
    }

    pub fn get_download_count(&self) -> usize {
        *self.download_count.lock().unwrap()
    }

    pub fn get_upload_count(&self) -> usize {
        *self.upload_count.lock().unwrap()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        if *self.listing_fails.lock().unwrap() {
            return Err(Error::Listing(format!(
                "Unable to list items in bucket {:?}: mock failure",
                bucket
            )));
        }

        Ok(self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|(b, key)| {
                b == bucket
                    && key
                        .strip_prefix(prefix)
                        .is_some_and(|rest| !rest.contains('/'))
            })
            .map(|(_, key)| key.clone())
            .collect())
    }

    async fn download(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        *self.download_count.lock().unwrap() += 1;

        if self.failing_downloads.lock().unwrap().contains(key) {
            return Err(Error::Download(format!("Could not download {:?}: mock failure", key)));
        }

        self.get_object(bucket, key)
            .ok_or_else(|| Error::Download(format!("Object not found: {}", key)))
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        _content_type: &str,
    ) -> Result<String> {
        *self.upload_count.lock().unwrap() += 1;

        if self.failing_uploads.lock().unwrap().contains(key) {
            return Err(Error::Upload(format!("Failed to upload {:?}: mock failure", key)));
        }

        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), data.to_vec());
        Ok(object_location(bucket, key))
    }
}
