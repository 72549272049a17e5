use super::{object_location, ObjectStore};
use crate::models::Config;
use crate::{Error, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{config::Region, Client as S3Client};
use tracing::{debug, info};

pub struct S3ObjectStore {
    client: S3Client,
}

impl S3ObjectStore {
    pub async fn new(config: &Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }

        if let Some(endpoint) = &config.endpoint_url {
            info!("Using custom S3 endpoint: {}", endpoint);
            loader = loader.endpoint_url(endpoint);
        }

        let shared_config = loader.load().await;

        // S3-compatible stores behind a custom endpoint rarely support
        // virtual-hosted bucket addressing.
        let s3_config = aws_sdk_s3::config::Builder::from(&shared_config)
            .force_path_style(config.endpoint_url.is_some())
            .build();

        Self::from_client(S3Client::from_conf(s3_config))
    }

    pub fn from_client(client: S3Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        info!("Retrieving list of objects at current level {:?}", prefix);

        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let response = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .delimiter("/")
                .set_continuation_token(continuation_token.take())
                .send()
                .await
                .map_err(|e| {
                    Error::Listing(format!(
                        "Unable to list items in bucket {:?}: {}",
                        bucket,
                        DisplayErrorContext(&e)
                    ))
                })?;

            keys.extend(
                response
                    .contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );

            match response.next_continuation_token() {
                Some(token) => continuation_token = Some(token.to_string()),
                None => break,
            }
        }

        debug!("Listed {} objects under {:?}", keys.len(), prefix);
        Ok(keys)
    }

    async fn download(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                Error::Download(format!(
                    "Could not download {:?}: {}",
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| Error::Download(format!("Failed to read body of {:?}: {}", key, e)))?;

        Ok(bytes.into_bytes().to_vec())
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<String> {
        let body = ByteStream::from(data.to_vec());

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                Error::Upload(format!(
                    "Failed to upload {:?}: {}",
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(object_location(bucket, key))
    }
}
