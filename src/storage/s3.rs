//! S3 object store

use super::ObjectStore;
use crate::config::Settings;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use eyre::{Result, eyre};

/// Bucket-scoped S3 client
///
/// Uses the credentials from [`Settings`] when both the key id and the secret
/// are present, otherwise the default AWS provider chain.
#[derive(Clone, Debug)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build a client from settings
    ///
    /// # Errors
    /// Returns an error if `S3_BUCKET` is not configured
    pub async fn from_settings(settings: &Settings) -> Result<Self> {
        let bucket = settings
            .bucket
            .clone()
            .ok_or_else(|| eyre!("S3_BUCKET environment variable not set"))?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some((key_id, secret, token)) = settings.credentials() {
            log::debug!("Using explicit AWS credentials from environment");
            loader = loader.credentials_provider(Credentials::new(
                key_id,
                secret,
                token.map(str::to_string),
                None,
                "b3-carteira",
            ));
        }
        let config = loader.load().await;

        Ok(Self::new(Client::new(&config), bucket))
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

impl ObjectStore for S3Store {
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<()> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| {
                eyre!(
                    "Failed to upload {}: {}",
                    self.location(key),
                    DisplayErrorContext(&e)
                )
            })?;

        log::debug!("Uploaded {} bytes to {}", size, self.location(key));
        Ok(())
    }

    fn location(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }
}
