//! AWS S3 watermark store.
//!
//! Records live at `{prefix}/state/{board}.json` in a single bucket. S3
//! object writes replace the whole object, which gives the same
//! all-or-nothing guarantee as the local rename.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;

use crate::error::{AppError, Result};
use crate::models::Watermark;
use crate::storage::{WatermarkStore, state_key};

pub struct S3Storage {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3Storage {
    pub fn new(client: Client, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    /// Create S3 storage from environment configuration.
    ///
    /// `S3_BUCKET` is required; `S3_PREFIX` defaults to `notice-relay`.
    pub async fn from_env() -> Result<Self> {
        let bucket = std::env::var("S3_BUCKET")
            .map_err(|_| AppError::config("S3_BUCKET is not set"))?;
        let prefix = std::env::var("S3_PREFIX").unwrap_or_else(|_| "notice-relay".to_string());

        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Ok(Self::new(Client::new(&config), bucket, prefix))
    }

    fn object_key(&self, board_key: &str) -> String {
        let prefix = self.prefix.trim_end_matches('/');
        if prefix.is_empty() {
            state_key(board_key)
        } else {
            format!("{}/{}", prefix, state_key(board_key))
        }
    }

    /// Fetch a stored object, config files included.
    pub async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let bytes = output.body.collect().await.map_err(AppError::storage)?;
                Ok(Some(bytes.into_bytes().to_vec()))
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    log::info!("No object at s3://{}/{}", self.bucket, key);
                    Ok(None)
                } else {
                    Err(AppError::storage(service_err))
                }
            }
        }
    }

    /// Config object key under this store's prefix.
    pub fn config_key(&self) -> String {
        let prefix = self.prefix.trim_end_matches('/');
        if prefix.is_empty() {
            "config.toml".to_string()
        } else {
            format!("{}/config.toml", prefix)
        }
    }
}

#[async_trait]
impl WatermarkStore for S3Storage {
    async fn get(&self, board_key: &str) -> Result<Option<Watermark>> {
        match self.read_bytes(&self.object_key(board_key)).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, board_key: &str, watermark: &Watermark) -> Result<()> {
        let key = self.object_key(board_key);
        let json = serde_json::to_vec_pretty(watermark)?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(json))
            .content_type("application/json")
            .send()
            .await
            .map_err(AppError::storage)?;

        log::info!("Wrote watermark to s3://{}/{}", self.bucket, key);
        Ok(())
    }
}
