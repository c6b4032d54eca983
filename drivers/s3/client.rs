//! 匿名S3客户端（rust-s3）
//!
//! No credentials are ever sent. Each call is bounded by the configured
//! timeout and is not retried.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::Region;

use crate::storage::{ApiError, ListedObject, ObjectListing, ObjectPage};
use super::url::{regional_endpoint, requires_path_style, DEFAULT_REGION};

/// Region names rust-s3 substitutes when the location body does not parse
const UNPARSED_REGION: &str = "Custom";
const UNPARSED_REGION_ERROR: &str = "Error encountered";

pub struct AnonymousS3Client {
    timeout: Duration,
    /// Fixed endpoint replacing the regional one, always path-style / 固定端点
    endpoint: Option<String>,
}

impl AnonymousS3Client {
    pub fn new(timeout: Duration) -> Self {
        // rust-s3 retries failed requests once by default
        s3::set_retries(0);
        Self { timeout, endpoint: None }
    }

    /// Client talking to a single endpoint, e.g. an S3-compatible server / 指定端点
    pub fn with_endpoint(timeout: Duration, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Self::new(timeout)
        }
    }

    /// 创建匿名 Bucket 句柄
    fn open_bucket(&self, bucket: &str, region: &str) -> Result<Box<Bucket>, ApiError> {
        let credentials = Credentials::anonymous()
            .map_err(|e| ApiError::new("InvalidCredentials", e.to_string()))?;

        let region = Region::Custom {
            region: region.to_string(),
            endpoint: self
                .endpoint
                .clone()
                .unwrap_or_else(|| regional_endpoint(region)),
        };

        let handle = Bucket::new(bucket, region, credentials).map_err(api_error)?;

        let handle = if self.endpoint.is_some() || requires_path_style(bucket) {
            handle.with_path_style()
        } else {
            handle
        };

        Ok(handle)
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, S3Error>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(api_error),
            Err(_) => Err(ApiError::timeout(self.timeout.as_secs())),
        }
    }
}

fn api_error(err: S3Error) -> ApiError {
    match err {
        S3Error::HttpFailWithBody(status, body) => ApiError::from_response(status, &body),
        other => ApiError::new("ClientError", other.to_string()),
    }
}

fn check_status(status: u16) -> Result<(), ApiError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(ApiError::from_response(status, ""))
    }
}

/// Location constraint carried by a successful GetBucketLocation / 解析位置约束
///
/// An empty `<LocationConstraint/>` (us-east-1) does not deserialize in
/// rust-s3 and comes back as a placeholder custom region.
fn location_constraint(region: &Region) -> Option<String> {
    if let Region::Custom { region: name, .. } = region {
        if name == UNPARSED_REGION || name.starts_with(UNPARSED_REGION_ERROR) {
            return None;
        }
    }
    let name = region.to_string();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

#[async_trait]
impl ObjectListing for AnonymousS3Client {
    async fn list_objects(&self, bucket: &str, region: &str) -> Result<ObjectPage, ApiError> {
        let handle = self.open_bucket(bucket, region)?;

        // 只取第一页
        let (result, status) = self
            .bounded(handle.list_page(String::new(), None, None, None, None))
            .await?;
        check_status(status)?;

        let objects = result
            .contents
            .into_iter()
            .map(|obj| ListedObject {
                key: obj.key,
                size: obj.size as u64,
                last_modified: obj.last_modified,
            })
            .collect();

        Ok(ObjectPage { objects, is_truncated: result.is_truncated })
    }

    async fn bucket_location(&self, bucket: &str) -> Result<Option<String>, ApiError> {
        let handle = self.open_bucket(bucket, DEFAULT_REGION)?;
        let (region, status) = self.bounded(handle.location()).await?;
        check_status(status)?;

        Ok(location_constraint(&region))
    }
}
