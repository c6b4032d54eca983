//! Scan error taxonomy / 扫描错误分类
//!
//! Only [`ScanError::NoValidTargets`] and report persistence failures end a
//! run. Everything else is scoped to one bucket or one probe.

use thiserror::Error;

use crate::storage::ApiError;

#[derive(Error, Debug)]
pub enum ScanError {
    /// Bucket does not exist; skip it, never retry / 存储桶不存在
    #[error(
        "Bucket {bucket} not found{}",
        .region.as_deref().map(|r| format!(" in region {}", r)).unwrap_or_default()
    )]
    BucketNotFound {
        bucket: String,
        region: Option<String>,
    },

    /// All region probes came back empty / 无法检测区域
    #[error("Failed to detect region for bucket '{0}' using all methods")]
    RegionUndetectable(String),

    /// One probe failed; the chain moves on / 单个探测失败
    #[error("{probe} failed for '{bucket}': {reason}")]
    TransientProbeFailure {
        probe: &'static str,
        bucket: String,
        reason: String,
    },

    /// Listing failed for any reason other than a missing bucket / 其他客户端错误
    #[error("An error occurred in region {region}: {source}")]
    OtherClientError {
        region: String,
        #[source]
        source: ApiError,
    },

    /// Nothing left to scan after region detection / 没有可扫描的存储桶
    #[error("No valid buckets to process")]
    NoValidTargets,

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ScanError {
    pub fn probe_failure(probe: &'static str, bucket: &str, reason: impl ToString) -> Self {
        ScanError::TransientProbeFailure {
            probe,
            bucket: bucket.to_string(),
            reason: reason.to_string(),
        }
    }
}
