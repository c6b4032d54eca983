//! S3 URL构建
//!
//! Bucket names with dots break the wildcard TLS certificate of
//! `*.s3.amazonaws.com`, so they are addressed path-style.

use crate::utils::encode_key;

/// Region assumed when a bucket reports no location constraint / 默认区域
pub const DEFAULT_REGION: &str = "us-east-1";

const DOMAIN: &str = "amazonaws.com";

/// 是否需要路径风格
pub fn requires_path_style(bucket: &str) -> bool {
    bucket.contains('.')
}

/// Bucket URL / 存储桶URL
///
/// - path style: `https://s3[.<region>].amazonaws.com/<bucket>`, no region segment for us-east-1
/// - virtual hosted: `https://<bucket>.s3.amazonaws.com`
pub fn bucket_url(bucket: &str, region: Option<&str>) -> String {
    if requires_path_style(bucket) {
        match region.filter(|r| !r.is_empty() && *r != DEFAULT_REGION) {
            Some(region) => format!("https://s3.{}.{}/{}", region, DOMAIN, bucket),
            None => format!("https://s3.{}/{}", DOMAIN, bucket),
        }
    } else {
        format!("https://{}.s3.{}", bucket, DOMAIN)
    }
}

/// Object URL with the key percent-encoded / 对象URL（键已编码）
pub fn object_url(bucket: &str, region: Option<&str>, key: &str) -> String {
    format!("{}/{}", bucket_url(bucket, region), encode_key(key))
}

/// Regional API endpoint used by the listing client / 区域API端点
pub fn regional_endpoint(region: &str) -> String {
    format!("https://s3.{}.{}", region, DOMAIN)
}
