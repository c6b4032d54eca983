//! S3 public bucket driver / S3公开存储桶驱动
//!
//! Region detection, URL building and anonymous listing.

pub mod client;
pub mod enumerator;
pub mod region;
pub mod url;

pub use client::AnonymousS3Client;
pub use enumerator::BucketEnumerator;
pub use region::{Probe, RegionResolver, PROBE_ORDER};
pub use url::DEFAULT_REGION;
