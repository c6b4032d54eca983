//! S3对象枚举

use crate::error::ScanError;
use crate::models::{BucketReport, ObjectRecord};
use crate::storage::ObjectListing;
use super::url::object_url;

pub struct BucketEnumerator<'a> {
    listing: &'a dyn ObjectListing,
}

impl<'a> BucketEnumerator<'a> {
    pub fn new(listing: &'a dyn ObjectListing) -> Self {
        Self { listing }
    }

    /// List one page of `bucket` and build its report / 枚举存储桶对象
    ///
    /// Never fails: listing errors end up in `BucketReport::errors`.
    pub async fn enumerate(&self, bucket: &str, region: &str) -> BucketReport {
        let mut report = BucketReport::new(bucket, region);

        let page = match self.listing.list_objects(bucket, region).await {
            Ok(page) => page,
            Err(e) => {
                let err = if e.is_no_such_bucket() {
                    ScanError::BucketNotFound {
                        bucket: bucket.to_string(),
                        region: Some(region.to_string()),
                    }
                } else {
                    ScanError::OtherClientError { region: region.to_string(), source: e }
                };
                tracing::error!("{}", err);
                report.push_error(err.to_string());
                report.finalize();
                return report;
            }
        };

        if page.is_truncated {
            tracing::warn!(
                "Bucket {} has more objects than one listing page; only the first {} are reported",
                bucket,
                page.objects.len()
            );
        }

        for obj in page.objects {
            let url = object_url(bucket, Some(region), &obj.key);
            let record = ObjectRecord::new(bucket, region, obj.key, url, obj.size, obj.last_modified);
            tracing::info!(
                "Bucket: {}, Region: {}, Link: {}, File: {}, Size: {:.2} MB",
                bucket,
                region,
                record.url,
                record.key,
                record.size_bytes as f64 / (1024.0 * 1024.0)
            );
            report.push_object(record);
        }

        report.finalize();
        for (extension, count) in report.extension_statistics.iter() {
            tracing::info!("Bucket: {}, Extension: {}, Count: {}", bucket, extension, count);
        }

        report
    }
}
