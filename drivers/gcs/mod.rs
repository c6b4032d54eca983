//! Google Cloud Storage public bucket driver / GCS公开存储桶驱动
//!
//! GCS buckets are global, so there is no region detection. The XML listing
//! is fetched with a plain GET and parsed with quick-xml.

use anyhow::{anyhow, Context, Result};

use crate::error::ScanError;
use crate::models::{BucketReport, ObjectRecord};
use crate::storage::{HttpProbe, ListedObject, ObjectPage};
use crate::utils::encode_key;

const GCS_HOST: &str = "https://storage.googleapis.com";

/// Region recorded in GCS reports / GCS报告中的区域字段
pub const GCS_LOCATION: &str = "global";

pub fn bucket_url(bucket: &str) -> String {
    format!("{}/{}", GCS_HOST, bucket)
}

pub fn object_url(bucket: &str, key: &str) -> String {
    format!("{}/{}", bucket_url(bucket), encode_key(key))
}

#[derive(Clone, Copy)]
enum Field {
    Key,
    Size,
    LastModified,
    IsTruncated,
}

/// 解析XML列表响应
pub fn parse_listing(xml: &str) -> Result<ObjectPage> {
    use quick_xml::events::Event;
    use quick_xml::Reader;

    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut page = ObjectPage::default();
    let mut current: Option<ListedObject> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                field = match e.local_name().as_ref() {
                    b"Contents" => {
                        current = Some(ListedObject::default());
                        None
                    }
                    b"Key" => Some(Field::Key),
                    b"Size" => Some(Field::Size),
                    b"LastModified" => Some(Field::LastModified),
                    b"IsTruncated" => Some(Field::IsTruncated),
                    _ => None,
                };
            }
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"Contents" {
                    if let Some(obj) = current.take() {
                        page.objects.push(obj);
                    }
                }
                field = None;
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().context("Invalid text in GCS listing")?;
                match (field, current.as_mut()) {
                    (Some(Field::Key), Some(obj)) => obj.key = text.into_owned(),
                    (Some(Field::Size), Some(obj)) => {
                        obj.size = text
                            .trim()
                            .parse()
                            .with_context(|| format!("Invalid object size: {}", text))?;
                    }
                    (Some(Field::LastModified), Some(obj)) => obj.last_modified = text.into_owned(),
                    (Some(Field::IsTruncated), None) => page.is_truncated = text.trim() == "true",
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow!("Failed to parse GCS listing: {}", e)),
            _ => {}
        }
    }

    Ok(page)
}

pub struct GcsEnumerator<'a> {
    http: &'a dyn HttpProbe,
}

impl<'a> GcsEnumerator<'a> {
    pub fn new(http: &'a dyn HttpProbe) -> Self {
        Self { http }
    }

    /// Same contract as the S3 enumerator: never fails / 与S3枚举器相同，从不返回错误
    pub async fn enumerate(&self, bucket: &str) -> BucketReport {
        let mut report = BucketReport::new(bucket, GCS_LOCATION);

        let page = match self.fetch(bucket).await {
            Ok(page) => page,
            Err(message) => {
                tracing::error!("{}", message);
                report.push_error(message);
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
            let url = object_url(bucket, &obj.key);
            let record = ObjectRecord::new(bucket, GCS_LOCATION, obj.key, url, obj.size, obj.last_modified);
            tracing::info!(
                "Bucket: {}, File: {}, Size: {:.2} MB",
                bucket,
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

    async fn fetch(&self, bucket: &str) -> std::result::Result<ObjectPage, String> {
        let resp = self
            .http
            .get(&bucket_url(bucket))
            .await
            .map_err(|e| format!("An error occurred while listing {}: {}", bucket, e))?;

        match resp.status {
            200 => parse_listing(&resp.body).map_err(|e| format!("{}", e)),
            404 => Err(ScanError::BucketNotFound { bucket: bucket.to_string(), region: None }.to_string()),
            status => Err(format!("Failed to fetch data for {}. Status code: {}", bucket, status)),
        }
    }
}
