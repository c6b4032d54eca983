//! Scan data model / 扫描数据模型
//!
//! Everything here is what ends up in the JSON reports.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::utils::{file_extension, size_in_mb};

/// Object storage provider / 对象存储提供商
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// AWS S3 (region-aware) / AWS S3
    #[default]
    S3,
    /// Google Cloud Storage XML API / 谷歌云存储
    Gcs,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::S3 => f.write_str("s3"),
            Provider::Gcs => f.write_str("gcs"),
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s3" | "aws" => Ok(Provider::S3),
            "gcs" | "gcp" => Ok(Provider::Gcs),
            other => Err(format!("Unknown provider: {}", other)),
        }
    }
}

/// A bucket to scan, region optional until resolved / 待扫描的存储桶
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketTarget {
    pub name: String,
    #[serde(default)]
    pub region: Option<String>,
}

impl BucketTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), region: None }
    }

    pub fn with_region(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self { name: name.into(), region: Some(region.into()) }
    }
}

/// One listed object / 单个对象记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectRecord {
    pub bucket_name: String,
    pub region: String,
    pub key: String,
    pub url: String,
    pub size_bytes: u64,
    /// Always derived from `size_bytes` / 由 size_bytes 计算
    pub size_mb: f64,
    pub last_modified: String,
}

impl ObjectRecord {
    pub fn new(
        bucket_name: &str,
        region: &str,
        key: String,
        url: String,
        size_bytes: u64,
        last_modified: String,
    ) -> Self {
        Self {
            bucket_name: bucket_name.to_string(),
            region: region.to_string(),
            key,
            url,
            size_bytes,
            size_mb: size_in_mb(size_bytes),
            last_modified,
        }
    }
}

/// Extension frequency table / 扩展名统计
///
/// Keeps first-seen order so that sorting by count is stable for ties.
/// Serialized as a JSON object in its current order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionTally {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl ExtensionTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence; empty extensions are ignored / 记录一次
    pub fn record(&mut self, extension: &str) {
        self.add(extension, 1);
    }

    /// Add `count` occurrences of `extension` / 累加计数
    pub fn add(&mut self, extension: &str, count: u64) {
        if extension.is_empty() || count == 0 {
            return;
        }
        match self.index.get(extension) {
            Some(&pos) => self.entries[pos].1 += count,
            None => {
                self.index.insert(extension.to_string(), self.entries.len());
                self.entries.push((extension.to_string(), count));
            }
        }
    }

    /// Sum another tally into this one / 合并另一个统计
    pub fn merge(&mut self, other: &ExtensionTally) {
        for (extension, count) in other.iter() {
            self.add(extension, count);
        }
    }

    pub fn get(&self, extension: &str) -> u64 {
        self.index
            .get(extension)
            .map(|&pos| self.entries[pos].1)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(ext, count)| (ext.as_str(), *count))
    }

    /// Sort by count descending, ties keep first-seen order / 按数量降序排序
    pub fn sort_by_count(&mut self) {
        self.entries.sort_by(|a, b| b.1.cmp(&a.1));
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(pos, (ext, _))| (ext.clone(), pos))
            .collect();
    }
}

impl Serialize for ExtensionTally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (extension, count) in &self.entries {
            map.serialize_entry(extension, count)?;
        }
        map.end()
    }
}

/// Result of scanning one bucket / 单个存储桶扫描结果
#[derive(Debug, Clone, Serialize)]
pub struct BucketReport {
    pub bucket_name: String,
    pub region: String,
    pub scan_timestamp: String,
    pub files: Vec<ObjectRecord>,
    pub extension_statistics: ExtensionTally,
    pub errors: Vec<String>,
}

impl BucketReport {
    pub fn new(bucket_name: &str, region: &str) -> Self {
        Self {
            bucket_name: bucket_name.to_string(),
            region: region.to_string(),
            scan_timestamp: chrono::Local::now().to_rfc3339(),
            files: Vec::new(),
            extension_statistics: ExtensionTally::new(),
            errors: Vec::new(),
        }
    }

    /// Append a record and count its extension / 追加对象并统计扩展名
    pub fn push_object(&mut self, record: ObjectRecord) {
        self.extension_statistics.record(file_extension(&record.key));
        self.files.push(record);
    }

    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Called once enumeration is done / 枚举结束后调用
    pub fn finalize(&mut self) {
        self.extension_statistics.sort_by_count();
    }
}

/// All buckets of a `--combine` run in one document / 合并报告
#[derive(Debug, Clone, Serialize)]
pub struct CombinedReport {
    pub scan_timestamp: String,
    pub total_buckets: usize,
    pub buckets: Vec<BucketReport>,
    pub global_extension_statistics: ExtensionTally,
}

impl CombinedReport {
    pub fn new() -> Self {
        Self {
            scan_timestamp: chrono::Local::now().to_rfc3339(),
            total_buckets: 0,
            buckets: Vec::new(),
            global_extension_statistics: ExtensionTally::new(),
        }
    }

    pub fn push(&mut self, report: BucketReport) {
        self.buckets.push(report);
        self.total_buckets = self.buckets.len();
    }

    /// Sum the per-bucket tallies into the global one / 汇总全局统计
    pub fn finalize(&mut self) {
        let mut global = ExtensionTally::new();
        for bucket in &self.buckets {
            global.merge(&bucket.extension_statistics);
        }
        global.sort_by_count();
        self.global_extension_statistics = global;
    }
}

impl Default for CombinedReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str, size: u64) -> ObjectRecord {
        ObjectRecord::new("bucket", "us-east-1", key.to_string(), String::new(), size, String::new())
    }

    #[test]
    fn test_size_mb_is_derived() {
        let rec = record("a.bin", 5 * 1024 * 1024 + 512 * 1024);
        assert_eq!(rec.size_mb, 5.5);
        assert_eq!(record("tiny.txt", 1).size_mb, 0.0);
    }

    #[test]
    fn test_tally_sorted_desc_with_stable_ties() {
        let mut tally = ExtensionTally::new();
        for ext in [".txt", ".pdf", ".csv", ".pdf", ".txt", ".log"] {
            tally.record(ext);
        }
        tally.sort_by_count();
        let order: Vec<_> = tally.iter().collect();
        assert_eq!(order, vec![(".txt", 2), (".pdf", 2), (".csv", 1), (".log", 1)]);
    }

    #[test]
    fn test_tally_ignores_empty_extension() {
        let mut tally = ExtensionTally::new();
        tally.record("");
        tally.add(".zip", 0);
        assert_eq!(tally.iter().count(), 0);
    }

    #[test]
    fn test_tally_independent_of_object_order() {
        let keys = ["a.pdf", "b.txt", "c.pdf", "README", "d/e.pdf", "f.txt"];
        let mut forward = BucketReport::new("b", "us-east-1");
        let mut backward = BucketReport::new("b", "us-east-1");
        for key in keys {
            forward.push_object(record(key, 1));
        }
        for key in keys.iter().rev() {
            backward.push_object(record(key, 1));
        }
        for ext in [".pdf", ".txt", ""] {
            assert_eq!(
                forward.extension_statistics.get(ext),
                backward.extension_statistics.get(ext)
            );
        }
        assert_eq!(forward.extension_statistics.iter().map(|(_, c)| c).sum::<u64>(), 5);
    }

    #[test]
    fn test_tally_serializes_in_order() {
        let mut tally = ExtensionTally::new();
        tally.add(".a", 1);
        tally.add(".b", 3);
        tally.sort_by_count();
        assert_eq!(serde_json::to_string(&tally).unwrap(), r#"{".b":3,".a":1}"#);
    }

    #[test]
    fn test_combined_global_tally_sums_buckets() {
        let mut first = BucketReport::new("first", "us-east-1");
        for i in 0..3 {
            first.push_object(record(&format!("doc{}.pdf", i), 10));
        }
        first.push_object(record("notes.txt", 10));
        let mut second = BucketReport::new("second", "eu-west-2");
        for i in 0..5 {
            second.push_object(record(&format!("scan{}.pdf", i), 10));
        }

        let mut combined = CombinedReport::new();
        combined.push(first);
        combined.push(second);
        combined.finalize();

        assert_eq!(combined.total_buckets, 2);
        assert_eq!(combined.global_extension_statistics.get(".pdf"), 8);
        assert_eq!(combined.global_extension_statistics.get(".txt"), 1);
        let first_entry = combined.global_extension_statistics.iter().next();
        assert_eq!(first_entry, Some((".pdf", 8)));
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("GCS".parse::<Provider>(), Ok(Provider::Gcs));
        assert_eq!("s3".parse::<Provider>(), Ok(Provider::S3));
        assert!("azure".parse::<Provider>().is_err());
    }
}
