//! Report persistence / 报告写出

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ScanError;
use crate::models::{BucketReport, CombinedReport};
use crate::utils::file_timestamp;

/// Where finished reports go / 报告输出接口
pub trait ReportWriter {
    fn write_bucket(&self, report: &BucketReport) -> Result<PathBuf, ScanError>;

    fn write_combined(&self, report: &CombinedReport) -> Result<PathBuf, ScanError>;
}

/// Pretty-printed JSON files named `<stem>_<YYYYMMDD_HHMMSS>.json` / JSON文件输出
pub struct JsonFileWriter {
    output_dir: PathBuf,
}

impl JsonFileWriter {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self { output_dir: output_dir.as_ref().to_path_buf() }
    }

    fn file_path(&self, stem: &str) -> PathBuf {
        let timestamp = file_timestamp(&chrono::Local::now());
        self.output_dir.join(format!("{}_{}.json", stem, timestamp))
    }

    fn write_json<T: Serialize>(&self, stem: &str, value: &T) -> Result<PathBuf, ScanError> {
        if !self.output_dir.exists() {
            std::fs::create_dir_all(&self.output_dir)?;
            tracing::info!("Created output directory: {:?}", self.output_dir);
        }

        let path = self.file_path(stem);
        let content = serde_json::to_string_pretty(value)?;
        std::fs::write(&path, content)?;
        Ok(path)
    }
}

impl ReportWriter for JsonFileWriter {
    fn write_bucket(&self, report: &BucketReport) -> Result<PathBuf, ScanError> {
        self.write_json(&report.bucket_name, report)
    }

    fn write_combined(&self, report: &CombinedReport) -> Result<PathBuf, ScanError> {
        self.write_json("Combined", report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ObjectRecord;

    #[test]
    fn test_bucket_report_schema() {
        let dir = tempfile::tempdir().unwrap();
        let writer = JsonFileWriter::new(dir.path().join("nested"));

        let mut report = BucketReport::new("demo.enter.com", "us-east-1");
        report.push_object(ObjectRecord::new(
            "demo.enter.com",
            "us-east-1",
            "a.pdf".to_string(),
            "https://s3.amazonaws.com/demo.enter.com/a.pdf".to_string(),
            2_621_440,
            "2024-01-02T03:04:05.000Z".to_string(),
        ));
        report.finalize();

        let path = writer.write_bucket(&report).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("demo.enter.com_"));
        assert_eq!(name.len(), "demo.enter.com_".len() + "YYYYMMDD_HHMMSS.json".len());

        let doc: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["bucket_name"], "demo.enter.com");
        assert_eq!(doc["region"], "us-east-1");
        assert_eq!(doc["files"][0]["size_bytes"], 2_621_440);
        assert_eq!(doc["files"][0]["size_mb"], 2.5);
        assert_eq!(doc["files"][0]["bucket_name"], "demo.enter.com");
        assert_eq!(doc["extension_statistics"][".pdf"], 1);
        assert!(doc["errors"].as_array().unwrap().is_empty());
        assert!(doc["scan_timestamp"].is_string());
    }
}
