//! Application configuration module / 应用配置模块
//!
//! Loaded from bucket-scout.json in the working directory when present,
//! built-in defaults otherwise / 存在配置文件时加载，否则使用内置默认值

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::{BucketTarget, Provider};

/// Config file name / 配置文件名
pub const CONFIG_FILE: &str = "bucket-scout.json";

/// Env var overriding the config file path / 配置文件路径环境变量
pub const CONFIG_PATH_ENV: &str = "BUCKET_SCOUT_CONFIG";

/// Env var overriding the provider / 提供商环境变量
pub const PROVIDER_ENV: &str = "BUCKET_SCOUT_PROVIDER";

/// Application configuration / 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Scan configuration / 扫描配置
    #[serde(default)]
    pub scan: ScanConfig,
    /// Buckets scanned when none are given on the command line / 默认存储桶列表
    #[serde(default = "default_targets")]
    pub default_targets: Vec<BucketTarget>,
}

/// Scan configuration / 扫描配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Storage provider / 存储提供商
    pub provider: Provider,
    /// Per-request timeout in seconds / 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// Report output directory / 报告输出目录
    pub output_dir: String,
}

fn default_targets() -> Vec<BucketTarget> {
    vec![
        BucketTarget::new("Bucket1"),
        BucketTarget::with_region("Bucket2", "us-west-2"),
        BucketTarget::new("Bucket3"),
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            default_targets: default_targets(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            provider: Provider::S3,
            request_timeout_secs: 10,
            output_dir: ".".to_string(),
        }
    }
}

impl AppConfig {
    /// Get request timeout / 获取请求超时
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.scan.request_timeout_secs.max(1))
    }

    /// Get the report output directory / 获取报告输出目录
    pub fn get_output_dir(&self) -> PathBuf {
        if self.scan.output_dir.is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(&self.scan.output_dir)
        }
    }
}

/// Get the config file path / 获取配置文件路径
fn get_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(CONFIG_FILE)
}

/// Load configuration, then apply env overrides / 加载配置并应用环境变量
pub fn load_config() -> Result<AppConfig, String> {
    let mut config = load_config_from(&get_config_path())?;

    if let Ok(provider) = std::env::var(PROVIDER_ENV) {
        config.scan.provider = provider.parse()?;
        tracing::info!("Provider overridden by {}: {}", PROVIDER_ENV, config.scan.provider);
    }

    Ok(config)
}

/// Load configuration from a specific file; missing file means defaults / 从指定文件加载
pub fn load_config_from(config_path: &Path) -> Result<AppConfig, String> {
    if !config_path.exists() {
        tracing::debug!("No configuration at {:?}, using built-in defaults", config_path);
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(config_path)
        .map_err(|e| format!("Failed to read config file: {}", e))?;

    let config: AppConfig = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse config file: {}", e))?;

    if config.default_targets.iter().any(|t| t.name.is_empty()) {
        return Err("Default targets must have non-empty names".to_string());
    }

    tracing::info!("Loaded configuration from {:?}", config_path);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.scan.provider, Provider::S3);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.default_targets.len(), 3);
        assert_eq!(config.default_targets[1].region.as_deref(), Some("us-west-2"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            r#"{"scan": {"provider": "gcs"}, "default_targets": [{"name": "open-data"}]}"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.scan.provider, Provider::Gcs);
        assert_eq!(config.scan.request_timeout_secs, 10);
        assert_eq!(config.get_output_dir(), PathBuf::from("."));
        assert_eq!(config.default_targets, vec![BucketTarget::new("open-data")]);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_config_from(&path).unwrap_err().starts_with("Failed to parse config file"));

        std::fs::write(&path, r#"{"default_targets": [{"name": ""}]}"#).unwrap();
        assert!(load_config_from(&path).is_err());
    }
}
