//! Object key utility functions / 对象键工具函数

use chrono::{DateTime, TimeZone};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Get file extension of an object key, leading dot included / 获取扩展名（含点）
/// 1. Only the last path segment is considered / 只看最后一段
/// 2. Leading dots of the name do not start an extension (".bashrc") / 隐藏文件不算扩展名
/// 3. No dot means empty string / 没有点返回空串
pub fn file_extension(key: &str) -> &str {
    let name = key.rsplit('/').next().unwrap_or(key);
    match name.rfind('.') {
        Some(pos) if name[..pos].chars().any(|c| c != '.') => &name[pos..],
        _ => "",
    }
}

/// Bytes to megabytes, rounded to 2 decimals / 字节转MB，保留两位小数
pub fn size_in_mb(size_bytes: u64) -> f64 {
    let mb = size_bytes as f64 / BYTES_PER_MB;
    // halves go to the even neighbour: 0.125 -> 0.12
    (mb * 100.0).round_ties_even() / 100.0
}

/// Percent-encode an object key, keeping `/` as separator / URL编码对象键，保留斜杠
pub fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Timestamp used in report file names (YYYYMMDD_HHMMSS) / 报告文件名时间戳
pub fn file_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%Y%m%d_%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("report.pdf"), ".pdf");
        assert_eq!(file_extension("backups/db.tar.gz"), ".gz");
        assert_eq!(file_extension("README"), "");
        assert_eq!(file_extension(".bashrc"), "");
        assert_eq!(file_extension("logs.2024/readme"), "");
        assert_eq!(file_extension("..hidden.txt"), ".txt");
        assert_eq!(file_extension("folder/"), "");
        assert_eq!(file_extension("trailing."), ".");
    }

    #[test]
    fn test_size_in_mb() {
        assert_eq!(size_in_mb(0), 0.0);
        assert_eq!(size_in_mb(1_048_576), 1.0);
        assert_eq!(size_in_mb(1_572_864), 1.5);
        // 1234567 / 1048576 = 1.1773...
        assert_eq!(size_in_mb(1_234_567), 1.18);
        assert_eq!(size_in_mb(10_485), 0.01);
        // 128 KiB is exactly 0.125 MB
        assert_eq!(size_in_mb(131_072), 0.12);
        // 384 KiB is exactly 0.375 MB
        assert_eq!(size_in_mb(393_216), 0.38);
    }

    #[test]
    fn test_encode_key() {
        assert_eq!(encode_key("plain/file.txt"), "plain/file.txt");
        assert_eq!(encode_key("my docs/q1 report.pdf"), "my%20docs/q1%20report.pdf");
        assert_eq!(encode_key("a+b&c=d?.csv"), "a%2Bb%26c%3Dd%3F.csv");
        assert_eq!(encode_key("dir//x"), "dir//x");
        assert_eq!(encode_key("tilde~under_score-dash.txt"), "tilde~under_score-dash.txt");
        assert_eq!(encode_key("数据.txt"), "%E6%95%B0%E6%8D%AE.txt");
    }

    #[test]
    fn test_file_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(file_timestamp(&at), "20240307_090501");
    }
}
