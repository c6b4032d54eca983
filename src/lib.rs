pub mod config;
pub mod error;
pub mod models;
pub mod planner;
pub mod report;
pub mod scanner;
pub mod storage;
pub mod utils;

// Driver modules (point to project root drivers via path attribute) / 驱动模块
#[path = "../drivers/mod.rs"]
pub mod drivers;

use std::sync::Arc;

/// Build a scanner wired to the real network clients / 创建使用真实网络客户端的扫描器
pub fn build_scanner(app_config: &config::AppConfig) -> anyhow::Result<scanner::Scanner> {
    let timeout = app_config.request_timeout();
    let listing = Arc::new(drivers::s3::AnonymousS3Client::new(timeout));
    let http = Arc::new(storage::ReqwestProbe::new(timeout)?);
    Ok(scanner::Scanner::new(app_config.scan.provider, listing, http))
}
