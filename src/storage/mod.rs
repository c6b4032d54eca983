//! External collaborators of the scanner / 扫描器依赖的外部接口
//!
//! The scanner never talks to the network directly. Listing calls go through
//! [`ObjectListing`], raw HTTP probes through [`HttpProbe`].

use std::collections::HashMap;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub mod http;
#[cfg(test)]
pub mod testing;

pub use http::ReqwestProbe;

static ERROR_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<Code>([^<]*)</Code>").unwrap());
static ERROR_MESSAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<Message>([^<]*)</Message>").unwrap());

/// Error returned by the object storage API / 对象存储API错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ApiError {
    /// Provider error code, e.g. `NoSuchBucket` / 错误码
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub const NO_SUCH_BUCKET: &'static str = "NoSuchBucket";

    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { code: code.into(), message: message.into() }
    }

    /// Build from a failed HTTP response carrying an XML error body / 从XML错误响应构建
    pub fn from_response(status: u16, body: &str) -> Self {
        let code = ERROR_CODE
            .captures(body)
            .map(|c| c[1].to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| format!("Http{}", status));
        let message = ERROR_MESSAGE
            .captures(body)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| format!("HTTP status {}", status));
        Self { code, message }
    }

    pub fn timeout(secs: u64) -> Self {
        Self::new("Timeout", format!("request timed out after {}s", secs))
    }

    pub fn is_no_such_bucket(&self) -> bool {
        self.code == Self::NO_SUCH_BUCKET
    }
}

/// One entry of a listing page / 列表中的单个对象
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListedObject {
    pub key: String,
    pub size: u64,
    pub last_modified: String,
}

/// First (and only) listing page / 列表首页
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    pub objects: Vec<ListedObject>,
    /// More objects exist beyond this page / 还有更多对象未列出
    pub is_truncated: bool,
}

/// Anonymous object storage API / 匿名对象存储API
#[async_trait]
pub trait ObjectListing: Send + Sync {
    /// List the first page of objects in `bucket` at `region` / 列出对象（仅首页）
    async fn list_objects(&self, bucket: &str, region: &str) -> Result<ObjectPage, ApiError>;

    /// Raw location constraint; `None` or empty means the provider default / 获取存储桶位置
    async fn bucket_location(&self, bucket: &str) -> Result<Option<String>, ApiError>;
}

/// Captured HTTP response / HTTP响应快照
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    /// Header names are lowercase / 头名称均为小写
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl ProbeResponse {
    pub fn new(status: u16) -> Self {
        Self { status, ..Default::default() }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self.status, 301 | 302 | 307)
    }
}

/// Plain unauthenticated HTTP / 无认证HTTP请求
#[async_trait]
pub trait HttpProbe: Send + Sync {
    /// HEAD with redirects disabled / 不跟随重定向
    async fn head(&self, url: &str) -> anyhow::Result<ProbeResponse>;

    /// GET following redirects / 跟随重定向
    async fn get(&self, url: &str) -> anyhow::Result<ProbeResponse>;
}
