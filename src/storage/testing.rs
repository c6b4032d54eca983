//! In-memory fakes for the listing API and HTTP probes / 测试用假实现
//!
//! Every call is recorded so tests can assert which probes ran and in what order.

use std::collections::HashMap;

use anyhow::anyhow;
use async_trait::async_trait;
use parking_lot::Mutex;

use super::{ApiError, HttpProbe, ListedObject, ObjectListing, ObjectPage, ProbeResponse};

pub fn object(key: &str, size: u64) -> ListedObject {
    ListedObject {
        key: key.to_string(),
        size,
        last_modified: "2024-01-02T03:04:05.000Z".to_string(),
    }
}

pub fn page(objects: Vec<ListedObject>) -> ObjectPage {
    ObjectPage { objects, is_truncated: false }
}

#[derive(Default)]
pub struct FakeListing {
    pages: HashMap<String, Result<ObjectPage, ApiError>>,
    locations: HashMap<String, Result<Option<String>, ApiError>>,
    calls: Mutex<Vec<String>>,
}

impl FakeListing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, bucket: &str, page: ObjectPage) -> Self {
        self.pages.insert(bucket.to_string(), Ok(page));
        self
    }

    pub fn with_list_error(mut self, bucket: &str, err: ApiError) -> Self {
        self.pages.insert(bucket.to_string(), Err(err));
        self
    }

    pub fn with_location(mut self, bucket: &str, location: Result<Option<String>, ApiError>) -> Self {
        self.locations.insert(bucket.to_string(), location);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ObjectListing for FakeListing {
    async fn list_objects(&self, bucket: &str, region: &str) -> Result<ObjectPage, ApiError> {
        self.calls.lock().push(format!("list {} {}", bucket, region));
        self.pages
            .get(bucket)
            .cloned()
            .unwrap_or_else(|| Err(ApiError::new(ApiError::NO_SUCH_BUCKET, "The specified bucket does not exist")))
    }

    async fn bucket_location(&self, bucket: &str) -> Result<Option<String>, ApiError> {
        self.calls.lock().push(format!("location {}", bucket));
        self.locations
            .get(bucket)
            .cloned()
            .unwrap_or_else(|| Err(ApiError::new("AccessDenied", "Access Denied")))
    }
}

/// Responses keyed by `"HEAD <url>"` / `"GET <url>"`; unknown requests fail like a dead host
#[derive(Default)]
pub struct FakeProbe {
    responses: HashMap<String, ProbeResponse>,
    calls: Mutex<Vec<String>>,
}

impl FakeProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_head(mut self, url: &str, response: ProbeResponse) -> Self {
        self.responses.insert(format!("HEAD {}", url), response);
        self
    }

    pub fn on_get(mut self, url: &str, response: ProbeResponse) -> Self {
        self.responses.insert(format!("GET {}", url), response);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn respond(&self, request: String) -> anyhow::Result<ProbeResponse> {
        self.calls.lock().push(request.clone());
        self.responses
            .get(&request)
            .cloned()
            .ok_or_else(|| anyhow!("connection refused: {}", request))
    }
}

#[async_trait]
impl HttpProbe for FakeProbe {
    async fn head(&self, url: &str) -> anyhow::Result<ProbeResponse> {
        self.respond(format!("HEAD {}", url))
    }

    async fn get(&self, url: &str) -> anyhow::Result<ProbeResponse> {
        self.respond(format!("GET {}", url))
    }
}
