//! S3区域检测
//!
//! Probes run in [`PROBE_ORDER`] and the first one to name a region wins.
//! A failing probe only logs; the one exception is the location API saying
//! the bucket does not exist, which ends the chain.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ScanError;
use crate::storage::{HttpProbe, ObjectListing, ProbeResponse};
use super::url::{bucket_url, DEFAULT_REGION};

const BUCKET_REGION_HEADER: &str = "x-amz-bucket-region";

static REDIRECT_REGION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"s3\.([a-z0-9-]+)\.amazonaws\.com").unwrap());
static LOCATION_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<LocationConstraint(?:\s[^>]*)?>([^<]+)</LocationConstraint>").unwrap()
});
static LOCATION_EMPTY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<LocationConstraint(?:\s[^>]*)?(?:/>|>\s*</LocationConstraint>)").unwrap()
});

/// Region detection strategies / 区域检测方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// `x-amz-bucket-region` on an unauthenticated HEAD
    BucketRegionHeader,
    /// Region embedded in the HEAD redirect target
    Redirect,
    /// Anonymous GetBucketLocation
    LocationApi,
    /// Plain GET `<bucket>?location`
    LocationQuery,
}

/// Fixed priority order / 固定优先级
pub const PROBE_ORDER: [Probe; 4] = [
    Probe::BucketRegionHeader,
    Probe::Redirect,
    Probe::LocationApi,
    Probe::LocationQuery,
];

impl Probe {
    pub fn label(self) -> &'static str {
        match self {
            Probe::BucketRegionHeader => "HTTP headers",
            Probe::Redirect => "redirect",
            Probe::LocationApi => "get_bucket_location",
            Probe::LocationQuery => "location query",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum ProbeOutcome {
    Detected(String),
    Inconclusive,
    NoSuchBucket,
}

/// HEAD is sent once and shared by the header and redirect probes
enum HeadState {
    NotSent,
    Received(ProbeResponse),
    Failed,
}

struct ProbeContext<'b> {
    bucket: &'b str,
    head: HeadState,
}

/// Map a raw location constraint onto a region name / 位置约束转区域
pub fn normalize_location(constraint: Option<&str>) -> String {
    match constraint.map(str::trim) {
        None | Some("") => DEFAULT_REGION.to_string(),
        // legacy value returned for old eu-west-1 buckets
        Some("EU") => "eu-west-1".to_string(),
        Some(region) => region.to_string(),
    }
}

/// Region named in a redirect `Location` / 从重定向地址提取区域
pub fn region_from_redirect(location: &str) -> Option<String> {
    REDIRECT_REGION
        .captures(location)
        .map(|c| c[1].to_string())
        .filter(|r| r != "amazonaws")
}

/// Region from a `?location` XML body / 从XML响应提取区域
pub fn region_from_location_xml(body: &str) -> Option<String> {
    if let Some(c) = LOCATION_VALUE.captures(body) {
        return Some(normalize_location(Some(&c[1])));
    }
    if LOCATION_EMPTY.is_match(body) {
        return Some(DEFAULT_REGION.to_string());
    }
    None
}

pub struct RegionResolver<'a> {
    listing: &'a dyn ObjectListing,
    http: &'a dyn HttpProbe,
}

impl<'a> RegionResolver<'a> {
    pub fn new(listing: &'a dyn ObjectListing, http: &'a dyn HttpProbe) -> Self {
        Self { listing, http }
    }

    /// Detect the home region of `bucket` / 检测存储桶区域
    ///
    /// Errors are [`ScanError::BucketNotFound`] or [`ScanError::RegionUndetectable`].
    pub async fn resolve(&self, bucket: &str) -> Result<String, ScanError> {
        tracing::info!("  Attempting to detect region for '{}'...", bucket);

        let mut ctx = ProbeContext { bucket, head: HeadState::NotSent };

        for probe in PROBE_ORDER {
            match self.attempt(probe, &mut ctx).await {
                Ok(ProbeOutcome::Detected(region)) => {
                    tracing::info!(
                        "  ✓ Auto-detected region for bucket '{}': {} (via {})",
                        bucket,
                        region,
                        probe.label()
                    );
                    return Ok(region);
                }
                Ok(ProbeOutcome::Inconclusive) => {
                    tracing::debug!("  {} gave no region for '{}'", probe.label(), bucket);
                }
                Ok(ProbeOutcome::NoSuchBucket) => {
                    tracing::warn!("  ✗ Error: Bucket '{}' does not exist", bucket);
                    return Err(ScanError::BucketNotFound { bucket: bucket.to_string(), region: None });
                }
                Err(e) => {
                    tracing::warn!("  ✗ {}", e);
                }
            }
        }

        let err = ScanError::RegionUndetectable(bucket.to_string());
        tracing::warn!("  ✗ {}", err);
        Err(err)
    }

    async fn attempt(&self, probe: Probe, ctx: &mut ProbeContext<'_>) -> Result<ProbeOutcome, ScanError> {
        match probe {
            Probe::BucketRegionHeader => {
                let region = self
                    .head_response(ctx)
                    .await?
                    .and_then(|resp| resp.header(BUCKET_REGION_HEADER))
                    .filter(|r| !r.is_empty())
                    .map(str::to_string);
                Ok(region.map_or(ProbeOutcome::Inconclusive, ProbeOutcome::Detected))
            }
            Probe::Redirect => {
                let region = self
                    .head_response(ctx)
                    .await?
                    .filter(|resp| resp.is_redirect())
                    .and_then(|resp| resp.header("location"))
                    .and_then(region_from_redirect);
                Ok(region.map_or(ProbeOutcome::Inconclusive, ProbeOutcome::Detected))
            }
            Probe::LocationApi => match self.listing.bucket_location(ctx.bucket).await {
                Ok(constraint) => Ok(ProbeOutcome::Detected(normalize_location(constraint.as_deref()))),
                Err(e) if e.is_no_such_bucket() => Ok(ProbeOutcome::NoSuchBucket),
                Err(e) => Err(ScanError::probe_failure(probe.label(), ctx.bucket, e.code)),
            },
            Probe::LocationQuery => {
                let url = format!("{}?location", bucket_url(ctx.bucket, None));
                let resp = self
                    .http
                    .get(&url)
                    .await
                    .map_err(|e| ScanError::probe_failure(probe.label(), ctx.bucket, e))?;
                if resp.status != 200 {
                    return Err(ScanError::probe_failure(
                        probe.label(),
                        ctx.bucket,
                        format!("HTTP status {}", resp.status),
                    ));
                }
                Ok(region_from_location_xml(&resp.body)
                    .map_or(ProbeOutcome::Inconclusive, ProbeOutcome::Detected))
            }
        }
    }

    /// HEAD the default-style bucket URL once per resolution
    async fn head_response<'c>(
        &self,
        ctx: &'c mut ProbeContext<'_>,
    ) -> Result<Option<&'c ProbeResponse>, ScanError> {
        if let HeadState::NotSent = ctx.head {
            let url = bucket_url(ctx.bucket, None);
            match self.http.head(&url).await {
                Ok(resp) => ctx.head = HeadState::Received(resp),
                Err(e) => {
                    ctx.head = HeadState::Failed;
                    return Err(ScanError::probe_failure("HTTP HEAD method", ctx.bucket, e));
                }
            }
        }
        Ok(match &ctx.head {
            HeadState::Received(resp) => Some(resp),
            HeadState::NotSent | HeadState::Failed => None,
        })
    }
}
