//! Scan orchestration / 扫描流程编排
//!
//! Two sequential phases: region detection for every target, then
//! enumeration of the survivors one bucket at a time. A failing bucket only
//! ever produces a warning or an `errors` entry.

use std::path::PathBuf;
use std::sync::Arc;

use crate::drivers::gcs::{GcsEnumerator, GCS_LOCATION};
use crate::drivers::s3::{BucketEnumerator, RegionResolver};
use crate::error::ScanError;
use crate::models::{BucketReport, BucketTarget, Provider};
use crate::report::{OutputMode, ReportAggregator, ReportWriter};
use crate::storage::{HttpProbe, ObjectListing};

/// A bucket with a known region / 已确定区域的存储桶
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub name: String,
    pub region: String,
}

/// Run result / 运行结果
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub requested: usize,
    pub scanned: usize,
    pub written: Vec<PathBuf>,
}

pub struct Scanner {
    provider: Provider,
    listing: Arc<dyn ObjectListing>,
    http: Arc<dyn HttpProbe>,
}

impl Scanner {
    pub fn new(provider: Provider, listing: Arc<dyn ObjectListing>, http: Arc<dyn HttpProbe>) -> Self {
        Self { provider, listing, http }
    }

    /// Region detection phase; unresolvable targets are dropped / 区域检测阶段
    pub async fn resolve_targets(&self, targets: &[BucketTarget]) -> Vec<ResolvedTarget> {
        tracing::info!("{}", "=".repeat(80));
        tracing::info!("REGION DETECTION PHASE");
        tracing::info!("{}", "=".repeat(80));

        let resolver = RegionResolver::new(self.listing.as_ref(), self.http.as_ref());
        let mut resolved = Vec::with_capacity(targets.len());

        for target in targets {
            if self.provider == Provider::Gcs {
                if let Some(region) = &target.region {
                    tracing::debug!("Ignoring region '{}' for GCS bucket {}", region, target.name);
                }
                resolved.push(ResolvedTarget { name: target.name.clone(), region: GCS_LOCATION.to_string() });
                continue;
            }

            match target.region.as_deref().filter(|r| !r.is_empty()) {
                Some(region) => {
                    tracing::info!("Using explicit region '{}' for bucket: {}", region, target.name);
                    resolved.push(ResolvedTarget { name: target.name.clone(), region: region.to_string() });
                }
                None => {
                    tracing::info!("Auto-detecting region for bucket: {}", target.name);
                    match resolver.resolve(&target.name).await {
                        Ok(region) => {
                            resolved.push(ResolvedTarget { name: target.name.clone(), region });
                        }
                        Err(e) => {
                            tracing::warn!("⚠ WARNING: Skipping bucket '{}' - {}", target.name, e);
                        }
                    }
                }
            }
        }

        tracing::info!("{}", "=".repeat(80));
        tracing::info!(
            "Successfully processed {} out of {} buckets",
            resolved.len(),
            targets.len()
        );
        tracing::info!("{}", "=".repeat(80));

        resolved
    }

    /// Enumerate one resolved bucket / 扫描单个存储桶
    pub async fn scan_bucket(&self, target: &ResolvedTarget) -> BucketReport {
        tracing::info!("{}", "=".repeat(80));
        tracing::info!("Scanning bucket: {} in region: {}", target.name, target.region);
        tracing::info!("{}", "=".repeat(80));

        match self.provider {
            Provider::S3 => {
                BucketEnumerator::new(self.listing.as_ref())
                    .enumerate(&target.name, &target.region)
                    .await
            }
            Provider::Gcs => GcsEnumerator::new(self.http.as_ref()).enumerate(&target.name).await,
        }
    }

    /// Full run over `targets` / 完整扫描流程
    ///
    /// Fails with [`ScanError::NoValidTargets`] when region detection leaves
    /// nothing to scan, or when a report cannot be written.
    pub async fn run<W: ReportWriter>(
        &self,
        targets: &[BucketTarget],
        mode: OutputMode,
        writer: W,
    ) -> Result<RunSummary, ScanError> {
        let resolved = self.resolve_targets(targets).await;
        if resolved.is_empty() {
            return Err(ScanError::NoValidTargets);
        }

        let mut aggregator = ReportAggregator::new(mode, writer);
        for target in &resolved {
            let report = self.scan_bucket(target).await;
            aggregator.accept(report)?;
        }
        let outcome = aggregator.finish()?;

        Ok(RunSummary {
            requested: targets.len(),
            scanned: outcome.buckets,
            written: outcome.written,
        })
    }
}
