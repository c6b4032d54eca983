//! Command line target planning / 命令行目标解析
//!
//! Grammar: `[--combine] bucket [region] [bucket [region] ...]`
//!
//! A token is read as a region only when it follows a bucket and looks like
//! one (see [`is_region_shaped`]). A bucket literally named like a region
//! (`us-east-1`) is therefore taken as the previous bucket's region.

use crate::models::BucketTarget;

/// Leading flag selecting combined output / 合并输出标志
pub const COMBINE_FLAG: &str = "--combine";

const REGION_PREFIXES: [&str; 8] = ["us-", "eu-", "ap-", "sa-", "ca-", "me-", "af-", "cn-"];

/// Normalized work list / 解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// No buckets on the command line, use the configured list / 使用默认列表
    UseDefaults { combine: bool },
    /// Buckets given explicitly / 显式指定的存储桶
    Targets { combine: bool, targets: Vec<BucketTarget> },
}

impl Plan {
    pub fn combine(&self) -> bool {
        match self {
            Plan::UseDefaults { combine } | Plan::Targets { combine, .. } => *combine,
        }
    }

    /// Materialize the target list, falling back to `defaults` / 生成最终目标列表
    pub fn into_targets(self, defaults: &[BucketTarget]) -> Vec<BucketTarget> {
        match self {
            Plan::UseDefaults { .. } => defaults.to_vec(),
            Plan::Targets { targets, .. } => targets,
        }
    }
}

/// Region-shape heuristic: known prefix, ≥3 dash parts, numeric tail / 判断是否像区域名
pub fn is_region_shaped(token: &str) -> bool {
    if !REGION_PREFIXES.iter().any(|prefix| token.starts_with(prefix)) {
        return false;
    }
    let parts: Vec<&str> = token.split('-').collect();
    if parts.len() < 3 {
        return false;
    }
    parts
        .last()
        .map(|tail| tail.parse::<i64>().is_ok())
        .unwrap_or(false)
}

/// Parse the argument stream (program name excluded) / 解析参数
pub fn plan<S: AsRef<str>>(tokens: &[S]) -> Plan {
    let mut args: Vec<&str> = tokens.iter().map(|t| t.as_ref()).collect();

    let combine = args.first() == Some(&COMBINE_FLAG);
    if combine {
        args.remove(0);
    }

    let mut targets = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let bucket = args[i];
        if bucket.is_empty() {
            tracing::debug!("Skipping empty bucket argument at position {}", i);
            i += 1;
            continue;
        }

        match args.get(i + 1).filter(|next| is_region_shaped(next)) {
            Some(region) => {
                tracing::debug!("Parsed '{}' with explicit region '{}'", bucket, region);
                targets.push(BucketTarget::with_region(bucket, *region));
                i += 2;
            }
            None => {
                tracing::debug!("Parsed '{}' - region will be auto-detected", bucket);
                targets.push(BucketTarget::new(bucket));
                i += 1;
            }
        }
    }

    if targets.is_empty() {
        Plan::UseDefaults { combine }
    } else {
        Plan::Targets { combine, targets }
    }
}
