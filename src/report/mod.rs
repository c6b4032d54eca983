//! Report aggregation / 报告汇总
//!
//! Independent mode writes each bucket as soon as it is scanned. Combined
//! mode holds everything until [`ReportAggregator::finish`] and writes one
//! document.

use std::path::PathBuf;

use crate::error::ScanError;
use crate::models::{BucketReport, CombinedReport, ExtensionTally};

pub mod writer;

pub use writer::{JsonFileWriter, ReportWriter};

/// Output mode, chosen once per run / 输出模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Independent,
    Combined,
}

impl OutputMode {
    pub fn from_combine_flag(combine: bool) -> Self {
        if combine {
            OutputMode::Combined
        } else {
            OutputMode::Independent
        }
    }
}

/// What a finished aggregation produced / 汇总结果
#[derive(Debug, Clone)]
pub struct AggregateOutcome {
    pub written: Vec<PathBuf>,
    pub buckets: usize,
    /// Combined mode only: sum of every bucket's tally, sorted by count / 全局扩展名统计
    pub global_extension_statistics: Option<ExtensionTally>,
}

pub struct ReportAggregator<W: ReportWriter> {
    mode: OutputMode,
    writer: W,
    combined: CombinedReport,
    written: Vec<PathBuf>,
    buckets: usize,
}

impl<W: ReportWriter> ReportAggregator<W> {
    pub fn new(mode: OutputMode, writer: W) -> Self {
        Self {
            mode,
            writer,
            combined: CombinedReport::new(),
            written: Vec::new(),
            buckets: 0,
        }
    }

    /// Take a completed bucket report / 接收单个存储桶报告
    pub fn accept(&mut self, report: BucketReport) -> Result<(), ScanError> {
        self.buckets += 1;

        match self.mode {
            OutputMode::Independent => {
                let path = self.writer.write_bucket(&report)?;
                tracing::info!(
                    "✓ Completed scanning {}. Results saved to {}",
                    report.bucket_name,
                    path.display()
                );
                self.written.push(path);
            }
            OutputMode::Combined => {
                tracing::info!("✓ Completed scanning {}", report.bucket_name);
                self.combined.push(report);
            }
        }
        Ok(())
    }

    /// Flush combined output if any / 结束汇总，合并模式下写出文件
    pub fn finish(mut self) -> Result<AggregateOutcome, ScanError> {
        if self.mode == OutputMode::Independent {
            return Ok(AggregateOutcome {
                written: self.written,
                buckets: self.buckets,
                global_extension_statistics: None,
            });
        }

        self.combined.finalize();

        tracing::info!("{}", "=".repeat(80));
        tracing::info!("GLOBAL EXTENSION STATISTICS ACROSS ALL BUCKETS");
        tracing::info!("{}", "=".repeat(80));
        for (extension, count) in self.combined.global_extension_statistics.iter() {
            tracing::info!("Extension: {}, Total Count: {}", extension, count);
        }

        let path = self.writer.write_combined(&self.combined)?;
        tracing::info!("✓ All results saved to: {}", path.display());
        tracing::info!("✓ Total buckets scanned: {}", self.combined.total_buckets);
        self.written.push(path);

        Ok(AggregateOutcome {
            written: self.written,
            buckets: self.buckets,
            global_extension_statistics: Some(self.combined.global_extension_statistics),
        })
    }
}
