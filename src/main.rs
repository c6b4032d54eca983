use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bucket_scout::config;
use bucket_scout::error::ScanError;
use bucket_scout::planner::{self, Plan};
use bucket_scout::report::{JsonFileWriter, OutputMode};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bucket_scout=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(
        "bucket-scout v{} (built {})",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME")
    );

    // Load configuration / 加载配置
    let app_config = config::load_config().map_err(anyhow::Error::msg)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let plan = planner::plan(&args[..]);
    let combine = plan.combine();

    match &plan {
        Plan::Targets { targets, .. } => {
            tracing::info!("Using {} bucket(s) from command-line arguments", targets.len());
        }
        Plan::UseDefaults { .. } => {
            tracing::info!(
                "Using {} bucket(s) from default list",
                app_config.default_targets.len()
            );
        }
    }
    tracing::info!("Combine mode: {}", if combine { "ON" } else { "OFF" });
    tracing::info!("Provider: {}", app_config.scan.provider);

    let targets = plan.into_targets(&app_config.default_targets);
    tracing::debug!("Buckets to process: {:?}", targets);

    let scanner = bucket_scout::build_scanner(&app_config)?;
    let writer = JsonFileWriter::new(app_config.get_output_dir());

    match scanner.run(&targets, OutputMode::from_combine_flag(combine), writer).await {
        Ok(summary) => {
            tracing::info!(
                "Done: {} of {} bucket(s) scanned, {} report file(s) written",
                summary.scanned,
                summary.requested,
                summary.written.len()
            );
            Ok(())
        }
        Err(ScanError::NoValidTargets) => {
            tracing::error!("ERROR: No valid buckets to process. Exiting.");
            Err(ScanError::NoValidTargets.into())
        }
        Err(e) => {
            tracing::error!("Scan aborted: {}", e);
            Err(e.into())
        }
    }
}
