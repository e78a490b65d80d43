use clap::Parser;
use trips_etl::core::{ConfigProvider, LoadStatus};
use trips_etl::utils::{logger, validation::Validate};
use trips_etl::{CliConfig, EtlEngine, EtlError, LocalTableSink, TripsPipeline};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting trips-etl CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 解析並驗證配置
    let config = match cli.run_config().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => fail(e),
    };

    let sink = LocalTableSink::new(config.output_path.clone());
    let pipeline = TripsPipeline::over_http(sink, config);

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No files will be downloaded");
        for request in pipeline.planned_requests() {
            println!("{} {} {}", request.taxi_type, request.period, request.url);
        }
        return Ok(());
    }

    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!("✅ Trip ingestion finished ({})", summary.status);
            println!(
                "✅ Loaded {} rows ({} of {} files failed) into {}",
                summary.rows, summary.failed, summary.attempted, summary.location
            );
            if summary.status == LoadStatus::Failed {
                eprintln!("⚠️ Every source failed, the table received no rows");
            }
        }
        Err(e) => fail(e),
    }

    Ok(())
}

fn fail(e: EtlError) -> ! {
    tracing::error!(
        "❌ Trip ingestion failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    std::process::exit(e.severity().exit_code().max(1));
}
