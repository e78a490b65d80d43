use anyhow::Context;
use clap::Parser;
use trips_etl::core::ConfigProvider;
use trips_etl::utils::{logger, validation::Validate};
use trips_etl::{EtlEngine, LocalTableSink, RunConfig, TomlConfig, TripsPipeline};

#[derive(Parser)]
#[command(name = "toml-trips")]
#[command(about = "Trip ingestion driven by a TOML asset file")]
struct Args {
    /// Path to TOML asset file
    #[arg(short, long, default_value = "trips.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON log lines
    #[arg(long)]
    json_logs: bool,

    /// Dry run - show which files would be fetched without downloading
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("📁 Loading asset from: {}", args.config);

    // 載入 TOML 配置
    let toml = TomlConfig::from_file(&args.config)
        .with_context(|| format!("failed to load asset file '{}'", args.config))?;
    toml.validate()
        .with_context(|| format!("invalid asset '{}'", toml.asset_name()))?;
    let config = toml.run_config()?;

    display_config_summary(toml.asset_name(), &config);

    let sink = LocalTableSink::new(config.output_path.clone());
    let pipeline = TripsPipeline::over_http(sink, config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No files will be downloaded");
        for request in pipeline.planned_requests() {
            println!("  {} {} -> {}", request.taxi_type, request.period, request.url);
        }
        return Ok(());
    }

    let summary = EtlEngine::new(pipeline)
        .run()
        .await
        .context("trip ingestion failed")?;

    println!("✅ Trip ingestion finished ({})", summary.status);
    println!("📁 {} rows written to {}", summary.rows, summary.location);
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

fn display_config_summary(asset: &str, config: &RunConfig) {
    println!("📋 Asset: {}", asset);
    println!("  Window: {} .. {}", config.range.start, config.range.end);
    println!("  Taxi types: {}", config.taxi_types.join(", "));
    println!("  Source: {}", config.base_url);
    println!(
        "  Destination: {}.{} ({:?}) under {}",
        config.destination.dataset,
        config.destination.table,
        config.strategy,
        config.output_path
    );
    println!();
}
