use anyhow::Context;
use clap::Parser;
use naming_etl::core::Pipeline;
use naming_etl::domain::ports::ConfigProvider;
use naming_etl::utils::{logger, validation::Validate};
use naming_etl::{EtlEngine, LocalStorage, NamingPipeline, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-naming")]
#[command(about = "Naming run driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "naming.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Dry run - generate candidates without scoring them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config))?;

    let verbose = args.verbose || config.log_level() == Some("debug");
    logger::init_logger(verbose, config.json_logs());

    tracing::info!("🚀 Starting TOML-based naming run");
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config);

    let threshold = config.score_threshold();
    let pipeline = NamingPipeline::new(LocalStorage::current_dir(), config)?;

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No requests will be sent");
        let candidates = pipeline.extract().await?;
        println!("{} candidates generated", candidates.len());
        for candidate in &candidates {
            println!("  {}", candidate);
        }
        return Ok(());
    }

    let summary = EtlEngine::new(pipeline).run().await?;

    println!("failed names: {:?}", summary.failed);
    if threshold.is_some() {
        println!("score filtered: {}/{}", summary.rejected, summary.candidates);
    }
    for path in &summary.outputs {
        println!("📁 Output saved to: {}", path);
    }
    println!("all has been processed. bye");

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Configuration Summary:");
    tracing::info!("  🌐 Endpoint: {}", config.endpoint());
    tracing::info!(
        "  🔤 Anchor: {} ({:?}), surname {}",
        config.anchor(),
        config.anchor_position(),
        config.surname()
    );
    tracing::info!("  📖 Dictionary: {}", config.dictionary_path());
    tracing::info!("  🧮 Total grade limit: {:?}", config.total_stroke_limit());
    tracing::info!("  🎯 Score threshold: {:?}", config.score_threshold());
    tracing::info!("  ⚡ Workers: {}", config.concurrent_requests());
    tracing::info!("  📁 Output: {}", config.output_path());
}
