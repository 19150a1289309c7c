use clap::Parser;
use naming_etl::core::Pipeline;
use naming_etl::domain::ports::ConfigProvider;
use naming_etl::utils::error::EtlError;
use naming_etl::utils::{logger, validation::Validate};
use naming_etl::{CliConfig, EtlEngine, LocalStorage, NamingPipeline, RunSummary};

const PREVIEW_LIMIT: usize = 20;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(config.verbose, config.json_logs);

    tracing::info!("Starting naming-etl CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let threshold_enabled = config.score_threshold().is_some();
    let dry_run = config.dry_run;

    let pipeline = match NamingPipeline::new(LocalStorage::current_dir(), config) {
        Ok(pipeline) => pipeline,
        Err(e) => fail(e),
    };

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - candidates are generated but not scored");
        match pipeline.extract().await {
            Ok(candidates) => {
                println!("{} candidates generated", candidates.len());
                for candidate in candidates.iter().take(PREVIEW_LIMIT) {
                    println!("  {}", candidate);
                }
                return Ok(());
            }
            Err(e) => fail(e),
        }
    }

    let engine = EtlEngine::new(pipeline);
    match engine.run().await {
        Ok(summary) => print_summary(&summary, threshold_enabled),
        Err(e) => fail(e),
    }

    Ok(())
}

fn print_summary(summary: &RunSummary, threshold_enabled: bool) {
    if summary.candidates == 0 {
        println!("all names unavailable. please check the anchor character");
        return;
    }

    println!("failed names: {:?}", summary.failed);
    if threshold_enabled {
        println!("score filtered: {}/{}", summary.rejected, summary.candidates);
    }
    println!("✅ {} names kept out of {}", summary.accepted, summary.candidates);
    for path in &summary.outputs {
        println!("📁 Output saved to: {}", path);
    }
}

fn fail(e: EtlError) -> ! {
    tracing::error!(
        "❌ Naming run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    std::process::exit(e.severity().exit_code());
}
