use clap::Parser;
use response_rater::core::{Pipeline, SourceRow};
use response_rater::utils::error::{ErrorSeverity, RaterError};
use response_rater::utils::{logger, validation::Validate};
use response_rater::{
    CliConfig, NotionStore, OpenAiRater, RaterConfig, RatingEngine, RatingPipeline, Secrets,
};

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,      // 警告，但成功
        ErrorSeverity::Medium => 2,   // 重試錯誤
        ErrorSeverity::High => 1,     // 處理錯誤
        ErrorSeverity::Critical => 3, // 系統錯誤
    }
}

fn fail(e: &RaterError) -> ! {
    tracing::error!(
        "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    std::process::exit(exit_code(e.severity()));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 本地開發從 .env 載入環境變數，CI 上由 workflow 注入
    dotenv::dotenv().ok();

    let cli = CliConfig::parse();

    // CI 的日誌收集器吃 JSON 行
    if std::env::var("CI").is_ok() {
        logger::init_ci_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting response-rater");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入 TOML 配置（可選），沒有就用預設值
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match RaterConfig::from_file(path) {
                Ok(config) => config,
                Err(e) => fail(&e),
            }
        }
        None => RaterConfig::default(),
    };

    if let Some(model) = &cli.model {
        config.rating.model = model.clone();
        tracing::info!("🔧 Model overridden to: {}", model);
    }

    // 讀取並驗證秘密
    let secrets = match Secrets::from_env() {
        Ok(secrets) => secrets,
        Err(e) => fail(&e),
    };
    if let Err(e) = secrets.validate() {
        fail(&e);
    }

    let store = match NotionStore::new(&config, &secrets) {
        Ok(store) => store,
        Err(e) => fail(&e),
    };
    let rater = match OpenAiRater::new(&config, &secrets) {
        Ok(rater) => rater,
        Err(e) => fail(&e),
    };
    let pipeline = RatingPipeline::new(store, rater);

    // Dry run：只抓取並列出會被評分的頁面，不呼叫模型也不寫回
    if cli.dry_run {
        let batch = match pipeline.extract().await {
            Ok(batch) => batch,
            Err(e) => fail(&e),
        };

        for row in &batch.rows {
            match row {
                SourceRow::Complete(candidate) => {
                    tracing::info!("🔎 Would rate page {}", candidate.page_id)
                }
                SourceRow::Malformed { page_id, reason } => {
                    tracing::warn!("🔎 Would mark page {} as 'Error': {}", page_id, reason)
                }
            }
        }
        println!("🔎 Dry run: {} responses would be processed", batch.rows.len());
        return Ok(());
    }

    let engine = RatingEngine::new_with_monitoring(pipeline, cli.monitor);

    match engine.run().await {
        Ok(summary) => {
            println!("✅ Rating run completed successfully!");
            println!(
                "📊 {} fetched, {} rated, {} marked for review",
                summary.fetched, summary.rated, summary.failed
            );
        }
        Err(e) => fail(&e),
    }

    Ok(())
}
