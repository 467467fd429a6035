use clap::Parser;
use team_former::core::ConfigProvider;
use team_former::utils::error::{ErrorSeverity, FormationError};
use team_former::utils::{logger, validation::Validate};
use team_former::{CliConfig, FormationEngine, LocalStorage, TeamFormationPipeline, TomlConfig};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 載入 TOML 配置 (若有指定)，此時日誌尚未初始化
    let toml_config = match cli.config.as_deref().map(TomlConfig::from_file).transpose() {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(cli.verbose);
            fail(&e);
        }
    };

    let json_logs = cli.json_logs || toml_config.as_ref().map(TomlConfig::json_logs).unwrap_or(false);
    if json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting team-former CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let monitor_enabled = cli.monitor || toml_config.as_ref().map(TomlConfig::monitoring_enabled).unwrap_or(false);
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let result = match toml_config {
        Some(config) => {
            tracing::info!("📄 Using configuration file: {}", cli.config.as_deref().unwrap_or_default());
            run_pipeline(config, monitor_enabled).await
        }
        None => run_pipeline(cli, monitor_enabled).await,
    };

    if let Err(e) = result {
        fail(&e);
    }
}

async fn run_pipeline<C>(config: C, monitor_enabled: bool) -> Result<(), FormationError>
where
    C: ConfigProvider + Validate,
{
    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        return Err(e);
    }

    let storage = LocalStorage::current_dir();
    let pipeline = TeamFormationPipeline::new(storage, config);
    let engine = FormationEngine::new_with_monitoring(pipeline, monitor_enabled);

    let summary = engine.run().await?;
    let report = &summary.report;
    tracing::info!("✅ Team formation completed successfully!");
    println!("✅ Formed {} groups for {} participants", report.groups, report.participants);
    println!("📁 Participants with groups: {}", report.output_file);
    println!("📁 Team feedback: {}", report.feedback_file);
    Ok(())
}

fn fail(e: &FormationError) -> ! {
    tracing::error!(
        "❌ Team formation failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::High => 1,     // 輸入或配置錯誤
        ErrorSeverity::Medium => 2,   // I/O 錯誤，可重試
        ErrorSeverity::Critical => 3, // 內部一致性錯誤
    };
    std::process::exit(exit_code);
}
