use anyhow::Context;
use clap::Parser;
use symcalc::utils::{logger, validation::Validate};
use symcalc::{serve, AppState, CasCalculus, CliConfig, ServerSettings, TomlConfig};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 驗證命令列參數
    if let Err(e) = cli.validate() {
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    // 載入配置檔 (可選)
    let file_config = match cli.config.as_deref().map(TomlConfig::from_file).transpose() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let settings = ServerSettings::resolve(&cli, file_config.as_ref());

    // 初始化日誌
    if settings.json_logs {
        logger::init_json_logger(cli.verbose, settings.log_level.as_deref());
    } else {
        logger::init_cli_logger(cli.verbose, settings.log_level.as_deref());
    }

    tracing::info!("Starting symcalc");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
        tracing::debug!("Effective settings: {:?}", settings);
    }

    // 驗證配置
    let validated = match &file_config {
        Some(config) => config.validate().and_then(|_| settings.validate()),
        None => settings.validate(),
    };
    if let Err(e) = validated {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let listener = TcpListener::bind(settings.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_address()))?;

    let state = AppState::new(CasCalculus::new(settings.request_timeout()));
    serve(listener, state, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("❌ Failed to listen for shutdown signal: {}", e);
        // 無法監聽信號時持續運行
        std::future::pending::<()>().await;
    }
    tracing::info!("🛑 Shutdown signal received");
}
