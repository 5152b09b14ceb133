use std::sync::Arc;

use clap::Parser;
use planet_kiosk::adapters::Platform;
use planet_kiosk::server::{AppState, KioskServer};
use planet_kiosk::utils::{logger, validation::Validate};
use planet_kiosk::{
    CliArgs, ImageGenerator, PeriodicRefresher, ShellWifiManager, SystemClock, TokioProcessRunner,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting planet-kiosk");

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load configuration: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }
    if args.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    let settings = config.generator_settings();
    tracing::info!(
        "📁 Renderer {} -> {}",
        settings.renderer.display(),
        settings.output_file().display()
    );
    if let Some(limit) = settings.render_timeout {
        tracing::info!("⏳ Render timeout: {:?}", limit);
    }

    let public_root = settings.public_root.clone();
    let generator = Arc::new(ImageGenerator::new(
        TokioProcessRunner::new(),
        SystemClock,
        settings,
        config.render.clone(),
    ));
    let wifi = Arc::new(ShellWifiManager::new(
        TokioProcessRunner::new(),
        Platform::current(),
        config.wifi.interface.clone(),
        config.wifi.airport_path.clone(),
    ));

    let refresher = config
        .periodic_interval()
        .map(|period| PeriodicRefresher::start(generator.clone(), period));

    let state = AppState {
        images: generator,
        wifi,
        public_root,
    };
    let mut server = KioskServer::start(state, &config.bind_address()).await?;

    let signalled = tokio::select! {
        _ = tokio::signal::ctrl_c() => true,
        _ = server.wait() => false,
    };

    if signalled {
        tracing::info!("Shutting down");
        if let Some(refresher) = refresher {
            refresher.stop().await;
        }
        server.shutdown().await;
    } else {
        tracing::error!("Server stopped unexpectedly");
    }

    Ok(())
}
