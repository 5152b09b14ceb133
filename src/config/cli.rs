use crate::config::toml_config::TomlConfig;
use crate::utils::error::{KioskError, Result};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "planet-kiosk")]
#[command(about = "Serves a rendered planet image and Wi-Fi setup endpoints")]
pub struct CliArgs {
    /// Path to TOML configuration file; built-in defaults are used when omitted
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the listening port from the config file
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

impl CliArgs {
    /// 載入配置並套用命令列覆蓋設定
    pub fn load_config(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => {
                let mut config = TomlConfig::default();
                let cwd = std::env::current_dir().map_err(|e| KioskError::ConfigError {
                    message: format!("Cannot determine current directory: {}", e),
                })?;
                config.resolve_paths(&cwd);
                config
            }
        };

        if let Some(port) = self.port {
            tracing::info!("🔧 Port overridden to: {}", port);
            config.server.port = port;
        }

        Ok(config)
    }
}
