use thiserror::Error;

#[derive(Error, Debug)]
pub enum KioskError {
    #[error("Refresh step failed (exit code {code:?}): {output}")]
    RefreshFailed { code: Option<i32>, output: String },

    #[error("Render step failed (exit code {code:?}): {output}")]
    RenderFailed { code: Option<i32>, output: String },

    #[error("Render step timed out after {seconds}s")]
    RenderTimedOut { seconds: u64 },

    #[error("Filesystem error at {path}: {source}")]
    Filesystem {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to spawn '{program}': {source}")]
    ProcessSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Wi-Fi scan failed: {message}")]
    WifiScanFailed { message: String },

    #[error("Wi-Fi join failed for '{ssid}': {message}")]
    WifiJoinFailed { ssid: String, message: String },

    #[error("Unsupported platform for {operation}: {platform}")]
    Unsupported { operation: String, platform: String },
}

impl KioskError {
    pub fn filesystem(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        KioskError::Filesystem {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// 給使用者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            KioskError::RefreshFailed { .. } => "Cloud texture refresh failed".to_string(),
            KioskError::RenderFailed { .. } | KioskError::RenderTimedOut { .. } => {
                "Failed to Generate image".to_string()
            }
            KioskError::Filesystem { path, .. } => {
                format!("Could not access output location {}", path)
            }
            KioskError::ProcessSpawn { program, .. } => {
                format!("Could not start external program {}", program)
            }
            KioskError::ConfigError { message } => format!("Configuration problem: {}", message),
            KioskError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration field '{}' is invalid: {}", field, reason)
            }
            KioskError::WifiScanFailed { .. } => "Could not scan for Wi-Fi networks".to_string(),
            KioskError::WifiJoinFailed { ssid, .. } => format!("Could not join network {}", ssid),
            KioskError::Unsupported { operation, .. } => {
                format!("{} is not supported on this device", operation)
            }
            KioskError::IoError(_) | KioskError::SerializationError(_) => {
                "Internal error".to_string()
            }
        }
    }

    /// 建議的處理方式
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            KioskError::RefreshFailed { .. } => {
                "Check network connectivity; the refresh is retried on the next request"
            }
            KioskError::RenderFailed { .. } => {
                "Check the renderer configuration file and search directory"
            }
            KioskError::RenderTimedOut { .. } => "Increase generator.render_timeout_secs",
            KioskError::Filesystem { .. } | KioskError::IoError(_) => {
                "Check that the public directory exists and is writable"
            }
            KioskError::ProcessSpawn { .. } => {
                "Check that the configured executable path exists and is executable"
            }
            KioskError::ConfigError { .. } | KioskError::InvalidConfigValueError { .. } => {
                "Fix the configuration file and restart"
            }
            KioskError::WifiScanFailed { .. } | KioskError::WifiJoinFailed { .. } => {
                "Check that the wireless interface is up and the tool has permission"
            }
            KioskError::Unsupported { .. } => "Run on Linux (nmcli) or macOS",
            KioskError::SerializationError(_) => "Report this as a bug",
        }
    }
}

pub type Result<T> = std::result::Result<T, KioskError>;
