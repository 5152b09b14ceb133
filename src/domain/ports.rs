use crate::domain::model::{AccessPoint, GeneratedImage, ProcessCommand, ProcessOutput};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Runs an external program to completion and captures its output.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, command: &ProcessCommand) -> Result<ProcessOutput>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The "get current image" operation as seen by the HTTP layer.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn current_image(&self) -> Result<GeneratedImage>;
}

#[async_trait]
pub trait WifiManager: Send + Sync {
    async fn scan(&self) -> Result<Vec<AccessPoint>>;
    async fn join(&self, ssid: &str, password: &str) -> Result<()>;
}
