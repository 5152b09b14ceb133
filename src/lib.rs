pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::TomlConfig;

pub use crate::adapters::{ShellWifiManager, SystemClock, TokioProcessRunner};
pub use crate::core::{
    generator::ImageGenerator, scheduler::PeriodicRefresher, staleness::StalenessTracker,
};
pub use utils::error::{KioskError, Result};
