pub mod generator;
pub mod scheduler;
pub mod staleness;

pub use crate::domain::model::{GeneratedImage, ProcessCommand, ProcessOutput, RenderConfiguration};
pub use crate::domain::ports::{Clock, ImageSource, ProcessRunner, WifiManager};
pub use crate::utils::error::Result;
