// Adapters layer: concrete implementations of the domain ports.

pub mod clock;
pub mod process;
pub mod wifi;

pub use clock::SystemClock;
pub use process::TokioProcessRunner;
pub use wifi::{Platform, ShellWifiManager};
