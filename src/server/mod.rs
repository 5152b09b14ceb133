pub mod handler;

pub use handler::{router, AppState, KioskServer};
