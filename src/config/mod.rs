pub mod loader;
pub mod types;

pub use loader::Config;
pub use types::{LoggingConfig, PersistenceConfig, WatchdogConfig};
