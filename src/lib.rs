pub mod cli;
pub mod config;
pub mod controller;
pub mod geometry;
pub mod page;
pub mod persistence;
pub mod transform;
pub mod utils;
pub mod watchdog;

pub use config::Config;
pub use controller::{Controller, SettingsReport};
pub use geometry::{Rect, StyleProperty, StyleUpdate};
pub use page::{HostPage, SimulatedPage, VideoHandle};
pub use persistence::{JsonFileStore, MemoryStore, PersistenceGateway};
pub use transform::{ApplyOutcome, StyleSnapshot, TransformApplier, TransformSettings};
pub use utils::{setup_logging, Error, Result};
